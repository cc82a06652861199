//! Random test data generation
//!
//! Produces registration payloads shaped like the datasets in the data
//! store, for tests that need throwaway identities instead of fixtures.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Asha", "Ravi", "Meera", "Arjun", "Priya", "Kiran", "Divya", "Rahul", "Sneha", "Vikram",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Patel", "Reddy", "Iyer", "Khan", "Das", "Nair", "Gupta", "Joshi", "Mehta",
];

/// Short unique identifier, handy for unique emails and file names
pub fn unique_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Generate a random registration payload. Keys in `overrides` replace
/// the generated values last, so callers can pin any field.
pub fn random_user_data(overrides: Value) -> Value {
    let mut rng = rand::thread_rng();

    let first = *FIRST_NAMES.choose(&mut rng).unwrap_or(&"Asha");
    let last = *LAST_NAMES.choose(&mut rng).unwrap_or(&"Sharma");
    let uid = unique_id();

    let year = rng.gen_range(1950..=2005);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let phone: String = (0..10).map(|_| rng.gen_range(0..=9).to_string()).collect();

    let mut data = match json!({
        "first_name": first,
        "last_name": last,
        "email": format!("{}.{}.{}@example.com", first.to_lowercase(), last.to_lowercase(), uid),
        "password": "Test@123",
        "confirm_password": "Test@123",
        "phone": format!("+91{}", phone),
        "date_of_birth": format!("{:04}-{:02}-{:02}", year, month, day),
        "gender": *["male", "female"].choose(&mut rng).unwrap_or(&"male"),
        "country": "IN",
        "terms_conditions": true,
        "newsletter": rng.gen_bool(0.5),
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Value::Object(map) = overrides {
        for (k, v) in map {
            data.insert(k, v);
        }
    }

    debug!(email = %data["email"], "generated random user data");
    Value::Object(data)
}
