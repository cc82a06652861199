//! Page objects built on [`crate::page::BasePage`]

pub mod registration;

pub use registration::RegistrationPage;
