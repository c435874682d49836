pub mod driver;
pub mod identity;
pub mod outcome;
pub mod registration;
