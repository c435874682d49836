pub mod drivers;
pub mod identities;
