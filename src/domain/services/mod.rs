pub mod identity_service;
pub mod insert_failure_classifier;
pub mod navigator;
pub mod password_service;
pub mod registration_observer;
pub mod token_service;
