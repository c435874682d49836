pub mod argon2_password_hasher;
pub mod driver_repository;
pub mod entity;
pub mod identity_service;
pub mod jwt_session_issuer;
pub mod schema;
pub mod trace_log;
pub mod tracing_navigator;
