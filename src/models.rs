pub mod auth;
pub mod package;
pub mod registration;
pub mod role;
pub mod school;
pub mod user;
pub mod verification;
