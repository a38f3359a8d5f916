pub mod auth;
pub mod mailer;
pub mod policy;
pub mod registration_service;
pub mod subscription;
pub mod token;
pub mod user_service;
