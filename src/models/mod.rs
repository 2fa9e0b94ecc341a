pub mod analytics;
pub mod booking;
pub mod donation;
pub mod event;
pub mod message;
pub mod user;
