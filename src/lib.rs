pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod templates_structs;
