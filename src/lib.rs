pub mod attachments;
pub mod config;
pub mod error;
pub mod reporter;
pub mod routes;
pub mod runner;
pub mod sandbox;
pub mod tasks;
pub mod web_server;
