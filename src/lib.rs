pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod hooks;
pub mod models;
pub mod network;
pub mod placeholder;
pub mod poller;
pub mod retry;
pub mod transform;
