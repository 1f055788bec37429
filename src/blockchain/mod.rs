pub mod client;
pub mod crawler;
pub mod models;
pub mod processor;
