pub mod config;
pub mod covers;
pub mod http;
pub mod model;
pub mod render;
pub mod service;
pub mod sqlite;
pub mod store;
