pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod routes;
pub mod store;

pub use error::{Error, Result};
