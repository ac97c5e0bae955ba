pub mod cli;
pub mod config;
pub mod error;
pub mod estimators;
pub mod models;
pub mod processors;
pub mod query;
pub mod readers;
pub mod store;
pub mod utils;
pub mod writers;

pub use config::Settings;
pub use error::{GapError, Result};
pub use query::QueryEngine;
pub use store::DataStore;
