pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod wallet;
pub mod web;

pub use error::{Error, Result};
