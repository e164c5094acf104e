pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod setup;

#[cfg(test)]
pub mod test_utils;

pub use config::Settings;
