pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::Error;

#[cfg(test)]
mod tests;
