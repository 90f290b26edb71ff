//! Scheme matcher library

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod processing;

pub use config::Config;
pub use engine::MatchingEngine;
pub use error::{MatcherError, Result};
