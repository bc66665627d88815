//! Infrastructure implementations for Parley.
//!
//! Concrete generation backends that speak HTTP to an external inference
//! server, plus configuration loading from the data directory.

pub mod config;
pub mod llm;
