//! # Pickup Common Library
//!
//! Shared code for the pickup dashboard services:
//! - Error type
//! - Configuration file loading and database location resolution
//! - Farmer Store schema, models and queries

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
