//! Runsheet Library
//!
//! A library for running scripted jobs against named SQLite databases.

pub mod cli;
pub mod core;
pub mod error;
pub mod jobs;
pub mod models;

pub use error::{Error, Result};
