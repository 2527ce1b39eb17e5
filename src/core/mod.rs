//! Core runner modules.

pub mod command;
pub mod context;
pub mod database;
pub mod runner;
