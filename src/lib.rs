//! Course catalog and four-year plan server.
//!
//! - [`catalog`]: the per-quarter course directory and its filters
//! - [`planner`]: the four-year plan state machine
//! - [`transfer`]: drag-transfer payload encoding
//! - [`db`] / [`api`]: SQLite course store and the HTTP API over it
//! - [`client`]: client for the remote course query API

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod planner;
pub mod transfer;
