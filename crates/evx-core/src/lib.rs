//! Core evx library (thread resolution, formatting, config, API client, stores).

pub mod api;
pub mod config;
pub mod format;
pub mod logging;
pub mod preferences;
pub mod store;
pub mod threads;
