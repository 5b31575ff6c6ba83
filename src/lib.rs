//! Momentum: tasks, habits, to-dos, notes and templates with a free-text
//! voice command layer, persisted to a local key/value store.

pub mod analytics;
pub mod backup;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod storage;
pub mod urgency;
pub mod voice;

pub use error::{MomentumError, Result};
