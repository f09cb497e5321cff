#![forbid(unsafe_code)]

//! Core domain model and business logic for the stepwork session runner.
//!
//! This crate provides:
//! - Domain types (exercises, workout days, summaries)
//! - The built-in seven-day program and custom plans
//! - The session state machine and its countdown timer
//! - Calorie and weight-lifted accounting
//! - Persistence (WAL, CSV rollup, history, body-weight log)

pub mod types;
pub mod error;
pub mod sets;
pub mod calories;
pub mod timer;
pub mod catalog;
pub mod summary;
pub mod session;
pub mod config;
pub mod logging;
pub mod state;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod plan;
pub mod weight;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calories::CaloriePolicy;
pub use catalog::{build_default_catalog, get_default_catalog, CatalogProvider};
pub use config::Config;
pub use session::{NoHooks, SessionEvent, SessionHooks, SessionOptions, SessionOutcome, WorkoutSession};
pub use timer::{format_clock, Countdown, TimerEvent};
pub use wal::{JsonlSink, SummarySink};
pub use history::{delete_summary, load_recent_summaries, load_summaries_in_range, WorkoutStats};
pub use plan::PlanStore;
pub use weight::{parse_weight, WeightLog, WeightRecord, WeightStats};
