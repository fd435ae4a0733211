//! # Printer Module
//!
//! Printer hardware descriptions and the job orchestrator.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications
//! - [`session`]: Runs one print job from connect to close
//! - [`worker`]: Runs jobs on tokio's blocking pool

pub mod config;
pub mod session;
pub mod worker;

pub use config::PrinterConfig;
pub use session::{JobState, JobSummary, Printer};
pub use worker::spawn_print;
