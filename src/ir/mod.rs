//! # Print Job Representation
//!
//! This module provides the layer between "what to print" and raw ESC/POS
//! bytes. A job is a plain list of [`Op`]s that can be inspected before
//! anything touches the wire.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────┐
//! │ Orchestrator │ ──► │  PrintJob   │ ──► │ Codegen  │ ──► bytes
//! │              │     │ (Vec<Op>)   │     │          │
//! └──────────────┘     └─────────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use sppcore::ir::{Op, PrintJob};
//!
//! let mut job = PrintJob::new();
//! job.push(Op::Text("Hello".into()));
//! job.push(Op::Feed { lines: 2 });
//! job.end();
//!
//! // Inspect the job
//! println!("{:#?}", job);
//!
//! let bytes = job.to_bytes();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! ```

mod codegen;
mod ops;

pub use ops::*;
