//! # Receipt Text
//!
//! The text block printed under the image: the configured lines, an
//! optional date/time line, then enough blank feed for the paper to clear
//! the tear bar.
//!
//! ```
//! use sppcore::ir::PrintJob;
//! use sppcore::receipt::Receipt;
//!
//! let mut job = PrintJob::new();
//! Receipt::default().append_to(&mut job);
//! job.end();
//!
//! let bytes = job.to_bytes();
//! assert!(bytes.ends_with(b"Thank you!\n\n\n\n"));
//! ```

use chrono::{DateTime, Local};

use crate::config::AppConfig;
use crate::ir::{Op, PrintJob};

/// Format of the optional timestamp line, e.g. `2026-01-27 09:30`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fixed text portion of a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    lines: Vec<String>,
    timestamp: bool,
    trailing_feed: u8,
}

impl Default for Receipt {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl Receipt {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            timestamp: false,
            trailing_feed: 0,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lines: config.lines.clone(),
            timestamp: config.timestamp,
            trailing_feed: config.trailing_feed,
        }
    }

    /// Print the local date and time after the text.
    pub fn timestamp(mut self, on: bool) -> Self {
        self.timestamp = on;
        self
    }

    /// Blank lines fed after the text.
    pub fn trailing_feed(mut self, lines: u8) -> Self {
        self.trailing_feed = lines;
        self
    }

    /// Lines as they will be printed, with the timestamp taken from `now`.
    pub fn text_lines_at(&self, now: DateTime<Local>) -> Vec<String> {
        let mut lines = self.lines.clone();
        if self.timestamp {
            lines.push(now.format(TIMESTAMP_FORMAT).to_string());
        }
        lines
    }

    /// Append the text block to a job, stamped with the current time.
    pub fn append_to(&self, job: &mut PrintJob) {
        self.append_at(job, Local::now());
    }

    pub fn append_at(&self, job: &mut PrintJob, now: DateTime<Local>) {
        job.lines(self.text_lines_at(now));
        if self.trailing_feed > 0 {
            job.push(Op::Feed {
                lines: self.trailing_feed,
            });
        }
    }
}
