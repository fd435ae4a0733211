//! # Print Operations
//!
//! A [`PrintJob`] is the ordered list of logical operations for one print
//! request. It sits between the orchestrator and raw ESC/POS bytes:
//!
//! ```text
//! Orchestrator → PrintJob (inspectable) → Codegen → Bytes → Transport
//! ```
//!
//! Jobs are built once, encoded once, and dropped after sending.

use tracing::warn;

use crate::protocol::text::Alignment;
use crate::render::bitmap::MonochromeBitmap;

/// Logical print operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Initialize printer (ESC @). Always the first op of a job.
    Init,

    /// Raster image, positioned with `alignment`, framed to `width` dots.
    Raster {
        bitmap: MonochromeBitmap,
        alignment: Alignment,
        width: u16,
    },

    /// One line of text; a line feed is appended on encoding.
    Text(String),

    /// Advance paper by `lines` empty lines.
    Feed { lines: u8 },

    /// Cut paper. `partial: true` leaves a small hinge.
    Cut { partial: bool },

    /// Transaction boundary. Encodes to nothing; nothing may follow it.
    EndOfJob,
}

/// An ordered, append-only sequence of [`Op`]s that always starts with
/// [`Op::Init`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    ops: Vec<Op>,
}

impl Default for PrintJob {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintJob {
    /// Create a job containing only the initialize op.
    pub fn new() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    /// Whether [`Op::EndOfJob`] has been pushed.
    pub fn is_sealed(&self) -> bool {
        matches!(self.ops.last(), Some(Op::EndOfJob))
    }

    /// Append an op.
    ///
    /// Ops pushed after [`Op::EndOfJob`], and additional [`Op::Init`]s,
    /// are dropped with a warning: the transaction is already framed.
    pub fn push(&mut self, op: Op) -> &mut Self {
        if self.is_sealed() {
            warn!(?op, "ignoring op pushed after end of job");
        } else if op == Op::Init {
            warn!("ignoring duplicate init op");
        } else {
            self.ops.push(op);
        }
        self
    }

    /// Append several text lines.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(Op::Text(line.into()));
        }
        self
    }

    /// Close the transaction.
    pub fn end(&mut self) -> &mut Self {
        self.push(Op::EndOfJob)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Never true: a job always holds at least [`Op::Init`].
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate over ops.
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl<'a> IntoIterator for &'a PrintJob {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
