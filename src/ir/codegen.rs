//! # Code Generation
//!
//! Converts print jobs to ESC/POS bytes. Encoding is a pure function of
//! the job: no state is carried between calls.

use super::ops::{Op, PrintJob};
use crate::printer::PrinterConfig;
use crate::protocol::{commands, graphics, text};

impl PrintJob {
    /// Compile the job to ESC/POS bytes.
    ///
    /// Uses the default printer configuration (SPP-R200III).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with_config(&PrinterConfig::SPP_R200III)
    }

    /// Compile the job to ESC/POS bytes with a specific printer config.
    pub fn to_bytes_with_config(&self, config: &PrinterConfig) -> Vec<u8> {
        let mut out = Vec::new();

        for op in self {
            match op {
                Op::Init => {
                    out.extend(commands::init());
                }
                Op::Text(s) => {
                    out.extend(text::line(s));
                }
                Op::Feed { lines } => {
                    out.extend(commands::feed_lines(*lines));
                }
                Op::Cut { partial } => {
                    out.extend(commands::cut(*partial));
                }
                Op::Raster {
                    bitmap,
                    alignment,
                    width,
                } => {
                    out.extend(text::align(*alignment));

                    // Split tall images so no single command overruns the
                    // printer's receive buffer over Bluetooth
                    let data = bitmap.rows_fitted(*width);
                    let width_bytes = width.div_ceil(8) as usize;
                    let chunk_rows = config.max_chunk_rows.max(1) as usize;
                    let total_height = bitmap.height() as usize;

                    let mut row_offset = 0;
                    while row_offset < total_height {
                        let chunk_height = (total_height - row_offset).min(chunk_rows);
                        let byte_start = row_offset * width_bytes;
                        let byte_end = (row_offset + chunk_height) * width_bytes;

                        out.extend(graphics::raster(
                            *width,
                            chunk_height as u16,
                            &data[byte_start..byte_end],
                        ));
                        row_offset += chunk_height;
                    }

                    if *alignment != text::Alignment::Left {
                        out.extend(text::align(text::Alignment::Left));
                    }
                }
                Op::EndOfJob => {}
            }
        }

        out
    }
}
