//! # Dialects
//!
//! Encoders turning an `Event` into a backend wire payload.
//!
//! - [`JsonEncoder`]: one JSON object per event
//! - [`CsvEncoder`]: one fixed-column CSV row per event

mod csv;
mod json;

use std::sync::Arc;

pub use contracts::{DialectKind, Encoder};
pub use self::csv::{CsvEncoder, CSV_COLUMNS};
pub use self::json::JsonEncoder;

/// Create the encoder for a configured dialect
pub fn encoder_for(kind: DialectKind) -> Arc<dyn Encoder> {
    match kind {
        DialectKind::Json => Arc::new(JsonEncoder),
        DialectKind::Csv => Arc::new(CsvEncoder),
    }
}
