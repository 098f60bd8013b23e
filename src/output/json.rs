//! JSON lines export: one sample object per line

use crate::error::Result;
use crate::models::Sample;
use crate::output::{ensure_not_empty, Exporter};
use std::io::Write;

/// Writes each sample as a compact JSON object on its own line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesExporter;

impl Exporter for JsonLinesExporter {
    fn write_samples(&self, samples: &[Sample], writer: &mut dyn Write) -> Result<()> {
        ensure_not_empty(samples)?;

        for sample in samples {
            serde_json::to_writer(&mut *writer, sample)?;
            writeln!(writer)?;
        }

        Ok(())
    }
}
