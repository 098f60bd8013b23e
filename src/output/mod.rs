//! Export of observed samples
//!
//! # Architecture
//!
//! Every format implements [`Exporter`], which writes to any
//! [`std::io::Write`]. Adding a format means adding a file.
//!
//! | Format | Module | Use |
//! |--------|--------|-----|
//! | CSV | [`csv`] | spreadsheets, pandas, plotting tools |
//! | JSON lines | [`json`] | piping into other programs |
//!
//! # Example
//!
//! ```rust
//! use membrane_rs::config::{IntegratorConfig, SimulationConfig};
//! use membrane_rs::output::{CsvExporter, Exporter};
//! use membrane_rs::simulation::simulate;
//!
//! let config = SimulationConfig {
//!     end_time: 0.1,
//!     integrator: IntegratorConfig::Euler { steps: 10 },
//!     ..SimulationConfig::default()
//! };
//! let report = simulate(&config).unwrap();
//!
//! let mut buffer = Vec::new();
//! CsvExporter::default().write_samples(&report.samples, &mut buffer).unwrap();
//! assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 12);
//! ```

pub mod csv;
pub mod json;

pub use csv::{CsvConfig, CsvExporter, CsvMetadata};
pub use json::JsonLinesExporter;

use crate::error::{MembraneError, Result};
use crate::models::Sample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for observed samples
pub trait Exporter {
    /// Write `samples` to `writer`
    ///
    /// # Errors
    ///
    /// `Configuration` when `samples` is empty, `Io` when writing fails.
    fn write_samples(&self, samples: &[Sample], writer: &mut dyn Write) -> Result<()>;

    /// Write `samples` to a new file at `path`
    fn export(&self, samples: &[Sample], path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_samples(samples, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Keep at most `n_points` samples, evenly spread
///
/// The first and the last sample are always kept. `None`, or a count not
/// smaller than the input, keeps everything.
pub fn downsample(samples: &[Sample], n_points: Option<usize>) -> Vec<Sample> {
    let len = samples.len();
    match n_points {
        Some(n) if n < len && len > 1 => {
            let n = n.max(2);
            let last = len - 1;
            (0..n)
                .map(|i| samples[(i * last + (n - 1) / 2) / (n - 1)])
                .collect()
        }
        _ => samples.to_vec(),
    }
}

pub(crate) fn ensure_not_empty(samples: &[Sample]) -> Result<()> {
    if samples.is_empty() {
        return Err(MembraneError::configuration("samples", "nothing to export"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_at(time: f64) -> Sample {
    Sample {
        time,
        feed_pressure: 1e5,
        retentate_o2_fraction: 0.15,
        retentate_n2_fraction: 0.85,
        retentate_flow: 1.683e-4,
        permeate_o2_flow: 1.7e-5,
        permeate_n2_flow: 1.46e-5,
        tank_pressure: 101325.0 + time,
        tank_moles: 4e-3,
        valve_outflow: 0.0,
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| s.time).collect()
    }

    #[test]
    fn test_downsample_keeps_first_and_last() {
        let samples: Vec<Sample> = (0..=100).map(|k| sample_at(k as f64)).collect();
        let reduced = downsample(&samples, Some(5));

        assert_eq!(reduced.len(), 5);
        assert_eq!(reduced[0].time, 0.0);
        assert_eq!(reduced[4].time, 100.0);
        assert_eq!(times(&reduced), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_downsample_without_limit() {
        let samples: Vec<Sample> = (0..4).map(|k| sample_at(k as f64)).collect();
        assert_eq!(downsample(&samples, None).len(), 4);
        assert_eq!(downsample(&samples, Some(10)).len(), 4);
    }

    #[test]
    fn test_downsample_to_one_keeps_ends() {
        let samples: Vec<Sample> = (0..4).map(|k| sample_at(k as f64)).collect();
        assert_eq!(times(&downsample(&samples, Some(1))), vec![0.0, 3.0]);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let samples = vec![sample_at(0.0), sample_at(1.0)];

        CsvExporter::default().export(&samples, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_empty_export_is_rejected() {
        let mut buffer = Vec::new();
        let err = JsonLinesExporter.write_samples(&[], &mut buffer).unwrap_err();
        assert!(matches!(err, MembraneError::Configuration { .. }));
    }
}
