//! CSV export of observed samples
//!
//! Compatible with spreadsheets, pandas and most plotting tools.
//!
//! **Output**:
//! ```csv
//! # Membrane Separator Simulation Data
//! # Model: Membrane Separator
//! # Solver: Runge Kutta (RK4)
//! # Total Time: 100 s
//! #
//! time_s,feed_pressure_pa,retentate_o2,retentate_n2,retentate_flow_mol_s,...
//! 0.000000,100000.000000,0.210000,0.790000,1.683000e-4,...
//! ```

use crate::error::Result;
use crate::models::Sample;
use crate::output::{ensure_not_empty, Exporter};
use crate::solver::SimulationResult;
use std::io::Write;

/// Column headers, in the order of [`sample_values`]
pub const COLUMNS: [&str; 11] = [
    "time_s",
    "feed_pressure_pa",
    "retentate_o2",
    "retentate_n2",
    "retentate_flow_mol_s",
    "permeate_o2_mol_s",
    "permeate_n2_mol_s",
    "tank_pressure_pa",
    "tank_moles",
    "valve_outflow_mol_s",
    "degenerate",
];

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use membrane_rs::output::CsvConfig;
///
/// let config = CsvConfig::european().precision(10);
/// assert_eq!(config.delimiter, ';');
/// assert_eq!(config.decimal_separator, ',');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Digits after the decimal point (default: 6)
    pub precision: usize,

    /// Header comments, written when present
    pub metadata: Option<CsvMetadata>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            metadata: None,
        }
    }
}

impl CsvConfig {
    /// Semicolon-delimited, comma as decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: add header comments
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Header comments of a CSV file
///
/// Only the fields that are set are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Model name (e.g., "Membrane Separator")
    pub model_name: Option<String>,

    /// Solver name (e.g., "Forward Euler")
    pub solver_name: Option<String>,

    /// Total simulation time (seconds)
    pub total_time: Option<f64>,

    /// Additional key/value lines
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Collect the solver name, the span and the other metadata of a run
    pub fn from_result(model: &str, result: &SimulationResult) -> Self {
        let mut custom: Vec<(String, String)> = result
            .metadata
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "solver" | "total time"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        custom.sort();

        Self {
            model_name: Some(model.to_string()),
            solver_name: result.metadata.get("solver").cloned(),
            total_time: result.metadata.get("total time").and_then(|v| v.parse().ok()),
            custom,
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.push((key.into(), value.into()));
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV exporter, one row per sample
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    fn write_metadata_header(&self, writer: &mut dyn Write, metadata: &CsvMetadata) -> Result<()> {
        writeln!(writer, "# Membrane Separator Simulation Data")?;

        if let Some(model) = &metadata.model_name {
            writeln!(writer, "# Model: {}", model)?;
        }
        if let Some(solver) = &metadata.solver_name {
            writeln!(writer, "# Solver: {}", solver)?;
        }
        if let Some(total_time) = metadata.total_time {
            writeln!(writer, "# Total Time: {} s", total_time)?;
        }
        for (key, value) in &metadata.custom {
            writeln!(writer, "# {}: {}", key, value)?;
        }

        writeln!(writer, "#")?;
        Ok(())
    }

    /// Number with configured precision and decimal separator
    ///
    /// Magnitudes below 1e-3 (molar flows, tank moles) use exponent notation.
    fn format_number(&self, value: f64) -> String {
        let formatted = if value != 0.0 && value.abs() < 1e-3 {
            format!("{:.prec$e}", value, prec = self.config.precision)
        } else {
            format!("{:.prec$}", value, prec = self.config.precision)
        };

        if self.config.decimal_separator != '.' {
            formatted.replace('.', &self.config.decimal_separator.to_string())
        } else {
            formatted
        }
    }
}

impl Exporter for CsvExporter {
    fn write_samples(&self, samples: &[Sample], writer: &mut dyn Write) -> Result<()> {
        ensure_not_empty(samples)?;

        if let Some(metadata) = &self.config.metadata {
            self.write_metadata_header(writer, metadata)?;
        }

        let delimiter = self.config.delimiter.to_string();
        writeln!(writer, "{}", COLUMNS.join(&delimiter))?;

        for sample in samples {
            let mut row: Vec<String> = sample_values(sample)
                .iter()
                .map(|&value| self.format_number(value))
                .collect();
            row.push(u8::from(sample.degenerate).to_string());
            writeln!(writer, "{}", row.join(&delimiter))?;
        }

        Ok(())
    }
}

/// Numeric columns of a sample, without the `degenerate` flag
pub fn sample_values(sample: &Sample) -> [f64; 10] {
    [
        sample.time,
        sample.feed_pressure,
        sample.retentate_o2_fraction,
        sample.retentate_n2_fraction,
        sample.retentate_flow,
        sample.permeate_o2_flow,
        sample.permeate_n2_flow,
        sample.tank_pressure,
        sample.tank_moles,
        sample.valve_outflow,
    ]
}

// =============================================================================
// Tests
// =============================================================================
