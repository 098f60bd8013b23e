//! membrane-sim - O2/N2 membrane separator simulator
//!
//! # Usage
//!
//! ```bash
//! membrane-sim --config run.json --method dormand-prince --end-time 200 --format csv > run.csv
//! membrane-sim --print-config > run.json
//! RUST_LOG=debug membrane-sim --nodes 20 --points 50
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use membrane_rs::{
    config::{IntegratorConfig, SimulationConfig},
    error::Result,
    models::Sample,
    output::{downsample, CsvConfig, CsvExporter, CsvMetadata, Exporter, JsonLinesExporter},
    simulation::{simulate, SimulationReport},
};

/// Fixed step count used when switching from an adaptive integrator
const DEFAULT_STEPS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Euler,
    Rk4,
    DormandPrince,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned columns for reading in a terminal
    Table,
    Csv,
    /// One JSON object per sample
    Json,
}

/// O2/N2 membrane separator with accumulator tank and relief valve
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON simulation configuration; defaults are used when absent
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Integration method
    #[arg(short, long, value_enum)]
    method: Option<Method>,

    /// Simulated time [s]
    #[arg(short = 't', long)]
    end_time: Option<f64>,

    /// Number of fixed steps (Euler, RK4)
    #[arg(short, long)]
    steps: Option<usize>,

    /// Grid nodes across the membrane (at least 3)
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Keep every n-th accepted step
    #[arg(long)]
    record_every: Option<usize>,

    /// Print at most this many samples, first and last included
    #[arg(short, long)]
    points: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    /// Load the configuration file, then apply command-line overrides
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_path(path)?,
            None => SimulationConfig::default(),
        };

        let current_steps = match config.integrator {
            IntegratorConfig::Euler { steps } | IntegratorConfig::Rk4 { steps } => steps,
            IntegratorConfig::DormandPrince { .. } => DEFAULT_STEPS,
        };
        let steps = self.steps.unwrap_or(current_steps);

        match self.method {
            Some(Method::Euler) => config.integrator = IntegratorConfig::Euler { steps },
            Some(Method::Rk4) => config.integrator = IntegratorConfig::Rk4 { steps },
            Some(Method::DormandPrince) => {
                if !matches!(config.integrator, IntegratorConfig::DormandPrince { .. }) {
                    config.integrator = IntegratorConfig::DormandPrince {
                        rtol: 1e-6,
                        atol: 1e-9,
                        initial_step: 1e-3,
                        max_step: 0.1,
                    };
                }
            }
            None => {
                if let IntegratorConfig::Euler { steps: s } | IntegratorConfig::Rk4 { steps: s } =
                    &mut config.integrator
                {
                    *s = steps;
                }
            }
        }

        if self.steps_ignored(&config.integrator) {
            info!("--steps has no effect on the adaptive integrator; set max_step instead");
        }

        if let Some(end_time) = self.end_time {
            config.end_time = end_time;
        }
        if let Some(nodes) = self.nodes {
            config.separator.node_count = nodes;
        }
        if let Some(record_every) = self.record_every {
            config.record_every = record_every;
        }

        config.validate()?;
        Ok(config)
    }

    fn steps_ignored(&self, integrator: &IntegratorConfig) -> bool {
        self.steps.is_some() && matches!(integrator, IntegratorConfig::DormandPrince { .. })
    }
}

fn write_table(samples: &[Sample], writer: &mut dyn Write) -> Result<()> {
    writeln!(
        writer,
        "{:>10} {:>12} {:>8} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "t [s]", "P feed [Pa]", "y O2", "y N2", "F ret", "F perm O2", "F perm N2", "P tank [Pa]", "Q valve"
    )?;
    for s in samples {
        writeln!(
            writer,
            "{:>10.3} {:>12.1} {:>8.5} {:>8.5} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.1} {:>12.4e}{}",
            s.time,
            s.feed_pressure,
            s.retentate_o2_fraction,
            s.retentate_n2_fraction,
            s.retentate_flow,
            s.permeate_o2_flow,
            s.permeate_n2_flow,
            s.tank_pressure,
            s.valve_outflow,
            if s.degenerate { " *" } else { "" }
        )?;
    }
    Ok(())
}

fn write_report(args: &Args, report: &SimulationReport, writer: &mut dyn Write) -> Result<()> {
    let samples = downsample(&report.samples, args.points);

    match args.format {
        Format::Table => write_table(&samples, writer),
        Format::Csv => {
            let metadata = CsvMetadata::from_result("Membrane Separator", &report.result);
            CsvExporter::new(CsvConfig::default().with_metadata(metadata)).write_samples(&samples, writer)
        }
        Format::Json => JsonLinesExporter.write_samples(&samples, writer),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.simulation_config()?;

    if args.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    info!(
        "running {} for {} s on {} nodes",
        config.integrator.name(),
        config.end_time,
        config.separator.node_count
    );

    let report = simulate(&config)?;

    if let (Some(steady), Some(last)) = (report.steady_tank_pressure, report.last_sample()) {
        info!(
            "final tank pressure {:.1} Pa (steady state {:.1} Pa), retentate N2 {:.4}",
            last.tank_pressure, steady, last.retentate_n2_fraction
        );
    }

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    write_report(&args, &report, writer.as_mut())?;
    writer.flush()?;

    Ok(())
}
