//! pondlife - headless pond runner
//!
//! Prints one report line per report interval on stdout. Logging (including
//! extinction and appearance events) goes to stderr so the report stream
//! stays machine-readable.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};

use pondlife::core::config::PondConfig;
use pondlife::core::error::{PondError, Result};
use pondlife::simulation::{Report, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Headless artificial-life pond simulation
#[derive(Parser, Debug)]
#[command(name = "pondlife")]
#[command(about = "Evolve self-replicating genome programs on a toroidal grid")]
struct Args {
    /// TOML config file (CLI flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pond width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Pond height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Mutation probability numerator out of 2^32
    #[arg(long)]
    mutation_rate: Option<u32>,

    /// Cycles between reports
    #[arg(long)]
    report_frequency: Option<u64>,

    /// Cycles between random cell injections
    #[arg(long)]
    inflow_frequency: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many cycles (default: run forever)
    #[arg(long)]
    cycles: Option<u64>,

    /// Stop after this many seconds of wall-clock time
    #[arg(long)]
    seconds: Option<u64>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Print a CSV header line before the first report
    #[arg(long)]
    header: bool,
}

impl Args {
    fn into_config(self) -> Result<(PondConfig, RunOptions)> {
        let mut config = match &self.config {
            Some(path) => PondConfig::load(path)?,
            None => PondConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation_rate = rate;
        }
        if let Some(freq) = self.report_frequency {
            config.report_frequency = freq;
        }
        if let Some(freq) = self.inflow_frequency {
            config.inflow_frequency = freq;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;

        let options = RunOptions {
            cycles: self.cycles,
            seconds: self.seconds,
            format: self.format,
            header: self.header,
        };
        Ok((config, options))
    }
}

struct RunOptions {
    cycles: Option<u64>,
    seconds: Option<u64>,
    format: OutputFormat,
    header: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let (config, options) = Args::parse().into_config()?;

    tracing::info!(
        "Starting pond {}x{}, genome depth {}, mutation rate {}, seed {:?}",
        config.width,
        config.height,
        config.genome_depth,
        config.mutation_rate,
        config.seed
    );

    let mut sim = Simulation::new(config)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    if let Some(seconds) = options.seconds {
        let flag = Arc::clone(&shutdown);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            flag.store(true, Ordering::Relaxed);
        });
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if options.header && options.format == OutputFormat::Csv {
        writeln!(out, "{}", Report::csv_header())?;
    }

    let start = Instant::now();
    let mut write_error: Option<PondError> = None;
    let ran = sim.run_until(&shutdown, options.cycles, |world, report, _event| {
        if write_error.is_some() {
            return;
        }
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some((lineage, cells)) = world.pond.dominant_lineage() {
                tracing::debug!(clock = report.clock, lineage, cells, "Dominant viable lineage");
            }
        }
        if let Err(e) = emit(&mut out, report, options.format) {
            // a closed pipe or a bad record ends the run
            write_error = Some(e);
            shutdown.store(true, Ordering::Relaxed);
        }
    });
    if let Some(e) = write_error {
        return Err(e);
    }

    if let Some((lineage, cells)) = sim.world.pond.dominant_lineage() {
        tracing::info!(lineage, cells, "Dominant viable lineage");
        let sample = sim
            .world
            .pond
            .cells()
            .iter()
            .find(|c| c.lineage == lineage && c.is_active() && c.is_viable());
        if let Some(cell) = sample {
            tracing::debug!(id = cell.id, generation = cell.generation, "{}", cell.genome.disassemble(64));
        }
    }

    let elapsed = start.elapsed();
    tracing::info!(
        "Ran {} cycles in {:.2}s ({:.0} cycles/s)",
        ran,
        elapsed.as_secs_f64(),
        ran as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn emit(out: &mut impl Write, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => writeln!(out, "{}", report)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;
    Ok(())
}
