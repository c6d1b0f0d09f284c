use clap::{Parser, Subcommand};
use ct_blocks::{BlockError, BuiltModel, Demo, ModelFile};
use ct_sim::{Director, DirectorConfig, SimError, SimProgress, SimRecord, SolverKind};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ct-cli")]
#[command(about = "Continuous-time block diagram simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in demo or a YAML model file
    Run {
        /// Built-in demo model (decay, oscillator, step-response)
        #[arg(long, default_value = "decay", conflicts_with = "model_file")]
        demo: String,
        /// Path to a YAML model file
        #[arg(long)]
        model_file: Option<PathBuf>,
        /// Path to a YAML director configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// End time in seconds (defaults to the configured stop time)
        #[arg(long)]
        t_end: Option<f64>,
        /// Write the recorded trajectory as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a director configuration file
    Check {
        /// Path to the YAML director configuration
        config_path: PathBuf,
    },
    /// List available solvers
    Solvers,
    /// List built-in demo models
    Demos,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No end time: pass --t-end or set a finite stop_time")]
    NoEndTime,
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            demo,
            model_file,
            config,
            t_end,
            output,
        } => cmd_run(
            &demo,
            model_file.as_deref(),
            config.as_deref(),
            t_end,
            output.as_deref(),
        ),
        Commands::Check { config_path } => cmd_check(&config_path),
        Commands::Solvers => {
            cmd_solvers();
            Ok(())
        }
        Commands::Demos => {
            for demo in Demo::ALL {
                println!("  {:<14} {}", demo.name(), demo.description());
            }
            Ok(())
        }
    }
}

fn cmd_run(
    demo: &str,
    model_file: Option<&Path>,
    config_path: Option<&Path>,
    t_end: Option<f64>,
    output: Option<&Path>,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => DirectorConfig::load_yaml(path)?,
        None => DirectorConfig::default(),
    };
    let t_end = t_end
        .or_else(|| config.stop_time.is_finite().then_some(config.stop_time))
        .ok_or(CliError::NoEndTime)?;

    let (label, built, watched) = match model_file {
        Some(path) => {
            let built = ModelFile::load_yaml(path)?.build()?;
            let watched: Vec<String> = built.ids.keys().cloned().collect();
            (path.display().to_string(), built, watched)
        }
        None => {
            let demo: Demo = demo.parse()?;
            let watched = demo.watched().iter().map(|p| p.to_string()).collect();
            (demo.name().to_string(), demo.build()?, watched)
        }
    };
    let BuiltModel { model, ids } = built;

    println!(
        "Running {} to t = {} with {} (breakpoint solver {})",
        label, t_end, config.normal_solver, config.breakpoint_solver
    );
    let mut director = Director::new(config, model);
    director.initialize()?;

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let summary = director.run_with_progress(t_end, |p| {
        if last_emit.elapsed().as_millis() >= 100 {
            render_progress(p);
            last_emit = Instant::now();
        }
    })?;
    clear_progress_line();

    let status = if summary.stopped { "Stopped" } else { "Finished" };
    println!(
        "✓ {} at t = {}: {} accepted, {} rejected, {} discarded steps in {:.1} ms",
        status,
        summary.final_time,
        summary.accepted,
        summary.rejected,
        summary.discarded,
        started.elapsed().as_secs_f64() * 1e3
    );
    for name in &watched {
        if let Some(value) = ids.get(name).and_then(|&id| director.output_of(id, 0)) {
            println!("  {:<12} = {:.9}", name, value);
        }
    }
    info!(breakpoints = director.stats().breakpoints_hit, "run complete");

    if let Some(path) = output {
        std::fs::write(path, trajectory_csv(director.record()))?;
        println!(
            "✓ Exported {} samples to {}",
            director.record().len(),
            path.display()
        );
    }
    Ok(())
}

fn cmd_check(config_path: &Path) -> CliResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = DirectorConfig::load_yaml(config_path)?;
    let (normal, breakpoint) = config.solvers()?;
    println!("✓ Configuration is valid");
    println!("  normal solver:     {}", normal);
    println!("  breakpoint solver: {}", breakpoint);
    println!(
        "  steps:             initial {}, min {}, max {}",
        config.initial_step_size, config.min_step_size, config.max_step_size
    );
    println!("  error tolerance:   {}", config.error_tolerance);
    Ok(())
}

fn cmd_solvers() {
    println!("Solvers:");
    for kind in SolverKind::ALL {
        println!(
            "  {:<20} order {}  rounds {}  {}",
            kind.name(),
            kind.order(),
            kind.round_count(),
            if kind.is_adaptive() {
                "adaptive"
            } else {
                "fixed step"
            }
        );
    }
}

/// One column per state; samples taken before a topology edit added states
/// leave the trailing cells empty.
fn trajectory_csv(record: &SimRecord) -> String {
    let width = record.x.iter().map(Vec::len).max().unwrap_or(0);
    let mut csv = String::from("time_s");
    for i in 0..width {
        csv.push_str(&format!(",x{}", i));
    }
    csv.push('\n');
    for (t, x) in record.t.iter().zip(&record.x) {
        csv.push_str(&t.to_string());
        for v in x {
            csv.push_str(&format!(",{}", v));
        }
        csv.push_str(&",".repeat(width - x.len()));
        csv.push('\n');
    }
    csv
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_progress(p: &SimProgress) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] {:>6.2}%  t={:.4}  h={:.3e}  accepted={}  rejected={}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        p.fraction_complete * 100.0,
        p.time,
        p.step_size,
        p.accepted,
        p.rejected
    );
    let _ = io::stdout().flush();
}
