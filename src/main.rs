use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use levelkit::communication::{list_ports, ProbeDriver, SerialLink};
use levelkit::gcode::{ArcMode, Compensator, SampleProgram};
use levelkit::heightmap::{check_spacing, DeterminedHeightInfo, MachineLimits};
use levelkit::settings::{default_config_path, LevelingConfig};
use levelkit::{init_logging, Point3};

/// GRBL resets when the port opens and ignores input until it has booted
const CONTROLLER_BOOT_DELAY: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "levelkit", version, about = "CNC bed leveling")]
struct Cli {
    #[arg(long, global = true, help = "Configuration file (.toml or .json)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Emit logs as JSON")]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the height map from probe samples
    Heightmap {
        #[arg(short, long, help = "JSON array of {x, y, z} samples")]
        samples: PathBuf,
        #[arg(short, long, help = "JSON machine limits to extrapolate to")]
        limits: Option<PathBuf>,
        #[arg(short, long, help = "Write the height info here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Compensate a G-code program for the probed surface
    Apply {
        #[arg(short, long, help = "G-code program to compensate")]
        program: Option<PathBuf>,
        #[arg(long, value_enum, conflicts_with = "program", help = "Use a built-in program")]
        sample: Option<SampleArg>,
        #[arg(short, long, help = "JSON array of {x, y, z} samples")]
        samples: PathBuf,
        #[arg(short, long, help = "JSON machine limits to extrapolate to")]
        limits: Option<PathBuf>,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_x: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_y: f64,
        #[arg(long, value_enum, help = "Overrides compensation.arc_mode")]
        arc_mode: Option<ArcModeArg>,
        #[arg(short, long, help = "Write the program here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Probe the bed and print the samples as JSON
    Probe {
        #[arg(short, long, help = "Serial port; overrides connection.port")]
        port: Option<String>,
        #[arg(short, long, help = "Baud rate; overrides connection.baud_rate")]
        baud: Option<u32>,
        #[arg(short, long, help = "Write the samples here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// List serial ports that look like CNC controllers
    Ports,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SampleArg {
    ProbeGrid,
    Decorative,
}

impl From<SampleArg> for SampleProgram {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::ProbeGrid => SampleProgram::ProbeGrid,
            SampleArg::Decorative => SampleProgram::Decorative,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ArcModeArg {
    Legacy,
    Interpolate,
}

impl From<ArcModeArg> for ArcMode {
    fn from(arg: ArcModeArg) -> Self {
        match arg {
            ArcModeArg::Legacy => ArcMode::Legacy,
            ArcModeArg::Interpolate => ArcMode::Interpolate,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    tracing::debug!("levelkit {} built {}", levelkit::VERSION, levelkit::BUILD_DATE);

    let config = match &cli.config {
        Some(path) => LevelingConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => LevelingConfig::load_or_default(&default_config_path()?)?,
    };

    match cli.command {
        Command::Heightmap {
            samples,
            limits,
            output,
        } => {
            let determined = determine(&config, &samples, limits.as_deref())?;
            let json = serde_json::to_string_pretty(&determined)?;
            write_output(output.as_deref(), &json)
        }
        Command::Apply {
            program,
            sample,
            samples,
            limits,
            offset_x,
            offset_y,
            arc_mode,
            output,
        } => {
            let determined = determine(&config, &samples, limits.as_deref())?;
            let text = match &program {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => String::new(),
            };

            let mut options = config.compensation.options();
            options.sample_program = sample.map(SampleProgram::from);
            if let Some(mode) = arc_mode {
                options.arc_mode = mode.into();
            }

            let compensator = Compensator::from_height_info(
                determined.effective(),
                Point3::new(offset_x, offset_y, 0.0),
            )?;
            let compensated = compensator.apply(&text, &options)?;
            tracing::info!(
                "Compensated {} of {} lines into {} segments",
                compensated.report.compensated_lines,
                compensated.report.total_lines(),
                compensated.report.segments
            );
            write_output(output.as_deref(), &compensated.gcode)
        }
        Command::Probe { port, baud, output } => {
            let port = port
                .or_else(|| Some(config.connection.port.clone()).filter(|p| !p.is_empty()))
                .context("No serial port given; pass --port or set connection.port")?;
            let baud = baud.unwrap_or(config.connection.baud_rate);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let json = runtime.block_on(probe(&config, &port, baud))?;
            write_output(output.as_deref(), &json)
        }
        Command::Ports => {
            for port in list_ports()? {
                println!("{}\t{}", port.port_name, port.description);
            }
            Ok(())
        }
    }
}

fn determine(
    config: &LevelingConfig,
    samples: &Path,
    limits: Option<&Path>,
) -> Result<DeterminedHeightInfo> {
    let samples = std::fs::read_to_string(samples)
        .with_context(|| format!("Failed to read {}", samples.display()))?;
    let limits: Option<MachineLimits> = match limits {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(serde_json::from_str(&text).context("Invalid machine limits")?)
        }
        None => None,
    };

    let determined = DeterminedHeightInfo::determine(&samples, limits.as_ref())?;
    if config.compensation.validate_spacing {
        let info = &determined.height_info;
        let warnings = check_spacing(
            &info.coordinates,
            &info.stats,
            config.compensation.spacing_tolerance,
        );
        if !warnings.is_empty() {
            tracing::warn!("Height samples have {} uneven gaps", warnings.len());
        }
    }
    Ok(determined)
}

async fn probe(config: &LevelingConfig, port: &str, baud: u32) -> Result<String> {
    let timeout = config.timing.command_timeout();
    let mut link = SerialLink::open(port, baud)?;
    tokio::time::sleep(CONTROLLER_BOOT_DELAY).await;

    if let Err(e) = link.refresh_settings(timeout).await {
        if config.connection.free_move_feedrate.is_none() {
            return Err(e).context("Failed to read controller settings");
        }
        tracing::warn!("Could not read controller settings: {}", e);
    }

    let driver = Arc::new(
        ProbeDriver::new(link)
            .with_command_timeout(timeout)
            .with_free_move_feedrate(config.connection.free_move_feedrate),
    );

    let interrupt = {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling probe run");
                driver.cancel();
            }
        })
    };

    let outcome = driver.probe_bed_level(&config.probe).await;
    interrupt.abort();

    Ok(outcome?.to_json()?)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
