use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::{
    fs,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};
use wpilog_sysid::{
    pipeline::AnalysisWorker,
    sysid::{SynthesisConfig, SysIdDocument, SysIdSignals, TestPhase},
};

/// Converts a SysId characterization datalog into a SysId JSON file
#[derive(Parser, Debug)]
#[command(name = "wpilog-sysid", version)]
struct Cli {
    /// Path to the .wpilog file
    input: PathBuf,

    /// Where to write the JSON, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the signals in the log and exit
    #[arg(long)]
    list: bool,

    /// Name of the velocity signal
    #[arg(long, required_unless_present = "list")]
    velocity: Option<String>,

    /// Name of the position signal
    #[arg(long, required_unless_present = "list")]
    position: Option<String>,

    /// Name of the voltage signal
    #[arg(long, required_unless_present = "list")]
    voltage: Option<String>,

    /// JSON file with synthesis settings (timestampScale, units, unitsPerRotation)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds per log timestamp unit, overrides the config file
    #[arg(long)]
    timestamp_scale: Option<f64>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    info!("Importing datalog at {}", cli.input.display());

    let buffer: Arc<[u8]> = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?
        .into();

    let worker = AnalysisWorker::spawn(buffer);
    while let Ok(fraction) = worker.progress().recv() {
        eprint!("\rDecoding {:>3.0}%", fraction * 100.0);
    }
    eprintln!();

    let (_header, catalog) = worker.join().context("decoding datalog")?;

    if cli.list {
        let mut stdout = io::stdout().lock();
        for name in catalog.names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    let velocity = cli.velocity.context("--velocity is required")?;
    let position = cli.position.context("--position is required")?;
    let voltage = cli.voltage.context("--voltage is required")?;

    let signals = SysIdSignals::select(&catalog, &velocity, &position, &voltage)?;

    let mut config = match &cli.config {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader::<_, SynthesisConfig>(BufReader::new(file))
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => SynthesisConfig::default(),
    };
    if let Some(scale) = cli.timestamp_scale {
        config.timestamp_scale = scale;
    }
    let document = SysIdDocument::build(&signals, &config)?;

    for phase in TestPhase::ALL {
        info!(
            "{}: {} frames",
            phase.document_key(),
            document.phase(phase).len()
        );
    }

    match cli.output {
        Some(path) => {
            let file = fs::File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            document.to_writer_pretty(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            document.to_writer_pretty(&mut stdout)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
