//! `reclist` command line.
//!
//! Usage:
//!   reclist generate -i syllables.json [-o OUT_DIR] [-m CVVC|VCV|VCV_WITH_VC]
//!                    [-b BPM] [-l 2..8] [-s] [-d DEPTH] [-r MAX_REDUNDANCY]
//!                    [-p default|no-in-turn] [-c config.json] [--guide]
//!   reclist from_presamp -i presamp.ini [-o syllables.json]
//!   reclist to_presamp   -i syllables.json [-o presamp.ini]
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=reclist=debug`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reclist::{dictionary, guide, presamp, GenerateOptions, Generator, Mode, Policy, SyllableIndex};

const SCRIPT_FILE: &str = "reclist.txt";
const OTO_FILE: &str = "oto.ini";
const GUIDE_FILE: &str = "guide.wav";

#[derive(Parser)]
#[command(name = "reclist", version, about, disable_version_flag = true)]
struct Cli {
    /// Print the version and exit.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a CVVC or VCV recording list.
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),

    /// Convert a presamp.ini into a JSON syllable dictionary.
    #[command(name = "from_presamp", visible_alias = "fp")]
    FromPresamp(IoArgs),

    /// Convert a JSON syllable dictionary into a presamp.ini.
    #[command(name = "to_presamp", visible_alias = "tp")]
    ToPresamp(IoArgs),
}

#[derive(Args)]
struct IoArgs {
    /// Input file path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Pair semantics; default CVVC.
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// `no-in-turn` skips patterned in-turn lines.
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,

    /// Guide-track tempo; default 120.
    #[arg(short, long)]
    bpm: Option<u32>,

    /// Maximum syllables per line (2–8); default 6.
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(2..=8))]
    max_length: Option<u8>,

    /// Prefer patterns with three consecutive syllables on one pivot (SSS).
    #[arg(short = 's', long = "SSS-first", alias = "sss-first")]
    sss_first: bool,

    /// Candidate patterns examined per in-turn attempt; default 100.
    #[arg(short = 'd', long)]
    iter_depth: Option<usize>,

    /// Padding syllables tolerated for fluency; default 50.
    #[arg(short = 'r', long)]
    max_redundancy: Option<usize>,

    /// JSON file with default generation options; flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write a metronome guide WAV long enough for every line.
    #[arg(long)]
    guide: bool,
}

impl GenerateArgs {
    fn options(&self) -> Result<GenerateOptions> {
        let mut options = match &self.config {
            Some(path) => GenerateOptions::load(path)?,
            None => GenerateOptions::default(),
        };
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(policy) = self.policy {
            options.policy = policy;
        }
        if let Some(bpm) = self.bpm {
            options.bpm = bpm;
        }
        if let Some(len) = self.max_length {
            options.max_length = usize::from(len);
        }
        if self.sss_first {
            options.sss_first = true;
        }
        if let Some(depth) = self.iter_depth {
            options.iter_depth = depth;
        }
        if let Some(redundancy) = self.max_redundancy {
            options.max_redundancy = redundancy;
        }
        Ok(options)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// `.ini` inputs are read as presamp, anything else as JSON.
fn load_table(path: &Path) -> Result<SyllableIndex> {
    let is_ini = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ini"));
    if is_ini {
        presamp::load(path)
    } else {
        dictionary::load(path)
    }
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("Cannot write {}", path.display()))
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let options = args.options()?;
    let table = load_table(&args.io.input)?;

    let out_dir = match &args.io.output {
        Some(dir) => dir.clone(),
        None => args
            .io
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !out_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Cannot create output directory: {}", out_dir.display()))?;
    }

    println!("Input  : {}", args.io.input.display());
    println!("Output : {}", out_dir.display());
    println!("Syllables: {}", table.len());

    let generation = Generator::new(table)
        .generate(&options)
        .context("Generation failed")?;

    write_lines(&out_dir.join(SCRIPT_FILE), &generation.script_lines())?;
    write_lines(&out_dir.join(OTO_FILE), &generation.oto_lines())?;

    if args.guide {
        guide::write_guide(&out_dir.join(GUIDE_FILE), options.bpm, generation.guide_beats())?;
    }

    let stats = generation.stats;
    println!();
    println!("Lines            : {}", generation.lines.len());
    println!("Perfect fluent   : {}", stats.perfect_fluent);
    println!("In-turn fluent   : {}", stats.in_turn_fluent);
    println!("Not fluent (syl.): {}", stats.not_fluent);
    println!("Redundancy       : {}", stats.redundancy);
    Ok(())
}

fn run_from_presamp(args: &IoArgs) -> Result<()> {
    let table = presamp::load(&args.input)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("json"));
    dictionary::save(&table, &output)?;
    println!("Saved {} syllables to {}", table.len(), output.display());
    Ok(())
}

fn run_to_presamp(args: &IoArgs) -> Result<()> {
    let table = dictionary::load(&args.input)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("ini"));
    presamp::save(&table, &output)?;
    println!("Saved {} syllables to {}", table.len(), output.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        None => {
            println!(
                "GUI access is currently not supported. \
                 Please use --help to view the CLI manual."
            );
            Ok(())
        }
        Some(Command::Generate(args)) => run_generate(args),
        Some(Command::FromPresamp(args)) => run_from_presamp(args),
        Some(Command::ToPresamp(args)) => run_to_presamp(args),
    }
}
