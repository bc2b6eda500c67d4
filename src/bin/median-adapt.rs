use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "median-adapt", version)]
struct Cli {
    /// Log per-channel diagnostics.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Perturb an attack image so the median-filter defense keeps its marked pixels.
    Attack(AttackArgs),
    /// Apply the baseline median-filter defense.
    Defend(DefendArgs),
}

#[derive(Parser, Debug)]
struct Inputs {
    /// Input image (PNG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Marker image; pixels that differ from `--unmarked-value` are attacker-controlled.
    #[arg(long)]
    mask: PathBuf,

    /// Marker value meaning "not marked".
    #[arg(long, default_value_t = 255)]
    unmarked_value: u8,

    /// Window half-height and half-width.
    #[arg(long, num_args = 2, required = true, value_names = ["ROWS", "COLS"])]
    bandwidth: Vec<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct AttackArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Attack config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write run statistics as JSON.
    #[arg(long)]
    stats: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DefendArgs {
    #[command(flatten)]
    inputs: Inputs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Attack(args) => cmd_attack(args, cli.verbose),
        Command::Defend(args) => cmd_defend(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

struct Loaded {
    image: median_adapt::AttackImage,
    mask: median_adapt::TargetMask,
    bandwidth: median_adapt::Bandwidth,
}

fn load_inputs(inputs: &Inputs) -> anyhow::Result<Loaded> {
    let image_bytes = std::fs::read(&inputs.in_path)
        .with_context(|| format!("read image '{}'", inputs.in_path.display()))?;
    let image = median_adapt::decode_attack_image(&image_bytes)?;

    let mask_bytes = std::fs::read(&inputs.mask)
        .with_context(|| format!("read mask '{}'", inputs.mask.display()))?;
    let mask = median_adapt::decode_target_mask(&mask_bytes, inputs.unmarked_value)?;

    let &[rows, cols] = &inputs.bandwidth[..] else {
        anyhow::bail!("--bandwidth expects exactly two values");
    };
    Ok(Loaded {
        image,
        mask,
        bandwidth: median_adapt::Bandwidth::new(rows, cols),
    })
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_attack(args: AttackArgs, verbose: bool) -> anyhow::Result<()> {
    let loaded = load_inputs(&args.inputs)?;
    let mut config = match &args.config {
        Some(path) => median_adapt::AttackConfig::from_path(path)?,
        None => median_adapt::AttackConfig::default(),
    };
    config.verbose |= verbose;

    let attack = median_adapt::AdaptiveMedianAttack::from_config(&config, loaded.bandwidth)?;
    let mut stats = median_adapt::RunStatistics::new();
    let out = attack.counter_attack(&loaded.image, &loaded.mask, &mut stats)?;

    write_output(&args.inputs.out, &median_adapt::encode_png(&out)?)?;
    if let Some(stats_path) = &args.stats {
        let json = serde_json::to_vec_pretty(&stats).context("serialize run statistics")?;
        write_output(stats_path, &json)?;
    }

    eprintln!("wrote {}", args.inputs.out.display());
    Ok(())
}

fn cmd_defend(args: DefendArgs) -> anyhow::Result<()> {
    let loaded = load_inputs(&args.inputs)?;
    let out = median_adapt::defend_image(&loaded.image, &loaded.mask, loaded.bandwidth)?;
    write_output(&args.inputs.out, &median_adapt::encode_png(&out)?)?;
    eprintln!("wrote {}", args.inputs.out.display());
    Ok(())
}
