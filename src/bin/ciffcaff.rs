use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "ciffcaff", version, about = "Convert CIFF/CAFF images to JPEG")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a CIFF still image to JPEG.
    Ciff(ConvertArgs),
    /// Convert the first animation frame of a CAFF container to JPEG.
    Caff(ConvertArgs),
    /// Decode a .ciff or .caff file and print its metadata as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input file.
    path: PathBuf,

    /// Output JPEG path (defaults to the input path with a .jpg extension).
    #[arg(long)]
    out: Option<PathBuf>,

    /// JPEG quality, 1-100.
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Input file (.ciff or .caff).
    path: PathBuf,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Args, Debug)]
struct LimitArgs {
    /// Largest pixel plane to allocate, in bytes.
    #[arg(long, default_value_t = ciffcaff::DecodeLimits::DEFAULT_MAX_PIXEL_BYTES)]
    max_pixel_bytes: u64,

    /// Largest CAFF creator name to allocate, in bytes.
    #[arg(long, default_value_t = ciffcaff::DecodeLimits::DEFAULT_MAX_CREATOR_LEN)]
    max_creator_len: u64,
}

impl LimitArgs {
    fn to_limits(&self) -> ciffcaff::DecodeLimits {
        ciffcaff::DecodeLimits {
            max_pixel_bytes: self.max_pixel_bytes,
            max_creator_len: self.max_creator_len,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Ciff(args) => cmd_convert(ciffcaff::InputKind::Ciff, args),
        Command::Caff(args) => cmd_convert(ciffcaff::InputKind::Caff, args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_convert(kind: ciffcaff::InputKind, args: ConvertArgs) -> anyhow::Result<()> {
    let opts = ciffcaff::ConvertOpts {
        limits: args.limits.to_limits(),
        jpeg: ciffcaff::JpegOpts {
            quality: args.quality,
            overwrite: !args.no_overwrite,
        },
        out: args.out,
    };

    let report = ciffcaff::convert_file(&args.path, kind, &opts)
        .with_context(|| format!("convert {} '{}'", kind.extension(), args.path.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} bytes)",
        report.out_path.display(),
        report.width,
        report.height,
        report.bytes_written
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let kind = ciffcaff::InputKind::from_path(&args.path)
        .with_context(|| unsupported_extension(&args.path))?;

    let report = ciffcaff::inspect_file(&args.path, kind, &args.limits.to_limits())
        .with_context(|| format!("inspect '{}'", args.path.display()))?;

    let json = serde_json::to_string_pretty(&report).context("serialize inspect report")?;
    println!("{json}");
    Ok(())
}

fn unsupported_extension(path: &Path) -> String {
    format!(
        "'{}' is neither a .ciff nor a .caff file",
        path.display()
    )
}
