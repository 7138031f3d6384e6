//! Dump a BYML/CRG1 file's node tree as JSON.

use anyhow::{bail, Context, Result};
use byml_rs::{parse_with_options, FileKind, ParseOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bymldump")]
#[command(about = "Parse a BYML/CRG1 file and print its node tree as JSON")]
struct Args {
    /// Input file
    file: PathBuf,

    /// File variant (byml, crg1)
    #[arg(short, long, default_value = "crg1")]
    format: String,

    /// Header carries a path-table offset field
    #[arg(long)]
    path_table: bool,

    /// Single-line output instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

/// Parse file variant from CLI string
fn parse_kind(s: &str) -> Result<FileKind> {
    match s.to_lowercase().as_str() {
        "byml" => Ok(FileKind::Byml),
        "crg1" => Ok(FileKind::Crg1),
        _ => bail!("invalid format '{}'. Valid options: byml, crg1", s),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let kind = parse_kind(&args.format)?;
    let data =
        std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;

    let options = ParseOptions {
        has_path_table: args.path_table,
    };
    let tree = parse_with_options(&data, kind, options)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    let json = if args.compact {
        serde_json::to_string(&tree)?
    } else {
        serde_json::to_string_pretty(&tree)?
    };
    println!("{}", json);
    Ok(())
}
