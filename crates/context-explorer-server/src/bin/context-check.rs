//! Local existence check for `context.json`.
//!
//! Prints the manifest's byte length when present, or an absence message.
//! With `--validate` it also parses the file the same way the server does.

use anyhow::Result;
use clap::Parser;
use context_explorer::{AppConfig, EntrySlot, Manifest};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "context-check")]
#[command(about = "Check for a context.json manifest in a directory")]
struct Args {
    /// Directory to look in (defaults to the current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Parse the manifest and report its entries
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let dir = match args.path {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let file = dir.join(AppConfig::MANIFEST_FILE_NAME);

    if !file.is_file() {
        println!("{} not found", AppConfig::MANIFEST_FILE_NAME);
        return Ok(ExitCode::SUCCESS);
    }

    let bytes = std::fs::read(&file)?;
    println!(
        "{} found. length: {}",
        AppConfig::MANIFEST_FILE_NAME,
        bytes.len()
    );

    if !args.validate {
        return Ok(ExitCode::SUCCESS);
    }

    let body = String::from_utf8_lossy(&bytes);
    let manifest = match Manifest::parse(&body) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(warning) = &manifest.warning {
        println!("{}", warning);
    }

    let invalid: Vec<(&str, &str)> = manifest
        .context
        .iter()
        .filter_map(|(slug, slot)| match slot {
            EntrySlot::Invalid { message } => Some((slug.as_str(), message.as_str())),
            EntrySlot::Valid(_) => None,
        })
        .collect();

    println!(
        "{} entr{} ({} invalid)",
        manifest.len(),
        if manifest.len() == 1 { "y" } else { "ies" },
        invalid.len()
    );
    for (slug, message) in invalid {
        println!("  {}: {}", slug, message);
    }

    Ok(ExitCode::SUCCESS)
}
