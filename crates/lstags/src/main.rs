use anyhow::{Context, Result};
use clap::Parser;
use shared::{format_duration, LoftyMetadataSource, MetadataSource, RawMetadata};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lstags")]
#[command(about = "List the tags build-feed reads from MP3 files")]
struct Args {
    /// Audio files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print one JSON object per file instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let source = LoftyMetadataSource::new();

    for file in &args.files {
        let metadata = source
            .read(file)
            .with_context(|| format!("Failed to read tags from {}", file.display()))?;

        if args.json {
            println!("{}", to_json(file, &metadata));
        } else {
            print_text(file, &metadata);
        }
    }

    Ok(())
}

fn to_json(file: &Path, metadata: &RawMetadata) -> serde_json::Value {
    serde_json::json!({
        "file": file.display().to_string(),
        "title": metadata.title,
        "artist": metadata.artist,
        "summary": metadata.summary,
        "duration_secs": metadata.duration.map(|d| d.as_secs()),
        "pub_date": metadata.pub_date.map(|d| d.to_rfc3339()),
        "file_size": metadata.file_size,
        "guid": metadata.guid,
    })
}

fn print_text(file: &Path, metadata: &RawMetadata) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("{}", file.display());
    println!("  Title:    {}", show(&metadata.title));
    println!("  Artist:   {}", show(&metadata.artist));
    println!("  Summary:  {}", show(&metadata.summary));
    println!(
        "  Duration: {}",
        metadata
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Date:     {}",
        metadata
            .pub_date
            .map(|d| d.to_rfc2822())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Size:     {}",
        metadata
            .file_size
            .map(|s| format!("{} bytes", s))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  GUID:     {}", show(&metadata.guid));
}
