//! Main entry point for the storezip CLI application.
//!
//! This binary packs files and directories into a stored ZIP archive,
//! written either to a local file or to standard output.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, warn};

use storezip::{
    ArchiveBuilder, Cli, EntrySource, ExclusionPolicy, LocalFileWriter, PlacedEntry, SourceEntry,
    StdoutWriter, StreamingZipWriter, WriteSink,
};

/// Application entry point.
///
/// Parses command-line arguments, collects the entries to archive and
/// writes the archive to the requested destination.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_level());

    let entries = collect_entries(&cli).await?;
    if entries.is_empty() {
        bail!("Nothing to archive");
    }

    let (placed, archive_len) = if cli.is_stdout() {
        let (placed, sink) = write_archive(&cli, entries, StdoutWriter::new()).await?;
        (placed, sink.bytes_written())
    } else {
        let output = Path::new(&cli.archive);
        // The new archive may sit inside a walked directory.
        let entries = without_output(entries, output).await;
        // Written to a temporary sibling, so a failed run leaves any
        // existing archive in place.
        let sink = LocalFileWriter::create(output).await?;
        let (placed, sink) = write_archive(&cli, entries, sink).await?;
        let len = sink.bytes_written();
        sink.persist().await?;
        (placed, len)
    };

    if !cli.is_stdout() && (cli.list || cli.verbose) {
        list_entries(&placed, cli.verbose);
    }

    if !cli.is_quiet() {
        println!(
            "  created: {} ({} files, {})",
            cli.archive,
            placed.len(),
            format_size(archive_len)
        );
    }

    Ok(())
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the CLI value. Logs go
/// to stderr so they never mix with an archive written to stdout.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Walk the command-line paths and return the entries to archive.
async fn collect_entries(cli: &Cli) -> Result<Vec<SourceEntry>> {
    let mut policy = if cli.no_default_excludes {
        ExclusionPolicy::new()
    } else {
        ExclusionPolicy::default()
    };
    for pattern in &cli.exclude {
        policy = policy.exclude(pattern.clone());
    }

    let mut source = EntrySource::new(policy).junk_paths(cli.junk_paths);
    for path in &cli.paths {
        source.add_path(path).await?;
    }

    info!(count = source.len(), "collected entries");
    Ok(source.into_entries())
}

/// Drop any entry that is the output archive itself.
async fn without_output(entries: Vec<SourceEntry>, output: &Path) -> Vec<SourceEntry> {
    let Ok(output) = tokio::fs::canonicalize(output).await else {
        return entries;
    };

    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        match tokio::fs::canonicalize(&entry.path).await {
            Ok(path) if path == output => debug!(name = %entry.name, "skipping output archive"),
            _ => kept.push(entry),
        }
    }
    kept
}

/// Read every entry and write the archive to `sink`.
///
/// Files that disappear or cannot be read after being collected are
/// skipped with a warning.
///
/// # Returns
///
/// The placed entries (with local header offsets) and the flushed sink.
async fn write_archive<S: WriteSink>(
    cli: &Cli,
    entries: Vec<SourceEntry>,
    sink: S,
) -> Result<(Vec<PlacedEntry>, S)> {
    if cli.stream {
        let mut writer = StreamingZipWriter::new(sink).with_utf8_names(cli.utf8);
        for entry in &entries {
            let Some(content) = read_entry(entry).await else {
                continue;
            };
            writer
                .add(entry.name.clone(), &content)
                .await
                .with_context(|| format!("failed to add {}", entry.name))?;
            info!(name = %entry.name, size = content.len(), "added");
        }

        let placed = writer.entries().to_vec();
        let sink = writer.finish().await.context("failed to finish archive")?;
        Ok((placed, sink))
    } else {
        let mut builder = ArchiveBuilder::new().with_utf8_names(cli.utf8);
        for entry in &entries {
            let Some(content) = read_entry(entry).await else {
                continue;
            };
            let size = content.len();
            builder
                .add(entry.name.clone(), content)
                .with_context(|| format!("failed to add {}", entry.name))?;
            info!(name = %entry.name, size, "added");
        }

        let mut sink = sink;
        builder
            .write_to(&mut sink)
            .await
            .context("failed to write archive")?;
        Ok((builder.placements(), sink))
    }
}

async fn read_entry(entry: &SourceEntry) -> Option<Vec<u8>> {
    match entry.read().await {
        Ok(content) => Some(content),
        Err(err) => {
            warn!(name = %entry.name, error = %err, "skipping");
            None
        }
    }
}

/// List archived entries.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just entry names, one per line
/// - Verbose format (`-v`): Table with size, CRC-32 and local header offset
fn list_entries(placed: &[PlacedEntry], verbose: bool) {
    if !verbose {
        for entry in placed {
            println!("{}", entry.name());
        }
        return;
    }

    println!("{:>10}  {:>8}  {:>10}  Name", "Length", "CRC-32", "Offset");
    println!("{}", "-".repeat(50));

    let mut total = 0u64;
    for entry in placed {
        println!(
            "{:>10}  {:08x}  {:>10}  {}",
            entry.size(),
            entry.crc32(),
            entry.offset(),
            entry.name()
        );
        total += entry.size() as u64;
    }

    println!("{}", "-".repeat(50));
    println!("{:>10}  {:>22}  {} files", total, "", placed.len());
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
