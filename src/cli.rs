use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "storezip")]
#[command(version)]
#[command(about = "Pack files into a stored (uncompressed) ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  storezip site.zip client server      pack two directories\n  \
  storezip -x '*.map' dist.zip public  pack public/ without source maps\n  \
  storezip -x '*.log' -x tmp out.zip .  repeat -x for several patterns\n  \
  storezip - docs | ssh host 'cat > docs.zip'   write the archive to stdout")]
pub struct Cli {
    /// Output archive path, or "-" for stdout
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Files and directories to add
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Exclude entries matching PATTERN during directory walks (repeatable)
    #[arg(short = 'x', value_name = "PATTERN", num_args = 1)]
    pub exclude: Vec<String>,

    /// Junk paths (store file names only)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Do not skip hidden files, node_modules, archives and the like
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Mark file names as UTF-8 (general purpose bit 11)
    #[arg(long)]
    pub utf8: bool,

    /// Write entries as they are read instead of building the archive in memory
    #[arg(long)]
    pub stream: bool,

    /// List archived entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely and log progress
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_stdout(&self) -> bool {
        self.archive == "-"
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.is_stdout()
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() {
            "off"
        } else if self.quiet > 0 {
            "error"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}
