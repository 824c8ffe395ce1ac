use clap::{Parser, Subcommand};
use seqforge_av::actions::MovieCodec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seqforge")]
#[command(author, version, about = "Audit and repackage numbered image sequence datasets")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a dataset for missing and corrupt items
    Check {
        /// Folder of tars or an extracted dataset
        #[arg(required = true)]
        input: PathBuf,

        /// Treat the input as a folder of tars and check their member names
        #[arg(long, conflicts_with = "integrity")]
        tars: bool,

        /// Also validate every image, metadata file and frame
        #[arg(long)]
        integrity: bool,

        /// Expected number of images
        #[arg(long)]
        images: Option<u32>,

        /// Expected frames per animation
        #[arg(long)]
        frames: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a folder of tars into <out>/<name>_processed
    Extract {
        /// Folder containing the tars
        #[arg(required = true)]
        tar_dir: PathBuf,

        /// Parent folder of the extraction (defaults to the current folder)
        out: Option<PathBuf>,

        /// First tar to extract, 1-based in sorted order
        #[arg(long, default_value = "0")]
        from: usize,

        /// Last tar to extract (0 = through the last)
        #[arg(long, default_value = "0")]
        to: usize,

        /// List members while extracting
        #[arg(long)]
        tar_verbose: bool,

        /// Do not overwrite files already extracted
        #[arg(long)]
        keep_old: bool,
    },

    /// Render contact sheets of the images
    Sheets {
        /// Extracted dataset
        #[arg(required = true)]
        input: PathBuf,

        /// Output folder (defaults to the dataset)
        out: Option<PathBuf>,

        /// First sequence number (0 = unbounded)
        #[arg(long, default_value = "0")]
        from: u32,

        /// Last sequence number (0 = unbounded)
        #[arg(long, default_value = "0")]
        to: u32,
    },

    /// Encode a movie for each frame folder
    Movies {
        /// Extracted dataset
        #[arg(required = true)]
        input: PathBuf,

        /// Output folder (defaults to the dataset)
        out: Option<PathBuf>,

        /// First sequence number (0 = unbounded)
        #[arg(long, default_value = "0")]
        from: u32,

        /// Last sequence number (0 = unbounded)
        #[arg(long, default_value = "0")]
        to: u32,

        /// Output codec: h264, h265 or gif
        #[arg(long)]
        codec: Option<MovieCodec>,
    },

    /// Zip dataset folders into size-bounded parts
    Archive {
        /// Extracted dataset
        #[arg(required = true)]
        input: PathBuf,

        /// Output folder (defaults to the dataset)
        out: Option<PathBuf>,

        /// Comma separated targets: all, meta, sheets, images, movies, frames
        #[arg(long, default_value = "all")]
        targets: String,

        /// Produce .zip.001, .zip.002, … instead of .z01, …, .zip
        #[arg(long)]
        numbered: bool,

        /// Maximum part size, e.g. 5g or 700m
        #[arg(long)]
        part_size: Option<String>,
    },

    /// Print evenly spread sequence numbers for spot checks
    Sample {
        /// How many numbers to pick
        #[arg(long, conflicts_with = "step")]
        count: Option<u32>,

        /// Pick every STEP-th number instead
        #[arg(long)]
        step: Option<u32>,

        /// With --step, pick multiples of STEP
        #[arg(long, requires = "step")]
        round: bool,

        /// First number
        #[arg(long, default_value = "1")]
        from: u32,

        /// Last number (defaults to the expected image count)
        #[arg(long)]
        to: Option<u32>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
