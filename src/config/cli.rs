//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// flacpress - Batch FLAC to MP3 conversion that keeps your tags
///
/// Converts FLAC files to MP3 with the external `flac` and `lame` tools,
/// mirroring the source directory structure under the output directory and
/// carrying text tags, cover art, and ReplayGain loudness (as an iTunes
/// SoundCheck comment) into ID3v2.4 frames.
#[derive(Parser, Debug)]
#[command(name = "flacpress")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input path (FLAC file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for converted files
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// LAME VBR quality in [0, 10): 0 is best, higher is smaller
    #[arg(long, default_value = "2.0", value_name = "Q")]
    pub quality: f32,

    /// Number of parallel conversions (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value = "true")]
    pub recursive: bool,

    /// Re-convert files whose destination already exists
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Path to the flac decoder binary
    #[arg(long, value_name = "BIN", default_value = "flac")]
    pub flac_path: PathBuf,

    /// Path to the lame encoder binary
    #[arg(long, value_name = "BIN", default_value = "lame")]
    pub lame_path: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}
