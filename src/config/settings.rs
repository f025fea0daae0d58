//! Runtime configuration settings

use std::path::PathBuf;

/// Runtime settings for the conversion pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// LAME VBR quality in [0, 10)
    pub quality: f32,
    /// Number of parallel conversion workers
    pub jobs: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Re-convert existing destinations
    pub force: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Decoder binary
    pub flac_path: PathBuf,
    /// Encoder binary
    pub lame_path: PathBuf,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let jobs = cli.jobs.unwrap_or_else(num_cpus::get).max(1);

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            quality: cli.quality,
            jobs,
            recursive: cli.recursive,
            force: cli.force,
            show_progress: !cli.quiet,
            flac_path: cli.flac_path.clone(),
            lame_path: cli.lame_path.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./mp3"),
            quality: 2.0,
            jobs: num_cpus::get().max(1),
            recursive: true,
            force: false,
            show_progress: true,
            flac_path: PathBuf::from("flac"),
            lame_path: PathBuf::from("lame"),
        }
    }
}
