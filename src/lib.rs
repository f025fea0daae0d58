//! flacpress - Batch FLAC to MP3 Conversion
//!
//! A command-line utility that converts FLAC libraries to MP3 with the
//! external `flac` and `lame` tools, mirroring the source directory layout
//! and carrying metadata across: text tags, cover art, and ReplayGain
//! loudness re-encoded as an iTunes SoundCheck (iTunNORM) comment.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: FLAC file scanning
//! - `planner`: Destination path planning and directory creation
//! - `tags`: Vorbis comment reading and ID3v2 translation
//! - `loudness`: ReplayGain to SoundCheck conversion
//! - `transcode`: Per-file decode/encode subprocess pipe
//! - `pipeline`: Parallel batch orchestration
//!
//! # Example
//!
//! ```no_run
//! use flacpress::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Conversion failed");
//! println!("Converted {} files", result.converted);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod loudness;
pub mod pipeline;
pub mod planner;
pub mod tags;
pub mod transcode;
pub mod types;

// Re-export key types at crate root
pub use error::{FlacpressError, Result};
pub use types::{CancelFlag, Image, TagSet, TranscodeJob};
