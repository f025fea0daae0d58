//! Per-file transcode job
//!
//! Each job decodes the source with `flac` and encodes with `lame`, the two
//! processes connected stdout-to-stdin so they run concurrently. Once both
//! have exited successfully the translated ID3 tag is written into the
//! finished MP3. Cancellation terminates both processes and removes the
//! partial destination; so does any failure after the destination was
//! opened. The source file is never modified.

use crate::config::Settings;
use crate::error::{FlacpressError, Result};
use crate::tags;
use crate::types::{CancelFlag, TranscodeJob};
use id3::Version;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// How often an in-flight job polls for subprocess exit and cancellation.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Convert one source file into its destination.
pub fn run(job: &TranscodeJob, settings: &Settings, cancel: &CancelFlag) -> Result<()> {
    // Read the tag snapshot up front; an unreadable source must not leave
    // any trace at the destination.
    let source_tags = tags::read_source(&job.source)?;

    let mut decoder = decode_command(&settings.flac_path, &job.source)
        .spawn()
        .map_err(|e| spawn_error(&settings.flac_path, &job.source, e))?;
    let decoder_stderr = StderrCapture::start(&mut decoder);

    let decoded = match decoder.stdout.take() {
        Some(stream) => stream,
        None => {
            terminate(&mut decoder);
            return Err(FlacpressError::subprocess(
                "flac",
                &job.source,
                "decoder stdout unavailable",
            ));
        }
    };

    let mut encoder = match encode_command(&settings.lame_path, &job.destination, settings.quality)
        .stdin(Stdio::from(decoded))
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            terminate(&mut decoder);
            return Err(spawn_error(&settings.lame_path, &job.source, e));
        }
    };
    let encoder_stderr = StderrCapture::start(&mut encoder);

    let (decoder_status, encoder_status) =
        match wait_for_pair(&mut decoder, &mut encoder, cancel) {
            Ok(statuses) => statuses,
            Err(e) => {
                remove_partial(&job.destination);
                return Err(e);
            }
        };

    if !decoder_status.success() {
        remove_partial(&job.destination);
        return Err(FlacpressError::subprocess(
            "flac",
            &job.source,
            describe_exit(decoder_status, decoder_stderr),
        ));
    }
    if !encoder_status.success() {
        remove_partial(&job.destination);
        return Err(FlacpressError::subprocess(
            "lame",
            &job.source,
            describe_exit(encoder_status, encoder_stderr),
        ));
    }

    // Both codecs have exited; the destination holds complete audio. Tag it.
    let tag = match tags::translate(&source_tags) {
        Ok(tag) => tag,
        Err(e) => {
            remove_partial(&job.destination);
            return Err(e);
        }
    };
    if let Err(e) = tag.write_to_path(&job.destination, Version::Id3v24) {
        remove_partial(&job.destination);
        return Err(FlacpressError::output_error(
            job.destination.clone(),
            std::io::Error::other(e.to_string()),
        ));
    }

    debug!(
        "Converted {} -> {} ({} frames)",
        job.source.display(),
        job.destination.display(),
        tag.frames().count()
    );
    Ok(())
}

/// `flac --decode --stdout --silent <source>`, raw audio on stdout.
fn decode_command(flac_path: &Path, source: &Path) -> Command {
    let mut cmd = Command::new(flac_path);
    cmd.arg("--decode")
        .arg("--stdout")
        .arg("--silent")
        .arg(source)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// `lame --quiet -V <q> --id3v2-only - <dest>`, raw audio on stdin.
fn encode_command(lame_path: &Path, destination: &Path, quality: f32) -> Command {
    let mut cmd = Command::new(lame_path);
    cmd.arg("--quiet")
        .arg("-V")
        .arg(quality.to_string())
        .arg("--id3v2-only")
        .arg("-")
        .arg(destination)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd
}

/// Wait for both codec processes, polling the cancel flag between checks.
///
/// On cancellation both ends of the pipe are terminated symmetrically and
/// `Cancelled` is returned.
fn wait_for_pair(
    decoder: &mut Child,
    encoder: &mut Child,
    cancel: &CancelFlag,
) -> Result<(ExitStatus, ExitStatus)> {
    let mut decoder_status = None;
    let mut encoder_status = None;

    loop {
        if cancel.is_cancelled() {
            terminate(decoder);
            terminate(encoder);
            return Err(FlacpressError::Cancelled);
        }

        if decoder_status.is_none() {
            decoder_status = decoder.try_wait()?;
        }
        if encoder_status.is_none() {
            encoder_status = encoder.try_wait()?;
        }
        if let (Some(d), Some(e)) = (decoder_status, encoder_status) {
            return Ok((d, e));
        }

        std::thread::sleep(WAIT_POLL_INTERVAL);
    }
}

/// Kill and reap; the process may already have exited.
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Background reader keeping a child's stderr pipe drained.
///
/// A codec that writes more stderr than the pipe buffer holds would block
/// mid-write and never exit; the capture thread reads continuously and hands
/// the accumulated text back once the child is done. The thread ends on its
/// own when the pipe closes, so dropping an unfinished capture is fine.
struct StderrCapture(Option<std::thread::JoinHandle<String>>);

impl StderrCapture {
    fn start(child: &mut Child) -> Self {
        let handle = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });
        Self(handle)
    }

    fn finish(self) -> String {
        self.0
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }
}

/// Describe a non-zero exit, including whatever the tool wrote to stderr.
fn describe_exit(status: ExitStatus, stderr: StderrCapture) -> String {
    let stderr = stderr.finish();
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{status}")
    } else {
        format!("{status}: {stderr}")
    }
}

fn spawn_error(tool: &Path, source: &Path, err: std::io::Error) -> FlacpressError {
    let reason = if err.kind() == std::io::ErrorKind::NotFound {
        "not found\n  Tip: install it or point --flac-path/--lame-path at the binary".to_string()
    } else {
        err.to_string()
    };
    FlacpressError::subprocess(tool.display().to_string(), source, reason)
}

/// Remove a partially-written destination; a missing file is fine.
fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial output {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::PathBuf;

    fn args_of(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    #[test]
    fn test_decode_command_shape() {
        let cmd = decode_command(Path::new("flac"), Path::new("in/x.flac"));
        assert_eq!(cmd.get_program(), OsStr::new("flac"));
        let expected: Vec<&OsStr> = ["--decode", "--stdout", "--silent", "in/x.flac"]
            .iter()
            .map(OsStr::new)
            .collect();
        assert_eq!(args_of(&cmd), expected);
    }

    #[test]
    fn test_encode_command_shape() {
        let cmd = encode_command(Path::new("lame"), Path::new("out/x.mp3"), 2.0);
        assert_eq!(cmd.get_program(), OsStr::new("lame"));
        let expected: Vec<&OsStr> = ["--quiet", "-V", "2", "--id3v2-only", "-", "out/x.mp3"]
            .iter()
            .map(OsStr::new)
            .collect();
        assert_eq!(args_of(&cmd), expected);
    }

    #[test]
    fn test_encode_command_keeps_fractional_quality() {
        let cmd = encode_command(Path::new("lame"), Path::new("x.mp3"), 4.5);
        assert!(args_of(&cmd).contains(&OsStr::new("4.5")));
    }

    #[test]
    fn test_cancelled_job_reports_cancellation() {
        // A pre-set flag must stop the job at the first poll, regardless of
        // whether the codec binaries exist on this machine.
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("x.flac");
        std::fs::write(&source, b"not a real flac").unwrap();

        let job = TranscodeJob {
            source,
            destination: dir.path().join("x.mp3"),
        };
        let settings = Settings {
            input: dir.path().to_path_buf(),
            output: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = run(&job, &settings, &cancel).unwrap_err();
        // The bogus source fails to parse before the subprocesses spawn
        assert!(matches!(err, FlacpressError::SourceRead { .. }));
        assert!(!job.destination.exists());
    }

    #[test]
    fn test_remove_partial_tolerates_missing_file() {
        remove_partial(&PathBuf::from("/nonexistent/out.mp3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_noisy_stderr_does_not_stall_wait() {
        // Each child floods stderr well past the OS pipe buffer before
        // exiting; with the pipe drained they must still be reaped.
        let spawn_noisy = || {
            let mut child = Command::new("sh")
                .args(["-c", "head -c 262144 /dev/zero | tr '\\0' 'x' >&2"])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .spawn()
                .unwrap();
            let capture = StderrCapture::start(&mut child);
            (child, capture)
        };

        let (mut decoder, decoder_stderr) = spawn_noisy();
        let (mut encoder, encoder_stderr) = spawn_noisy();
        let cancel = CancelFlag::new();

        let (d, e) = wait_for_pair(&mut decoder, &mut encoder, &cancel).unwrap();
        assert!(d.success());
        assert!(e.success());
        assert_eq!(decoder_stderr.finish().len(), 262144);
        assert_eq!(encoder_stderr.finish().len(), 262144);
    }
}
