use crate::error::{MediaError, MediaResult};
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Why a tool invocation did not produce a usable `Output`.
#[derive(Debug)]
pub(crate) enum RunFailure {
    Spawn(std::io::Error),
    TimedOut(Duration),
}

impl RunFailure {
    fn describe(&self, program: &str) -> String {
        match self {
            RunFailure::Spawn(e) => format!("failed to run {program}: {e}"),
            RunFailure::TimedOut(t) => format!("{program} timed out after {t:?}"),
        }
    }
}

/// Runs `program` with captured stdout/stderr.
///
/// The child is killed when the timeout elapses or when the returned future is dropped.
pub(crate) async fn run_captured<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> Result<Output, RunFailure> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(RunFailure::Spawn),
        Err(_) => {
            warn!(program, timeout_ms = timeout.as_millis() as u64, "killing timed out process");
            Err(RunFailure::TimedOut(timeout))
        }
    }
}

/// Runs ffmpeg and returns whatever it wrote to stdout.
pub async fn run_ffmpeg<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> MediaResult<Vec<u8>> {
    debug!(
        args = ?args.iter().map(|a| a.as_ref().to_string_lossy()).collect::<Vec<_>>(),
        "running ffmpeg"
    );
    let output = run_captured(program, args, timeout)
        .await
        .map_err(|f| MediaError::transcode_failed(f.describe(program), None, None))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(MediaError::transcode_failed(
            "ffmpeg exited with non-zero status",
            Some(stderr),
            output.status.code(),
        ));
    }
    if output.stdout.is_empty() {
        return Err(MediaError::transcode_failed(
            "ffmpeg produced no output",
            Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            output.status.code(),
        ));
    }

    Ok(output.stdout)
}

/// Runs ffprobe and returns its stdout. Failures map to `ProbeFailed`.
pub async fn run_ffprobe<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> MediaResult<Vec<u8>> {
    let output = run_captured(program, args, timeout)
        .await
        .map_err(|f| MediaError::probe_failed(f.describe(program), None))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(MediaError::probe_failed(
            "ffprobe exited with non-zero status",
            Some(stderr.trim().to_string()),
        ))
    }
}
