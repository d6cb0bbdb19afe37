use crate::error::{TaskError, TaskResult, exit_reason};
use std::{
    ffi::{CString, OsString},
    fs, io,
    os::unix::ffi::OsStrExt as _,
    path::{Path, PathBuf},
    process::Command,
    thread,
    time::{Duration, Instant},
};

/// A remote filesystem and the local directory it is mounted on.
#[derive(Clone, Debug)]
pub struct MountTarget {
    pub uri: String,
    pub mount_point: PathBuf,
}

impl MountTarget {
    pub fn new(uri: impl Into<String>, mount_point: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            mount_point: mount_point.into(),
        }
    }

    /// Creates the mount point if needed and checks that it is an empty,
    /// writable directory.
    pub fn prepare(&self) -> TaskResult<()> {
        let dir = &self.mount_point;
        fs::create_dir_all(dir).map_err(TaskError::io("Failed to create mount point", dir))?;
        if has_entries(dir)? {
            return Err(TaskError::MountPointNotEmpty(dir.clone()));
        }
        if !writable(dir)? {
            return Err(TaskError::MountPointReadOnly(dir.clone()));
        }
        Ok(())
    }
}

/// Whether this process may write to `dir`, judged by the kernel rather than
/// the mode bits (root can write a 0555 directory).
fn writable(dir: &Path) -> TaskResult<bool> {
    let c_path = CString::new(dir.as_os_str().as_bytes()).map_err(|e| TaskError::Io {
        context: "Invalid mount point",
        path: dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    if unsafe { libc::access(c_path.as_ptr(), libc::W_OK) } == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EACCES) | Some(libc::EROFS) => Ok(false),
        _ => Err(TaskError::Io {
            context: "Failed to check access to mount point",
            path: dir.to_path_buf(),
            source: err,
        }),
    }
}

pub trait Mounter {
    /// Issues the mount once. Readiness is checked separately.
    fn mount(&self, target: &MountTarget) -> TaskResult<()>;
}

/// Mounts by running `<program> -o <options> <uri> <mount point>`.
#[derive(Clone, Debug)]
pub struct CommandMounter {
    program: PathBuf,
    options: String,
}

impl CommandMounter {
    pub fn new(program: impl Into<PathBuf>, options: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            options: options.into(),
        }
    }

    pub fn args(&self, target: &MountTarget) -> Vec<OsString> {
        vec![
            "-o".into(),
            self.options.clone().into(),
            target.uri.clone().into(),
            target.mount_point.clone().into(),
        ]
    }
}

impl Mounter for CommandMounter {
    fn mount(&self, target: &MountTarget) -> TaskResult<()> {
        let failed = |reason: String| TaskError::MountFailed {
            uri: target.uri.clone(),
            mount_point: target.mount_point.clone(),
            reason,
        };
        let status = Command::new(&self.program)
            .args(self.args(target))
            .status()
            .map_err(|e| failed(format!("could not run {}: {e}", self.program.display())))?;
        if !status.success() {
            return Err(failed(format!(
                "{} exited with {}",
                self.program.display(),
                exit_reason(status)
            )));
        }
        Ok(())
    }
}

/// Polls `dir` every `poll_interval` until it holds at least one entry.
/// Returns how long that took, or `ReadinessTimeout` once `max_wait` passes
/// without an entry being seen. Read errors (ENOTCONN, EIO from a fresh FUSE
/// mount) count as not ready yet.
pub fn wait_until_ready(
    dir: &Path,
    max_wait: Duration,
    poll_interval: Duration,
) -> TaskResult<Duration> {
    poll_until(max_wait, poll_interval, || match has_entries(dir) {
        Ok(ready) => ready,
        Err(e) => {
            log::debug!("Mount point not readable yet: {e}");
            false
        }
    })
    .ok_or_else(|| TaskError::ReadinessTimeout {
        mount_point: dir.to_path_buf(),
        waited: max_wait,
    })
}

/// Calls `ready` until it returns true or `max_wait` elapses, sleeping
/// `poll_interval` between calls but never past the deadline. Stops calling
/// `ready` as soon as it succeeds.
pub(crate) fn poll_until(
    max_wait: Duration,
    poll_interval: Duration,
    mut ready: impl FnMut() -> bool,
) -> Option<Duration> {
    let start = Instant::now();
    loop {
        if ready() {
            return Some(start.elapsed());
        }
        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            return None;
        }
        thread::sleep(poll_interval.min(max_wait - elapsed));
    }
}

fn has_entries(dir: &Path) -> TaskResult<bool> {
    let mut entries = fs::read_dir(dir).map_err(TaskError::io("Failed to read mount point", dir))?;
    Ok(entries.next().is_some())
}

/// Debug listing of a directory's immediate entries.
pub(crate) fn log_listing(dir: &Path) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match fs::read_dir(dir) {
        Ok(entries) => {
            log::debug!("Contents of {}:", dir.display());
            let mut names: Vec<_> = entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            for name in names {
                log::debug!("  {name}");
            }
        }
        Err(e) => log::debug!("Could not list {}: {e}", dir.display()),
    }
}
