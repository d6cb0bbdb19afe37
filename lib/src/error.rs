use std::{io, path::PathBuf, process::ExitStatus, time::Duration};
use thiserror::Error;

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(
        "Invalid run name \"{0}\": Run name must contain only letters, digits, underscores, and dashes. No spaces are allowed."
    )]
    InvalidRunName(String),
    #[error("At least one sequence input is required")]
    NoSequences,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Preflight command `{command}` failed: {reason}")]
    PreflightFailed { command: String, reason: String },
    #[error("Mount point {} is not empty", .0.display())]
    MountPointNotEmpty(PathBuf),
    #[error("Mount point {} is not writable", .0.display())]
    MountPointReadOnly(PathBuf),
    #[error("Mounting {uri} at {} failed: {reason}", .mount_point.display())]
    MountFailed {
        uri: String,
        mount_point: PathBuf,
        reason: String,
    },
    #[error("Mount point {} was still empty after {}s", .mount_point.display(), .waited.as_secs_f64())]
    ReadinessTimeout {
        mount_point: PathBuf,
        waited: Duration,
    },
    #[error("Link source {} does not exist (wanted by {})", .source_path.display(), .target.display())]
    MissingLinkSource { source_path: PathBuf, target: PathBuf },
    #[error("{}", describe_exit("RoseTTAFold2NA", .code))]
    ToolFailed { code: Option<i32> },
}

impl TaskError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| TaskError::Io {
            context,
            path,
            source,
        }
    }
}

pub(crate) fn describe_exit(process: &str, code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("{process} failed with exit code {code}"),
        None => format!("{process} failed due to external signal"),
    }
}

pub(crate) fn exit_reason(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
