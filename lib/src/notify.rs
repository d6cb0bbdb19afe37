use serde::Serialize;
use std::{
    fmt::Display,
    fs::OpenOptions,
    io::Write as _,
    path::{Path, PathBuf},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{tag}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Operator-facing channel. Delivery is best effort and never fails the caller.
pub trait Notifier {
    fn notify(&self, severity: Severity, notification: &Notification);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, notification: &Notification) {
        let Notification { title, body } = notification;
        match severity {
            Severity::Info => log::info!("{title}: {body}"),
            Severity::Warning => log::warn!("{title}: {body}"),
            Severity::Error => log::error!("{title}: {body}"),
        }
    }
}

/// Logs, then appends `{"severity", "title", "body"}` as one JSON line to a file.
#[derive(Clone, Debug)]
pub struct JsonLinesNotifier {
    path: PathBuf,
}

#[derive(Serialize)]
struct Line<'a> {
    severity: Severity,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl JsonLinesNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, severity: Severity, notification: &Notification) -> std::io::Result<()> {
        let line = serde_json::to_string(&Line {
            severity,
            notification,
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl Notifier for JsonLinesNotifier {
    fn notify(&self, severity: Severity, notification: &Notification) {
        LogNotifier.notify(severity, notification);
        if let Err(e) = self.append(severity, notification) {
            log::warn!(
                "Failed to write notification to {}: {e}",
                self.path.display()
            );
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, severity: Severity, notification: &Notification) {
        (**self).notify(severity, notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn json_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = JsonLinesNotifier::new(dir.path().join("messages.jsonl"));
        notifier.notify(
            Severity::Error,
            &Notification::new("ObjectiveFS Mount failed", "Failed mount"),
        );
        notifier.notify(Severity::Info, &Notification::new("Done", "ok"));

        let contents = fs::read_to_string(notifier.path()).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["severity"], "error");
        assert_eq!(lines[0]["title"], "ObjectiveFS Mount failed");
        assert_eq!(lines[0]["body"], "Failed mount");
        assert_eq!(lines[1]["severity"], "info");
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = JsonLinesNotifier::new(dir.path().join("missing/dir/messages.jsonl"));
        notifier.notify(Severity::Warning, &Notification::new("t", "b"));
        assert!(!notifier.path().exists());
    }
}
