use crate::error::{TaskError, TaskResult};
use serde::Deserialize;
use std::{
    fs,
    os::unix::fs::symlink,
    path::{Component, Path, PathBuf},
};

/// A resource under the mount point and where the tool expects to find it,
/// relative to its install directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl LinkSpec {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub(crate) fn validate(&self) -> TaskResult<()> {
        for (field, path) in [("source", &self.source), ("target", &self.target)] {
            let relative = path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            if path.as_os_str().is_empty() || !relative {
                return Err(TaskError::Config(format!(
                    "link {field} {} must be a non-empty relative path",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// (link path, path it points at)
    pub created: Vec<(PathBuf, PathBuf)>,
    pub skipped: Vec<PathBuf>,
}

/// Links every spec's target (under `install_dir`) to its source (under
/// `mount_point`). Targets that already exist, dangling links included, are
/// left untouched.
///
/// Sources are not checked unless `verify_sources` is set, in which case all of
/// them are checked before any link is made.
pub fn link_all(
    mount_point: &Path,
    install_dir: &Path,
    specs: &[LinkSpec],
    verify_sources: bool,
) -> TaskResult<LinkReport> {
    let resolved: Vec<_> = specs
        .iter()
        .map(|spec| (mount_point.join(&spec.source), install_dir.join(&spec.target)))
        .collect();

    if verify_sources {
        for (source, target) in &resolved {
            if !source.exists() {
                return Err(TaskError::MissingLinkSource {
                    source_path: source.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    let mut report = LinkReport::default();
    for (source, target) in resolved {
        // symlink_metadata so a dangling link still counts as present
        if target.symlink_metadata().is_ok() {
            log::debug!("Exists, skipping: {}", target.display());
            report.skipped.push(target);
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(TaskError::io("Failed to create link parent", parent))?;
        }
        symlink(&source, &target).map_err(TaskError::io("Failed to create symlink", &target))?;
        log::info!("  Created: {} -> {}", target.display(), source.display());
        report.created.push((target, source));
    }
    Ok(report)
}
