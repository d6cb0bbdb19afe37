use crate::{
    error::{TaskError, TaskResult},
    link::LinkSpec,
};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CONFIG_ENV: &str = "RF2NA_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "RF2NA.toml";

/// Everything the task would otherwise hard-code: mount source, install
/// location, output root and timings.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TaskConfig {
    pub mount: MountConfig,
    pub tool: ToolConfig,
    pub output: OutputConfig,
    pub link: LinkConfig,
    pub notify: NotifyConfig,
    /// Diagnostic commands run before mounting; any failure aborts the run
    pub preflight: Vec<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MountConfig {
    pub program: PathBuf,
    pub options: String,
    pub uri: String,
    pub mount_point: PathBuf,
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ToolConfig {
    pub install_dir: PathBuf,
    pub script: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub root: PathBuf,
    pub default_destination: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LinkConfig {
    pub verify_sources: bool,
    pub links: Vec<LinkSpec>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NotifyConfig {
    /// Append notifications as JSON lines here in addition to logging them
    pub jsonl: Option<PathBuf>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            mount: MountConfig::default(),
            tool: ToolConfig::default(),
            output: OutputConfig::default(),
            link: LinkConfig::default(),
            notify: NotifyConfig::default(),
            preflight: vec![
                vec!["nvidia-smi".to_string()],
                vec!["nvcc".to_string(), "--version".to_string()],
            ],
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("mount.objectivefs"),
            options: "mtplus,noatime,nodiratime,noratelimit,freebw,hpc".to_string(),
            uri: "s3://objectivefs-proteintools/rosettafoldaa".to_string(),
            mount_point: PathBuf::from("ofs"),
            max_wait: Duration::from_secs(15),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("/tmp/docker-build/work/RoseTTAFold2NA"),
            script: PathBuf::from("run_RF2NA.sh"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/root/outputs"),
            default_destination: "latch:///RosettaFold2NA".to_string(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        let links = [
            ("RF2NA_weights/RF2NA_apr23.pt", "network/weights/RF2NA_apr23.pt"),
            ("UniRef30_2020_06", "UniRef30_2020_06"),
            ("bfd", "bfd"),
            ("pdb100_2021Mar03", "pdb100_2021Mar03"),
            ("RNA", "RNA"),
        ]
        .into_iter()
        .map(|(source, target)| LinkSpec::new(source, target))
        .collect();
        Self {
            verify_sources: false,
            links,
        }
    }
}

impl TaskConfig {
    /// Resolves the config file: explicit path, then `$RF2NA_CONFIG`, then
    /// `RF2NA.toml` if present. Falls back to defaults when none applies.
    pub fn load(explicit: Option<&Path>) -> TaskResult<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => match env::var_os(CONFIG_ENV) {
                Some(v) => Some(PathBuf::from(v)),
                None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
            },
        };
        let config = match path {
            Some(path) => {
                log::debug!("Reading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> TaskResult<Self> {
        let contents =
            fs::read_to_string(path).map_err(TaskError::io("Failed to read config file", path))?;
        toml::from_str(&contents).map_err(|source| TaskError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> TaskResult<()> {
        let mount = &self.mount;
        if mount.max_wait.is_zero() {
            return Err(TaskError::Config("mount.max_wait must be positive".into()));
        }
        if mount.poll_interval.is_zero() {
            return Err(TaskError::Config(
                "mount.poll_interval must be positive".into(),
            ));
        }
        if mount.poll_interval > mount.max_wait {
            return Err(TaskError::Config(
                "mount.poll_interval must not exceed mount.max_wait".into(),
            ));
        }
        if mount.uri.trim().is_empty() {
            return Err(TaskError::Config("mount.uri must not be empty".into()));
        }
        if let Some(cmd) = self.preflight.iter().find(|cmd| cmd.is_empty()) {
            return Err(TaskError::Config(format!(
                "preflight contains an empty command: {cmd:?}"
            )));
        }
        for link in &self.link.links {
            link.validate()?;
        }
        Ok(())
    }

    /// Absolute or install-relative path of the prediction script.
    pub fn tool_path(&self) -> PathBuf {
        self.tool.install_dir.join(&self.tool.script)
    }
}
