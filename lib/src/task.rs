use crate::{
    config::TaskConfig,
    error::{TaskError, TaskResult, exit_reason},
    invoke::ToolCommand,
    link::link_all,
    mount::{MountTarget, Mounter, log_listing, wait_until_ready},
    notify::{Notification, Notifier, Severity},
    run_name::RunName,
    sequence::SequenceInput,
};
use std::{
    fs,
    path::{self, PathBuf},
    process::Command,
};

pub struct RunRequest {
    pub run_name: RunName,
    pub sequences: Vec<SequenceInput>,
    /// Remote destination for the output root; the configured default if unset
    pub destination: Option<String>,
}

/// Local output root paired with where the caller wants it persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskOutput {
    pub local: PathBuf,
    pub remote: String,
}

pub struct Task<M, N> {
    config: TaskConfig,
    mounter: M,
    notifier: N,
}

impl<M: Mounter, N: Notifier> Task<M, N> {
    pub fn new(config: TaskConfig, mounter: M, notifier: N) -> Self {
        Self {
            config,
            mounter,
            notifier,
        }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Runs every stage in order. Any failure is reported to the notifier
    /// before being returned.
    pub fn run(&self, request: &RunRequest) -> TaskResult<TaskOutput> {
        self.execute(request).inspect_err(|e| self.report(e))
    }

    /// The tool command a run would execute, without touching the filesystem.
    pub fn plan(&self, request: &RunRequest) -> ToolCommand {
        ToolCommand::new(
            self.config.tool_path(),
            &self.run_output_dir(&request.run_name),
            &request.sequences,
        )
    }

    fn run_output_dir(&self, run_name: &RunName) -> PathBuf {
        self.config.output.root.join(run_name.as_str())
    }

    fn execute(&self, request: &RunRequest) -> TaskResult<TaskOutput> {
        if request.sequences.is_empty() {
            return Err(TaskError::NoSequences);
        }

        log::info!("Creating local directories");
        let run_dir = self.run_output_dir(&request.run_name);
        fs::create_dir_all(&run_dir)
            .map_err(TaskError::io("Failed to create output directory", &run_dir))?;

        self.preflight()?;

        log::info!("Mounting {}", self.config.mount.uri);
        let mount_point = path::absolute(&self.config.mount.mount_point).map_err(TaskError::io(
            "Failed to resolve mount point",
            &self.config.mount.mount_point,
        ))?;
        let target = MountTarget::new(self.config.mount.uri.clone(), mount_point);
        target.prepare()?;
        self.mounter.mount(&target)?;
        let waited = wait_until_ready(
            &target.mount_point,
            self.config.mount.max_wait,
            self.config.mount.poll_interval,
        )?;
        log::info!(
            "Mount ready after {:.1}s at {}",
            waited.as_secs_f64(),
            target.mount_point.display()
        );
        log_listing(&target.mount_point);

        log::info!("Linking databases");
        let report = link_all(
            &target.mount_point,
            &self.config.tool.install_dir,
            &self.config.link.links,
            self.config.link.verify_sources,
        )?;
        log::info!(
            "Symlinks complete: {} created, {} already present",
            report.created.len(),
            report.skipped.len()
        );
        log_listing(&self.config.tool.install_dir);

        log::info!("Running RoseTTAFold2NA");
        let command = self.plan(request);
        log::info!("Command: {command}");
        command.run()?.into_result()?;
        log::info!("RoseTTAFold2NA finished");

        Ok(TaskOutput {
            local: self.config.output.root.clone(),
            remote: request
                .destination
                .clone()
                .unwrap_or_else(|| self.config.output.default_destination.clone()),
        })
    }

    fn preflight(&self) -> TaskResult<()> {
        for argv in &self.config.preflight {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            let command = argv.join(" ");
            log::info!("Preflight: {command}");
            let status = Command::new(program).args(args).status().map_err(|e| {
                TaskError::PreflightFailed {
                    command: command.clone(),
                    reason: e.to_string(),
                }
            })?;
            if !status.success() {
                return Err(TaskError::PreflightFailed {
                    command,
                    reason: exit_reason(status),
                });
            }
        }
        Ok(())
    }

    fn report(&self, error: &TaskError) {
        log::error!("{error}");
        let notification = match error {
            TaskError::ReadinessTimeout { .. } => {
                Notification::new("ObjectiveFS Mount failed", "Failed mount")
            }
            TaskError::MountFailed { .. } => {
                Notification::new("ObjectiveFS Mount failed", error.to_string())
            }
            TaskError::ToolFailed { .. } => {
                Notification::new("RosettaFold2NA failed", error.to_string())
            }
            _ => Notification::new("RosettaFold2NA task failed", error.to_string()),
        };
        self.notifier.notify(Severity::Error, &notification);
    }
}

impl<F> Mounter for F
where
    F: Fn(&MountTarget) -> TaskResult<()>,
{
    fn mount(&self, target: &MountTarget) -> TaskResult<()> {
        self(target)
    }
}
