pub use crate::{
    RunName,
    config::TaskConfig,
    error::{TaskError, TaskResult},
    invoke::{RunResult, ToolCommand},
    link::{LinkReport, LinkSpec, link_all},
    mount::{CommandMounter, MountTarget, Mounter, wait_until_ready},
    notify::{JsonLinesNotifier, LogNotifier, Notification, Notifier, Severity},
    sequence::{ChainKind, SequenceInput},
    task::{RunRequest, Task, TaskOutput},
};
