use crate::{
    error::{TaskError, TaskResult},
    sequence::SequenceInput,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

/// Command line for `run_RF2NA.sh <output dir> <prefix>:<path>...`.
#[derive(Clone, Debug)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

/// Exit status of one tool execution.
#[derive(Clone, Copy, Debug)]
pub struct RunResult {
    pub status: ExitStatus,
}

impl RunResult {
    pub fn into_result(self) -> TaskResult<()> {
        if self.status.success() {
            Ok(())
        } else {
            Err(TaskError::ToolFailed {
                code: self.status.code(),
            })
        }
    }
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, output_dir: &Path, inputs: &[SequenceInput]) -> Self {
        let mut args = Vec::with_capacity(inputs.len() + 1);
        args.push(output_dir.as_os_str().to_owned());
        args.extend(inputs.iter().map(SequenceInput::token));
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Runs to completion with inherited stdio.
    pub fn run(&self) -> TaskResult<RunResult> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(TaskError::io("Failed to launch", &self.program))?;
        Ok(RunResult { status })
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::ChainKind;
    use std::{fs, os::unix::fs::PermissionsExt as _};

    #[test]
    fn tokens_follow_input_order() {
        let inputs = [
            SequenceInput::new(ChainKind::Protein, "/root/test/protein.fa"),
            SequenceInput::new(ChainKind::DoubleStrandDna, "/root/test/dna.fa"),
        ];
        let cmd = ToolCommand::new(
            "/opt/RF2NA/run_RF2NA.sh",
            Path::new("/root/outputs/run_1"),
            &inputs,
        );
        assert_eq!(
            cmd.args(),
            ["/root/outputs/run_1", "P:/root/test/protein.fa", "D:/root/test/dna.fa"]
                .map(OsString::from)
        );
        assert_eq!(
            cmd.to_string(),
            "/opt/RF2NA/run_RF2NA.sh /root/outputs/run_1 P:/root/test/protein.fa D:/root/test/dna.fa"
        );
    }

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("tool.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn run_passes_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "echo \"$@\" > \"$1/args.txt\"");
        let inputs = [SequenceInput::new(ChainKind::Rna, "rna.fa")];
        let result = ToolCommand::new(tool, dir.path(), &inputs).run().unwrap();
        result.into_result().unwrap();
        let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), format!("{} R:rna.fa", dir.path().display()));
    }

    #[test]
    fn non_utf8_input_reaches_tool_unchanged() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt as _};
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "printf '%s' \"$2\" > \"$1/token\"");
        let inputs = [SequenceInput::new(
            ChainKind::Protein,
            OsStr::from_bytes(b"/in/prot\xffein.fa"),
        )];
        let cmd = ToolCommand::new(tool, dir.path(), &inputs);
        assert_eq!(cmd.args()[1].as_bytes(), b"P:/in/prot\xffein.fa");
        cmd.run().unwrap().into_result().unwrap();
        assert_eq!(
            fs::read(dir.path().join("token")).unwrap(),
            b"P:/in/prot\xffein.fa"
        );
    }

    #[test]
    fn nonzero_exit_is_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "exit 3");
        let result = ToolCommand::new(tool, dir.path(), &[]).run().unwrap();
        assert!(matches!(
            result.into_result(),
            Err(TaskError::ToolFailed { code: Some(3) })
        ));
    }

    #[test]
    fn missing_tool_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ToolCommand::new(dir.path().join("absent.sh"), dir.path(), &[]).run();
        assert!(matches!(result, Err(TaskError::Io { .. })));
    }
}
