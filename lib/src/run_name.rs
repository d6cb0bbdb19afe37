use crate::error::TaskError;
use regex::Regex;
use std::{fmt::Display, str::FromStr, sync::LazyLock};

static RUN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("run name pattern is valid"));

/// Letters, digits, underscores and dashes only; it also names the per-run
/// output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RunName {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if RUN_NAME.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(TaskError::InvalidRunName(s.to_string()))
        }
    }
}

impl Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
