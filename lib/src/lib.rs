//! Runs RoseTTAFold2NA against a mounted database filesystem.
//!
//! A run validates its name, creates the per-run output directory, checks the
//! GPU toolchain, mounts the remote filesystem and waits for it to populate,
//! links weights and databases into the tool's install tree, then invokes
//! `run_RF2NA.sh` with one `<prefix>:<path>` token per chain.

pub mod config;
pub mod error;
pub mod invoke;
pub mod link;
pub mod mount;
pub mod notify;
pub mod prelude;
mod run_name;
pub mod sequence;
pub mod task;

pub use run_name::RunName;
