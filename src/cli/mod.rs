mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, BuildCommand, Command};
pub use commands::build::{BuildSummary, DirMapping, FileAction, FileOutcome, output_dir_for};
pub use exit_status::ExitStatus;
pub use run::run_cli;
