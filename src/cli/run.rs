use std::process::ExitCode;

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{build::build, init::init},
    exit_status::ExitStatus,
};

/// Main entry point for the olive CLI.
///
/// Dispatches to the command handler. Per-file transform failures are
/// reported by the command and turn into [`ExitStatus::Failure`]; an `Err`
/// means the command could not run at all.
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(Arguments { command }) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let status = match command {
        Some(Command::Build(cmd)) => build(cmd)?,
        Some(Command::Init) => init()?,
        None => ExitStatus::Success,
    };
    Ok(status.into())
}
