//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: Rewrite annotated sources into plain markup
//! - `init`: Initialize olive configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Build(cmd)) => cmd.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct BuildCommand {
    /// Source directories (default: the first of olive_src, _src, src_olive, src_ that exists)
    pub dirs: Vec<PathBuf>,

    /// Output directory, instead of the one derived from the source name
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Report what would be written without touching the output directory
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn comment annotations into class and style attributes
    Build(BuildCommand),
    /// Initialize a new .oliverc.json configuration file
    Init,
}
