//! Command-line argument model: a single top-level struct with global flags plus
//! the one thing this tool actually does — there is no subcommand tree here, since
//! the scope is one front end, not a multi-command toolbox.

use std::path::PathBuf;

use clap::{ArgEnum, Parser};

#[derive(Parser)]
#[clap(name = "smalltalk-syntax")]
#[clap(bin_name = "smalltalk-syntax")]
#[clap(version)]
pub struct CliArgs {
    /// Source file to lex and parse.
    pub path: PathBuf,

    /// What to print: the token stream, or a debug rendering of the syntax tree.
    #[clap(long, arg_enum, default_value = "ast")]
    pub mode: Mode,

    /// Enable a verbose, multi-line logging format.
    #[clap(long, global = true)]
    pub verbose: bool,

    /// Colorize diagnostics written to stderr.
    #[clap(long, arg_enum, global = true, default_value = "auto")]
    pub colors: Colors,
}

#[derive(Clone, Copy, ArgEnum)]
pub enum Mode {
    Tokens,
    Ast,
}

#[derive(Clone, Copy, ArgEnum)]
pub enum Colors {
    /// Colorize only when stderr is a terminal.
    Auto,
    Always,
    Never,
}
