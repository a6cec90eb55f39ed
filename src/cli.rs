//! Command-line interface definition
//!
//! Lives in the library so `completions` can generate scripts from the same
//! definition the binary parses.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::diff::VisibilityMode;
use crate::fmt::ColorChoice;
use crate::source::OutputStream;

/// Compare generated code of two compiler builds
///
/// compilecmp reads two assembly listings (before and after a compiler
/// change), matches packages and functions between them, and reports which
/// functions were inserted, deleted or changed, with text size deltas.
#[derive(Parser, Debug)]
#[command(name = "compilecmp", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: ./.compilecmp.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// When to color output
    #[arg(long, global = true, value_enum, value_name = "WHEN")]
    pub color: Option<ColorChoice>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two assembly listings function by function
    Funcs(FuncsArgs),

    /// Compare file sizes of two build output directories
    Sizes {
        /// Directory of the before build
        before_dir: PathBuf,

        /// Directory of the after build
        after_dir: PathBuf,

        /// Only compare files with this extension (e.g. "a" or "o")
        #[arg(long)]
        ext: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `compilecmp funcs`
#[derive(Args, Debug, Default)]
pub struct FuncsArgs {
    /// Listing files, before then after (`-` reads stdin). A side fed by
    /// --before-cmd/--after-cmd takes no positional.
    #[arg(value_name = "DUMP")]
    pub inputs: Vec<String>,

    /// Which changes to print [default: changed, or the config file's mode]
    #[arg(short, long, value_enum)]
    pub mode: Option<VisibilityMode>,

    /// Build identifier of the before build, replaced before hashing
    #[arg(long, value_name = "TOKEN", conflicts_with = "before_ref")]
    pub before_token: Option<String>,

    /// Git ref of the before build; its short hash becomes the token
    #[arg(long, value_name = "REF")]
    pub before_ref: Option<String>,

    /// Build identifier of the after build, replaced before hashing
    #[arg(long, value_name = "TOKEN", conflicts_with = "after_ref")]
    pub after_token: Option<String>,

    /// Git ref of the after build; its short hash becomes the token
    #[arg(long, value_name = "REF")]
    pub after_ref: Option<String>,

    /// Command whose output is the before listing
    #[arg(long, value_name = "CMD")]
    pub before_cmd: Option<String>,

    /// Command whose output is the after listing
    #[arg(long, value_name = "CMD")]
    pub after_cmd: Option<String>,

    /// Output stream of --before-cmd/--after-cmd carrying the listing
    #[arg(long, value_enum, default_value_t = OutputStream::Stdout)]
    pub stream: OutputStream,

    /// Header keyword marking functions [default: STEXT]
    #[arg(long)]
    pub keyword: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_parse_funcs_with_mode_alias() {
        let cli = Cli::try_parse_from(["compilecmp", "funcs", "a.s", "b.s", "--mode", "worse"])
            .unwrap();
        match cli.command {
            Commands::Funcs(args) => {
                assert_eq!(args.inputs, vec!["a.s", "b.s"]);
                assert_eq!(args.mode, Some(VisibilityMode::Bigger));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_token_and_ref_conflict() {
        let result = Cli::try_parse_from([
            "compilecmp",
            "funcs",
            "a.s",
            "b.s",
            "--before-token",
            "abc",
            "--before-ref",
            "HEAD",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["compilecmp", "sizes", "a", "b", "--color", "never", "-v"])
            .unwrap();
        assert_eq!(cli.color, Some(ColorChoice::Never));
        assert!(cli.verbose);
    }
}
