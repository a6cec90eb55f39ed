//! Completions command implementation
//!
//! Handles the `compilecmp completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;

use crate::cli::Cli;

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// compilecmp completions bash > /etc/bash_completion.d/compilecmp
///
/// # Zsh
/// compilecmp completions zsh > ~/.zfunc/_compilecmp
///
/// # Fish
/// compilecmp completions fish > ~/.config/fish/completions/compilecmp.fish
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

/// Write the completion script for `shell` to `out`
pub fn write_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "compilecmp", out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_mention_subcommands_for_every_shell() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
            let mut out = Vec::new();
            write_completions(shell, &mut out);
            let script = String::from_utf8(out).unwrap();
            assert!(script.contains("compilecmp"), "{:?}", shell);
            assert!(script.contains("funcs"), "{:?}", shell);
            assert!(script.contains("sizes"), "{:?}", shell);
        }
    }

    #[test]
    fn test_bash_completions_offer_mode_values() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("--mode"));
        assert!(script.contains("bigger"));
    }
}
