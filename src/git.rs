//! Git ref resolution for build tokens
//!
//! The short commit hash of each build tends to leak into its assembly
//! (paths, version strings), so it doubles as the per-side token the
//! normalizer replaces.

use crate::infra::{CommandExecutor, RealCommandExecutor};
use thiserror::Error;

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command failed with an error message
    #[error("git rev-parse {reference} failed: {stderr}")]
    CommandFailed {
        /// Ref that was being resolved
        reference: String,
        /// Trimmed stderr of the git command
        stderr: String,
    },

    /// The git binary is not installed
    #[error("git not found on PATH")]
    NotInstalled,

    /// Git printed nothing for the ref
    #[error("git returned an empty hash for {0}")]
    EmptyHash(String),

    /// Git output contained invalid UTF-8
    #[error("Invalid UTF-8 in git output")]
    InvalidUtf8,

    /// IO error occurred while executing git command
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Git repository interface with dependency injection for testability
pub struct GitRepository<CE: CommandExecutor = RealCommandExecutor> {
    cmd_executor: CE,
}

impl GitRepository<RealCommandExecutor> {
    /// Create a new GitRepository with real command execution
    pub fn new() -> Self {
        Self {
            cmd_executor: RealCommandExecutor,
        }
    }
}

impl Default for GitRepository<RealCommandExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<CE: CommandExecutor> GitRepository<CE> {
    /// Create a GitRepository with a custom command executor (for testing)
    pub fn with_executor(cmd_executor: CE) -> Self {
        Self { cmd_executor }
    }

    /// Resolve `reference` to its abbreviated commit hash
    pub fn short_hash(&self, reference: &str) -> Result<String, GitError> {
        let output = match self
            .cmd_executor
            .execute(|cmd| cmd.args(["rev-parse", "--short", reference]), "git")
        {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GitError::NotInstalled);
            }
            Err(e) => return Err(GitError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                reference: reference.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let hash = String::from_utf8(output.stdout)
            .map_err(|_| GitError::InvalidUtf8)?
            .trim()
            .to_string();

        if hash.is_empty() {
            return Err(GitError::EmptyHash(reference.to_string()));
        }
        log::debug!("resolved {} to {}", reference, hash);
        Ok(hash)
    }
}
