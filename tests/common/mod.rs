//! Common test utilities and helpers
//!
//! Shared listing fixtures and a workspace helper for the CLI integration
//! tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Baseline listing: package `p` has four functions, `q` exists only here
pub const BEFORE_DUMP: &str = "\
# p
p.f STEXT size=10 args=0x0 locals=0x0
\t0x0000 00000 (/build/abc1234/src/p/p.go:3)\tTEXT\tp.f(SB), ABIInternal, $0-0
\t0x0000 c3
\trel 0+0 t=0 p.f+0
p.g STEXT size=10 args=0x0 locals=0x0
\t0x0000 00000 (/build/abc1234/src/p/p.go:7)\tMOVQ\t$1, AX
p.same STEXT size=4
\t0x0000 00000 (p.go:9)\tRET
p.gone STEXT size=3
\t0x0000 00000 (p.go:11)\tRET
go:cuinfo.packagename.p SDWARFCUINFO dupok size=0
\t0x0000 70
# q
q.h STEXT size=5
\t0x0000 00000 (q.go:1)\tRET
";

/// Listing under test: `p.f` grew, `p.g` changed in place, `p.gone` was
/// replaced by `p.new`
pub const AFTER_DUMP: &str = "\
# p
p.f STEXT size=12 args=0x0 locals=0x0
\t0x0000 00000 (/build/def5678/src/p/p.go:3)\tTEXT\tp.f(SB), ABIInternal, $0-0
\t0x0002 00002 (/build/def5678/src/p/p.go:3)\tNOP
p.g STEXT size=10 args=0x0 locals=0x0
\t0x0000 00000 (/build/def5678/src/p/p.go:7)\tMOVQ\t$2, AX
p.same STEXT size=4
\t0x0000 00000 (p.go:9)\tRET
p.new STEXT size=6
\t0x0000 00000 (p.go:13)\tRET
";

/// Listings whose only difference is the embedded build identifier
pub const TOKEN_BEFORE: &str = "# t\nt.f STEXT size=4\n\tCALL\taaa111.helper(SB)\n";
/// Counterpart of [`TOKEN_BEFORE`]
pub const TOKEN_AFTER: &str = "# t\nt.f STEXT size=4\n\tCALL\tbbb222.helper(SB)\n";

/// Scratch directory that integration tests run the binary in
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Empty workspace
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Workspace holding `before.s` and `after.s`
    pub fn with_dumps(before: &str, after: &str) -> Self {
        let ws = Self::new();
        ws.write("before.s", before);
        ws.write("after.s", after);
        ws
    }

    /// Root of the workspace
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name`, creating parent directories
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// The compilecmp binary, run inside this workspace without colors
    pub fn bin(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_compilecmp"));
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .args(["--color", "never"]);
        cmd
    }
}
