//! Funcs command implementation
//!
//! Handles the `compilecmp funcs` command: scan both listings concurrently,
//! join packages by name, diff every matched package and print the
//! function report followed by the per-package text size table.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;

use crate::cli::FuncsArgs;
use crate::config::{ConfigFile, ScannerSettings};
use crate::diff::{render_package, DiffReporter, PackageDiff, VisibilityMode};
use crate::error::CompileCmpError;
use crate::fmt::Palette;
use crate::git::GitRepository;
use crate::infra::CommandExecutor;
use crate::join::{join_streams, Unmatched};
use crate::scanner::{Normalizer, ScannerConfig, Side};
use crate::sizes::SizeAggregator;
use crate::source::{check_sources, DumpSource, OutputStream};

/// Fully resolved settings of one `funcs` run
#[derive(Debug, Clone)]
pub struct FuncsOptions {
    /// Baseline listing
    pub before: DumpSource,
    /// Listing under test
    pub after: DumpSource,
    /// Build token of the baseline (empty for none)
    pub before_token: String,
    /// Build token of the build under test (empty for none)
    pub after_token: String,
    /// Which changes to print
    pub mode: VisibilityMode,
    /// Scanner and normalization settings shared by both sides
    pub scanner: ScannerSettings,
    /// Output styling
    pub palette: Palette,
}

impl FuncsOptions {
    /// Merge command-line arguments over the configuration file
    ///
    /// Positionals are handed out in order to the sides that have no
    /// producer command. Tokens given as git refs are resolved through `git`.
    pub fn resolve<CE: CommandExecutor>(
        args: FuncsArgs,
        config: &ConfigFile,
        palette: Palette,
        git: &GitRepository<CE>,
    ) -> Result<Self> {
        let mut inputs = args.inputs.into_iter();
        let before = side_source(args.before_cmd.as_deref(), &mut inputs, args.stream, Side::Before)?;
        let after = side_source(args.after_cmd.as_deref(), &mut inputs, args.stream, Side::After)?;
        if let Some(extra) = inputs.next() {
            return Err(CompileCmpError::Usage(format!("unexpected argument '{}'", extra)).into());
        }

        let before_token =
            resolve_token(args.before_token, args.before_ref.as_deref(), Side::Before, git)?;
        let after_token =
            resolve_token(args.after_token, args.after_ref.as_deref(), Side::After, git)?;

        let mut scanner = config.scanner.clone();
        if let Some(keyword) = args.keyword {
            scanner.keyword = keyword;
        }
        scanner
            .validate()
            .map_err(|e| CompileCmpError::Usage(e.to_string()))?;

        Ok(Self {
            before,
            after,
            before_token,
            after_token,
            mode: args.mode.unwrap_or(config.mode),
            scanner,
            palette,
        })
    }
}

fn side_source(
    command: Option<&str>,
    inputs: &mut impl Iterator<Item = String>,
    stream: OutputStream,
    side: Side,
) -> Result<DumpSource> {
    if let Some(line) = command {
        return DumpSource::from_command_line(line, stream)
            .map_err(|e| CompileCmpError::from_source(side, e).into());
    }
    match inputs.next() {
        Some(arg) => Ok(DumpSource::from_arg(&arg)),
        None => Err(CompileCmpError::Usage(format!(
            "missing {} listing (give a file, '-' or --{}-cmd)",
            side, side
        ))
        .into()),
    }
}

/// Pick the build token: explicit token, else the short hash of a git ref,
/// else none
pub fn resolve_token<CE: CommandExecutor>(
    token: Option<String>,
    reference: Option<&str>,
    side: Side,
    git: &GitRepository<CE>,
) -> Result<String> {
    if let Some(token) = token {
        return Ok(token);
    }
    match reference {
        Some(reference) => git
            .short_hash(reference)
            .map_err(|source| CompileCmpError::Git { side, source }.into()),
        None => Ok(String::new()),
    }
}

/// What a comparison found, for callers that need more than the text
#[derive(Debug, Default)]
pub struct FuncsReport {
    /// Per-package diffs, keyed and ordered by package name
    pub packages: BTreeMap<String, PackageDiff>,
    /// Packages that appeared on only one side
    pub unmatched: Unmatched,
}

impl FuncsReport {
    /// Size table over every matched package
    pub fn sizes(&self) -> SizeAggregator {
        let mut sizes = SizeAggregator::new("text size");
        for diff in self.packages.values() {
            sizes.add_row(diff.total.clone());
        }
        sizes
    }
}

/// Compare two listings and print the report to stdout
///
/// # Examples
///
/// ```no_run
/// use compilecmp::cmd::funcs::{cmd_funcs, FuncsOptions};
/// use compilecmp::config::ScannerSettings;
/// use compilecmp::diff::VisibilityMode;
/// use compilecmp::fmt::Palette;
/// use compilecmp::source::DumpSource;
///
/// cmd_funcs(FuncsOptions {
///     before: DumpSource::from_arg("before.s"),
///     after: DumpSource::from_arg("after.s"),
///     before_token: String::new(),
///     after_token: String::new(),
///     mode: VisibilityMode::Changed,
///     scanner: ScannerSettings::default(),
///     palette: Palette::plain(),
/// })?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_funcs(options: FuncsOptions) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    compare_funcs(options, &mut out)?;
    Ok(())
}

/// Compare two listings, writing the report to `out`
pub fn compare_funcs<W: Write>(options: FuncsOptions, out: &mut W) -> Result<FuncsReport> {
    if options.mode == VisibilityMode::Disabled {
        log::info!("function comparison disabled");
        return Ok(FuncsReport::default());
    }

    check_sources(&options.before, &options.after)
        .map_err(|e| CompileCmpError::from_source(Side::After, e))?;

    let palette = options.palette;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let report = match runtime.block_on(run_comparison(options)) {
        Ok(report) => report,
        Err(e) => {
            // A stdin reader may sit in a blocking read that abort cannot reach
            runtime.shutdown_background();
            return Err(e);
        }
    };

    write_report(&report, &palette, out).context("Failed to write report")?;
    Ok(report)
}

/// Render a finished comparison
pub fn write_report<W: Write>(
    report: &FuncsReport,
    palette: &Palette,
    out: &mut W,
) -> std::io::Result<()> {
    for diff in report.packages.values() {
        out.write_all(render_package(diff, palette).as_bytes())?;
    }

    writeln!(out)?;
    report.sizes().flush(out)?;

    for name in &report.unmatched.only_before {
        writeln!(out, "{}", palette.dim(&format!("package {} only in before build", name)))?;
    }
    for name in &report.unmatched.only_after {
        writeln!(out, "{}", palette.dim(&format!("package {} only in after build", name)))?;
    }
    Ok(())
}

fn scanner_config(settings: &ScannerSettings, token: &str) -> Result<ScannerConfig> {
    let normalizer = Normalizer::new(token, &settings.normalize_options())
        .with_context(|| format!("invalid build token '{}'", token))?;
    Ok(ScannerConfig {
        keyword: settings.keyword.clone(),
        normalizer,
    })
}

async fn run_comparison(options: FuncsOptions) -> Result<FuncsReport> {
    let capacity = options.scanner.channel_capacity;
    let before_config = scanner_config(&options.scanner, &options.before_token)?;
    let after_config = scanner_config(&options.scanner, &options.after_token)?;

    let (before_rx, before_task) = options
        .before
        .start(before_config, capacity)
        .await
        .map_err(|e| CompileCmpError::from_source(Side::Before, e))?;
    let (after_rx, after_task) = match options.after.start(after_config, capacity).await {
        Ok(started) => started,
        Err(e) => {
            before_task.abort();
            return Err(CompileCmpError::from_source(Side::After, e).into());
        }
    };

    let reporter = DiffReporter::new(options.mode);
    let mut packages = BTreeMap::new();
    let joined = join_streams(before_rx, after_rx, |pair| {
        let diff = reporter.diff(&pair);
        packages.insert(diff.package.clone(), diff);
    })
    .await;

    let unmatched = match joined {
        Ok(unmatched) => unmatched,
        Err(e) => {
            // A producer may be blocked reading its input rather than sending
            before_task.abort();
            after_task.abort();
            return Err(CompileCmpError::from(e).into());
        }
    };

    for (side, task) in [(Side::Before, before_task), (Side::After, after_task)] {
        match task.await {
            Ok(count) => log::debug!("{} side produced {} packages", side, count),
            Err(e) => log::warn!("{} producer task ended abnormally: {}", side, e),
        }
    }

    Ok(FuncsReport {
        packages,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const BEFORE: &str = "\
# p
p.f STEXT size=10 args=0x0 locals=0x0
\t0x0000 00000 (/src/abc1234/p.go:3)\tTEXT\tp.f(SB), ABIInternal, $0-0
\t0x0000 c3
\trel 0+0 t=R_CALL x
p.g STEXT size=10
\t0x0000 00000 (p.go:7)\tMOVQ\t$1, AX
p.same STEXT size=4
\t0x0000 00000 (p.go:9)\tRET
p.gone STEXT size=3
\t0x0000 00000 (p.go:11)\tRET
# q
q.only STEXT size=5
\t0x0000 00000 (q.go:1)\tRET
";

    const AFTER: &str = "\
# p
p.f STEXT size=12 args=0x0 locals=0x0
\t0x0000 00000 (/src/def5678/p.go:3)\tTEXT\tp.f(SB), ABIInternal, $0-0
\t0x0000 00000 (/src/def5678/p.go:4)\tNOP
p.g STEXT size=10
\t0x0000 00000 (p.go:7)\tMOVQ\t$2, AX
p.same STEXT size=4
\t0x0000 00000 (p.go:9)\tRET
p.new STEXT size=6
\t0x0000 00000 (p.go:13)\tRET
";

    fn write_dumps(dir: &Path) -> (DumpSource, DumpSource) {
        let before = dir.join("before.s");
        let after = dir.join("after.s");
        std::fs::write(&before, BEFORE).unwrap();
        std::fs::write(&after, AFTER).unwrap();
        (DumpSource::File(before), DumpSource::File(after))
    }

    fn options(dir: &Path, mode: VisibilityMode) -> FuncsOptions {
        let (before, after) = write_dumps(dir);
        FuncsOptions {
            before,
            after,
            before_token: "abc1234".to_string(),
            after_token: "def5678".to_string(),
            mode,
            scanner: ScannerSettings::default(),
            palette: Palette::plain(),
        }
    }

    fn run(mode: VisibilityMode) -> (String, FuncsReport) {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let report = compare_funcs(options(dir.path(), mode), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    struct FakeGit;

    impl CommandExecutor for FakeGit {
        fn output(&self, cmd: &mut std::process::Command) -> std::io::Result<std::process::Output> {
            let reference = cmd.get_args().last().unwrap().to_string_lossy().to_string();
            Ok(std::process::Output {
                status: crate::infra::mock_exit_status(if reference == "bad" { 128 } else { 0 }),
                stdout: format!("{}0\n", &reference[..reference.len().min(6)]).into_bytes(),
                stderr: b"fatal: bad revision".to_vec(),
            })
        }
    }

    fn args(inputs: &[&str]) -> FuncsArgs {
        FuncsArgs {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_uses_config_defaults() {
        let config = ConfigFile {
            mode: VisibilityMode::Stats,
            ..Default::default()
        };
        let git = GitRepository::with_executor(FakeGit);
        let opts = FuncsOptions::resolve(args(&["a.s", "-"]), &config, Palette::plain(), &git).unwrap();
        assert_eq!(opts.before, DumpSource::from_arg("a.s"));
        assert_eq!(opts.after, DumpSource::Stdin);
        assert_eq!(opts.mode, VisibilityMode::Stats);
        assert_eq!(opts.before_token, "");
    }

    #[test]
    fn test_resolve_cli_overrides_config() {
        let mut a = args(&["a.s", "b.s"]);
        a.mode = Some(VisibilityMode::All);
        a.keyword = Some("TEXT".to_string());
        a.before_ref = Some("main".to_string());
        a.after_token = Some("tok".to_string());
        let git = GitRepository::with_executor(FakeGit);
        let opts = FuncsOptions::resolve(a, &ConfigFile::default(), Palette::plain(), &git).unwrap();
        assert_eq!(opts.mode, VisibilityMode::All);
        assert_eq!(opts.scanner.keyword, "TEXT");
        assert_eq!(opts.before_token, "main0");
        assert_eq!(opts.after_token, "tok");
    }

    #[test]
    fn test_resolve_command_side_takes_no_positional() {
        let mut a = args(&["after.s"]);
        a.before_cmd = Some("go build -gcflags=-S".to_string());
        a.stream = OutputStream::Stderr;
        let git = GitRepository::with_executor(FakeGit);
        let opts = FuncsOptions::resolve(a, &ConfigFile::default(), Palette::plain(), &git).unwrap();
        assert!(matches!(opts.before, DumpSource::Command { stream: OutputStream::Stderr, .. }));
        assert_eq!(opts.after, DumpSource::from_arg("after.s"));
    }

    #[test]
    fn test_resolve_argument_count_errors() {
        let git = GitRepository::with_executor(FakeGit);
        let config = ConfigFile::default();
        let missing = FuncsOptions::resolve(args(&["a.s"]), &config, Palette::plain(), &git).unwrap_err();
        assert!(missing.to_string().contains("missing after listing"));
        let extra =
            FuncsOptions::resolve(args(&["a.s", "b.s", "c.s"]), &config, Palette::plain(), &git)
                .unwrap_err();
        assert!(extra.to_string().contains("unexpected argument 'c.s'"));
    }

    #[test]
    fn test_resolve_bad_ref_is_git_error() {
        let mut a = args(&["a.s", "b.s"]);
        a.after_ref = Some("bad".to_string());
        let git = GitRepository::with_executor(FakeGit);
        let err = FuncsOptions::resolve(a, &ConfigFile::default(), Palette::plain(), &git).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CompileCmpError>(),
            Some(CompileCmpError::Git { side: Side::After, .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_empty_keyword() {
        let mut a = args(&["a.s", "b.s"]);
        a.keyword = Some(String::new());
        let git = GitRepository::with_executor(FakeGit);
        assert!(FuncsOptions::resolve(a, &ConfigFile::default(), Palette::plain(), &git).is_err());
    }

    #[test]
    fn test_changed_mode_report() {
        let (out, report) = run(VisibilityMode::Changed);

        assert!(out.starts_with("\np\n"));
        assert!(out.contains("f 10 -> 12\n"));
        assert!(out.contains("DELETED p.gone\n"));
        assert!(out.contains("INSERTED p.new\n"));
        assert!(!out.contains("g changed"));
        assert!(!out.contains("same"));
        assert!(out.contains("package q only in before build"));

        let p = &report.packages["p"];
        assert_eq!((p.total.before, p.total.after), (27, 32));
    }

    #[test]
    fn test_all_mode_shows_same_size_change() {
        let (out, _) = run(VisibilityMode::All);
        assert!(out.contains("p.g changed\n"));
    }

    #[test]
    fn test_stats_mode_prints_only_size_table() {
        let (out, report) = run(VisibilityMode::Stats);
        assert!(!out.contains("DELETED"));
        assert!(!out.contains("->"));
        assert!(out.contains("total"));
        assert!(report.sizes().has_changes());
    }

    #[test]
    fn test_disabled_mode_skips_everything() {
        let dir = TempDir::new().unwrap();
        let mut options = options(dir.path(), VisibilityMode::Disabled);
        // Would fail to open if the comparison ran
        options.before = DumpSource::from_arg("/nonexistent/before.s");
        let mut out = Vec::new();
        let report = compare_funcs(options, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(report.packages.is_empty());
    }

    #[test]
    fn test_tokens_hide_build_identifiers() {
        let dir = TempDir::new().unwrap();
        let before = dir.path().join("b.s");
        let after = dir.path().join("a.s");
        std::fs::write(&before, "# p\np.f STEXT size=4\n\tCALL\taaa111.f(SB)\n").unwrap();
        std::fs::write(&after, "# p\np.f STEXT size=4\n\tCALL\tbbb222.f(SB)\n").unwrap();

        let mut opts = options(dir.path(), VisibilityMode::All);
        opts.before = DumpSource::File(before);
        opts.after = DumpSource::File(after);
        opts.before_token = "aaa111".to_string();
        opts.after_token = "bbb222".to_string();

        let mut out = Vec::new();
        let report = compare_funcs(opts.clone(), &mut out).unwrap();
        assert!(report.packages["p"].is_empty());

        opts.after_token = String::new();
        let mut out = Vec::new();
        let report = compare_funcs(opts, &mut out).unwrap();
        assert_eq!(report.packages["p"].changes.len(), 1);
    }

    #[test]
    fn test_output_is_deterministic() {
        let (first, _) = run(VisibilityMode::All);
        let (second, _) = run(VisibilityMode::All);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_dump_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path(), VisibilityMode::Changed);
        let bad = dir.path().join("bad.s");
        std::fs::write(&bad, "# p\np.f STEXT size=ten\n").unwrap();
        opts.after = DumpSource::File(bad);

        let mut out = Vec::new();
        let err = compare_funcs(opts, &mut out).unwrap_err();
        let typed = err.downcast_ref::<CompileCmpError>().unwrap();
        assert!(matches!(
            typed,
            CompileCmpError::MalformedDump {
                side: Side::After,
                ..
            }
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_input_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path(), VisibilityMode::Changed);
        opts.after = DumpSource::from_arg("/nonexistent/after.s");
        let err = compare_funcs(opts, &mut Vec::new()).unwrap_err();
        assert_eq!(crate::error::ErrorFormatter::exit_code(&err), 66);
    }

    #[test]
    fn test_both_stdin_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path(), VisibilityMode::Changed);
        opts.before = DumpSource::Stdin;
        opts.after = DumpSource::Stdin;
        let err = compare_funcs(opts, &mut Vec::new()).unwrap_err();
        assert_eq!(crate::error::ErrorFormatter::exit_code(&err), 64);
    }
}
