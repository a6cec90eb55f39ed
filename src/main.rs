use clap::Parser;
use std::path::Path;
use std::process;

use compilecmp::cli::{Cli, Commands};
use compilecmp::cmd::{self, FuncsOptions};
use compilecmp::config::{ConfigFile, ConfigLoader};
use compilecmp::error::ErrorFormatter;
use compilecmp::fmt::Palette;
use compilecmp::git::GitRepository;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the default filter
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd::cmd_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let palette = Palette::from_choice(cli.color.unwrap_or(config.color));

    match cli.command {
        Commands::Funcs(args) => {
            let options = FuncsOptions::resolve(args, &config, palette, &GitRepository::new())?;
            cmd::cmd_funcs(options)
        }
        Commands::Sizes {
            before_dir,
            after_dir,
            ext,
        } => cmd::cmd_sizes(&before_dir, &after_dir, ext.as_deref()),
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match explicit {
        Some(path) => ConfigLoader::load_path(path),
        None => ConfigLoader::load(Path::new(".")),
    }
}
