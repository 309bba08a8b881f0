// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! dircontext CLI - inspect bundler-style directory contexts
//!
//! ```bash
//! # List every .json file under ./locales, recursively
//! dircontext keys ./locales --filter '\.json$'
//!
//! # Load one key, deferred
//! dircontext load ./locales ./en.json --mode lazy
//!
//! # Browse interactively
//! dircontext repl ./locales
//! ```

mod repl;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use dircontext_core::{
    CachingLoader, Context, ContextConfig, ContextMaker, ContextOptions, FileLoader, HomeModule,
    TimingMode, DEFAULT_FILTER,
};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type DefaultLoader = CachingLoader<FileLoader>;

#[derive(Parser)]
#[command(
    name = "dircontext",
    about = "Resolve, traverse and load bundler-style directory contexts",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./dircontext.toml and the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Module requests are resolved for (defaults to the current directory)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the keys of a context
    #[command(alias = "ls")]
    Keys(ContextArgs),

    /// Load the module behind one key
    Load {
        #[command(flatten)]
        context: ContextArgs,

        /// Key to load, e.g. ./sub/file.json
        key: String,
    },

    /// Browse a context interactively
    #[command(alias = "i")]
    Repl(ContextArgs),
}

#[derive(Args)]
struct ContextArgs {
    /// Directory request, e.g. ./components or a package name
    request: String,

    /// Regular expression keys must match
    #[arg(short, long, default_value = DEFAULT_FILTER)]
    filter: String,

    /// Only list the top-level directory
    #[arg(long)]
    no_recursive: bool,

    /// Timing mode: sync, eager, lazy, lazy-once or async-weak
    #[arg(short, long, default_value = "sync")]
    mode: String,
}

impl ContextArgs {
    fn options(&self) -> anyhow::Result<ContextOptions> {
        Ok(ContextOptions::default()
            .with_recursive(!self.no_recursive)
            .with_pattern(&self.filter)?
            .with_mode(TimingMode::from(self.mode.as_str())))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ContextConfig::load_from(path)?,
        None => ContextConfig::load()?,
    };

    init_logging(cli.verbose, &config);
    tracing::debug!("configuration: {:?}", config);

    let maker = ContextMaker::from_config(&config, CachingLoader::new(FileLoader));

    match &cli.command {
        Command::Keys(args) => {
            let ctx = make(&maker, cli.home.as_ref(), args)?;
            for key in ctx.keys() {
                println!("{}", key);
            }
        }
        Command::Load { context, key } => {
            let ctx = make(&maker, cli.home.as_ref(), context)?;
            let module = ctx.call(key)?.settle().await?;
            println!("{}", module);
        }
        Command::Repl(args) => {
            let ctx = make(&maker, cli.home.as_ref(), args)?;
            let mut repl = repl::Repl::new(ctx, args.request.clone())
                .context("failed to initialize REPL")?;
            repl.run().await?;
        }
    }

    Ok(())
}

/// Make the context described by `args`
fn make(
    maker: &ContextMaker<DefaultLoader>,
    home: Option<&PathBuf>,
    args: &ContextArgs,
) -> anyhow::Result<Context<DefaultLoader>> {
    let factory = match home {
        Some(home) => maker.make_context(&HomeModule::new(std::path::absolute(home)?)),
        None => maker.factory_at(std::env::current_dir()?),
    };

    Ok(factory.context_with(&args.request, &args.options()?)?)
}

fn init_logging(verbose: bool, config: &ContextConfig) {
    let directives = if verbose {
        "dircontext=debug,dircontext_core=debug".to_string()
    } else {
        format!(
            "dircontext={level},dircontext_core={level}",
            level = config.loglevel
        )
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .init();
}

/// Print a formatted error message
pub(crate) fn print_error(error: &dyn Display) {
    eprintln!("{}: {}", "Error".red().bold(), error);
}
