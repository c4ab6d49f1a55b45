use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use spdlog::{debug, warn};

use mdblog::logger::configure_logger;

use crate::compile::compile_cmd;
use crate::config::open_config;
use crate::posts::{migrate_cmd, new_post_cmd, redirects_cmd, show_redirects_cmd};

mod compile;
mod config;
mod posts;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path. If empty, mdblog.toml is searched next to the executable,
    /// in the current directory and in the user config directory
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Moves the legacy posts into the dated post layout
    Migrate,
    /// Generates the redirect rules from legacy names to the new post ids
    Redirects,
    /// Prints the generated redirect rules
    ShowRedirects,
    /// Compiles a markdown post into html
    Compile(CompileArgs),
    /// Creates a new post
    New(NewArgs),
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// Markdown file or post directory. If empty, reads from stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Html output file. If empty, writes to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NewArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Comma separated tags
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = open_config(cli.config_path.map(PathBuf::from))?;

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    debug!("Running {:?}", cli.command);
    match cli.command {
        Command::Migrate => migrate_cmd(&config),
        Command::Redirects => redirects_cmd(&config),
        Command::ShowRedirects => show_redirects_cmd(&config),
        Command::Compile(args) => compile_cmd(args),
        Command::New(args) => new_post_cmd(&config, args),
    }
}
