//! Command dispatch logic for callejero

use super::common::{GlobalArgs, OutputArgs};
use super::{
    BuildArgs, InitArgs, ProvincesArgs, QueryArgs, build, init_config, run_provinces, run_query, run_regions, validate_config,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "callejero", version, author, long_about = None)]
#[command(about = "Build and query a snapshot of the INE street directory")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the latest street directory archive and publish a new snapshot
    Build(BuildArgs),
    /// Look up localities, population units, or streets in the current snapshot
    Query(QueryArgs),
    /// List the autonomous regions
    Regions(OutputArgs),
    /// List the provinces, optionally those of one region
    Provinces(ProvincesArgs),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate,
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        Command::Build(build_args) => build(host, &cli.global, build_args).await,
        Command::Query(query_args) => run_query(host, &cli.global, query_args),
        Command::Regions(output) => run_regions(host, &cli.global, *output),
        Command::Provinces(provinces_args) => run_provinces(host, &cli.global, provinces_args),
        Command::Init(init_args) => init_config(host, init_args),
        Command::Validate => validate_config(host, &cli.global),
    }
}
