mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use icuregen_core::adapters::{FsWritePort, ProcessToolRunner};
use icuregen_core::pipeline::{regenerate_until_stable, tool_info, write_report};
use icuregen_core::{IcuToolchain, RegenError, RegenSettings};
use icuregen_types::FilterConfiguration;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "icuregen",
    version,
    about = "Regenerates ICU locale and time-zone data in an Android source tree."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Parser)]
struct GlobalArgs {
    /// Root of the Android source tree.
    #[arg(long, global = true, env = "ANDROID_BUILD_TOP")]
    android_root: Option<Utf8PathBuf>,

    /// Config file (default: ./icuregen.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Parent directory for build workspaces (default: system temp dir).
    #[arg(long, global = true)]
    scratch_dir: Option<Utf8PathBuf>,

    /// Parallel jobs passed to make.
    #[arg(long, global = true)]
    jobs: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild ICU data until langInfo.txt converges, then build the device .dat.
    Regenerate(RegenerateArgs),
    /// Build ICU's tz tools against an IANA tzdata tarball and update zoneinfo64.txt.
    TzData(TzDataArgs),
    /// Build a .dat holding only time-zone resources.
    Overlay(OverlayArgs),
    /// Copy the ICU license file into a directory.
    CopyLicenses(CopyLicensesArgs),
    /// Print an ICU data filter configuration.
    PrintFilters(PrintFiltersArgs),
}

#[derive(Debug, Parser)]
struct RegenerateArgs {
    /// Maximum number of full builds before giving up on convergence.
    #[arg(long, conflicts_with = "unbounded")]
    max_iterations: Option<u32>,

    /// Keep rebuilding until langInfo.txt converges, however long it takes.
    #[arg(long, default_value_t = false)]
    unbounded: bool,

    /// Where LocaleDistanceBuilder writes langInfo.txt.
    #[arg(long)]
    lang_info_out: Option<Utf8PathBuf>,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct TzDataArgs {
    /// IANA tzdata .tar.gz.
    #[arg(long)]
    iana_tar: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct OverlayArgs {
    /// Destination for the overlay .dat.
    #[arg(long)]
    dest: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct CopyLicensesArgs {
    /// Directory to copy the license into.
    #[arg(long)]
    target: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct PrintFiltersArgs {
    #[arg(value_enum)]
    variant: FilterVariant,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FilterVariant {
    WithoutTimeZones,
    MachineLearning,
}

impl From<FilterVariant> for FilterConfiguration {
    fn from(v: FilterVariant) -> Self {
        match v {
            FilterVariant::WithoutTimeZones => FilterConfiguration::WithoutTimeZones,
            FilterVariant::MachineLearning => FilterConfiguration::MachineLearning,
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        let code = e
            .downcast_ref::<RegenError>()
            .map(RegenError::exit_code)
            .unwrap_or(1);
        return ExitCode::from(code);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Regenerate(args) => cmd_regenerate(&cli.global, args),
        Command::TzData(args) => cmd_tz_data(&cli.global, args),
        Command::Overlay(args) => cmd_overlay(&cli.global, args),
        Command::CopyLicenses(args) => cmd_copy_licenses(&cli.global, args),
        Command::PrintFilters(args) => cmd_print_filters(args),
    }
}

fn settings(global: &GlobalArgs, extra: CliOverrides) -> anyhow::Result<RegenSettings> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("non UTF-8 current directory {}", p.display()))?;
    let file_config =
        config::load_or_default(global.config.as_deref(), &cwd).context("load icuregen.toml")?;

    let settings = ConfigMerger::new(file_config).merge(CliOverrides {
        android_root: global.android_root.clone(),
        scratch_dir: global.scratch_dir.clone(),
        jobs: global.jobs,
        ..extra
    })?;
    debug!(
        "merged settings: android_root={}, jobs={}, max_iterations={:?}",
        settings.android_root, settings.make_jobs, settings.max_iterations
    );
    Ok(settings)
}

fn cmd_regenerate(global: &GlobalArgs, args: RegenerateArgs) -> anyhow::Result<()> {
    let settings = settings(
        global,
        CliOverrides {
            lang_info_out: args.lang_info_out,
            max_iterations: args.max_iterations,
            unbounded: args.unbounded,
            ..CliOverrides::default()
        },
    )?;
    let max_iterations = settings.max_iterations;

    let runner = ProcessToolRunner;
    let mut chain = IcuToolchain::new(&runner, settings);
    let report = regenerate_until_stable(&mut chain, max_iterations, tool_info())?;

    if let Some(path) = &args.report {
        write_report(&report, path, &FsWritePort)?;
        info!("wrote report to {}", path);
    }
    info!(
        builds = report.builds,
        "ICU data regenerated; review and commit the changes under external/icu"
    );
    Ok(())
}

fn cmd_tz_data(global: &GlobalArgs, args: TzDataArgs) -> anyhow::Result<()> {
    let settings = settings(global, CliOverrides::default())?;
    let iana_tar = absolute(&args.iana_tar)?;

    let runner = ProcessToolRunner;
    let chain = IcuToolchain::new(&runner, settings);
    let workspace = chain.new_workspace()?;
    let build_dir = workspace.icu_build_dir();
    chain.prepare_icu_build(&build_dir, None)?;
    let zoneinfo = chain.make_tz_data_files(&build_dir, &iana_tar)?;
    info!("updated {}", zoneinfo);
    Ok(())
}

fn cmd_overlay(global: &GlobalArgs, args: OverlayArgs) -> anyhow::Result<()> {
    let settings = settings(global, CliOverrides::default())?;
    let dest = absolute(&args.dest)?;

    let runner = ProcessToolRunner;
    let chain = IcuToolchain::new(&runner, settings);
    let workspace = chain.new_workspace()?;
    let build_dir = workspace.icu_build_dir();
    chain.prepare_icu_build(&build_dir, None)?;
    chain.make_and_copy_overlay_tz_icu_data(&build_dir, &dest)?;
    Ok(())
}

fn cmd_copy_licenses(global: &GlobalArgs, args: CopyLicensesArgs) -> anyhow::Result<()> {
    let settings = settings(global, CliOverrides::default())?;
    let runner = ProcessToolRunner;
    let chain = IcuToolchain::new(&runner, settings);
    let copied = chain.copy_license_files(&args.target)?;
    info!("copied {}", copied);
    Ok(())
}

fn cmd_print_filters(args: PrintFiltersArgs) -> anyhow::Result<()> {
    let filters = FilterConfiguration::from(args.variant);
    print!("{}", filters.to_json().context("serialize filters")?);
    Ok(())
}

/// Tools run in other directories, so user-supplied relative paths are anchored here.
fn absolute(path: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("read current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("non UTF-8 current directory {}", p.display()))?;
    Ok(cwd.join(path))
}
