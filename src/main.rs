use std::path::PathBuf;
use anyhow::Context;
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Args as _, Command, FromArgMatches, ValueEnum};
use clap_complete::Shell;
mod aggregate;
mod config;
mod counter;
mod error;
mod plan;
mod registry;
mod render;
mod roster;

use config::Config;
use error::ReportError;
use registry::Registry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TextFormat { Lines, Table }

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

/// Fixed options. The per-category `--sort-*` flags are added at runtime from the registry.
#[derive(clap::Args, Debug)]
struct Args {
    /// Show all consultants, not only those on the active roster
    #[arg(short = 'a', long, default_value_t = false)]
    all: bool,
    /// Configuration file (default: $UNDERPANTS_CONFIG, then ./underpants.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFmt,
    #[arg(long, value_enum, default_value = "lines")]
    text_format: TextFormat,
    /// Also write the leaderboard as CSV to this path
    #[arg(long)]
    csv_path: Option<PathBuf>,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("underpants: {:#}", e);
        let code = e.chain().find_map(|c| c.downcast_ref::<ReportError>()).map(ReportError::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> anyhow::Result<()> {
    let cfg = config::load(config_arg(std::env::args()).as_deref())?;
    let mut cmd = build_command(&cfg.registry);
    let matches = cmd.clone().get_matches();
    let args = Args::from_arg_matches(&matches)?;
    if let Some(sh) = args.completions {
        clap_complete::generate(sh, &mut cmd, "underpants", &mut std::io::stdout());
        return Ok(());
    }
    init_logging(&args);
    match (cfg.source.as_ref(), args.config.is_some()) {
        (Some(p), true) => log::debug!("configuration from --config {}", p.display()),
        (Some(p), false) => log::debug!("configuration from {}", p.display()),
        (None, _) => log::debug!("built-in configuration"),
    }
    let selected = selected_categories(&cfg.registry, &matches);
    let out = report(&cfg, &args, &selected)?;
    print!("{}", out);
    Ok(())
}

/// Pulls `--config <path>` out of the raw arguments; the registry it names decides which flags exist.
fn config_arg<I: IntoIterator<Item = String>>(argv: I) -> Option<PathBuf> {
    let mut it = argv.into_iter().skip(1);
    while let Some(a) = it.next() {
        if a == "--" { break; }
        if a == "--config" { return it.next().map(PathBuf::from); }
        if let Some(v) = a.strip_prefix("--config=") { return Some(PathBuf::from(v)); }
    }
    None
}

fn build_command(registry: &Registry) -> Command {
    let mut cmd = Command::new("underpants")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Consultant warning leaderboard")
        .long_about("Counts food, printer and other warnings per consultant from the consult data files and prints a leaderboard sorted by one category.")
        .after_long_help("Examples:\n  underpants\n  underpants -p\n  underpants --sort-food --all\n  underpants --config ./underpants.toml --output json");
    let mut ids: Vec<String> = Vec::new();
    for c in registry.iter() {
        let id = c.sort_arg_id();
        let mut arg = Arg::new(id.clone())
            .short(c.flag)
            .long(id.clone())
            .action(ArgAction::SetTrue);
        if c.name == registry.default_category().name { arg = arg.help("(default sort)"); }
        cmd = cmd.arg(arg);
        ids.push(id);
    }
    cmd = cmd.group(ArgGroup::new("sort").args(ids).multiple(false));
    Args::augment_args(cmd)
}

/// Category names whose sort flag was given on the command line.
fn selected_categories<'a>(registry: &'a Registry, matches: &ArgMatches) -> Vec<&'a str> {
    registry
        .iter()
        .filter(|c| matches.get_flag(&c.sort_arg_id()))
        .map(|c| c.name.as_str())
        .collect()
}

/// Runs one report to completion and returns the rendered output; nothing is printed on failure.
fn report(cfg: &Config, args: &Args, selected: &[&str]) -> anyhow::Result<String> {
    let order = plan::sort_order(&cfg.registry, selected)?;
    log::info!("sorting by {}", order.lead());
    let tally = aggregate::collect(&cfg.registry)?;
    let tally = roster::filter(tally, args.all, &cfg.roster_path, &cfg.excluded_names)?;
    let board = render::build(&cfg.registry, &order, &tally);
    if let Some(p) = args.csv_path.as_ref() {
        render::write_csv(p, &board).with_context(|| format!("writing {}", p.display()))?;
    }
    let out = match (args.output, args.text_format) {
        (OutputFmt::Json, _) => format!("{}\n", render::render_json(&board)?),
        (OutputFmt::Text, TextFormat::Table) => render::render_table(&board),
        (OutputFmt::Text, TextFormat::Lines) => render::render_text(&board),
    };
    Ok(out)
}

/// Level from the command line; `None` leaves `RUST_LOG` in charge.
fn log_filter(args: &Args) -> Option<log::LevelFilter> {
    if args.quiet { return Some(log::LevelFilter::Error); }
    if let Some(lvl) = args.log_level {
        return Some(match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace });
    }
    match args.verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(f) = log_filter(args) { builder.filter_level(f); }
    builder.format(|buf, record| {
        use std::io::Write;
        let ts = chrono::Local::now().format("%H:%M:%S");
        writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
    });
    let _ = builder.try_init();
}
