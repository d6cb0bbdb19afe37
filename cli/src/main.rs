use clap::{Args, Parser};
use rf2na_task::prelude::*;
use std::{io::Write as _, path::PathBuf, process};

const LP: &str = "\x1b[0;34m::\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    if let Err(e) = match cli.command {
        SubCommand::Run(args) => run(args),
        SubCommand::Plan(args) => plan(args),
        SubCommand::CheckConfig { config } => check_config(config),
    } {
        eprintln!("{e}");
        process::exit(1);
    }
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: SubCommand,
    /// More output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::Subcommand)]
enum SubCommand {
    /// Mount, link and run RoseTTAFold2NA
    Run(RunArgs),
    /// Print the RoseTTAFold2NA command a run would execute
    Plan(RunArgs),
    /// Validate and print the resolved configuration
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Letters, digits, underscores and dashes
    #[arg(long)]
    run_name: RunName,
    /// Chain as <kind>:<fasta>; kind is protein, rna, dsdna, ssdna,
    /// paired-protein-rna or a P/R/D/S/PR prefix
    #[arg(short = 's', long = "sequence", required = true)]
    sequences: Vec<SequenceInput>,
    /// Remote destination for the output root
    #[arg(long)]
    output_directory: Option<String>,
    /// Config file; defaults to $RF2NA_CONFIG, then ./RF2NA.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

impl RunArgs {
    fn into_parts(self) -> Result<(TaskConfig, RunRequest), TaskError> {
        let config = TaskConfig::load(self.config.as_deref())?;
        let request = RunRequest {
            run_name: self.run_name,
            sequences: self.sequences,
            destination: self.output_directory,
        };
        Ok((config, request))
    }
}

fn build_task(config: TaskConfig) -> Task<CommandMounter, Box<dyn Notifier>> {
    let mounter = CommandMounter::new(&config.mount.program, config.mount.options.clone());
    let notifier: Box<dyn Notifier> = match &config.notify.jsonl {
        Some(path) => Box::new(JsonLinesNotifier::new(path)),
        None => Box::new(LogNotifier),
    };
    Task::new(config, mounter, notifier)
}

fn run(args: RunArgs) -> Result<(), TaskError> {
    let (config, request) = args.into_parts()?;
    let output = build_task(config).run(&request)?;
    log::info!("Returning results");
    println!("{}\t{}", output.local.display(), output.remote);
    Ok(())
}

fn plan(args: RunArgs) -> Result<(), TaskError> {
    let (config, request) = args.into_parts()?;
    println!("{}", build_task(config).plan(&request));
    Ok(())
}

fn check_config(path: Option<PathBuf>) -> Result<(), TaskError> {
    let config = TaskConfig::load(path.as_deref())?;
    println!("{config:#?}");
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Warn,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{LP} {}", record.args()),
            level => writeln!(buf, "{LP} [{level}] {}", record.args()),
        })
        .init();
}
