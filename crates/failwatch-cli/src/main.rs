use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use failwatch_cli::commands;
use failwatch_cli::{init_tracing, AppConfig};
use failwatch_core::{Engine, EngineConfig, ScanOutcome, DEFAULT_PREFIX_LEN};
use failwatch_sources::SearchClient;
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("failwatch")
        .version(failwatch_cli::VERSION)
        .about("Cross-reference CI failures and file one ticket per job family")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .arg(
            Arg::new("prefix-len")
                .long("prefix-len")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Characters stripped from the front of every job identifier [default: 8]"),
        )
        .subcommand(
            Command::new("scan")
                .about("Fetch telemetry, cross-reference and print reports")
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("file")
                .about("Scan, then file one ticket per report")
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Tickets filed in parallel"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print what would be filed without calling the tracker"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Run the engine over local JSON dumps")
                .arg(
                    Arg::new("events")
                        .long("events")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of failure event documents"),
                )
                .arg(
                    Arg::new("references")
                        .long("references")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of reference documents"),
                )
                .arg(json),
        )
}

fn print_outcome(outcome: &ScanOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", commands::render_json(outcome)?);
    } else {
        print!("{}", commands::render_text(outcome));
    }
    Ok(())
}

async fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let prefix_len = matches
        .get_one::<usize>("prefix-len")
        .copied()
        .unwrap_or(DEFAULT_PREFIX_LEN);
    let engine = Engine::new(EngineConfig::default().with_prefix_len(prefix_len));

    match matches.subcommand() {
        Some(("scan", args)) => {
            let config = AppConfig::from_env(false)?;
            let search = SearchClient::new(config.search).context("invalid search configuration")?;
            let outcome = commands::scan(&engine, &search).await?;
            print_outcome(&outcome, args.get_flag("json"))?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("file", args)) => {
            let concurrency = args.get_one::<usize>("concurrency").copied().unwrap_or(1);
            let dry_run = args.get_flag("dry-run");
            let config = AppConfig::from_env(!dry_run)?;
            let search = SearchClient::new(config.search).context("invalid search configuration")?;
            let outcome = commands::scan(&engine, &search).await?;

            if dry_run {
                print!("{}", commands::dry_run(&outcome, &config.assignees_path).await?);
                return Ok(ExitCode::SUCCESS);
            }

            let jira = config
                .jira
                .context("tracker configuration was not resolved")?;
            let summary =
                commands::file(&outcome, &jira, &config.assignees_path, concurrency).await?;
            print!("{}", commands::render_filing(&summary));
            Ok(if summary.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Some(("replay", args)) => {
            let events = args
                .get_one::<PathBuf>("events")
                .context("--events is required")?;
            let references = args
                .get_one::<PathBuf>("references")
                .context("--references is required")?;
            let outcome = commands::replay(&engine, events, references).await?;
            print_outcome(&outcome, args.get_flag("json"))?;
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    tracing::debug!("failwatch v{} starting", failwatch_cli::VERSION);

    match run(&matches).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from([
                "failwatch",
                "replay",
                "--events",
                "e.json",
                "--references",
                "r.json",
                "--prefix-len",
                "4",
                "--log-json",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<usize>("prefix-len"), Some(&4));
        assert!(matches.get_flag("log-json"));
    }

    #[test]
    fn file_defaults() {
        let matches = cli().try_get_matches_from(["failwatch", "file"]).unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<usize>("concurrency"), Some(&1));
        assert!(!args.get_flag("dry-run"));
    }
}
