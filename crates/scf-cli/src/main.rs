use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scf_cli::commands::{self, FilterArgs};
use scf_cli::AppConfig;
use scf_engine::ExportRequest;
use scf_model::Catalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn filter_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("framework")
            .long("framework")
            .action(ArgAction::Append)
            .help("Coverage filter, e.g. soc2 or \"NIST CSF\" (repeatable)"),
    )
    .arg(
        Arg::new("core")
            .long("core")
            .action(ArgAction::Append)
            .help("Core level filter, e.g. L0 or AI_OPS (repeatable)"),
    )
    .arg(
        Arg::new("min-weight")
            .long("min-weight")
            .value_parser(value_parser!(i32))
            .help("Minimum control weight"),
    )
    .arg(
        Arg::new("query")
            .long("query")
            .help("Text search over id, title, domain and description"),
    )
    .arg(
        Arg::new("select")
            .long("select")
            .action(ArgAction::Append)
            .help("Additional control id to select (repeatable)"),
    )
    .arg(
        Arg::new("priority")
            .long("priority")
            .action(ArgAction::Append)
            .help("Control id to mark as priority (repeatable)"),
    )
}

fn json_flag(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as JSON"),
    )
}

fn cli() -> Command {
    Command::new("scf")
        .version(scf_cli::VERSION)
        .about("SCF configurator: catalog coverage, rollout timeline and project export")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Catalog API origin"),
        )
        .subcommand(json_flag(Command::new("load").about("Fetch all catalogs and report counts")))
        .subcommand(json_flag(filter_args(
            Command::new("coverage").about("Print coverage for a filtered selection"),
        )))
        .subcommand(json_flag(
            Command::new("overlap")
                .about("Compare two subjects, e.g. framework:soc2 core_level:core_lvl0")
                .arg(Arg::new("a").required(true))
                .arg(Arg::new("b").required(true)),
        ))
        .subcommand(json_flag(
            Command::new("risk-threat")
                .about("Risk and threat summary coverage of a subject, e.g. framework:gdpr")
                .arg(Arg::new("subject").required(true)),
        ))
        .subcommand(filter_args(
            Command::new("automate")
                .about("Apply a JSON batch of UI actions and print the resulting snapshot")
                .arg(
                    Arg::new("actions")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding an array of UI actions"),
                ),
        ))
        .subcommand(filter_args(
            Command::new("export")
                .about("Write the project bootstrap document")
                .arg(Arg::new("name").long("name").required(true).help("Project name"))
                .arg(Arg::new("description").long("description").help("Project description"))
                .arg(Arg::new("organization").long("organization").help("Organization id"))
                .arg(
                    Arg::new("actions")
                        .long("actions")
                        .value_parser(value_parser!(PathBuf))
                        .help("UI action batch applied before export"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file (stdout when omitted)"),
                ),
        ))
}

fn app_config(matches: &ArgMatches) -> Result<AppConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let default = config.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_filter_args(args: &ArgMatches) -> FilterArgs {
    FilterArgs {
        coverage: strings(args, "framework"),
        core: strings(args, "core"),
        min_weight: args.get_one::<i32>("min-weight").copied(),
        query: args.get_one::<String>("query").cloned(),
        select: strings(args, "select"),
        priority: strings(args, "priority"),
    }
}

async fn catalog(config: &AppConfig) -> Result<Arc<Catalog>> {
    let report = commands::load_catalog(config).await?;
    Ok(Arc::new(report.catalog))
}

fn read_actions(path: &Path) -> Result<Vec<scf_engine::UiAction>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    commands::parse_actions(&raw)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = app_config(&matches)?;
    init_tracing(&config);

    match matches.subcommand() {
        Some(("load", args)) => {
            let report = commands::load_catalog(&config).await?;
            if args.get_flag("json") {
                let counts: serde_json::Map<String, serde_json::Value> = report
                    .catalog
                    .counts()
                    .into_iter()
                    .map(|(name, n)| (name.to_string(), n.into()))
                    .collect();
                let body = serde_json::json!({ "counts": counts, "errors": report.errors });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                for (name, n) in report.catalog.counts() {
                    println!("{name:<24} {n}");
                }
                for (kind, error) in &report.errors {
                    println!("error: {kind}: {error}");
                }
            }
            if !report.is_complete() {
                std::process::exit(2);
            }
        }
        Some(("coverage", args)) => {
            let state = commands::configure(
                catalog(&config).await?,
                config.engine.clone(),
                &parse_filter_args(args),
            )?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(state.coverage())?);
            } else {
                print!("{}", commands::render_coverage(state.coverage(), state.selection().len()));
            }
        }
        Some(("overlap", args)) => {
            let a = args.get_one::<String>("a").map_or("", String::as_str);
            let b = args.get_one::<String>("b").map_or("", String::as_str);
            let result = commands::overlap_subjects(&*catalog(&config).await?, a, b)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary_text);
            }
        }
        Some(("risk-threat", args)) => {
            let subject = args.get_one::<String>("subject").map_or("", String::as_str);
            let result = commands::risk_threat_subject(&*catalog(&config).await?, subject)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.summary_text);
            }
        }
        Some(("automate", args)) => {
            let Some(path) = args.get_one::<PathBuf>("actions") else {
                anyhow::bail!("missing actions file");
            };
            let actions = read_actions(path)?;
            let state = commands::configure(
                catalog(&config).await?,
                config.engine.clone(),
                &parse_filter_args(args),
            )?;
            let (_, report, snapshot) = commands::automate(state, &actions).await;
            info!(rejected = ?report.rejected, "batch report");
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Some(("export", args)) => {
            let state = commands::configure(
                catalog(&config).await?,
                config.engine.clone(),
                &parse_filter_args(args),
            )?;
            let mut request = ExportRequest::new(
                args.get_one::<String>("name").cloned().unwrap_or_default(),
            );
            if let Some(description) = args.get_one::<String>("description") {
                request = request.with_description(description.clone());
            }
            if let Some(org) = args.get_one::<String>("organization") {
                request = request.with_organization(org.clone());
            }

            let payload = if let Some(path) = args.get_one::<PathBuf>("actions") {
                let actions = read_actions(path)?;
                let (session, _, _) = commands::automate(state, &actions).await;
                session.with_state(|s| s.export(&request, chrono::Utc::now()))?
            } else {
                state.export(&request, chrono::Utc::now())?
            };

            let body = serde_json::to_string_pretty(&payload)?;
            match args.get_one::<PathBuf>("out") {
                Some(out) => {
                    std::fs::write(out, body)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(
                        path = %out.display(),
                        controls = payload.controls.len(),
                        "export written"
                    );
                }
                None => println!("{body}"),
            }
        }
        _ => {}
    }
    Ok(())
}
