use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cpty_app::{build_service, commands, logging, AppConfig, CommandError, VERSION};
use cpty_client::CounterpartyService;
use cpty_model::{CounterpartyFormData, CounterpartyId, CounterpartyPatch, FormField};
use cpty_store::Store;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn field_arg(field: FormField, required: bool) -> Arg {
    Arg::new(field.as_str())
        .long(field.as_str())
        .required(required)
        .help(field.label())
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(CounterpartyId))
        .help("Record id")
}

fn cli() -> Command {
    Command::new("cpty")
        .version(VERSION)
        .about("Counterparty registry client")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Backend base URL"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(Command::new("list").about("Show all counterparties"))
        .subcommand(
            Command::new("show")
                .about("Show one counterparty")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("create")
                .about("Create a counterparty")
                .args(FormField::ALL.map(|f| field_arg(f, true))),
        )
        .subcommand(
            Command::new("update")
                .about("Change fields of a counterparty")
                .arg(id_arg())
                .args(FormField::ALL.map(|f| field_arg(f, false))),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a counterparty")
                .arg(id_arg()),
        )
        .subcommand(Command::new("status").about("Check backend connectivity"))
        .subcommand(
            Command::new("watch")
                .about("Live table refreshed in the background")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_parser(value_parser!(u64))
                        .help("Seconds between refreshes"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<AppConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = AppConfig::load(path.map(PathBuf::as_path)).context("loading config")?;

    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url);
    }
    if matches.get_flag("json-logs") {
        config.log.json = true;
    }
    if let Some(("watch", args)) = matches.subcommand() {
        if let Some(secs) = args.get_one::<u64>("interval") {
            config = config.with_refresh_secs(*secs);
        }
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn id_of(args: &ArgMatches) -> anyhow::Result<CounterpartyId> {
    args.get_one::<CounterpartyId>("id")
        .cloned()
        .context("missing id")
}

fn form_of(args: &ArgMatches) -> CounterpartyFormData {
    let mut form = CounterpartyFormData::default();
    for field in FormField::ALL {
        if let Some(value) = args.get_one::<String>(field.as_str()) {
            form.set_field(field, value);
        }
    }
    form
}

fn patch_of(args: &ArgMatches) -> CounterpartyPatch {
    FormField::ALL
        .into_iter()
        .fold(CounterpartyPatch::default(), |patch, field| {
            match args.get_one::<String>(field.as_str()) {
                Some(value) => patch.with(field, value),
                None => patch,
            }
        })
}

fn store_over(service: CounterpartyService) -> Arc<Store> {
    let probe = service.status_probe();
    Arc::new(Store::new(Arc::new(service)).with_status_probe(probe))
}

async fn run(matches: &ArgMatches, config: &AppConfig) -> anyhow::Result<()> {
    let service = build_service(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match matches.subcommand() {
        Some(("list", _)) => commands::list(&service, &mut out).await?,
        Some(("show", args)) => commands::show(&service, &id_of(args)?, &mut out).await?,
        Some(("create", args)) => {
            commands::create(&store_over(service), form_of(args), &mut out).await?;
        }
        Some(("update", args)) => {
            let id = id_of(args)?;
            commands::update(&store_over(service), &id, patch_of(args), &mut out).await?;
        }
        Some(("delete", args)) => {
            commands::delete(&store_over(service), &id_of(args)?, &mut out).await?;
        }
        Some(("status", _)) => commands::status(&service.status_probe(), &mut out).await?,
        Some(("watch", _)) => {
            let store = store_over(service);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "ctrl-c handler failed");
                }
            };
            commands::watch(&store, config.refresh_interval(), shutdown, &mut out).await?;
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    logging::init(&config.log).context("initializing logging")?;
    tracing::debug!(base_url = %config.client.base_url, "configuration loaded");

    match run(&matches, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<CommandError>() {
            Some(command) => {
                eprintln!("error: {command}");
                Ok(ExitCode::from(command.exit_code()))
            }
            None => Err(e),
        },
    }
}
