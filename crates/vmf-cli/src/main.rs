//! `vmf` command-line adapter over the provisioning service

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vmf_core::{CreationRequest, ProvisioningError, VmAction};
use vmf_service::{LogFormat, LoggingConfig, ProvisioningService, ServiceConfig};

fn cli() -> Command {
    let request_arg = Arg::new("request")
        .long("request")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a JSON creation request");

    Command::new("vmf")
        .version(vmf_service::VERSION)
        .about("Provider-agnostic VM provisioning")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(["pretty", "json"])
                .help("Override the configured log format"),
        )
        .subcommand(Command::new("demo").about("Run the AWS lifecycle walkthrough"))
        .subcommand(
            Command::new("create")
                .about("Create a VM from a JSON request")
                .arg(request_arg.clone()),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse a JSON request without creating anything")
                .arg(request_arg),
        )
        .subcommand(Command::new("providers").about("List registered providers"))
        .subcommand(Command::new("health").about("Print service health"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    match run(&matches).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = if format == "json" { LogFormat::Json } else { LogFormat::Pretty };
    }
    init_logging(&config.logging);
    tracing::debug!("audit sink: {:?}", config.audit.sink);

    let service = ProvisioningService::from_config(&config)
        .await
        .context("failed to start provisioning service")?;

    match matches.subcommand() {
        Some(("demo", _)) => demo(&service).await,
        Some(("create", args)) => {
            let raw = read_request(request_path(args)?)?;
            match service.create_from_json(&raw).await {
                Ok(vm) => emit(&vm),
                Err(e) => failed(&e),
            }
        }
        Some(("validate", args)) => {
            let raw = read_request(request_path(args)?)?;
            match CreationRequest::parse_with_actor(&raw, service.default_actor()) {
                Ok(request) => emit(&json!({
                    "status": "ok",
                    "provider": request.provider,
                    "name": request.name,
                })),
                Err(e) => failed(&ProvisioningError::from(e)),
            }
        }
        Some(("providers", _)) => emit(&service.registry().providers()),
        Some(("health", _)) => emit(&service.health_check()),
        _ => Ok(ExitCode::from(2)),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        tracing::debug!("keeping the existing subscriber: {e}");
    }
}

fn request_path(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("request")
        .map(PathBuf::as_path)
        .context("--request is required")
}

fn read_request(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn emit<T: Serialize>(value: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}

fn failed(error: &ProvisioningError) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&error.to_body())?);
    Ok(if error.is_client_error() { ExitCode::FAILURE } else { ExitCode::from(2) })
}

async fn demo(service: &ProvisioningService) -> Result<ExitCode> {
    let raw = json!({
        "provider": "aws",
        "name": "mi-vm-aws",
        "params": {
            "instance_type": "t2.micro",
            "region": "us-east-1",
            "vpc": "vpc-123",
            "ami": "ami-abc"
        },
        "requested_by": "alumno"
    });

    let vm = service.create_from_json(&raw).await?;
    step("create", &vm)?;

    for action in [VmAction::Start, VmAction::Stop] {
        let vm = service.perform_action(&vm.id, action, Some("alumno")).await?;
        step(action.as_str(), &vm)?;
    }

    service.delete_vm(&vm.id, Some("alumno")).await?;
    step("delete", &json!({"id": vm.id}))?;

    match service.get_vm(&vm.id).await {
        Err(e) => step("get", &e.to_body())?,
        Ok(vm) => anyhow::bail!("{} still present after delete", vm.id),
    }
    Ok(ExitCode::SUCCESS)
}

fn step<T: Serialize>(name: &str, value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(&json!({"step": name, "result": value}))?);
    Ok(())
}
