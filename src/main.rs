/// Version injected at compile time via CLOUDRES_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("CLOUDRES_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cloudres::client::{format_api_error, HttpClient, RestClient};
use cloudres::config::Config;
use cloudres::resource::{self, require_descriptor, Resource};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for cloud-management REST resources
#[derive(Parser, Debug)]
#[command(name = "cloudres", version, about, long_about = None)]
struct Args {
    /// Appliance endpoint URL
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// REST API version
    #[arg(long, global = true)]
    api_version: Option<u32>,

    /// Session token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known resource types
    Kinds,
    /// List resources of a type, optionally filtered server-side
    List {
        kind: String,
        /// Filter as key=value (comma-separated values match any)
        #[arg(short, long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, Value)>,
    },
    /// Show one resource by name or uri
    Get { kind: String, name: String },
    /// Create a resource from a JSON or YAML file
    Create {
        kind: String,
        file: PathBuf,
        /// Delete an existing resource with the same identifiers first
        #[arg(long)]
        replace: bool,
    },
    /// Update attributes of a resource
    Update {
        kind: String,
        name: String,
        /// Attributes as key=value
        #[arg(required = true, value_parser = parse_pair)]
        attributes: Vec<(String, Value)>,
    },
    /// Delete a resource
    Delete { kind: String, name: String },
    /// Export a resource to a JSON or YAML file
    Export {
        kind: String,
        name: String,
        file: PathBuf,
    },
    /// Show the JSON schema of a resource type
    Schema { kind: String },
    /// Manage persisted configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Persist the appliance endpoint
    SetEndpoint { url: String },
    /// Persist the REST API version
    SetApiVersion { version: u32 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    fn from_config(value: Option<&str>) -> Self {
        match value.map(|s| s.to_lowercase()).as_deref() {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn render(self, value: &Value) -> Result<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cloudres {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cloudres").join("cloudres.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cloudres").join("cloudres.log");
    }
    PathBuf::from("cloudres.log")
}

/// Parse a scalar CLI value: JSON literals (numbers, booleans, null) stay typed
fn parse_scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Parse `key=value`; a comma-separated value becomes a list
fn parse_pair(raw: &str) -> Result<(String, Value), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected key=value, got '{}'", raw));
    };
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }

    let value = if value.contains(',') {
        Value::Array(value.split(',').map(parse_scalar).collect())
    } else {
        parse_scalar(value)
    };
    Ok((key.to_string(), value))
}

/// Identify a resource by uri when given a path, by name otherwise
fn identity(name: &str) -> Value {
    if name.starts_with('/') {
        json!({ "uri": name })
    } else {
        json!({ "name": name })
    }
}

fn ensure_writable(readonly: bool, action: &str) -> Result<()> {
    if readonly {
        bail!("Refusing to {} in read-only mode", action);
    }
    Ok(())
}

async fn fetch_existing(client: &Arc<dyn RestClient>, kind: &str, name: &str) -> Result<Resource> {
    let descriptor = require_descriptor(kind)?;
    let mut resource = Resource::new(client.clone(), descriptor, &identity(name))?;
    if !resource.retrieve(None).await? {
        bail!("No unique {} found for '{}'", kind, name);
    }
    Ok(resource)
}

async fn run(args: &Args, config: &mut Config) -> Result<Option<Value>> {
    let output_kinds = || {
        let kinds: Vec<Value> = resource::get_all_kinds()
            .into_iter()
            .map(|k| Value::String(k.to_string()))
            .collect();
        Value::Array(kinds)
    };

    if let Command::Kinds = &args.command {
        return Ok(Some(output_kinds()));
    }

    if let Command::Config { action } = &args.command {
        match action {
            ConfigAction::Show => {}
            ConfigAction::SetEndpoint { url } => config.set_endpoint(url)?,
            ConfigAction::SetApiVersion { version } => config.set_api_version(*version)?,
        }
        return Ok(Some(json!({
            "endpoint": config.effective_endpoint(args.endpoint.as_deref()),
            "api_version": config.effective_api_version(args.api_version),
            "config_file": Config::config_path(),
        })));
    }

    let endpoint = config.effective_endpoint(args.endpoint.as_deref());
    let api_version = config.effective_api_version(args.api_version);
    tracing::info!("Using endpoint: {}, API version: {}", endpoint, api_version);

    let mut http = HttpClient::new(&endpoint, api_version).context("Failed to create HTTP client")?;
    if let Some(token) = Config::effective_token(args.token.as_deref()) {
        http = http.with_token(token);
    }
    let client: Arc<dyn RestClient> = Arc::new(http);

    match &args.command {
        Command::List { kind, filters } => {
            let descriptor = require_descriptor(kind)?;
            let filter: Map<String, Value> = filters.iter().cloned().collect();
            let found = Resource::find_by(&client, &descriptor, &filter, None)
                .await
                .with_context(|| format!("Failed to list {}", kind))?;
            tracing::info!("Listed {} {}", found.len(), kind);
            Ok(Some(Value::Array(
                found
                    .into_iter()
                    .map(|r| Value::Object(r.into_data()))
                    .collect(),
            )))
        }
        Command::Get { kind, name } => {
            let resource = fetch_existing(&client, kind, name).await?;
            Ok(Some(Value::Object(resource.into_data())))
        }
        Command::Create { kind, file, replace } => {
            ensure_writable(args.readonly, "create")?;
            let descriptor = require_descriptor(kind)?;
            let mut resource = Resource::from_file(client.clone(), descriptor, file)
                .with_context(|| format!("Failed to load {:?}", file))?;
            if *replace {
                resource.create_replacing(None).await?;
            } else {
                resource.create(None).await?;
            }
            Ok(Some(Value::Object(resource.into_data())))
        }
        Command::Update {
            kind,
            name,
            attributes,
        } => {
            ensure_writable(args.readonly, "update")?;
            let mut resource = fetch_existing(&client, kind, name).await?;
            let changes: Map<String, Value> = attributes.iter().cloned().collect();
            resource.update(&changes, None).await?;
            Ok(Some(Value::Object(resource.into_data())))
        }
        Command::Delete { kind, name } => {
            ensure_writable(args.readonly, "delete")?;
            let resource = fetch_existing(&client, kind, name).await?;
            resource.delete(None).await?;
            Ok(Some(json!({ "deleted": resource.uri() })))
        }
        Command::Export { kind, name, file } => {
            let resource = fetch_existing(&client, kind, name).await?;
            resource
                .to_file(file, None)
                .with_context(|| format!("Failed to write {:?}", file))?;
            Ok(None)
        }
        Command::Schema { kind } => {
            let descriptor = require_descriptor(kind)?;
            Ok(Some(Resource::schema(&client, &descriptor, None).await?))
        }
        Command::Kinds | Command::Config { .. } => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    let output = args
        .output
        .unwrap_or_else(|| OutputFormat::from_config(config.output.as_deref()));

    match run(&args, &mut config).await {
        Ok(Some(value)) => {
            println!("{}", output.render(&value)?);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            tracing::error!("Command failed: {:?}", err);
            eprintln!("Error: {}", format_api_error(&err));
            std::process::exit(1);
        }
    }
}
