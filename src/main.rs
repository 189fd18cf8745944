use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sbrule::azure::auth::ArmCredentials;
use sbrule::azure::client::ArmClient;
use sbrule::config::Config;
use sbrule::resource::{self, servicebus_rule, Severity};
use sbrule::Provider;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Manage Azure Service Bus topic-subscription rules declaratively
#[derive(Parser, Debug)]
#[command(name = "sbrule", version, about, long_about = None)]
struct Args {
    /// Azure subscription ID
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// ARM endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Management API version
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Resource type to operate on
    #[arg(short = 't', long = "type", global = true, default_value = servicebus_rule::TYPE_NAME)]
    resource_type: String,

    /// Persist the subscription to the config file
    #[arg(long, global = true)]
    save: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the resource types this provider serves
    Types,
    /// Print the attribute schema as JSON
    Schema,
    /// Validate an attribute file (YAML or JSON) without calling Azure
    Validate { file: PathBuf },
    /// Create the rule, or replace it when --id is given
    Apply {
        file: PathBuf,
        /// ID of the existing rule to replace
        #[arg(long)]
        id: Option<String>,
    },
    /// Read the rule behind a resource ID
    Read { id: String },
    /// Delete the rule behind a resource ID
    Delete { id: String },
    /// Import an existing rule by resource ID
    Import { id: String },
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows or widens individual targets
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(tracing_level.into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("sbrule started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sbrule").join("sbrule.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".sbrule").join("sbrule.log");
    }
    PathBuf::from("sbrule.log")
}

/// Read a YAML or JSON attribute file into a flat attribute map
fn load_attributes(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", path))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{:?} must contain a mapping of attribute names to values", path),
    }
}

fn build_provider(args: &Args) -> Result<Provider> {
    let mut config = Config::load();
    if let Some(subscription) = &args.subscription {
        if args.save {
            config.set_subscription(subscription)?;
        }
        config.subscription_id = Some(subscription.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(api_version) = &args.api_version {
        config.api_version = Some(api_version.clone());
    }

    let subscription = config.effective_subscription();
    if subscription.is_empty() {
        anyhow::bail!("No Azure subscription configured. Set ARM_SUBSCRIPTION_ID or use --subscription");
    }

    let endpoint = config.effective_endpoint();
    tracing::info!("Using subscription: {}, endpoint: {}", subscription, endpoint);

    let client = ArmClient::new(
        &endpoint,
        &subscription,
        &config.effective_api_version(),
        ArmCredentials::from_env()?,
    )?;
    Ok(Provider::new(client))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    match &args.command {
        Command::Types => {
            for type_name in resource::get_all_resource_types() {
                println!("{type_name}");
            }
        }
        Command::Schema => {
            let definition = resource::get_resource(&args.resource_type)
                .with_context(|| format!("Unknown resource type: {}", args.resource_type))?;
            print_json(definition.schema())?;
        }
        Command::Validate { file } => {
            let definition = resource::get_resource(&args.resource_type)
                .with_context(|| format!("Unknown resource type: {}", args.resource_type))?;
            let diagnostics = definition.schema().validate(&load_attributes(file)?);
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}");
            }
            if resource::has_errors(&diagnostics) {
                anyhow::bail!("configuration has errors");
            }
            eprintln!("Configuration is valid");
        }
        Command::Apply { file, id } => {
            let provider = build_provider(&args)?;
            let applied = provider
                .apply(&args.resource_type, id.as_deref(), load_attributes(file)?)
                .await?;
            for warning in applied.warnings.iter().filter(|d| d.severity == Severity::Warning) {
                eprintln!("{warning}");
            }
            print_json(&applied.state.to_state())?;
        }
        Command::Read { id } => {
            let provider = build_provider(&args)?;
            match provider.read(&args.resource_type, id).await? {
                Some(state) => print_json(&state.to_state())?,
                None => eprintln!("{id} no longer exists"),
            }
        }
        Command::Delete { id } => {
            let provider = build_provider(&args)?;
            provider.delete(&args.resource_type, id).await?;
            eprintln!("Deleted {id}");
        }
        Command::Import { id } => {
            let provider = build_provider(&args)?;
            let state = provider.import(&args.resource_type, id).await?;
            print_json(&state.to_state())?;
        }
    }

    Ok(())
}
