use anyhow::Context;
use clap::Parser;
use loanx_api::{AppState, RestApi};
use loanx_core::{Classifier, ModelRegistry};
use loanx_schema::{loan_schema, FeatureSchema};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Loan approval prediction service
#[derive(Parser, Debug)]
#[command(name = "loanx")]
#[command(about = "Loan approval prediction service", long_about = None)]
struct Args {
    /// Path to the JSON model file
    #[arg(short, long, default_value = "./models/loan_models.json")]
    model: PathBuf,

    /// Name of the model to use from the model file
    #[arg(long, default_value = "RandomForest")]
    model_name: String,

    /// Optional JSON feature schema; the built-in loan schema is used otherwise
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Keep serving when the model cannot be loaded
    #[arg(long)]
    allow_missing_model: bool,

    /// Validate the schema and model, then exit
    #[arg(long)]
    check: bool,
}

fn load_schema(path: Option<&Path>) -> anyhow::Result<FeatureSchema> {
    let schema = match path {
        Some(path) => FeatureSchema::from_json_file(path)
            .with_context(|| format!("invalid schema file {}", path.display()))?,
        None => {
            let schema = loan_schema();
            schema.validate().context("invalid built-in schema")?;
            schema
        }
    };
    Ok(schema)
}

fn load_classifier(
    path: &Path,
    name: &str,
    schema: &FeatureSchema,
) -> anyhow::Result<Arc<dyn Classifier>> {
    let mut registry = ModelRegistry::load(path)
        .with_context(|| format!("failed to load model file {}", path.display()))?;
    let model = registry
        .take(name)
        .with_context(|| format!("available models: {:?}", registry.names()))?;
    model
        .check_columns(&schema.columns)
        .context("model columns do not match the feature schema")?;
    Ok(Arc::new(model))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting LoanX v{}", env!("CARGO_PKG_VERSION"));

    let schema = Arc::new(load_schema(args.schema.as_deref())?);
    info!(
        "Feature schema: {} fields, {} columns",
        schema.fields.len(),
        schema.columns.len()
    );

    let classifier = match load_classifier(&args.model, &args.model_name, &schema) {
        Ok(classifier) => {
            info!("Successfully loaded model: {}", args.model_name);
            Some(classifier)
        }
        Err(e) if args.allow_missing_model && !args.check => {
            error!("Error loading model '{}': {:#}", args.model_name, e);
            warn!("Serving without a model");
            None
        }
        Err(e) => return Err(e),
    };

    if args.check {
        info!("Schema and model are consistent");
        return Ok(());
    }

    let state = Arc::new(AppState::new(schema, classifier));
    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, &host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
