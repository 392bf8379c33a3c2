use std::sync::Arc;

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use lexgate::{
    adapters::{ReqwestTransport, SqliteAuditStore},
    config::{GatewayConfigValidator, load_config},
    core::{AdmissionLimiter, DictGatewayClient, DictQuery, RetryPolicy},
    tracing_setup,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Perform one dictionary query through the gateway
    Query {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.toml")]
        config: String,
        /// 1-based page number
        #[clap(long, default_value_t = 1)]
        page_num: u32,
        /// Page size (1..=100)
        #[clap(long, default_value_t = 20)]
        page_size: u32,
        /// Dictionary type selector
        #[clap(long)]
        dict_type: String,
        /// Trace id to correlate audit rows; generated when omitted
        #[clap(long)]
        trace_id: Option<String>,
        /// Subject (caller) identifier bound to the call's correlation scope
        #[clap(long)]
        subject_id: Option<String>,
        /// Emit JSON logs instead of pretty console output
        #[clap(long)]
        log_json: bool,
    },
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    match args.command {
        Commands::Query {
            config,
            page_num,
            page_size,
            dict_type,
            trace_id,
            subject_id,
            log_json,
        } => {
            query_command(
                &config, page_num, page_size, dict_type, trace_id, subject_id, log_json,
            )
            .await
        }
        Commands::Validate { config } => validate_config_command(&config),
        Commands::Init { config } => init_config_command(&config),
    }
}

#[allow(clippy::too_many_arguments)]
async fn query_command(
    config_path: &str,
    page_num: u32,
    page_size: u32,
    dict_type: String,
    trace_id: Option<String>,
    subject_id: Option<String>,
    log_json: bool,
) -> Result<()> {
    if log_json {
        tracing_setup::init_tracing()?;
    } else {
        tracing_setup::init_console_tracing()?;
    }

    let cfg = load_config(config_path)?;
    GatewayConfigValidator::validate(&cfg)
        .map_err(|e| eyre!("Configuration invalid: {e}"))?;

    let transport = Arc::new(ReqwestTransport::new(&cfg.transport)?);
    let audit_store = Arc::new(SqliteAuditStore::connect(&cfg.audit.database_url).await?);
    let limiter = AdmissionLimiter::new(&cfg.rate_limit).map_err(|e| eyre!(e))?;

    let client = DictGatewayClient::new(
        cfg.upstream.clone(),
        RetryPolicy::from(&cfg.retry),
        limiter,
        transport,
        audit_store,
    );

    let query = DictQuery::new(page_num, page_size, dict_type);
    let body = client.query(&query, trace_id, subject_id).await?;
    println!("{}", render_body(&body));
    Ok(())
}

/// Pretty-print JSON response bodies; anything else is printed verbatim.
fn render_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

fn validate_config_command(config_path: &str) -> Result<()> {
    let cfg = load_config(config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    match GatewayConfigValidator::validate(&cfg) {
        Ok(()) => {
            println!("Configuration {config_path} is valid");
            println!("  upstream.base_url: {}", cfg.upstream.base_url);
            println!(
                "  rate_limit: capacity={} refill={}per{}ms",
                cfg.rate_limit.capacity,
                cfg.rate_limit.refill_tokens,
                cfg.rate_limit.refill_interval_ms
            );
            println!(
                "  retry: max_attempts={} initial_delay_ms={} max_delay_ms={}",
                cfg.retry.max_attempts, cfg.retry.initial_delay_ms, cfg.retry.max_delay_ms
            );
            Ok(())
        }
        Err(e) => Err(eyre!("Configuration {config_path} is invalid: {e}")),
    }
}

fn init_config_command(config_path: &str) -> Result<()> {
    if std::path::Path::new(config_path).exists() {
        return Err(eyre!("Refusing to overwrite existing file {config_path}"));
    }

    let template = r#"[upstream]
base_url = "http://127.0.0.1:18022"
app_key = "your-app-key"
app_secret = "your-app-secret"

[transport]
connect_timeout_ms = 5000
read_timeout_ms = 10000

[rate_limit]
capacity = 100
refill_tokens = 10
refill_interval_ms = 1000

[retry]
max_attempts = 3
initial_delay_ms = 1000
multiplier = 2.0
max_delay_ms = 10000

[audit]
database_url = "sqlite://lexgate_audit.db"
"#;

    std::fs::write(config_path, template)
        .with_context(|| format!("Failed to write {config_path}"))?;
    println!("Wrote starter configuration to {config_path}");
    Ok(())
}
