use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use keyhole_api::AuthStatus;
use keyhole_core::{
    ClientConfig, authorization_header, default_config_dir, load_config_from_dir,
    write_default_config,
};
use keyhole_jwt::{
    StandardClaims, Timestamp, decode, extract_token_body, is_expired, standard_claims,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KEYHOLE_LOG";

#[derive(Debug, Parser)]
#[command(name = "keyhole", about = "Inspect JWT claims and expiry without verifying signatures")]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log decode details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a sample client.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Decode the registered claims
    Decode(TokenArg),
    /// Print the decoded body as-is
    Body(TokenArg),
    /// Check expiry (exit status 1 when expired)
    Expired(TimedTokenArg),
    /// Classify the token as authenticated, expired or rejected
    Status(TimedTokenArg),
    /// Print the header that would carry the token
    Header(TokenArg),
}

#[derive(Debug, Args)]
struct TokenArg {
    /// Token to inspect; read from the configured env var when omitted
    token: Option<String>,
}

#[derive(Debug, Args)]
struct TimedTokenArg {
    #[command(flatten)]
    token: TokenArg,

    /// Evaluate at this Unix time (seconds) instead of now
    #[arg(long, allow_hyphen_values = true)]
    at: Option<i64>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    // `init` must work even when the existing file is broken.
    let config = if matches!(cli.command, Commands::Init { .. }) {
        ClientConfig::default()
    } else {
        load_config(&cfg_dir)?
    };

    match cli.command {
        Commands::Init { force } => {
            let path = cfg_dir.join("client.toml");
            if force && path.exists() {
                fs::remove_file(&path)?;
            }
            let path = write_default_config(&cfg_dir)?;
            pout(
                cli.json,
                serde_json::json!({"message":"init complete","config":path}),
                &format!("Wrote {}", path.display()),
            )?;
        }
        Commands::Decode(arg) => {
            let token = resolve_token(arg.token, &config)?;
            let claims = decode(&standard_claims(), &token)?;
            pout(cli.json, claims_json(&claims), &claims_text(&claims))?;
        }
        Commands::Body(arg) => {
            let token = resolve_token(arg.token, &config)?;
            let body = extract_token_body(&token)?;
            let value = serde_json::from_str(&body)
                .unwrap_or_else(|_| serde_json::Value::String(body.clone()));
            pout(cli.json, value, &body)?;
        }
        Commands::Expired(arg) => {
            let token = resolve_token(arg.token.token, &config)?;
            let now = evaluation_time(arg.at)?;
            let expired = is_expired(now, &token);
            pout(
                cli.json,
                serde_json::json!({"expired":expired,"at":now.to_rfc3339()}),
                if expired { "expired" } else { "not expired" },
            )?;
            if expired {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Status(arg) => {
            let token = resolve_token(arg.token.token, &config)?;
            let now = evaluation_time(arg.at)?;
            let status = AuthStatus::from_token(now, &token);
            let text = status_text(&status);
            pout(cli.json, serde_json::to_value(status)?, &text)?;
        }
        Commands::Header(arg) => {
            let token = resolve_token(arg.token, &config)?;
            let (name, value) = authorization_header(&config, &token);
            pout(
                cli.json,
                serde_json::json!({"name":name,"value":value}),
                &format!("{name}: {value}"),
            )?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults apply only when there is no config file; a broken one is an error.
fn load_config(dir: &Path) -> anyhow::Result<ClientConfig> {
    if !dir.join("client.toml").exists() {
        tracing::debug!(dir = %dir.display(), "no client config, using defaults");
        return Ok(ClientConfig::default());
    }
    let config = load_config_from_dir(dir)?;
    Ok(config)
}

fn resolve_token(arg: Option<String>, config: &ClientConfig) -> anyhow::Result<String> {
    if let Some(token) = arg {
        return Ok(token.trim().to_string());
    }
    let token = std::env::var(&config.token_env)
        .with_context(|| format!("no token given and {} is not set", config.token_env))?;
    let token = token.trim();
    if token.is_empty() {
        bail!("{} is set but empty", config.token_env);
    }
    Ok(token.to_string())
}

fn evaluation_time(at: Option<i64>) -> anyhow::Result<Timestamp> {
    match at {
        None => Ok(Utc::now()),
        Some(secs) => DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| anyhow::anyhow!("--at {secs} is out of range")),
    }
}

fn rfc3339(ts: Option<Timestamp>) -> serde_json::Value {
    ts.map_or(serde_json::Value::Null, |t| serde_json::Value::String(t.to_rfc3339()))
}

fn claims_json(claims: &StandardClaims) -> serde_json::Value {
    serde_json::json!({
        "subject": claims.subject,
        "issuer": claims.issuer,
        "audience": claims.audience,
        "expires_at": rfc3339(claims.expires_at),
        "not_before": rfc3339(claims.not_before),
        "issued_at": rfc3339(claims.issued_at),
        "token_id": claims.token_id,
    })
}

fn claims_text(claims: &StandardClaims) -> String {
    let fields = [
        ("subject", claims.subject.clone()),
        ("issuer", claims.issuer.clone()),
        ("audience", claims.audience.clone()),
        ("expires_at", claims.expires_at.map(|t| t.to_rfc3339())),
        ("not_before", claims.not_before.map(|t| t.to_rfc3339())),
        ("issued_at", claims.issued_at.map(|t| t.to_rfc3339())),
        ("token_id", claims.token_id.clone()),
    ];
    fields
        .iter()
        .map(|(name, value)| format!("{name:<10}  {}", value.as_deref().unwrap_or("-")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(status: &AuthStatus) -> String {
    match status {
        AuthStatus::Anonymous => "anonymous".to_string(),
        AuthStatus::Authenticated {
            subject,
            expires_at,
        } => format!(
            "authenticated as {} until {}",
            subject.as_deref().unwrap_or("<no subject>"),
            expires_at.map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        ),
        AuthStatus::Expired => "expired".to_string(),
        AuthStatus::Rejected { reason } => format!("rejected: {reason}"),
    }
}

pub fn pout(json_mode: bool, value: serde_json::Value, text: &str) -> anyhow::Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}
