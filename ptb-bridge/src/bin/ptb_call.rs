//! ptb-call: command-line client for a running bridge
//!
//! Posts one tool invocation to the bridge's HTTP API and prints the JSON
//! result, retrying transient server errors the same way in-process
//! callers do.

use anyhow::{bail, Context};
use clap::Parser;
use ptb_common::config::DEFAULT_HTTP_PORT;
use ptb_common::request::{fetch_json_with_retry, AlwaysOnline, RetryPolicy};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "ptb-call", about = "Invoke a tool on a running automation bridge")]
struct Args {
    /// Tool name (get_session_info, get_track_list, import_audio, ...)
    tool: String,

    /// Tool arguments as a JSON object
    #[arg(default_value = "{}")]
    args: String,

    /// Bridge base URL
    #[arg(long, env = "PTB_BRIDGE_URL", default_value_t = format!("http://localhost:{}", DEFAULT_HTTP_PORT))]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let tool_args: Value = serde_json::from_str(&args.args)
        .with_context(|| format!("tool arguments are not valid JSON: {}", args.args))?;

    let client = reqwest::Client::new();
    let request = client
        .post(format!("{}/api/tools", args.url.trim_end_matches('/')))
        .json(&json!({ "tool": args.tool, "args": tool_args }));

    let outcome = fetch_json_with_retry(
        request,
        &RetryPolicy::default(),
        &AlwaysOnline,
        &CancellationToken::new(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    let body = outcome.body.unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !outcome.status.is_success() {
        bail!("bridge returned {}", outcome.status);
    }
    Ok(())
}
