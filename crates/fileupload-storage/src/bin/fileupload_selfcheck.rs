//! Prints signed POST/PUT/GET URLs for one object.
//!
//! Usage: `fileupload-selfcheck <bucket> <key> [expire_secs] [max_bytes]`

use fileupload_models::SignedUrlRequest;
use fileupload_storage::{FileUploadConfig, FileUploadConfigOverride, InstanceContext, SignedUrlIssuer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "usage: fileupload-selfcheck <bucket> <key> [expire_secs] [max_bytes]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let bucket = args
        .next()
        .or_else(|| std::env::var("FILEUPLOAD_TEST_BUCKET").ok())
        .ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let key = args
        .next()
        .or_else(|| std::env::var("FILEUPLOAD_TEST_KEY").ok())
        .ok_or_else(|| anyhow::anyhow!(USAGE))?;
    let expire_time = args.next().map(|s| s.parse::<u64>()).transpose()?;
    let max_allowed_size = args.next().map(|s| s.parse::<u64>()).transpose()?;

    let mut config = FileUploadConfig::from_env();
    if let Ok(json) = std::env::var("FILEUPLOAD_CONFIG_JSON") {
        config = config.merge(FileUploadConfigOverride::from_json(&json)?);
    }
    config.validate()?;

    let issuer = SignedUrlIssuer::from_config(config);
    info!(
        region = %issuer.config().region,
        bucket = %bucket,
        key = %key,
        "fileupload-selfcheck starting"
    );
    let ctx = InstanceContext::new();

    let mut post = SignedUrlRequest::post(&bucket, &key);
    post.expire_time = expire_time;
    post.max_allowed_size = max_allowed_size;
    let mut put = SignedUrlRequest::put(&bucket, &key);
    put.expire_time = expire_time;
    let mut get = SignedUrlRequest::get(&bucket, &key);
    get.expire_time = expire_time;

    let mut output = serde_json::Map::new();
    let mut failed = Vec::new();
    for request in [post, put, get] {
        match issuer.issue(&ctx, &request).await {
            Ok(signed) => {
                output.insert(request.kind.as_str().to_string(), serde_json::to_value(signed)?);
            }
            Err(_) => {
                output.insert(request.kind.as_str().to_string(), serde_json::Value::Bool(false));
                failed.push(request.kind.as_str());
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    if !failed.is_empty() {
        return Err(anyhow::anyhow!("signing failed for: {}", failed.join(", ")));
    }
    println!("fileupload-selfcheck: ok");
    Ok(())
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("fileupload_storage=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}
