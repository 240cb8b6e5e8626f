//! SigV4 POST policy signing for browser-form uploads.
//!
//! The S3 SDK only presigns single requests, so presigned POST forms are
//! signed here: the policy document is base64 encoded and signed with the
//! SigV4 signing key derived for `<date>/<region>/s3/aws4_request`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use fileupload_models::PostUpload;
use hmac::{Hmac, Mac};
use serde_json::{json, Map, Value};
use sha2::Sha256;
use url::Url;

use crate::error::{SignerError, SignerResult};
use crate::signer::PostPolicyParams;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm advertised in the form fields.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Default POST policy lifetime (1 hour).
pub const DEFAULT_POST_EXPIRY_SECS: u64 = 3600;

const SERVICE: &str = "s3";

/// Credentials and scope used to sign a policy.
#[derive(Debug, Clone, Copy)]
pub struct PolicySigningKey<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
}

/// Sign a POST policy and build the form the browser must submit to `url`.
pub fn sign_post_policy(
    params: &PostPolicyParams,
    url: String,
    signing: &PolicySigningKey<'_>,
    now: DateTime<Utc>,
) -> SignerResult<PostUpload> {
    if params.bucket.is_empty() {
        return Err(SignerError::invalid_request("bucket is empty"));
    }
    if params.key.is_empty() {
        return Err(SignerError::invalid_request("key is empty"));
    }

    let date = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let credential = format!(
        "{}/{}/{}/{}/aws4_request",
        signing.access_key, date, signing.region, SERVICE
    );

    let expires = params.expires.unwrap_or(DEFAULT_POST_EXPIRY_SECS);
    let expiration = policy_expiration(now, expires)?;

    let mut fields = params.fields.clone();
    fields.insert("bucket".to_string(), params.bucket.clone());
    fields.insert("key".to_string(), params.key.clone());
    fields.insert("X-Amz-Algorithm".to_string(), ALGORITHM.to_string());
    fields.insert("X-Amz-Credential".to_string(), credential);
    fields.insert("X-Amz-Date".to_string(), amz_date);

    // Every signed field is pinned by an exact-match condition.
    let mut conditions: Vec<Value> = fields
        .iter()
        .map(|(name, value)| {
            let mut condition = Map::new();
            condition.insert(name.clone(), Value::String(value.clone()));
            Value::Object(condition)
        })
        .collect();
    for condition in &params.conditions {
        conditions.push(serde_json::to_value(condition)?);
    }

    let policy = json!({
        "expiration": expiration,
        "conditions": conditions,
    });
    let encoded_policy = STANDARD.encode(serde_json::to_vec(&policy)?);

    let signing_key = derive_signing_key(signing.secret_key, &date, signing.region, SERVICE)?;
    let signature = hex::encode(hmac_sha256(&signing_key, encoded_policy.as_bytes())?);

    Ok(PostUpload { url, fields }
        .with_field("Policy", encoded_policy)
        .with_field("X-Amz-Signature", signature))
}

/// Form action URL for a bucket.
///
/// Without a custom endpoint this is the regional virtual-hosted AWS URL.
pub fn post_url(
    bucket: &str,
    region: &str,
    endpoint_url: Option<&str>,
    force_path_style: bool,
) -> SignerResult<String> {
    let endpoint = match endpoint_url {
        Some(endpoint) => endpoint.to_string(),
        None => format!("https://s3.{}.amazonaws.com", region),
    };
    let mut url = Url::parse(&endpoint)
        .map_err(|e| SignerError::Config(format!("invalid endpoint URL {}: {}", endpoint, e)))?;

    if force_path_style {
        let path = format!("{}/{}", url.path().trim_end_matches('/'), bucket);
        url.set_path(&path);
        return Ok(url.to_string());
    }

    let host = url
        .host_str()
        .ok_or_else(|| SignerError::Config(format!("endpoint URL {} has no host", endpoint)))?
        .to_string();
    url.set_host(Some(&format!("{}.{}", bucket, host)))
        .map_err(|e| SignerError::invalid_request(format!("invalid bucket name {}: {}", bucket, e)))?;
    Ok(url.to_string())
}

/// Derive the SigV4 signing key for a date, region and service.
pub fn derive_signing_key(
    secret_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> SignerResult<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> SignerResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SignerError::Policy(format!("Invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn policy_expiration(now: DateTime<Utc>, expires: u64) -> SignerResult<String> {
    let out_of_range = || SignerError::Policy(format!("expiry of {} seconds is out of range", expires));

    let seconds = i64::try_from(expires).map_err(|_| out_of_range())?;
    let lifetime = chrono::Duration::try_seconds(seconds).ok_or_else(out_of_range)?;
    let expiration = now.checked_add_signed(lifetime).ok_or_else(out_of_range)?;

    Ok(expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
