//! Credential signing.
//!
//! Two kinds of credentials are produced here, both keyed by the project
//! API secret:
//! - client tokens (`T1==...`) that browsers present when connecting to a session
//! - short-lived project JWTs sent as `X-OPENTOK-AUTH` on every REST call

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use url::form_urlencoded;
use uuid::Uuid;

use crate::{
    errors::{OpenTokError, Result},
    models::TokenOptions,
};

type HmacSha1 = Hmac<Sha1>;

/// Prefix of every client token
pub const TOKEN_SENTINEL: &str = "T1==";

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const MAX_TOKEN_TTL_DAYS: i64 = 30;
const MAX_CONNECTION_DATA_LEN: usize = 1000;
const PROJECT_JWT_TTL_SECS: i64 = 300;

/// Claims of the `X-OPENTOK-AUTH` header
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectClaims {
    pub iss: String,
    pub ist: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Sign a project-level JWT for authenticating a REST request
pub fn sign_project_jwt(api_key: &str, api_secret: &str) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = ProjectClaims {
        iss: api_key.to_string(),
        ist: "project".to_string(),
        iat: now,
        exp: now + PROJECT_JWT_TTL_SECS,
        jti: Uuid::new_v4().to_string(),
    };

    let jwt = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )?;
    Ok(jwt)
}

/// Sign a client token granting `options.role` within `session_id`
pub fn generate_client_token(
    api_key: &str,
    api_secret: &str,
    session_id: &str,
    options: &TokenOptions,
) -> Result<String> {
    let nonce = rand::thread_rng().gen::<u32>();
    generate_client_token_at(api_key, api_secret, session_id, options, Utc::now(), nonce)
}

pub(crate) fn generate_client_token_at(
    api_key: &str,
    api_secret: &str,
    session_id: &str,
    options: &TokenOptions,
    now: DateTime<Utc>,
    nonce: u32,
) -> Result<String> {
    if session_id.trim().is_empty() {
        return Err(OpenTokError::InvalidArgument(
            "session id must not be empty".to_string(),
        ));
    }

    let expire_time = match options.expire_time {
        Some(expire_time) if expire_time <= now => {
            return Err(OpenTokError::InvalidArgument(format!(
                "expire time {} is in the past",
                expire_time
            )));
        }
        Some(expire_time) if expire_time > now + Duration::days(MAX_TOKEN_TTL_DAYS) => {
            return Err(OpenTokError::InvalidArgument(format!(
                "expire time {} is more than 30 days away",
                expire_time
            )));
        }
        Some(expire_time) => expire_time,
        None => now + Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
    };

    if let Some(data) = &options.data {
        if data.len() > MAX_CONNECTION_DATA_LEN {
            return Err(OpenTokError::InvalidArgument(format!(
                "connection data is {} bytes, limit is {}",
                data.len(),
                MAX_CONNECTION_DATA_LEN
            )));
        }
    }

    let mut data = form_urlencoded::Serializer::new(String::new());
    data.append_pair("session_id", session_id)
        .append_pair("create_time", &now.timestamp().to_string())
        .append_pair("expire_time", &expire_time.timestamp().to_string())
        .append_pair("role", options.role.as_str())
        .append_pair("nonce", &nonce.to_string())
        .append_pair(
            "initial_layout_class_list",
            &options.initial_layout_class_list.join(" "),
        );
    if let Some(connection_data) = &options.data {
        data.append_pair("connection_data", connection_data);
    }
    let data_string = data.finish();

    let signature = sign(&data_string, api_secret)?;
    let meta_string = form_urlencoded::Serializer::new(String::new())
        .append_pair("partner_id", api_key)
        .append_pair("sig", &signature)
        .finish();

    let payload = format!("{}:{}", meta_string, data_string);
    Ok(format!("{}{}", TOKEN_SENTINEL, STANDARD.encode(payload)))
}

fn sign(data: &str, api_secret: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(api_secret.as_bytes())
        .map_err(|e| OpenTokError::Configuration(format!("Invalid API secret: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
