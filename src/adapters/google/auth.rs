use crate::config::ServiceAccountKey;
use crate::utils::error::{Result, SyncError};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Signs the RS256 assertion exchanged for an access token.
pub fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SyncError::auth(format!("unusable private key: {}", e)))?;

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SyncError::auth(format!("could not sign assertion: {}", e)))
}

/// One token per run; runs finish well inside the token's hour of validity.
pub async fn fetch_access_token(client: &Client, key: &ServiceAccountKey) -> Result<String> {
    let assertion = sign_assertion(key, chrono::Utc::now().timestamp())?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(SyncError::auth)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::auth(format!(
            "token endpoint returned HTTP {}: {}",
            status, body
        )));
    }

    let token: TokenResponse = response.json().await.map_err(SyncError::auth)?;
    tracing::debug!(
        "🔐 Authorized as {} (expires in {:?}s)",
        key.client_email,
        token.expires_in
    );
    Ok(token.access_token)
}
