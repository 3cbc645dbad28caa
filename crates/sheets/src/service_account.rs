//! Google service-account authentication.
//!
//! Signs an RS256 JWT assertion with the account's private key and trades it
//! at the account's `token_uri` for a short-lived access token (OAuth 2.0 JWT
//! bearer grant). A token is reused until a minute before it expires.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use orderbot_core::error::SourceError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Read-only access to spreadsheets.
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// The fields of a service-account key file that token minting needs.
/// Everything else in the file is ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| {
            SourceError::NotConfigured(format!("invalid service account credentials: {e}"))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Mints and caches access tokens for one service account and scope.
pub struct ServiceAccountAuth {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    scope: String,
    encoding_key: EncodingKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Fails when the private key is not an RSA PEM key.
    pub fn new(
        key: ServiceAccountKey,
        scope: &str,
        client: reqwest::Client,
    ) -> Result<Self, SourceError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            SourceError::NotConfigured(format!("invalid service account private key: {e}"))
        })?;

        Ok(Self {
            client_email: key.client_email,
            key_id: key.private_key_id,
            token_uri: key.token_uri,
            scope: scope.to_string(),
            encoding_key,
            client,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Signed JWT assertion issued at `now` (Unix seconds).
    fn assertion(&self, now: i64) -> Result<String, SourceError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let claims = Claims {
            iss: self.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            SourceError::NotConfigured(format!("failed to sign token assertion: {e}"))
        })
    }

    /// A valid access token, minting a new one when the cached token is
    /// missing or about to expire. Concurrent callers share one refresh.
    pub async fn access_token(&self) -> Result<String, SourceError> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached
            .as_ref()
            .filter(|t| t.expires_at - REFRESH_MARGIN_SECS > now)
        {
            return Ok(token.value.clone());
        }

        let token = self.request_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_token(&self, now: i64) -> Result<CachedToken, SourceError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Http(format!("token request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Http(format!("token request failed: {e}")))?;

        if !(200..300).contains(&status) {
            warn!(status, account = %self.client_email, "Token endpoint returned error");
            return Err(SourceError::Status {
                status_code: status,
                message: body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            SourceError::MalformedResponse(format!("Failed to parse token response: {e}"))
        })?;

        debug!(account = %self.client_email, expires_in = token.expires_in, "Access token issued");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{Form, Router, http::StatusCode, routing::post};
    use jsonwebtoken::{DecodingKey, Validation};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const TEST_PRIVATE_KEY: &str =
        include_str!("../tests/fixtures/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/service_account_pub.pem");

    pub(crate) fn key_json(token_uri: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "orderbot-test",
            "private_key_id": "key-1",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": "orderbot@orderbot-test.iam.gserviceaccount.com",
            "token_uri": token_uri,
        })
        .to_string()
    }

    /// Token endpoint that counts requests and rejects anything but a JWT
    /// bearer grant.
    pub(crate) fn token_router(hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let grant_ok = form.get("grant_type").map(String::as_str) == Some(JWT_BEARER_GRANT);
                    if !grant_ok || !form.contains_key("assertion") {
                        return (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#.to_string());
                    }
                    (
                        StatusCode::OK,
                        r#"{"access_token":"ya29.test-token","expires_in":3599,"token_type":"Bearer"}"#
                            .to_string(),
                    )
                }
            }),
        )
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn auth(token_uri: &str) -> ServiceAccountAuth {
        let key = ServiceAccountKey::from_json(&key_json(token_uri)).unwrap();
        ServiceAccountAuth::new(key, SHEETS_READONLY_SCOPE, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn key_file_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"a@b.iam.gserviceaccount.com","private_key":"x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(!format!("{key:?}").contains("private_key:"));
    }

    #[test]
    fn garbage_credentials_are_not_configured() {
        assert!(matches!(
            ServiceAccountKey::from_json("{not json"),
            Err(SourceError::NotConfigured(_))
        ));

        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"a@b.iam.gserviceaccount.com","private_key":"not a pem"}"#,
        )
        .unwrap();
        assert!(matches!(
            ServiceAccountAuth::new(key, SHEETS_READONLY_SCOPE, reqwest::Client::new()),
            Err(SourceError::NotConfigured(_))
        ));
    }

    #[test]
    fn assertion_is_signed_with_expected_claims() {
        let auth = auth("https://oauth2.example.test/token");
        let now = chrono::Utc::now().timestamp();
        let jwt = auth.assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.example.test/token"]);
        let decoded = jsonwebtoken::decode::<Claims>(
            &jwt,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("key-1"));
        assert_eq!(decoded.claims.iss, auth.client_email());
        assert_eq!(decoded.claims.scope, SHEETS_READONLY_SCOPE);
        assert_eq!(decoded.claims.exp - decoded.claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn token_is_minted_once_and_reused() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve(token_router(hits.clone())).await;
        let auth = auth(&format!("{base}/token"));

        assert_eq!(auth.access_token().await.unwrap(), "ya29.test-token");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test-token");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_grant_is_status_error() {
        let router = Router::new().route(
            "/token",
            post(|| async { (StatusCode::UNAUTHORIZED, r#"{"error":"invalid_client"}"#) }),
        );
        let base = serve(router).await;
        let auth = auth(&format!("{base}/token"));

        match auth.access_token().await {
            Err(SourceError::Status { status_code, .. }) => assert_eq!(status_code, 401),
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
