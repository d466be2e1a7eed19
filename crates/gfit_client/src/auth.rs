//! OAuth installed-app credential lifecycle.
//!
//! Loads a stored token when one exists, refreshes it against the token
//! endpoint when it has expired and a refresh token is available, and
//! otherwise runs the interactive loopback flow: the user opens the printed
//! authorization URL and the tool captures the redirect on a local port.
//! Whatever token results is persisted back to the token file.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::FitnessError;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/fitness.activity.write",
    "https://www.googleapis.com/auth/fitness.activity.read",
];

/// Fixed loopback port the OAuth client is registered with.
pub const REDIRECT_PORT: u16 = 54321;

/// Tokens within this margin of expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".into()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// The `installed` section of a downloaded OAuth client secrets file.
#[derive(Clone, Debug, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClientSecrets {
    pub installed: InstalledApp,
}

impl ClientSecrets {
    pub fn load(path: &std::path::Path) -> Result<Self, FitnessError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FitnessError::Config(format!("reading client secrets {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The numeric project number is the leading component of the client id
    /// (`<project>-<hash>.apps.googleusercontent.com`).
    pub fn project_number(&self) -> Option<&str> {
        let head = self.installed.client_id.split('-').next()?;
        if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) {
            Some(head)
        } else {
            None
        }
    }
}

/// Persisted token, shape-compatible with the "authorized user" JSON the
/// stock Google client libraries write.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Tokens with no recorded expiry are assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Load-or-refresh-or-acquire manager for a single token file.
pub struct CredentialManager {
    secrets: ClientSecrets,
    token_file: PathBuf,
    http: reqwest::Client,
}

impl CredentialManager {
    pub fn new(secrets: ClientSecrets, token_file: PathBuf) -> Self {
        Self {
            secrets,
            token_file,
            http: reqwest::Client::new(),
        }
    }

    pub fn client_secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// Produce a usable token, running whichever step of the lifecycle is
    /// needed, and persist the result.
    pub async fn obtain(&self) -> Result<StoredToken, FitnessError> {
        if let Some(stored) = self.load_stored() {
            if !stored.is_expired(Utc::now()) {
                return Ok(stored);
            }
            if let Some(refresh_token) = stored.refresh_token.clone() {
                tracing::info!("stored token expired, refreshing");
                let refreshed = self.refresh(&refresh_token).await?;
                self.save(&refreshed)?;
                return Ok(refreshed);
            }
            tracing::warn!("stored token expired and has no refresh token");
        }

        let token = self.interactive_flow().await?;
        self.save(&token)?;
        Ok(token)
    }

    fn load_stored(&self) -> Option<StoredToken> {
        let raw = std::fs::read_to_string(&self.token_file).ok()?;
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(
                    "ignoring unreadable token file {}: {e}",
                    self.token_file.display()
                );
                None
            }
        }
    }

    fn save(&self, token: &StoredToken) -> Result<(), FitnessError> {
        let raw = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.token_file, raw).map_err(|e| {
            FitnessError::Config(format!(
                "writing token file {}: {e}",
                self.token_file.display()
            ))
        })
    }

    /// Exchange a refresh token for a fresh access token.
    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken, FitnessError> {
        let app = &self.secrets.installed;
        let params = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .token_request(&params)
            .await?;
        // The token endpoint does not echo the refresh token back on refresh.
        Ok(self.stored_from_response(response, Some(refresh_token.to_string())))
    }

    /// Full interactive flow: print the authorization URL, catch the loopback
    /// redirect, exchange the code.
    async fn interactive_flow(&self) -> Result<StoredToken, FitnessError> {
        let redirect_uri = format!("http://localhost:{REDIRECT_PORT}/");
        let url = self.authorization_url(&redirect_uri)?;

        println!("Open this URL in your browser to authorize access:\n\n{url}\n");
        println!("Waiting for the authorization redirect on port {REDIRECT_PORT}...");

        let code = wait_for_redirect_code().await?;
        self.exchange_code(&code, &redirect_uri).await
    }

    /// Consent-screen URL for the installed-app flow. `access_type=offline`
    /// with `prompt=consent` makes the endpoint return a refresh token.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<String, FitnessError> {
        let app = &self.secrets.installed;
        let mut url = reqwest::Url::parse(&app.auth_uri)
            .map_err(|e| FitnessError::Config(format!("invalid auth_uri: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &app.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<StoredToken, FitnessError> {
        let app = &self.secrets.installed;
        let params = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.token_request(&params).await?;
        Ok(self.stored_from_response(response, None))
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, FitnessError> {
        let app = &self.secrets.installed;
        let resp = self.http.post(&app.token_uri).form(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let snippet: String = body.chars().take(256).collect();
            return Err(FitnessError::Auth(format!(
                "token endpoint returned {status}: {snippet}"
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| FitnessError::Auth(format!("decoding token response: {e}")))
    }

    fn stored_from_response(
        &self,
        response: TokenResponse,
        refresh_fallback: Option<String>,
    ) -> StoredToken {
        let app = &self.secrets.installed;
        let scopes = match response.scope {
            Some(s) => s.split_whitespace().map(str::to_string).collect(),
            None => SCOPES.iter().map(|s| (*s).to_string()).collect(),
        };
        StoredToken {
            token: response.access_token,
            refresh_token: response.refresh_token.or(refresh_fallback),
            token_uri: app.token_uri.clone(),
            client_id: app.client_id.clone(),
            client_secret: app.client_secret.clone(),
            scopes,
            expiry: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Accept one connection on the loopback port and pull the `code` query
/// parameter out of the redirect request.
async fn wait_for_redirect_code() -> Result<String, FitnessError> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", REDIRECT_PORT)).await?;
    let (mut stream, _) = listener.accept().await?;

    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();

    let code = code_from_request(&request);

    let body = match code {
        Some(_) => "Authorization complete. You can close this window and return to the terminal.",
        None => "Authorization failed. You can close this window.",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;

    code.ok_or_else(|| {
        FitnessError::Auth("authorization redirect carried no code parameter".into())
    })
}

/// Extract the `code` query parameter from a raw HTTP request. Returns `None`
/// when the redirect carries an `error` parameter instead.
fn code_from_request(request: &str) -> Option<String> {
    let line = request.lines().next()?;
    let path = line.split_whitespace().nth(1)?;
    let url = reqwest::Url::parse(&format!("http://localhost{path}")).ok()?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return None,
            "code" => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code
}
