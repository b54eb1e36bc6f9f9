//! Google OAuth2 authentication
//!
//! Installed-app authorization code flow with a loopback redirect. Tokens
//! are cached on disk and refreshed when close to expiry. Uses synchronous
//! HTTP (ureq) like the API clients.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Mutex;
use url::Url;

use crate::config::GoogleCredentials;

/// Cached token file in the halo config directory
const TOKEN_FILE: &str = "google-tokens.json";

/// OAuth2 token management for the Gmail and People APIs
pub struct GoogleAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
    /// Serializes token use so concurrent callers share one refresh or login
    current: Mutex<Option<StoredToken>>,
}

/// Token data as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl StoredToken {
    /// Valid for at least five more minutes
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at > now + 300)
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl TokenResponse {
    fn into_stored(self, fallback_refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| fallback_refresh.map(str::to_string)),
            expires_at: self
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs as i64),
        }
    }
}

impl GoogleAuth {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Label management, filter settings, and read-only contacts
    const SCOPES: [&'static str; 3] = [
        "https://www.googleapis.com/auth/gmail.labels",
        "https://www.googleapis.com/auth/gmail.settings.basic",
        "https://www.googleapis.com/auth/contacts.readonly",
    ];

    /// Port range to try for the loopback redirect
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Create an authenticator caching tokens in ~/.config/halo/google-tokens.json
    pub fn new(credentials: &GoogleCredentials) -> Result<Self> {
        let token_path =
            config::config_path(TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self::with_token_path(credentials, token_path))
    }

    /// Create an authenticator caching tokens at `token_path`
    pub fn with_token_path(credentials: &GoogleCredentials, token_path: PathBuf) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_path,
            current: Mutex::new(None),
        }
    }

    /// Get a valid access token, refreshing or re-authenticating as needed
    pub fn get_access_token(&self) -> Result<String> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow::anyhow!("Token cache lock poisoned"))?;
        let now = chrono::Utc::now().timestamp();

        if current.is_none() {
            *current = self.load_token().ok();
        }

        if let Some(token) = current.clone() {
            if token.is_fresh(now) {
                return Ok(token.access_token);
            }

            if let Some(refresh_token) = token.refresh_token.as_deref() {
                match self.refresh_access_token(refresh_token) {
                    Ok(refreshed) => {
                        let stored = refreshed.into_stored(Some(refresh_token));
                        self.save_token(&stored)?;
                        let access_token = stored.access_token.clone();
                        *current = Some(stored);
                        return Ok(access_token);
                    }
                    Err(e) => log::warn!("Token refresh failed, signing in again: {:#}", e),
                }
            }
        }

        let stored = self.authorization_code_auth()?.into_stored(None);
        self.save_token(&stored)?;
        let access_token = stored.access_token.clone();
        *current = Some(stored);
        Ok(access_token)
    }

    /// Authorization URL the user opens in a browser
    fn authorization_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&Self::SCOPES.join(" ")),
        )
    }

    fn authorization_code_auth(&self) -> Result<TokenResponse> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);
        let auth_url = self.authorization_url(&redirect_uri);

        println!("\n=== Google Authorization Required ===");
        println!("Authorize halo by visiting: {}", auth_url);
        if let Err(e) = open::that(&auth_url) {
            eprintln!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        println!("Waiting for authorization...");
        let code = self.wait_for_callback(listener)?;

        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        println!("Authorization successful!\n");
        Ok(token)
    }

    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )
    }

    /// Accept the browser redirect and pull the authorization code out of it
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut request_line = String::new();
        BufReader::new(&stream)
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let outcome = parse_callback(&request_line);

        let (status, body) = match outcome {
            Ok(_) => ("200 OK", "Authorization successful! You can close this window."),
            Err(_) => ("400 Bad Request", "Authorization failed. Please try again."),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        outcome
    }

    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")
    }

    fn load_token(&self) -> Result<StoredToken> {
        config::load_json_file(&self.token_path)
    }

    fn save_token(&self, token: &StoredToken) -> Result<()> {
        config::save_json_file(&self.token_path, token)
    }
}

/// Extract the code from a callback request line like `GET /?code=X&scope=Y HTTP/1.1`
fn parse_callback(request_line: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed callback request")?;
    let url = Url::parse(&format!("http://localhost{}", target))
        .context("Malformed callback target")?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => anyhow::bail!("OAuth error: {}", value),
            "code" => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code.context("No authorization code received")
}
