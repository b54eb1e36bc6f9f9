//! Configuration for the sync
//!
//! OAuth client credentials are looked up in this order:
//! 1. An explicit credentials file
//! 2. Credentials embedded at compile time
//! 3. ~/.config/halo/google-credentials.json (Google Cloud Console format)
//! 4. GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::LabelId;

/// Credentials filename in the halo config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Display-name prefix marking groups and labels owned by the sync
pub const MANAGED_PREFIX: &str = "⭕ ";

/// Largest page the People API serves for connections
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Naming convention and paging settings for a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Groups and labels whose names start with this are managed
    pub prefix: String,
    /// Label removed from matching mail by every managed filter
    pub spam_label: LabelId,
    /// Page size for the connections listing
    pub page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prefix: MANAGED_PREFIX.to_string(),
            spam_label: LabelId::spam(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// OAuth client credentials for the Google APIs
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl GoogleCredentials {
    /// Load credentials, preferring `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let file: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(file);
        }

        Self::from_env()
    }

    /// Credentials embedded at build time.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Load credentials from a Google Cloud Console JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(file)
    }

    /// Parse credentials from a Google Cloud Console JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(file)
    }

    fn from_credential_file(file: GoogleCredentialFile) -> Result<Self> {
        let section = file
            .installed
            .or(file.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
        })
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .context("GOOGLE_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .context("GOOGLE_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Default credentials file path (~/.config/halo/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}
