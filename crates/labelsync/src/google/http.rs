//! Authenticated JSON requests against Google REST APIs

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use ureq::Agent;

use super::GoogleAuth;

/// Shared HTTP agent plus the OAuth token source
#[derive(Clone)]
pub struct GoogleHttp {
    agent: Agent,
    auth: Arc<GoogleAuth>,
}

impl GoogleHttp {
    const TIMEOUT: Duration = Duration::from_secs(30);
    const MAX_ATTEMPTS: u32 = 3;

    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Self::TIMEOUT))
            .build();
        Self {
            agent: Agent::new_with_config(config),
            auth,
        }
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.get_access_token()?))
    }

    /// GET and decode JSON, retrying rate limits and server errors
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut delay = Duration::from_millis(200);
        let mut attempt = 1;

        loop {
            let result = self
                .agent
                .get(url)
                .header("Authorization", &self.bearer()?)
                .call();

            match result {
                Ok(mut response) => {
                    return response
                        .body_mut()
                        .read_json()
                        .with_context(|| format!("Failed to parse response from {}", url));
                }
                Err(ureq::Error::StatusCode(status))
                    if is_retryable(status) && attempt < Self::MAX_ATTEMPTS =>
                {
                    log::warn!("GET {} returned {}, retrying in {:?}", url, status, delay);
                    std::thread::sleep(delay + Duration::from_millis(rand_jitter()));
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e).with_context(|| format!("GET {} failed", url)),
            }
        }
    }

    /// POST a JSON body and decode the JSON reply
    pub fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let mut response = self
            .agent
            .post(url)
            .header("Authorization", &self.bearer()?)
            .send_json(body)
            .with_context(|| format!("POST {} failed", url))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// DELETE a resource; false if it was already gone (404)
    pub fn delete(&self, url: &str) -> Result<bool> {
        let result = self
            .agent
            .delete(url)
            .header("Authorization", &self.bearer()?)
            .call();

        match result {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404)) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("DELETE {} failed", url)),
        }
    }
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Random jitter between 0 and 100ms
fn rand_jitter() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    RandomState::new().build_hasher().finish() % 100
}
