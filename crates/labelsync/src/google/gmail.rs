//! Gmail settings client: labels and filters
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::Result;

use super::api::{CreateLabelRequest, FilterResource, LabelResource, ListFiltersResponse, ListLabelsResponse};
use super::normalize::{normalize_filter, normalize_label};
use super::GoogleHttp;
use crate::models::{Filter, FilterId, FilterSpec, Label};
use crate::remote::{MailSettings, NotFoundError};

/// Gmail API client for the signed-in user's labels and filters
pub struct GmailClient {
    http: GoogleHttp,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1/users/me";

    pub fn new(http: GoogleHttp) -> Self {
        Self { http }
    }

    fn url(path: &str) -> String {
        format!("{}/{}", Self::BASE_URL, path)
    }
}

impl MailSettings for GmailClient {
    fn list_labels(&self) -> Result<Vec<Label>> {
        let response: ListLabelsResponse = self.http.get_json(&Self::url("labels"))?;
        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(normalize_label)
            .collect())
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        let label: LabelResource = self
            .http
            .post_json(&Self::url("labels"), &CreateLabelRequest { name })?;
        Ok(normalize_label(label))
    }

    fn list_filters(&self) -> Result<Vec<Filter>> {
        let response: ListFiltersResponse = self.http.get_json(&Self::url("settings/filters"))?;
        Ok(response
            .filter
            .unwrap_or_default()
            .into_iter()
            .map(normalize_filter)
            .collect())
    }

    fn delete_filter(&self, id: &FilterId) -> Result<()> {
        let url = Self::url(&format!("settings/filters/{}", urlencoding::encode(id.as_str())));
        if self.http.delete(&url)? {
            Ok(())
        } else {
            Err(NotFoundError::filter(id).into())
        }
    }

    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter> {
        let filter: FilterResource = self.http.post_json(&Self::url("settings/filters"), spec)?;
        Ok(normalize_filter(filter))
    }
}
