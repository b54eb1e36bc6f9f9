//! People API client: contact groups and connections

use anyhow::{Context, Result};
use log::warn;
use url::Url;

use super::api::{ListConnectionsResponse, ListContactGroupsResponse};
use super::normalize::{normalize_connection, normalize_group};
use super::GoogleHttp;
use crate::models::{Connection, ContactGroup};
use crate::remote::{ContactsDirectory, Page};

/// People API client for the signed-in user's contacts
pub struct PeopleClient {
    http: GoogleHttp,
}

impl PeopleClient {
    /// People API base URL
    const BASE_URL: &'static str = "https://people.googleapis.com/v1";

    /// Largest page the contact group listing serves
    const GROUP_PAGE_SIZE: usize = 1000;

    /// Only these person fields are requested
    const PERSON_FIELDS: &'static str = "emailAddresses,memberships";

    pub fn new(http: GoogleHttp) -> Self {
        Self { http }
    }

    fn groups_url() -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/contactGroups", Self::BASE_URL),
            [("pageSize", Self::GROUP_PAGE_SIZE.to_string())],
        )
        .context("Invalid contact groups URL")
    }

    fn connections_url(page_size: usize, page_token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse_with_params(
            &format!("{}/people/me/connections", Self::BASE_URL),
            [
                ("personFields", Self::PERSON_FIELDS.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )
        .context("Invalid connections URL")?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        Ok(url)
    }
}

/// Groups on the first listing page; only one page is read
fn groups_from_listing(response: ListContactGroupsResponse) -> Vec<ContactGroup> {
    if let Some(unread) = unread_groups(&response) {
        warn!(
            "Contact group listing has more than one page ({} groups not read); later groups are not synced",
            unread.map_or_else(|| "some".to_string(), |n| n.to_string())
        );
    }

    response
        .contact_groups
        .unwrap_or_default()
        .into_iter()
        .map(normalize_group)
        .collect()
}

/// `Some` when the listing continues past this page, with the unread count if known
fn unread_groups(response: &ListContactGroupsResponse) -> Option<Option<usize>> {
    response.next_page_token.as_ref()?;
    let read = response.contact_groups.as_ref().map_or(0, Vec::len);
    Some(
        response
            .total_items
            .map(|total| (total as usize).saturating_sub(read)),
    )
}

impl ContactsDirectory for PeopleClient {
    fn list_groups(&self) -> Result<Vec<ContactGroup>> {
        let response: ListContactGroupsResponse = self.http.get_json(Self::groups_url()?.as_str())?;
        Ok(groups_from_listing(response))
    }

    fn list_connections(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page<Connection>> {
        let url = Self::connections_url(page_size, page_token)?;
        let response: ListConnectionsResponse = self.http.get_json(url.as_str())?;

        Ok(Page {
            items: response
                .connections
                .unwrap_or_default()
                .into_iter()
                .map(normalize_connection)
                .collect(),
            total_items: response.total_items.map(|n| n as usize),
            next_page_token: response.next_page_token,
        })
    }
}
