//! Google API integration
//!
//! This module provides:
//! - OAuth2 authentication shared by both APIs
//! - Gmail settings client (labels and filters)
//! - People client (contact groups and connections)
//! - Response normalization to domain models

mod auth;
mod gmail;
mod http;
mod normalize;
mod people;

pub use auth::{GoogleAuth, StoredToken};
pub use gmail::GmailClient;
pub use http::GoogleHttp;
pub use normalize::{normalize_connection, normalize_filter, normalize_group, normalize_label};
pub use people::PeopleClient;

/// Gmail and People API wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::models::{FilterAction, FilterCriteria};

    /// Response from listing labels
    #[derive(Debug, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<LabelResource>>,
    }

    /// A Gmail label
    #[derive(Debug, Deserialize)]
    pub struct LabelResource {
        pub id: String,
        pub name: String,
    }

    /// Body of a label create request
    #[derive(Debug, Serialize)]
    pub struct CreateLabelRequest<'a> {
        pub name: &'a str,
    }

    /// Response from listing filters; the field is absent when there are none
    #[derive(Debug, Deserialize)]
    pub struct ListFiltersResponse {
        pub filter: Option<Vec<FilterResource>>,
    }

    /// A Gmail filter
    #[derive(Debug, Deserialize)]
    pub struct FilterResource {
        pub id: String,
        #[serde(default)]
        pub criteria: FilterCriteria,
        #[serde(default)]
        pub action: FilterAction,
    }

    /// Response from listing contact groups
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListContactGroupsResponse {
        pub contact_groups: Option<Vec<ContactGroupResource>>,
        pub total_items: Option<u32>,
        pub next_page_token: Option<String>,
    }

    /// A People API contact group
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContactGroupResource {
        pub resource_name: String,
        pub name: Option<String>,
        pub formatted_name: Option<String>,
    }

    /// Response from listing the user's connections
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListConnectionsResponse {
        pub connections: Option<Vec<Person>>,
        pub total_items: Option<u32>,
        pub next_page_token: Option<String>,
    }

    /// A person, limited to the requested fields
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Person {
        pub email_addresses: Option<Vec<PersonEmail>>,
        pub memberships: Option<Vec<PersonMembership>>,
    }

    /// An email address on a person
    #[derive(Debug, Deserialize)]
    pub struct PersonEmail {
        pub value: Option<String>,
    }

    /// A membership on a person; at most one kind is set
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PersonMembership {
        pub contact_group_membership: Option<ContactGroupMembership>,
    }

    /// Contact group side of a membership
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContactGroupMembership {
        pub contact_group_resource_name: Option<String>,
        pub contact_group_id: Option<String>,
    }
}
