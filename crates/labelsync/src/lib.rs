//! Labelsync - keeps Gmail labels and filters in step with contact groups
//!
//! Contact groups whose names start with the managed prefix ("⭕ ") each get a
//! Gmail label of the same name and one filter that applies the label to mail
//! from the group's members. This crate provides:
//! - Domain models (groups, labels, filters and their per-run indices)
//! - Collaborator traits for the contacts directory and mail settings
//! - Gmail and People API clients plus OAuth authentication
//! - The idempotent sync engine
//!
//! Nothing is stored locally: every run reads both remotes fresh.

pub mod config;
pub mod google;
pub mod models;
pub mod remote;
pub mod sync;

pub use config::{GoogleCredentials, SyncConfig};
pub use google::{GmailClient, GoogleAuth, GoogleHttp, PeopleClient};
pub use models::{
    Connection, ContactGroup, Filter, FilterId, FilterSpec, GroupId, GroupIndex, Label, LabelId,
    LabelIndex, ManagedGroup,
};
pub use remote::{ContactsDirectory, InMemoryContacts, InMemoryMail, MailSettings, NotFoundError, Page};
pub use sync::{FilterStats, MembershipStats, MissingLabelError, SyncStats, sync_groups};
