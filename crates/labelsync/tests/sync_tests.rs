//! End-to-end tests for the sync engine
//!
//! These run full syncs against the in-memory remotes and check the
//! deployed labels and filters afterwards.

use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use labelsync::models::{Connection, ContactGroup, Filter, FilterId, FilterSpec, Label, LabelId};
use labelsync::remote::{InMemoryContacts, InMemoryMail, MailSettings};
use labelsync::{SyncConfig, sync_groups};

const TEAM: &str = "contactGroups/team";

fn team_directory(emails: &[&str]) -> InMemoryContacts {
    let contacts = InMemoryContacts::new();
    contacts.add_group(ContactGroup::new(TEAM, "⭕ Team"));
    contacts.add_group(ContactGroup::new("contactGroups/myContacts", "myContacts"));
    contacts.set_connections(team_members(emails));
    contacts
}

fn team_members(emails: &[&str]) -> Vec<Connection> {
    emails
        .iter()
        .map(|email| Connection::new().with_email(*email).in_group(TEAM))
        .collect()
}

fn senders(filter: &Filter) -> BTreeSet<String> {
    filter
        .criteria
        .senders()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn set(emails: &[&str]) -> BTreeSet<String> {
    emails.iter().map(|e| e.to_string()).collect()
}

/// Filter content with remote-assigned ids dropped
fn contents(mail: &InMemoryMail) -> Vec<FilterSpec> {
    mail.filters().iter().map(Filter::spec).collect()
}

#[test]
fn test_first_run_creates_label_and_filter() {
    let contacts = team_directory(&["a@x.com", "b@x.com"]);
    let mail = InMemoryMail::new();

    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let label = mail.label_named("⭕ Team").expect("label created");
    let filters = mail.filters_for_label(&label.id);
    assert_eq!(filters.len(), 1);
    assert_eq!(senders(&filters[0]), set(&["a@x.com", "b@x.com"]));
    assert_eq!(filters[0].action.add_label_ids, vec![label.id.clone()]);
    assert!(filters[0].action.remove_label_ids.contains(&LabelId::spam()));

    assert_eq!(stats.groups, 1);
    assert_eq!(stats.labels_created, 1);
    assert_eq!(stats.filters.created, 1);
    assert_eq!(stats.filters.deleted, 0);
}

#[test]
fn test_removed_member_replaces_filter() {
    let contacts = team_directory(&["a@x.com", "b@x.com"]);
    let mail = InMemoryMail::new();
    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();
    let label = mail.label_named("⭕ Team").unwrap();
    let first = mail.filters_for_label(&label.id);

    contacts.set_connections(team_members(&["a@x.com"]));
    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    assert_eq!(mail.label_named("⭕ Team"), Some(label.clone()));
    assert_eq!(stats.labels_created, 0);
    assert_eq!(stats.filters.deleted, 1);

    let filters = mail.filters_for_label(&label.id);
    assert_eq!(filters.len(), 1);
    assert_ne!(filters[0].id, first[0].id);
    assert_eq!(senders(&filters[0]), set(&["a@x.com"]));
}

#[test]
fn test_repeated_runs_are_stable() {
    let contacts = InMemoryContacts::new();
    contacts.add_group(ContactGroup::new(TEAM, "⭕ Team"));
    contacts.add_group(ContactGroup::new("contactGroups/fam", "⭕ Family"));
    contacts.add_group(ContactGroup::new("contactGroups/none", "⭕ Nobody"));
    contacts.add_connection(Connection::new().with_email("b@x.com").in_group(TEAM));
    contacts.add_connection(
        Connection::new()
            .with_email("mum@y.org")
            .with_email("a@x.com")
            .in_group("contactGroups/fam")
            .in_group(TEAM),
    );
    let mail = InMemoryMail::new();

    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();
    let after_first = contents(&mail);
    let labels_after_first = mail.labels();
    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    assert_eq!(contents(&mail), after_first);
    assert_eq!(mail.labels(), labels_after_first);
    for name in ["⭕ Team", "⭕ Family", "⭕ Nobody"] {
        let count = mail.labels().iter().filter(|l| l.name == name).count();
        assert_eq!(count, 1, "{} should have exactly one label", name);
    }
}

#[test]
fn test_empty_group_gets_label_but_no_filter() {
    let contacts = team_directory(&[]);
    let mail = InMemoryMail::new();

    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let label = mail.label_named("⭕ Team").unwrap();
    assert!(mail.filters_for_label(&label.id).is_empty());
    assert_eq!(stats.filters.skipped_empty, 1);
}

#[test]
fn test_group_emptied_loses_its_filter() {
    let contacts = team_directory(&["a@x.com"]);
    let mail = InMemoryMail::new();
    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    contacts.set_connections(Vec::new());
    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let label = mail.label_named("⭕ Team").unwrap();
    assert!(mail.filters_for_label(&label.id).is_empty());
}

#[test]
fn test_invalid_email_does_not_abort() {
    let contacts = team_directory(&["a@x.com"]);
    contacts.add_connection(Connection::new().with_email("not-an-email").in_group(TEAM));
    contacts.add_connection(Connection::new().with_empty_email().in_group(TEAM));
    let mail = InMemoryMail::new();

    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let label = mail.label_named("⭕ Team").unwrap();
    let filters = mail.filters_for_label(&label.id);
    assert_eq!(senders(&filters[0]), set(&["a@x.com"]));
    assert_eq!(stats.members.invalid_emails, 1);
    assert_eq!(stats.members.absent_emails, 1);
}

#[test]
fn test_unmanaged_labels_and_filters_untouched() {
    let contacts = team_directory(&["a@x.com"]);
    let mail = InMemoryMail::new();
    mail.add_label(Label::new("Label_receipts", "Receipts"));
    let foreign = Filter::new(
        "user-filter",
        FilterSpec::label_senders(["shop@z.com"], LabelId::new("Label_receipts"), LabelId::spam()),
    );
    mail.add_filter(foreign.clone());

    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    assert!(mail.label_named("Receipts").is_some());
    assert!(mail.filters().contains(&foreign));
    assert_eq!(mail.filters().len(), 2);
}

#[test]
fn test_many_groups_and_paged_connections() {
    let contacts = InMemoryContacts::new();
    for g in 0..25 {
        let id = format!("contactGroups/g{}", g);
        contacts.add_group(ContactGroup::new(id.as_str(), format!("⭕ Group {:02}", g)));
        for m in 0..3 {
            contacts.add_connection(
                Connection::new()
                    .with_email(format!("m{}@g{}.com", m, g))
                    .in_group(id.as_str()),
            );
        }
    }
    let mail = InMemoryMail::new();
    let config = SyncConfig {
        page_size: 7,
        ..SyncConfig::default()
    };

    let stats = sync_groups(&contacts, &mail, &config).unwrap();

    assert_eq!(stats.groups, 25);
    assert_eq!(stats.members.connections, 75);
    assert_eq!(stats.filters.created, 25);
    for filter in mail.filters() {
        assert_eq!(filter.criteria.senders().len(), 3);
    }
}

/// Mail settings where another client deletes every filter right after it is listed
struct RacingMail {
    inner: InMemoryMail,
    raced: AtomicBool,
}

impl MailSettings for RacingMail {
    fn list_labels(&self) -> Result<Vec<Label>> {
        self.inner.list_labels()
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        self.inner.create_label(name)
    }

    fn list_filters(&self) -> Result<Vec<Filter>> {
        let filters = self.inner.list_filters()?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            for filter in &filters {
                self.inner.delete_filter(&filter.id)?;
            }
        }
        Ok(filters)
    }

    fn delete_filter(&self, id: &FilterId) -> Result<()> {
        self.inner.delete_filter(id)
    }

    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter> {
        self.inner.create_filter(spec)
    }
}

#[test]
fn test_filter_deleted_externally_mid_run() {
    let contacts = team_directory(&["a@x.com", "b@x.com"]);
    let seeded = InMemoryMail::new();
    sync_groups(&contacts, &seeded, &SyncConfig::default()).unwrap();

    let mail = RacingMail {
        inner: seeded,
        raced: AtomicBool::new(false),
    };
    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    assert_eq!(stats.filters.already_deleted, 1);
    assert_eq!(stats.filters.deleted, 0);
    assert_eq!(stats.filters.created, 1);
    assert_eq!(mail.inner.filters().len(), 1);
}

/// Mail settings whose filter creation fails a set number of times
struct FlakyMail {
    inner: InMemoryMail,
    failures_left: AtomicUsize,
}

impl MailSettings for FlakyMail {
    fn list_labels(&self) -> Result<Vec<Label>> {
        self.inner.list_labels()
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        self.inner.create_label(name)
    }

    fn list_filters(&self) -> Result<Vec<Filter>> {
        self.inner.list_filters()
    }

    fn delete_filter(&self, id: &FilterId) -> Result<()> {
        self.inner.delete_filter(id)
    }

    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter> {
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            bail!("HTTP 503 backend error");
        }
        self.inner.create_filter(spec)
    }
}

#[test]
fn test_failed_run_aborts_and_rerun_converges() {
    let contacts = team_directory(&["a@x.com"]);
    let mail = FlakyMail {
        inner: InMemoryMail::new(),
        failures_left: AtomicUsize::new(1),
    };

    let err = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("503"));
    assert!(mail.inner.label_named("⭕ Team").is_some());
    assert!(mail.inner.filters().is_empty());

    sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();
    let label = mail.inner.label_named("⭕ Team").unwrap();
    assert_eq!(mail.inner.filters_for_label(&label.id).len(), 1);
}

#[test]
fn test_malformed_member_entries_stay_out_of_filter() {
    let contacts = team_directory(&["a@x.com"]);
    for raw in ["Team Lead <b@x.com>", "\"john doe\"@x.com", "c@[127.0.0.1]"] {
        contacts.add_connection(Connection::new().with_email(raw).in_group(TEAM));
    }
    let mail = InMemoryMail::new();

    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let label = mail.label_named("⭕ Team").unwrap();
    let filters = mail.filters_for_label(&label.id);
    assert_eq!(filters[0].criteria.from.as_deref(), Some("{a@x.com}"));
    assert_eq!(stats.members.invalid_emails, 3);
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Delete,
    Create,
}

/// Mail settings that record the order of filter mutations
struct RecordingMail {
    inner: InMemoryMail,
    calls: Mutex<Vec<Call>>,
    creating: AtomicUsize,
    max_creating: AtomicUsize,
}

impl RecordingMail {
    fn new(inner: InMemoryMail) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            creating: AtomicUsize::new(0),
            max_creating: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl MailSettings for RecordingMail {
    fn list_labels(&self) -> Result<Vec<Label>> {
        self.inner.list_labels()
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        self.inner.create_label(name)
    }

    fn list_filters(&self) -> Result<Vec<Filter>> {
        self.inner.list_filters()
    }

    fn delete_filter(&self, id: &FilterId) -> Result<()> {
        thread::sleep(Duration::from_millis(5));
        self.calls.lock().unwrap().push(Call::Delete);
        self.inner.delete_filter(id)
    }

    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter> {
        let in_flight = self.creating.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_creating.fetch_max(in_flight, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call::Create);
        thread::sleep(Duration::from_millis(5));
        let created = self.inner.create_filter(spec);
        self.creating.fetch_sub(1, Ordering::SeqCst);
        created
    }
}

#[test]
fn test_deletions_finish_before_sequential_creations() {
    let contacts = InMemoryContacts::new();
    for g in 0..6 {
        let id = format!("contactGroups/g{}", g);
        contacts.add_group(ContactGroup::new(id.as_str(), format!("⭕ Group {}", g)));
        contacts.add_connection(
            Connection::new()
                .with_email(format!("m@g{}.com", g))
                .in_group(id.as_str()),
        );
    }
    let seeded = InMemoryMail::new();
    sync_groups(&contacts, &seeded, &SyncConfig::default()).unwrap();

    let mail = RecordingMail::new(seeded);
    let stats = sync_groups(&contacts, &mail, &SyncConfig::default()).unwrap();

    let calls = mail.calls();
    assert_eq!(calls.len(), 12);
    let first_create = calls.iter().position(|c| *c == Call::Create).unwrap();
    assert!(calls[..first_create].iter().all(|c| *c == Call::Delete));
    assert!(calls[first_create..].iter().all(|c| *c == Call::Create));
    assert_eq!(mail.max_creating.load(Ordering::SeqCst), 1);
    assert_eq!(stats.filters.deleted, 6);
    assert_eq!(stats.filters.created, 6);
}
