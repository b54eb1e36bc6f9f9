//! Contact directory records: groups, connections and their memberships

use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};

/// Unique identifier for a contact group (People API resource name, e.g. "contactGroups/abc")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A contact group as listed by the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGroup {
    pub id: GroupId,
    pub name: String,
}

impl ContactGroup {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A membership entry on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Membership in a user contact group
    ContactGroup(GroupId),
    /// Any other membership kind (domain membership and the like)
    Other,
}

/// A person in the user's connections, reduced to what the sync needs.
///
/// Email entries are kept raw: `None` is an entry without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub email_addresses: Vec<Option<String>>,
    pub memberships: Vec<Membership>,
}

impl Connection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add an email entry
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_addresses.push(Some(email.into()));
        self
    }

    /// Builder method to add an email entry without a value
    pub fn with_empty_email(mut self) -> Self {
        self.email_addresses.push(None);
        self
    }

    /// Builder method to add a contact-group membership
    pub fn in_group(mut self, group: impl Into<GroupId>) -> Self {
        self.memberships.push(Membership::ContactGroup(group.into()));
        self
    }

    /// Builder method to add a non-group membership
    pub fn with_other_membership(mut self) -> Self {
        self.memberships.push(Membership::Other);
        self
    }

    /// Group ids of the contact-group memberships
    pub fn group_ids(&self) -> impl Iterator<Item = &GroupId> {
        self.memberships.iter().filter_map(|m| match m {
            Membership::ContactGroup(id) => Some(id),
            Membership::Other => None,
        })
    }
}

/// Outcome of checking one raw email entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCheck<'a> {
    Valid(&'a str),
    Invalid,
    Absent,
}

impl<'a> EmailCheck<'a> {
    pub fn of(entry: Option<&'a str>) -> Self {
        match entry.map(str::trim) {
            None | Some("") => EmailCheck::Absent,
            Some(value) if is_plain_address(value) => EmailCheck::Valid(value),
            Some(_) => EmailCheck::Invalid,
        }
    }
}

/// A bare `local@domain.tld` that can sit inside a `{a b}` sender set
fn is_plain_address(value: &str) -> bool {
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"'))
    {
        return false;
    }

    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();
    EmailAddress::parse_with_options(value, options)
        .map(|address| address.email() == value)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_check_valid() {
        assert_eq!(EmailCheck::of(Some("a@x.com")), EmailCheck::Valid("a@x.com"));
        assert_eq!(
            EmailCheck::of(Some(" b@x.com ")),
            EmailCheck::Valid("b@x.com")
        );
    }

    #[test]
    fn test_email_check_invalid() {
        assert_eq!(EmailCheck::of(Some("not-an-email")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("a@@x.com")), EmailCheck::Invalid);
    }

    #[test]
    fn test_email_check_rejects_display_text() {
        assert_eq!(EmailCheck::of(Some("Team Lead <a@x.com>")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("<a@x.com>")), EmailCheck::Invalid);
    }

    #[test]
    fn test_email_check_rejects_quoted_local_part() {
        assert_eq!(EmailCheck::of(Some("\"john doe\"@x.com")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("\"jd\"@x.com")), EmailCheck::Invalid);
    }

    #[test]
    fn test_email_check_rejects_domain_literal_and_bare_host() {
        assert_eq!(EmailCheck::of(Some("a@[127.0.0.1]")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("a@x")), EmailCheck::Invalid);
    }

    #[test]
    fn test_email_check_rejects_sender_set_syntax() {
        assert_eq!(EmailCheck::of(Some("a@x.com b@x.com")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("{a@x.com}")), EmailCheck::Invalid);
        assert_eq!(EmailCheck::of(Some("a}@x.com")), EmailCheck::Invalid);
    }

    #[test]
    fn test_email_check_absent() {
        assert_eq!(EmailCheck::of(None), EmailCheck::Absent);
        assert_eq!(EmailCheck::of(Some("   ")), EmailCheck::Absent);
    }

    #[test]
    fn test_group_ids_skip_other_memberships() {
        let connection = Connection::new()
            .in_group("contactGroups/a")
            .with_other_membership()
            .in_group("contactGroups/b");

        let ids: Vec<&str> = connection.group_ids().map(GroupId::as_str).collect();
        assert_eq!(ids, vec!["contactGroups/a", "contactGroups/b"]);
    }
}
