//! Conversion of Google API responses into domain models

use super::api::{ContactGroupResource, FilterResource, LabelResource, Person, PersonMembership};
use crate::models::{Connection, ContactGroup, Filter, GroupId, Label, Membership};

/// Convert a People API contact group.
///
/// System groups carry their name in `formattedName` only.
pub fn normalize_group(group: ContactGroupResource) -> ContactGroup {
    let name = group.name.or(group.formatted_name).unwrap_or_default();
    ContactGroup::new(group.resource_name, name)
}

/// Convert a People API person into a connection
pub fn normalize_connection(person: Person) -> Connection {
    Connection {
        email_addresses: person
            .email_addresses
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.value)
            .collect(),
        memberships: person
            .memberships
            .unwrap_or_default()
            .into_iter()
            .map(normalize_membership)
            .collect(),
    }
}

fn normalize_membership(membership: PersonMembership) -> Membership {
    let Some(group) = membership.contact_group_membership else {
        return Membership::Other;
    };
    match (group.contact_group_resource_name, group.contact_group_id) {
        (Some(resource_name), _) => Membership::ContactGroup(GroupId::new(resource_name)),
        (None, Some(id)) => Membership::ContactGroup(GroupId::new(format!("contactGroups/{}", id))),
        (None, None) => Membership::Other,
    }
}

/// Convert a Gmail label
pub fn normalize_label(label: LabelResource) -> Label {
    Label::new(label.id, label.name)
}

/// Convert a Gmail filter
pub fn normalize_filter(filter: FilterResource) -> Filter {
    Filter {
        id: filter.id.into(),
        criteria: filter.criteria,
        action: filter.action,
    }
}
