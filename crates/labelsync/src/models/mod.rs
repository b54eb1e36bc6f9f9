//! Domain models for contact groups, mail labels and filters

mod contact;
mod filter;
mod group;
mod label;

pub use contact::{Connection, ContactGroup, EmailCheck, GroupId, Membership};
pub use filter::{Filter, FilterAction, FilterCriteria, FilterId, FilterSpec};
pub use group::{GroupIndex, ManagedGroup};
pub use label::{Label, LabelId, LabelIndex};
