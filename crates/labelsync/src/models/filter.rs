//! Mail filters

use super::LabelId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a filter (assigned by the mail system)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(pub String);

impl FilterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FilterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FilterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which messages a filter matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl FilterCriteria {
    /// Match mail from any of the given senders, written as a `{a b c}` OR-set
    pub fn from_any<I, S>(senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = senders
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            from: Some(format!("{{{}}}", joined)),
        }
    }

    /// Senders listed in the `from` criterion, unwrapping an OR-set if present
    pub fn senders(&self) -> Vec<&str> {
        let Some(from) = self.from.as_deref() else {
            return Vec::new();
        };
        let inner = from
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(from);
        inner.split_whitespace().collect()
    }
}

/// What a filter does to matching messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterAction {
    #[serde(default)]
    pub add_label_ids: Vec<LabelId>,
    #[serde(default)]
    pub remove_label_ids: Vec<LabelId>,
}

/// Filter content without an id: the payload of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub criteria: FilterCriteria,
    pub action: FilterAction,
}

impl FilterSpec {
    /// Label mail from `senders` with `label` and keep it out of spam
    pub fn label_senders<I, S>(senders: I, label: LabelId, spam: LabelId) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            criteria: FilterCriteria::from_any(senders),
            action: FilterAction {
                add_label_ids: vec![label],
                remove_label_ids: vec![spam],
            },
        }
    }
}

/// A deployed filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub id: FilterId,
    pub criteria: FilterCriteria,
    pub action: FilterAction,
}

impl Filter {
    pub fn new(id: impl Into<FilterId>, spec: FilterSpec) -> Self {
        Self {
            id: id.into(),
            criteria: spec.criteria,
            action: spec.action,
        }
    }

    /// Content of the filter with its id dropped
    pub fn spec(&self) -> FilterSpec {
        FilterSpec {
            criteria: self.criteria.clone(),
            action: self.action.clone(),
        }
    }

    /// Whether any label this filter adds satisfies `pred`
    pub fn adds_any_label(&self, mut pred: impl FnMut(&LabelId) -> bool) -> bool {
        self.action.add_label_ids.iter().any(|id| pred(id))
    }
}
