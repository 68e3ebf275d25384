use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A role's copy: one string, or one string per area for multi-area roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleValue {
    One(String),
    Many(Vec<String>),
}

impl RoleValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            RoleValue::One(s) => vec![s.as_str()],
            RoleValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }

    /// First value, used where a role is consumed as a single string (headline, body).
    pub fn first(&self) -> Option<&str> {
        self.values().into_iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.trim().is_empty())
    }
}

/// One complete multi-role copy variant produced by the candidate producer.
///
/// Bundles are treated as immutable inputs; cleaning produces new bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    /// Categorical creative angle, used for quota balancing.
    #[serde(default)]
    pub angle: String,
    pub roles: BTreeMap<String, RoleValue>,
}

impl Bundle {
    pub fn role(&self, role: &str) -> Option<&RoleValue> {
        self.roles.get(role)
    }

    /// First value of a role, if present.
    pub fn text(&self, role: &str) -> Option<&str> {
        self.roles.get(role).and_then(RoleValue::first)
    }
}
