use std::collections::BTreeSet;
use std::fmt;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Well-known actions checked by the UI and request handlers.
///
/// Action sets stored in the database are not restricted to these; any other
/// token is carried through as-is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    New,
    View,
    Edit,
    Delete,
}

/// Set of action tokens granted on one menu, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(from = "Vec<String>")]
pub struct ActionSet(BTreeSet<String>);

impl From<Vec<String>> for ActionSet {
    fn from(tokens: Vec<String>) -> Self {
        tokens.into_iter().collect()
    }
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.0.contains(action)
    }

    pub fn allows(&self, action: Action) -> bool {
        self.contains(action.as_ref())
    }

    /// Adds a token; blank tokens are ignored.
    pub fn insert(&mut self, action: impl Into<String>) -> bool {
        let action = action.into();
        let action = action.trim();
        if action.is_empty() {
            return false;
        }
        self.0.insert(action.to_string())
    }

    pub fn remove(&mut self, action: &str) -> bool {
        self.0.remove(action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl From<&[Action]> for ActionSet {
    fn from(actions: &[Action]) -> Self {
        actions.iter().map(|action| action.as_ref().to_string()).collect()
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, action) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{action}")?;
        }
        write!(f, "]")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum DenyReason {
    /// No identity, or the identity does not map to a known user.
    Unauthenticated,
    /// The user, the menu, or the menu's module is deactivated.
    Inactive,
    /// The resolved action set does not include the requested action.
    Forbidden,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}
