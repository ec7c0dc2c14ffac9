//! Capability sets carried by tokens and required by operations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::Role;

/// Ordered set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(BTreeSet<Role>);

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Superset check: every required role must be present.
    pub fn satisfies(&self, required: &[Role]) -> bool {
        required.iter().all(|r| self.0.contains(r))
    }

    /// Required roles this set lacks.
    pub fn missing(&self, required: &[Role]) -> Vec<Role> {
        required
            .iter()
            .copied()
            .filter(|r| !self.0.contains(r))
            .collect()
    }
}

impl<const N: usize> From<[Role; N]> for ScopeSet {
    fn from(roles: [Role; N]) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl FromIterator<Role> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
