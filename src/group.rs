//! Named particle groups and their capability-mask bits.
//!
//! Every extension is bound to one group at construction. Groups are the
//! prerequisite for cheap per-particle membership tests: each group owns a
//! unique bit in a fixed-width mask, and a particle belongs to a group when
//! its mask has that bit set. This module only manages the name-to-bit
//! assignment; particle membership itself lives with the particle storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GroupError;

/// Maximum number of groups a simulation can define.
///
/// One bit per group in a 32-bit capability mask.
pub const MAX_GROUPS: usize = 32;

/// Stable identifier for a particle group.
///
/// A `GroupId` is only handed out by [`GroupRegistry`] and indexes the
/// registry that produced it. Once created it never changes, so extensions
/// can hold it across the whole run.
///
/// # Examples
///
/// ```
/// use granule::GroupRegistry;
///
/// let groups = GroupRegistry::new();
/// let all = groups.lookup("all").unwrap();
/// assert_eq!(groups.bitmask(all), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(usize);

impl GroupId {
    /// Returns the registry slot this ID refers to.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Registry of named particle groups.
///
/// Assigns each group a unique bit in the shared capability mask. The
/// registry is created with the universal `all` group already defined at
/// bit 0; user groups claim the following bits in definition order.
///
/// # Examples
///
/// ```
/// use granule::GroupRegistry;
///
/// let mut groups = GroupRegistry::new();
/// let mobile = groups.create("mobile").unwrap();
/// assert_eq!(groups.bitmask(mobile), 2);
/// assert_eq!(groups.lookup("mobile"), Some(mobile));
/// assert_eq!(groups.lookup("frozen"), None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRegistry {
    names: Vec<String>,
}

impl GroupRegistry {
    /// Creates a registry with the universal `all` group at bit 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: vec!["all".to_string()],
        }
    }

    /// Defines a new group and assigns it the next free mask bit.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::EmptyGroupName`] for an empty name,
    /// [`GroupError::DuplicateGroup`] if the name is taken, and
    /// [`GroupError::TooManyGroups`] once all mask bits are claimed.
    pub fn create(&mut self, name: impl Into<String>) -> Result<GroupId, GroupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GroupError::EmptyGroupName);
        }
        if self.lookup(&name).is_some() {
            return Err(GroupError::DuplicateGroup { name });
        }
        if self.names.len() >= MAX_GROUPS {
            return Err(GroupError::TooManyGroups { max: MAX_GROUPS });
        }
        self.names.push(name);
        Ok(GroupId(self.names.len() - 1))
    }

    /// Resolves a group name to its ID.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<GroupId> {
        self.names.iter().position(|n| n == name).map(GroupId)
    }

    /// Returns the capability-mask bit owned by a group.
    #[must_use]
    pub fn bitmask(&self, id: GroupId) -> u32 {
        1 << id.0
    }

    /// Returns the name of a group.
    #[must_use]
    pub fn name(&self, id: GroupId) -> &str {
        &self.names[id.0]
    }

    /// Number of defined groups (including `all`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no groups are defined.
    ///
    /// Always false in practice since `all` is pre-seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
