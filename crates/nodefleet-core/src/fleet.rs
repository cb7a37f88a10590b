//! Fleet model
//!
//! A fleet is the ordered list of instances one run produced. Position
//! decides the role: index 0 is the primary, everything after is secondary.

use serde::{Deserialize, Serialize};

/// One provisioned instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetRecord {
    pub name: String,
    pub address: String,
}

impl FleetRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Secondary => write!(f, "secondary"),
        }
    }
}

/// Records in provisioning order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fleet {
    records: Vec<FleetRecord>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; only ever grows at the end
    pub fn push(&mut self, record: FleetRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FleetRecord] {
        &self.records
    }

    pub fn primary(&self) -> Option<&FleetRecord> {
        self.records.first()
    }

    pub fn secondaries(&self) -> &[FleetRecord] {
        self.records.get(1..).unwrap_or(&[])
    }

    pub fn role_of(index: usize) -> Role {
        if index == 0 {
            Role::Primary
        } else {
            Role::Secondary
        }
    }

    /// Records paired with their role
    pub fn iter_roles(&self) -> impl Iterator<Item = (Role, &FleetRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (Self::role_of(i), r))
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }
}

impl FromIterator<FleetRecord> for Fleet {
    fn from_iter<I: IntoIterator<Item = FleetRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
