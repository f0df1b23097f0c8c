// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

pub mod crm;

use std::cmp::{Ord, Ordering};
use std::fmt;

/// A named group of hosts managed as one cluster.
///
/// Identity, ordering and equality go by name only; the host list is
/// configuration payload.
#[derive(Debug, Clone, Eq, serde::Serialize, serde::Deserialize)]
pub struct Cluster {
    pub name: String,
    pub hosts: Vec<String>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: vec![],
        }
    }
}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Ord for Cluster {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for Cluster {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Whether a CRM mutation runs against the live CIB or is only simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RunMode {
    Live,
    Test,
}

impl RunMode {
    pub fn is_live(self) -> bool {
        self == RunMode::Live
    }
}
