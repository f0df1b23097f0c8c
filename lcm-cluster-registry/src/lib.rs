// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

//! The set of all configured clusters.
//!
//! One registry instance is constructed by the process entry point and
//! handed by reference to whoever needs it. Readers share the lock,
//! `add`/`remove` take it exclusively, and every accessor returns
//! copies so a snapshot never changes under a caller.

use lcm_wire_types::Cluster;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::RwLock;

/// Base used by [`ClusterRegistry::default_cluster_name`].
pub const DEFAULT_CLUSTER_NAME: &str = "Cluster";

#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: RwLock<BTreeSet<Cluster>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cluster. Adding one that is already present is a no-op.
    pub fn add(&self, cluster: Cluster) {
        self.clusters
            .write()
            .expect("clusters lock poisoned")
            .insert(cluster);
    }

    /// Removes a cluster. Removing an absent one is a no-op.
    pub fn remove(&self, cluster: &Cluster) {
        self.clusters
            .write()
            .expect("clusters lock poisoned")
            .remove(cluster);
    }

    pub fn contains(&self, cluster: &Cluster) -> bool {
        self.clusters
            .read()
            .expect("clusters lock poisoned")
            .contains(cluster)
    }

    /// Independent copy of the members, ordered by name.
    pub fn snapshot(&self) -> Vec<Cluster> {
        self.clusters
            .read()
            .expect("clusters lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Exact, case-sensitive name membership test.
    pub fn has_name(&self, name: &str) -> bool {
        self.clusters
            .read()
            .expect("clusters lock poisoned")
            .iter()
            .any(|c| c.name == name)
    }

    /// Finds the biggest index among members named `<base><digits>` and
    /// returns `base` with that index incremented, so freshly created
    /// clusters get distinct default names.
    pub fn next_cluster_name(&self, base: &str) -> String {
        let re = Regex::new(&format!(r"^{}(\d+)$", regex::escape(base)))
            .expect("escaped base name is a valid pattern");

        let index = self
            .clusters
            .read()
            .expect("clusters lock poisoned")
            .iter()
            .filter_map(|c| re.captures(&c.name))
            .filter_map(|caps| caps[1].parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        format!("{}{}", base, index + 1)
    }

    pub fn default_cluster_name(&self) -> String {
        self.next_cluster_name(DEFAULT_CLUSTER_NAME)
    }
}
