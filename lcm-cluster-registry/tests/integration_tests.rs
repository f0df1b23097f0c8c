// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use lcm_cluster_registry::ClusterRegistry;
use lcm_wire_types::Cluster;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_add_remove_snapshot() {
    let registry = Arc::new(ClusterRegistry::new());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = Arc::clone(&registry);

            thread::spawn(move || {
                for i in 0..50 {
                    let cluster = Cluster::new(format!("w{}-{}", w, i));
                    registry.add(cluster.clone());

                    // odd entries are taken right back out
                    if i % 2 == 1 {
                        registry.remove(&cluster);
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);

            thread::spawn(move || {
                for _ in 0..100 {
                    let snap = registry.snapshot();

                    // a snapshot is always internally consistent
                    let mut sorted = snap.clone();
                    sorted.sort();
                    sorted.dedup();
                    assert_eq!(snap, sorted);

                    registry.has_name("w0-0");
                    registry.next_cluster_name("Cluster");
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let snap = registry.snapshot();

    let mut expected: Vec<_> = (0..4)
        .flat_map(|w| {
            (0..50)
                .filter(|i| i % 2 == 0)
                .map(move |i| Cluster::new(format!("w{}-{}", w, i)))
        })
        .collect();
    expected.sort();

    assert_eq!(snap, expected);
}

#[test]
fn test_default_names_are_unique_when_used() {
    let registry = ClusterRegistry::new();

    for _ in 0..3 {
        let name = registry.default_cluster_name();
        assert!(!registry.has_name(&name));
        registry.add(Cluster::new(name));
    }

    let snap = registry.snapshot();
    let names: Vec<_> = snap.iter().map(|c| c.name.as_str()).collect();

    assert_eq!(names, vec!["Cluster1", "Cluster2", "Cluster3"]);
}
