// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

//! In-process model of CRM order constraints.
//!
//! The model sits between the presentation layer and three external
//! collaborators: the CRM schema metadata, the cluster status poller
//! and the remote command executor. All three are traits here and are
//! implemented elsewhere (the presentation layer wires the real ones,
//! tests use recording fakes).

mod order;

pub use order::{OrderConstraint, OrderShape, NOT_AVAIL_FOR_PCMK_VERSION};

use lcm_wire_types::crm::{OrderData, RscSet};
use lcm_wire_types::RunMode;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidValue(#[from] lcm_wire_types::crm::Error),
    #[error("crm command failed: {0}")]
    Command(String),
}

/// Schema metadata for constraint parameters, per constraint shape.
///
/// Backed by the RNG schema metadata shipped with pacemaker; the model
/// never interprets parameter semantics itself.
pub trait CrmSchema {
    fn order_parameters(&self) -> Vec<String>;
    fn resource_set_order_parameters(&self) -> Vec<String>;
    fn rsc_set_connection_parameters(&self) -> Vec<String>;

    fn long_desc(&self, param: &str) -> String;
    fn short_desc(&self, param: &str) -> String;
    fn param_type(&self, param: &str) -> String;
    fn section(&self, param: &str) -> String;
    fn default_value(&self, param: &str) -> Option<String>;
    fn preferred_value(&self, param: &str) -> Option<String>;
    /// `promotable` widens the action choices with promote/demote.
    fn possible_choices(&self, param: &str, promotable: bool) -> Vec<String>;
    fn is_required(&self, param: &str) -> bool;
    fn is_boolean(&self, param: &str) -> bool;
    fn is_time_type(&self, param: &str) -> bool;
    fn is_integer(&self, param: &str) -> bool;
    fn is_label(&self, param: &str) -> bool;
    fn check_value(&self, param: &str, value: &str) -> bool;
}

/// Authoritative constraint state as last reported by the cluster.
pub trait ClusterStatusSource {
    fn order_data(&self, constraint_id: &str) -> Option<OrderData>;
    /// True when at least one of the given resources runs promoted.
    fn is_any_promoted(&self, rsc_ids: &[String]) -> bool;
}

/// Executes one remote CRM mutation. Only success/failure comes back.
pub trait CrmExecutor {
    fn apply_order(
        &self,
        dc_host: &str,
        command: OrderCommand,
        run_mode: RunMode,
    ) -> Result<(), Error>;
}

/// Side channel to whatever input control currently projects a
/// parameter, if any.
pub trait ParamSink {
    fn param_changed(&self, param: &str, value: Option<&str>);
}

/// One remote order mutation, discriminated by constraint shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OrderCommand {
    /// Set-to-set ordering, only the constraint attributes change.
    RscSetOrder {
        constraint_id: String,
        attrs: BTreeMap<String, String>,
    },
    /// Edge between a placeholder and a concrete resource; the edge's
    /// resource set is rewritten together with the constraint.
    RscSetEdge {
        constraint_id: String,
        rsc_set: RscSet,
        attrs: BTreeMap<String, String>,
    },
    /// Plain first/then order between two concrete resources.
    Order {
        constraint_id: String,
        first: String,
        then: String,
        attrs: BTreeMap<String, String>,
    },
}
