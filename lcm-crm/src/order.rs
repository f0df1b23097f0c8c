// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use crate::{ClusterStatusSource, CrmExecutor, CrmSchema, Error, OrderCommand, ParamSink};
use lcm_wire_types::crm::{
    ResourceRef, RscSet, Score, REQUIRE_ALL_ATTR, SCORE_CONSTRAINT_PARAM,
};
use lcm_wire_types::RunMode;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::sync::{Arc, Mutex};
use version_utils::Version;

pub const NOT_AVAIL_FOR_PCMK_VERSION: &str = "Not available for this version of Pacemaker";

const SYMMETRICAL_ATTR: &str = "symmetrical";
const FIRST_ACTION_ATTR: &str = "first-action";
const THEN_ACTION_ATTR: &str = "then-action";
const SEQUENTIAL_ATTR: &str = "sequential";
const ACTION_ATTR: &str = "action";

/// Which of the three mutually exclusive order shapes applies,
/// derived solely from the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderShape {
    /// Both endpoints concrete resources.
    Plain,
    /// One endpoint is a resource-set placeholder.
    SetEdge,
    /// Set-to-set ordering; at least one endpoint is unset.
    SetOrder,
}

#[derive(Debug, Default)]
struct ParamState {
    current: Option<String>,
    saved: Option<String>,
}

#[derive(Default)]
struct ConstraintState {
    params: BTreeMap<String, ParamState>,
    sink: Option<Box<dyn ParamSink + Send>>,
}

/// One order dependency ("start first before then") inside a connection.
///
/// `reconcile` folds in the authoritative cluster state, `apply` pushes
/// edited values out through the executor. Both serialize on the
/// per-instance parameter cache, so they never interleave for the same
/// constraint.
pub struct OrderConstraint {
    id: String,
    connection: String,
    first: Option<ResourceRef>,
    then: Option<ResourceRef>,
    pacemaker_version: Option<String>,
    schema: Arc<dyn CrmSchema + Send + Sync>,
    state: Mutex<ConstraintState>,
}

impl OrderConstraint {
    pub fn new(
        id: impl Into<String>,
        connection: impl Into<String>,
        schema: Arc<dyn CrmSchema + Send + Sync>,
    ) -> Self {
        Self {
            id: id.into(),
            connection: connection.into(),
            first: None,
            then: None,
            pacemaker_version: None,
            schema,
            state: Mutex::new(ConstraintState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn first(&self) -> Option<&ResourceRef> {
        self.first.as_ref()
    }

    pub fn then(&self) -> Option<&ResourceRef> {
        self.then.as_ref()
    }

    /// Sets the "first" endpoint.
    pub fn set_first(&mut self, first: Option<ResourceRef>) {
        self.first = first;
    }

    /// Sets the "then" endpoint.
    pub fn set_then(&mut self, then: Option<ResourceRef>) {
        self.then = then;
    }

    /// Pacemaker version of the designated controller, once known.
    pub fn set_pacemaker_version(&mut self, version: Option<String>) {
        self.pacemaker_version = version;
    }

    pub fn shape(&self) -> OrderShape {
        match (&self.first, &self.then) {
            (Some(f), Some(t)) if f.is_placeholder() || t.is_placeholder() => OrderShape::SetEdge,
            (Some(_), Some(_)) => OrderShape::Plain,
            _ => OrderShape::SetOrder,
        }
    }

    /// Parameter names exposed for the current shape.
    pub fn parameters(&self) -> Vec<String> {
        match self.shape() {
            OrderShape::SetOrder => self.schema.resource_set_order_parameters(),
            OrderShape::SetEdge => self.schema.rsc_set_connection_parameters(),
            OrderShape::Plain => self.schema.order_parameters(),
        }
    }

    /// Resource set sitting on the edge to a placeholder. The parent
    /// placeholder owns the "then" side set, a child placeholder the
    /// "first" side.
    fn edge_rsc_set(&self) -> Option<&RscSet> {
        match (&self.first, &self.then) {
            (Some(ResourceRef::Placeholder(p)), _) => Some(&p.sets.then_set),
            (_, Some(ResourceRef::Placeholder(p))) => Some(&p.sets.first_set),
            _ => None,
        }
    }

    /// Folds the last-observed cluster state into the parameter cache.
    ///
    /// Values absent from the status (or empty) fall back to the schema
    /// default. Each change is mirrored to the attached sink. Running
    /// this twice against the same status changes nothing the second
    /// time.
    pub fn reconcile(&self, status: &dyn ClusterStatusSource) {
        let mut node: BTreeMap<&str, String> = BTreeMap::new();

        match self.shape() {
            OrderShape::SetOrder => {
                if let Some(data) = status.order_data(&self.id) {
                    if let Some(score) = data.score {
                        node.insert(SCORE_CONSTRAINT_PARAM, score);
                    }
                }
            }
            OrderShape::SetEdge => {
                if let Some(set) = self.edge_rsc_set() {
                    if let Some(x) = &set.sequential {
                        node.insert(SEQUENTIAL_ATTR, x.clone());
                    }
                    if let Some(x) = &set.require_all {
                        node.insert(REQUIRE_ALL_ATTR, x.clone());
                    }
                    if let Some(x) = &set.order_action {
                        node.insert(ACTION_ATTR, x.clone());
                    }
                }
            }
            OrderShape::Plain => match status.order_data(&self.id) {
                Some(data) => {
                    if let Some(x) = data.score {
                        node.insert(SCORE_CONSTRAINT_PARAM, x);
                    }
                    if let Some(x) = data.symmetrical {
                        node.insert(SYMMETRICAL_ATTR, x);
                    }
                    if let Some(x) = data.first_action {
                        node.insert(FIRST_ACTION_ATTR, x);
                    }
                    if let Some(x) = data.then_action {
                        node.insert(THEN_ACTION_ATTR, x);
                    }
                }
                // No record for a plain order keeps the cached values;
                // defaults are not substituted here.
                None => return,
            },
        }

        let mut guard = self.state.lock().expect("constraint state poisoned");
        let state = &mut *guard;

        for param in self.parameters() {
            let value = node
                .get(param.as_str())
                .filter(|v| !v.is_empty())
                .cloned()
                .or_else(|| self.schema.default_value(&param));

            let entry = state.params.entry(param.clone()).or_default();

            if entry.saved != value {
                entry.saved = value.clone();
                entry.current = value.clone();

                if let Some(sink) = &state.sink {
                    sink.param_changed(&param, value.as_deref());
                }
            }
        }
    }

    /// Editable value coming from the presentation layer.
    pub fn set_param(&self, param: &str, value: Option<String>) {
        let mut state = self.state.lock().expect("constraint state poisoned");

        state.params.entry(param.to_string()).or_default().current = value;
    }

    pub fn param(&self, param: &str) -> Option<String> {
        let state = self.state.lock().expect("constraint state poisoned");

        state.params.get(param).and_then(|s| s.current.clone())
    }

    pub fn saved_param(&self, param: &str) -> Option<String> {
        let state = self.state.lock().expect("constraint state poisoned");

        state.params.get(param).and_then(|s| s.saved.clone())
    }

    pub fn is_changed(&self) -> bool {
        let state = self.state.lock().expect("constraint state poisoned");

        self.parameters().iter().any(|p| {
            state
                .params
                .get(p)
                .map(|s| s.current != s.saved)
                .unwrap_or(false)
        })
    }

    pub fn attach_sink(&self, sink: Box<dyn ParamSink + Send>) {
        let mut state = self.state.lock().expect("constraint state poisoned");

        state.sink = Some(sink);
    }

    fn command(&self, attrs: BTreeMap<String, String>) -> OrderCommand {
        let constraint_id = self.id.clone();

        match (&self.first, &self.then) {
            (Some(ResourceRef::Concrete(f)), Some(ResourceRef::Concrete(t))) => {
                OrderCommand::Order {
                    constraint_id,
                    first: f.id.clone(),
                    then: t.id.clone(),
                    attrs,
                }
            }
            (Some(ResourceRef::Placeholder(p)), Some(_)) => OrderCommand::RscSetEdge {
                constraint_id,
                rsc_set: p.sets.then_set.clone(),
                attrs,
            },
            (Some(_), Some(ResourceRef::Placeholder(p))) => OrderCommand::RscSetEdge {
                constraint_id,
                rsc_set: p.sets.first_set.clone(),
                attrs,
            },
            _ => OrderCommand::RscSetOrder {
                constraint_id,
                attrs,
            },
        }
    }

    /// Commits edited parameters.
    ///
    /// A no-op when nothing differs from the saved values. Otherwise
    /// exactly one command goes out, carrying the non-default values,
    /// and on a live run the edited values become the saved ones.
    pub fn apply(
        &self,
        dc_host: &str,
        executor: &dyn CrmExecutor,
        run_mode: RunMode,
    ) -> Result<(), Error> {
        let params = self.parameters();
        let mut state = self.state.lock().expect("constraint state poisoned");

        let mut changed = false;
        let mut attrs = BTreeMap::new();

        for param in &params {
            let entry = state.params.get(param);
            let current = entry.and_then(|s| s.current.clone());
            let saved = entry.and_then(|s| s.saved.clone());

            if current != saved {
                changed = true;
            }

            if let Some(value) = current {
                if self.schema.default_value(param).as_ref() != Some(&value) {
                    attrs.insert(param.clone(), value);
                }
            }
        }

        if !changed {
            return Ok(());
        }

        executor.apply_order(dc_host, self.command(attrs), run_mode)?;

        if run_mode.is_live() {
            for param in &params {
                if let Some(entry) = state.params.get_mut(param) {
                    entry.saved = entry.current.clone();
                }
            }
        }

        Ok(())
    }

    /// Score recorded for this constraint, with the CIB sentinels mapped
    /// to ±1,000,000 and "no record" mapped to 0. A non-numeric,
    /// non-sentinel score is a parse error for the caller.
    pub fn score(&self, status: &dyn ClusterStatusSource) -> Result<i32, Error> {
        let data = match status.order_data(&self.id) {
            Some(x) => x,
            None => return Ok(0),
        };

        let score = match data.score {
            Some(x) => x,
            None => return Ok(0),
        };

        Ok(Score::try_from(score.as_str())?.to_i32())
    }

    /// `None` when the parameter is editable, otherwise the reason it
    /// is not. Only `require-all` is ever gated: it needs a controller
    /// running pacemaker newer than 1.1.7. An unparseable version fails
    /// open.
    pub fn is_enabled(&self, param: &str) -> Option<String> {
        if param != REQUIRE_ALL_ATTR {
            return None;
        }

        let pm_v = match &self.pacemaker_version {
            Some(x) => x,
            None => return Some(NOT_AVAIL_FOR_PCMK_VERSION.to_string()),
        };

        match pm_v.parse::<Version>() {
            Ok(v) if v <= Version::new(vec![1, 1, 7]) => {
                Some(NOT_AVAIL_FOR_PCMK_VERSION.to_string())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("is_enabled: unknown pacemaker version {}: {}", pm_v, e);
                None
            }
        }
    }

    /// Long description with the endpoint names spliced in once both
    /// ends of the constraint are known.
    pub fn long_desc(&self, param: &str) -> String {
        let text = self.schema.long_desc(param);

        match (&self.first, &self.then) {
            (Some(f), Some(t)) => text
                .replace("@FIRST-RSC@", f.label())
                .replace("@THEN-RSC@", t.label()),
            _ => text,
        }
    }

    pub fn short_desc(&self, param: &str) -> String {
        self.schema.short_desc(param)
    }

    pub fn param_type(&self, param: &str) -> String {
        self.schema.param_type(param)
    }

    pub fn section(&self, param: &str) -> String {
        self.schema.section(param)
    }

    pub fn default_value(&self, param: &str) -> Option<String> {
        self.schema.default_value(param)
    }

    pub fn preferred_value(&self, param: &str) -> Option<String> {
        self.schema.preferred_value(param)
    }

    pub fn is_required(&self, param: &str) -> bool {
        self.schema.is_required(param)
    }

    pub fn is_boolean(&self, param: &str) -> bool {
        self.schema.is_boolean(param)
    }

    pub fn is_time_type(&self, param: &str) -> bool {
        self.schema.is_time_type(param)
    }

    pub fn is_integer(&self, param: &str) -> bool {
        self.schema.is_integer(param)
    }

    pub fn is_label(&self, param: &str) -> bool {
        self.schema.is_label(param)
    }

    pub fn check_param(&self, param: &str, value: &str) -> bool {
        self.schema.check_value(param, value)
    }

    /// Action choices depend on whether the relevant endpoint can be
    /// promoted; for a set edge that is "any member of the set".
    pub fn possible_choices(
        &self,
        param: &str,
        status: &dyn ClusterStatusSource,
    ) -> Vec<String> {
        let promotable = match param {
            ACTION_ATTR => self
                .edge_rsc_set()
                .map(|s| status.is_any_promoted(&s.rsc_ids))
                .unwrap_or(false),
            FIRST_ACTION_ATTR => {
                matches!(&self.first, Some(ResourceRef::Concrete(s)) if s.promotable)
            }
            THEN_ACTION_ATTR => {
                matches!(&self.then, Some(ResourceRef::Concrete(s)) if s.promotable)
            }
            _ => false,
        };

        self.schema.possible_choices(param, promotable)
    }
}
