// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use std::convert::TryFrom;
use std::fmt;

pub const INFINITY: i32 = 1_000_000;
pub const NEG_INFINITY: i32 = -1_000_000;

/// Attribute name of the score parameter on order constraints.
pub const SCORE_CONSTRAINT_PARAM: &str = "score";
/// Attribute name of the require-all parameter on resource sets.
pub const REQUIRE_ALL_ATTR: &str = "require-all";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} failed to parse {1}")]
    ParseError(String, String),
}

impl Error {
    fn parse(t: impl Into<String>, v: impl Into<String>) -> Self {
        Self::ParseError(t.into(), v.into())
    }
}

/// Constraint score as recorded in the CIB.
///
/// The sentinel strings map to the values pacemaker clamps to
/// internally (±1,000,000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Score {
    Infinity,
    NegInfinity,
    Value(i32),
}

impl Score {
    pub fn to_i32(self) -> i32 {
        match self {
            Score::Infinity => INFINITY,
            Score::NegInfinity => NEG_INFINITY,
            Score::Value(v) => v,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            Score::Value(v) => write!(f, "{}", v),
            Score::Infinity => write!(f, "INFINITY"),
            Score::NegInfinity => write!(f, "-INFINITY"),
        }
    }
}

impl TryFrom<&str> for Score {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim() {
            "INFINITY" | "+INFINITY" => Ok(Score::Infinity),
            "-INFINITY" => Ok(Score::NegInfinity),
            x => x
                .parse::<i32>()
                .map(Score::Value)
                .map_err(|_| Error::parse("Score", x)),
        }
    }
}

/// Action half of an order constraint (`first-action`/`then-action`),
/// or the shared action of a resource set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrmAction {
    Start,
    Promote,
    Demote,
    Stop,
}

impl fmt::Display for CrmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            CrmAction::Start => write!(f, "start"),
            CrmAction::Promote => write!(f, "promote"),
            CrmAction::Demote => write!(f, "demote"),
            CrmAction::Stop => write!(f, "stop"),
        }
    }
}

impl TryFrom<&str> for CrmAction {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().trim() {
            "start" => Ok(CrmAction::Start),
            "promote" => Ok(CrmAction::Promote),
            "demote" => Ok(CrmAction::Demote),
            "stop" => Ok(CrmAction::Stop),
            e => Err(Error::parse("CrmAction", e)),
        }
    }
}

/// Last-observed state of one plain order constraint, as reported by
/// the cluster status poller. Absent fields were not present in the CIB.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderData {
    pub score: Option<String>,
    pub symmetrical: Option<String>,
    pub first_action: Option<String>,
    pub then_action: Option<String>,
}

/// One resource set inside a set constraint.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RscSet {
    pub id: String,
    pub rsc_ids: Vec<String>,
    pub sequential: Option<String>,
    pub require_all: Option<String>,
    pub order_action: Option<String>,
}

/// The two resource sets an order placeholder sits between.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RscSetConnection {
    pub first_set: RscSet,
    pub then_set: RscSet,
}

/// A concrete cluster resource (service) endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
    /// Master/slave capable, drives the action choices offered.
    pub promotable: bool,
}

/// A resource-set placeholder endpoint.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaceholderRef {
    pub id: String,
    pub sets: RscSetConnection,
}

/// Endpoint of an order constraint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ResourceRef {
    Concrete(ServiceRef),
    Placeholder(PlaceholderRef),
}

impl ResourceRef {
    pub fn label(&self) -> &str {
        match self {
            ResourceRef::Concrete(x) => &x.name,
            ResourceRef::Placeholder(x) => &x.id,
        }
    }

    pub fn crm_id(&self) -> &str {
        match self {
            ResourceRef::Concrete(x) => &x.id,
            ResourceRef::Placeholder(x) => &x.id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResourceRef::Placeholder(_))
    }
}

impl From<ServiceRef> for ResourceRef {
    fn from(x: ServiceRef) -> Self {
        ResourceRef::Concrete(x)
    }
}

impl From<PlaceholderRef> for ResourceRef {
    fn from(x: PlaceholderRef) -> Self {
        ResourceRef::Placeholder(x)
    }
}
