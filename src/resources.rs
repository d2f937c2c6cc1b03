//! Resource selection parsed from `--resources`.
use anyhow::{anyhow, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// Token that expands to every assessable resource.
pub const ALL_TOKEN: &str = "all";

/// One assessable Apigee resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    TargetServers,
    KeyValueMaps,
    References,
    ResourceFiles,
    Keystores,
    FlowHooks,
    OrgKeyValueMaps,
    Developers,
    ApiProducts,
    Apis,
    Apps,
    SharedFlows,
    ApiTraffic,
}

impl ResourceKind {
    /// Every resource kind, in the order `all` expands to.
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::TargetServers,
        ResourceKind::KeyValueMaps,
        ResourceKind::References,
        ResourceKind::ResourceFiles,
        ResourceKind::Keystores,
        ResourceKind::FlowHooks,
        ResourceKind::OrgKeyValueMaps,
        ResourceKind::Developers,
        ResourceKind::ApiProducts,
        ResourceKind::Apis,
        ResourceKind::Apps,
        ResourceKind::SharedFlows,
        ResourceKind::ApiTraffic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::TargetServers => "targetservers",
            ResourceKind::KeyValueMaps => "keyvaluemaps",
            ResourceKind::References => "references",
            ResourceKind::ResourceFiles => "resourcefiles",
            ResourceKind::Keystores => "keystores",
            ResourceKind::FlowHooks => "flowhooks",
            ResourceKind::OrgKeyValueMaps => "org_keyvaluemaps",
            ResourceKind::Developers => "developers",
            ResourceKind::ApiProducts => "apiproducts",
            ResourceKind::Apis => "apis",
            ResourceKind::Apps => "apps",
            ResourceKind::SharedFlows => "sharedflows",
            ResourceKind::ApiTraffic => "api_traffic",
        }
    }

    pub fn from_token(token: &str) -> Option<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == token)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered, de-duplicated set of resources chosen for a run.
///
/// `all` is recorded separately until [`ResourceSelection::expanded`] so the
/// caller can tell an explicit list from the shorthand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSelection {
    kinds: Vec<ResourceKind>,
    all: bool,
}

impl ResourceSelection {
    /// Parse a comma separated list. `None` or an empty string selects nothing.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let mut selection = ResourceSelection::default();
        let Some(raw) = raw else {
            return Ok(selection);
        };
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if token == ALL_TOKEN {
                selection.all = true;
                continue;
            }
            let kind = ResourceKind::from_token(token).ok_or_else(|| {
                anyhow!("unknown resource {token:?} (see --help for the accepted list)")
            })?;
            if !selection.kinds.contains(&kind) {
                selection.kinds.push(kind);
            }
        }
        Ok(selection)
    }

    /// Resolve `all` into the full vocabulary; explicit lists are kept as-is.
    pub fn expanded(&self) -> Vec<ResourceKind> {
        if self.all {
            return ResourceKind::ALL.to_vec();
        }
        self.kinds.clone()
    }

    /// True when the effective selection includes `kind`, counting `all`.
    pub fn includes(&self, kind: ResourceKind) -> bool {
        self.all || self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.kinds.is_empty()
    }
}
