//! Connection rules and edge-to-rule resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::ResourceTypeId;

/// Which endpoint of an edge receives an injected reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSide {
    Source,
    Target,
}

/// Reference-creation directive of a connection rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatesReference {
    pub side: ReferenceSide,
    pub property_key: String,
    /// Attribute of the other resource to reference; `id` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl CreatesReference {
    pub const DEFAULT_ATTRIBUTE: &'static str = "id";

    pub fn attribute(&self) -> &str {
        self.attribute.as_deref().unwrap_or(Self::DEFAULT_ATTRIBUTE)
    }
}

/// Declares that a `(type, handle) -> (type, handle)` edge is legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRule {
    pub source_type: ResourceTypeId,
    pub source_handle: String,
    pub target_type: ResourceTypeId,
    pub target_handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates_reference: Option<CreatesReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConnectionRule {
    pub fn new(
        source: (&str, &str),
        target: (&str, &str),
    ) -> Self {
        Self {
            source_type: source.0.to_string(),
            source_handle: source.1.to_string(),
            target_type: target.0.to_string(),
            target_handle: target.1.to_string(),
            creates_reference: None,
            label: None,
        }
    }

    /// Inject a reference to the source resource into a target property.
    pub fn referencing_source(mut self, property_key: impl Into<String>, attribute: Option<&str>) -> Self {
        self.creates_reference = Some(CreatesReference {
            side: ReferenceSide::Target,
            property_key: property_key.into(),
            attribute: attribute.map(str::to_string),
        });
        self
    }

    /// Inject a reference to the target resource into a source property.
    pub fn referencing_target(mut self, property_key: impl Into<String>, attribute: Option<&str>) -> Self {
        self.creates_reference = Some(CreatesReference {
            side: ReferenceSide::Source,
            property_key: property_key.into(),
            attribute: attribute.map(str::to_string),
        });
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Exact four-way match. Direction is significant.
    pub fn matches(&self, edge: &EdgeEndpoints<'_>) -> bool {
        self.source_type == edge.source_type
            && self.source_handle == edge.source_handle
            && self.target_type == edge.target_type
            && self.target_handle == edge.target_handle
    }
}

/// The typed endpoints of a drawn edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEndpoints<'a> {
    pub source_type: &'a str,
    pub source_handle: &'a str,
    pub target_type: &'a str,
    pub target_handle: &'a str,
}

impl std::fmt::Display for EdgeEndpoints<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] -> {}[{}]",
            self.source_type, self.source_handle, self.target_type, self.target_handle
        )
    }
}

/// Outcome of matching an edge against a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleResolution<'r> {
    Matched(&'r ConnectionRule),
    /// Several rules share the tuple; the first registered one governs.
    Ambiguous {
        rule: &'r ConnectionRule,
        candidates: usize,
    },
    Unresolved,
}

impl<'r> RuleResolution<'r> {
    pub fn rule(&self) -> Option<&'r ConnectionRule> {
        match self {
            Self::Matched(rule) | Self::Ambiguous { rule, .. } => Some(rule),
            Self::Unresolved => None,
        }
    }
}

/// Matches edges against the union of registered connection rules.
pub struct ConnectionRuleResolver;

impl ConnectionRuleResolver {
    /// Find the rule governing an edge. Rules are scanned in registration order.
    pub fn resolve<'r>(rules: &'r [ConnectionRule], edge: &EdgeEndpoints<'_>) -> RuleResolution<'r> {
        let mut matching = rules.iter().filter(|rule| rule.matches(edge));

        let Some(first) = matching.next() else {
            debug!("No connection rule for {}", edge);
            return RuleResolution::Unresolved;
        };

        let others = matching.count();
        if others > 0 {
            RuleResolution::Ambiguous {
                rule: first,
                candidates: others + 1,
            }
        } else {
            RuleResolution::Matched(first)
        }
    }

    /// Rules a given source handle can connect through.
    pub fn valid_targets<'r>(
        rules: &'r [ConnectionRule],
        source_type: &str,
        source_handle: &str,
    ) -> Vec<&'r ConnectionRule> {
        rules
            .iter()
            .filter(|r| r.source_type == source_type && r.source_handle == source_handle)
            .collect()
    }

    /// Rules a given target handle can be reached through.
    pub fn valid_sources<'r>(
        rules: &'r [ConnectionRule],
        target_type: &str,
        target_handle: &str,
    ) -> Vec<&'r ConnectionRule> {
        rules
            .iter()
            .filter(|r| r.target_type == target_type && r.target_handle == target_handle)
            .collect()
    }
}
