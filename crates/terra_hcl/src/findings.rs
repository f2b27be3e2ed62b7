//! Validation findings accumulated during compilation.

use serde::{Deserialize, Serialize};

/// Finding severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    UnresolvedConnection,
    AmbiguousRule,
    DuplicateProvider,
    UnknownResourceType,
    GeneratorFailed,
    MissingProperty,
    ReferenceOverwroteValue,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::UnresolvedConnection
            | FindingKind::AmbiguousRule
            | FindingKind::DuplicateProvider
            | FindingKind::MissingProperty => Severity::Warning,
            FindingKind::UnknownResourceType | FindingKind::GeneratorFailed => Severity::Error,
            FindingKind::ReferenceOverwroteValue => Severity::Info,
        }
    }
}

/// One validation finding, tagged with the offending node or edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            node_id: None,
            edge_id: None,
        }
    }

    pub fn on_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn on_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.edge_id = Some(edge_id.into());
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(node) = &self.node_id {
            write!(f, " (node {})", node)?;
        }
        if let Some(edge) = &self.edge_id {
            write!(f, " (edge {})", edge)?;
        }
        Ok(())
    }
}

/// Ordered list of findings for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, finding: Finding) {
        self.items.push(finding);
    }

    pub fn extend(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(move |f| f.kind == kind)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|f| f.severity == severity).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_kind() {
        assert_eq!(FindingKind::UnknownResourceType.severity(), Severity::Error);
        assert_eq!(FindingKind::AmbiguousRule.severity(), Severity::Warning);
        assert_eq!(FindingKind::ReferenceOverwroteValue.severity(), Severity::Info);
    }

    #[test]
    fn test_findings_counts() {
        let mut findings = Findings::new();
        findings.push(Finding::new(FindingKind::UnresolvedConnection, "no rule").on_edge("e1"));
        assert!(!findings.has_errors());

        findings.push(Finding::new(FindingKind::GeneratorFailed, "boom").on_node("n1"));
        assert!(findings.has_errors());
        assert_eq!(findings.count(Severity::Warning), 1);
        assert_eq!(findings.of_kind(FindingKind::GeneratorFailed).count(), 1);
    }

    #[test]
    fn test_display() {
        let finding = Finding::new(FindingKind::UnresolvedConnection, "no rule").on_edge("e1");
        assert_eq!(finding.to_string(), "[warning] no rule (edge e1)");
    }

    #[test]
    fn test_json_shape() {
        let finding = Finding::new(FindingKind::DuplicateProvider, "dup");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "duplicate-provider");
        assert_eq!(json["severity"], "warning");
        assert!(json.get("node_id").is_none());
    }
}
