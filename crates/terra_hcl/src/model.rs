//! Diagram snapshot data model.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HclError, HclResult};

/// Fully qualified resource type identifier: `{provider}/{category}/{resource}`.
pub type ResourceTypeId = String;

/// Terraform provider identifier, e.g. `azurerm`, `aws`, `google`.
pub type ProviderId = String;

/// A property value on a resource instance.
///
/// In snapshot files a reference is written as `{"ref": "azurerm_x.y.id"}`;
/// every other variant maps onto the plain JSON scalar or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<PropertyValue>),
    Reference {
        #[serde(rename = "ref")]
        expression: String,
    },
}

impl PropertyValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn reference(expression: impl Into<String>) -> Self {
        Self::Reference {
            expression: expression.into(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::Reference { expression } => Some(expression),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// An empty string or empty list counts as unset. Whitespace is a value.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// How a generator emits a property value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyMode {
    /// The value is written inline.
    #[default]
    Literal,
    /// The value becomes the default of a Terraform variable, referenced as `var.<name>`.
    Variable,
}

/// One node of the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    /// Unique within the diagram.
    pub id: String,
    pub type_id: ResourceTypeId,
    /// Local (display) name, the `{name}` token of the naming template.
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    /// Properties the user chose to expose as variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variable_overrides: BTreeMap<String, PropertyMode>,
}

impl ResourceInstance {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            name: name.into(),
            properties: BTreeMap::new(),
            variable_overrides: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Expose a property as a Terraform variable.
    pub fn with_variable(mut self, key: impl Into<String>) -> Self {
        self.variable_overrides.insert(key.into(), PropertyMode::Variable);
        self
    }

    pub fn property_mode(&self, key: &str) -> PropertyMode {
        self.variable_overrides.get(key).copied().unwrap_or_default()
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Get a property that must be present and non-blank.
    pub fn require(&self, key: &str) -> HclResult<&PropertyValue> {
        self.properties
            .get(key)
            .filter(|v| !v.is_blank())
            .ok_or_else(|| HclError::MissingProperty {
                node: self.id.clone(),
                key: key.to_string(),
            })
    }

    /// Get a required string property.
    pub fn require_str(&self, key: &str) -> HclResult<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| HclError::InvalidProperty {
                node: self.id.clone(),
                key: key.to_string(),
                expected: "string".to_string(),
            })
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.property(key).and_then(|v| v.as_str()).unwrap_or(default)
    }
}

/// A drawn link between two named handles of two resource instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source_node_id: String,
    pub source_handle: String,
    pub target_node_id: String,
    pub target_handle: String,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        source: (&str, &str),
        target: (&str, &str),
    ) -> Self {
        Self {
            id: id.into(),
            source_node_id: source.0.to_string(),
            source_handle: source.1.to_string(),
            target_node_id: target.0.to_string(),
            target_handle: target.1.to_string(),
        }
    }
}

/// Project-level naming convention.
///
/// `{name}` is filled per resource; `{env}`, `{region}` and `{org}` come from
/// the project. A token whose field is absent is kept literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConvention {
    pub enabled: bool,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            enabled: false,
            template: "{name}".to_string(),
            env: None,
            region: None,
            org: None,
        }
    }
}

impl NamingConvention {
    pub fn new(template: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            enabled: true,
            template: template.into(),
            env: Some(env.into()),
            region: None,
            org: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }
}

/// Remote state backend declared inside the `terraform` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub backend_type: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Project-wide settings that shape the emitted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// User-supplied provider configuration, keyed by provider id.
    #[serde(default)]
    pub provider_configs: BTreeMap<ProviderId, BTreeMap<String, PropertyValue>>,
    /// Tags emitted as `local.common_tags`.
    #[serde(default)]
    pub common_tags: BTreeMap<String, String>,
    #[serde(default = "default_terraform_version")]
    pub terraform_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
    /// Values written to `terraform.tfvars` for collected variables.
    #[serde(default)]
    pub variable_values: BTreeMap<String, String>,
}

fn default_terraform_version() -> String {
    ">= 1.0".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            provider_configs: BTreeMap::new(),
            common_tags: BTreeMap::new(),
            terraform_version: default_terraform_version(),
            backend: None,
            variable_values: BTreeMap::new(),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a YAML or JSON file.
    pub fn from_file(path: &Path) -> HclResult<Self> {
        let content = fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    pub fn with_common_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.common_tags.insert(key.into(), value.into());
        self
    }

    pub fn with_variable_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variable_values.insert(name.into(), value.into());
        self
    }

    pub fn with_provider_setting(
        mut self,
        provider: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.provider_configs
            .entry(provider.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

/// A consistent point-in-time copy of the diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    /// Resource instances in creation order.
    #[serde(default)]
    pub nodes: Vec<ResourceInstance>,
    #[serde(default)]
    pub edges: Vec<Connection>,
    #[serde(default)]
    pub naming: NamingConvention,
    #[serde(default)]
    pub project: ProjectConfig,
}

impl DiagramSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: &Path) -> HclResult<Self> {
        let content = fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    pub fn with_node(mut self, node: ResourceInstance) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Connection) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_project(mut self, project: ProjectConfig) -> Self {
        self.project = project;
        self
    }

    pub fn node(&self, id: &str) -> Option<&ResourceInstance> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check structural consistency: unique node ids, edges between existing nodes.
    pub fn check_consistency(&self) -> HclResult<()> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(HclError::InvalidSnapshot(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.source_node_id, &edge.target_node_id] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(HclError::InvalidSnapshot(format!(
                        "edge '{}' references non-existent node '{}'",
                        edge.id, endpoint
                    )));
                }
            }
        }

        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
