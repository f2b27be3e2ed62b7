//! Terraform variables and outputs registered by generators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::{HclBlock, HclValue};
use crate::escape::quote;
use crate::model::PropertyValue;

/// A `variable` block contributed by a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformVariable {
    pub name: String,
    /// Terraform type expression, e.g. `string` or `list(string)`.
    #[serde(rename = "type")]
    pub var_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
    #[serde(default)]
    pub sensitive: bool,
}

impl TerraformVariable {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            description: description.into(),
            default: None,
            sensitive: false,
        }
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn to_block(&self) -> HclBlock {
        let block = HclBlock::new("variable")
            .with_label(self.name.as_str())
            .attr("type", HclValue::expr(self.var_type.as_str()))
            .attr("description", self.description.as_str())
            .attr_opt("default", self.default.as_ref());
        if self.sensitive {
            block.attr("sensitive", true)
        } else {
            block
        }
    }
}

/// An `output` block contributed by a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformOutput {
    pub name: String,
    /// Expression, emitted verbatim.
    pub value: String,
    pub description: String,
    #[serde(default)]
    pub sensitive: bool,
}

impl TerraformOutput {
    pub fn new(name: impl Into<String>, value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: description.into(),
            sensitive: false,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn to_block(&self) -> HclBlock {
        let block = HclBlock::new("output")
            .with_label(self.name.as_str())
            .attr("value", HclValue::expr(self.value.as_str()))
            .attr("description", self.description.as_str());
        if self.sensitive {
            block.attr("sensitive", true)
        } else {
            block
        }
    }
}

/// Anything collected by name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for TerraformVariable {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for TerraformOutput {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered, name-deduplicated collection. The first registration of a name wins.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    items: Vec<T>,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Named> Collector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already taken.
    pub fn add(&mut self, item: T) -> bool {
        if self.items.iter().any(|existing| existing.name() == item.name()) {
            debug!("{} already registered; keeping the first", item.name());
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub type VariableCollector = Collector<TerraformVariable>;
pub type OutputCollector = Collector<TerraformOutput>;

/// Everything generators registered during one compilation.
#[derive(Debug, Default)]
pub struct Collected {
    pub variables: VariableCollector,
    pub outputs: OutputCollector,
}

/// Collection sizes at a point in time, see [`Collected::rollback`].
#[derive(Debug, Clone, Copy)]
pub struct CollectedMark {
    variables: usize,
    outputs: usize,
}

impl Collected {
    pub fn mark(&self) -> CollectedMark {
        CollectedMark {
            variables: self.variables.items.len(),
            outputs: self.outputs.items.len(),
        }
    }

    /// Drop everything registered after `mark`.
    pub fn rollback(&mut self, mark: CollectedMark) {
        self.variables.items.truncate(mark.variables);
        self.outputs.items.truncate(mark.outputs);
    }
}

/// Render `terraform.tfvars` for the collected variables that have a
/// non-empty project value. `None` when no line would be written.
pub fn tfvars(variables: &[TerraformVariable], values: &BTreeMap<String, String>) -> Option<String> {
    let lines: Vec<String> = variables
        .iter()
        .filter_map(|v| {
            values
                .get(&v.name)
                .filter(|value| !value.is_empty())
                .map(|value| format!("{} = {}", v.name, quote(value)))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n") + "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::render_block;

    #[test]
    fn test_variable_block() {
        let var = TerraformVariable::new("sql_admin_password", "string", "Admin \"password\"")
            .with_default("")
            .sensitive();
        assert_eq!(
            render_block(&var.to_block()),
            "variable \"sql_admin_password\" {\n  type        = string\n  description = \"Admin \\\"password\\\"\"\n  default     = \"\"\n  sensitive   = true\n}\n"
        );
    }

    #[test]
    fn test_output_block() {
        let output = TerraformOutput::new("vault_uri", "azurerm_key_vault.kv.vault_uri", "Vault URI");
        assert_eq!(
            render_block(&output.to_block()),
            "output \"vault_uri\" {\n  value       = azurerm_key_vault.kv.vault_uri\n  description = \"Vault URI\"\n}\n"
        );
    }

    #[test]
    fn test_first_registration_wins() {
        let mut collector = VariableCollector::new();
        assert!(collector.add(TerraformVariable::new("sku", "string", "first")));
        assert!(!collector.add(TerraformVariable::new("sku", "string", "second")));
        assert!(collector.add(TerraformVariable::new("tier", "string", "tier")));

        let names: Vec<_> = collector.all().iter().map(|v| v.description.as_str()).collect();
        assert_eq!(names, vec!["first", "tier"]);
    }

    #[test]
    fn test_rollback_discards_later_registrations() {
        let mut collected = Collected::default();
        collected.variables.add(TerraformVariable::new("kept", "string", "kept"));
        let mark = collected.mark();
        collected.variables.add(TerraformVariable::new("dropped", "string", "dropped"));
        collected.outputs.add(TerraformOutput::new("dropped", "x.y.id", "dropped"));

        collected.rollback(mark);
        assert_eq!(collected.variables.all().len(), 1);
        assert!(collected.outputs.is_empty());
    }

    #[test]
    fn test_tfvars_only_set_values() {
        let variables = vec![
            TerraformVariable::new("sku", "string", "sku"),
            TerraformVariable::new("tier", "string", "tier"),
            TerraformVariable::new("region", "string", "region"),
        ];
        let mut values = BTreeMap::new();
        values.insert("sku".to_string(), "P1v3".to_string());
        values.insert("tier".to_string(), String::new());
        values.insert("unused".to_string(), "x".to_string());

        assert_eq!(tfvars(&variables, &values).as_deref(), Some("sku = \"P1v3\"\n"));
        assert_eq!(tfvars(&variables, &BTreeMap::new()), None);
    }
}
