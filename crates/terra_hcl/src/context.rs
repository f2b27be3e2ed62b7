//! Read-only view handed to generators.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::block::HclValue;
use crate::error::{HclError, HclResult};
use crate::model::{NamingConvention, ProjectConfig, PropertyMode, PropertyValue, ResourceInstance};
use crate::variables::{Collected, TerraformOutput, TerraformVariable};

/// Canonical identity of a resource within one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    /// Output of the naming template.
    pub resolved_name: String,
    /// Terraform identifier derived from the resolved name.
    pub label: String,
    /// `None` for virtual and unknown types.
    pub terraform_type: Option<String>,
}

impl ResourceIdentity {
    /// `<terraform_type>.<label>`, absent for resources that emit no block.
    pub fn address(&self) -> Option<String> {
        self.terraform_type
            .as_ref()
            .map(|tf_type| format!("{}.{}", tf_type, self.label))
    }
}

/// Working copies and identities of every resource in a compilation.
#[derive(Debug, Default)]
pub struct DiagramIndex {
    resources: HashMap<String, ResourceInstance>,
    identities: HashMap<String, ResourceIdentity>,
}

impl DiagramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: ResourceInstance, identity: ResourceIdentity) {
        self.identities.insert(resource.id.clone(), identity);
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceInstance> {
        self.resources.get(id)
    }

    pub fn resource_mut(&mut self, id: &str) -> Option<&mut ResourceInstance> {
        self.resources.get_mut(id)
    }

    pub fn identity(&self, id: &str) -> Option<&ResourceIdentity> {
        self.identities.get(id)
    }
}

/// Overrides for the variable registered by [`HclGenerationContext::property_expression`].
#[derive(Debug, Clone, Default)]
pub struct VariableOptions {
    /// Defaults to `<label>_<property>`.
    pub name: Option<String>,
    /// Defaults to a type inferred from the value.
    pub var_type: Option<String>,
    pub description: Option<String>,
    pub sensitive: bool,
}

impl VariableOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Context passed to [`crate::HclGenerator::generate`].
pub struct HclGenerationContext<'a> {
    identity: &'a ResourceIdentity,
    index: &'a DiagramIndex,
    naming: &'a NamingConvention,
    project: &'a ProjectConfig,
    collected: &'a RefCell<Collected>,
}

impl<'a> HclGenerationContext<'a> {
    pub fn new(
        identity: &'a ResourceIdentity,
        index: &'a DiagramIndex,
        naming: &'a NamingConvention,
        project: &'a ProjectConfig,
        collected: &'a RefCell<Collected>,
    ) -> Self {
        Self {
            identity,
            index,
            naming,
            project,
            collected,
        }
    }

    /// Resolved name of the resource being generated.
    pub fn resolved_name(&self) -> &str {
        &self.identity.resolved_name
    }

    /// Block label of the resource being generated.
    pub fn label(&self) -> &str {
        &self.identity.label
    }

    pub fn naming(&self) -> &NamingConvention {
        self.naming
    }

    /// Look up any resource of the diagram (with injected properties).
    pub fn resource(&self, id: &str) -> Option<&ResourceInstance> {
        self.index.resource(id)
    }

    /// Terraform address of another resource, if it emits a block.
    pub fn address(&self, id: &str) -> Option<String> {
        self.index.identity(id).and_then(ResourceIdentity::address)
    }

    /// `<address>.<attribute>` of another resource.
    pub fn attribute_reference(&self, id: &str, attribute: &str) -> HclResult<String> {
        self.address(id)
            .map(|addr| format!("{}.{}", addr, attribute))
            .ok_or_else(|| HclError::UnresolvedReference(id.to_string()))
    }

    /// User-supplied provider configuration.
    pub fn provider_config(&self, provider: &str) -> Option<&BTreeMap<String, PropertyValue>> {
        self.project.provider_configs.get(provider)
    }

    /// Register a variable; the first registration of a name wins.
    pub fn add_variable(&self, variable: TerraformVariable) {
        self.collected.borrow_mut().variables.add(variable);
    }

    /// Register an output; the first registration of a name wins.
    pub fn add_output(&self, output: TerraformOutput) {
        self.collected.borrow_mut().outputs.add(output);
    }

    /// Expression for a property value, honouring the resource's variable overrides.
    ///
    /// In variable mode the value becomes the default of a registered variable
    /// and `var.<name>` is returned. References are always emitted as written.
    pub fn property_expression(
        &self,
        resource: &ResourceInstance,
        key: &str,
        value: &PropertyValue,
        options: VariableOptions,
    ) -> HclValue {
        if resource.property_mode(key) == PropertyMode::Literal || value.as_reference().is_some() {
            return HclValue::from(value);
        }

        let name = options
            .name
            .unwrap_or_else(|| format!("{}_{}", self.identity.label, key));
        let var_type = options.var_type.unwrap_or_else(|| variable_type(value).to_string());
        let description = options
            .description
            .unwrap_or_else(|| format!("{} for {}", key, self.identity.resolved_name));

        let mut variable = TerraformVariable::new(name.as_str(), var_type, description).with_default(value.clone());
        variable.sensitive = options.sensitive;
        self.add_variable(variable);

        HclValue::expr(format!("var.{}", name))
    }

    /// `local.common_tags` when the project declares tags.
    pub fn common_tags(&self) -> Option<HclValue> {
        if self.project.common_tags.is_empty() {
            None
        } else {
            Some(HclValue::expr("local.common_tags"))
        }
    }
}

fn variable_type(value: &PropertyValue) -> &'static str {
    match value {
        PropertyValue::Bool(_) => "bool",
        PropertyValue::Number(_) => "number",
        PropertyValue::List(_) => "list(string)",
        PropertyValue::String(_) | PropertyValue::Reference { .. } => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> DiagramIndex {
        let mut index = DiagramIndex::new();
        index.insert(
            ResourceInstance::new("rg", "azurerm/core/resource_group", "main"),
            ResourceIdentity {
                resolved_name: "rg-main".to_string(),
                label: "rg_main".to_string(),
                terraform_type: Some("azurerm_resource_group".to_string()),
            },
        );
        index.insert(
            ResourceInstance::new("sub", "azurerm/core/subscription", "sub"),
            ResourceIdentity {
                resolved_name: "sub".to_string(),
                label: "sub".to_string(),
                terraform_type: None,
            },
        );
        index
    }

    #[test]
    fn test_attribute_reference() {
        let index = index();
        let naming = NamingConvention::default();
        let project = ProjectConfig::default();
        let identity = index.identity("rg").unwrap().clone();
        let collected = RefCell::new(Collected::default());
        let ctx = HclGenerationContext::new(&identity, &index, &naming, &project, &collected);

        assert_eq!(ctx.resolved_name(), "rg-main");
        assert_eq!(
            ctx.attribute_reference("rg", "location").unwrap(),
            "azurerm_resource_group.rg_main.location"
        );
        assert!(ctx.attribute_reference("sub", "id").is_err());
        assert!(ctx.attribute_reference("missing", "id").is_err());
        assert!(ctx.common_tags().is_none());
    }

    #[test]
    fn test_common_tags_expression() {
        let index = index();
        let naming = NamingConvention::default();
        let project = ProjectConfig::default().with_common_tag("owner", "platform");
        let identity = index.identity("rg").unwrap().clone();
        let collected = RefCell::new(Collected::default());
        let ctx = HclGenerationContext::new(&identity, &index, &naming, &project, &collected);

        assert_eq!(
            ctx.common_tags().and_then(|v| v.as_expression().map(str::to_string)).as_deref(),
            Some("local.common_tags")
        );
    }

    #[test]
    fn test_property_expression_literal_and_variable() {
        let index = index();
        let naming = NamingConvention::default();
        let project = ProjectConfig::default();
        let collected = RefCell::new(Collected::default());
        let identity = index.identity("rg").unwrap().clone();
        let ctx = HclGenerationContext::new(&identity, &index, &naming, &project, &collected);

        let literal = ResourceInstance::new("rg", "azurerm/core/resource_group", "main");
        let value = PropertyValue::string("westeurope");
        assert_eq!(
            ctx.property_expression(&literal, "location", &value, VariableOptions::default()),
            HclValue::string("westeurope")
        );
        assert!(collected.borrow().variables.is_empty());

        let exposed = literal.with_variable("location").with_variable("count");
        assert_eq!(
            ctx.property_expression(&exposed, "location", &value, VariableOptions::default()),
            HclValue::expr("var.rg_main_location")
        );
        assert_eq!(
            ctx.property_expression(&exposed, "count", &PropertyValue::from(2i64), VariableOptions::named("rg_count")),
            HclValue::expr("var.rg_count")
        );

        let collected = collected.into_inner();
        let vars = collected.variables.all();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].var_type, "string");
        assert_eq!(vars[0].description, "location for rg-main");
        assert_eq!(vars[0].default, Some(value));
        assert_eq!(vars[1].var_type, "number");
    }

    #[test]
    fn test_references_never_become_variables() {
        let index = index();
        let naming = NamingConvention::default();
        let project = ProjectConfig::default();
        let collected = RefCell::new(Collected::default());
        let identity = index.identity("rg").unwrap().clone();
        let ctx = HclGenerationContext::new(&identity, &index, &naming, &project, &collected);

        let resource = ResourceInstance::new("rg", "azurerm/core/resource_group", "main").with_variable("parent");
        let reference = PropertyValue::reference("azurerm_resource_group.other.name");
        assert_eq!(
            ctx.property_expression(&resource, "parent", &reference, VariableOptions::default()),
            HclValue::expr("azurerm_resource_group.other.name")
        );
        assert!(collected.borrow().variables.is_empty());
    }
}
