//! Resource type registry mapping type ids to schemas and generators.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::block::HclBlock;
use crate::context::HclGenerationContext;
use crate::error::{HclError, HclResult};
use crate::model::{ProviderId, ResourceInstance, ResourceTypeId};
use crate::naming::NamingConstraints;
use crate::schema::PropertySchema;

/// Per-type code generator.
///
/// Generators are pure: no I/O, no randomness, and they read properties only
/// from the (already reference-injected) instance. They never escape strings.
pub trait HclGenerator: Send + Sync {
    fn generate(
        &self,
        resource: &ResourceInstance,
        context: &HclGenerationContext<'_>,
    ) -> HclResult<Vec<HclBlock>>;
}

/// Generator for virtual resources: always emits nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBlocks;

impl HclGenerator for NoBlocks {
    fn generate(
        &self,
        _resource: &ResourceInstance,
        _context: &HclGenerationContext<'_>,
    ) -> HclResult<Vec<HclBlock>> {
        Ok(Vec::new())
    }
}

impl<F> HclGenerator for F
where
    F: Fn(&ResourceInstance, &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> + Send + Sync,
{
    fn generate(
        &self,
        resource: &ResourceInstance,
        context: &HclGenerationContext<'_>,
    ) -> HclResult<Vec<HclBlock>> {
        self(resource, context)
    }
}

/// Everything registered for one resource type.
#[derive(Clone)]
pub struct TypeRegistration {
    pub type_id: ResourceTypeId,
    pub provider: ProviderId,
    /// Emitted Terraform type; `None` marks a virtual resource.
    pub terraform_type: Option<String>,
    pub schema: Vec<PropertySchema>,
    /// Property keys a provider-scope resource folds into its provider's configuration.
    pub provider_properties: Vec<String>,
    pub generator: Arc<dyn HclGenerator>,
    /// Limits applied to names produced by the naming template.
    pub naming_constraints: Option<NamingConstraints>,
    /// Rendering handles for the editor; never read by the compiler.
    pub icon: Option<String>,
    pub node_component: Option<String>,
}

impl TypeRegistration {
    /// A resource type that emits a Terraform resource.
    pub fn new(
        type_id: impl Into<String>,
        provider: impl Into<String>,
        terraform_type: impl Into<String>,
        generator: Arc<dyn HclGenerator>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            provider: provider.into(),
            terraform_type: Some(terraform_type.into()),
            schema: Vec::new(),
            provider_properties: Vec::new(),
            generator,
            naming_constraints: None,
            icon: None,
            node_component: None,
        }
    }

    /// A virtual resource: participates in naming and injection, emits no block.
    pub fn virtual_type(type_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            provider: provider.into(),
            terraform_type: None,
            schema: Vec::new(),
            provider_properties: Vec::new(),
            generator: Arc::new(NoBlocks),
            naming_constraints: None,
            icon: None,
            node_component: None,
        }
    }

    pub fn with_schema(mut self, schema: Vec<PropertySchema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_provider_property(mut self, key: impl Into<String>) -> Self {
        self.provider_properties.push(key.into());
        self
    }

    pub fn with_naming_constraints(mut self, constraints: NamingConstraints) -> Self {
        self.naming_constraints = Some(constraints);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_node_component(mut self, component: impl Into<String>) -> Self {
        self.node_component = Some(component.into());
        self
    }

    pub fn is_virtual(&self) -> bool {
        self.terraform_type.is_none()
    }
}

impl std::fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("type_id", &self.type_id)
            .field("provider", &self.provider)
            .field("terraform_type", &self.terraform_type)
            .field("schema", &self.schema.iter().map(|p| &p.key).collect::<Vec<_>>())
            .field("provider_properties", &self.provider_properties)
            .field("naming_constraints", &self.naming_constraints)
            .finish()
    }
}

/// A registry of resource type registrations.
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<ResourceTypeId, TypeRegistration>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register or update a resource type.
    ///
    /// A later registration for the same type id replaces the earlier one and
    /// the replaced registration is returned.
    pub fn register(&mut self, registration: TypeRegistration) -> Option<TypeRegistration> {
        let type_id = registration.type_id.clone();
        debug!("Registering resource type: {}", type_id);
        let previous = self.types.insert(type_id.clone(), registration);
        if previous.is_some() {
            warn!("Resource type {} registered twice; last registration wins", type_id);
        }
        previous
    }

    /// Look up a registration, returning an error if the type is unknown.
    pub fn resolve(&self, type_id: &str) -> HclResult<&TypeRegistration> {
        self.types
            .get(type_id)
            .ok_or_else(|| HclError::UnknownResourceType(type_id.to_string()))
    }

    pub fn get(&self, type_id: &str) -> Option<&TypeRegistration> {
        self.types.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Sorted snapshot of every registration.
    pub fn all_types(&self) -> BTreeMap<&str, &TypeRegistration> {
        self.types.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.all_types().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rg_generator(
        resource: &ResourceInstance,
        context: &HclGenerationContext<'_>,
    ) -> HclResult<Vec<HclBlock>> {
        Ok(vec![HclBlock::resource("azurerm_resource_group", context.label())
            .attr("name", resource.name.as_str())])
    }

    #[test]
    fn test_registry_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        assert!(registry.is_empty());

        registry.register(TypeRegistration::new(
            "azurerm/core/resource_group",
            "azurerm",
            "azurerm_resource_group",
            Arc::new(rg_generator),
        ));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("azurerm/core/resource_group"));
        let reg = registry.resolve("azurerm/core/resource_group").unwrap();
        assert_eq!(reg.terraform_type.as_deref(), Some("azurerm_resource_group"));
    }

    #[test]
    fn test_registry_unknown_type() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.resolve("azurerm/none/thing"),
            Err(HclError::UnknownResourceType(t)) if t == "azurerm/none/thing"
        ));
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeRegistration::virtual_type("azurerm/core/subscription", "azurerm"));
        let previous = registry.register(
            TypeRegistration::virtual_type("azurerm/core/subscription", "azurerm")
                .with_provider_property("subscription_id"),
        );

        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        let reg = registry.resolve("azurerm/core/subscription").unwrap();
        assert_eq!(reg.provider_properties, vec!["subscription_id".to_string()]);
        assert!(reg.is_virtual());
    }

    #[test]
    fn test_all_types_sorted() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeRegistration::virtual_type("b/x/y", "b"));
        registry.register(TypeRegistration::virtual_type("a/x/y", "a"));
        let keys: Vec<_> = registry.all_types().keys().copied().collect();
        assert_eq!(keys, vec!["a/x/y", "b/x/y"]);
    }
}
