//! Helpers shared by the azurerm generators.

use terra_hcl::{
    HclBlock, HclError, HclGenerationContext, HclResult, HclValue, PropertyValue, ResourceInstance, VariableOptions,
};

/// `resource_group_name`, injected by a resource group connection or typed by hand.
pub fn resource_group_name(resource: &ResourceInstance) -> HclResult<HclValue> {
    resource.require("resource_group_name").map(HclValue::from)
}

/// `location` from the property, otherwise the location of the connected resource group.
pub fn location(resource: &ResourceInstance) -> HclResult<HclValue> {
    if let Some(value) = resource.property("location").filter(|v| !v.is_blank()) {
        return Ok(HclValue::from(value));
    }

    resource
        .property("resource_group_name")
        .and_then(PropertyValue::as_reference)
        .and_then(|expr| sibling_attribute(expr, "location"))
        .map(HclValue::expr)
        .ok_or_else(|| HclError::MissingProperty {
            node: resource.id.clone(),
            key: "location".to_string(),
        })
}

/// Rewrite `<address>.<attr>` to `<address>.<other>`.
pub fn sibling_attribute(expression: &str, other: &str) -> Option<String> {
    let (address, _) = expression.rsplit_once('.')?;
    Some(format!("{}.{}", address, other))
}

/// Start an azurerm resource block with `name`, `resource_group_name` and `location`.
pub fn located_resource(
    terraform_type: &str,
    resource: &ResourceInstance,
    ctx: &HclGenerationContext<'_>,
) -> HclResult<HclBlock> {
    Ok(HclBlock::resource(terraform_type, ctx.label())
        .attr("name", ctx.resolved_name())
        .attr("resource_group_name", resource_group_name(resource)?)
        .attr("location", location(resource)?))
}

/// Copy an optional property onto the block when it is set.
pub fn copy_optional(block: HclBlock, resource: &ResourceInstance, key: &str) -> HclBlock {
    block.attr_opt(
        key,
        resource.property(key).filter(|v| !v.is_blank()).map(HclValue::from),
    )
}

/// A string setting with a fallback, emitted as `var.<label>_<key>` when the
/// resource marks the property as a variable.
pub fn setting(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>, key: &str, default: &str) -> HclValue {
    let value = match resource.property(key).filter(|v| !v.is_blank()) {
        Some(value) => value.clone(),
        None => PropertyValue::string(default),
    };
    ctx.property_expression(resource, key, &value, VariableOptions::default())
}

/// Finish a block with `tags = local.common_tags` when the project declares tags.
pub fn with_tags(block: HclBlock, ctx: &HclGenerationContext<'_>) -> HclBlock {
    block.attr_opt("tags", ctx.common_tags())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_property() {
        let rg = ResourceInstance::new("r", "azurerm/core/resource_group", "rg").with_property("location", "westeurope");
        assert_eq!(location(&rg).unwrap(), HclValue::string("westeurope"));
    }

    #[test]
    fn test_location_from_resource_group_reference() {
        let vnet = ResourceInstance::new("v", "azurerm/networking/virtual_network", "core")
            .with_property("resource_group_name", PropertyValue::reference("azurerm_resource_group.main.name"));
        assert_eq!(
            location(&vnet).unwrap(),
            HclValue::expr("azurerm_resource_group.main.location")
        );
    }

    #[test]
    fn test_location_missing() {
        let vnet = ResourceInstance::new("v", "azurerm/networking/virtual_network", "core")
            .with_property("resource_group_name", "typed-rg");
        assert!(matches!(location(&vnet), Err(HclError::MissingProperty { key, .. }) if key == "location"));
    }

    #[test]
    fn test_sibling_attribute() {
        assert_eq!(
            sibling_attribute("azurerm_virtual_network.core.name", "resource_group_name").as_deref(),
            Some("azurerm_virtual_network.core.resource_group_name")
        );
        assert_eq!(sibling_attribute("plain", "x"), None);
    }
}
