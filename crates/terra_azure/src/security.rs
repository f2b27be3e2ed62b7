//! Key vaults.

use std::sync::Arc;

use terra_hcl::{
    ConnectionRule, HclBlock, HclGenerationContext, HclResult, HclValue, InfraPlugin, PropertyFieldType,
    PropertySchema, ResourceInstance, TerraformOutput, TypeRegistration,
};

use crate::common::{located_resource, setting, with_tags};
use crate::provider::PROVIDER_ID;

pub const KEY_VAULT: &str = "azurerm/security/key_vault";

fn key_vault(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    // Each vault carries its own client config data source.
    let client = HclBlock::new("data")
        .with_label("azurerm_client_config")
        .with_label(ctx.label());

    let mut vault = located_resource("azurerm_key_vault", resource, ctx)?
        .attr("sku_name", setting(resource, ctx, "sku_name", "standard"))
        .attr(
            "tenant_id",
            HclValue::expr(format!("data.azurerm_client_config.{}.tenant_id", ctx.label())),
        );

    if let Some(days) = resource.property("soft_delete_retention_days") {
        vault = vault.attr("soft_delete_retention_days", HclValue::from(days));
    }
    if resource
        .property("purge_protection_enabled")
        .and_then(|v| v.as_bool())
        == Some(true)
    {
        vault = vault.attr("purge_protection_enabled", true);
    }

    let address = format!("azurerm_key_vault.{}", ctx.label());
    ctx.add_output(TerraformOutput::new(
        format!("{}_vault_uri", ctx.label()),
        format!("{}.vault_uri", address),
        format!("URI of key vault {}", ctx.resolved_name()),
    ));
    ctx.add_output(TerraformOutput::new(
        format!("{}_id", ctx.label()),
        format!("{}.id", address),
        format!("ID of key vault {}", ctx.resolved_name()),
    ));

    Ok(vec![client, with_tags(vault, ctx)])
}

pub struct SecurityPlugin;

impl InfraPlugin for SecurityPlugin {
    fn id(&self) -> &str {
        "azurerm/security"
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn resource_types(&self) -> Vec<TypeRegistration> {
        vec![TypeRegistration::new(KEY_VAULT, PROVIDER_ID, "azurerm_key_vault", Arc::new(key_vault))
            .with_schema(vec![
                PropertySchema::new("sku_name", "SKU", PropertyFieldType::Select).with_default("standard"),
                PropertySchema::new("soft_delete_retention_days", "Soft Delete Days", PropertyFieldType::Number),
                PropertySchema::new("purge_protection_enabled", "Purge Protection", PropertyFieldType::Boolean),
            ])
            .with_icon("key-vault")]
    }

    fn connection_rules(&self) -> Vec<ConnectionRule> {
        Vec::new()
    }
}
