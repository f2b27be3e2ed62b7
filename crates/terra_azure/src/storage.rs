//! Storage accounts.

use std::sync::Arc;

use terra_hcl::{
    ConnectionRule, HclBlock, HclError, HclGenerationContext, HclResult, InfraPlugin, NamingConstraints,
    PropertyFieldType, PropertySchema, ResourceInstance, TypeRegistration,
};

use crate::common::{copy_optional, located_resource, setting, with_tags};
use crate::provider::PROVIDER_ID;

pub const STORAGE_ACCOUNT: &str = "azurerm/storage/storage_account";

/// Storage account names are 3-24 lowercase letters and digits.
fn check_account_name(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<()> {
    let name = ctx.resolved_name();
    let valid = (3..=24).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(HclError::generator(
            resource.id.as_str(),
            format!("'{}' is not a valid storage account name (3-24 lowercase letters and digits)", name),
        ))
    }
}

fn storage_account(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    check_account_name(resource, ctx)?;
    let block = located_resource("azurerm_storage_account", resource, ctx)?
        .attr("account_tier", setting(resource, ctx, "account_tier", "Standard"))
        .attr(
            "account_replication_type",
            setting(resource, ctx, "account_replication_type", "LRS"),
        );
    let block = copy_optional(block, resource, "access_tier");
    Ok(vec![with_tags(block, ctx)])
}

pub struct StoragePlugin;

impl InfraPlugin for StoragePlugin {
    fn id(&self) -> &str {
        "azurerm/storage"
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn resource_types(&self) -> Vec<TypeRegistration> {
        vec![TypeRegistration::new(
            STORAGE_ACCOUNT,
            PROVIDER_ID,
            "azurerm_storage_account",
            Arc::new(storage_account),
        )
        .with_schema(vec![
            PropertySchema::new("account_tier", "Tier", PropertyFieldType::Select).with_default("Standard"),
            PropertySchema::new("account_replication_type", "Replication", PropertyFieldType::Select)
                .with_default("LRS"),
            PropertySchema::new("access_tier", "Access Tier", PropertyFieldType::Select),
        ])
        .with_naming_constraints(NamingConstraints::default().lowercase().no_hyphens().max_length(24))
        .with_icon("storage-account")]
    }

    fn connection_rules(&self) -> Vec<ConnectionRule> {
        Vec::new()
    }
}
