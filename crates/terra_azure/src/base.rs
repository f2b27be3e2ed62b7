//! Subscription and resource group.

use std::sync::Arc;

use terra_hcl::{
    ConnectionRule, HclBlock, HclGenerationContext, HclResult, HclValue, InfraPlugin, PropertySchema,
    ProviderConfig, ResourceInstance, TypeRegistration,
};

use crate::common::with_tags;
use crate::provider::{azurerm_provider, PROVIDER_ID};
use crate::{compute, networking, security, storage};

pub const SUBSCRIPTION: &str = "azurerm/core/subscription";
pub const RESOURCE_GROUP: &str = "azurerm/core/resource_group";

/// Handle on a resource group that grouped resources connect to.
pub const RG_OUT: &str = "resources";
/// Handle on every grouped resource.
pub const RG_IN: &str = "rg-in";

/// Types that live in a resource group and take `resource_group_name` from it.
const GROUPED: &[&str] = &[
    networking::VIRTUAL_NETWORK,
    networking::SUBNET,
    networking::NETWORK_SECURITY_GROUP,
    networking::PUBLIC_IP,
    compute::APP_SERVICE_PLAN,
    compute::APP_SERVICE,
    storage::STORAGE_ACCOUNT,
    security::KEY_VAULT,
];

fn resource_group(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let block = HclBlock::resource("azurerm_resource_group", ctx.label())
        .attr("name", ctx.resolved_name())
        .attr("location", HclValue::from(resource.require("location")?));
    Ok(vec![with_tags(block, ctx)])
}

pub struct CorePlugin;

impl InfraPlugin for CorePlugin {
    fn id(&self) -> &str {
        "azurerm/core"
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn provider_config(&self) -> Option<ProviderConfig> {
        Some(azurerm_provider())
    }

    fn resource_types(&self) -> Vec<TypeRegistration> {
        vec![
            // Emits nothing; its subscription_id lands in the provider block.
            TypeRegistration::virtual_type(SUBSCRIPTION, PROVIDER_ID)
                .with_schema(vec![
                    PropertySchema::string("display_name", "Display Name").optional(),
                    PropertySchema::string("subscription_id", "Subscription ID"),
                ])
                .with_provider_property("subscription_id")
                .with_icon("subscription")
                .with_node_component("container"),
            TypeRegistration::new(RESOURCE_GROUP, PROVIDER_ID, "azurerm_resource_group", Arc::new(resource_group))
                .with_schema(vec![PropertySchema::string("location", "Location").with_default("eastus")])
                .with_icon("resource-group")
                .with_node_component("container"),
        ]
    }

    fn connection_rules(&self) -> Vec<ConnectionRule> {
        let mut rules = vec![ConnectionRule::new(
            (SUBSCRIPTION, "resource-groups"),
            (RESOURCE_GROUP, "subscription-in"),
        )
        .with_label("Contains resource group")];

        rules.extend(GROUPED.iter().map(|target| {
            ConnectionRule::new((RESOURCE_GROUP, RG_OUT), (*target, RG_IN))
                .referencing_source("resource_group_name", Some("name"))
                .with_label("Contains")
        }));
        rules
    }
}
