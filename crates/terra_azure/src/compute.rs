//! App Service plans and Linux web apps.

use std::sync::Arc;

use terra_hcl::{
    ConnectionRule, HclBlock, HclGenerationContext, HclResult, HclValue, InfraPlugin, NamingConstraints,
    PropertyFieldType, PropertySchema, ResourceInstance, TypeRegistration,
};

use crate::common::{located_resource, setting, with_tags};
use crate::networking::SUBNET;
use crate::provider::PROVIDER_ID;

pub const APP_SERVICE_PLAN: &str = "azurerm/compute/app_service_plan";
pub const APP_SERVICE: &str = "azurerm/compute/app_service";

fn app_service_plan(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let block = located_resource("azurerm_service_plan", resource, ctx)?
        .attr("os_type", setting(resource, ctx, "os_type", "Linux"))
        .attr("sku_name", setting(resource, ctx, "sku_name", "B1"));
    Ok(vec![with_tags(block, ctx)])
}

/// `NODE|20-lts` style runtime stack to an `application_stack` block.
fn application_stack(runtime: &str) -> Option<HclBlock> {
    let (stack, version) = runtime.split_once('|')?;
    let key = match stack {
        "NODE" => "node_version",
        "PYTHON" => "python_version",
        "DOTNETCORE" => "dotnet_version",
        "JAVA" => "java_version",
        "PHP" => "php_version",
        _ => return None,
    };
    Some(HclBlock::new("application_stack").attr(key, version))
}

fn app_service(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let mut block = located_resource("azurerm_linux_web_app", resource, ctx)?
        .attr("service_plan_id", HclValue::from(resource.require("service_plan_id")?))
        .attr_opt(
            "virtual_network_subnet_id",
            resource
                .property("virtual_network_subnet_id")
                .filter(|v| !v.is_blank())
                .map(HclValue::from),
        );

    let https_only = resource
        .property("https_only")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    if https_only {
        block = block.attr("https_only", true);
    }

    let mut site_config = HclBlock::new("site_config");
    if resource.property("always_on").and_then(|v| v.as_bool()) == Some(true) {
        site_config = site_config.attr("always_on", true);
    }
    if let Some(stack) = resource
        .property("runtime_stack")
        .and_then(|v| v.as_str())
        .and_then(application_stack)
    {
        site_config = site_config.block(stack);
    }

    Ok(vec![with_tags(block.block(site_config), ctx)])
}

pub struct ComputePlugin;

impl InfraPlugin for ComputePlugin {
    fn id(&self) -> &str {
        "azurerm/compute"
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn resource_types(&self) -> Vec<TypeRegistration> {
        vec![
            TypeRegistration::new(
                APP_SERVICE_PLAN,
                PROVIDER_ID,
                "azurerm_service_plan",
                Arc::new(app_service_plan),
            )
            .with_schema(vec![
                PropertySchema::new("os_type", "OS", PropertyFieldType::Select).with_default("Linux"),
                PropertySchema::new("sku_name", "SKU", PropertyFieldType::Select).with_default("B1"),
            ])
            .with_icon("app-service-plan"),
            TypeRegistration::new(APP_SERVICE, PROVIDER_ID, "azurerm_linux_web_app", Arc::new(app_service))
                .with_schema(vec![
                    PropertySchema::new("service_plan_id", "App Service Plan", PropertyFieldType::Reference)
                        .required(),
                    PropertySchema::new("runtime_stack", "Runtime", PropertyFieldType::Select),
                    PropertySchema::new("always_on", "Always On", PropertyFieldType::Boolean),
                    PropertySchema::new("https_only", "HTTPS Only", PropertyFieldType::Boolean).with_default(true),
                ])
                .with_naming_constraints(NamingConstraints::default().max_length(60))
                .with_icon("app-service"),
        ]
    }

    fn connection_rules(&self) -> Vec<ConnectionRule> {
        vec![
            ConnectionRule::new((APP_SERVICE_PLAN, "apps-out"), (APP_SERVICE, "plan-in"))
                .referencing_source("service_plan_id", None)
                .with_label("Hosts app"),
            ConnectionRule::new((SUBNET, "integration-out"), (APP_SERVICE, "subnet-in"))
                .referencing_source("virtual_network_subnet_id", None)
                .with_label("VNet integration"),
        ]
    }
}
