//! Virtual networks, subnets, network security groups and public IPs.

use std::sync::Arc;

use terra_hcl::{
    ConnectionRule, HclBlock, HclError, HclGenerationContext, HclResult, HclValue, InfraPlugin,
    NamingConstraints, PropertyFieldType, PropertySchema, PropertyValidation, PropertyValue, ResourceInstance,
    TypeRegistration,
};
use tracing::debug;

use crate::common::{copy_optional, located_resource, resource_group_name, sibling_attribute, with_tags};
use crate::provider::PROVIDER_ID;

pub const VIRTUAL_NETWORK: &str = "azurerm/networking/virtual_network";
pub const SUBNET: &str = "azurerm/networking/subnet";
pub const NETWORK_SECURITY_GROUP: &str = "azurerm/networking/network_security_group";
pub const PUBLIC_IP: &str = "azurerm/networking/public_ip";

fn cidr(key: &str, label: &str, default: &str) -> PropertySchema {
    PropertySchema::new(key, label, PropertyFieldType::Cidr)
        .required()
        .with_default(PropertyValue::List(vec![PropertyValue::string(default)]))
        .with_validation(PropertyValidation {
            pattern: Some(r"^\d{1,3}(\.\d{1,3}){3}/\d{1,2}$".to_string()),
            ..Default::default()
        })
}

fn virtual_network(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let block = located_resource("azurerm_virtual_network", resource, ctx)?
        .attr("address_space", HclValue::from(resource.require("address_space")?));
    let block = copy_optional(block, resource, "dns_servers");
    Ok(vec![with_tags(block, ctx)])
}

/// A subnet inherits its resource group from the virtual network when no
/// resource group is connected directly.
fn subnet_resource_group(resource: &ResourceInstance) -> HclResult<HclValue> {
    resource_group_name(resource).or_else(|err| {
        resource
            .property("virtual_network_name")
            .and_then(PropertyValue::as_reference)
            .and_then(|expr| sibling_attribute(expr, "resource_group_name"))
            .map(HclValue::expr)
            .ok_or(err)
    })
}

fn subnet(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let subnet = HclBlock::resource("azurerm_subnet", ctx.label())
        .attr("name", ctx.resolved_name())
        .attr("resource_group_name", subnet_resource_group(resource)?)
        .attr(
            "virtual_network_name",
            HclValue::from(resource.require("virtual_network_name")?),
        )
        .attr(
            "address_prefixes",
            HclValue::from(resource.require("address_prefixes")?),
        );
    let subnet = copy_optional(subnet, resource, "service_endpoints");
    let mut blocks = vec![subnet];

    if let Some(nsg) = resource
        .property("network_security_group_id")
        .filter(|v| !v.is_blank())
    {
        debug!("Associating NSG with subnet {}", resource.id);
        blocks.push(
            HclBlock::resource("azurerm_subnet_network_security_group_association", ctx.label())
                .attr("subnet_id", HclValue::expr(ctx.attribute_reference(&resource.id, "id")?))
                .attr("network_security_group_id", HclValue::from(nsg)),
        );
    }

    Ok(blocks)
}

fn network_security_group(
    resource: &ResourceInstance,
    ctx: &HclGenerationContext<'_>,
) -> HclResult<Vec<HclBlock>> {
    let block = located_resource("azurerm_network_security_group", resource, ctx)?;
    Ok(vec![with_tags(block, ctx)])
}

fn public_ip(resource: &ResourceInstance, ctx: &HclGenerationContext<'_>) -> HclResult<Vec<HclBlock>> {
    let allocation = resource.require_str("allocation_method")?;
    let sku = resource.str_or("sku", "Standard");
    if sku == "Standard" && allocation != "Static" {
        return Err(HclError::InvalidProperty {
            node: resource.id.clone(),
            key: "allocation_method".to_string(),
            expected: "Static for a Standard SKU public IP".to_string(),
        });
    }

    let block = located_resource("azurerm_public_ip", resource, ctx)?
        .attr("allocation_method", allocation)
        .attr("sku", sku);
    let block = copy_optional(block, resource, "domain_name_label");
    Ok(vec![with_tags(block, ctx)])
}

pub struct NetworkingPlugin;

impl InfraPlugin for NetworkingPlugin {
    fn id(&self) -> &str {
        "azurerm/networking"
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn resource_types(&self) -> Vec<TypeRegistration> {
        vec![
            TypeRegistration::new(
                VIRTUAL_NETWORK,
                PROVIDER_ID,
                "azurerm_virtual_network",
                Arc::new(virtual_network),
            )
            .with_schema(vec![
                cidr("address_space", "Address Space", "10.0.0.0/16"),
                PropertySchema::new("dns_servers", "DNS Servers", PropertyFieldType::Array),
            ])
            .with_icon("vnet")
            .with_node_component("container"),
            TypeRegistration::new(SUBNET, PROVIDER_ID, "azurerm_subnet", Arc::new(subnet))
                .with_schema(vec![
                    cidr("address_prefixes", "Address Prefixes", "10.0.1.0/24"),
                    PropertySchema::new("virtual_network_name", "Virtual Network", PropertyFieldType::Reference)
                        .required(),
                    PropertySchema::new("service_endpoints", "Service Endpoints", PropertyFieldType::Array),
                ])
                .with_icon("subnet")
                .with_node_component("container"),
            TypeRegistration::new(
                NETWORK_SECURITY_GROUP,
                PROVIDER_ID,
                "azurerm_network_security_group",
                Arc::new(network_security_group),
            )
            .with_naming_constraints(NamingConstraints::default().max_length(80))
            .with_icon("nsg"),
            TypeRegistration::new(PUBLIC_IP, PROVIDER_ID, "azurerm_public_ip", Arc::new(public_ip))
                .with_schema(vec![
                    PropertySchema::new("allocation_method", "Allocation Method", PropertyFieldType::Select)
                        .required()
                        .with_default("Static"),
                    PropertySchema::new("sku", "SKU", PropertyFieldType::Select).with_default("Standard"),
                    PropertySchema::string("domain_name_label", "DNS Label").optional(),
                ])
                .with_icon("public-ip"),
        ]
    }

    fn connection_rules(&self) -> Vec<ConnectionRule> {
        vec![
            ConnectionRule::new((VIRTUAL_NETWORK, "subnets"), (SUBNET, "vnet-in"))
                .referencing_source("virtual_network_name", Some("name"))
                .with_label("Contains subnet"),
            ConnectionRule::new((NETWORK_SECURITY_GROUP, "nsg-out"), (SUBNET, "nsg-in"))
                .referencing_source("network_security_group_id", None)
                .with_label("Associates NSG with subnet"),
        ]
    }
}
