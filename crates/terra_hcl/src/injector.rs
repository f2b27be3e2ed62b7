//! Reference injection driven by matched connection rules.
//!
//! A connection is authoritative for the property it governs: injection
//! overwrites whatever value the user typed there. The overwrite is reported
//! back to the caller so it can be surfaced, never silently dropped.

use tracing::debug;

use crate::context::ResourceIdentity;
use crate::model::{PropertyValue, ResourceInstance};
use crate::rules::{ConnectionRule, ReferenceSide};

/// Result of applying one rule to one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    /// The updated working copy of the instance named by the rule's side.
    pub updated: ResourceInstance,
    pub property_key: String,
    /// Value that was replaced, when it differed from the injected one.
    pub overwritten: Option<PropertyValue>,
}

/// One endpoint of an edge: its working copy and its identity.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub resource: &'a ResourceInstance,
    pub identity: &'a ResourceIdentity,
}

/// Writes cross-resource references onto working copies.
pub struct ReferenceInjector;

impl ReferenceInjector {
    /// The value written when `other` is referenced through `attribute`.
    ///
    /// Real resources are referenced by expression. A virtual resource has no
    /// address, so its resolved name is injected as a literal string.
    pub fn reference_value(other: &ResourceIdentity, attribute: &str) -> PropertyValue {
        match other.address() {
            Some(address) => PropertyValue::reference(format!("{}.{}", address, attribute)),
            None => PropertyValue::string(other.resolved_name.clone()),
        }
    }

    /// Apply a rule's reference directive. Returns `None` when the rule creates no reference.
    pub fn apply(rule: &ConnectionRule, source: Endpoint<'_>, target: Endpoint<'_>) -> Option<Injection> {
        let directive = rule.creates_reference.as_ref()?;

        let (receiver, other) = match directive.side {
            ReferenceSide::Source => (source, target),
            ReferenceSide::Target => (target, source),
        };

        let value = Self::reference_value(other.identity, directive.attribute());
        let mut updated = receiver.resource.clone();
        let previous = updated
            .properties
            .insert(directive.property_key.clone(), value.clone());

        debug!(
            "Injected {} on {} referencing {}",
            directive.property_key, receiver.resource.id, other.resource.id
        );

        Some(Injection {
            updated,
            property_key: directive.property_key.clone(),
            overwritten: previous.filter(|p| *p != value && !p.is_blank()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "azurerm/compute/app_service_plan";
    const APP: &str = "azurerm/compute/app_service";

    fn identity(name: &str, tf_type: Option<&str>) -> ResourceIdentity {
        ResourceIdentity {
            resolved_name: name.to_string(),
            label: crate::naming::terraform_identifier(name),
            terraform_type: tf_type.map(str::to_string),
        }
    }

    fn rule() -> ConnectionRule {
        ConnectionRule::new((PLAN, "apps-out"), (APP, "plan-in")).referencing_source("service_plan_id", None)
    }

    #[test]
    fn test_inject_onto_target() {
        let plan = ResourceInstance::new("plan", PLAN, "plan-prod");
        let app = ResourceInstance::new("app", APP, "app");
        let plan_id = identity("plan-prod", Some("azurerm_service_plan"));
        let app_id = identity("app", Some("azurerm_linux_web_app"));

        let injection = ReferenceInjector::apply(
            &rule(),
            Endpoint { resource: &plan, identity: &plan_id },
            Endpoint { resource: &app, identity: &app_id },
        )
        .unwrap();

        assert_eq!(injection.updated.id, "app");
        assert_eq!(
            injection.updated.property("service_plan_id").and_then(PropertyValue::as_reference),
            Some("azurerm_service_plan.plan_prod.id")
        );
        assert!(injection.overwritten.is_none());
        // The input is untouched.
        assert!(app.property("service_plan_id").is_none());
    }

    #[test]
    fn test_inject_onto_source_with_attribute() {
        let rule = ConnectionRule::new(("a/b/subnet", "out"), ("a/b/vnet", "in"))
            .referencing_target("virtual_network_name", Some("name"));
        let subnet = ResourceInstance::new("s", "a/b/subnet", "s");
        let vnet = ResourceInstance::new("v", "a/b/vnet", "core");
        let s_id = identity("s", Some("azurerm_subnet"));
        let v_id = identity("core", Some("azurerm_virtual_network"));

        let injection = ReferenceInjector::apply(
            &rule,
            Endpoint { resource: &subnet, identity: &s_id },
            Endpoint { resource: &vnet, identity: &v_id },
        )
        .unwrap();

        assert_eq!(injection.updated.id, "s");
        assert_eq!(
            injection.updated.property("virtual_network_name"),
            Some(&PropertyValue::reference("azurerm_virtual_network.core.name"))
        );
    }

    #[test]
    fn test_virtual_other_injects_resolved_name() {
        let container = ResourceInstance::new("c", "x/net/container", "net");
        let subnet = ResourceInstance::new("s", "y/net/subnet", "sn");
        let rule = ConnectionRule::new(("x/net/container", "out"), ("y/net/subnet", "in"))
            .referencing_source("container_name", None);

        let injection = ReferenceInjector::apply(
            &rule,
            Endpoint { resource: &container, identity: &identity("acme-net", None) },
            Endpoint { resource: &subnet, identity: &identity("sn", Some("y_subnet")) },
        )
        .unwrap();

        assert_eq!(
            injection.updated.property("container_name"),
            Some(&PropertyValue::string("acme-net"))
        );
    }

    #[test]
    fn test_overwrite_reported_and_idempotent() {
        let plan = ResourceInstance::new("plan", PLAN, "plan");
        let app = ResourceInstance::new("app", APP, "app").with_property("service_plan_id", "typed-by-hand");
        let plan_id = identity("plan", Some("azurerm_service_plan"));
        let app_id = identity("app", Some("azurerm_linux_web_app"));

        let first = ReferenceInjector::apply(
            &rule(),
            Endpoint { resource: &plan, identity: &plan_id },
            Endpoint { resource: &app, identity: &app_id },
        )
        .unwrap();
        assert_eq!(first.overwritten, Some(PropertyValue::string("typed-by-hand")));

        // Re-applying on the already-injected copy changes nothing.
        let second = ReferenceInjector::apply(
            &rule(),
            Endpoint { resource: &plan, identity: &plan_id },
            Endpoint { resource: &first.updated, identity: &app_id },
        )
        .unwrap();
        assert_eq!(second.updated, first.updated);
        assert!(second.overwritten.is_none());
    }

    #[test]
    fn test_rule_without_reference() {
        let rule = ConnectionRule::new((PLAN, "a"), (APP, "b"));
        let plan = ResourceInstance::new("plan", PLAN, "plan");
        let id = identity("plan", None);
        let endpoint = Endpoint { resource: &plan, identity: &id };
        assert!(ReferenceInjector::apply(&rule, endpoint, endpoint).is_none());
    }
}
