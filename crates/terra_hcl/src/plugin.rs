//! Provider plugins and the catalog assembled from them.

use tracing::{debug, info, warn};

use crate::provider::ProviderConfig;
use crate::registry::{TypeRegistration, TypeRegistry};
use crate::rules::{ConnectionRule, ConnectionRuleResolver};

/// A bundle of resource types, connection rules and a provider definition.
pub trait InfraPlugin: Send + Sync {
    /// Unique plugin id, e.g. `azurerm/networking`.
    fn id(&self) -> &str;

    /// Provider every type and provider definition of this plugin belongs to.
    fn provider_id(&self) -> &str;

    /// The provider definition, from the one plugin that owns it.
    fn provider_config(&self) -> Option<ProviderConfig> {
        None
    }

    fn resource_types(&self) -> Vec<TypeRegistration>;

    fn connection_rules(&self) -> Vec<ConnectionRule>;
}

/// Everything the compiler needs: registered types, rules and providers.
#[derive(Debug, Default)]
pub struct Catalog {
    pub types: TypeRegistry,
    /// Union of all plugin rules in registration order.
    pub rules: Vec<ConnectionRule>,
    /// Provider definitions in registration order, possibly with duplicates.
    pub providers: Vec<ProviderConfig>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn valid_targets(&self, source_type: &str, source_handle: &str) -> Vec<&ConnectionRule> {
        ConnectionRuleResolver::valid_targets(&self.rules, source_type, source_handle)
    }

    pub fn valid_sources(&self, target_type: &str, target_handle: &str) -> Vec<&ConnectionRule> {
        ConnectionRuleResolver::valid_sources(&self.rules, target_type, target_handle)
    }
}

/// Builder collecting plugins into a [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
    plugins: Vec<Box<dyn InfraPlugin>>,
}

impl CatalogBuilder {
    pub fn plugin(mut self, plugin: impl InfraPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn plugins(mut self, plugins: Vec<Box<dyn InfraPlugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Assemble the catalog. Types and provider definitions whose provider
    /// differs from the plugin's `provider_id` are skipped.
    pub fn build(self) -> Catalog {
        let mut catalog = Catalog::default();

        for plugin in &self.plugins {
            let provider = plugin.provider_id();
            debug!("Loading plugin {} ({})", plugin.id(), provider);

            if let Some(config) = plugin.provider_config() {
                if config.id == provider {
                    catalog.providers.push(config);
                } else {
                    warn!(
                        "Plugin {} declares provider {} but defines {}; skipped",
                        plugin.id(),
                        provider,
                        config.id
                    );
                }
            }
            for registration in plugin.resource_types() {
                if registration.provider == provider {
                    catalog.types.register(registration);
                } else {
                    warn!(
                        "Plugin {} declares provider {} but type {} belongs to {}; skipped",
                        plugin.id(),
                        provider,
                        registration.type_id,
                        registration.provider
                    );
                }
            }
            catalog.rules.extend(plugin.connection_rules());
        }

        info!(
            "Catalog ready: {} plugins, {} types, {} rules",
            self.plugins.len(),
            catalog.types.len(),
            catalog.rules.len()
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::HclBlock;

    struct CorePlugin;

    impl InfraPlugin for CorePlugin {
        fn id(&self) -> &str {
            "test/core"
        }

        fn provider_id(&self) -> &str {
            "test"
        }

        fn provider_config(&self) -> Option<ProviderConfig> {
            Some(ProviderConfig::new("test", "Test", "example/test", "~> 1.0", |_| {
                HclBlock::new("provider").with_label("test")
            }))
        }

        fn resource_types(&self) -> Vec<TypeRegistration> {
            vec![
                TypeRegistration::virtual_type("test/core/a", "test"),
                TypeRegistration::virtual_type("test/core/b", "test"),
            ]
        }

        fn connection_rules(&self) -> Vec<ConnectionRule> {
            vec![ConnectionRule::new(("test/core/a", "out"), ("test/core/b", "in"))]
        }
    }

    #[test]
    fn test_catalog_from_plugins() {
        let catalog = Catalog::builder().plugin(CorePlugin).plugin(CorePlugin).build();

        assert_eq!(catalog.types.len(), 2);
        assert_eq!(catalog.rules.len(), 2);
        assert_eq!(catalog.providers.len(), 2);
    }

    struct StrayPlugin;

    impl InfraPlugin for StrayPlugin {
        fn id(&self) -> &str {
            "test/stray"
        }

        fn provider_id(&self) -> &str {
            "test"
        }

        fn provider_config(&self) -> Option<ProviderConfig> {
            Some(ProviderConfig::new("other", "Other", "example/other", "~> 1.0", |_| {
                HclBlock::new("provider").with_label("other")
            }))
        }

        fn resource_types(&self) -> Vec<TypeRegistration> {
            vec![
                TypeRegistration::virtual_type("test/stray/kept", "test"),
                TypeRegistration::virtual_type("other/stray/dropped", "other"),
            ]
        }

        fn connection_rules(&self) -> Vec<ConnectionRule> {
            Vec::new()
        }
    }

    #[test]
    fn test_foreign_provider_entries_skipped() {
        let catalog = Catalog::builder().plugin(StrayPlugin).build();

        assert_eq!(catalog.types.len(), 1);
        assert!(catalog.types.get("test/stray/kept").is_some());
        assert!(catalog.types.get("other/stray/dropped").is_none());
        assert!(catalog.providers.is_empty());
    }

    #[test]
    fn test_valid_targets_and_sources() {
        let catalog = Catalog::builder().plugin(CorePlugin).build();

        assert_eq!(catalog.valid_targets("test/core/a", "out").len(), 1);
        assert!(catalog.valid_targets("test/core/a", "in").is_empty());
        assert_eq!(catalog.valid_sources("test/core/b", "in")[0].source_type, "test/core/a");
    }
}
