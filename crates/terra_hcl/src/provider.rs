//! Provider definitions and provider block assembly.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::block::{HclBlock, HclValue};
use crate::findings::{Finding, FindingKind, Findings};
use crate::model::{ProjectConfig, PropertyValue, ProviderId, ResourceInstance};
use crate::registry::TypeRegistry;
use crate::schema::PropertySchema;

/// Merged configuration map handed to a provider block generator.
pub type ProviderSettings = BTreeMap<String, PropertyValue>;

/// Produces the `provider "<id>" { ... }` block from merged settings.
pub type ProviderBlockFn = fn(&ProviderSettings) -> HclBlock;

/// A Terraform provider contributed by a plugin.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: String,
    pub source: String,
    pub version: String,
    pub config_schema: Vec<PropertySchema>,
    pub default_config: ProviderSettings,
    pub provider_block: ProviderBlockFn,
}

impl ProviderConfig {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
        provider_block: ProviderBlockFn,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            source: source.into(),
            version: version.into(),
            config_schema: Vec::new(),
            default_config: BTreeMap::new(),
            provider_block,
        }
    }

    pub fn with_schema(mut self, schema: Vec<PropertySchema>) -> Self {
        self.config_schema = schema;
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.default_config.insert(key.into(), value.into());
        self
    }

    pub fn generate_provider_block(&self, settings: &ProviderSettings) -> HclBlock {
        (self.provider_block)(settings)
    }

    pub fn generate_required_provider(&self) -> RequiredProvider {
        RequiredProvider {
            name: self.id.clone(),
            source: self.source.clone(),
            version: self.version.clone(),
        }
    }
}

/// An entry of `terraform { required_providers { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredProvider {
    pub name: String,
    pub source: String,
    pub version: String,
}

impl RequiredProvider {
    fn to_entry(&self) -> (String, HclValue) {
        (
            self.name.clone(),
            HclValue::Object(vec![
                ("source".to_string(), HclValue::string(self.source.as_str())),
                ("version".to_string(), HclValue::string(self.version.as_str())),
            ]),
        )
    }
}

/// Provider output of one compilation.
#[derive(Debug, Clone, Default)]
pub struct ProviderBlocks {
    pub required_providers: Vec<RequiredProvider>,
    pub provider_blocks: Vec<HclBlock>,
}

impl ProviderBlocks {
    /// The `terraform { ... }` settings block.
    pub fn terraform_block(&self, project: &ProjectConfig) -> HclBlock {
        let mut block = HclBlock::new("terraform")
            .attr("required_version", project.terraform_version.as_str());

        if !self.required_providers.is_empty() {
            let mut required = HclBlock::new("required_providers");
            for provider in &self.required_providers {
                let (name, value) = provider.to_entry();
                required.set(name, value);
            }
            block = block.block(required);
        }

        if let Some(backend) = &project.backend {
            let mut backend_block = HclBlock::new("backend").with_label(backend.backend_type.as_str());
            for (key, value) in &backend.config {
                backend_block.set(key.as_str(), value.as_str());
            }
            block = block.block(backend_block);
        }

        block
    }
}

/// Aggregates required providers and provider blocks across the diagram.
pub struct ProviderBlockBuilder;

impl ProviderBlockBuilder {
    /// Build provider output for the resources of a diagram.
    ///
    /// Providers are deduplicated by id (first registration wins). A provider
    /// is active when any resource in the diagram belongs to it. Values of
    /// provider-scope resources are folded into the settings before the
    /// provider block is generated.
    pub fn build(
        resources: &[&ResourceInstance],
        registry: &TypeRegistry,
        providers: &[ProviderConfig],
        project: &ProjectConfig,
        findings: &mut Findings,
    ) -> ProviderBlocks {
        let registered = Self::dedupe(providers, findings);

        // Active providers in order of first use.
        let mut active: Vec<&ProviderConfig> = Vec::new();
        for resource in resources {
            let Some(registration) = registry.get(&resource.type_id) else {
                continue;
            };
            if active.iter().any(|p| p.id == registration.provider) {
                continue;
            }
            match registered.iter().find(|p| p.id == registration.provider) {
                Some(provider) => active.push(provider),
                None => debug!("No provider configuration registered for {}", registration.provider),
            }
        }

        let mut settings: BTreeMap<&str, ProviderSettings> = active
            .iter()
            .map(|p| {
                let mut merged = p.default_config.clone();
                if let Some(user) = project.provider_configs.get(&p.id) {
                    merged.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                (p.id.as_str(), merged)
            })
            .collect();

        Self::fold_scope_values(resources, registry, &mut settings, findings);

        let mut blocks = ProviderBlocks::default();
        for provider in active {
            blocks.required_providers.push(provider.generate_required_provider());
            let empty = ProviderSettings::new();
            let merged = settings.get(provider.id.as_str()).unwrap_or(&empty);
            blocks.provider_blocks.push(provider.generate_provider_block(merged));
        }
        blocks
    }

    fn dedupe<'p>(providers: &'p [ProviderConfig], findings: &mut Findings) -> Vec<&'p ProviderConfig> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for provider in providers {
            if seen.insert(provider.id.as_str()) {
                unique.push(provider);
            } else {
                warn!("Duplicate provider registration for {}", provider.id);
                findings.push(Finding::new(
                    FindingKind::DuplicateProvider,
                    format!(
                        "Provider '{}' is registered more than once; the first registration is used",
                        provider.id
                    ),
                ));
            }
        }
        unique
    }

    /// Pre-pass over provider-scope (virtual) resources.
    fn fold_scope_values(
        resources: &[&ResourceInstance],
        registry: &TypeRegistry,
        settings: &mut BTreeMap<&str, ProviderSettings>,
        findings: &mut Findings,
    ) {
        let mut supplied: HashSet<(String, String)> = HashSet::new();

        for resource in resources {
            let Some(registration) = registry.get(&resource.type_id) else {
                continue;
            };
            let Some(target) = settings.get_mut(registration.provider.as_str()) else {
                continue;
            };

            for key in &registration.provider_properties {
                let Some(value) = resource.property(key).filter(|v| !v.is_blank()) else {
                    continue;
                };
                if !supplied.insert((registration.provider.clone(), key.clone())) {
                    findings.push(
                        Finding::new(
                            FindingKind::DuplicateProvider,
                            format!(
                                "Provider '{}' setting '{}' is already supplied by another resource; ignoring this one",
                                registration.provider, key
                            ),
                        )
                        .on_node(resource.id.as_str()),
                    );
                    continue;
                }
                debug!("Folding {}.{} from {}", registration.provider, key, resource.id);
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
