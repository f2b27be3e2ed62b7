//! Whole-diagram compilation to Terraform configuration.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::block::{HclBlock, HclValue};
use crate::context::{DiagramIndex, HclGenerationContext, ResourceIdentity};
use crate::error::HclResult;
use crate::findings::{Finding, FindingKind, Findings};
use crate::injector::{Endpoint, ReferenceInjector};
use crate::model::{Connection, DiagramSnapshot, ProjectConfig, ResourceInstance};
use crate::naming::{terraform_identifier, NamingResolver};
use crate::plugin::Catalog;
use crate::provider::ProviderBlockBuilder;
use crate::registry::TypeRegistration;
use crate::rules::{ConnectionRuleResolver, EdgeEndpoints, RuleResolution};
use crate::variables::{tfvars, Collected, TerraformOutput, TerraformVariable};
use crate::writer::{render_block, render_document};

/// Output of one compilation.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledConfig {
    #[serde(skip)]
    pub terraform: HclBlock,
    #[serde(skip)]
    pub providers: Vec<HclBlock>,
    #[serde(skip)]
    pub locals: Option<HclBlock>,
    /// Generator output in resource order.
    #[serde(skip)]
    pub blocks: Vec<HclBlock>,
    /// Variables registered by generators, first registration per name.
    pub variables: Vec<TerraformVariable>,
    #[serde(skip)]
    pub outputs: Vec<TerraformOutput>,
    /// `terraform.tfvars` content for variables with a project value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tfvars: Option<String>,
    /// The assembled configuration document.
    pub document: String,
    pub findings: Findings,
}

/// Generated file name to file content.
pub type GeneratedFiles = BTreeMap<String, String>;

impl CompiledConfig {
    pub fn has_errors(&self) -> bool {
        self.findings.has_errors()
    }

    /// Split the configuration into the conventional Terraform file layout.
    ///
    /// Empty files are omitted.
    pub fn files(&self) -> GeneratedFiles {
        let mut files = GeneratedFiles::new();
        files.insert("terraform.tf".to_string(), render_block(&self.terraform));

        if !self.providers.is_empty() {
            files.insert("providers.tf".to_string(), render_document(&self.providers));
        }
        if let Some(locals) = &self.locals {
            files.insert("locals.tf".to_string(), render_block(locals));
        }

        let mut main = Vec::new();
        let mut variables: Vec<HclBlock> = self.variables.iter().map(TerraformVariable::to_block).collect();
        let mut outputs = Vec::new();
        for block in &self.blocks {
            match block.block_type.as_str() {
                "variable" => variables.push(block.clone()),
                "output" => outputs.push(block.clone()),
                _ => main.push(block.clone()),
            }
        }

        outputs.extend(self.outputs.iter().map(TerraformOutput::to_block));

        for (name, blocks) in [("main.tf", main), ("variables.tf", variables), ("outputs.tf", outputs)] {
            if !blocks.is_empty() {
                files.insert(name.to_string(), render_document(&blocks));
            }
        }
        if let Some(tfvars) = &self.tfvars {
            files.insert("terraform.tfvars".to_string(), tfvars.clone());
        }
        files
    }

    /// Write the generated files into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> HclResult<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for (name, content) in self.files() {
            let path = dir.join(name);
            fs::write(&path, content)?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        info!("Wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Drives naming, reference injection, provider assembly and generation.
pub struct DiagramCompiler<'c> {
    catalog: &'c Catalog,
    naming: NamingResolver,
}

impl<'c> DiagramCompiler<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            naming: NamingResolver::new(),
        }
    }

    /// Compile a diagram snapshot.
    ///
    /// The snapshot is never mutated; references are injected into working
    /// copies. Per-resource and per-edge problems become findings, and only a
    /// structurally inconsistent snapshot returns an error.
    pub fn compile(&self, snapshot: &DiagramSnapshot) -> HclResult<CompiledConfig> {
        snapshot.check_consistency()?;
        info!(
            "Compiling diagram: {} resources, {} connections",
            snapshot.nodes.len(),
            snapshot.edges.len()
        );

        let mut findings = Findings::new();
        let mut index = self.index_resources(snapshot);

        let mut injected: HashSet<(String, String)> = HashSet::new();
        for edge in &snapshot.edges {
            self.connect(edge, &mut index, &mut injected, &mut findings);
        }

        for node in &snapshot.nodes {
            self.apply_defaults(&node.id, &mut index, &mut findings);
        }

        let working: Vec<&ResourceInstance> = snapshot
            .nodes
            .iter()
            .filter_map(|node| index.resource(&node.id))
            .collect();

        let provider_blocks = ProviderBlockBuilder::build(
            &working,
            &self.catalog.types,
            &self.catalog.providers,
            &snapshot.project,
            &mut findings,
        );

        let collected = RefCell::new(Collected::default());
        let mut blocks = Vec::new();
        for resource in &working {
            blocks.extend(self.generate(resource, &index, snapshot, &collected, &mut findings));
        }
        let Collected { variables, outputs } = collected.into_inner();
        let variables = variables.into_vec();
        let outputs = outputs.into_vec();
        let tfvars = tfvars(&variables, &snapshot.project.variable_values);

        let terraform = provider_blocks.terraform_block(&snapshot.project);
        let locals = locals_block(&snapshot.project);

        let mut document_blocks = vec![terraform.clone()];
        document_blocks.extend(provider_blocks.provider_blocks.iter().cloned());
        document_blocks.extend(locals.iter().cloned());
        document_blocks.extend(variables.iter().map(TerraformVariable::to_block));
        document_blocks.extend(blocks.iter().cloned());
        document_blocks.extend(outputs.iter().map(TerraformOutput::to_block));
        let document = render_document(&document_blocks);

        info!(
            "Compiled {} blocks with {} findings",
            blocks.len(),
            findings.len()
        );

        Ok(CompiledConfig {
            terraform,
            providers: provider_blocks.provider_blocks,
            locals,
            blocks,
            variables,
            outputs,
            tfvars,
            document,
            findings,
        })
    }

    /// Working copies plus resolved identities, in snapshot order.
    fn index_resources(&self, snapshot: &DiagramSnapshot) -> DiagramIndex {
        let mut index = DiagramIndex::new();
        let mut addresses = HashSet::new();

        for node in &snapshot.nodes {
            let registration = self.catalog.types.get(&node.type_id);
            let resolved_name = self.naming.resolve_constrained(
                &snapshot.naming,
                &node.name,
                registration.and_then(|reg| reg.naming_constraints.as_ref()),
            );
            let terraform_type = registration.and_then(|reg| reg.terraform_type.clone());

            let base = terraform_identifier(&resolved_name);
            let mut label = base.clone();
            if let Some(tf_type) = &terraform_type {
                let mut suffix = 2;
                while !addresses.insert(format!("{}.{}", tf_type, label)) {
                    label = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
                if label != base {
                    warn!("Label {}.{} already taken; using {} for {}", tf_type, base, label, node.id);
                }
            }

            debug!("Resolved {} -> {} ({})", node.id, resolved_name, label);
            index.insert(
                node.clone(),
                ResourceIdentity {
                    resolved_name,
                    label,
                    terraform_type,
                },
            );
        }
        index
    }

    fn connect(
        &self,
        edge: &Connection,
        index: &mut DiagramIndex,
        injected: &mut HashSet<(String, String)>,
        findings: &mut Findings,
    ) {
        let injection = {
            let (Some(source), Some(target)) = (
                index.resource(&edge.source_node_id),
                index.resource(&edge.target_node_id),
            ) else {
                return;
            };
            let (Some(source_identity), Some(target_identity)) = (
                index.identity(&edge.source_node_id),
                index.identity(&edge.target_node_id),
            ) else {
                return;
            };

            let endpoints = EdgeEndpoints {
                source_type: &source.type_id,
                source_handle: &edge.source_handle,
                target_type: &target.type_id,
                target_handle: &edge.target_handle,
            };

            let rule = match ConnectionRuleResolver::resolve(&self.catalog.rules, &endpoints) {
                RuleResolution::Matched(rule) => rule,
                RuleResolution::Ambiguous { rule, candidates } => {
                    findings.push(
                        Finding::new(
                            FindingKind::AmbiguousRule,
                            format!(
                                "{} connection rules match {}; using the first registered",
                                candidates, endpoints
                            ),
                        )
                        .on_edge(edge.id.as_str()),
                    );
                    rule
                }
                RuleResolution::Unresolved => {
                    findings.push(
                        Finding::new(
                            FindingKind::UnresolvedConnection,
                            format!("No connection rule allows {}", endpoints),
                        )
                        .on_edge(edge.id.as_str()),
                    );
                    return;
                }
            };

            ReferenceInjector::apply(
                rule,
                Endpoint {
                    resource: source,
                    identity: source_identity,
                },
                Endpoint {
                    resource: target,
                    identity: target_identity,
                },
            )
        };

        let Some(injection) = injection else {
            return;
        };

        let receiver = injection.updated.id.clone();
        let key = (receiver.clone(), injection.property_key.clone());
        let earlier_edge = !injected.insert(key);

        if let Some(previous) = &injection.overwritten {
            let message = if earlier_edge {
                format!(
                    "Property '{}' of '{}' is set by more than one connection; the last one wins",
                    injection.property_key, receiver
                )
            } else {
                format!(
                    "Connection replaced the value {:?} of property '{}' on '{}'",
                    previous, injection.property_key, receiver
                )
            };
            findings.push(
                Finding::new(FindingKind::ReferenceOverwroteValue, message)
                    .on_node(receiver.as_str())
                    .on_edge(edge.id.as_str()),
            );
        }

        if let Some(slot) = index.resource_mut(&receiver) {
            *slot = injection.updated;
        }
    }

    /// Fill schema defaults and report required properties that stay unset.
    fn apply_defaults(&self, id: &str, index: &mut DiagramIndex, findings: &mut Findings) {
        let Some(resource) = index.resource_mut(id) else {
            return;
        };
        let Some(registration) = self.catalog.types.get(&resource.type_id) else {
            return;
        };

        for property in &registration.schema {
            let unset = resource
                .property(&property.key)
                .map(|v| v.is_blank())
                .unwrap_or(true);
            if !unset {
                continue;
            }

            if let Some(default) = &property.default_value {
                resource.properties.insert(property.key.clone(), default.clone());
            } else if property.required {
                findings.push(
                    Finding::new(
                        FindingKind::MissingProperty,
                        format!(
                            "'{}' is missing required property '{}'",
                            resource.name, property.key
                        ),
                    )
                    .on_node(id),
                );
            }
        }
    }

    fn generate(
        &self,
        resource: &ResourceInstance,
        index: &DiagramIndex,
        snapshot: &DiagramSnapshot,
        collected: &RefCell<Collected>,
        findings: &mut Findings,
    ) -> Vec<HclBlock> {
        let registration: &TypeRegistration = match self.catalog.types.resolve(&resource.type_id) {
            Ok(registration) => registration,
            Err(e) => {
                warn!("Skipping {}: {}", resource.id, e);
                findings.push(
                    Finding::new(FindingKind::UnknownResourceType, e.to_string()).on_node(resource.id.as_str()),
                );
                return Vec::new();
            }
        };

        let Some(identity) = index.identity(&resource.id) else {
            return Vec::new();
        };
        let context = HclGenerationContext::new(identity, index, &snapshot.naming, &snapshot.project, collected);
        let mark = collected.borrow().mark();

        match registration.generator.generate(resource, &context) {
            Ok(blocks) => {
                debug!("{} generated {} blocks", resource.id, blocks.len());
                blocks
            }
            Err(e) => {
                warn!("Generator for {} failed: {}", resource.id, e);
                collected.borrow_mut().rollback(mark);
                findings.push(
                    Finding::new(FindingKind::GeneratorFailed, e.to_string()).on_node(resource.id.as_str()),
                );
                Vec::new()
            }
        }
    }
}

fn locals_block(project: &ProjectConfig) -> Option<HclBlock> {
    if project.common_tags.is_empty() {
        return None;
    }
    let tags = project
        .common_tags
        .iter()
        .map(|(k, v)| (k.clone(), HclValue::string(v.as_str())))
        .collect();
    Some(HclBlock::new("locals").attr("common_tags", HclValue::Object(tags)))
}
