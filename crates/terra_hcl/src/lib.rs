//! # terra_hcl
//!
//! Compiles an infrastructure diagram into Terraform configuration for TerraStudio.
//!
//! A diagram snapshot (typed resources plus typed connections) is turned into
//! a deterministic HCL document and a list of validation findings.
//!
//! ## Features
//!
//! - Explicit composition of resource types, connection rules and providers into a [`Catalog`]
//! - Exact four-way connection rule matching with ambiguity reporting
//! - Reference injection on per-compilation working copies
//! - Project naming templates (`{name}`, `{env}`, `{region}`, `{org}`) with per-type constraints
//! - Variables, outputs and `terraform.tfvars` collected from generators
//! - Provider deduplication and provider-scope resource folding
//! - Central escaping of every emitted string literal
//! - Partial-failure isolation: one bad resource never blanks the document
//!
//! ## Example
//!
//! ```rust,no_run
//! use terra_hcl::{Catalog, DiagramCompiler, DiagramSnapshot};
//! use std::path::Path;
//!
//! let catalog = Catalog::builder().build();
//! let snapshot = DiagramSnapshot::from_file(Path::new("diagram.json")).unwrap();
//!
//! let compiled = DiagramCompiler::new(&catalog).compile(&snapshot).unwrap();
//! for finding in compiled.findings.iter() {
//!     println!("{}", finding);
//! }
//! compiled.write_to(Path::new("./terraform")).unwrap();
//! ```

pub mod block;
pub mod compiler;
pub mod context;
pub mod error;
pub mod escape;
pub mod findings;
pub mod injector;
pub mod model;
pub mod naming;
pub mod plugin;
pub mod provider;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod variables;
pub mod writer;

pub use block::{BodyItem, HclBlock, HclValue};
pub use compiler::{CompiledConfig, DiagramCompiler, GeneratedFiles};
pub use context::{DiagramIndex, HclGenerationContext, ResourceIdentity, VariableOptions};
pub use error::{HclError, HclResult};
pub use escape::{escape_hcl_string, quote};
pub use findings::{Finding, FindingKind, Findings, Severity};
pub use injector::{Endpoint, Injection, ReferenceInjector};
pub use model::{
    BackendConfig, Connection, DiagramSnapshot, NamingConvention, ProjectConfig, PropertyMode,
    PropertyValue, ProviderId, ResourceInstance, ResourceTypeId,
};
pub use naming::{terraform_identifier, NamingConstraints, NamingResolver};
pub use plugin::{Catalog, CatalogBuilder, InfraPlugin};
pub use provider::{
    ProviderBlockBuilder, ProviderBlockFn, ProviderBlocks, ProviderConfig, ProviderSettings,
    RequiredProvider,
};
pub use registry::{HclGenerator, NoBlocks, TypeRegistration, TypeRegistry};
pub use rules::{
    ConnectionRule, ConnectionRuleResolver, CreatesReference, EdgeEndpoints, ReferenceSide,
    RuleResolution,
};
pub use schema::{PropertyFieldType, PropertySchema, PropertyValidation};
pub use variables::{
    tfvars, Collected, CollectedMark, Collector, Named, OutputCollector, TerraformOutput, TerraformVariable,
    VariableCollector,
};
pub use writer::{render_block, render_document, render_value};
