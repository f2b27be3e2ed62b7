//! # terra_azure
//!
//! Built-in azurerm plugins for TerraStudio.
//!
//! Each module contributes resource types and connection rules for one area
//! of Azure; [`CorePlugin`] also owns the `azurerm` provider definition.
//!
//! ## Example
//!
//! ```rust,no_run
//! use terra_hcl::{DiagramCompiler, DiagramSnapshot};
//! use std::path::Path;
//!
//! let catalog = terra_azure::catalog();
//! let snapshot = DiagramSnapshot::from_file(Path::new("diagram.json")).unwrap();
//! let compiled = DiagramCompiler::new(&catalog).compile(&snapshot).unwrap();
//! println!("{}", compiled.document);
//! ```

pub mod base;
pub mod common;
pub mod compute;
pub mod networking;
pub mod provider;
pub mod security;
pub mod storage;

use terra_hcl::{Catalog, InfraPlugin};

pub use base::CorePlugin;
pub use compute::ComputePlugin;
pub use networking::NetworkingPlugin;
pub use provider::azurerm_provider;
pub use security::SecurityPlugin;
pub use storage::StoragePlugin;

/// All built-in azurerm plugins, provider owner first.
pub fn azure_plugins() -> Vec<Box<dyn InfraPlugin>> {
    vec![
        Box::new(CorePlugin),
        Box::new(NetworkingPlugin),
        Box::new(ComputePlugin),
        Box::new(StoragePlugin),
        Box::new(SecurityPlugin),
    ]
}

/// A catalog holding every built-in azurerm plugin.
pub fn catalog() -> Catalog {
    Catalog::builder().plugins(azure_plugins()).build()
}
