//! The azurerm provider definition.

use terra_hcl::{HclBlock, HclValue, PropertySchema, ProviderConfig, ProviderSettings};

pub const PROVIDER_ID: &str = "azurerm";
pub const PROVIDER_SOURCE: &str = "hashicorp/azurerm";
pub const PROVIDER_VERSION: &str = "~> 4.0";

/// Settings copied verbatim into the provider block when set.
const OPTIONAL_SETTINGS: &[&str] = &["subscription_id", "tenant_id", "environment"];

pub fn azurerm_provider() -> ProviderConfig {
    ProviderConfig::new(
        PROVIDER_ID,
        "Azure Resource Manager",
        PROVIDER_SOURCE,
        PROVIDER_VERSION,
        azurerm_provider_block,
    )
    .with_schema(vec![
        PropertySchema::string("subscription_id", "Subscription ID").optional(),
        PropertySchema::string("tenant_id", "Tenant ID").optional(),
        PropertySchema::string("environment", "Cloud environment").optional(),
    ])
}

fn azurerm_provider_block(settings: &ProviderSettings) -> HclBlock {
    let mut block = HclBlock::new("provider").with_label(PROVIDER_ID);
    for key in OPTIONAL_SETTINGS {
        if let Some(value) = settings.get(*key).filter(|v| !v.is_blank()) {
            block.set(*key, HclValue::from(value));
        }
    }
    block.block(HclBlock::new("features"))
}
