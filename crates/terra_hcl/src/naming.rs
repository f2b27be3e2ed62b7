//! Naming template expansion.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::model::NamingConvention;

/// Per-type limits applied to a name after template expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConstraints {
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default)]
    pub no_hyphens: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl NamingConstraints {
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn no_hyphens(mut self) -> Self {
        self.no_hyphens = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Lowercase, then strip hyphens, then truncate to `max_length` characters.
    pub fn apply(&self, name: &str) -> String {
        let mut result = if self.lowercase {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        if self.no_hyphens {
            result.retain(|c| c != '-');
        }
        if let Some(max) = self.max_length {
            if let Some((cut, _)) = result.char_indices().nth(max) {
                result.truncate(cut);
            }
        }
        result
    }
}

/// Expands a project naming template into a resource's emitted name.
pub struct NamingResolver {
    token_pattern: Regex,
}

impl Default for NamingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingResolver {
    pub fn new() -> Self {
        Self {
            // Match {token} pattern
            token_pattern: Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}")
                .expect("token pattern is a valid regex"),
        }
    }

    /// Resolve the emitted name of a resource.
    ///
    /// With the convention disabled the local name is returned unchanged.
    /// Otherwise `{name}`, `{env}`, `{region}` and `{org}` are substituted in a
    /// single pass; substituted text is never scanned again, so a local name
    /// containing `{env}` stays literal. Unknown tokens and tokens whose field
    /// is absent are kept as written.
    pub fn resolve(&self, convention: &NamingConvention, local_name: &str) -> String {
        self.resolve_constrained(convention, local_name, None)
    }

    /// Resolve a name and apply the type's constraints to the expanded template.
    ///
    /// Constraints only shape template output; with the convention disabled
    /// the local name is the user's literal choice and is returned as is.
    pub fn resolve_constrained(
        &self,
        convention: &NamingConvention,
        local_name: &str,
        constraints: Option<&NamingConstraints>,
    ) -> String {
        if !convention.enabled {
            return local_name.to_string();
        }

        let expanded = self
            .token_pattern
            .replace_all(&convention.template, |caps: &Captures<'_>| {
                let value = match &caps[1] {
                    "name" => Some(local_name),
                    "env" => convention.env.as_deref(),
                    "region" => convention.region.as_deref(),
                    "org" => convention.org.as_deref(),
                    _ => None,
                };
                value.map(str::to_string).unwrap_or_else(|| caps[0].to_string())
            });

        match constraints {
            Some(constraints) => constraints.apply(&expanded),
            None => expanded.into_owned(),
        }
    }
}

/// Convert an emitted name into a Terraform identifier usable as a block label.
///
/// Non-identifier characters become `_`, the result is lowercased and may not
/// start with a digit or underscore.
pub fn terraform_identifier(name: &str) -> String {
    let converted: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let trimmed = converted.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');

    if trimmed.is_empty() {
        "resource".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convention() -> NamingConvention {
        NamingConvention::new("{org}-{type}-{env}-{name}", "prod").with_org("acme")
    }

    #[test]
    fn test_disabled_returns_local_name() {
        let resolver = NamingResolver::new();
        let mut naming = convention();
        naming.enabled = false;
        assert_eq!(resolver.resolve(&naming, "db1"), "db1");
    }

    #[test]
    fn test_unknown_token_passes_through() {
        let resolver = NamingResolver::new();
        assert_eq!(resolver.resolve(&convention(), "db1"), "acme-{type}-prod-db1");
    }

    #[test]
    fn test_absent_optional_token_stays_literal() {
        let resolver = NamingResolver::new();
        let naming = NamingConvention::new("{name}-{region}-{env}", "dev");
        assert_eq!(resolver.resolve(&naming, "web"), "web-{region}-dev");

        let naming = naming.with_region("weu");
        assert_eq!(resolver.resolve(&naming, "web"), "web-weu-dev");
    }

    #[test]
    fn test_repeated_tokens() {
        let resolver = NamingResolver::new();
        let naming = NamingConvention::new("{name}{name}-{env}", "qa");
        assert_eq!(resolver.resolve(&naming, "x"), "xx-qa");
    }

    #[test]
    fn test_single_pass_no_recursive_expansion() {
        let resolver = NamingResolver::new();
        let naming = NamingConvention::new("{env}-{name}", "prod").with_org("acme");
        assert_eq!(resolver.resolve(&naming, "{org}"), "prod-{org}");
        assert_eq!(resolver.resolve(&naming, "{env}"), "prod-{env}");
    }

    #[test]
    fn test_missing_env_stays_literal() {
        let resolver = NamingResolver::new();
        let naming: NamingConvention =
            serde_json::from_str(r#"{"enabled": true, "template": "{name}-{env}"}"#).unwrap();
        assert_eq!(naming.env, None);
        assert_eq!(resolver.resolve(&naming, "web"), "web-{env}");
    }

    #[test]
    fn test_constraints_applied_after_expansion() {
        let resolver = NamingResolver::new();
        let naming = NamingConvention::new("{org}-{name}-{env}", "prod").with_org("Acme");
        let storage = NamingConstraints::default().lowercase().no_hyphens().max_length(24);

        assert_eq!(resolver.resolve_constrained(&naming, "Logs", Some(&storage)), "acmelogsprod");
        assert_eq!(resolver.resolve(&naming, "Logs"), "Acme-Logs-prod");

        let long = resolver.resolve_constrained(&naming, "diagnosticsarchive", Some(&storage));
        assert_eq!(long, "acmediagnosticsarchivepr");
        assert_eq!(long.len(), 24);
    }

    #[test]
    fn test_constraints_skip_disabled_convention() {
        let resolver = NamingResolver::new();
        let storage = NamingConstraints::default().lowercase().no_hyphens();
        assert_eq!(
            resolver.resolve_constrained(&NamingConvention::default(), "My-Store", Some(&storage)),
            "My-Store"
        );
    }

    #[test]
    fn test_max_length_counts_characters() {
        let constraints = NamingConstraints::default().max_length(3);
        assert_eq!(constraints.apply("ééééé"), "ééé");
        assert_eq!(constraints.apply("ab"), "ab");
    }

    #[test]
    fn test_terraform_identifier() {
        assert_eq!(terraform_identifier("rg-prod-eus2"), "rg_prod_eus2");
        assert_eq!(terraform_identifier("My App.v2"), "my_app_v2");
        assert_eq!(terraform_identifier("1st-vnet"), "st_vnet");
        assert_eq!(terraform_identifier("__"), "resource");
        assert_eq!(terraform_identifier("acme-{type}-prod"), "acme__type__prod");
    }
}
