//! Coordinator configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, then passed explicitly to [`crate::Database::coordinator`].
//! Nothing here is global.
//!
//! ## Environment
//! - `QUOTEBOOK_QUOTE_PREFIX` - number prefix for quotes (default: `DEV`)
//! - `QUOTEBOOK_PROJECT_PREFIX` - number prefix for projects (default: `PRJ`)
//! - `QUOTEBOOK_DEFAULT_TAX_RATE` - VAT percent when a request has none (default: `20`)
//! - `QUOTEBOOK_MAX_LINE_ITEMS` - line limit per document (default: `500`)

use std::env;
use std::str::FromStr;

use quotebook_core::validation::{validate_prefix, validate_tax_rate};
use quotebook_core::{DocumentKind, TaxRate, MAX_LINE_ITEMS, PROJECT_PREFIX, QUOTE_PREFIX};
use rust_decimal::Decimal;

/// Settings the document coordinator is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub quote_prefix: String,

    pub project_prefix: String,

    /// Rate applied when a create request carries none.
    pub default_tax_rate: TaxRate,

    pub max_line_items: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            quote_prefix: QUOTE_PREFIX.to_string(),
            project_prefix: PROJECT_PREFIX.to_string(),
            default_tax_rate: TaxRate::default(),
            max_line_items: MAX_LINE_ITEMS,
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (used by tests).
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CoordinatorConfig::default();

        let quote_prefix = lookup("QUOTEBOOK_QUOTE_PREFIX").unwrap_or(defaults.quote_prefix);
        let project_prefix = lookup("QUOTEBOOK_PROJECT_PREFIX").unwrap_or(defaults.project_prefix);

        for (key, prefix) in [
            ("QUOTEBOOK_QUOTE_PREFIX", &quote_prefix),
            ("QUOTEBOOK_PROJECT_PREFIX", &project_prefix),
        ] {
            validate_prefix(prefix).map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
        }

        if quote_prefix == project_prefix {
            return Err(ConfigError::SharedPrefix(quote_prefix));
        }

        let default_tax_rate = match lookup("QUOTEBOOK_DEFAULT_TAX_RATE") {
            Some(raw) => {
                let percent = Decimal::from_str(raw.trim())
                    .map_err(|_| ConfigError::InvalidValue("QUOTEBOOK_DEFAULT_TAX_RATE".to_string()))?;
                validate_tax_rate(percent)
                    .map_err(|_| ConfigError::InvalidValue("QUOTEBOOK_DEFAULT_TAX_RATE".to_string()))?;
                TaxRate::from_percent(percent)
            }
            None => defaults.default_tax_rate,
        };

        let max_line_items = match lookup("QUOTEBOOK_MAX_LINE_ITEMS") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("QUOTEBOOK_MAX_LINE_ITEMS".to_string()))?,
            None => defaults.max_line_items,
        };

        Ok(CoordinatorConfig {
            quote_prefix,
            project_prefix,
            default_tax_rate,
            max_line_items,
        })
    }

    /// Number prefix used for a document kind.
    pub fn prefix_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Quote => &self.quote_prefix,
            DocumentKind::Project => &self.project_prefix,
        }
    }

    /// Prefixes used by every kind except `kind`.
    pub fn other_prefixes(&self, kind: DocumentKind) -> Vec<&str> {
        [DocumentKind::Quote, DocumentKind::Project]
            .into_iter()
            .filter(|k| *k != kind)
            .map(|k| self.prefix_for(k))
            .collect()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Quotes and projects cannot share the prefix {0}")]
    SharedPrefix(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CoordinatorConfig::from_source(source(&[])).unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.prefix_for(DocumentKind::Quote), "DEV");
        assert_eq!(config.prefix_for(DocumentKind::Project), "PRJ");
        assert_eq!(config.other_prefixes(DocumentKind::Quote), vec!["PRJ"]);
        assert_eq!(config.other_prefixes(DocumentKind::Project), vec!["DEV"]);
    }

    #[test]
    fn test_overrides() {
        let config = CoordinatorConfig::from_source(source(&[
            ("QUOTEBOOK_QUOTE_PREFIX", "Q"),
            ("QUOTEBOOK_DEFAULT_TAX_RATE", "5.5"),
            ("QUOTEBOOK_MAX_LINE_ITEMS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.prefix_for(DocumentKind::Quote), "Q");
        assert_eq!(config.default_tax_rate.percent(), Decimal::new(55, 1));
        assert_eq!(config.max_line_items, 50);
    }

    #[test]
    fn test_invalid_values() {
        for pairs in [
            [("QUOTEBOOK_DEFAULT_TAX_RATE", "abc")],
            [("QUOTEBOOK_DEFAULT_TAX_RATE", "120")],
            [("QUOTEBOOK_MAX_LINE_ITEMS", "0")],
            [("QUOTEBOOK_QUOTE_PREFIX", "dev")],
        ] {
            assert!(matches!(
                CoordinatorConfig::from_source(source(&pairs)),
                Err(ConfigError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn test_shared_prefix_rejected() {
        let result = CoordinatorConfig::from_source(source(&[("QUOTEBOOK_PROJECT_PREFIX", "DEV")]));
        assert!(matches!(result, Err(ConfigError::SharedPrefix(_))));
    }
}
