use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::tier::Tier;

/// A pricing page: where it came from and its tiers in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTable {
    pub source: String,
    pub tiers: Vec<Tier>,
}

impl PricingTable {
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name.as_str()).collect()
    }

    /// Tiers with a numeric base price, in table order.
    pub fn numeric_tiers(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter().filter(|t| t.base_price().is_some())
    }

    /// Find a tier by name. Case, spaces, `-` and `_` are ignored. An exact
    /// match wins; otherwise a prefix must match exactly one tier.
    pub fn find_tier(&self, input: &str) -> Option<&Tier> {
        let needle = normalize(input);
        if needle.is_empty() {
            return None;
        }
        if let Some(exact) = self.tiers.iter().find(|t| normalize(&t.name) == needle) {
            return Some(exact);
        }
        let mut prefixed = self.tiers.iter().filter(|t| normalize(&t.name).starts_with(&needle));
        match (prefixed.next(), prefixed.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Load a pricing table from disk. `.toml` files are parsed as TOML,
/// everything else as JSON.
pub fn load_table(path: &Path) -> Result<PricingTable> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PricingError::Io(format!("{}: {e}", path.display())))?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let table = if is_toml {
        parse_table_toml(&content)?
    } else {
        parse_table(&content)?
    };
    debug!(
        path = %path.display(),
        source = %table.source,
        tiers = table.tiers.len(),
        "loaded pricing table"
    );
    Ok(table)
}

/// Parse a pricing table from a JSON string.
pub fn parse_table(json: &str) -> Result<PricingTable> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a pricing table from a TOML string (`source = ...` plus `[[tiers]]`).
pub fn parse_table_toml(toml_str: &str) -> Result<PricingTable> {
    toml::from_str(toml_str).map_err(|e| PricingError::Toml(format!("bad pricing table: {e}")))
}

/// The sample table shipped in data/pricing_data.json.
pub fn load_bundled_table() -> Result<PricingTable> {
    let json = include_str!("../../../data/pricing_data.json");
    parse_table(json)
}
