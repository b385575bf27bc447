use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monthly base price of a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthlyPrice {
    Fixed(f64),
    /// Non-numeric price such as `"Custom"`: contact for quote.
    Quote(Value),
}

/// How many tool calls the base price covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Allowance {
    /// Any integer, negative included.
    Calls(i64),
    /// Anything that isn't an integer (`"Unlimited"`, `"Custom"`, null, 1000.5).
    /// The tier is then billed flat.
    Unmetered(Value),
}

impl Default for Allowance {
    fn default() -> Self {
        Allowance::Calls(0)
    }
}

/// A pricing plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    #[serde(default)]
    pub price_monthly: Option<MonthlyPrice>,
    #[serde(default)]
    pub tool_calls_included: Allowance,
    /// USD per 1,000 tool calls beyond the allowance.
    #[serde(default)]
    pub additional_tool_call_cost_per_1k: Option<f64>,
    /// Feature flags and everything else (support, rbac, log_retention_days, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Tier {
    /// Numeric base price, or None for contact-for-quote tiers.
    pub fn base_price(&self) -> Option<f64> {
        match self.price_monthly {
            Some(MonthlyPrice::Fixed(p)) => Some(p),
            _ => None,
        }
    }

    pub fn included_calls(&self) -> Option<i64> {
        match self.tool_calls_included {
            Allowance::Calls(n) => Some(n),
            Allowance::Unmetered(_) => None,
        }
    }

    pub fn overage_rate(&self) -> Option<f64> {
        self.additional_tool_call_cost_per_1k
    }

    pub fn log_retention_days(&self) -> Option<u64> {
        self.attributes.get("log_retention_days").and_then(Value::as_u64)
    }

    /// Look up any key of the tier, named field or free-form attribute.
    /// JSON null counts as missing.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        let value = match key {
            "name" => Value::String(self.name.clone()),
            "price_monthly" => match self.price_monthly.as_ref()? {
                MonthlyPrice::Fixed(p) => serde_json::Number::from_f64(*p).map(Value::Number)?,
                MonthlyPrice::Quote(v) => v.clone(),
            },
            "tool_calls_included" => match &self.tool_calls_included {
                Allowance::Calls(n) => Value::from(*n),
                Allowance::Unmetered(v) => v.clone(),
            },
            "additional_tool_call_cost_per_1k" => {
                serde_json::Number::from_f64(self.additional_tool_call_cost_per_1k?)
                    .map(Value::Number)?
            }
            _ => self.attributes.get(key)?.clone(),
        };
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }
}

/// Render an opaque attribute value for a table cell.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}
