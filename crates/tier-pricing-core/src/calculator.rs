use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::table::PricingTable;
use crate::tier::{render_value, Tier};

pub const CONTACT_FOR_QUOTE: &str = "Contact for quote";
pub const NOT_AVAILABLE: &str = "N/A";

/// Feature keys compared by default in the feature matrix.
pub const DEFAULT_FEATURES: &[&str] = &[
    "support",
    "custom_tool_builder",
    "rbac",
    "audit_logs",
    "soc2",
    "vpc_onprem",
    "log_retention_days",
];

/// Monthly cost of a tier at some volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    /// USD per month.
    Amount(f64),
    ContactForQuote,
}

impl Cost {
    pub fn amount(self) -> Option<f64> {
        match self {
            Cost::Amount(v) => Some(v),
            Cost::ContactForQuote => None,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Amount(v) => write!(f, "${v:.2}"),
            Cost::ContactForQuote => f.write_str(CONTACT_FOR_QUOTE),
        }
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cost::Amount(v) => serializer.serialize_f64(*v),
            Cost::ContactForQuote => serializer.serialize_str(CONTACT_FOR_QUOTE),
        }
    }
}

/// Total monthly cost of `tier` at `calls` tool calls.
///
/// Tiers without a numeric base price cost [`Cost::ContactForQuote`]. Tiers
/// without an overage rate, or whose allowance is not an integer, are flat.
/// Otherwise calls beyond the allowance are billed per 1,000; a negative
/// allowance bills those calls too.
pub fn cost_at_usage(tier: &Tier, calls: u64) -> Cost {
    let Some(base) = tier.base_price() else {
        return Cost::ContactForQuote;
    };
    match (tier.included_calls(), tier.overage_rate()) {
        (Some(included), Some(rate)) => {
            let overage = (i128::from(calls) - i128::from(included)).max(0);
            Cost::Amount(base + overage as f64 / 1000.0 * rate)
        }
        _ => Cost::Amount(base),
    }
}

/// [`PricingTable::numeric_tiers`] paired with their base price. Every cost
/// report goes through here so the excluded tiers are logged once per report.
fn priced_tiers(table: &PricingTable) -> Vec<(&Tier, f64)> {
    for t in table.tiers.iter().filter(|t| t.base_price().is_none()) {
        debug!(tier = %t.name, "no numeric price, excluded from cost arithmetic");
    }
    table
        .numeric_tiers()
        .filter_map(|t| Some((t, t.base_price()?)))
        .collect()
}

/// Cheapest tier at one volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub calls: u64,
    pub tier: String,
    pub cost: Cost,
}

/// The cheapest numerically priced tier at `calls`. Ties go to the tier
/// listed first.
///
/// With no numeric tier, falls back to the first contact-for-quote tier in
/// table order. Returns None only for an empty table.
pub fn find_optimal_tier(table: &PricingTable, calls: u64) -> Option<Recommendation> {
    let cheapest = priced_tiers(table)
        .into_iter()
        .filter_map(|(t, _)| cost_at_usage(t, calls).amount().map(|c| (t, c)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    if let Some((tier, cost)) = cheapest {
        return Some(Recommendation {
            calls,
            tier: tier.name.clone(),
            cost: Cost::Amount(cost),
        });
    }

    let fallback = table.tiers.iter().find(|t| t.base_price().is_none())?;
    warn!(
        calls,
        tier = %fallback.name,
        "no tier has a numeric price, recommending contact-for-quote tier"
    );
    Some(Recommendation {
        calls,
        tier: fallback.name.clone(),
        cost: Cost::ContactForQuote,
    })
}

/// [`find_optimal_tier`] for each volume.
pub fn recommendations(table: &PricingTable, volumes: &[u64]) -> Vec<Recommendation> {
    volumes
        .iter()
        .filter_map(|&calls| find_optimal_tier(table, calls))
        .collect()
}

/// Why two adjacent tiers have no analytical break-even point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotApplicable {
    /// Same overage rate: the cost lines never cross (or always coincide).
    EqualOverageRates,
    /// One of the tiers has a non-integer allowance.
    UnmeteredAllowance,
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EqualOverageRates => f.write_str("equal overage rates"),
            Self::UnmeteredAllowance => f.write_str("unmetered allowance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakEvenOutcome {
    At { calls: f64 },
    NotApplicable { reason: NotApplicable },
}

/// Break-even point between two adjacent priced tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEven {
    pub from: String,
    pub to: String,
    pub outcome: BreakEvenOutcome,
}

impl BreakEven {
    pub fn calls(&self) -> Option<f64> {
        match self.outcome {
            BreakEvenOutcome::At { calls } => Some(calls),
            BreakEvenOutcome::NotApplicable { .. } => None,
        }
    }
}

/// For each adjacent pair of priced tiers, the volume at which both cost the
/// same. A missing overage rate counts as 0.
///
/// Solves `a_base + (x - a_inc) * a_rate/1000 = b_base + (x - b_inc) * b_rate/1000`
/// on the linear part of the cost curves. The result may be negative or fall
/// inside an allowance, where the real costs are clamped.
pub fn break_even_analysis(table: &PricingTable) -> Vec<BreakEven> {
    let tiers = priced_tiers(table);
    tiers
        .windows(2)
        .map(|pair| {
            let ((a, a_base), (b, b_base)) = (pair[0], pair[1]);
            BreakEven {
                from: a.name.clone(),
                to: b.name.clone(),
                outcome: solve_break_even(a, a_base, b, b_base),
            }
        })
        .collect()
}

fn solve_break_even(a: &Tier, a_base: f64, b: &Tier, b_base: f64) -> BreakEvenOutcome {
    let (Some(a_inc), Some(b_inc)) = (a.included_calls(), b.included_calls()) else {
        return BreakEvenOutcome::NotApplicable {
            reason: NotApplicable::UnmeteredAllowance,
        };
    };
    let a_rate = a.overage_rate().unwrap_or(0.0);
    let b_rate = b.overage_rate().unwrap_or(0.0);
    let rate_diff = a_rate - b_rate;
    if rate_diff == 0.0 {
        return BreakEvenOutcome::NotApplicable {
            reason: NotApplicable::EqualOverageRates,
        };
    }

    let (a_inc, b_inc) = (a_inc as f64, b_inc as f64);
    let calls = ((b_base - a_base) - b_inc * b_rate / 1000.0 + a_inc * a_rate / 1000.0)
        / (rate_diff / 1000.0);
    BreakEvenOutcome::At { calls }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature: String,
    /// One value per tier, in table order.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub tiers: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

/// One row per requested feature across every tier (priced or not).
/// Missing keys read "N/A".
pub fn feature_matrix<S: AsRef<str>>(table: &PricingTable, features: &[S]) -> FeatureMatrix {
    let rows = features
        .iter()
        .map(|feature| {
            let feature = feature.as_ref();
            let values = table
                .tiers
                .iter()
                .map(|t| {
                    t.attribute(feature)
                        .map(|v| render_value(&v))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                })
                .collect();
            FeatureRow {
                feature: feature.to_string(),
                values,
            }
        })
        .collect();

    FeatureMatrix {
        tiers: table.tiers.iter().map(|t| t.name.clone()).collect(),
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    pub calls: u64,
    /// USD per month, one per priced tier.
    pub costs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComparison {
    /// Priced tiers only; quote-only tiers have no cost to compare.
    pub tiers: Vec<String>,
    pub rows: Vec<CostRow>,
}

/// Cost of every priced tier at each volume.
pub fn cost_comparison(table: &PricingTable, volumes: &[u64]) -> CostComparison {
    let tiers = priced_tiers(table);
    let rows = volumes
        .iter()
        .map(|&calls| CostRow {
            calls,
            costs: tiers
                .iter()
                .filter_map(|(t, _)| cost_at_usage(t, calls).amount())
                .collect(),
        })
        .collect();

    CostComparison {
        tiers: tiers.iter().map(|(t, _)| t.name.clone()).collect(),
        rows,
    }
}
