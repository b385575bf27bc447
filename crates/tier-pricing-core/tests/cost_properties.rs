use proptest::prelude::*;
use serde_json::json;
use tier_pricing_core::calculator::{cost_at_usage, find_optimal_tier, Cost};
use tier_pricing_core::table::{parse_table, PricingTable};
use tier_pricing_core::Tier;

fn metered(name: &str, base: u32, included: u32, rate: f64) -> serde_json::Value {
    json!({
        "name": name,
        "price_monthly": base,
        "tool_calls_included": included,
        "additional_tool_call_cost_per_1k": rate
    })
}

fn tier(value: serde_json::Value) -> Tier {
    serde_json::from_value(value).unwrap()
}

fn table(tiers: Vec<serde_json::Value>) -> PricingTable {
    parse_table(&json!({"source": "prop", "tiers": tiers}).to_string()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn quote_tiers_never_have_a_price(calls in any::<u64>(), label in "[A-Za-z ]{0,12}") {
        let t = tier(json!({"name": "Enterprise", "price_monthly": label}));
        prop_assert_eq!(cost_at_usage(&t, calls), Cost::ContactForQuote);
        let t = tier(json!({"name": "Enterprise"}));
        prop_assert_eq!(cost_at_usage(&t, calls), Cost::ContactForQuote);
    }

    #[test]
    fn flat_tiers_cost_their_base(base in 0u32..10_000, included in 0u32..1_000_000, calls in any::<u64>()) {
        let t = tier(json!({"name": "Flat", "price_monthly": base, "tool_calls_included": included}));
        prop_assert_eq!(cost_at_usage(&t, calls), Cost::Amount(base as f64));
    }

    #[test]
    fn within_allowance_costs_base(
        base in 0u32..10_000,
        included in 0u32..10_000_000,
        rate in 0.001f64..50.0,
        frac in 0.0f64..=1.0,
    ) {
        let t = tier(metered("Pro", base, included, rate));
        let calls = (included as f64 * frac) as u64;
        prop_assert_eq!(cost_at_usage(&t, calls), Cost::Amount(base as f64));
    }

    #[test]
    fn overage_strictly_increases(
        base in 0u32..10_000,
        included in 0u32..10_000_000,
        rate in 0.001f64..50.0,
        over in 1u64..10_000_000,
        step in 1u64..10_000_000,
    ) {
        let t = tier(metered("Pro", base, included, rate));
        let lo = included as u64 + over;
        let hi = lo + step;
        let c_lo = cost_at_usage(&t, lo).amount().unwrap();
        let c_hi = cost_at_usage(&t, hi).amount().unwrap();
        prop_assert!(c_lo > base as f64, "{c_lo} should exceed base {base}");
        prop_assert!(c_hi > c_lo, "{c_hi} should exceed {c_lo}");
    }

    #[test]
    fn optimal_is_never_beaten(
        tiers in prop::collection::vec((0u32..1_000, 0u32..1_000_000, prop::option::of(0.0f64..10.0)), 1..6),
        calls in 0u64..20_000_000,
    ) {
        let specs: Vec<serde_json::Value> = tiers
            .iter()
            .enumerate()
            .map(|(i, (base, included, rate))| json!({
                "name": format!("T{i}"),
                "price_monthly": base,
                "tool_calls_included": included,
                "additional_tool_call_cost_per_1k": rate
            }))
            .collect();
        let t = table(specs);
        let rec = find_optimal_tier(&t, calls).unwrap();
        let best = rec.cost.amount().unwrap();
        for other in &t.tiers {
            let c = cost_at_usage(other, calls).amount().unwrap();
            prop_assert!(best <= c, "{} at {best} beaten by {} at {c}", rec.tier, other.name);
        }
    }
}
