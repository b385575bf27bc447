use serde::Serialize;

use crate::calculator::{
    break_even_analysis, cost_comparison, feature_matrix, recommendations, BreakEven,
    CostComparison, FeatureMatrix, Recommendation,
};
use crate::config::ReportConfig;
use crate::table::PricingTable;

/// Everything the default `tier-pricing` run prints, in print order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub tiers: Vec<String>,
    pub cost_comparison: CostComparison,
    pub break_even: Vec<BreakEven>,
    pub feature_matrix: FeatureMatrix,
    pub recommendations: Vec<Recommendation>,
}

pub fn build_report(table: &PricingTable, config: &ReportConfig) -> Report {
    Report {
        source: table.source.clone(),
        tiers: table.tiers.iter().map(|t| t.name.clone()).collect(),
        cost_comparison: cost_comparison(table, &config.volumes),
        break_even: break_even_analysis(table),
        feature_matrix: feature_matrix(table, config.features.as_slice()),
        recommendations: recommendations(table, &config.volumes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::load_bundled_table;

    #[test]
    fn bundled_report_is_consistent() {
        let table = load_bundled_table().unwrap();
        let config = ReportConfig::default();
        let report = build_report(&table, &config);

        assert_eq!(report.tiers.len(), table.tiers.len());
        assert_eq!(report.cost_comparison.rows.len(), config.volumes.len());
        assert_eq!(report.feature_matrix.rows.len(), config.features.len());
        assert_eq!(report.recommendations.len(), config.volumes.len());
        assert_eq!(
            report.break_even.len(),
            table.numeric_tiers().count().saturating_sub(1)
        );
    }

    #[test]
    fn report_serializes() {
        let table = load_bundled_table().unwrap();
        let report = build_report(&table, &ReportConfig::default());
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["source"], table.source.as_str());
        assert!(v["recommendations"][0]["tier"].is_string());
        assert!(v["break_even"][0]["outcome"]["kind"].is_string());
    }
}
