pub mod calculator;
pub mod config;
pub mod error;
pub mod report;
pub mod table;
pub mod tier;
pub mod volume;

pub use calculator::{
    break_even_analysis, cost_at_usage, cost_comparison, feature_matrix, find_optimal_tier,
    Cost,
};
pub use config::ReportConfig;
pub use error::PricingError;
pub use table::PricingTable;
pub use tier::Tier;
