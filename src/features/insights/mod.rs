pub mod cost;
pub mod models;
pub mod service;
pub mod trials;

// 便利な再エクスポート
pub use cost::{aggregate_monthly, aggregate_yearly, monthly_equivalent, BillingCycle, MonthlyTwelfths};
pub use models::{CategoryRedundancy, DashboardSummary, DataWarning, InsightPolicy, TrialAlert};
pub use service::dashboard_summary;
pub use trials::{
    categorical_redundancy, classify_trial, days_until, expiring_trials, trial_days_left,
    TrialStatus, TRIAL_ENDING_SOON_DAYS,
};
