pub mod insights;
pub mod subscriptions;
