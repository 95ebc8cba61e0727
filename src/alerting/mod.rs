pub mod alert_decision;
pub mod messages;
pub mod threshold_alerter;
