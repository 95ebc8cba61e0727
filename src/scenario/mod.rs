pub mod notifiers;
pub mod scenario;
pub mod sessions;
