pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod services;

pub use auth::{AccessGuard, ActionSet, Decision, DenyReason, PermissionService};
pub use config::AppConfig;
pub use error::{AccessError, AccessResult};
