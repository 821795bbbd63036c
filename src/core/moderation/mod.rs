// Core moderation module - scores startup submissions before they go live.
// Models and service are split the same way as the other core modules.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
