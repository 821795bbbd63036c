// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "approval/mod.rs"]
pub mod approval;

#[path = "contacts/contact_service.rs"]
pub mod contacts;

#[path = "saved_startups/saved_startup_service.rs"]
pub mod saved_startups;

#[path = "investments/investment_service.rs"]
pub mod investments;
