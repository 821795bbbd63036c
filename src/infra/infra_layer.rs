// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "database.rs"]
pub mod database;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "startups/mod.rs"]
pub mod startups;

#[path = "contacts/mod.rs"]
pub mod contacts;

#[path = "saved_startups/mod.rs"]
pub mod saved_startups;

#[path = "investments/mod.rs"]
pub mod investments;
