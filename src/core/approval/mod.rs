// Core approval module - startup listings and the pending -> approved sweep.

pub mod approval_models;
pub mod approval_service;

pub use approval_models::*;
pub use approval_service::*;
