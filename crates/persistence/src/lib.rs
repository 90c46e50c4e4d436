//! Persistence layer for the Tenantbase backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - The injectable `InvitationStore` used by the invitation workflow

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;
