//! Domain models and service traits for the Tenantbase backend.
//!
//! This crate contains:
//! - Domain model definitions and request/response DTOs
//! - The notification dispatcher abstraction

pub mod models;
pub mod services;
