//! Shared utilities and common types for the Tenantbase backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Invitation token signing and verification
//! - Password hashing with Argon2id

pub mod invite_token;
pub mod password;
