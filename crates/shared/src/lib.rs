//! Shared utilities and common types for the Toogether backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id and password policy checks
//! - JWT issuance and validation for the access/refresh token pair
//! - Hashing and short identifier generation
//! - Common validation logic
//! - Cursor pagination

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
