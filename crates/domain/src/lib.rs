//! Domain layer for the Toogether backend.
//!
//! This crate contains:
//! - Domain models (Profile, Photo, Group, Like)
//! - The error taxonomy surfaced to callers
//! - Repository and blob-storage ports, plus in-memory implementations
//! - Services that apply the data-model invariants on top of the ports

pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;

pub use errors::{DomainError, DomainResult};
