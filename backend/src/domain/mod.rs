//! # Domain Module
//!
//! Contains all business logic for the data engine.
//!
//! This module encapsulates the core rules for moving clients, visit
//! records, users and categories between the store and interchange files.
//! It operates independently of any specific UI framework or storage
//! mechanism.
//!
//! ## Module Organization
//!
//! - **models**: the four entity types and the category map
//! - **cpf**: check-digit validation for the client identity key
//! - **merge**: reconciliation of an imported backup with the live store
//! - **import_service**: plain client-list import flow
//! - **export_service**: plain client-list export flow
//! - **backup_service**: full system backup export and merge-import flows
//!
//! ## Key Responsibilities
//!
//! - **Identity**: clients are keyed by normalized CPF everywhere a merge
//!   or deduplication decision is made
//! - **Additive Merges**: backup imports append and reconcile, they never
//!   delete stored rows
//! - **Reportable Outcomes**: empty exports and empty imports are results,
//!   not errors

pub mod backup_service;
pub mod cpf;
pub mod error;
pub mod export_service;
pub mod import_service;
pub mod merge;
pub mod models;

pub use backup_service::*;
pub use error::*;
pub use export_service::*;
pub use import_service::*;
pub use merge::*;
