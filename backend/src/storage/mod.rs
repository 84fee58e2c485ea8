//! # Storage Module
//!
//! Persistence abstractions and the JSON file implementation.
//!
//! The domain services only know the traits in [`traits`]; the store shipped
//! here keeps each collection in one JSON file under a data directory, with
//! atomic single-file writes and an all-or-nothing multi-collection commit
//! for backup imports.

pub mod json;
pub mod traits;

pub use traits::{
    BackupStorage, CategoriaStorage, ClienteStorage, RegistroStorage, SystemSnapshot,
    UsuarioStorage,
};
