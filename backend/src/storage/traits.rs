//! # Storage Traits
//!
//! This module defines the storage abstraction traits that let the domain
//! services run against different persistence backends without change.
//!
//! All collections have total-overwrite semantics: a save replaces the
//! stored collection with the one passed in. Loading a collection that was
//! never saved yields its empty value, not an error.

use anyhow::Result;

use crate::domain::models::{CategoriaMap, Cliente, Registro, Usuario};

/// Full resolved system state, persisted by an all-or-nothing commit.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub clientes: Vec<Cliente>,
    pub registros: Vec<Registro>,
    pub usuarios: Vec<Usuario>,
    pub categorias: CategoriaMap,
}

/// Client collection persistence
pub trait ClienteStorage: Send + Sync {
    /// Load every stored client
    fn load_clientes(&self) -> Result<Vec<Cliente>>;

    /// Replace the stored client collection
    fn save_clientes(&self, clientes: &[Cliente]) -> Result<()>;
}

/// Visit record collection persistence
pub trait RegistroStorage: Send + Sync {
    /// Load every stored visit record
    fn load_registros(&self) -> Result<Vec<Registro>>;

    /// Replace the stored visit record collection
    fn save_registros(&self, registros: &[Registro]) -> Result<()>;
}

/// User collection persistence
pub trait UsuarioStorage: Send + Sync {
    /// Load every stored user
    fn load_usuarios(&self) -> Result<Vec<Usuario>>;

    /// Replace the stored user collection
    fn save_usuarios(&self, usuarios: &[Usuario]) -> Result<()>;
}

/// Category map persistence
pub trait CategoriaStorage: Send + Sync {
    /// Load the stored category map
    fn load_categorias(&self) -> Result<CategoriaMap>;

    /// Replace the stored category map
    fn save_categorias(&self, categorias: &CategoriaMap) -> Result<()>;
}

/// Everything the backup flows need, plus the snapshot commit.
pub trait BackupStorage:
    ClienteStorage + RegistroStorage + UsuarioStorage + CategoriaStorage
{
    /// Persist all four collections together. Either every collection is
    /// replaced or, when staging fails, none is touched.
    fn commit_snapshot(&self, snapshot: &SystemSnapshot) -> Result<()>;
}
