//! # JSON Storage Module
//!
//! File-based store: each collection lives in its own JSON file under the
//! data directory.
//!
//! ## File Layout
//!
//! ```text
//! <data dir>/clientes.json
//! <data dir>/registros.json
//! <data dir>/usuarios.json
//! <data dir>/categorias.json
//! ```
//!
//! Writes are atomic per file (temp sibling + rename) and the backup import
//! path replaces all four files through a staged commit.

pub mod connection;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use store::JsonStore;
