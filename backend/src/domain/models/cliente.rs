//! backend/src/domain/models/cliente.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model representing a client of the parking facility.
/// The CPF is the identity key: merges and import deduplication compare
/// clients by their normalized CPF digits, never by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    pub id: String,
    /// Display name, stored upper-cased
    pub nome: String,
    /// Brazilian tax id, digits only (11 when valid)
    pub cpf: String,
    /// Contact phone, digits only, empty when unknown
    #[serde(default)]
    pub telefone: String,
    /// Category tag, empty when the client has none
    #[serde(default)]
    pub categoria: String,
    /// Free-form notes, kept verbatim across backup round trips
    #[serde(default)]
    pub comentarios: Vec<serde_json::Value>,
    /// Bikes registered under this client
    #[serde(default)]
    pub bicicletas: Vec<Bicicleta>,
}

impl Cliente {
    /// Generate a unique ID for a newly imported client
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// A bike owned by exactly one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bicicleta {
    pub id: String,
    #[serde(default)]
    pub marca: String,
    #[serde(default)]
    pub modelo: String,
    #[serde(default)]
    pub cor: String,
}
