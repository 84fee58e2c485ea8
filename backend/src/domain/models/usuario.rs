//! Domain model for a system user.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Capability map: domain name to action name to granted flag.
/// Insertion order is preserved so re-exported backups keep their shape.
pub type Permissoes = IndexMap<String, IndexMap<String, bool>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: String,
    /// Login name, the identity key for user merges
    pub username: String,
    pub password: String,
    pub nome: String,
    /// Role label, e.g. "admin" or "operador"
    pub tipo: String,
    pub ativo: bool,
    #[serde(default)]
    pub permissoes: Permissoes,
}

impl Usuario {
    /// True when this user holds the given capability.
    pub fn pode(&self, dominio: &str, acao: &str) -> bool {
        self.permissoes
            .get(dominio)
            .and_then(|acoes| acoes.get(acao))
            .copied()
            .unwrap_or(false)
    }
}
