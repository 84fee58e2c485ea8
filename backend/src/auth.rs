//! # Auth Gate
//!
//! Permission checks for the data engine. Every import and export operation
//! is guarded by a capability expressed as a domain/action pair, e.g.
//! (`configuracao`, `importar`).
//!
//! The engine only consumes the [`AuthGate`] trait; [`SessionAuth`] is the
//! default implementation backed by whichever user is logged into the
//! current session.

use std::sync::RwLock;

use crate::domain::error::DadosError;
use crate::domain::models::Usuario;

/// Permission gate consulted before any import/export operation.
pub trait AuthGate: Send + Sync {
    /// True when the current session may perform `acao` on `dominio`.
    fn has_permission(&self, dominio: &str, acao: &str) -> bool;

    /// Guard form of [`AuthGate::has_permission`]: errors when the
    /// capability is missing.
    fn require_permission(&self, dominio: &str, acao: &str) -> Result<(), DadosError> {
        if self.has_permission(dominio, acao) {
            Ok(())
        } else {
            Err(DadosError::PermissaoNegada {
                dominio: dominio.to_string(),
                acao: acao.to_string(),
            })
        }
    }
}

/// Gate backed by the user logged into this session.
///
/// No user means no capabilities; inactive users keep none of theirs.
#[derive(Default)]
pub struct SessionAuth {
    usuario: RwLock<Option<Usuario>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for the given user.
    pub fn login(&self, usuario: Usuario) {
        let mut atual = self
            .usuario
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *atual = Some(usuario);
    }

    /// End the current session, if any.
    pub fn logout(&self) {
        let mut atual = self
            .usuario
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *atual = None;
    }
}

impl AuthGate for SessionAuth {
    fn has_permission(&self, dominio: &str, acao: &str) -> bool {
        let usuario = self
            .usuario
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match usuario.as_ref() {
            Some(usuario) => usuario.ativo && usuario.pode(dominio, acao),
            None => false,
        }
    }
}
