//! User-facing error taxonomy for the import/export flows.
//!
//! Most failures travel as `anyhow` errors with context; this enum covers
//! the cases callers need to tell apart to react (blocking a button, showing
//! the right banner). Messages are in the application's language because
//! they are shown verbatim.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DadosError {
    /// The session user lacks the named capability.
    #[error("Você não tem permissão para {acao} em {dominio}")]
    PermissaoNegada { dominio: String, acao: String },

    /// The file was readable but its shape is not an accepted backup.
    #[error("{0}")]
    ArquivoInvalido(String),
}
