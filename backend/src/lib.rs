//! # Bicicletário Data Engine
//!
//! Import, export and merge engine for a bike-parking management system.
//!
//! The engine moves four collections (clients, visit records, users and the
//! category map) between the persistent store and interchange files in two
//! formats: plain CSV and XLSX spreadsheets. It covers two flows:
//!
//! - **Client list**: a four-column table of clients, imported with CPF
//!   validation and deduplication, exported with an optional date window.
//! - **System backup**: all four collections in one multi-section file,
//!   imported through a CPF-keyed merge that never deletes stored data.
//!
//! ## Module Organization
//!
//! - **domain**: models, CPF validation, merge semantics and the services
//!   orchestrating the flows
//! - **io**: tabular codecs (CSV container grammar, spreadsheet reader and
//!   writer, row decoders and composers)
//! - **storage**: persistence traits and the JSON file store
//! - **auth**: the permission gate consulted before every operation

pub mod auth;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

use auth::AuthGate;
use domain::{BackupService, ExportService, ImportService};
use storage::json::{JsonConnection, JsonStore};

/// Main backend struct that wires the data services to a store and a
/// permission gate.
pub struct Backend {
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub backup_service: BackupService,
    auth: Arc<dyn AuthGate>,
}

impl Backend {
    /// Create a backend over a data directory.
    ///
    /// The directory is created when missing; collections start empty until
    /// the first save.
    pub fn new<P: AsRef<Path>>(data_dir: P, auth: Arc<dyn AuthGate>) -> Result<Self> {
        let connection = Arc::new(JsonConnection::new(data_dir)?);
        let store = Arc::new(JsonStore::new(connection));
        info!("🚀 Data engine initialized");

        Ok(Self {
            import_service: ImportService::new(store.clone(), store.clone(), auth.clone()),
            export_service: ExportService::new(store.clone(), store.clone(), auth.clone()),
            backup_service: BackupService::new(store, auth.clone()),
            auth,
        })
    }

    /// Capability flags for the data-management screen.
    pub fn permissoes_dados(&self) -> shared::PermissoesDados {
        shared::PermissoesDados {
            pode_importar: self.auth.has_permission("configuracao", "importar"),
            pode_exportar: self.auth.has_permission("configuracao", "exportar"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::storage::json::test_utils::usuario_admin;
    use tempfile::TempDir;

    #[test]
    fn test_backend_wires_services_over_one_directory() {
        let dir = TempDir::new().unwrap();
        let auth = Arc::new(SessionAuth::new());
        let backend = Backend::new(dir.path().join("dados"), auth.clone()).unwrap();

        let permissoes = backend.permissoes_dados();
        assert!(!permissoes.pode_importar);
        assert!(!permissoes.pode_exportar);

        auth.login(usuario_admin());
        let permissoes = backend.permissoes_dados();
        assert!(permissoes.pode_importar);
        assert!(permissoes.pode_exportar);
    }
}
