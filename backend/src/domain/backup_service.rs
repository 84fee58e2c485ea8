//! Full-system backup domain logic.
//!
//! Exports every collection into one multi-section CSV or multi-sheet
//! spreadsheet, and imports such a file back by merging it into the live
//! data. Import is additive: stored clients, visit records and users are
//! never deleted or overwritten, only extended. The category map is the
//! exception, a backup carrying one replaces the stored map wholesale.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use shared::{BackupImportResponse, ExportPeriodo, ExportacaoResponse};

use crate::auth::AuthGate;
use crate::domain::export_service::write_file;
use crate::domain::merge::{merge_system_data, SystemData};
use crate::io::{csv, decode, encode, sheet, FileKind, SystemTables};
use crate::storage::traits::{BackupStorage, SystemSnapshot};

/// Backup service covering the five entity tables.
pub struct BackupService {
    store: Arc<dyn BackupStorage>,
    auth: Arc<dyn AuthGate>,
}

impl BackupService {
    pub fn new(store: Arc<dyn BackupStorage>, auth: Arc<dyn AuthGate>) -> Self {
        Self { store, auth }
    }

    /// Export the whole system as a multi-section CSV under `output_dir`.
    pub fn export_backup_csv(
        &self,
        periodo: &ExportPeriodo,
        output_dir: &Path,
    ) -> Result<ExportacaoResponse> {
        self.auth.require_permission("configuracao", "exportar")?;
        info!("📦 EXPORT: Exporting system backup as CSV{}", periodo.descricao());

        let tables = self.compose(periodo)?;
        if tables.is_empty() {
            warn!("⚠️ EXPORT: Nothing to back up");
            return Ok(empty_backup_response());
        }

        let content = csv::write_backup(&tables)?;
        let file_name = format!("backup_sistema_{}.csv", periodo.file_tag());
        let file_path = write_file(output_dir, &file_name, content.as_bytes())?;

        Ok(backup_response(periodo, &tables, file_name, file_path))
    }

    /// Export the whole system as a multi-sheet spreadsheet under `output_dir`.
    pub fn export_backup_xlsx(
        &self,
        periodo: &ExportPeriodo,
        output_dir: &Path,
    ) -> Result<ExportacaoResponse> {
        self.auth.require_permission("configuracao", "exportar")?;
        info!("📦 EXPORT: Exporting system backup as XLSX{}", periodo.descricao());

        let tables = self.compose(periodo)?;
        if tables.is_empty() {
            warn!("⚠️ EXPORT: Nothing to back up");
            return Ok(empty_backup_response());
        }

        let bytes = sheet::write_backup(&tables)?;
        let file_name = format!("backup_sistema_{}.xlsx", periodo.file_tag());
        let file_path = write_file(output_dir, &file_name, &bytes)?;

        Ok(backup_response(periodo, &tables, file_name, file_path))
    }

    /// Import a backup file, merging it into the stored collections.
    ///
    /// All four collections persist together: either the whole merged
    /// snapshot lands or the store keeps its previous state.
    pub fn import_backup(&self, path: &Path) -> Result<BackupImportResponse> {
        self.auth.require_permission("configuracao", "importar")?;
        info!("📦 IMPORT: Importing system backup from {}", path.display());

        let tables = match FileKind::from_path(path) {
            FileKind::Csv => {
                let text = fs::read_to_string(path).context("Erro ao ler arquivo")?;
                csv::parse_backup(&text)?
            }
            FileKind::Xlsx => {
                let bytes = fs::read(path).context("Erro ao ler arquivo")?;
                sheet::read_backup(&bytes)?
            }
        };
        let imported = decode::decode_backup(&tables);

        let existing = SystemData {
            clientes: self.store.load_clientes()?,
            registros: self.store.load_registros()?,
            usuarios: self.store.load_usuarios()?,
        };
        let outcome = merge_system_data(existing, imported);

        // A backup without a category table keeps the stored map
        let categorias = match outcome.categorias {
            Some(categorias) => categorias,
            None => self.store.load_categorias()?,
        };
        self.store.commit_snapshot(&SystemSnapshot {
            clientes: outcome.clientes,
            registros: outcome.registros,
            usuarios: outcome.usuarios,
            categorias,
        })?;

        let stats = outcome.stats;
        let success_message = format!(
            "✅ Backup importado com sucesso! {} clientes novos, {} mesclados, {} bicicletas adicionadas, {} registros novos, {} usuários novos, {} categorias.",
            stats.clientes_novos,
            stats.clientes_mesclados,
            stats.bicicletas_adicionadas,
            stats.registros_novos,
            stats.usuarios_novos,
            stats.categorias_importadas,
        );
        info!(
            "✅ IMPORT: Backup merged, {} new clients, {} new records",
            stats.clientes_novos, stats.registros_novos
        );

        Ok(BackupImportResponse {
            clientes_novos: stats.clientes_novos,
            clientes_mesclados: stats.clientes_mesclados,
            bicicletas_adicionadas: stats.bicicletas_adicionadas,
            registros_novos: stats.registros_novos,
            usuarios_novos: stats.usuarios_novos,
            categorias_importadas: stats.categorias_importadas,
            success_message,
        })
    }

    fn compose(&self, periodo: &ExportPeriodo) -> Result<SystemTables> {
        let clientes = self.store.load_clientes()?;
        let registros = self.store.load_registros()?;
        let usuarios = self.store.load_usuarios()?;
        let categorias = self.store.load_categorias()?;
        Ok(encode::compose_system_tables(
            &clientes,
            &registros,
            &usuarios,
            &categorias,
            periodo.inicio(),
            periodo.fim(),
        ))
    }
}

fn backup_response(
    periodo: &ExportPeriodo,
    tables: &SystemTables,
    file_name: String,
    file_path: std::path::PathBuf,
) -> ExportacaoResponse {
    let total = tables.total_rows();
    info!("✅ EXPORT: Backup with {} rows written to {}", total, file_path.display());
    ExportacaoResponse {
        success: true,
        message: format!(
            "Backup exportado com sucesso{} para {}",
            periodo.descricao(),
            file_name
        ),
        file_name,
        file_path: file_path.display().to_string(),
        total_linhas: total,
    }
}

fn empty_backup_response() -> ExportacaoResponse {
    ExportacaoResponse {
        success: false,
        message: "Nenhum dado para exportar.".to_string(),
        file_name: String::new(),
        file_path: String::new(),
        total_linhas: 0,
    }
}
