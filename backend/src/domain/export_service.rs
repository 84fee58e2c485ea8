//! Client-list export domain logic.
//!
//! Composes the flat client table (Nome, Telefone, CPF, Categoria) and
//! writes it to disk as CSV or as a spreadsheet. An optional date window
//! keeps only clients with at least one visit inside it.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::{ExportPeriodo, ExportacaoResponse};

use crate::auth::AuthGate;
use crate::io::{csv, encode, sheet, Table};
use crate::storage::traits::{ClienteStorage, RegistroStorage};

/// Export service for the flat client table.
pub struct ExportService {
    clientes: Arc<dyn ClienteStorage>,
    registros: Arc<dyn RegistroStorage>,
    auth: Arc<dyn AuthGate>,
}

impl ExportService {
    pub fn new(
        clientes: Arc<dyn ClienteStorage>,
        registros: Arc<dyn RegistroStorage>,
        auth: Arc<dyn AuthGate>,
    ) -> Self {
        Self {
            clientes,
            registros,
            auth,
        }
    }

    /// Export the client table as a CSV file under `output_dir`.
    pub fn export_clientes_csv(
        &self,
        periodo: &ExportPeriodo,
        output_dir: &Path,
    ) -> Result<ExportacaoResponse> {
        self.auth.require_permission("configuracao", "exportar")?;
        info!("📄 EXPORT: Exporting client list as CSV{}", periodo.descricao());

        let table = self.compose(periodo)?;
        if table.len() <= 1 {
            warn!("⚠️ EXPORT: No clients to export");
            return Ok(empty_response(periodo));
        }

        let content = csv::table_to_csv(&table)?;
        let file_name = format!("clientes_{}.csv", periodo.file_tag());
        let file_path = write_file(output_dir, &file_name, content.as_bytes())?;

        Ok(success_response(table.len() - 1, file_name, file_path))
    }

    /// Export the client table as a single-sheet spreadsheet under `output_dir`.
    pub fn export_clientes_xlsx(
        &self,
        periodo: &ExportPeriodo,
        output_dir: &Path,
    ) -> Result<ExportacaoResponse> {
        self.auth.require_permission("configuracao", "exportar")?;
        info!("📄 EXPORT: Exporting client list as XLSX{}", periodo.descricao());

        let table = self.compose(periodo)?;
        if table.len() <= 1 {
            warn!("⚠️ EXPORT: No clients to export");
            return Ok(empty_response(periodo));
        }

        let bytes = sheet::write_single_sheet("Clientes", &table)?;
        let file_name = format!("clientes_{}.xlsx", periodo.file_tag());
        let file_path = write_file(output_dir, &file_name, &bytes)?;

        Ok(success_response(table.len() - 1, file_name, file_path))
    }

    fn compose(&self, periodo: &ExportPeriodo) -> Result<Table> {
        let clientes = self.clientes.load_clientes()?;
        let registros = self.registros.load_registros()?;
        Ok(encode::compose_clientes_table(
            &clientes,
            &registros,
            periodo.inicio(),
            periodo.fim(),
        ))
    }
}

fn success_response(total: usize, file_name: String, file_path: PathBuf) -> ExportacaoResponse {
    info!("✅ EXPORT: {} client(s) written to {}", total, file_path.display());
    ExportacaoResponse {
        success: true,
        message: format!("Exportação concluída! {} cliente(s) exportado(s).", total),
        file_name,
        file_path: file_path.display().to_string(),
        total_linhas: total,
    }
}

fn empty_response(periodo: &ExportPeriodo) -> ExportacaoResponse {
    let onde = if periodo.ativo() {
        " no período selecionado"
    } else {
        ""
    };
    ExportacaoResponse {
        success: false,
        message: format!("Nenhum cliente encontrado{} para exportar.", onde),
        file_name: String::new(),
        file_path: String::new(),
        total_linhas: 0,
    }
}

/// Write `bytes` to `output_dir/file_name`, creating the directory if needed.
pub(crate) fn write_file(output_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Erro ao criar diretório {}", output_dir.display()))?;
    let path = output_dir.join(file_name);
    fs::write(&path, bytes)
        .with_context(|| format!("Erro ao salvar arquivo {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::storage::json::test_utils::{
        cliente_exemplo, registro_exemplo, usuario_admin, TestEnvironment,
    };
    use chrono::{Local, TimeZone};

    fn auth_autorizado() -> Arc<SessionAuth> {
        let auth = SessionAuth::new();
        auth.login(usuario_admin());
        Arc::new(auth)
    }

    fn service(env: &TestEnvironment, auth: Arc<SessionAuth>) -> ExportService {
        ExportService::new(env.store.clone(), env.store.clone(), auth)
    }

    fn local_ts(y: i32, m: u32, d: u32, h: u32) -> String {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().to_rfc3339()
    }

    fn seed(env: &TestEnvironment) {
        env.store
            .save_clientes(&[
                cliente_exemplo("c1", "JOAO", "52998224725"),
                cliente_exemplo("c2", "MARIA", "11144477735"),
            ])
            .unwrap();
        env.store
            .save_registros(&[
                registro_exemplo("r1", "c1", &local_ts(2024, 3, 10, 9)),
                registro_exemplo("r2", "c2", &local_ts(2024, 5, 20, 9)),
            ])
            .unwrap();
    }

    #[test]
    fn test_csv_export_writes_dated_file() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        let periodo = ExportPeriodo::new(Some("2024-01-01".into()), Some("2024-12-31".into()));
        let response = service.export_clientes_csv(&periodo, &out).unwrap();

        assert!(response.success);
        assert_eq!(response.file_name, "clientes_2024-01-01_2024-12-31.csv");
        assert_eq!(response.total_linhas, 2);
        assert_eq!(response.message, "Exportação concluída! 2 cliente(s) exportado(s).");

        let content = fs::read_to_string(out.join(&response.file_name)).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Nome\",\"Telefone\",\"CPF\",\"Categoria\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"JOAO\",\"11999999999\",\"52998224725\",\"\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"MARIA\",\"11999999999\",\"11144477735\",\"\""
        );
    }

    #[test]
    fn test_window_filters_clients_by_visit_date() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        let periodo = ExportPeriodo::new(Some("2024-03-01".into()), Some("2024-03-31".into()));
        let response = service.export_clientes_csv(&periodo, &out).unwrap();

        assert_eq!(response.total_linhas, 1);
        let content = fs::read_to_string(out.join(&response.file_name)).unwrap();
        assert!(content.contains("JOAO"));
        assert!(!content.contains("MARIA"));
    }

    #[test]
    fn test_window_without_matches_reports_empty() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        let periodo = ExportPeriodo::new(Some("2030-01-01".into()), Some("2030-12-31".into()));
        let response = service.export_clientes_csv(&periodo, &out).unwrap();

        assert!(!response.success);
        assert_eq!(
            response.message,
            "Nenhum cliente encontrado no período selecionado para exportar."
        );
        assert!(!out.exists());
    }

    #[test]
    fn test_inverted_window_yields_empty_outcome() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        // Start after end matches nothing; still a result, not an error
        let periodo = ExportPeriodo::new(Some("2024-12-31".into()), Some("2024-01-01".into()));
        let response = service.export_clientes_csv(&periodo, &out).unwrap();

        assert!(!response.success);
        assert_eq!(response.total_linhas, 0);
        assert!(!out.exists());
    }

    #[test]
    fn test_empty_store_reports_empty_without_period_clause() {
        let env = TestEnvironment::new().unwrap();
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        let response = service
            .export_clientes_csv(&ExportPeriodo::new(None, None), &out)
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.message, "Nenhum cliente encontrado para exportar.");
    }

    #[test]
    fn test_xlsx_export_round_trips() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, auth_autorizado());
        let out = env.base_path.join("saida");

        let periodo = ExportPeriodo::new(None, None);
        let response = service.export_clientes_xlsx(&periodo, &out).unwrap();
        assert!(response.success);
        assert!(response.file_name.starts_with("clientes_"));
        assert!(response.file_name.ends_with(".xlsx"));

        let bytes = fs::read(out.join(&response.file_name)).unwrap();
        let rows = sheet::read_first_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Nome", "Telefone", "CPF", "Categoria"]);
        // Trailing empty cells drop on read, so the empty categoria is gone
        assert_eq!(rows[1], vec!["JOAO", "11999999999", "52998224725"]);
    }

    #[test]
    fn test_export_requires_permission() {
        let env = TestEnvironment::new().unwrap();
        seed(&env);
        let service = service(&env, Arc::new(SessionAuth::new()));
        let out = env.base_path.join("saida");

        let err = service
            .export_clientes_csv(&ExportPeriodo::new(None, None), &out)
            .unwrap_err();
        assert!(err.to_string().contains("permissão"));
        assert!(!out.exists());
    }
}
