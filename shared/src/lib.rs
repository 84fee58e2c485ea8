use serde::{Deserialize, Serialize};

/// Optional inclusive date window applied to exports.
///
/// Bounds are calendar dates in `YYYY-MM-DD` form. Either bound may be
/// omitted for a half-open window; both omitted means no filtering at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportPeriodo {
    /// First day included in the window
    pub data_inicio: Option<String>,
    /// Last day included in the window
    pub data_fim: Option<String>,
}

impl ExportPeriodo {
    pub fn new(data_inicio: Option<String>, data_fim: Option<String>) -> Self {
        Self {
            data_inicio,
            data_fim,
        }
    }

    /// Lower bound, treating blank form fields as absent
    pub fn inicio(&self) -> Option<&str> {
        self.data_inicio.as_deref().filter(|s| !s.is_empty())
    }

    /// Upper bound, treating blank form fields as absent
    pub fn fim(&self) -> Option<&str> {
        self.data_fim.as_deref().filter(|s| !s.is_empty())
    }

    /// True when at least one bound is set
    pub fn ativo(&self) -> bool {
        self.inicio().is_some() || self.fim().is_some()
    }

    /// Tag appended to export file names: `inicio_fim` when the window is
    /// complete, today's date otherwise.
    pub fn file_tag(&self) -> String {
        match (self.inicio(), self.fim()) {
            (Some(inicio), Some(fim)) => format!("{}_{}", inicio, fim),
            _ => chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Human-readable suffix for export messages, empty when no window is
    /// set: ` (período: 2024-01-01 até 2024-01-31)`.
    pub fn descricao(&self) -> String {
        if self.ativo() {
            format!(
                " (período: {} até {})",
                self.inicio().unwrap_or("início"),
                self.fim().unwrap_or("hoje")
            )
        } else {
            String::new()
        }
    }
}

/// Result of importing a plain client list (CSV or spreadsheet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportacaoClientesResponse {
    /// Clients actually added (valid, non-duplicate rows)
    pub importados: usize,
    /// User-facing outcome message
    pub message: String,
}

/// Result of writing an export file.
///
/// `success` is false for the reportable empty outcome (nothing matched the
/// requested window), in which case no file was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportacaoResponse {
    pub success: bool,
    pub message: String,
    /// File name the export was written under, empty when `success` is false
    pub file_name: String,
    /// Absolute path of the written file, empty when `success` is false
    pub file_path: String,
    /// Data rows written, excluding headers
    pub total_linhas: usize,
}

/// Result of merging an imported backup into the live store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupImportResponse {
    /// Clients added because no stored client shared their CPF
    pub clientes_novos: usize,
    /// Clients that matched a stored client by CPF
    pub clientes_mesclados: usize,
    /// Bikes appended across new and merged clients
    pub bicicletas_adicionadas: usize,
    /// Visit records appended (unseen ids)
    pub registros_novos: usize,
    /// Users appended (unseen usernames)
    pub usuarios_novos: usize,
    /// Size of the imported category map, 0 when the backup carried none
    pub categorias_importadas: usize,
    pub success_message: String,
}

/// Capability flags the data-management screen uses to enable its buttons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermissoesDados {
    pub pode_importar: bool,
    pub pode_exportar: bool,
}
