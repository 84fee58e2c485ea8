//! # IO Module
//!
//! Tabular codecs shared by the import and export flows.
//!
//! Both file formats reduce to the same currency: tables of string cells,
//! header row included. The CSV side handles the sectioned container
//! grammar and the quote-always writer; the sheet side maps tables onto
//! named worksheets. Decoders and composers translate between those tables
//! and domain entities.
//!
//! ## Module Organization
//!
//! - **csv**: cell sanitizer, section grammar, quote-always writer
//! - **sheet**: XLSX workbook reader and writer
//! - **decode**: raw backup tables to domain entities
//! - **encode**: domain entities to export tables

pub mod csv;
pub mod decode;
pub mod encode;
pub mod sheet;

use std::path::Path;

/// Rows of string cells, header row at index 0.
pub type Table = Vec<Vec<String>>;

/// The five entity tables a system backup may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Clientes,
    Bicicletas,
    Categorias,
    Registros,
    Usuarios,
}

impl Section {
    /// Export order, which is also the order sections appear in files.
    pub const ALL: [Section; 5] = [
        Section::Clientes,
        Section::Bicicletas,
        Section::Categorias,
        Section::Registros,
        Section::Usuarios,
    ];

    /// Section header / worksheet name.
    pub fn name(&self) -> &'static str {
        match self {
            Section::Clientes => "Clientes",
            Section::Bicicletas => "Bicicletas",
            Section::Categorias => "Categorias",
            Section::Registros => "Registros",
            Section::Usuarios => "Usuarios",
        }
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// The five tables composed for a backup export, header rows included.
#[derive(Debug, Clone, Default)]
pub struct SystemTables {
    pub clientes: Table,
    pub bicicletas: Table,
    pub categorias: Table,
    pub registros: Table,
    pub usuarios: Table,
}

impl SystemTables {
    pub fn get(&self, section: Section) -> &Table {
        match section {
            Section::Clientes => &self.clientes,
            Section::Bicicletas => &self.bicicletas,
            Section::Categorias => &self.categorias,
            Section::Registros => &self.registros,
            Section::Usuarios => &self.usuarios,
        }
    }

    /// True when every table is header-only or empty, i.e. there is nothing
    /// worth writing to a file.
    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.get(*s).len() <= 1)
    }

    /// Data rows across all tables, headers excluded.
    pub fn total_rows(&self) -> usize {
        Section::ALL
            .iter()
            .map(|s| self.get(*s).len().saturating_sub(1))
            .sum()
    }
}

/// Raw tables recovered from a backup file, before decoding.
///
/// `categorias` distinguishes an absent section from an empty one: absent
/// keeps the stored category map, present replaces it.
#[derive(Debug, Clone, Default)]
pub struct BackupTables {
    pub clientes: Table,
    pub bicicletas: Table,
    pub categorias: Option<Table>,
    pub registros: Table,
    pub usuarios: Table,
}

/// File kinds accepted by the importers, detected from the extension.
///
/// Anything that is not `.csv` is treated as a spreadsheet; if it is not
/// one, the workbook open fails and that error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    pub fn from_path(path: &Path) -> FileKind {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => FileKind::Csv,
            _ => FileKind::Xlsx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_name(section.name()), Some(section));
        }
        assert_eq!(Section::from_name("Desconhecida"), None);
    }

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(
            FileKind::from_path(&PathBuf::from("dados.csv")),
            FileKind::Csv
        );
        assert_eq!(
            FileKind::from_path(&PathBuf::from("DADOS.CSV")),
            FileKind::Csv
        );
        assert_eq!(
            FileKind::from_path(&PathBuf::from("backup.xlsx")),
            FileKind::Xlsx
        );
        assert_eq!(
            FileKind::from_path(&PathBuf::from("sem_extensao")),
            FileKind::Xlsx
        );
    }

    #[test]
    fn test_system_tables_counters() {
        let mut tables = SystemTables::default();
        assert!(tables.is_empty());
        assert_eq!(tables.total_rows(), 0);

        tables.clientes = vec![
            vec!["ID".to_string()],
            vec!["c1".to_string()],
            vec!["c2".to_string()],
        ];
        tables.usuarios = vec![vec!["ID".to_string()]];
        assert!(!tables.is_empty());
        assert_eq!(tables.total_rows(), 2);
    }
}
