//! CSV reading and writing.
//!
//! Two different readers live here on purpose. The plain client-list import
//! splits on newlines and commas and then undoes one layer of quoting per
//! cell, which means quoted separators are not supported on that path. The
//! backup import is the opposite: section bodies go through a real CSV
//! parser, so quoted commas, doubled quotes and embedded newlines all
//! survive.
//!
//! Backup container grammar: each section starts with a `=== Name ===`
//! line, rows follow, and a blank line separates sections. The split runs
//! on the raw text before any CSV parsing, so a quoted field containing
//! the separator sequence would still end a section early.

use anyhow::{anyhow, Context, Result};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use log::warn;

use super::{BackupTables, Section, SystemTables, Table};
use crate::domain::error::DadosError;

/// Undo one layer of CSV quoting from a single cell: trim, strip one
/// surrounding quote pair, collapse doubled quotes.
pub fn sanitize_cell(cell: &str) -> String {
    let mut sanitized = cell.trim();
    if sanitized.len() >= 2 && sanitized.starts_with('"') && sanitized.ends_with('"') {
        sanitized = &sanitized[1..sanitized.len() - 1];
    }
    sanitized.replace("\"\"", "\"")
}

/// Split plain client-list CSV text into rows of sanitized cells.
/// Line-naive: rows on newlines, cells on commas, no quote awareness.
pub fn simple_rows(text: &str) -> Table {
    text.split('\n')
        .map(|line| line.split(',').map(sanitize_cell).collect())
        .collect()
}

/// One named section of a backup CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSection {
    pub name: String,
    pub rows: Table,
}

/// Split a backup CSV into its named sections.
pub fn parse_sections(text: &str) -> Result<Vec<CsvSection>> {
    let mut sections = Vec::new();

    for chunk in text.split("\n\n=== ") {
        let (header, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        let name = header
            .trim()
            .trim_start_matches("=== ")
            .trim_end_matches("===")
            .trim()
            .to_string();
        let rows = parse_section_body(body)
            .with_context(|| format!("Erro ao ler a seção '{}'", name))?;

        if name.is_empty() && rows.is_empty() {
            continue;
        }
        sections.push(CsvSection { name, rows });
    }

    Ok(sections)
}

fn parse_section_body(body: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Parse a backup CSV into the five known tables.
///
/// Unknown section names are dropped. A backup without client rows is
/// rejected, matching the spreadsheet reader's mandatory-sheet rule.
pub fn parse_backup(text: &str) -> Result<BackupTables> {
    let mut tables = BackupTables::default();

    for section in parse_sections(text)? {
        match Section::from_name(&section.name) {
            Some(Section::Clientes) => tables.clientes = section.rows,
            Some(Section::Bicicletas) => tables.bicicletas = section.rows,
            Some(Section::Categorias) => tables.categorias = Some(section.rows),
            Some(Section::Registros) => tables.registros = section.rows,
            Some(Section::Usuarios) => tables.usuarios = section.rows,
            None => warn!("Unknown backup section '{}' ignored", section.name),
        }
    }

    if tables.clientes.is_empty() {
        return Err(DadosError::ArquivoInvalido(
            "Arquivo CSV inválido. Certifique-se de que contém dados de Clientes".to_string(),
        )
        .into());
    }
    Ok(tables)
}

/// Serialize one table as quote-always CSV, every row newline-terminated.
pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    for row in table {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Erro ao gravar CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV gerado não é UTF-8")
}

/// Write a full backup in the sectioned container format. Tables with no
/// data rows are omitted, mirroring the sheet writer.
pub fn write_backup(tables: &SystemTables) -> Result<String> {
    let mut out = String::new();

    for section in Section::ALL {
        let table = tables.get(section);
        if table.len() <= 1 {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("=== ");
        out.push_str(section.name());
        out.push_str(" ===\n");
        out.push_str(&table_to_csv(table)?);
    }

    Ok(out)
}
