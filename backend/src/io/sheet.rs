//! XLSX workbook reading and writing.
//!
//! Cells are stringified on the way in (numeric phone or document columns
//! come back as digit strings) and written as strings on the way out, so
//! identity columns with leading zeros survive a round trip. Trailing empty
//! cells are dropped per row, which keeps the column-count rules identical
//! between the spreadsheet and CSV paths.

use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};

use super::{BackupTables, Section, SystemTables, Table};
use crate::domain::error::DadosError;

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn range_to_rows(range: &Range<Data>) -> Table {
    let (height, width) = range.get_size();
    let mut rows = Vec::with_capacity(height);

    for r in 0..height {
        let mut row: Vec<String> = Vec::with_capacity(width);
        for c in 0..width {
            row.push(range.get((r, c)).map(cell_to_string).unwrap_or_default());
        }
        // Ragged rows: the used range spans the widest row of the sheet,
        // but shape detection must see each row's own width
        while row.last().map(|cell| cell.is_empty()).unwrap_or(false) {
            row.pop();
        }
        rows.push(row);
    }
    rows
}

fn open_workbook(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>> {
    open_workbook_from_rs(Cursor::new(bytes)).map_err(|e| anyhow!("Erro ao ler arquivo: {}", e))
}

/// Read the first worksheet of a workbook into rows.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook(bytes)?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("Erro ao ler arquivo: planilha sem abas"))?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| anyhow!("Erro ao ler a aba '{}': {}", name, e))?;
    Ok(range_to_rows(&range))
}

/// Read a backup workbook. The Clientes and Registros sheets are mandatory;
/// the other three default to empty when absent.
pub fn read_backup(bytes: &[u8]) -> Result<BackupTables> {
    let mut workbook = open_workbook(bytes)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let present = |section: Section| names.iter().any(|n| n == section.name());

    if !present(Section::Clientes) || !present(Section::Registros) {
        return Err(DadosError::ArquivoInvalido(
            "Arquivo inválido. Certifique-se de que contém ao menos as abas: Clientes e Registros"
                .to_string(),
        )
        .into());
    }

    let mut read = |section: Section| -> Result<Table> {
        if !names.iter().any(|n| n == section.name()) {
            return Ok(Table::new());
        }
        let range = workbook
            .worksheet_range(section.name())
            .map_err(|e| anyhow!("Erro ao ler a aba '{}': {}", section.name(), e))?;
        Ok(range_to_rows(&range))
    };

    Ok(BackupTables {
        clientes: read(Section::Clientes)?,
        bicicletas: read(Section::Bicicletas)?,
        categorias: if present(Section::Categorias) {
            Some(read(Section::Categorias)?)
        } else {
            None
        },
        registros: read(Section::Registros)?,
        usuarios: read(Section::Usuarios)?,
    })
}

fn write_rows(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (r, row) in table.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, cell.as_str())?;
        }
    }
    Ok(())
}

/// Write a single-sheet workbook (the plain client-list export).
pub fn write_single_sheet(name: &str, table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    write_rows(sheet, table)?;
    workbook
        .save_to_buffer()
        .context("Erro ao gerar a planilha")
}

/// Write a backup workbook, one named sheet per table with data rows.
///
/// Callers guard against the all-empty case; a workbook needs at least one
/// sheet to be saved.
pub fn write_backup(tables: &SystemTables) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for section in Section::ALL {
        let table = tables.get(section);
        if table.len() <= 1 {
            continue;
        }
        let sheet = workbook.add_worksheet();
        sheet.set_name(section.name())?;
        write_rows(sheet, table)?;
    }

    workbook
        .save_to_buffer()
        .context("Erro ao gerar a planilha")
}
