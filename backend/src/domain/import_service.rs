//! Client-list import domain logic.
//!
//! Takes a CSV or spreadsheet of clients (Nome, Telefone, CPF, Categoria),
//! validates each row and appends the survivors to the stored client
//! collection. Row rejection is silent by design: a list mixing good and
//! bad rows imports the good ones and reports how many made it.

use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use shared::ImportacaoClientesResponse;

use crate::auth::AuthGate;
use crate::domain::cpf;
use crate::domain::models::{Cliente, DEFAULT_CATEGORIA_EMOJI};
use crate::io::{csv, sheet, FileKind, Table};
use crate::storage::traits::{CategoriaStorage, ClienteStorage};

/// Import service for the plain client list.
pub struct ImportService {
    clientes: Arc<dyn ClienteStorage>,
    categorias: Arc<dyn CategoriaStorage>,
    auth: Arc<dyn AuthGate>,
}

impl ImportService {
    pub fn new(
        clientes: Arc<dyn ClienteStorage>,
        categorias: Arc<dyn CategoriaStorage>,
        auth: Arc<dyn AuthGate>,
    ) -> Self {
        Self {
            clientes,
            categorias,
            auth,
        }
    }

    /// Import a client list from a file, appending valid new clients.
    ///
    /// CSV goes through the line-naive reader; anything else is read as a
    /// spreadsheet, first sheet only. Zero imported clients is a normal
    /// outcome and nothing is written in that case.
    pub fn import_clientes(&self, path: &Path) -> Result<ImportacaoClientesResponse> {
        self.auth.require_permission("configuracao", "importar")?;
        info!("📥 IMPORT: Importing client list from {}", path.display());

        let rows = match FileKind::from_path(path) {
            FileKind::Csv => {
                let text = fs::read_to_string(path).context("Erro ao ler arquivo")?;
                csv::simple_rows(&text)
            }
            FileKind::Xlsx => {
                let bytes = fs::read(path).context("Erro ao ler arquivo")?;
                sheet::read_first_sheet(&bytes)?
            }
        };

        let importados = self.process_rows(&rows)?;

        let message = if importados > 0 {
            info!("✅ IMPORT: {} client(s) imported", importados);
            format!("✓ {} cliente(s) importado(s) com sucesso!", importados)
        } else {
            warn!("⚠️ IMPORT: No valid client rows in {}", path.display());
            "Nenhum cliente válido encontrado no arquivo.".to_string()
        };

        Ok(ImportacaoClientesResponse {
            importados,
            message,
        })
    }

    fn process_rows(&self, rows: &Table) -> Result<usize> {
        let mut clientes = self.clientes.load_clientes()?;
        let mut categorias = self.categorias.load_categorias()?;
        let mut cpfs: HashSet<String> = clientes
            .iter()
            .map(|c| cpf::digits_only(&c.cpf))
            .collect();

        let mut importados = 0;
        let mut categorias_novas = false;

        for (idx, row) in rows.iter().enumerate() {
            if idx == 0 && is_header(row) {
                continue;
            }
            if row.len() < 3 || row[0].is_empty() || row[2].is_empty() {
                continue;
            }

            let nome = row[0].trim().to_uppercase();
            let telefone = cpf::digits_only(row.get(1).map(String::as_str).unwrap_or(""));
            let documento = cpf::digits_only(&row[2]);

            // Categories register even when the row is later rejected
            let mut categoria = String::new();
            if let Some(bruta) = row.get(3) {
                let nome_categoria = bruta.trim().to_uppercase();
                if !nome_categoria.is_empty() {
                    if !categorias.contains_key(&nome_categoria) {
                        categorias
                            .insert(nome_categoria.clone(), DEFAULT_CATEGORIA_EMOJI.to_string());
                        categorias_novas = true;
                        info!("🏷️ IMPORT: Category '{}' auto-registered", nome_categoria);
                    }
                    categoria = nome_categoria;
                }
            }

            if nome.is_empty() || !cpf::validate_cpf(&documento) {
                continue;
            }
            // Covers both stored clients and earlier rows of this file
            if !cpfs.insert(documento.clone()) {
                continue;
            }

            clientes.push(Cliente {
                id: Cliente::generate_id(),
                nome,
                cpf: documento,
                telefone,
                categoria,
                comentarios: Vec::new(),
                bicicletas: Vec::new(),
            });
            importados += 1;
        }

        if categorias_novas {
            self.categorias.save_categorias(&categorias)?;
        }
        if importados > 0 {
            self.clientes.save_clientes(&clientes)?;
        }
        Ok(importados)
    }
}

/// A first row naming the columns, in either language the lists arrive in.
fn is_header(row: &[String]) -> bool {
    row.first()
        .map(|cell| {
            let lower = cell.to_lowercase();
            lower.contains("nome") || lower.contains("name")
        })
        .unwrap_or(false)
}
