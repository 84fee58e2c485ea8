//! Reconciliation of an imported backup with the live data set.
//!
//! Pure over in-memory collections: callers load state, merge, then decide
//! how to persist the outcome. The operation is additive end to end, so a
//! backup import can add and reconcile rows but can never delete a stored
//! client, visit record or user. Categories are the one exception: when
//! the backup carries a category table, that map replaces the stored one.

use std::collections::{HashMap, HashSet};

use crate::domain::cpf;
use crate::domain::models::{CategoriaMap, Cliente, Registro, Usuario};
use crate::io::decode::DecodedBackup;

/// Live collections fed into a merge.
#[derive(Debug, Clone, Default)]
pub struct SystemData {
    pub clientes: Vec<Cliente>,
    pub registros: Vec<Registro>,
    pub usuarios: Vec<Usuario>,
}

/// Counters reported to the user after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub clientes_novos: usize,
    pub clientes_mesclados: usize,
    pub bicicletas_adicionadas: usize,
    pub registros_novos: usize,
    pub usuarios_novos: usize,
    pub categorias_importadas: usize,
}

/// Result of merging an imported backup into the live set.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub clientes: Vec<Cliente>,
    pub registros: Vec<Registro>,
    pub usuarios: Vec<Usuario>,
    /// Some when the import carried a category map, which wholesale
    /// replaces the stored one; None keeps it untouched.
    pub categorias: Option<CategoriaMap>,
    pub stats: MergeStats,
}

/// Merge an imported backup into the live collections.
///
/// Clients match by normalized CPF. A match appends only the bikes whose
/// ids the stored client does not have yet; no match appends the imported
/// client with its bike list deduplicated by id. The backup layout can
/// carry the same bike twice (embedded in the client row and again in the
/// standalone bike table), so dedup here is what keeps a re-import from
/// inflating bike lists. Visit records dedupe by id, users by username,
/// both keeping the stored row when a duplicate arrives.
pub fn merge_system_data(existing: SystemData, imported: DecodedBackup) -> MergeOutcome {
    let mut stats = MergeStats::default();
    let SystemData {
        mut clientes,
        mut registros,
        mut usuarios,
    } = existing;

    let mut index_por_cpf: HashMap<String, usize> = HashMap::new();
    for (idx, cliente) in clientes.iter().enumerate() {
        index_por_cpf.insert(cpf::digits_only(&cliente.cpf), idx);
    }

    for mut cliente in imported.clientes {
        let chave = cpf::digits_only(&cliente.cpf);
        match index_por_cpf.get(&chave) {
            Some(&idx) => {
                let existente = &mut clientes[idx];
                let mut bike_ids: HashSet<String> = existente
                    .bicicletas
                    .iter()
                    .map(|b| b.id.clone())
                    .collect();
                for bike in cliente.bicicletas {
                    if bike_ids.insert(bike.id.clone()) {
                        existente.bicicletas.push(bike);
                        stats.bicicletas_adicionadas += 1;
                    }
                }
                stats.clientes_mesclados += 1;
            }
            None => {
                let mut bike_ids: HashSet<String> = HashSet::new();
                cliente
                    .bicicletas
                    .retain(|bike| bike_ids.insert(bike.id.clone()));
                stats.clientes_novos += 1;
                stats.bicicletas_adicionadas += cliente.bicicletas.len();
                index_por_cpf.insert(chave, clientes.len());
                clientes.push(cliente);
            }
        }
    }

    let mut registro_ids: HashSet<String> = registros.iter().map(|r| r.id.clone()).collect();
    for registro in imported.registros {
        if registro_ids.insert(registro.id.clone()) {
            registros.push(registro);
            stats.registros_novos += 1;
        }
    }

    let mut usernames: HashSet<String> = usuarios.iter().map(|u| u.username.clone()).collect();
    for usuario in imported.usuarios {
        if usernames.insert(usuario.username.clone()) {
            usuarios.push(usuario);
            stats.usuarios_novos += 1;
        }
    }

    if let Some(categorias) = &imported.categorias {
        stats.categorias_importadas = categorias.len();
    }

    MergeOutcome {
        clientes,
        registros,
        usuarios,
        categorias: imported.categorias,
        stats,
    }
}
