//! Decoders from raw backup tables to domain entities.
//!
//! Every table arrives with its header row at index 0 and decoders skip it.
//! Row shapes are resolved through a minimum-width table per entity, widest
//! shape first, so adding a schema generation means adding an entry rather
//! than another length branch. Malformed embedded JSON never aborts an
//! import: the field decays to its empty value and the row survives.

use indexmap::IndexMap;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{BackupTables, Table};
use crate::domain::models::{Bicicleta, CategoriaMap, Cliente, Permissoes, Registro, Usuario};

/// Entities decoded from one backup file, before merging.
#[derive(Debug, Clone, Default)]
pub struct DecodedBackup {
    pub clientes: Vec<Cliente>,
    pub registros: Vec<Registro>,
    pub usuarios: Vec<Usuario>,
    /// None when the backup carried no category table at all
    pub categorias: Option<CategoriaMap>,
}

pub fn decode_backup(tables: &BackupTables) -> DecodedBackup {
    DecodedBackup {
        clientes: decode_clientes(&tables.clientes, &tables.bicicletas),
        registros: decode_registros(&tables.registros),
        usuarios: decode_usuarios(&tables.usuarios),
        categorias: tables.categorias.as_ref().map(decode_categorias),
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn opt_cell(row: &[String], idx: usize) -> Option<String> {
    let value = cell(row, idx);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn resolve_shape<S: Copy>(shapes: &[(usize, S)], len: usize) -> Option<S> {
    shapes.iter().find(|(min, _)| len >= *min).map(|(_, s)| *s)
}

#[derive(Debug, Clone, Copy)]
enum ClienteShape {
    /// ID, Nome, CPF, Telefone, Categoria, Comentários JSON, Bicicletas JSON
    Atual,
    /// ID, Nome, CPF, Telefone, Bicicletas JSON
    Antigo,
}

const CLIENTE_SHAPES: &[(usize, ClienteShape)] =
    &[(7, ClienteShape::Atual), (5, ClienteShape::Antigo)];

#[derive(Debug, Clone, Copy)]
enum RegistroShape {
    /// ID, Cliente, Bicicleta, Categoria, Entrada, Saída, Pernoite,
    /// Acesso Removido, Registro Original, Snapshot
    Atual,
    /// Same minus Categoria and Snapshot
    Antigo,
}

const REGISTRO_SHAPES: &[(usize, RegistroShape)] =
    &[(10, RegistroShape::Atual), (8, RegistroShape::Antigo)];

/// Decode the client table, then fold the standalone bike table into the
/// matching clients. Rows keyed by an id already seen replace that client
/// in place, so the last occurrence wins but the original position holds.
fn decode_clientes(clientes: &Table, bicicletas: &Table) -> Vec<Cliente> {
    let mut by_id: IndexMap<String, Cliente> = IndexMap::new();

    for (line, row) in clientes.iter().enumerate().skip(1) {
        let id = cell(row, 0);
        if id.is_empty() {
            continue;
        }

        let mut categoria = String::new();
        let mut comentarios: Vec<Value> = Vec::new();
        let mut bikes: Vec<Bicicleta> = Vec::new();

        match resolve_shape(CLIENTE_SHAPES, row.len()) {
            Some(ClienteShape::Atual) => {
                categoria = cell(row, 4).to_string();
                comentarios = lenient_json(cell(row, 5), "comentários", id);
                bikes = lenient_json(cell(row, 6), "bicicletas", id);
            }
            Some(ClienteShape::Antigo) => {
                bikes = lenient_json(cell(row, 4), "bicicletas", id);
            }
            None => {
                warn!(
                    "Unexpected client row shape at line {}: {} columns, imported without bikes",
                    line + 1,
                    row.len()
                );
            }
        }

        by_id.insert(
            id.to_string(),
            Cliente {
                id: id.to_string(),
                nome: cell(row, 1).to_string(),
                cpf: cell(row, 2).to_string(),
                telefone: cell(row, 3).to_string(),
                categoria,
                comentarios,
                bicicletas: bikes,
            },
        );
    }

    for row in bicicletas.iter().skip(1) {
        let bike_id = cell(row, 0);
        if bike_id.is_empty() {
            continue;
        }
        if let Some(cliente) = by_id.get_mut(cell(row, 1)) {
            cliente.bicicletas.push(Bicicleta {
                id: bike_id.to_string(),
                marca: cell(row, 2).to_string(),
                modelo: cell(row, 3).to_string(),
                cor: cell(row, 4).to_string(),
            });
        }
    }

    by_id.into_values().collect()
}

fn decode_registros(table: &Table) -> Vec<Registro> {
    let mut registros = Vec::new();

    for (line, row) in table.iter().enumerate().skip(1) {
        if cell(row, 0).is_empty() {
            continue;
        }
        match resolve_shape(REGISTRO_SHAPES, row.len()) {
            Some(RegistroShape::Atual) => registros.push(Registro {
                id: cell(row, 0).to_string(),
                cliente_id: cell(row, 1).to_string(),
                bicicleta_id: opt_cell(row, 2),
                categoria: cell(row, 3).to_string(),
                data_hora_entrada: cell(row, 4).to_string(),
                data_hora_saida: opt_cell(row, 5),
                pernoite: cell(row, 6) == "Sim",
                acesso_removido: cell(row, 7) == "Sim",
                registro_original_id: opt_cell(row, 8),
                bike_snapshot: parse_snapshot(cell(row, 9), cell(row, 0)),
            }),
            Some(RegistroShape::Antigo) => registros.push(Registro {
                id: cell(row, 0).to_string(),
                cliente_id: cell(row, 1).to_string(),
                bicicleta_id: opt_cell(row, 2),
                categoria: String::new(),
                data_hora_entrada: cell(row, 3).to_string(),
                data_hora_saida: opt_cell(row, 4),
                pernoite: cell(row, 5) == "Sim",
                acesso_removido: cell(row, 6) == "Sim",
                registro_original_id: opt_cell(row, 7),
                bike_snapshot: None,
            }),
            None => {
                error!(
                    "Unexpected visit record shape at line {}: {} columns, record dropped",
                    line + 1,
                    row.len()
                );
            }
        }
    }
    registros
}

fn decode_usuarios(table: &Table) -> Vec<Usuario> {
    let mut usuarios = Vec::new();

    for row in table.iter().skip(1) {
        if cell(row, 0).is_empty() {
            continue;
        }
        usuarios.push(Usuario {
            id: cell(row, 0).to_string(),
            username: cell(row, 1).to_string(),
            password: cell(row, 2).to_string(),
            nome: cell(row, 3).to_string(),
            tipo: cell(row, 4).to_string(),
            ativo: cell(row, 5) == "Sim",
            permissoes: parse_permissoes(cell(row, 6), cell(row, 1)),
        });
    }
    usuarios
}

fn decode_categorias(table: &Table) -> CategoriaMap {
    let mut categorias = CategoriaMap::new();

    for row in table.iter().skip(1) {
        let nome = cell(row, 0);
        if nome.is_empty() {
            continue;
        }
        categorias.insert(nome.to_string(), cell(row, 1).to_string());
    }
    categorias
}

/// Parse an embedded JSON array, decaying to empty on failure.
fn lenient_json<T: DeserializeOwned>(raw: &str, what: &str, cliente_id: &str) -> Vec<T> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                "Discarding malformed {} JSON on client {}: {}",
                what, cliente_id, e
            );
            Vec::new()
        }
    }
}

/// A snapshot is kept only when it parses to a non-empty JSON object.
/// `{}` is the encoding of "no snapshot", so it comes back as None.
fn parse_snapshot(raw: &str, registro_id: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(Value::Object(map)),
        Ok(_) => None,
        Err(e) => {
            warn!(
                "Discarding malformed bike snapshot on record {}: {}",
                registro_id, e
            );
            None
        }
    }
}

fn parse_permissoes(raw: &str, username: &str) -> Permissoes {
    if raw.trim().is_empty() {
        return Permissoes::new();
    }
    match serde_json::from_str::<Permissoes>(raw) {
        Ok(permissoes) => permissoes,
        Err(e) => {
            warn!(
                "Discarding malformed permissions JSON on user {}: {}",
                username, e
            );
            Permissoes::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn clientes_header() -> Vec<String> {
        row(&["ID", "Nome", "CPF", "Telefone", "Categoria", "Comentários", "Bicicletas"])
    }

    #[test]
    fn test_decode_cliente_current_shape() {
        let table = vec![
            clientes_header(),
            row(&[
                "c1",
                "JOAO",
                "52998224725",
                "11999999999",
                "mensalista",
                "[\"chega cedo\"]",
                "[{\"id\":\"b1\",\"marca\":\"Caloi\",\"modelo\":\"Elite\",\"cor\":\"azul\"}]",
            ]),
        ];
        let clientes = decode_clientes(&table, &Table::new());

        assert_eq!(clientes.len(), 1);
        let cliente = &clientes[0];
        assert_eq!(cliente.nome, "JOAO");
        assert_eq!(cliente.categoria, "mensalista");
        assert_eq!(cliente.comentarios, vec![Value::String("chega cedo".to_string())]);
        assert_eq!(cliente.bicicletas.len(), 1);
        assert_eq!(cliente.bicicletas[0].marca, "Caloi");
    }

    #[test]
    fn test_decode_cliente_legacy_shape_has_no_categoria() {
        let table = vec![
            row(&["ID", "Nome", "CPF", "Telefone", "Bicicletas"]),
            row(&["c1", "JOAO", "52998224725", "", "[{\"id\":\"b1\"}]"]),
        ];
        let clientes = decode_clientes(&table, &Table::new());

        assert_eq!(clientes[0].categoria, "");
        assert!(clientes[0].comentarios.is_empty());
        assert_eq!(clientes[0].bicicletas[0].id, "b1");
        // Bike fields absent from the JSON default to empty
        assert_eq!(clientes[0].bicicletas[0].cor, "");
    }

    #[test]
    fn test_decode_cliente_narrow_row_imported_bare() {
        let table = vec![
            clientes_header(),
            row(&["c1", "JOAO", "52998224725"]),
        ];
        let clientes = decode_clientes(&table, &Table::new());

        assert_eq!(clientes.len(), 1);
        assert_eq!(clientes[0].nome, "JOAO");
        assert!(clientes[0].bicicletas.is_empty());
    }

    #[test]
    fn test_decode_cliente_skips_empty_id_and_keeps_last_duplicate() {
        let table = vec![
            clientes_header(),
            row(&["", "FANTASMA", "", "", "", "[]", "[]"]),
            row(&["c1", "PRIMEIRO", "52998224725", "", "", "[]", "[]"]),
            row(&["c2", "OUTRO", "11144477735", "", "", "[]", "[]"]),
            row(&["c1", "SEGUNDO", "52998224725", "", "", "[]", "[]"]),
        ];
        let clientes = decode_clientes(&table, &Table::new());

        // Last occurrence wins, original position holds
        assert_eq!(clientes.len(), 2);
        assert_eq!(clientes[0].nome, "SEGUNDO");
        assert_eq!(clientes[1].nome, "OUTRO");
    }

    #[test]
    fn test_decode_cliente_malformed_json_decays_to_empty() {
        let table = vec![
            clientes_header(),
            row(&["c1", "JOAO", "52998224725", "", "", "nao é json", "{\"não\":\"array\"}"]),
        ];
        let clientes = decode_clientes(&table, &Table::new());

        assert!(clientes[0].comentarios.is_empty());
        assert!(clientes[0].bicicletas.is_empty());
    }

    #[test]
    fn test_bike_table_folds_into_clients_by_header_order() {
        let clientes = vec![
            clientes_header(),
            row(&["c1", "JOAO", "52998224725", "", "", "[]", "[]"]),
        ];
        let bicicletas = vec![
            row(&["ID", "Cliente ID", "Marca", "Modelo", "Cor"]),
            row(&["b1", "c1", "Caloi", "Elite", "azul"]),
            row(&["b2", "desconhecido", "Trek", "X", "preta"]),
            row(&["", "c1", "Sem", "Id", "cinza"]),
        ];
        let decoded = decode_clientes(&clientes, &bicicletas);

        assert_eq!(decoded[0].bicicletas.len(), 1);
        let bike = &decoded[0].bicicletas[0];
        assert_eq!(bike.marca, "Caloi");
        assert_eq!(bike.modelo, "Elite");
        assert_eq!(bike.cor, "azul");
    }

    fn registros_header() -> Vec<String> {
        row(&[
            "ID",
            "Cliente ID",
            "Bicicleta ID",
            "Categoria",
            "Data Entrada",
            "Data Saída",
            "Pernoite",
            "Acesso Removido",
            "Registro Original ID",
            "Bike Snapshot",
        ])
    }

    #[test]
    fn test_decode_registro_current_shape() {
        let table = vec![
            registros_header(),
            row(&[
                "r1",
                "c1",
                "b1",
                "mensalista",
                "2024-03-10T12:00:00.000Z",
                "",
                "Sim",
                "Não",
                "",
                "{\"id\":\"b1\",\"cor\":\"azul\"}",
            ]),
        ];
        let registros = decode_registros(&table);

        let r = &registros[0];
        assert_eq!(r.bicicleta_id.as_deref(), Some("b1"));
        assert_eq!(r.categoria, "mensalista");
        assert!(r.pernoite);
        assert!(!r.acesso_removido);
        assert_eq!(r.data_hora_saida, None);
        assert!(r.bike_snapshot.is_some());
    }

    #[test]
    fn test_decode_registro_legacy_shape() {
        let table = vec![
            registros_header(),
            row(&[
                "r1",
                "c1",
                "",
                "2024-03-10T12:00:00.000Z",
                "2024-03-10T18:00:00.000Z",
                "Não",
                "Sim",
                "r0",
            ]),
        ];
        let registros = decode_registros(&table);

        let r = &registros[0];
        assert_eq!(r.categoria, "");
        assert_eq!(r.bicicleta_id, None);
        assert_eq!(r.data_hora_entrada, "2024-03-10T12:00:00.000Z");
        assert_eq!(r.data_hora_saida.as_deref(), Some("2024-03-10T18:00:00.000Z"));
        assert!(!r.pernoite);
        assert!(r.acesso_removido);
        assert_eq!(r.registro_original_id.as_deref(), Some("r0"));
        assert_eq!(r.bike_snapshot, None);
    }

    #[test]
    fn test_decode_registro_six_columns_is_dropped() {
        let table = vec![
            registros_header(),
            row(&["r1", "c1", "b1", "2024-03-10", "", "Sim"]),
            row(&["r2", "c1", "", "2024-03-10T12:00:00Z", "", "Não", "Não", ""]),
        ];
        let registros = decode_registros(&table);

        assert_eq!(registros.len(), 1);
        assert_eq!(registros[0].id, "r2");
    }

    #[test]
    fn test_decode_registro_non_sim_boolean_is_false() {
        let table = vec![
            registros_header(),
            row(&["r1", "c1", "", "", "2024-03-10T12:00:00Z", "", "sim", "TRUE", "", "{}"]),
        ];
        let registros = decode_registros(&table);

        // Only the exact marker counts
        assert!(!registros[0].pernoite);
        assert!(!registros[0].acesso_removido);
        // An empty object snapshot means no snapshot
        assert_eq!(registros[0].bike_snapshot, None);
    }

    #[test]
    fn test_decode_usuario_with_lenient_permissions() {
        let table = vec![
            row(&["ID", "Username", "Password", "Nome", "Tipo", "Ativo", "Permissões"]),
            row(&[
                "u1",
                "maria",
                "s3nha",
                "Maria",
                "admin",
                "Sim",
                "{\"configuracao\":{\"importar\":true}}",
            ]),
            row(&["u2", "joao", "x", "João", "operador", "Não", "permissões corrompidas"]),
        ];
        let usuarios = decode_usuarios(&table);

        assert_eq!(usuarios.len(), 2);
        assert!(usuarios[0].ativo);
        assert!(usuarios[0].pode("configuracao", "importar"));
        assert!(!usuarios[1].ativo);
        assert!(usuarios[1].permissoes.is_empty());
    }

    #[test]
    fn test_decode_categorias_map_in_order() {
        let table = vec![
            row(&["Nome", "Emoji"]),
            row(&["mensalista", "⭐"]),
            row(&["avulso", "🚲"]),
            row(&["", "fantasma"]),
        ];
        let categorias = decode_categorias(&table);

        assert_eq!(categorias.len(), 2);
        let nomes: Vec<&String> = categorias.keys().collect();
        assert_eq!(nomes, ["mensalista", "avulso"]);
        assert_eq!(categorias["mensalista"], "⭐");
    }

    #[test]
    fn test_decode_backup_maps_all_tables() {
        let tables = BackupTables {
            clientes: vec![clientes_header(), row(&["c1", "JOAO", "52998224725", "", "", "[]", "[]"])],
            bicicletas: Table::new(),
            categorias: None,
            registros: vec![registros_header()],
            usuarios: Table::new(),
        };
        let decoded = decode_backup(&tables);

        assert_eq!(decoded.clientes.len(), 1);
        assert!(decoded.registros.is_empty());
        assert!(decoded.usuarios.is_empty());
        assert!(decoded.categorias.is_none());
    }
}
