//! Composers from domain entities to export tables.
//!
//! Everything becomes strings here: booleans as `Sim`/`Não`, absent values
//! as empty cells, nested collections as embedded JSON. The two composers
//! filter differently on purpose. The client-list export compares full
//! local timestamps against a day-granular window; the backup export
//! compares local calendar dates lexicographically.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use log::warn;
use serde::Serialize;

use super::{SystemTables, Table};
use crate::domain::models::{CategoriaMap, Cliente, Registro, Usuario};

pub const SIMPLE_HEADERS: [&str; 4] = ["Nome", "Telefone", "CPF", "Categoria"];

pub const CLIENTES_HEADERS: [&str; 7] = [
    "ID",
    "Nome",
    "CPF",
    "Telefone",
    "Categoria",
    "Comentários",
    "Bicicletas",
];
pub const BICICLETAS_HEADERS: [&str; 5] = ["ID", "Cliente ID", "Marca", "Modelo", "Cor"];
pub const CATEGORIAS_HEADERS: [&str; 2] = ["Nome", "Emoji"];
pub const REGISTROS_HEADERS: [&str; 10] = [
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
];
pub const USUARIOS_HEADERS: [&str; 7] = [
    "ID",
    "Username",
    "Password",
    "Nome",
    "Tipo",
    "Ativo",
    "Permissões",
];

fn header_row(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| h.to_string()).collect()
}

fn sim_nao(value: bool) -> String {
    if value { "Sim" } else { "Não" }.to_string()
}

fn json_cell<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn parse_entrada(registro: &Registro) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&registro.data_hora_entrada)
        .map(|dt| dt.with_timezone(&Local))
        .ok()
}

fn local_day_start(date: &str) -> Option<DateTime<Local>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Local.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).earliest()
}

fn local_day_end(date: &str) -> Option<DateTime<Local>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Local
        .from_local_datetime(&day.and_hms_milli_opt(23, 59, 59, 999)?)
        .latest()
}

/// Timestamp filter for the client-list export. A record whose entry
/// timestamp cannot be read is kept, never silently excluded.
fn entrada_within(
    registro: &Registro,
    inicio: Option<DateTime<Local>>,
    fim: Option<DateTime<Local>>,
) -> bool {
    let Some(entrada) = parse_entrada(registro) else {
        warn!(
            "Unreadable entry timestamp '{}' on record {}, keeping it in the export window",
            registro.data_hora_entrada, registro.id
        );
        return true;
    };
    if let Some(inicio) = inicio {
        if entrada < inicio {
            return false;
        }
    }
    if let Some(fim) = fim {
        if entrada > fim {
            return false;
        }
    }
    true
}

/// Local calendar date of a record's entry, for the date-granular backup
/// filter. Unparseable timestamps fall back to their first ten characters.
fn entrada_local_date(registro: &Registro) -> String {
    match parse_entrada(registro) {
        Some(entrada) => entrada.format("%Y-%m-%d").to_string(),
        None => registro.data_hora_entrada.chars().take(10).collect(),
    }
}

fn entrada_date_within(registro: &Registro, inicio: Option<&str>, fim: Option<&str>) -> bool {
    let date = entrada_local_date(registro);
    if let Some(inicio) = inicio {
        if date.as_str() < inicio {
            return false;
        }
    }
    if let Some(fim) = fim {
        if date.as_str() > fim {
            return false;
        }
    }
    true
}

/// Compose the plain client-list table: header plus one row per client.
///
/// With a window set, only clients having at least one visit whose entry
/// falls inside it (inclusive, local time) are listed. Clients with no
/// visits at all never match an active window.
pub fn compose_clientes_table(
    clientes: &[Cliente],
    registros: &[Registro],
    data_inicio: Option<&str>,
    data_fim: Option<&str>,
) -> Table {
    let mut table = vec![header_row(&SIMPLE_HEADERS)];

    let selecionados: Vec<&Cliente> = if data_inicio.is_some() || data_fim.is_some() {
        let inicio = data_inicio.and_then(local_day_start);
        let fim = data_fim.and_then(local_day_end);
        let ids: HashSet<&str> = registros
            .iter()
            .filter(|r| entrada_within(r, inicio, fim))
            .map(|r| r.cliente_id.as_str())
            .collect();
        clientes
            .iter()
            .filter(|c| ids.contains(c.id.as_str()))
            .collect()
    } else {
        clientes.iter().collect()
    };

    for cliente in selecionados {
        table.push(vec![
            cliente.nome.clone(),
            cliente.telefone.clone(),
            cliente.cpf.clone(),
            cliente.categoria.clone(),
        ]);
    }
    table
}

/// Compose the five backup tables.
///
/// An active window first selects visit records by local calendar date,
/// then restricts clients to the owners of those records. Categories and
/// users are never filtered.
pub fn compose_system_tables(
    clientes: &[Cliente],
    registros: &[Registro],
    usuarios: &[Usuario],
    categorias: &CategoriaMap,
    data_inicio: Option<&str>,
    data_fim: Option<&str>,
) -> SystemTables {
    let filtro_ativo = data_inicio.is_some() || data_fim.is_some();

    let registros_selecionados: Vec<&Registro> = registros
        .iter()
        .filter(|r| !filtro_ativo || entrada_date_within(r, data_inicio, data_fim))
        .collect();

    let clientes_selecionados: Vec<&Cliente> = if filtro_ativo {
        let ids: HashSet<&str> = registros_selecionados
            .iter()
            .map(|r| r.cliente_id.as_str())
            .collect();
        clientes
            .iter()
            .filter(|c| ids.contains(c.id.as_str()))
            .collect()
    } else {
        clientes.iter().collect()
    };

    let mut tabela_clientes = vec![header_row(&CLIENTES_HEADERS)];
    let mut tabela_bicicletas = vec![header_row(&BICICLETAS_HEADERS)];
    for cliente in &clientes_selecionados {
        tabela_clientes.push(vec![
            cliente.id.clone(),
            cliente.nome.clone(),
            cliente.cpf.clone(),
            cliente.telefone.clone(),
            cliente.categoria.clone(),
            json_cell(&cliente.comentarios, "[]"),
            json_cell(&cliente.bicicletas, "[]"),
        ]);
        for bike in &cliente.bicicletas {
            tabela_bicicletas.push(vec![
                bike.id.clone(),
                cliente.id.clone(),
                bike.marca.clone(),
                bike.modelo.clone(),
                bike.cor.clone(),
            ]);
        }
    }

    let mut tabela_categorias = vec![header_row(&CATEGORIAS_HEADERS)];
    for (nome, emoji) in categorias {
        tabela_categorias.push(vec![nome.clone(), emoji.clone()]);
    }

    let mut tabela_registros = vec![header_row(&REGISTROS_HEADERS)];
    for registro in &registros_selecionados {
        tabela_registros.push(vec![
            registro.id.clone(),
            registro.cliente_id.clone(),
            registro.bicicleta_id.clone().unwrap_or_default(),
            registro.categoria.clone(),
            registro.data_hora_entrada.clone(),
            registro.data_hora_saida.clone().unwrap_or_default(),
            sim_nao(registro.pernoite),
            sim_nao(registro.acesso_removido),
            registro.registro_original_id.clone().unwrap_or_default(),
            match &registro.bike_snapshot {
                Some(snapshot) => json_cell(snapshot, "{}"),
                None => "{}".to_string(),
            },
        ]);
    }

    let mut tabela_usuarios = vec![header_row(&USUARIOS_HEADERS)];
    for usuario in usuarios {
        tabela_usuarios.push(vec![
            usuario.id.clone(),
            usuario.username.clone(),
            usuario.password.clone(),
            usuario.nome.clone(),
            usuario.tipo.clone(),
            sim_nao(usuario.ativo),
            json_cell(&usuario.permissoes, "{}"),
        ]);
    }

    SystemTables {
        clientes: tabela_clientes,
        bicicletas: tabela_bicicletas,
        categorias: tabela_categorias,
        registros: tabela_registros,
        usuarios: tabela_usuarios,
    }
}
