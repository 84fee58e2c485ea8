use anyhow::Result;
use std::sync::Arc;

use super::connection::JsonConnection;
use crate::domain::models::{CategoriaMap, Cliente, Registro, Usuario};
use crate::storage::traits::{
    BackupStorage, CategoriaStorage, ClienteStorage, RegistroStorage, SystemSnapshot,
    UsuarioStorage,
};

const CLIENTES_FILE: &str = "clientes.json";
const REGISTROS_FILE: &str = "registros.json";
const USUARIOS_FILE: &str = "usuarios.json";
const CATEGORIAS_FILE: &str = "categorias.json";

/// JSON-file store for the four collections, one file per collection.
#[derive(Clone)]
pub struct JsonStore {
    connection: Arc<JsonConnection>,
}

impl JsonStore {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }
}

impl ClienteStorage for JsonStore {
    fn load_clientes(&self) -> Result<Vec<Cliente>> {
        self.connection.load_collection(CLIENTES_FILE)
    }

    fn save_clientes(&self, clientes: &[Cliente]) -> Result<()> {
        self.connection.save_collection(CLIENTES_FILE, &clientes)
    }
}

impl RegistroStorage for JsonStore {
    fn load_registros(&self) -> Result<Vec<Registro>> {
        self.connection.load_collection(REGISTROS_FILE)
    }

    fn save_registros(&self, registros: &[Registro]) -> Result<()> {
        self.connection.save_collection(REGISTROS_FILE, &registros)
    }
}

impl UsuarioStorage for JsonStore {
    fn load_usuarios(&self) -> Result<Vec<Usuario>> {
        self.connection.load_collection(USUARIOS_FILE)
    }

    fn save_usuarios(&self, usuarios: &[Usuario]) -> Result<()> {
        self.connection.save_collection(USUARIOS_FILE, &usuarios)
    }
}

impl CategoriaStorage for JsonStore {
    fn load_categorias(&self) -> Result<CategoriaMap> {
        self.connection.load_collection(CATEGORIAS_FILE)
    }

    fn save_categorias(&self, categorias: &CategoriaMap) -> Result<()> {
        self.connection.save_collection(CATEGORIAS_FILE, categorias)
    }
}

impl BackupStorage for JsonStore {
    fn commit_snapshot(&self, snapshot: &SystemSnapshot) -> Result<()> {
        self.connection.commit_collections(&[
            (CLIENTES_FILE, serde_json::to_string_pretty(&snapshot.clientes)?),
            (REGISTROS_FILE, serde_json::to_string_pretty(&snapshot.registros)?),
            (USUARIOS_FILE, serde_json::to_string_pretty(&snapshot.usuarios)?),
            (CATEGORIAS_FILE, serde_json::to_string_pretty(&snapshot.categorias)?),
        ])
    }
}
