/// Test utilities for storage and service tests.
///
/// The environment owns a temporary directory that is removed when it drops,
/// even if the test panics, so no test data survives a run.
use anyhow::Result;
use indexmap::IndexMap;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::JsonConnection;
use super::store::JsonStore;
use crate::domain::models::{Bicicleta, Cliente, Registro, Usuario};

/// Store over a temporary directory with automatic cleanup.
pub struct TestEnvironment {
    pub store: Arc<JsonStore>,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    /// Create a new test environment with a temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = Arc::new(JsonConnection::new(temp_dir.path())?);
        Ok(Self {
            store: Arc::new(JsonStore::new(connection)),
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

pub fn cliente_exemplo(id: &str, nome: &str, cpf: &str) -> Cliente {
    Cliente {
        id: id.to_string(),
        nome: nome.to_string(),
        cpf: cpf.to_string(),
        telefone: "11999999999".to_string(),
        categoria: String::new(),
        comentarios: Vec::new(),
        bicicletas: Vec::new(),
    }
}

pub fn bicicleta_exemplo(id: &str) -> Bicicleta {
    Bicicleta {
        id: id.to_string(),
        marca: "Caloi".to_string(),
        modelo: "Elite".to_string(),
        cor: "azul".to_string(),
    }
}

pub fn registro_exemplo(id: &str, cliente_id: &str, entrada: &str) -> Registro {
    Registro {
        id: id.to_string(),
        cliente_id: cliente_id.to_string(),
        bicicleta_id: None,
        categoria: String::new(),
        data_hora_entrada: entrada.to_string(),
        data_hora_saida: None,
        pernoite: false,
        acesso_removido: false,
        registro_original_id: None,
        bike_snapshot: None,
    }
}

pub fn usuario_exemplo(username: &str) -> Usuario {
    Usuario {
        id: format!("u-{}", username),
        username: username.to_string(),
        password: "s3nha".to_string(),
        nome: username.to_string(),
        tipo: "operador".to_string(),
        ativo: true,
        permissoes: Default::default(),
    }
}

/// User allowed to both import and export data.
pub fn usuario_admin() -> Usuario {
    let mut acoes = IndexMap::new();
    acoes.insert("importar".to_string(), true);
    acoes.insert("exportar".to_string(), true);

    let mut usuario = usuario_exemplo("admin");
    usuario.tipo = "admin".to_string();
    usuario.permissoes.insert("configuracao".to_string(), acoes);
    usuario
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleans_up_on_drop() {
        let base_path;
        {
            let env = TestEnvironment::new().unwrap();
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
    }
}
