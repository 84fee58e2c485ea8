//! Domain model for a parking visit record.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One visit: a bike entering the facility and, eventually, leaving it.
///
/// Timestamps are carried as the strings they were stored or imported with
/// and are never reformatted, so backups round-trip byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registro {
    pub id: String,
    pub cliente_id: String,
    /// Absent for visits recorded before bikes were tracked individually
    pub bicicleta_id: Option<String>,
    /// Category of the client at the time of the visit, may be empty
    #[serde(default)]
    pub categoria: String,
    pub data_hora_entrada: String, // RFC 3339 timestamp
    pub data_hora_saida: Option<String>, // RFC 3339, None while parked
    pub pernoite: bool,
    pub acesso_removido: bool,
    /// Points at the visit this one re-opened, when applicable
    pub registro_original_id: Option<String>,
    /// Copy of the bike as it looked at entry time; None when not captured
    pub bike_snapshot: Option<Value>,
}
