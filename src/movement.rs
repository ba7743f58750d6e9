// 💶 Movement - the single record kept in the ledger file
// Field names are Spanish because they are the JSON contract of the data file

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Account tag for bank movements
pub const TIPO_BANCO: &str = "BANCO";

/// Account tag for cash movements
pub const TIPO_CASH: &str = "CASH";

/// Date assumed for a movement that carries no `fecha` at all
pub const FECHA_SIN_FECHA: &str = "1970-01-01";

/// Date layout of `fecha`
pub const FECHA_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// MOVEMENT
// ============================================================================

/// One dated monetary movement
///
/// The record is a fixed set of fields with explicit defaults, so files
/// edited by hand (or written by older versions) still load:
/// - missing `cantidad` counts as 0
/// - missing `asunto` / `tipo` become empty strings
/// - missing `fecha` stays missing and sorts as 1970-01-01
/// - missing `id` is filled in by the store on load
///
/// Field types are read leniently as well: a numeric `id` becomes text,
/// a null or non-numeric `cantidad` counts as 0, and a non-text `fecha`
/// is kept as text that will not parse as a date. Unknown fields are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,

    #[serde(
        default,
        deserialize_with = "lenient_fecha",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub asunto: String,

    #[serde(default, deserialize_with = "lenient_tipo")]
    pub tipo: String,

    #[serde(default, deserialize_with = "lenient_cantidad")]
    pub cantidad: f64,
}

impl Movement {
    /// Build a stored movement from a create request, assigning a fresh id
    pub fn from_request(request: NewMovement) -> Self {
        Self {
            id: new_id(),
            fecha: Some(request.fecha),
            asunto: request.asunto,
            tipo: request.tipo,
            cantidad: request.cantidad,
        }
    }

    /// Date text used for ordering (falls back to 1970-01-01 when absent)
    pub fn sort_date(&self) -> &str {
        self.fecha.as_deref().unwrap_or(FECHA_SIN_FECHA)
    }

    /// Which balance this movement feeds, if any
    pub fn account(&self) -> Option<Account> {
        Account::from_tipo(&self.tipo)
    }
}

/// Fresh opaque identifier for a movement
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// ACCOUNT
// ============================================================================

/// The two accounts that have a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Account {
    Banco,
    Cash,
}

impl Account {
    /// Exact, case-sensitive match on the stored `tipo`
    pub fn from_tipo(tipo: &str) -> Option<Self> {
        match tipo {
            TIPO_BANCO => Some(Account::Banco),
            TIPO_CASH => Some(Account::Cash),
            _ => None,
        }
    }

}

// ============================================================================
// LENIENT FIELD READERS
// ============================================================================

// Text as is, numbers and booleans as their JSON text, null as empty
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// Only text can name an account; anything else feeds no balance
fn lenient_tipo<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_fecha<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn lenient_cantidad<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

// ============================================================================
// CREATE REQUEST
// ============================================================================

/// Body of `POST /guardar`; every field is required
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewMovement {
    pub fecha: String,
    pub asunto: String,
    pub tipo: String,
    pub cantidad: f64,
}
