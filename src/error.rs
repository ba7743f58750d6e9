// Error taxonomy shared by the store and the HTTP layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Delete by an id that is not in the file
    #[error("Movimiento no encontrado")]
    NotFound { id: String },

    /// Upload rejected before touching the store (wrong extension, no file part)
    #[error("{0}")]
    BadUpload(String),

    /// Imported bytes are not a JSON array of movements
    #[error("El archivo JSON no es válido: {0}")]
    CorruptInput(#[source] serde_json::Error),

    #[error("Error de entrada/salida: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error al serializar los movimientos: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Short machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::BadUpload(_) => "bad_upload",
            LedgerError::CorruptInput(_) => "corrupt_input",
            LedgerError::Io(_) => "io_error",
            LedgerError::Serialize(_) => "serialize_error",
        }
    }

    /// Client errors are the caller's fault; everything else is ours
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::NotFound { .. } | LedgerError::BadUpload(_) | LedgerError::CorruptInput(_)
        )
    }
}
