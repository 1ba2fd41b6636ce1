//! Error types for Rigport

use thiserror::Error;

/// The main error type for Rigport operations
#[derive(Debug, Error)]
pub enum RigportError {
    #[error("Dump parse error: {0}")]
    DumpParse(String),

    #[error("Object not found: path id {0}")]
    ObjectNotFound(i64),

    #[error("Unexpected class for path id {path_id}: expected {expected}, got {got}")]
    UnexpectedClass {
        path_id: i64,
        expected: String,
        got: String,
    },

    #[error("Unresolved pivot for bone '{bone}': path id {path_id} not seen earlier in traversal")]
    UnresolvedPivot { bone: String, path_id: i64 },

    #[error("Invalid armature structure: {0}")]
    Structure(String),

    #[error("Unresolved bone hash: {0}")]
    UnresolvedBoneHash(String),

    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Armature not found: {0}")]
    ArmatureNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Physics error: {0}")]
    Physics(String),
}

/// Result type alias for Rigport operations
pub type Result<T> = std::result::Result<T, RigportError>;

impl From<serde_json::Error> for RigportError {
    fn from(err: serde_json::Error) -> Self {
        RigportError::DumpParse(err.to_string())
    }
}

impl From<toml::de::Error> for RigportError {
    fn from(err: toml::de::Error) -> Self {
        RigportError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RigportError {
    fn from(err: toml::ser::Error) -> Self {
        RigportError::Serialize(err.to_string())
    }
}
