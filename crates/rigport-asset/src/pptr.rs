//! Serialized object references

use serde::{Deserialize, Serialize};

/// A reference to another serialized object, as stored in type trees.
///
/// A path id of 0 is the null reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PPtr {
    #[serde(rename = "m_FileID", default)]
    pub file_id: i32,
    #[serde(rename = "m_PathID", default)]
    pub path_id: i64,
}

impl PPtr {
    pub const NULL: Self = Self {
        file_id: 0,
        path_id: 0,
    };

    pub fn new(path_id: i64) -> Self {
        Self {
            file_id: 0,
            path_id,
        }
    }

    pub fn is_null(&self) -> bool {
        self.path_id == 0
    }

    /// The referenced path id, or None for the null reference
    pub fn get(&self) -> Option<i64> {
        (!self.is_null()).then_some(self.path_id)
    }
}
