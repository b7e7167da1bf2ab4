//! Session permissions

use serde::{Deserialize, Serialize};

/// What the current user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// May list files on the storage backends
    pub browse_files: bool,

    /// May write shared settings such as the cloud path memo
    pub modify_settings: bool,
}

impl Permissions {
    /// Full access
    pub fn all() -> Self {
        Self {
            browse_files: true,
            modify_settings: true,
        }
    }

    /// Browse-only access; settings changes stay in memory
    pub fn read_only() -> Self {
        Self {
            browse_files: true,
            modify_settings: false,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}
