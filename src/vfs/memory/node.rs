/*!
 * Filesystem Node Types
 * Internal representation of in-memory files
 */

use parking_lot::RwLock;

use super::super::types::Permissions;

/// In-memory file node, shared by every object opened on it
#[derive(Debug)]
pub(in crate::vfs) struct Node {
    pub data: RwLock<Vec<u8>>,
    pub permissions: Permissions,
}

impl Node {
    pub fn new(data: Vec<u8>, permissions: Permissions) -> Self {
        Self {
            data: RwLock::new(data),
            permissions,
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }
}
