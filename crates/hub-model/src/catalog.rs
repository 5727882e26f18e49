//! Internal reference catalog rows.

use serde::{Deserialize, Serialize};

use crate::EntityId;

/// A row of the organization's reference catalog.
///
/// Catalog rows are owned by the hub's catalog services (products, units,
/// packaging types, payment terms, delivery terms). The resolution engine
/// only reads a snapshot per call and never modifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: EntityId,
    pub code: String,
    pub description: String,
    /// Deactivated rows are never suggested and invalidate historical links.
    pub active: bool,
}

impl ReferenceEntity {
    /// Creates an active catalog row.
    pub fn new(id: EntityId, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            description: description.into(),
            active: true,
        }
    }
}
