//! User-correction events handed to the mapping store.

use serde::{Deserialize, Serialize};

use crate::{EntityId, MappingType, MatchMethod};

/// A user correction of a suggested mapping, packaged for the mapping store.
///
/// An event is a pure function of its inputs so repeated packaging of the
/// same correction yields the same event; persistence timestamps and the
/// insert-or-upsert decision (keyed by partner, mapping type, and foreign
/// code) are the store's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionEvent {
    pub mapping_type: MappingType,
    pub their_code: String,
    pub their_description: String,
    /// Entity the engine had suggested, if any.
    pub suggested_entity_id: Option<EntityId>,
    /// Method that produced the original suggestion.
    pub suggested_method: MatchMethod,
    /// Code the user confirmed as correct.
    pub confirmed_code: String,
    pub user_id: String,
}
