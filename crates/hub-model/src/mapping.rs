//! Mapping vocabulary: foreign items and confirmed mapping records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityId, ModelError, PartnerId};

/// The reference-catalog family a mapping belongs to.
///
/// Serialized names match the hub's wire vocabulary (`paymentTerms` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingType {
    Product,
    Unit,
    Packaging,
    PaymentTerms,
    DeliveryTerms,
}

impl MappingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Unit => "unit",
            Self::Packaging => "packaging",
            Self::PaymentTerms => "paymentTerms",
            Self::DeliveryTerms => "deliveryTerms",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming document line item to resolve, as submitted by a partner.
///
/// Transient: constructed per resolution call from a document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignItem {
    pub code: String,
    pub description: String,
}

impl ForeignItem {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// A blank code is a precondition violation for resolution.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.code.trim().is_empty() {
            return Err(ModelError::MissingCode);
        }
        Ok(())
    }
}

/// A confirmed, partner-scoped association between a foreign code and a
/// reference entity.
///
/// Records are owned by the hub's mapping store; the engine reads a snapshot
/// and returns suggestions, it does not persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub id: String,
    pub mapping_type: MappingType,
    pub partner_id: PartnerId,
    pub their_code: String,
    pub their_description: String,
    pub our_entity_id: EntityId,
    pub our_code: String,
    pub our_description: String,
    /// Confidence at confirmation time, 0-100.
    pub confidence: u8,
    /// How often this foreign code has recurred for the partner.
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingRecord {
    /// Bookkeeping for a recurring foreign code: bumps the usage counter and
    /// refreshes the update timestamp. Called by the mapping store when the
    /// same code comes in again, not by the resolution engine.
    pub fn note_reuse(&mut self, now: DateTime<Utc>) {
        self.usage_count += 1;
        self.updated_at = now;
    }
}
