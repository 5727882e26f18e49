//! Review-session state for suggested mappings.
//!
//! After a batch resolution the hub presents each document line for review:
//! accept the engine suggestion, pick a different catalog entity manually,
//! or leave the line unmapped. This module tracks that workflow and drafts
//! mapping records for the store once review is done.

use chrono::{DateTime, Utc};

use hub_model::{
    ForeignItem, ItemSuggestion, MappingRecord, MappingType, MatchResult, PartnerId,
    ReferenceEntity,
};

use crate::engine::ConfidenceLevel;

/// Review status of one document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Engine suggestion pending review.
    Suggested,
    /// Suggestion accepted as-is.
    Accepted,
    /// Reviewer picked an entity manually.
    Overridden,
    /// Line left unmapped.
    Cleared,
}

/// One document line under review.
#[derive(Debug, Clone)]
pub struct ReviewLine {
    pub item: ForeignItem,
    pub suggestion: MatchResult,
    status: LineStatus,
    manual: Option<ReferenceEntity>,
}

impl ReviewLine {
    fn new(entry: ItemSuggestion) -> Self {
        Self {
            item: entry.item,
            suggestion: entry.suggestion,
            status: LineStatus::Suggested,
            manual: None,
        }
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// The catalog entity this line currently resolves to, if any.
    pub fn resolved(&self) -> Option<&ReferenceEntity> {
        match self.status {
            LineStatus::Cleared => None,
            LineStatus::Overridden => self.manual.as_ref(),
            LineStatus::Suggested | LineStatus::Accepted => self.suggestion.matched.as_ref(),
        }
    }

    /// Effective confidence. Manual picks count as full confidence.
    pub fn confidence(&self) -> u8 {
        match self.status {
            LineStatus::Cleared => 0,
            LineStatus::Overridden => 100,
            LineStatus::Suggested | LineStatus::Accepted => self.suggestion.confidence,
        }
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence())
    }
}

/// Review workflow over a batch of suggestions for one mapping type.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    mapping_type: MappingType,
    lines: Vec<ReviewLine>,
}

impl ReviewSession {
    pub fn new(mapping_type: MappingType, suggestions: Vec<ItemSuggestion>) -> Self {
        let lines = suggestions.into_iter().map(ReviewLine::new).collect();
        Self {
            mapping_type,
            lines,
        }
    }

    pub fn mapping_type(&self) -> MappingType {
        self.mapping_type
    }

    pub fn lines(&self) -> &[ReviewLine] {
        &self.lines
    }

    /// Accepts the engine suggestion for a line.
    ///
    /// Returns false when the line has no suggestion to accept or the index
    /// is out of range.
    pub fn accept(&mut self, index: usize) -> bool {
        match self.lines.get_mut(index) {
            Some(line) if line.suggestion.is_match() => {
                line.status = LineStatus::Accepted;
                line.manual = None;
                true
            }
            _ => false,
        }
    }

    /// Replaces a line's suggestion with a manually chosen entity.
    pub fn override_with(&mut self, index: usize, entity: ReferenceEntity) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.status = LineStatus::Overridden;
                line.manual = Some(entity);
                true
            }
            None => false,
        }
    }

    /// Marks a line as unmapped.
    pub fn clear(&mut self, index: usize) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.status = LineStatus::Cleared;
                line.manual = None;
                true
            }
            None => false,
        }
    }

    /// Line counts per review bucket, as surfaced in the hub UI.
    pub fn summary(&self) -> ReviewSummary {
        let mut summary = ReviewSummary {
            total: self.lines.len(),
            ..ReviewSummary::default()
        };
        for line in &self.lines {
            if line.resolved().is_none() {
                summary.unmatched += 1;
                continue;
            }
            match line.level() {
                ConfidenceLevel::High => summary.high += 1,
                ConfidenceLevel::Medium => summary.medium += 1,
                ConfidenceLevel::Low => summary.low += 1,
            }
            if matches!(line.status, LineStatus::Accepted | LineStatus::Overridden) {
                summary.confirmed += 1;
            }
        }
        summary
    }

    /// Drafts mapping records for confirmed lines, for the store to persist.
    ///
    /// Draft ids are a deterministic partner/type/code key; the store may
    /// re-key on insert.
    pub fn to_records(&self, partner_id: &PartnerId, now: DateTime<Utc>) -> Vec<MappingRecord> {
        self.lines
            .iter()
            .filter(|line| matches!(line.status, LineStatus::Accepted | LineStatus::Overridden))
            .filter_map(|line| {
                let entity = line.resolved()?;
                Some(MappingRecord {
                    id: format!("{}:{}:{}", partner_id, self.mapping_type, line.item.code),
                    mapping_type: self.mapping_type,
                    partner_id: partner_id.clone(),
                    their_code: line.item.code.clone(),
                    their_description: line.item.description.clone(),
                    our_entity_id: entity.id.clone(),
                    our_code: entity.code.clone(),
                    our_description: entity.description.clone(),
                    confidence: line.confidence(),
                    usage_count: 1,
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect()
    }
}

/// Line counts per review bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Lines with no current resolution (no suggestion, or cleared).
    pub unmatched: usize,
    /// Lines accepted or manually overridden.
    pub confirmed: usize,
}
