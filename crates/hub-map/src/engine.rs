//! Tiered resolution pipeline.
//!
//! Resolution runs stages in fixed precedence: exact code equality,
//! previously confirmed mappings, lexical similarity, then (when an oracle
//! is configured) embedding similarity and generative adjudication. Each
//! stage either returns a result or falls through; the running best
//! candidate from the similarity stages backstops the whole pipeline, so a
//! non-empty catalog with any lexical overlap always yields a suggestion.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use hub_model::{
    CorrectionEvent, ForeignItem, ItemSuggestion, MappingRecord, MappingType, MatchMethod,
    MatchResult, ReferenceEntity,
};

use crate::error::Result;
use crate::oracle::{
    ADJUDICATION_CANDIDATE_CAP, NoOracle, OracleError, OracleResult, SemanticOracle,
};
use crate::similarity::{composite_score, cosine_similarity, string_similarity};

/// Lexical score at or above which a fuzzy match is accepted outright.
const FUZZY_ACCEPT: f64 = 0.8;
/// Running best score at or above which the embedding stage accepts.
const EMBEDDING_ACCEPT: f64 = 0.75;
/// Running best score below which generative adjudication may run.
const ADJUDICATE_BELOW: f64 = 0.7;
/// Confidence bump for reusing a previously confirmed mapping.
const HISTORY_BOOST: u8 = 5;
/// Budget for a single oracle round trip.
const ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Confidence at or above which a suggestion is near-certain.
const HIGH_CONFIDENCE_MIN: u8 = 90;
/// Confidence at or above which a suggestion is plausible but worth a look.
const MEDIUM_CONFIDENCE_MIN: u8 = 70;

/// Review buckets the hub applies to suggestion confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// Below 70: needs manual verification.
    Low,
    /// 70-89: reasonable, should be reviewed.
    Medium,
    /// 90 and up: near-certain.
    High,
}

impl ConfidenceLevel {
    /// Categorizes a 0-100 confidence value.
    #[must_use]
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= HIGH_CONFIDENCE_MIN {
            Self::High
        } else if confidence >= MEDIUM_CONFIDENCE_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns a human-readable description of the confidence level.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Tunable pipeline thresholds and budgets.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Lexical score at or above which a fuzzy match short-circuits.
    pub fuzzy_accept: f64,
    /// Running best score at or above which the embedding stage accepts.
    pub embedding_accept: f64,
    /// Running best score below which adjudication may run.
    pub adjudicate_below: f64,
    /// Budget for each oracle round trip.
    pub oracle_timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fuzzy_accept: FUZZY_ACCEPT,
            embedding_accept: EMBEDDING_ACCEPT,
            adjudicate_below: ADJUDICATE_BELOW,
            oracle_timeout: ORACLE_TIMEOUT,
        }
    }
}

/// Resolution engine for one mapping type.
///
/// Stateless across calls: catalog and history snapshots come in per call
/// and are treated as read-only. The optional oracle is a capability object
/// supplied at construction; without one the engine runs on the exact,
/// historical, and lexical stages alone.
#[derive(Debug, Clone)]
pub struct MappingResolver<O = NoOracle> {
    mapping_type: MappingType,
    options: ResolverOptions,
    oracle: Option<O>,
}

/// Running best candidate across the similarity stages.
struct Scored<'a> {
    entity: &'a ReferenceEntity,
    score: f64,
}

impl MappingResolver<NoOracle> {
    /// Engine without a semantic backend.
    pub fn new(mapping_type: MappingType) -> Self {
        Self {
            mapping_type,
            options: ResolverOptions::default(),
            oracle: None,
        }
    }
}

impl<O: SemanticOracle> MappingResolver<O> {
    /// Attaches a semantic backend for the embedding and adjudication stages.
    pub fn with_oracle<P: SemanticOracle>(self, oracle: P) -> MappingResolver<P> {
        MappingResolver {
            mapping_type: self.mapping_type,
            options: self.options,
            oracle: Some(oracle),
        }
    }

    /// Overrides the default thresholds and budgets.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mapping_type(&self) -> MappingType {
        self.mapping_type
    }

    /// Suggests the best catalog match for a foreign item.
    ///
    /// Always resolves to a [`MatchResult`] for well-formed input: oracle
    /// and transport failures degrade to the lexical stages, and an empty or
    /// hopeless catalog yields the `none` result rather than an error. The
    /// only error is a foreign item without a code.
    pub async fn suggest(
        &self,
        item: &ForeignItem,
        candidates: &[ReferenceEntity],
        history: &[MappingRecord],
    ) -> Result<MatchResult> {
        item.validate()?;

        // Deactivated rows are unavailable to every stage.
        let live: Vec<&ReferenceEntity> = candidates.iter().filter(|c| c.active).collect();

        if let Some(result) = self.exact_stage(item, &live) {
            return Ok(result);
        }
        if let Some(result) = self.historical_stage(item, &live, history) {
            return Ok(result);
        }

        let mut best = lexical_scan(item, &live);
        if let Some(b) = &best
            && b.score >= self.options.fuzzy_accept
        {
            debug!(code = %item.code, score = b.score, "lexical match accepted");
            return Ok(MatchResult::new(
                b.entity.clone(),
                round_confidence(b.score),
                MatchMethod::Fuzzy,
                "High similarity match",
            ));
        }

        if let Some(oracle) = &self.oracle
            && let Some(result) = self.semantic_stage(oracle, item, &live, &mut best).await
        {
            return Ok(result);
        }

        // Low-confidence candidates still beat an empty answer; the
        // reasoning flags them for manual review.
        if let Some(b) = best {
            return Ok(MatchResult::new(
                b.entity.clone(),
                round_confidence(b.score),
                MatchMethod::Fuzzy,
                "Best available match (manual review recommended)",
            ));
        }

        Ok(MatchResult::none())
    }

    /// Resolves a batch of items, preserving input order.
    ///
    /// Items are processed one at a time, which bounds oracle request
    /// concurrency to a single item's calls.
    pub async fn suggest_batch(
        &self,
        items: &[ForeignItem],
        candidates: &[ReferenceEntity],
        history: &[MappingRecord],
    ) -> Result<Vec<ItemSuggestion>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let suggestion = self.suggest(item, candidates, history).await?;
            results.push(ItemSuggestion {
                item: item.clone(),
                suggestion,
            });
        }
        Ok(results)
    }

    /// Packages a user correction for the mapping store.
    ///
    /// Pure: no engine state changes, and identical inputs produce identical
    /// events. The store owns the actual insert-or-upsert keyed by partner,
    /// mapping type, and foreign code.
    pub fn learn_from_correction(
        &self,
        original: &MatchResult,
        item: &ForeignItem,
        confirmed_code: &str,
        user_id: &str,
    ) -> CorrectionEvent {
        debug!(
            code = %item.code,
            confirmed = confirmed_code,
            user = user_id,
            "correction recorded"
        );
        CorrectionEvent {
            mapping_type: self.mapping_type,
            their_code: item.code.clone(),
            their_description: item.description.clone(),
            suggested_entity_id: original.matched.as_ref().map(|e| e.id.clone()),
            suggested_method: original.method,
            confirmed_code: confirmed_code.to_string(),
            user_id: user_id.to_string(),
        }
    }

    fn exact_stage(
        &self,
        item: &ForeignItem,
        candidates: &[&ReferenceEntity],
    ) -> Option<MatchResult> {
        let hit = candidates
            .iter()
            .find(|c| eq_ignore_case(&c.code, &item.code))?;
        debug!(code = %item.code, "exact code match");
        Some(MatchResult::new(
            (*hit).clone(),
            100,
            MatchMethod::Exact,
            "Exact code match",
        ))
    }

    fn historical_stage(
        &self,
        item: &ForeignItem,
        candidates: &[&ReferenceEntity],
        history: &[MappingRecord],
    ) -> Option<MatchResult> {
        let record = history.iter().find(|r| {
            r.mapping_type == self.mapping_type
                && (eq_ignore_case(&r.their_code, &item.code)
                    || eq_ignore_case(&r.their_description, &item.description))
        })?;
        // A record pointing at a removed or deactivated entity yields
        // nothing; control falls through to the similarity stages.
        let entity = candidates.iter().find(|c| c.id == record.our_entity_id)?;

        let confidence = record.confidence.saturating_add(HISTORY_BOOST).min(100);
        debug!(code = %item.code, usage = record.usage_count, "historical mapping reused");
        Some(MatchResult::new(
            (*entity).clone(),
            confidence,
            MatchMethod::Historical,
            format!("Previously mapped {} times", record.usage_count),
        ))
    }

    async fn semantic_stage<'a>(
        &self,
        oracle: &O,
        item: &ForeignItem,
        candidates: &[&'a ReferenceEntity],
        best: &mut Option<Scored<'a>>,
    ) -> Option<MatchResult> {
        if candidates.is_empty() {
            return None;
        }

        if let Some(result) = self.embedding_stage(oracle, item, candidates, best).await {
            return Some(result);
        }

        let best_score = best.as_ref().map_or(0.0, |b| b.score);
        if best_score < self.options.adjudicate_below {
            return self.adjudication_stage(oracle, item, candidates).await;
        }
        None
    }

    async fn embedding_stage<'a>(
        &self,
        oracle: &O,
        item: &ForeignItem,
        candidates: &[&'a ReferenceEntity],
        best: &mut Option<Scored<'a>>,
    ) -> Option<MatchResult> {
        let foreign_text = embedding_text(&item.code, &item.description);
        let foreign = match self.oracle_call(oracle.embed(&foreign_text)).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!(error = %err, "embedding unavailable, staying lexical");
                return None;
            }
        };

        // Candidates are embedded once per resolution call, as a batch.
        let texts: Vec<String> = candidates
            .iter()
            .map(|c| embedding_text(&c.code, &c.description))
            .collect();
        let vectors = match self.oracle_call(oracle.embed_batch(&texts)).await {
            Ok(vectors) => vectors,
            Err(err) => {
                warn!(error = %err, "candidate embedding failed, staying lexical");
                return None;
            }
        };
        if vectors.len() != candidates.len() {
            warn!(
                expected = candidates.len(),
                got = vectors.len(),
                "embedding batch size mismatch"
            );
            return None;
        }

        for (&entity, vector) in candidates.iter().zip(&vectors) {
            let similarity = cosine_similarity(&foreign, vector);
            if similarity > best.as_ref().map_or(0.0, |b| b.score) {
                *best = Some(Scored { entity, score: similarity });
            }
        }

        let b = best.as_ref()?;
        if b.score >= self.options.embedding_accept {
            debug!(code = %item.code, similarity = b.score, "embedding match accepted");
            return Some(MatchResult::new(
                b.entity.clone(),
                round_confidence(b.score),
                MatchMethod::Embedding,
                "Semantic similarity match",
            ));
        }
        None
    }

    async fn adjudication_stage(
        &self,
        oracle: &O,
        item: &ForeignItem,
        candidates: &[&ReferenceEntity],
    ) -> Option<MatchResult> {
        let capped: Vec<ReferenceEntity> = candidates
            .iter()
            .take(ADJUDICATION_CANDIDATE_CAP)
            .map(|c| (*c).clone())
            .collect();

        let judgment = match self
            .oracle_call(oracle.adjudicate(item, &capped, self.mapping_type))
            .await
        {
            Ok(judgment) => judgment,
            Err(err) => {
                warn!(error = %err, "adjudication unavailable");
                return None;
            }
        };

        let code = judgment.matched_code?;
        let Some(entity) = capped.iter().find(|c| eq_ignore_case(&c.code, &code)) else {
            warn!(code = %code, "adjudication named an unknown candidate");
            return None;
        };
        debug!(code = %item.code, matched = %entity.code, "adjudication match");
        Some(MatchResult::new(
            entity.clone(),
            judgment.confidence,
            MatchMethod::Llm,
            judgment.reasoning,
        ))
    }

    async fn oracle_call<T>(
        &self,
        call: impl Future<Output = OracleResult<T>>,
    ) -> OracleResult<T> {
        match tokio::time::timeout(self.options.oracle_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout),
        }
    }
}

/// Scans the catalog for the lexically closest candidate.
///
/// The strict comparison keeps the first of tied maxima, and a zero score
/// never becomes the best, so an all-zero sweep reports no candidate at all.
fn lexical_scan<'a>(item: &ForeignItem, candidates: &[&'a ReferenceEntity]) -> Option<Scored<'a>> {
    let mut best: Option<Scored<'a>> = None;
    for &entity in candidates {
        let code_similarity = string_similarity(&item.code, &entity.code);
        let description_similarity = string_similarity(&item.description, &entity.description);
        let score = composite_score(code_similarity, description_similarity);
        if score > best.as_ref().map_or(0.0, |b| b.score) {
            best = Some(Scored { entity, score });
        }
    }
    best
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn embedding_text(code: &str, description: &str) -> String {
    format!("{code} {description}")
}

fn round_confidence(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use hub_model::EntityId;

    use super::*;

    fn entity(id: &str, code: &str, description: &str) -> ReferenceEntity {
        ReferenceEntity::new(EntityId::new(id).unwrap(), code, description)
    }

    #[test]
    fn confidence_levels() {
        assert_eq!(ConfidenceLevel::from_confidence(100), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(90), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(89), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(70), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(69), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0), ConfidenceLevel::Low);
        assert!(ConfidenceLevel::Low < ConfidenceLevel::High);
    }

    #[test]
    fn rounding_clamps_to_scale() {
        assert_eq!(round_confidence(0.49), 49);
        assert_eq!(round_confidence(0.775), 78);
        assert_eq!(round_confidence(1.0), 100);
        assert_eq!(round_confidence(1.2), 100);
        assert_eq!(round_confidence(-0.1), 0);
    }

    #[test]
    fn lexical_scan_keeps_first_of_ties() {
        let item = ForeignItem::new("AB", "Thing");
        let first = entity("1", "ABX", "Thing");
        let second = entity("2", "ABY", "Thing");
        let candidates = [&first, &second];

        let best = lexical_scan(&item, &candidates).expect("a candidate");
        assert_eq!(best.entity.id, first.id);
    }

    #[test]
    fn lexical_scan_skips_zero_scores() {
        let item = ForeignItem::new("xyz", "qqq");
        let hopeless = entity("1", "aaa", "zzzz");
        let candidates = [&hopeless];

        assert!(lexical_scan(&item, &candidates).is_none());
    }

    #[test]
    fn correction_events_are_deterministic() {
        let resolver = MappingResolver::new(MappingType::Product);
        let item = ForeignItem::new("CIN-PWD-050", "Cinnamon Powder 50 micron");
        let original = MatchResult::new(
            entity("3", "CP-FINE", "Cinnamon Powder (Fine Grade)"),
            62,
            MatchMethod::Fuzzy,
            "Best available match (manual review recommended)",
        );

        let first = resolver.learn_from_correction(&original, &item, "CP-FINE", "reviewer-1");
        let second = resolver.learn_from_correction(&original, &item, "CP-FINE", "reviewer-1");
        assert_eq!(first, second);
        assert_eq!(first.suggested_method, MatchMethod::Fuzzy);
        assert_eq!(first.suggested_entity_id, Some(EntityId::new("3").unwrap()));
        assert_eq!(first.confirmed_code, "CP-FINE");
    }

    #[test]
    fn correction_event_from_none_result() {
        let resolver = MappingResolver::new(MappingType::Unit);
        let item = ForeignItem::new("KGS", "Kilograms");

        let event =
            resolver.learn_from_correction(&MatchResult::none(), &item, "KG", "reviewer-1");
        assert!(event.suggested_entity_id.is_none());
        assert_eq!(event.suggested_method, MatchMethod::None);
    }
}
