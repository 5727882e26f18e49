//! Semantic oracle capability.
//!
//! The oracle is an optional external backend with two operations: embedding
//! text into vectors and adjudicating hard cases with a structured judgment.
//! It is injected into the resolver as a capability object rather than read
//! from process-wide configuration, so tests can substitute a deterministic
//! fake. Oracle failures never escape the pipeline: every error here is
//! translated into a stage miss.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hub_model::{ForeignItem, MappingType, ReferenceEntity};

/// Upper bound on candidates submitted for adjudication.
pub const ADJUDICATION_CANDIDATE_CAP: usize = 20;

/// Errors from an oracle backend.
///
/// All of these are recovered inside the resolution pipeline; callers of
/// `suggest` never see them.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Backend not reachable or not configured.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    /// Call exceeded the resolver's time budget.
    #[error("oracle call timed out")]
    Timeout,
    /// Response missing expected fields.
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),
}

pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Structured judgment from the generative adjudication call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleJudgment {
    /// Candidate code the backend picked, if any.
    pub matched_code: Option<String>,
    /// Backend-reported confidence, 0-100.
    pub confidence: u8,
    pub reasoning: String,
}

impl OracleJudgment {
    /// Parses a JSON judgment.
    ///
    /// Backends that receive raw model output can route it through here;
    /// parse failures become [`OracleError::MalformedResponse`].
    pub fn from_json(raw: &str) -> OracleResult<Self> {
        serde_json::from_str(raw).map_err(|err| OracleError::MalformedResponse(err.to_string()))
    }
}

/// External semantic backend: embeddings plus generative adjudication.
///
/// Implementations wrap whatever concrete service a deployment uses; the
/// resolver depends only on this contract.
#[allow(async_fn_in_trait)]
pub trait SemanticOracle {
    /// Embeds a single text into a vector.
    async fn embed(&self, text: &str) -> OracleResult<Vec<f32>>;

    /// Embeds a batch of texts, one vector per input, in order.
    ///
    /// The default runs [`Self::embed`] sequentially; backends with a real
    /// batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> OracleResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Asks the backend to pick the best candidate for a foreign item.
    ///
    /// The resolver caps `candidates` at [`ADJUDICATION_CANDIDATE_CAP`].
    async fn adjudicate(
        &self,
        item: &ForeignItem,
        candidates: &[ReferenceEntity],
        mapping_type: MappingType,
    ) -> OracleResult<OracleJudgment>;
}

/// The absent oracle: every call reports the backend as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOracle;

impl SemanticOracle for NoOracle {
    async fn embed(&self, _text: &str) -> OracleResult<Vec<f32>> {
        Err(OracleError::Unavailable("no oracle configured".to_string()))
    }

    async fn adjudicate(
        &self,
        _item: &ForeignItem,
        _candidates: &[ReferenceEntity],
        _mapping_type: MappingType,
    ) -> OracleResult<OracleJudgment> {
        Err(OracleError::Unavailable("no oracle configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judgment_parses_from_json() {
        let judgment =
            OracleJudgment::from_json(r#"{"matchedCode":"KG","confidence":85,"reasoning":"unit"}"#)
                .expect("parse judgment");
        assert_eq!(judgment.matched_code.as_deref(), Some("KG"));
        assert_eq!(judgment.confidence, 85);
    }

    #[test]
    fn judgment_null_code_parses() {
        let judgment =
            OracleJudgment::from_json(r#"{"matchedCode":null,"confidence":0,"reasoning":"none"}"#)
                .expect("parse judgment");
        assert!(judgment.matched_code.is_none());
    }

    #[test]
    fn malformed_judgment_is_reported() {
        let err = OracleJudgment::from_json("{\"confidence\":85}").unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn no_oracle_is_unavailable() {
        let item = ForeignItem::new("KG", "Kilogram");
        assert!(matches!(
            NoOracle.embed("KG Kilogram").await,
            Err(OracleError::Unavailable(_))
        ));
        assert!(matches!(
            NoOracle.adjudicate(&item, &[], MappingType::Unit).await,
            Err(OracleError::Unavailable(_))
        ));
    }
}
