#![deny(unsafe_code)]

//! Tiered code-mapping resolution for partner documents.
//!
//! Given a trading partner's code/description pair and a snapshot of the
//! internal reference catalog, the resolver decides which catalog entity the
//! pair corresponds to, with what confidence, and by which method. Stages
//! run in fixed precedence (exact code equality, previously confirmed
//! mappings, lexical similarity, then an optional semantic oracle) and each
//! stage can short-circuit with a sufficiently confident match.

pub mod engine;
pub mod error;
pub mod oracle;
pub mod similarity;
pub mod state;

pub use engine::{ConfidenceLevel, MappingResolver, ResolverOptions};
pub use error::{ResolveError, Result};
pub use oracle::{
    ADJUDICATION_CANDIDATE_CAP, NoOracle, OracleError, OracleJudgment, OracleResult,
    SemanticOracle,
};
pub use similarity::{composite_score, cosine_similarity, string_similarity};
pub use state::{LineStatus, ReviewLine, ReviewSession, ReviewSummary};
