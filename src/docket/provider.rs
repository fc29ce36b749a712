use crate::debate::Case;

/// Case provision failure. Fatal to room creation: the room reports
/// match-creation-failed to both clients and never enters arguing.
#[derive(Debug)]
pub enum DocketError {
    Unavailable(String),
}

impl std::fmt::Display for DocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "case unavailable: {}", reason),
        }
    }
}

impl std::error::Error for DocketError {}

/// Source of legal cases. Pure request/response; no state crosses the
/// boundary beyond the returned record.
#[async_trait::async_trait]
pub trait Docket: Send + Sync {
    async fn pull(&self) -> Result<Case, DocketError>;
}
