use crate::debate::Role;
use crate::types::Score;

/// Everything the evaluator sees about one argument.
#[derive(Debug, Clone)]
pub struct Brief {
    pub argument: String,
    pub role: Role,
    pub side: String,
    pub context: String,
}

/// The evaluator's verdict on one argument.
#[derive(Debug, Clone)]
pub struct Opinion {
    pub score: Score,
    pub analysis: String,
}

/// Evaluation failure. Recovered locally: the room applies a default
/// score of 0 and an analysis of "unavailable" rather than blocking the
/// round. Never surfaced as a match-ending failure.
#[derive(Debug)]
pub enum JudgeError {
    Timeout,
    Unavailable(String),
}

impl std::fmt::Display for JudgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "evaluation timed out"),
            Self::Unavailable(reason) => write!(f, "evaluation failed: {}", reason),
        }
    }
}

impl std::error::Error for JudgeError {}

/// Scores arguments. Implementations may be slow or fail; the room
/// bounds each call with a deadline and serializes results through its
/// own queue, so a judge never touches room state directly.
#[async_trait::async_trait]
pub trait Judge: Send + Sync {
    async fn review(&self, brief: Brief) -> Result<Opinion, JudgeError>;
}
