use super::Advocate;
use super::Role;
use crate::types::ID;
use crate::types::Score;
use crate::types::Unique;

/// One submitted argument. Immutable after creation except for the single
/// write of its score when the evaluator's opinion lands.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Argument {
    id: ID<Argument>,
    author: ID<Advocate>,
    role: Role,
    text: String,
    submitted_at: u64,
    round: usize,
    score: Option<Score>,
    analysis: Option<String>,
}

impl Argument {
    pub fn new(author: ID<Advocate>, role: Role, text: String, round: usize) -> Self {
        let submitted_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            id: ID::default(),
            author,
            role,
            text,
            submitted_at,
            round,
            score: None,
            analysis: None,
        }
    }

    pub fn author(&self) -> ID<Advocate> {
        self.author
    }
    pub fn role(&self) -> Role {
        self.role
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn round(&self) -> usize {
        self.round
    }
    pub fn score(&self) -> Option<Score> {
        self.score
    }
    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }
    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Applies the evaluator's opinion. First write wins; a second write
    /// is ignored and reported as not applied.
    pub fn grade(&mut self, score: Score, analysis: Option<String>) -> bool {
        match self.score {
            Some(_) => false,
            None => {
                self.score = Some(score.min(100));
                self.analysis = analysis;
                true
            }
        }
    }
}

impl Unique for Argument {
    fn id(&self) -> ID<Argument> {
        self.id
    }
}
