use super::Role;
use crate::types::ID;
use crate::types::Score;
use crate::types::Unique;

/// One seated player. Exactly one advocate per role at any time; the two
/// original roles are always complementary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Advocate {
    id: ID<Advocate>,
    name: String,
    original: Role,
    current: Role,
    round_wins: u32,
    total_score: Score,
    connected: bool,
}

impl Advocate {
    pub fn new(id: ID<Advocate>, name: String, role: Role) -> Self {
        Self {
            id,
            name,
            original: role,
            current: role,
            round_wins: 0,
            total_score: 0,
            connected: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn original(&self) -> Role {
        self.original
    }
    pub fn current(&self) -> Role {
        self.current
    }
    pub fn round_wins(&self) -> u32 {
        self.round_wins
    }
    /// Cumulative individual argument score across the match so far.
    pub fn total_score(&self) -> Score {
        self.total_score
    }
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub(super) fn assign(&mut self, role: Role) {
        self.current = role;
    }
    pub(super) fn award_round(&mut self) {
        self.round_wins += 1;
    }
    pub(super) fn accrue(&mut self, score: Score) {
        self.total_score += score;
    }
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Unique for Advocate {
    fn id(&self) -> ID<Advocate> {
        self.id
    }
}
