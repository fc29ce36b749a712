use std::time::Duration;

/// Per-room tunables. Defaults give a best-of-three with three arguments
/// per side per round.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub max_rounds: usize,
    pub arguments_per_round: usize,
    /// Case-reading window before arguing starts regardless of acks.
    pub reading_timeout: Duration,
    /// Deadline for a round; expiry resolves with whatever is scored.
    pub round_timeout: Duration,
    /// Bound on a single evaluator call.
    pub judge_timeout: Duration,
    /// Deadline for the tie-break side choice; expiry keeps the chooser
    /// on their current role.
    pub choice_timeout: Duration,
    /// Reconnection window after a disconnect before abandonment.
    pub grace_timeout: Duration,
    /// How long a room waits for an opponent before giving up.
    pub gathering_timeout: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            arguments_per_round: 3,
            reading_timeout: Duration::from_secs(60),
            round_timeout: Duration::from_secs(240),
            judge_timeout: Duration::from_secs(30),
            choice_timeout: Duration::from_secs(60),
            grace_timeout: Duration::from_secs(60),
            gathering_timeout: Duration::from_secs(300),
        }
    }
}
