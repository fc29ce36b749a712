/// Action-level rejections. Returned only to the originating connection,
/// never broadcast; room state is unchanged by a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rejection {
    /// Malformed or unrecognized action, or an action in the wrong phase.
    InvalidAction,
    /// Submission from the player who does not own the turn, or a side
    /// choice from the non-chooser.
    OutOfTurn,
    /// Submission beyond the per-round cap, or while scoring is pending.
    RoundFull,
    /// Unknown room or unseated player.
    NotFound,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAction => write!(f, "invalid action"),
            Self::OutOfTurn => write!(f, "out of turn"),
            Self::RoundFull => write!(f, "round is full"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for Rejection {}
