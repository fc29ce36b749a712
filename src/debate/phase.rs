/// Closed set of trial phases. Every consumer matches exhaustively so a
/// new phase cannot be silently ignored.
///
/// `case-reading` is initial; `finished` and `abandoned` are terminal.
/// `round-complete` is transient: the room broadcasts it, then immediately
/// applies the follow-on transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    CaseReading,
    Arguing,
    RoundComplete,
    SideChoice,
    Finished,
    Abandoned,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Abandoned)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseReading => write!(f, "case-reading"),
            Self::Arguing => write!(f, "arguing"),
            Self::RoundComplete => write!(f, "round-complete"),
            Self::SideChoice => write!(f, "side-choice"),
            Self::Finished => write!(f, "finished"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}
