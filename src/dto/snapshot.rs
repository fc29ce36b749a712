use crate::debate::Advocate;
use crate::debate::Case;
use crate::debate::Phase;
use crate::debate::Rejection;
use crate::debate::Role;
use crate::debate::Round;
use crate::debate::SideChoice;
use crate::debate::Trial;
use crate::types::ID;
use crate::types::RoomId;
use crate::types::Unique;

/// Complete read-only view of a trial, rebuilt and broadcast after every
/// accepted transition. Reconnecting clients receive this, never a diff.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrialSnapshot {
    pub match_id: ID<Trial>,
    pub phase: Phase,
    pub case: Case,
    pub advocates: [Advocate; 2],
    pub acked: [bool; 2],
    pub turn: Option<Role>,
    pub max_rounds: usize,
    pub arguments_per_round: usize,
    pub current_round: Option<Round>,
    pub history: Vec<Round>,
    pub side_choice: Option<SideChoice>,
    pub winner: Option<ID<Advocate>>,
}

impl From<&Trial> for TrialSnapshot {
    fn from(trial: &Trial) -> Self {
        Self {
            match_id: trial.id(),
            phase: trial.phase(),
            case: trial.case().clone(),
            advocates: trial.advocates().clone(),
            acked: trial.acked(),
            turn: trial.turn(),
            max_rounds: trial.max_rounds(),
            arguments_per_round: trial.cap(),
            current_round: trial.current_round().cloned(),
            history: trial.history().to_vec(),
            side_choice: trial.side_choice().cloned(),
            winner: trial.winner(),
        }
    }
}

/// Everything the server sends down a session.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Pre-match roster notice while the room waits for an opponent.
    Waiting { room: RoomId, players: Vec<String> },
    /// Authoritative full-state broadcast.
    State { snapshot: TrialSnapshot },
    /// Targeted rejection; sent only to the offending connection.
    Rejected { reason: Rejection, detail: String },
    /// Room-fatal notice, broadcast to all participants.
    Fatal { reason: String },
}

impl ServerMessage {
    pub fn rejected(reason: Rejection) -> Self {
        Self::Rejected {
            reason,
            detail: reason.to_string(),
        }
    }
    pub fn json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("failed to serialize server message: {}", e);
            r#"{"type":"fatal","reason":"serialization failure"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_with_kebab_phases() {
        let trial = Trial::new(
            Case {
                id: ID::default(),
                title: "t".into(),
                description: "d".into(),
                context: "c".into(),
                attacker_side: "a".into(),
                defender_side: "b".into(),
            },
            (ID::default(), "ada".into()),
            (ID::default(), "bob".into()),
            3,
            3,
        );
        let message = ServerMessage::State {
            snapshot: TrialSnapshot::from(&trial),
        };
        let json = message.json();
        assert!(json.contains(r#""phase":"case-reading""#));
        assert!(json.contains(r#""type":"state""#));
    }
}
