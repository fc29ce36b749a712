use crate::types::ID;

/// A generated legal case. Immutable once assigned to a room; owned
/// exclusively by the trial for the match's lifetime.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Case {
    pub id: ID<Case>,
    pub title: String,
    pub description: String,
    pub context: String,
    pub attacker_side: String,
    pub defender_side: String,
}

impl Case {
    /// Side brief for the given role, as handed to the evaluator.
    pub fn side(&self, role: super::Role) -> &str {
        match role {
            super::Role::Attacker => &self.attacker_side,
            super::Role::Defender => &self.defender_side,
        }
    }
}
