use super::Advocate;
use super::Role;
use crate::types::ID;

/// Pending or resolved tie-break: the designated chooser picks their role
/// for the deciding round, the opponent takes the complement.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SideChoice {
    chooser: ID<Advocate>,
    chosen: Option<Role>,
}

impl SideChoice {
    pub fn pending(chooser: ID<Advocate>) -> Self {
        Self {
            chooser,
            chosen: None,
        }
    }
    pub fn chooser(&self) -> ID<Advocate> {
        self.chooser
    }
    pub fn chosen(&self) -> Option<Role> {
        self.chosen
    }
    pub(super) fn settle(&mut self, role: Role) {
        self.chosen = Some(role);
    }
}
