use super::Argument;
use super::Role;
use crate::types::Score;
use crate::types::Seat;

/// One scored unit of argument exchange. Lives as the working round while
/// arguing, then becomes an immutable entry in the trial's history once
/// resolved. Arguments are kept in insertion order, which is turn order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Round {
    index: usize,
    sides: [Role; 2],
    arguments: Vec<Argument>,
    attacker_total: Score,
    defender_total: Score,
    winner: Option<Role>,
    resolved: bool,
}

impl Round {
    /// Opens round `index` (1-based) with each seat's role at round start.
    pub fn open(index: usize, sides: [Role; 2]) -> Self {
        Self {
            index,
            sides,
            arguments: Vec::new(),
            attacker_total: 0,
            defender_total: 0,
            winner: None,
            resolved: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
    pub fn side_of(&self, seat: Seat) -> Role {
        self.sides[seat]
    }
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
    pub fn winner(&self) -> Option<Role> {
        self.winner
    }
    pub fn attacker_total(&self) -> Score {
        self.attacker_total
    }
    pub fn defender_total(&self) -> Score {
        self.defender_total
    }
    pub fn total(&self, role: Role) -> Score {
        match role {
            Role::Attacker => self.attacker_total,
            Role::Defender => self.defender_total,
        }
    }
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Number of arguments submitted for a role so far.
    pub fn count(&self, role: Role) -> usize {
        self.arguments.iter().filter(|a| a.role() == role).count()
    }
    /// True once every submitted argument carries a score.
    pub fn fully_scored(&self) -> bool {
        self.arguments.iter().all(Argument::is_scored)
    }
    /// Running sum of scored arguments for a role.
    pub fn tally(&self, role: Role) -> Score {
        self.arguments
            .iter()
            .filter(|a| a.role() == role)
            .filter_map(Argument::score)
            .sum()
    }

    pub(super) fn push(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }
    pub(super) fn argument_mut(
        &mut self,
        id: crate::types::ID<Argument>,
    ) -> Option<&mut Argument> {
        use crate::types::Unique;
        self.arguments.iter_mut().find(|a| a.id() == id)
    }
    /// Scores any unscored argument as 0. Used on round timeout.
    pub(super) fn zero_unscored(&mut self) {
        for argument in self.arguments.iter_mut().filter(|a| !a.is_scored()) {
            argument.grade(0, None);
        }
    }
    /// Freezes totals and decides the winning role; a tie yields None.
    pub(super) fn resolve(&mut self) -> Option<Role> {
        self.attacker_total = self.tally(Role::Attacker);
        self.defender_total = self.tally(Role::Defender);
        self.winner = match self.attacker_total.cmp(&self.defender_total) {
            std::cmp::Ordering::Greater => Some(Role::Attacker),
            std::cmp::Ordering::Less => Some(Role::Defender),
            std::cmp::Ordering::Equal => None,
        };
        self.resolved = true;
        self.winner
    }
}
