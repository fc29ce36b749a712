use super::SeatReport;
use crate::debate::Advocate;
use crate::debate::Role;
use crate::types::ID;
use crate::types::Score;

/// Per-role aggregates within a player record.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RoleRecord {
    pub rounds: u32,
    pub won: u32,
    pub points: u64,
}

impl RoleRecord {
    pub fn average_score(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.points as f64 / self.rounds as f64
        }
    }
}

/// Persisted lifetime statistics for one player. Mutated only by the
/// ledger, once per finished match.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayerRecord {
    pub player: ID<Advocate>,
    pub name: String,
    pub games: u32,
    pub won: u32,
    pub lost: u32,
    pub rating: f64,
    pub total_arguments: u32,
    pub score_sum: u64,
    pub best_score: Score,
    pub worst_score: Option<Score>,
    pub rounds_played: u32,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub duration_secs_sum: u64,
    pub streak: u32,
    pub longest_streak: u32,
    pub attacker: RoleRecord,
    pub defender: RoleRecord,
}

impl PlayerRecord {
    pub fn fresh(player: ID<Advocate>, name: String) -> Self {
        Self {
            player,
            name,
            games: 0,
            won: 0,
            lost: 0,
            rating: super::BASE_RATING,
            total_arguments: 0,
            score_sum: 0,
            best_score: 0,
            worst_score: None,
            rounds_played: 0,
            rounds_won: 0,
            rounds_lost: 0,
            duration_secs_sum: 0,
            streak: 0,
            longest_streak: 0,
            attacker: RoleRecord::default(),
            defender: RoleRecord::default(),
        }
    }

    pub fn win_percentage(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.won as f64 / self.games as f64 * 100.0
        }
    }
    pub fn average_score(&self) -> f64 {
        if self.total_arguments == 0 {
            0.0
        } else {
            self.score_sum as f64 / self.total_arguments as f64
        }
    }
    pub fn average_duration_secs(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.duration_secs_sum as f64 / self.games as f64
        }
    }
    /// Role with more rounds played; None while perfectly balanced.
    pub fn preferred_role(&self) -> Option<Role> {
        match self.attacker.rounds.cmp(&self.defender.rounds) {
            std::cmp::Ordering::Greater => Some(Role::Attacker),
            std::cmp::Ordering::Less => Some(Role::Defender),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn role_mut(&mut self, role: Role) -> &mut RoleRecord {
        match role {
            Role::Attacker => &mut self.attacker,
            Role::Defender => &mut self.defender,
        }
    }

    /// Folds one finished match into the record. `delta` is the ELO
    /// adjustment computed against the opponent's pre-match rating.
    pub fn absorb(&mut self, seat: &SeatReport, won: bool, duration_secs: u64, delta: f64) {
        self.name = seat.name.clone();
        self.games += 1;
        self.rating += delta;
        self.duration_secs_sum += duration_secs;
        if won {
            self.won += 1;
            self.streak += 1;
            self.longest_streak = self.longest_streak.max(self.streak);
        } else {
            self.lost += 1;
            self.streak = 0;
        }
        for &score in &seat.scores {
            self.total_arguments += 1;
            self.score_sum += score as u64;
            self.best_score = self.best_score.max(score);
            self.worst_score = Some(self.worst_score.map_or(score, |w| w.min(score)));
        }
        for line in &seat.rounds {
            self.rounds_played += 1;
            match line.won {
                Some(true) => self.rounds_won += 1,
                Some(false) => self.rounds_lost += 1,
                None => {}
            }
            let role = self.role_mut(line.role);
            role.rounds += 1;
            role.points += line.points as u64;
            if line.won == Some(true) {
                role.won += 1;
            }
        }
    }
}
