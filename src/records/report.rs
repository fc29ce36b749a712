use crate::debate::Advocate;
use crate::debate::Role;
use crate::debate::Trial;
use crate::types::ID;
use crate::types::RoomId;
use crate::types::Score;
use crate::types::Seat;
use crate::types::Unique;

/// Outcome of a finished match, as handed to the ledger. Built once from
/// the final trial state; the match id keys idempotent application.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub match_id: ID<Trial>,
    pub room: RoomId,
    pub duration_secs: u64,
    pub winner: ID<Advocate>,
    pub seats: [SeatReport; 2],
}

/// One player's share of a finished match.
#[derive(Debug, Clone)]
pub struct SeatReport {
    pub player: ID<Advocate>,
    pub name: String,
    /// Every scored argument this player submitted, in match order.
    pub scores: Vec<Score>,
    /// One line per resolved round.
    pub rounds: Vec<RoundLine>,
}

/// A player's view of one resolved round. `won` is None on a tie.
#[derive(Debug, Clone, Copy)]
pub struct RoundLine {
    pub role: Role,
    pub won: Option<bool>,
    pub points: Score,
}

impl MatchReport {
    /// Extracts the report from a finished trial. Returns None unless the
    /// trial carries a winner.
    pub fn from_trial(room: RoomId, trial: &Trial, duration_secs: u64) -> Option<Self> {
        let winner = trial.winner()?;
        let seats = [Self::seat(trial, 0), Self::seat(trial, 1)];
        Some(Self {
            match_id: trial.id(),
            room,
            duration_secs,
            winner,
            seats,
        })
    }

    fn seat(trial: &Trial, seat: Seat) -> SeatReport {
        let advocate = &trial.advocates()[seat];
        let scores = trial
            .history()
            .iter()
            .flat_map(|round| round.arguments())
            .filter(|a| a.author() == advocate.id())
            .map(|a| a.score().unwrap_or(0))
            .collect();
        let rounds = trial
            .history()
            .iter()
            .map(|round| {
                let role = round.side_of(seat);
                RoundLine {
                    role,
                    won: round.winner().map(|w| w == role),
                    points: round.total(role),
                }
            })
            .collect();
        SeatReport {
            player: advocate.id(),
            name: advocate.name().to_string(),
            scores,
            rounds,
        }
    }
}
