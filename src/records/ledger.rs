use super::MatchReport;
use super::PlayerRecord;
use crate::debate::Advocate;
use crate::debate::Trial;
use crate::types::ID;
use std::collections::HashMap;
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Result of applying a match to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Applied,
    AlreadyApplied,
}

/// Consumes finished matches and mutates persisted player records.
/// Application is at-least-once from the caller's side and idempotent by
/// match id on this side; persistence failures are retryable, never fatal
/// to the match itself.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn apply(&self, report: &MatchReport) -> anyhow::Result<Receipt>;
    async fn lookup(&self, player: ID<Advocate>) -> anyhow::Result<Option<PlayerRecord>>;
}

#[derive(Default)]
struct Books {
    records: HashMap<ID<Advocate>, PlayerRecord>,
    applied: HashSet<ID<Trial>>,
}

/// In-memory ledger. One lock over the whole book keeps each
/// read-modify-write atomic per player.
#[derive(Default)]
pub struct MemoryLedger {
    books: Mutex<Books>,
}

#[async_trait::async_trait]
impl Ledger for MemoryLedger {
    async fn apply(&self, report: &MatchReport) -> anyhow::Result<Receipt> {
        let mut books = self.books.lock().await;
        if !books.applied.insert(report.match_id) {
            return Ok(Receipt::AlreadyApplied);
        }
        let pre: Vec<f64> = report
            .seats
            .iter()
            .map(|seat| {
                books
                    .records
                    .get(&seat.player)
                    .map(|r| r.rating)
                    .unwrap_or(super::BASE_RATING)
            })
            .collect();
        for (index, seat) in report.seats.iter().enumerate() {
            let won = seat.player == report.winner;
            let delta = super::delta(pre[index], pre[1 - index], won);
            books
                .records
                .entry(seat.player)
                .or_insert_with(|| PlayerRecord::fresh(seat.player, seat.name.clone()))
                .absorb(seat, won, report.duration_secs, delta);
        }
        log::info!(
            "ledger applied match {} ({} vs {})",
            report.match_id,
            report.seats[0].name,
            report.seats[1].name,
        );
        Ok(Receipt::Applied)
    }

    async fn lookup(&self, player: ID<Advocate>) -> anyhow::Result<Option<PlayerRecord>> {
        Ok(self.books.lock().await.records.get(&player).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::Role;
    use crate::records::RoundLine;
    use crate::records::SeatReport;

    fn report() -> MatchReport {
        let winner = ID::from(uuid::Uuid::from_u128(1));
        let loser = ID::from(uuid::Uuid::from_u128(2));
        MatchReport {
            match_id: ID::from(uuid::Uuid::from_u128(99)),
            room: "courtroom-7".into(),
            duration_secs: 540,
            winner,
            seats: [
                SeatReport {
                    player: winner,
                    name: "ada".into(),
                    scores: vec![80, 70, 60, 50, 50, 50],
                    rounds: vec![
                        RoundLine { role: Role::Attacker, won: Some(true), points: 210 },
                        RoundLine { role: Role::Attacker, won: Some(true), points: 150 },
                    ],
                },
                SeatReport {
                    player: loser,
                    name: "bob".into(),
                    scores: vec![50, 40, 30, 20, 20, 20],
                    rounds: vec![
                        RoundLine { role: Role::Defender, won: Some(false), points: 120 },
                        RoundLine { role: Role::Defender, won: Some(false), points: 60 },
                    ],
                },
            ],
        }
    }

    #[tokio::test]
    async fn applies_once_and_only_once() {
        let ledger = MemoryLedger::default();
        let report = report();
        assert_eq!(ledger.apply(&report).await.unwrap(), Receipt::Applied);
        assert_eq!(ledger.apply(&report).await.unwrap(), Receipt::AlreadyApplied);

        let winner = ledger.lookup(report.winner).await.unwrap().unwrap();
        assert_eq!(winner.games, 1);
        assert_eq!(winner.won, 1);
        assert_eq!(winner.streak, 1);
        // second application changed nothing
        assert!((winner.rating - (super::super::BASE_RATING + 16.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ratings_move_symmetrically() {
        let ledger = MemoryLedger::default();
        let report = report();
        ledger.apply(&report).await.unwrap();
        let winner = ledger.lookup(report.seats[0].player).await.unwrap().unwrap();
        let loser = ledger.lookup(report.seats[1].player).await.unwrap().unwrap();
        let swing = winner.rating - super::super::BASE_RATING;
        assert!(swing > 0.0);
        assert!((loser.rating - (super::super::BASE_RATING - swing)).abs() < 1e-9);
        assert_eq!(loser.lost, 1);
        assert_eq!(loser.streak, 0);
    }

    #[tokio::test]
    async fn unknown_player_lookup_is_none() {
        let ledger = MemoryLedger::default();
        assert!(ledger.lookup(ID::default()).await.unwrap().is_none());
    }
}
