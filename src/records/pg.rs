use super::Ledger;
use super::MatchReport;
use super::PlayerRecord;
use super::Receipt;
use super::RoleRecord;
use crate::debate::Advocate;
use crate::types::ID;
use tokio::sync::Mutex;
use tokio_postgres::Client;
use tokio_postgres::Transaction;

pub const PLAYERS: &str = "gavel_players";
pub const APPLIED: &str = "gavel_applied_matches";

/// Creates the ledger tables if absent.
pub async fn migrate(client: &Client) -> Result<(), tokio_postgres::Error> {
    client
        .batch_execute(const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            PLAYERS,
            " (
                player_id         UUID PRIMARY KEY,
                name              TEXT NOT NULL,
                games             INTEGER NOT NULL,
                won               INTEGER NOT NULL,
                lost              INTEGER NOT NULL,
                rating            DOUBLE PRECISION NOT NULL,
                total_arguments   INTEGER NOT NULL,
                score_sum         BIGINT NOT NULL,
                best_score        INTEGER NOT NULL,
                worst_score       INTEGER,
                rounds_played     INTEGER NOT NULL,
                rounds_won        INTEGER NOT NULL,
                rounds_lost       INTEGER NOT NULL,
                duration_secs_sum BIGINT NOT NULL,
                streak            INTEGER NOT NULL,
                longest_streak    INTEGER NOT NULL,
                atk_rounds        INTEGER NOT NULL,
                atk_won           INTEGER NOT NULL,
                atk_points        BIGINT NOT NULL,
                def_rounds        INTEGER NOT NULL,
                def_won           INTEGER NOT NULL,
                def_points        BIGINT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ",
            APPLIED,
            " (
                match_id UUID PRIMARY KEY,
                room     TEXT NOT NULL
            );"
        ))
        .await
}

fn hydrate(row: &tokio_postgres::Row) -> PlayerRecord {
    PlayerRecord {
        player: ID::from(row.get::<_, uuid::Uuid>(0)),
        name: row.get(1),
        games: row.get::<_, i32>(2) as u32,
        won: row.get::<_, i32>(3) as u32,
        lost: row.get::<_, i32>(4) as u32,
        rating: row.get(5),
        total_arguments: row.get::<_, i32>(6) as u32,
        score_sum: row.get::<_, i64>(7) as u64,
        best_score: row.get::<_, i32>(8) as u32,
        worst_score: row.get::<_, Option<i32>>(9).map(|w| w as u32),
        rounds_played: row.get::<_, i32>(10) as u32,
        rounds_won: row.get::<_, i32>(11) as u32,
        rounds_lost: row.get::<_, i32>(12) as u32,
        duration_secs_sum: row.get::<_, i64>(13) as u64,
        streak: row.get::<_, i32>(14) as u32,
        longest_streak: row.get::<_, i32>(15) as u32,
        attacker: RoleRecord {
            rounds: row.get::<_, i32>(16) as u32,
            won: row.get::<_, i32>(17) as u32,
            points: row.get::<_, i64>(18) as u64,
        },
        defender: RoleRecord {
            rounds: row.get::<_, i32>(19) as u32,
            won: row.get::<_, i32>(20) as u32,
            points: row.get::<_, i64>(21) as u64,
        },
    }
}

const SELECT: &str = const_format::concatcp!(
    "SELECT player_id, name, games, won, lost, rating, total_arguments, score_sum,
            best_score, worst_score, rounds_played, rounds_won, rounds_lost,
            duration_secs_sum, streak, longest_streak, atk_rounds, atk_won,
            atk_points, def_rounds, def_won, def_points FROM ",
    PLAYERS,
    " WHERE player_id = $1"
);

const MARK: &str = const_format::concatcp!(
    "INSERT INTO ",
    APPLIED,
    " (match_id, room) VALUES ($1, $2) ON CONFLICT (match_id) DO NOTHING"
);

const UPSERT: &str = const_format::concatcp!(
    "INSERT INTO ",
    PLAYERS,
    " (player_id, name, games, won, lost, rating, total_arguments, score_sum,
       best_score, worst_score, rounds_played, rounds_won, rounds_lost,
       duration_secs_sum, streak, longest_streak, atk_rounds, atk_won,
       atk_points, def_rounds, def_won, def_points)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
              $15, $16, $17, $18, $19, $20, $21, $22)
      ON CONFLICT (player_id) DO UPDATE SET
       name = EXCLUDED.name, games = EXCLUDED.games, won = EXCLUDED.won,
       lost = EXCLUDED.lost, rating = EXCLUDED.rating,
       total_arguments = EXCLUDED.total_arguments,
       score_sum = EXCLUDED.score_sum, best_score = EXCLUDED.best_score,
       worst_score = EXCLUDED.worst_score,
       rounds_played = EXCLUDED.rounds_played,
       rounds_won = EXCLUDED.rounds_won, rounds_lost = EXCLUDED.rounds_lost,
       duration_secs_sum = EXCLUDED.duration_secs_sum,
       streak = EXCLUDED.streak, longest_streak = EXCLUDED.longest_streak,
       atk_rounds = EXCLUDED.atk_rounds, atk_won = EXCLUDED.atk_won,
       atk_points = EXCLUDED.atk_points, def_rounds = EXCLUDED.def_rounds,
       def_won = EXCLUDED.def_won, def_points = EXCLUDED.def_points"
);

async fn store(tx: &Transaction<'_>, record: &PlayerRecord) -> Result<(), tokio_postgres::Error> {
    tx.execute(
        UPSERT,
        &[
            &record.player.inner(),
            &record.name,
            &(record.games as i32),
            &(record.won as i32),
            &(record.lost as i32),
            &record.rating,
            &(record.total_arguments as i32),
            &(record.score_sum as i64),
            &(record.best_score as i32),
            &record.worst_score.map(|w| w as i32),
            &(record.rounds_played as i32),
            &(record.rounds_won as i32),
            &(record.rounds_lost as i32),
            &(record.duration_secs_sum as i64),
            &(record.streak as i32),
            &(record.longest_streak as i32),
            &(record.attacker.rounds as i32),
            &(record.attacker.won as i32),
            &(record.attacker.points as i64),
            &(record.defender.rounds as i32),
            &(record.defender.won as i32),
            &(record.defender.points as i64),
        ],
    )
    .await
    .map(|_| ())
}

/// Postgres-backed ledger. Each application runs in one transaction: the
/// applied-matches insert is the idempotency gate, and the record upserts
/// commit with it or not at all, so a mid-flight failure leaves the match
/// unapplied and retryable. The lock serializes applications; a starting
/// transaction needs exclusive use of the connection anyway.
pub struct PgLedger {
    client: Mutex<Client>,
}

impl PgLedger {
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for PgLedger {
    async fn apply(&self, report: &MatchReport) -> anyhow::Result<Receipt> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await?;
        let fresh = tx
            .execute(MARK, &[&report.match_id.inner(), &report.room])
            .await?;
        if fresh == 0 {
            // dropping the transaction rolls back the no-op insert
            return Ok(Receipt::AlreadyApplied);
        }
        let mut records = Vec::with_capacity(2);
        for seat in &report.seats {
            let record = tx
                .query_opt(SELECT, &[&seat.player.inner()])
                .await?
                .map(|row| hydrate(&row))
                .unwrap_or_else(|| PlayerRecord::fresh(seat.player, seat.name.clone()));
            records.push(record);
        }
        let pre = [records[0].rating, records[1].rating];
        for (index, (record, seat)) in records.iter_mut().zip(&report.seats).enumerate() {
            let won = seat.player == report.winner;
            let delta = super::delta(pre[index], pre[1 - index], won);
            record.absorb(seat, won, report.duration_secs, delta);
            store(&tx, record).await?;
        }
        tx.commit().await?;
        Ok(Receipt::Applied)
    }

    async fn lookup(&self, player: ID<Advocate>) -> anyhow::Result<Option<PlayerRecord>> {
        let client = self.client.lock().await;
        Ok(client
            .query_opt(SELECT, &[&player.inner()])
            .await?
            .map(|row| hydrate(&row)))
    }
}
