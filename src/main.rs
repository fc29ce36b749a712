//! Match server binary.
//!
//! Serves the join route and WebSocket sessions for live debate rooms.

use clap::Parser;
use gavel::docket::CannedDocket;
use gavel::hosting::Courthouse;
use gavel::hosting::Server;
use gavel::judge::HeuristicJudge;
use gavel::matchroom::RoomConfig;
use gavel::records::Ledger;
use gavel::records::MemoryLedger;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gavel", about = "Real-time courtroom debate match server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Best-of-N rounds; a tie after N forces the side-choice decider.
    #[arg(long, default_value_t = 3)]
    max_rounds: usize,
    /// Arguments each side may submit per round.
    #[arg(long, default_value_t = 3)]
    arguments_per_round: usize,
    /// Case-reading window in seconds.
    #[arg(long, default_value_t = 60)]
    reading_secs: u64,
    /// Per-round deadline in seconds.
    #[arg(long, default_value_t = 240)]
    round_secs: u64,
    /// Bound on a single evaluator call in seconds.
    #[arg(long, default_value_t = 30)]
    judge_secs: u64,
    /// Deadline for the tie-break side choice in seconds.
    #[arg(long, default_value_t = 60)]
    choice_secs: u64,
    /// Reconnection grace after a disconnect in seconds.
    #[arg(long, default_value_t = 60)]
    grace_secs: u64,
    /// How long a room waits for an opponent in seconds.
    #[arg(long, default_value_t = 300)]
    gathering_secs: u64,
    /// Postgres connection string for persistent player records.
    #[cfg(feature = "database")]
    #[arg(long)]
    postgres: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = RoomConfig {
        max_rounds: args.max_rounds,
        arguments_per_round: args.arguments_per_round,
        reading_timeout: Duration::from_secs(args.reading_secs),
        round_timeout: Duration::from_secs(args.round_secs),
        judge_timeout: Duration::from_secs(args.judge_secs),
        choice_timeout: Duration::from_secs(args.choice_secs),
        grace_timeout: Duration::from_secs(args.grace_secs),
        gathering_timeout: Duration::from_secs(args.gathering_secs),
    };
    let ledger = ledger(&args).await?;
    let courthouse = Courthouse::new(
        config,
        Arc::new(CannedDocket::default()),
        Arc::new(HeuristicJudge::default()),
        ledger,
    );
    Server::run(&args.bind, courthouse).await?;
    Ok(())
}

#[cfg(feature = "database")]
async fn ledger(args: &Args) -> anyhow::Result<Arc<dyn Ledger>> {
    let Some(url) = args.postgres.as_deref() else {
        log::info!("no postgres url supplied, records are in-memory");
        return Ok(Arc::new(MemoryLedger::default()));
    };
    let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("postgres connection lost: {}", e);
        }
    });
    gavel::records::migrate(&client).await?;
    log::info!("player records persisted to postgres");
    Ok(Arc::new(gavel::records::PgLedger::new(client)))
}

#[cfg(not(feature = "database"))]
async fn ledger(_: &Args) -> anyhow::Result<Arc<dyn Ledger>> {
    log::info!("records are in-memory, enable the database feature to persist");
    Ok(Arc::new(MemoryLedger::default()))
}
