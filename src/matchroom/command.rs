use crate::debate::Advocate;
use crate::debate::Argument;
use crate::dto::ClientAction;
use crate::judge::JudgeError;
use crate::judge::Opinion;
use crate::types::ID;
use crate::types::Seat;
use tokio::sync::mpsc::UnboundedSender;

/// Everything that may enter a room's serialized queue. Player actions,
/// evaluator verdicts, and synthetic timer events all travel the same
/// path, which is what guarantees linearizable room state.
pub enum Command {
    /// The registry seated the second player.
    Seat { player: ID<Advocate>, name: String },
    /// A session attached for a seat. `conn` distinguishes connections
    /// so a stale disconnect cannot clobber a fresh session.
    Connect {
        seat: Seat,
        conn: u64,
        link: UnboundedSender<String>,
    },
    /// The session with this conn id closed.
    Disconnect { seat: Seat, conn: u64 },
    /// A player action forwarded by the gateway.
    Action { seat: Seat, action: ClientAction },
    /// Voluntary exit. Unlike a dropped socket there is no grace window;
    /// a live match is forfeited on the spot.
    Leave { seat: Seat },
    /// Evaluator result for a dispatched argument. Stale verdicts are
    /// discarded against the live round by id.
    Verdict {
        round: usize,
        argument: ID<Argument>,
        opinion: Result<Opinion, JudgeError>,
    },
    /// Case-reading window elapsed.
    ReadingExpired,
    /// Round deadline for the given round index elapsed.
    RoundExpired { round: usize },
    /// Side-choice deadline elapsed. `rounds` is the resolved-round count
    /// when the choice opened, so a re-run tie-break gets its own timer.
    ChoiceExpired { rounds: usize },
    /// Reconnection grace for a disconnected seat elapsed.
    GraceExpired { seat: Seat, conn: u64 },
    /// No opponent arrived in time.
    GatheringExpired,
}
