use super::*;
use crate::debate::Argument;
use crate::debate::Phase;
use crate::debate::Rejection;
use crate::debate::Trial;
use crate::docket::Docket;
use crate::dto::ClientAction;
use crate::dto::ServerMessage;
use crate::dto::TrialSnapshot;
use crate::judge::Brief;
use crate::judge::Judge;
use crate::judge::JudgeError;
use crate::records::Ledger;
use crate::records::MatchReport;
use crate::types::ID;
use crate::types::RoomId;
use crate::types::Seat;
use std::sync::Arc;
use tokio::sync::mpsc::*;
use tokio::time::Instant;

/// One live session attached to a seat.
struct Link {
    conn: u64,
    tx: UnboundedSender<String>,
}

enum Flow {
    Continue,
    Stop,
}

/// Single-owner actor for one match. All room mutation flows through the
/// command queue; the evaluator and every timer feed back into the same
/// queue, so state transitions are applied one at a time in arrival order.
///
/// Terminal handling: `finished` settles the ledger, `abandoned` skips it;
/// both notify the registry's reaper and end the task.
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    docket: Arc<dyn Docket>,
    judge: Arc<dyn Judge>,
    ledger: Arc<dyn Ledger>,
    rx: UnboundedReceiver<Command>,
    tx: UnboundedSender<Command>,
    closer: UnboundedSender<RoomId>,
    roster: Vec<(ID<crate::debate::Advocate>, String)>,
    links: [Option<Link>; 2],
    last_conn: [u64; 2],
    trial: Option<Trial>,
    started: Option<Instant>,
}

impl Room {
    const MAX_ARGUMENT_LEN: usize = 4000;

    /// Spawns the room task with its first player seated and returns the
    /// command endpoint.
    pub fn spawn(
        id: RoomId,
        config: RoomConfig,
        docket: Arc<dyn Docket>,
        judge: Arc<dyn Judge>,
        ledger: Arc<dyn Ledger>,
        closer: UnboundedSender<RoomId>,
        first: (ID<crate::debate::Advocate>, String),
    ) -> UnboundedSender<Command> {
        let (tx, rx) = unbounded_channel();
        let room = Self {
            id,
            config,
            docket,
            judge,
            ledger,
            rx,
            tx: tx.clone(),
            closer,
            roster: vec![first],
            links: [None, None],
            last_conn: [0, 0],
            trial: None,
            started: None,
        };
        tokio::spawn(room.run());
        tx
    }

    async fn run(mut self) {
        self.arm(self.config.gathering_timeout, Command::GatheringExpired);
        while let Some(command) = self.rx.recv().await {
            if let Flow::Stop = self.handle(command).await {
                break;
            }
        }
        log::info!("room {}: closed", self.id);
        let _ = self.closer.send(self.id.clone());
    }

    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Seat { player, name } => self.on_seat(player, name).await,
            Command::Connect { seat, conn, link } => self.on_connect(seat, conn, link),
            Command::Disconnect { seat, conn } => self.on_disconnect(seat, conn),
            Command::Action { seat, action } => self.on_action(seat, action),
            Command::Leave { seat } => self.on_leave(seat),
            Command::Verdict {
                round,
                argument,
                opinion,
            } => self.on_verdict(round, argument, opinion).await,
            Command::ReadingExpired => self.on_reading_expired(),
            Command::RoundExpired { round } => self.on_round_expired(round).await,
            Command::ChoiceExpired { rounds } => self.on_choice_expired(rounds),
            Command::GraceExpired { seat, conn } => self.on_grace_expired(seat, conn).await,
            Command::GatheringExpired => self.on_gathering_expired(),
        }
    }
}

/// Seating and match creation.
impl Room {
    async fn on_seat(&mut self, player: ID<crate::debate::Advocate>, name: String) -> Flow {
        if self.roster.len() >= 2 {
            log::warn!("room {}: ignoring extra seat request", self.id);
            return Flow::Continue;
        }
        self.roster.push((player, name));
        match self.docket.pull().await {
            Ok(case) => {
                log::info!("room {}: match starting over case '{}'", self.id, case.title);
                let mut trial = Trial::new(
                    case,
                    self.roster[0].clone(),
                    self.roster[1].clone(),
                    self.config.max_rounds,
                    self.config.arguments_per_round,
                );
                for seat in 0..2 {
                    trial.set_connected(seat, self.links[seat].is_some());
                }
                self.trial = Some(trial);
                self.started = Some(Instant::now());
                self.arm(self.config.reading_timeout, Command::ReadingExpired);
                self.broadcast_state();
                Flow::Continue
            }
            Err(e) => {
                log::error!("room {}: {}", self.id, e);
                self.broadcast(&ServerMessage::Fatal {
                    reason: "match-creation-failed".to_string(),
                });
                Flow::Stop
            }
        }
    }

    fn on_gathering_expired(&mut self) -> Flow {
        if self.trial.is_some() {
            return Flow::Continue;
        }
        log::info!("room {}: no opponent arrived, closing", self.id);
        self.broadcast(&ServerMessage::Fatal {
            reason: "no opponent joined".to_string(),
        });
        Flow::Stop
    }
}

/// Session liveness.
impl Room {
    fn on_connect(&mut self, seat: Seat, conn: u64, link: UnboundedSender<String>) -> Flow {
        self.links[seat] = Some(Link { conn, tx: link });
        self.last_conn[seat] = conn;
        if let Some(trial) = self.trial.as_mut() {
            trial.set_connected(seat, true);
        }
        log::info!("room {}: seat {} connected", self.id, seat);
        // reconnecting clients get the current full snapshot, never a diff
        self.broadcast_state();
        Flow::Continue
    }

    fn on_disconnect(&mut self, seat: Seat, conn: u64) -> Flow {
        match self.links[seat] {
            Some(ref link) if link.conn == conn => {}
            _ => return Flow::Continue,
        }
        self.links[seat] = None;
        if let Some(trial) = self.trial.as_mut() {
            trial.set_connected(seat, false);
        }
        log::info!("room {}: seat {} disconnected", self.id, seat);
        self.arm(self.config.grace_timeout, Command::GraceExpired { seat, conn });
        self.broadcast_state();
        Flow::Continue
    }

    fn on_leave(&mut self, seat: Seat) -> Flow {
        if let Some(trial) = self.trial.as_mut() {
            if !trial.abandon() {
                return Flow::Continue;
            }
        }
        log::info!("room {}: seat {} left, abandoning", self.id, seat);
        self.broadcast_state();
        Flow::Stop
    }

    async fn on_grace_expired(&mut self, seat: Seat, conn: u64) -> Flow {
        if self.links[seat].is_some() || self.last_conn[seat] != conn {
            return Flow::Continue;
        }
        if let Some(trial) = self.trial.as_mut() {
            if !trial.abandon() {
                return Flow::Continue;
            }
        }
        log::info!("room {}: abandoned, seat {} never returned", self.id, seat);
        self.broadcast_state();
        Flow::Stop
    }
}

/// Player actions.
impl Room {
    fn on_action(&mut self, seat: Seat, action: ClientAction) -> Flow {
        let Some(trial) = self.trial.as_mut() else {
            self.reject(seat, Rejection::InvalidAction);
            return Flow::Continue;
        };
        match action {
            ClientAction::AcknowledgeCase => match trial.acknowledge(seat) {
                Ok(advanced) => {
                    if advanced {
                        let round = trial.current_round().map(|r| r.index()).unwrap_or(1);
                        self.arm(self.config.round_timeout, Command::RoundExpired { round });
                    }
                    self.broadcast_state();
                }
                Err(rejection) => self.reject(seat, rejection),
            },
            ClientAction::SubmitArgument { text } => {
                let text = text.trim().to_string();
                if text.is_empty() || text.len() > Self::MAX_ARGUMENT_LEN {
                    self.reject(seat, Rejection::InvalidAction);
                    return Flow::Continue;
                }
                match trial.submit(seat, text.clone()) {
                    Ok(argument) => {
                        let round = trial.current_round().map(|r| r.index()).unwrap_or(0);
                        let role = trial.advocates()[seat].current();
                        let brief = Brief {
                            argument: text,
                            role,
                            side: trial.case().side(role).to_string(),
                            context: trial.case().context.clone(),
                        };
                        self.dispatch(argument, round, brief);
                        self.broadcast_state();
                    }
                    Err(rejection) => self.reject(seat, rejection),
                }
            }
            ClientAction::ChooseSide { side } => match trial.choose_side(seat, side) {
                Ok(()) => {
                    let round = trial.current_round().map(|r| r.index()).unwrap_or(0);
                    self.arm(self.config.round_timeout, Command::RoundExpired { round });
                    self.broadcast_state();
                }
                Err(rejection) => self.reject(seat, rejection),
            },
        }
        Flow::Continue
    }

    fn reject(&self, seat: Seat, rejection: Rejection) {
        log::debug!("room {}: rejected seat {}: {}", self.id, seat, rejection);
        self.unicast(seat, &ServerMessage::rejected(rejection));
    }
}

/// Evaluation and round resolution.
impl Room {
    /// Sends one argument out for review. The call is bounded by the
    /// judge timeout and its result re-enters the command queue, so a
    /// slow evaluator can never block or race the room.
    fn dispatch(&self, argument: ID<Argument>, round: usize, brief: Brief) {
        log::debug!("room {}: dispatching argument {} for review", self.id, argument);
        let judge = self.judge.clone();
        let feedback = self.tx.clone();
        let limit = self.config.judge_timeout;
        tokio::spawn(async move {
            let opinion = match tokio::time::timeout(limit, judge.review(brief)).await {
                Ok(result) => result,
                Err(_) => Err(JudgeError::Timeout),
            };
            let _ = feedback.send(Command::Verdict {
                round,
                argument,
                opinion,
            });
        });
    }

    async fn on_verdict(
        &mut self,
        round: usize,
        argument: ID<Argument>,
        opinion: Result<crate::judge::Opinion, JudgeError>,
    ) -> Flow {
        let (score, analysis) = match opinion {
            Ok(opinion) => (opinion.score, Some(opinion.analysis)),
            Err(e) => {
                log::warn!("room {}: evaluation failed for {}: {}", self.id, argument, e);
                (0, Some("unavailable".to_string()))
            }
        };
        let Some(trial) = self.trial.as_mut() else {
            return Flow::Continue;
        };
        if !trial.grade(argument, round, score, analysis) {
            log::debug!(
                "room {}: discarded stale verdict for {} (round {})",
                self.id,
                argument,
                round
            );
            return Flow::Continue;
        }
        if self.trial.as_mut().is_some_and(|t| t.try_resolve()) {
            self.after_resolution().await
        } else {
            self.broadcast_state();
            Flow::Continue
        }
    }

    fn on_reading_expired(&mut self) -> Flow {
        let Some(trial) = self.trial.as_mut() else {
            return Flow::Continue;
        };
        if trial.expire_reading() {
            log::info!("room {}: reading window elapsed, arguing begins", self.id);
            let round = trial.current_round().map(|r| r.index()).unwrap_or(1);
            self.arm(self.config.round_timeout, Command::RoundExpired { round });
            self.broadcast_state();
        }
        Flow::Continue
    }

    async fn on_round_expired(&mut self, round: usize) -> Flow {
        let Some(trial) = self.trial.as_mut() else {
            return Flow::Continue;
        };
        if trial.expire_round(round) {
            log::info!("room {}: round {} resolved by deadline", self.id, round);
            self.after_resolution().await
        } else {
            Flow::Continue
        }
    }

    fn on_choice_expired(&mut self, rounds: usize) -> Flow {
        let Some(trial) = self.trial.as_mut() else {
            return Flow::Continue;
        };
        if trial.expire_choice(rounds) {
            log::info!("room {}: side choice defaulted by deadline", self.id);
            let round = trial.current_round().map(|r| r.index()).unwrap_or(0);
            self.arm(self.config.round_timeout, Command::RoundExpired { round });
            self.broadcast_state();
        }
        Flow::Continue
    }

    /// The trial is parked in round-complete: broadcast that snapshot,
    /// advance, and broadcast the follow-on phase.
    async fn after_resolution(&mut self) -> Flow {
        self.broadcast_state();
        let Some(trial) = self.trial.as_mut() else {
            return Flow::Continue;
        };
        let phase = trial.advance();
        let round = trial.current_round().map(|r| r.index());
        let rounds = trial.history().len();
        log::info!("room {}: entering {}", self.id, phase);
        match phase {
            Phase::Arguing => {
                if let Some(round) = round {
                    self.arm(self.config.round_timeout, Command::RoundExpired { round });
                }
                self.broadcast_state();
                Flow::Continue
            }
            Phase::SideChoice => {
                self.arm(self.config.choice_timeout, Command::ChoiceExpired { rounds });
                self.broadcast_state();
                Flow::Continue
            }
            Phase::Finished => {
                self.broadcast_state();
                self.settle().await;
                Flow::Stop
            }
            Phase::CaseReading | Phase::RoundComplete | Phase::Abandoned => {
                self.broadcast_state();
                Flow::Continue
            }
        }
    }

    /// Applies the finished match to the ledger, at-least-once. The
    /// ledger is idempotent by match id, so retries are safe.
    async fn settle(&self) {
        let Some(trial) = self.trial.as_ref() else {
            return;
        };
        let duration = self.started.map(|t| t.elapsed().as_secs()).unwrap_or(0);
        let Some(report) = MatchReport::from_trial(self.id.clone(), trial, duration) else {
            log::error!("room {}: finished without a winner, not settling", self.id);
            return;
        };
        for attempt in 1..=3 {
            match self.ledger.apply(&report).await {
                Ok(receipt) => {
                    log::info!("room {}: match {} settled ({:?})", self.id, report.match_id, receipt);
                    return;
                }
                Err(e) => log::warn!(
                    "room {}: ledger attempt {} for match {} failed: {}",
                    self.id,
                    attempt,
                    report.match_id,
                    e
                ),
            }
        }
        log::error!("room {}: giving up settling match {}", self.id, report.match_id);
    }
}

/// Fan-out.
impl Room {
    fn view(&self) -> ServerMessage {
        match self.trial.as_ref() {
            Some(trial) => ServerMessage::State {
                snapshot: TrialSnapshot::from(trial),
            },
            None => ServerMessage::Waiting {
                room: self.id.clone(),
                players: self.roster.iter().map(|(_, name)| name.clone()).collect(),
            },
        }
    }

    fn broadcast_state(&self) {
        self.broadcast(&self.view());
    }

    fn broadcast(&self, message: &ServerMessage) {
        let json = message.json();
        for (seat, link) in self.links.iter().enumerate() {
            if let Some(link) = link {
                if link.tx.send(json.clone()).is_err() {
                    log::warn!("room {}: failed broadcast to seat {}", self.id, seat);
                }
            }
        }
    }

    fn unicast(&self, seat: Seat, message: &ServerMessage) {
        if let Some(link) = self.links[seat].as_ref() {
            if link.tx.send(message.json()).is_err() {
                log::warn!("room {}: failed unicast to seat {}", self.id, seat);
            }
        }
    }

    fn arm(&self, after: std::time::Duration, command: Command) {
        let feedback = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = feedback.send(command);
        });
    }
}
