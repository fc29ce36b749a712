use super::*;
use crate::types::ID;
use crate::types::Score;
use crate::types::Seat;
use crate::types::Unique;

/// Authoritative state machine for one match between exactly two players.
///
/// Pure core: no channels, no clocks, no I/O.
/// The matchroom shell feeds it player actions, evaluator opinions, and
/// synthetic timeout events through a serialized queue, and broadcasts a
/// snapshot after every accepted transition.
///
/// Phase graph:
/// `case-reading → arguing → round-complete → {arguing | side-choice | finished}`
/// with `side-choice → arguing`, and `abandoned` reachable from any
/// non-terminal phase.
#[derive(Debug, Clone)]
pub struct Trial {
    id: ID<Trial>,
    case: Case,
    advocates: [Advocate; 2],
    acked: [bool; 2],
    phase: Phase,
    round: Option<Round>,
    history: Vec<Round>,
    side_choice: Option<SideChoice>,
    winner: Option<ID<Advocate>>,
    max_rounds: usize,
    cap: usize,
}

impl Trial {
    /// Seats two players over a case. Seat 0 opens as attacker, seat 1 as
    /// defender; the match starts in case-reading.
    pub fn new(
        case: Case,
        first: (ID<Advocate>, String),
        second: (ID<Advocate>, String),
        max_rounds: usize,
        cap: usize,
    ) -> Self {
        Self {
            id: ID::default(),
            case,
            advocates: [
                Advocate::new(first.0, first.1, Role::Attacker),
                Advocate::new(second.0, second.1, Role::Defender),
            ],
            acked: [false; 2],
            phase: Phase::CaseReading,
            round: None,
            history: Vec::new(),
            side_choice: None,
            winner: None,
            max_rounds,
            cap,
        }
    }

    pub fn case(&self) -> &Case {
        &self.case
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn advocates(&self) -> &[Advocate; 2] {
        &self.advocates
    }
    pub fn advocate(&self, seat: Seat) -> &Advocate {
        &self.advocates[seat]
    }
    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }
    pub fn history(&self) -> &[Round] {
        &self.history
    }
    pub fn side_choice(&self) -> Option<&SideChoice> {
        self.side_choice.as_ref()
    }
    pub fn winner(&self) -> Option<ID<Advocate>> {
        self.winner
    }
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }
    pub fn cap(&self) -> usize {
        self.cap
    }
    pub fn seat_of(&self, player: ID<Advocate>) -> Option<Seat> {
        self.advocates.iter().position(|a| a.id() == player)
    }
    pub fn acked(&self) -> [bool; 2] {
        self.acked
    }
    pub fn set_connected(&mut self, seat: Seat, connected: bool) {
        self.advocates[seat].set_connected(connected);
    }

    /// Role that owns the turn, when a submission would be accepted.
    /// Strict alternation: attacker opens, defender answers.
    pub fn turn(&self) -> Option<Role> {
        if self.phase != Phase::Arguing {
            return None;
        }
        let round = self.round.as_ref()?;
        let attacker = round.count(Role::Attacker);
        let defender = round.count(Role::Defender);
        if attacker == defender && attacker < self.cap {
            Some(Role::Attacker)
        } else if attacker == defender + 1 && defender < self.cap {
            Some(Role::Defender)
        } else {
            None
        }
    }
}

/// Player actions.
impl Trial {
    /// Records a case acknowledgement. Returns true when the trial moved
    /// into arguing (both acked).
    pub fn acknowledge(&mut self, seat: Seat) -> Result<bool, Rejection> {
        if self.phase != Phase::CaseReading {
            return Err(Rejection::InvalidAction);
        }
        self.acked[seat] = true;
        if self.acked.iter().all(|&a| a) {
            self.begin_round();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Forces case-reading to end on timeout. Returns true if it fired.
    pub fn expire_reading(&mut self) -> bool {
        if self.phase == Phase::CaseReading {
            self.begin_round();
            true
        } else {
            false
        }
    }

    /// Accepts an argument from the seat holding the turn. The argument
    /// is recorded unscored; the shell dispatches it to the evaluator.
    pub fn submit(&mut self, seat: Seat, text: String) -> Result<ID<Argument>, Rejection> {
        if self.phase != Phase::Arguing {
            return Err(Rejection::InvalidAction);
        }
        let role = self.advocates[seat].current();
        let author = self.advocates[seat].id();
        let cap = self.cap;
        let round = self.round.as_mut().ok_or(Rejection::InvalidAction)?;
        if round.count(role) >= cap {
            return Err(Rejection::RoundFull);
        }
        let attacker = round.count(Role::Attacker);
        let defender = round.count(Role::Defender);
        let owner = if attacker == defender {
            Role::Attacker
        } else {
            Role::Defender
        };
        if role != owner {
            return Err(Rejection::OutOfTurn);
        }
        let argument = Argument::new(author, role, text, round.index());
        let id = argument.id();
        round.push(argument);
        Ok(id)
    }

    /// Resolves the tie-break: the chooser takes a role, the opponent the
    /// complement, and the deciding round begins.
    pub fn choose_side(&mut self, seat: Seat, role: Role) -> Result<(), Rejection> {
        if self.phase != Phase::SideChoice {
            return Err(Rejection::InvalidAction);
        }
        let choice = self.side_choice.as_mut().ok_or(Rejection::InvalidAction)?;
        if self.advocates[seat].id() != choice.chooser() {
            return Err(Rejection::OutOfTurn);
        }
        choice.settle(role);
        self.advocates[seat].assign(role);
        self.advocates[1 - seat].assign(role.opposite());
        self.begin_round();
        Ok(())
    }
}

/// Evaluator opinions and timeouts.
impl Trial {
    /// Applies a score to a still-live argument. Returns false, leaving
    /// state untouched, for stale opinions: wrong phase, wrong round, an
    /// unknown argument id, or an argument already scored.
    pub fn grade(
        &mut self,
        argument: ID<Argument>,
        round_index: usize,
        score: Score,
        analysis: Option<String>,
    ) -> bool {
        if self.phase != Phase::Arguing {
            return false;
        }
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        if round.index() != round_index {
            return false;
        }
        let Some(live) = round.argument_mut(argument) else {
            return false;
        };
        let author = live.author();
        let score = score.min(100);
        if !live.grade(score, analysis) {
            return false;
        }
        if let Some(seat) = self.seat_of(author) {
            self.advocates[seat].accrue(score);
        }
        true
    }

    /// True once both caps are exhausted and every argument is scored.
    pub fn round_ready(&self) -> bool {
        match (self.phase, self.round.as_ref()) {
            (Phase::Arguing, Some(round)) => {
                round.count(Role::Attacker) >= self.cap
                    && round.count(Role::Defender) >= self.cap
                    && round.fully_scored()
            }
            _ => false,
        }
    }

    /// Resolves the round if it is ready. Leaves the trial parked in
    /// round-complete; the shell broadcasts and then calls `advance`.
    pub fn try_resolve(&mut self) -> bool {
        if self.round_ready() {
            self.resolve_round();
            true
        } else {
            false
        }
    }

    /// Round deadline: unscored submissions default to 0 and the round
    /// resolves with whatever is on the table. Stale expiries (an earlier
    /// round, or a phase other than arguing) are ignored.
    pub fn expire_round(&mut self, round_index: usize) -> bool {
        match (self.phase, self.round.as_mut()) {
            (Phase::Arguing, Some(round)) if round.index() == round_index => {
                round.zero_unscored();
                self.resolve_round();
                true
            }
            _ => false,
        }
    }

    /// Side-choice deadline: the chooser defaults to their current role
    /// and the deciding round begins. `rounds` is the resolved-round
    /// count when the choice opened; stale expiries are ignored.
    pub fn expire_choice(&mut self, rounds: usize) -> bool {
        if self.phase != Phase::SideChoice || self.history.len() != rounds {
            return false;
        }
        let Some(chooser) = self.side_choice.as_ref().map(SideChoice::chooser) else {
            return false;
        };
        let Some(seat) = self.seat_of(chooser) else {
            return false;
        };
        let role = self.advocates[seat].current();
        self.choose_side(seat, role).is_ok()
    }

    /// Moves on from round-complete: next round, side-choice, or finished.
    /// Returns the phase entered.
    pub fn advance(&mut self) -> Phase {
        if self.phase != Phase::RoundComplete {
            return self.phase;
        }
        let needed = (self.max_rounds / 2 + 1) as u32;
        let wins = [
            self.advocates[0].round_wins(),
            self.advocates[1].round_wins(),
        ];
        if let Some(seat) = (0..2).find(|&s| wins[s] >= needed) {
            self.finish(seat);
        } else if self.history.len() >= self.max_rounds {
            match wins[0].cmp(&wins[1]) {
                std::cmp::Ordering::Greater => self.finish(0),
                std::cmp::Ordering::Less => self.finish(1),
                std::cmp::Ordering::Equal => self.open_side_choice(),
            }
        } else {
            self.begin_round();
        }
        self.phase
    }

    /// Marks the trial abandoned unless already terminal.
    pub fn abandon(&mut self) -> bool {
        if self.phase.is_terminal() {
            false
        } else {
            self.phase = Phase::Abandoned;
            true
        }
    }
}

impl Trial {
    fn begin_round(&mut self) {
        let index = self.history.len() + 1;
        let sides = [self.advocates[0].current(), self.advocates[1].current()];
        self.round = Some(Round::open(index, sides));
        self.phase = Phase::Arguing;
    }

    fn resolve_round(&mut self) {
        let Some(mut round) = self.round.take() else {
            return;
        };
        if let Some(winner) = round.resolve() {
            if let Some(seat) = (0..2).find(|&s| self.advocates[s].current() == winner) {
                self.advocates[seat].award_round();
            }
        }
        self.history.push(round);
        self.phase = Phase::RoundComplete;
    }

    /// Designates the tie-break chooser: strictly higher cumulative
    /// argument score, falling back to the lexicographically smaller
    /// player id on an exact tie. Deterministic by construction.
    fn open_side_choice(&mut self) {
        let a = &self.advocates[0];
        let b = &self.advocates[1];
        let chooser = match a.total_score().cmp(&b.total_score()) {
            std::cmp::Ordering::Greater => a.id(),
            std::cmp::Ordering::Less => b.id(),
            std::cmp::Ordering::Equal => a.id().min(b.id()),
        };
        self.side_choice = Some(SideChoice::pending(chooser));
        self.phase = Phase::SideChoice;
    }

    fn finish(&mut self, seat: Seat) {
        self.winner = Some(self.advocates[seat].id());
        self.phase = Phase::Finished;
    }
}

impl Unique for Trial {
    fn id(&self) -> ID<Trial> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> Case {
        Case {
            id: ID::default(),
            title: "The Crown v. Vole".into(),
            description: "A widow's estate, a new will, a missing alibi.".into(),
            context: "The defendant inherited under a will signed days before the death.".into(),
            attacker_side: "Prove the will was procured by fraud.".into(),
            defender_side: "Show the will reflects the deceased's wishes.".into(),
        }
    }

    fn seated() -> Trial {
        let p0 = (ID::from(uuid::Uuid::from_u128(1)), "ada".to_string());
        let p1 = (ID::from(uuid::Uuid::from_u128(2)), "bob".to_string());
        Trial::new(case(), p0, p1, 3, 3)
    }

    fn arguing() -> Trial {
        let mut trial = seated();
        assert!(!trial.acknowledge(0).unwrap());
        assert!(trial.acknowledge(1).unwrap());
        trial
    }

    /// Plays one full round with the given per-argument scores and walks
    /// the trial through resolution and advancement.
    fn play_round(trial: &mut Trial, attacker: [u32; 3], defender: [u32; 3]) -> Phase {
        let index = trial.current_round().unwrap().index();
        let (a, d) = match trial.advocates()[0].current() {
            Role::Attacker => (0, 1),
            Role::Defender => (1, 0),
        };
        for i in 0..3 {
            let arg = trial.submit(a, format!("attack {i}")).unwrap();
            assert!(trial.grade(arg, index, attacker[i], None));
            let arg = trial.submit(d, format!("defence {i}")).unwrap();
            assert!(trial.grade(arg, index, defender[i], None));
        }
        assert!(trial.try_resolve());
        assert_eq!(trial.phase(), Phase::RoundComplete);
        trial.advance()
    }

    #[test]
    fn acknowledgement_gates_arguing() {
        let mut trial = seated();
        assert_eq!(trial.phase(), Phase::CaseReading);
        assert!(!trial.acknowledge(0).unwrap());
        assert_eq!(trial.phase(), Phase::CaseReading);
        assert!(trial.acknowledge(1).unwrap());
        assert_eq!(trial.phase(), Phase::Arguing);
        assert_eq!(trial.current_round().unwrap().index(), 1);
        assert_eq!(trial.turn(), Some(Role::Attacker));
    }

    #[test]
    fn reading_timeout_starts_the_match() {
        let mut trial = seated();
        assert!(trial.expire_reading());
        assert_eq!(trial.phase(), Phase::Arguing);
        assert!(!trial.expire_reading());
    }

    #[test]
    fn submissions_alternate_strictly() {
        let mut trial = arguing();
        assert_eq!(trial.submit(1, "me first".into()), Err(Rejection::OutOfTurn));
        trial.submit(0, "opening".into()).unwrap();
        assert_eq!(trial.submit(0, "again".into()), Err(Rejection::OutOfTurn));
        trial.submit(1, "answer".into()).unwrap();
        let roles: Vec<Role> = trial
            .current_round()
            .unwrap()
            .arguments()
            .iter()
            .map(|a| a.role())
            .collect();
        assert_eq!(roles, vec![Role::Attacker, Role::Defender]);
    }

    #[test]
    fn fourth_argument_is_round_full() {
        let mut trial = arguing();
        for i in 0..3 {
            trial.submit(0, format!("a{i}")).unwrap();
            trial.submit(1, format!("d{i}")).unwrap();
        }
        assert_eq!(trial.submit(0, "one more".into()), Err(Rejection::RoundFull));
        assert_eq!(trial.current_round().unwrap().arguments().len(), 6);
    }

    #[test]
    fn round_waits_for_all_scores() {
        let mut trial = arguing();
        let mut args = Vec::new();
        for i in 0..3 {
            args.push(trial.submit(0, format!("a{i}")).unwrap());
            args.push(trial.submit(1, format!("d{i}")).unwrap());
        }
        for arg in args.iter().take(5) {
            assert!(trial.grade(*arg, 1, 50, None));
        }
        assert!(!trial.try_resolve());
        assert!(trial.grade(args[5], 1, 50, None));
        assert!(trial.try_resolve());
    }

    #[test]
    fn tied_round_has_no_winner() {
        let mut trial = arguing();
        play_round(&mut trial, [50, 50, 50], [70, 40, 40]);
        let round = &trial.history()[0];
        assert_eq!(round.attacker_total(), round.defender_total());
        assert_eq!(round.winner(), None);
        assert_eq!(trial.advocates()[0].round_wins(), 0);
        assert_eq!(trial.advocates()[1].round_wins(), 0);
    }

    #[test]
    fn majority_of_round_wins_finishes_early() {
        let mut trial = arguing();
        assert_eq!(play_round(&mut trial, [80, 80, 80], [10, 10, 10]), Phase::Arguing);
        assert_eq!(play_round(&mut trial, [80, 80, 80], [10, 10, 10]), Phase::Finished);
        assert_eq!(trial.winner(), Some(trial.advocates()[0].id()));
        assert_eq!(trial.advocates()[0].round_wins(), 2);
    }

    #[test]
    fn roles_do_not_swap_between_ordinary_rounds() {
        let mut trial = arguing();
        play_round(&mut trial, [80, 80, 80], [10, 10, 10]);
        assert_eq!(trial.advocates()[0].current(), Role::Attacker);
        assert_eq!(trial.advocates()[1].current(), Role::Defender);
        assert_eq!(trial.turn(), Some(Role::Attacker));
    }

    /// The full deciding-round scenario: 1-1 after two decisive rounds, a
    /// tied third round forces side-choice, the chooser flips to defender,
    /// and round four decides the match.
    #[test]
    fn tied_decider_runs_side_choice() {
        let mut trial = arguing();
        assert_eq!(play_round(&mut trial, [80, 70, 60], [50, 40, 30]), Phase::Arguing);
        assert_eq!(trial.history()[0].winner(), Some(Role::Attacker));
        assert_eq!(play_round(&mut trial, [50, 50, 50], [70, 70, 60]), Phase::Arguing);
        assert_eq!(play_round(&mut trial, [50, 50, 50], [50, 50, 50]), Phase::SideChoice);

        // seat 0 carries 210 + 150 + 150 = 510, seat 1 carries 120 + 200 + 150 = 470
        let choice = trial.side_choice().unwrap();
        assert_eq!(choice.chooser(), trial.advocates()[0].id());
        assert_eq!(trial.choose_side(1, Role::Attacker), Err(Rejection::OutOfTurn));
        trial.choose_side(0, Role::Defender).unwrap();
        assert_eq!(trial.advocates()[0].current(), Role::Defender);
        assert_eq!(trial.advocates()[1].current(), Role::Attacker);
        assert_eq!(trial.current_round().unwrap().index(), 4);

        assert_eq!(play_round(&mut trial, [90, 90, 90], [10, 10, 10]), Phase::Finished);
        // attacker in round four is seat 1
        assert_eq!(trial.winner(), Some(trial.advocates()[1].id()));
        assert!(trial.advocates()[1].round_wins() > trial.advocates()[0].round_wins());
    }

    #[test]
    fn tied_tiebreak_round_reruns_side_choice() {
        let mut trial = arguing();
        play_round(&mut trial, [80, 70, 60], [50, 40, 30]);
        play_round(&mut trial, [50, 50, 50], [70, 70, 60]);
        play_round(&mut trial, [50, 50, 50], [50, 50, 50]);
        trial.choose_side(0, Role::Attacker).unwrap();
        assert_eq!(play_round(&mut trial, [40, 40, 40], [40, 40, 40]), Phase::SideChoice);
        assert!(trial.side_choice().unwrap().chosen().is_none());
    }

    #[test]
    fn idle_side_choice_defaults_to_current_role() {
        let mut trial = arguing();
        play_round(&mut trial, [80, 70, 60], [50, 40, 30]);
        play_round(&mut trial, [50, 50, 50], [70, 70, 60]);
        play_round(&mut trial, [50, 50, 50], [50, 50, 50]);
        assert_eq!(trial.phase(), Phase::SideChoice);
        // a timer armed for an earlier choice epoch does nothing
        assert!(!trial.expire_choice(2));
        assert!(trial.expire_choice(3));
        assert_eq!(trial.phase(), Phase::Arguing);
        assert_eq!(trial.current_round().unwrap().index(), 4);
        // chooser was seat 0; the default keeps their current role
        assert_eq!(trial.side_choice().unwrap().chosen(), Some(Role::Attacker));
        assert_eq!(trial.advocates()[0].current(), Role::Attacker);
        assert!(!trial.expire_choice(3));
    }

    #[test]
    fn chooser_tie_falls_back_to_smaller_id() {
        let mut trial = arguing();
        for _ in 0..3 {
            play_round(&mut trial, [50, 50, 50], [50, 50, 50]);
        }
        assert_eq!(trial.phase(), Phase::SideChoice);
        // equal cumulative scores; seat 0 holds the smaller uuid
        assert_eq!(trial.side_choice().unwrap().chooser(), trial.advocates()[0].id());
    }

    #[test]
    fn stale_opinions_are_discarded() {
        let mut trial = arguing();
        let stale = trial.submit(0, "late-scored".into()).unwrap();
        assert!(trial.grade(stale, 1, 60, None));
        // double write is refused
        assert!(!trial.grade(stale, 1, 90, None));
        // wrong round index is refused
        let next = trial.submit(1, "reply".into()).unwrap();
        assert!(!trial.grade(next, 2, 90, None));
        // unknown id is refused
        assert!(!trial.grade(ID::default(), 1, 90, None));
        assert_eq!(trial.advocates()[0].total_score(), 60);
    }

    #[test]
    fn round_timeout_scores_missing_as_zero() {
        let mut trial = arguing();
        let a = trial.submit(0, "only one".into()).unwrap();
        assert!(trial.grade(a, 1, 40, None));
        let b = trial.submit(1, "never scored".into()).unwrap();
        assert!(trial.expire_round(1));
        assert_eq!(trial.phase(), Phase::RoundComplete);
        let round = &trial.history()[0];
        assert_eq!(round.attacker_total(), 40);
        assert_eq!(round.defender_total(), 0);
        assert_eq!(round.winner(), Some(Role::Attacker));
        // the late opinion for the resolved round must not rewrite history
        assert_eq!(trial.advance(), Phase::Arguing);
        assert!(!trial.grade(b, 1, 100, None));
        assert_eq!(trial.history()[0].defender_total(), 0);
    }

    #[test]
    fn expired_round_events_are_staleness_checked() {
        let mut trial = arguing();
        assert!(!trial.expire_round(2));
        play_round(&mut trial, [80, 80, 80], [10, 10, 10]);
        // a timer armed for round one must not fire into round two
        assert!(!trial.expire_round(1));
        assert_eq!(trial.current_round().unwrap().index(), 2);
    }

    #[test]
    fn abandonment_is_terminal() {
        let mut trial = arguing();
        assert!(trial.abandon());
        assert_eq!(trial.phase(), Phase::Abandoned);
        assert!(!trial.abandon());
        assert_eq!(trial.submit(0, "too late".into()), Err(Rejection::InvalidAction));
    }

    #[test]
    fn finished_match_has_a_strict_winner() {
        let mut trial = arguing();
        play_round(&mut trial, [80, 80, 80], [10, 10, 10]);
        play_round(&mut trial, [10, 10, 10], [80, 80, 80]);
        assert_eq!(play_round(&mut trial, [80, 80, 80], [10, 10, 10]), Phase::Finished);
        assert!(trial.winner().is_some());
        let [a, b] = trial.advocates();
        assert_ne!(a.round_wins(), b.round_wins());
    }
}
