use crate::debate::Advocate;
use crate::matchroom::Command;
use crate::types::ID;
use crate::types::RoomId;
use crate::types::Seat;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// Registry-side endpoint of a running room: its command queue plus the
/// seats handed out so far. Seating happens here, synchronously under the
/// roster lock, so two racing joins can never both claim the second seat.
pub struct RoomHandle {
    pub id: RoomId,
    pub commands: UnboundedSender<Command>,
    roster: Mutex<Vec<(ID<Advocate>, String)>>,
}

impl RoomHandle {
    pub fn new(
        id: RoomId,
        commands: UnboundedSender<Command>,
        first: (ID<Advocate>, String),
    ) -> Self {
        Self {
            id,
            commands,
            roster: Mutex::new(vec![first]),
        }
    }

    /// Seats a player, idempotently: rejoining with a known id returns the
    /// seat already held. The bool reports whether this call filled the
    /// second seat and therefore starts the match.
    pub fn try_seat(&self, player: ID<Advocate>, name: String) -> anyhow::Result<(Seat, bool)> {
        let mut roster = self
            .roster
            .lock()
            .map_err(|_| anyhow::anyhow!("roster poisoned"))?;
        if let Some(seat) = roster.iter().position(|(id, _)| *id == player) {
            return Ok((seat, false));
        }
        if roster.len() >= 2 {
            anyhow::bail!("room {} is full", self.id);
        }
        roster.push((player, name));
        Ok((roster.len() - 1, roster.len() == 2))
    }

    pub fn seat_of(&self, player: ID<Advocate>) -> Option<Seat> {
        self.roster
            .lock()
            .ok()?
            .iter()
            .position(|(id, _)| *id == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn handle() -> RoomHandle {
        let (tx, _rx) = unbounded_channel();
        let first = (ID::from(uuid::Uuid::from_u128(1)), "ada".to_string());
        RoomHandle::new("courtroom-1".to_string(), tx, first)
    }

    #[test]
    fn second_seat_starts_the_match() {
        let handle = handle();
        let bob = ID::from(uuid::Uuid::from_u128(2));
        assert_eq!(handle.try_seat(bob, "bob".into()).unwrap(), (1, true));
        assert_eq!(handle.seat_of(bob), Some(1));
    }

    #[test]
    fn rejoining_reclaims_the_held_seat() {
        let handle = handle();
        let ada = ID::from(uuid::Uuid::from_u128(1));
        assert_eq!(handle.try_seat(ada, "ada".into()).unwrap(), (0, false));
    }

    #[test]
    fn third_player_is_turned_away() {
        let handle = handle();
        let bob = ID::from(uuid::Uuid::from_u128(2));
        let eve = ID::from(uuid::Uuid::from_u128(3));
        handle.try_seat(bob, "bob".into()).unwrap();
        assert!(handle.try_seat(eve, "eve".into()).is_err());
        assert_eq!(handle.seat_of(eve), None);
    }
}
