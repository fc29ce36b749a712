use super::*;
use crate::debate::Advocate;
use crate::docket::Docket;
use crate::judge::Judge;
use crate::matchroom::Command;
use crate::matchroom::Room;
use crate::matchroom::RoomConfig;
use crate::records::Ledger;
use crate::types::ID;
use crate::types::RoomId;
use crate::types::Seat;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::Weak;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Registry of live rooms, keyed by the join code players share out of
/// band. Rooms are created on first join and reaped when their actor
/// terminates, whatever the reason.
pub struct Courthouse {
    config: RoomConfig,
    docket: Arc<dyn Docket>,
    judge: Arc<dyn Judge>,
    ledger: Arc<dyn Ledger>,
    rooms: RwLock<HashMap<RoomId, Arc<RoomHandle>>>,
    closer: UnboundedSender<RoomId>,
}

impl Courthouse {
    /// Builds the registry and spawns its reaper. The reaper holds only a
    /// weak reference, so dropping the last Arc shuts it down.
    pub fn new(
        config: RoomConfig,
        docket: Arc<dyn Docket>,
        judge: Arc<dyn Judge>,
        ledger: Arc<dyn Ledger>,
    ) -> Arc<Self> {
        let (closer, closed) = unbounded_channel();
        let courthouse = Arc::new(Self {
            config,
            docket,
            judge,
            ledger,
            rooms: RwLock::new(HashMap::new()),
            closer,
        });
        tokio::spawn(Self::reap(Arc::downgrade(&courthouse), closed));
        courthouse
    }

    async fn reap(registry: Weak<Self>, mut closed: UnboundedReceiver<RoomId>) {
        while let Some(id) = closed.recv().await {
            let Some(registry) = registry.upgrade() else {
                break;
            };
            if registry.rooms.write().await.remove(&id).is_some() {
                log::info!("reaped room {}", id);
            }
        }
    }

    /// Seats a player in the named room, creating the room on first join.
    /// Returns the seat index; the same player id always gets the same
    /// seat back.
    pub async fn join(
        &self,
        room: RoomId,
        player: ID<Advocate>,
        name: String,
    ) -> anyhow::Result<Seat> {
        if let Some(handle) = self.rooms.read().await.get(&room).cloned() {
            return self.seat(&handle, player, name);
        }
        let mut rooms = self.rooms.write().await;
        match rooms.entry(room.clone()) {
            Entry::Occupied(entry) => {
                let handle = entry.get().clone();
                drop(rooms);
                self.seat(&handle, player, name)
            }
            Entry::Vacant(entry) => {
                let commands = Room::spawn(
                    room.clone(),
                    self.config.clone(),
                    self.docket.clone(),
                    self.judge.clone(),
                    self.ledger.clone(),
                    self.closer.clone(),
                    (player, name.clone()),
                );
                entry.insert(Arc::new(RoomHandle::new(room.clone(), commands, (player, name))));
                log::info!("opened room {}", room);
                Ok(0)
            }
        }
    }

    pub async fn lookup(&self, room: &RoomId) -> Option<Arc<RoomHandle>> {
        self.rooms.read().await.get(room).cloned()
    }

    /// Voluntary exit: forfeits the player's live match. The room itself
    /// is evicted by the reaper once the actor winds down.
    pub async fn leave(&self, room: &RoomId, player: ID<Advocate>) -> anyhow::Result<()> {
        let handle = self
            .lookup(room)
            .await
            .ok_or_else(|| anyhow::anyhow!("room {} not found", room))?;
        let seat = handle
            .seat_of(player)
            .ok_or_else(|| anyhow::anyhow!("player is not seated in room {}", room))?;
        handle
            .commands
            .send(Command::Leave { seat })
            .map_err(|_| anyhow::anyhow!("room {} is closing", room))?;
        Ok(())
    }

    fn seat(&self, handle: &RoomHandle, player: ID<Advocate>, name: String) -> anyhow::Result<Seat> {
        let (seat, started) = handle.try_seat(player, name.clone())?;
        if started {
            handle
                .commands
                .send(Command::Seat { player, name })
                .map_err(|_| anyhow::anyhow!("room {} is closing", handle.id))?;
        }
        Ok(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docket::CannedDocket;
    use crate::judge::HeuristicJudge;
    use crate::records::MemoryLedger;

    fn courthouse() -> Arc<Courthouse> {
        Courthouse::new(
            RoomConfig::default(),
            Arc::new(CannedDocket::default()),
            Arc::new(HeuristicJudge::default()),
            Arc::new(MemoryLedger::default()),
        )
    }

    #[tokio::test]
    async fn first_join_creates_second_join_seats() {
        let courthouse = courthouse();
        let ada = ID::from(uuid::Uuid::from_u128(1));
        let bob = ID::from(uuid::Uuid::from_u128(2));
        assert_eq!(
            courthouse.join("quiet-owl".into(), ada, "ada".into()).await.unwrap(),
            0
        );
        assert_eq!(
            courthouse.join("quiet-owl".into(), bob, "bob".into()).await.unwrap(),
            1
        );
        assert!(courthouse.lookup(&"quiet-owl".to_string()).await.is_some());
        assert!(courthouse.lookup(&"other".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn full_room_rejects_a_third_player() {
        let courthouse = courthouse();
        for n in 1..=2 {
            let player = ID::from(uuid::Uuid::from_u128(n));
            courthouse
                .join("packed".into(), player, format!("p{n}"))
                .await
                .unwrap();
        }
        let eve = ID::from(uuid::Uuid::from_u128(3));
        assert!(courthouse.join("packed".into(), eve, "eve".into()).await.is_err());
    }

    #[tokio::test]
    async fn unfilled_rooms_are_reaped() {
        let config = RoomConfig {
            gathering_timeout: std::time::Duration::from_millis(50),
            ..RoomConfig::default()
        };
        let courthouse = Courthouse::new(
            config,
            Arc::new(CannedDocket::default()),
            Arc::new(HeuristicJudge::default()),
            Arc::new(MemoryLedger::default()),
        );
        let ada = ID::from(uuid::Uuid::from_u128(1));
        courthouse.join("lonely".into(), ada, "ada".into()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(courthouse.lookup(&"lonely".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn rejoin_returns_the_same_seat() {
        let courthouse = courthouse();
        let ada = ID::from(uuid::Uuid::from_u128(1));
        courthouse.join("re".into(), ada, "ada".into()).await.unwrap();
        assert_eq!(courthouse.join("re".into(), ada, "ada".into()).await.unwrap(), 0);
    }
}
