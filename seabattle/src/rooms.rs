//! Room broker: rooms with a single occupant waiting for an opponent.
use thiserror::Error;

use crate::ids::{PlayerId, RoomId};

/// Reason why joining a room failed.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum RoomError {
    /// No open room has the given id.
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
    /// The room already has two occupants.
    #[error("room {0} is full")]
    RoomFull(RoomId),
    /// The player tried to join their own room.
    #[error("player is already in room {0}")]
    SelfJoin(RoomId),
}

/// A room and its occupants, in joining order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Room {
    id: RoomId,
    occupants: Vec<PlayerId>,
}

impl Room {
    /// Most players a room can hold.
    pub const CAPACITY: usize = 2;

    /// Get the id of the room.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Get the players in the room, host first.
    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    /// Returns true if the room is waiting for a second player.
    pub fn is_open(&self) -> bool {
        self.occupants.len() == 1
    }
}

/// Holds rooms until they fill up.
#[derive(Debug, Default)]
pub struct RoomBroker {
    /// Rooms in creation order.
    rooms: Vec<Room>,
}

impl RoomBroker {
    /// Construct an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a room with `host` as its only occupant.
    pub fn create(&mut self, id: RoomId, host: PlayerId) -> &Room {
        self.rooms.push(Room {
            id,
            occupants: vec![host],
        });
        &self.rooms[self.rooms.len() - 1]
    }

    /// Seat `guest` in the room. On success the room is closed and removed, and its
    /// occupants are returned host first.
    pub fn join(&mut self, id: RoomId, guest: PlayerId) -> Result<[PlayerId; 2], RoomError> {
        let idx = self
            .rooms
            .iter()
            .position(|room| room.id == id)
            .ok_or(RoomError::UnknownRoom(id))?;
        let room = &self.rooms[idx];
        if room.occupants.len() >= Room::CAPACITY {
            return Err(RoomError::RoomFull(id));
        }
        if room.occupants.contains(&guest) {
            return Err(RoomError::SelfJoin(id));
        }
        let room = self.rooms.remove(idx);
        Ok([room.occupants[0], guest])
    }

    /// Get the room with the given id.
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Iterate rooms waiting for a second player, oldest first.
    pub fn open_rooms(&self) -> impl '_ + Iterator<Item = &Room> {
        self.rooms.iter().filter(|room| room.is_open())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn join_closes_room() {
        let mut rng = StdRng::seed_from_u64(2);
        let (host, guest) = (PlayerId::random(&mut rng), PlayerId::random(&mut rng));
        let mut broker = RoomBroker::new();
        let id = broker.create(RoomId::random(&mut rng), host).id();
        assert_eq!(broker.open_rooms().count(), 1);
        assert_eq!(broker.join(id, guest), Ok([host, guest]));
        assert_eq!(broker.open_rooms().count(), 0);
        assert!(broker.get(id).is_none());
        assert_eq!(
            broker.join(id, PlayerId::random(&mut rng)),
            Err(RoomError::UnknownRoom(id))
        );
    }

    #[test]
    fn self_join_is_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let host = PlayerId::random(&mut rng);
        let mut broker = RoomBroker::new();
        let id = broker.create(RoomId::random(&mut rng), host).id();
        assert_eq!(broker.join(id, host), Err(RoomError::SelfJoin(id)));
        let room = broker.get(id).unwrap();
        assert_eq!(room.occupants(), &[host]);
        assert!(room.is_open());
    }

    #[test]
    fn open_rooms_keep_creation_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut broker = RoomBroker::new();
        let ids: Vec<RoomId> = (0..3)
            .map(|_| {
                let host = PlayerId::random(&mut rng);
                broker.create(RoomId::random(&mut rng), host).id()
            })
            .collect();
        let listed: Vec<RoomId> = broker.open_rooms().map(Room::id).collect();
        assert_eq!(listed, ids);
    }
}
