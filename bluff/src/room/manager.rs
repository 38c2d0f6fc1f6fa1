//! Room directory: spawns room actors and tracks the live ones by identifier.

use rand::{SeedableRng, rngs::StdRng};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{RoomMessage, RoomSummary},
};
use crate::{
    game::entities::{ClientId, RoomId},
    ids::{IdSource, ROOM_ID_LEN, RandomIds, unique_id},
};

/// Directory of live rooms
pub struct RoomManager {
    /// Rules applied to every new room
    config: RoomConfig,

    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,

    /// Room code source
    ids: Mutex<Box<dyn IdSource>>,

    /// Seeds each room's shuffle source
    rng: Mutex<StdRng>,
}

impl RoomManager {
    /// Create a room manager drawing codes and shuffles from OS entropy
    pub fn new(config: RoomConfig) -> Self {
        Self::with_sources(
            config,
            Box::new(RandomIds::from_entropy()),
            StdRng::from_os_rng(),
        )
    }

    /// Create a room manager with explicit identifier and shuffle sources
    ///
    /// # Arguments
    ///
    /// * `config` - Rules for every room
    /// * `ids` - Room code source
    /// * `rng` - Parent generator; each room gets a child seeded from it
    pub fn with_sources(config: RoomConfig, ids: Box<dyn IdSource>, rng: StdRng) -> Self {
        Self {
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            ids: Mutex::new(ids),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Create and spawn an empty room under a fresh 5-character code
    ///
    /// # Arguments
    ///
    /// * `creator` - Client that asked for the room; it joins separately
    ///
    /// # Returns
    ///
    /// * `(RoomId, RoomHandle)` - Code and handle of the new room
    pub async fn create_room(&self, creator: &ClientId) -> (RoomId, RoomHandle) {
        let mut ids = self.ids.lock().await;
        let room_rng = {
            let mut rng = self.rng.lock().await;
            StdRng::from_rng(&mut *rng)
        };

        let mut rooms = self.rooms.write().await;
        let room_id = RoomId::from(unique_id(&mut **ids, ROOM_ID_LEN, |candidate| {
            rooms.contains_key(&RoomId::new(candidate))
        }));

        let (actor, handle) = RoomActor::new(room_id.clone(), self.config, room_rng);
        rooms.insert(room_id.clone(), handle.clone());
        drop(rooms);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created room {} for {}", room_id, creator);

        (room_id, handle)
    }

    /// Get a room handle
    pub async fn get_room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    /// Remove a room whose last player left
    ///
    /// Only removes the entry if it still points at `handle`'s actor, so a
    /// late call cannot drop a newer room that reused the code.
    pub async fn destroy_room(&self, room_id: &RoomId, handle: &RoomHandle) -> bool {
        let mut rooms = self.rooms.write().await;
        let matches = rooms
            .get(room_id)
            .is_some_and(|current| current.same_room(handle));
        if matches {
            rooms.remove(room_id);
            log::info!("Destroyed room {}", room_id);
        }
        matches
    }

    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    /// List all live rooms, ordered by code
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(summary) = handle
                .request(|tx| RoomMessage::GetSummary { response: tx })
                .await
            {
                summaries.push(summary);
            }
        }
        summaries.sort_by(|a, b| a.room_id.as_str().cmp(b.room_id.as_str()));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::entities::RoomStatus, ids::ScriptedIds};

    fn creator() -> ClientId {
        ClientId::new("CREATORX")
    }

    fn manager(script: &[&str]) -> RoomManager {
        RoomManager::with_sources(
            RoomConfig::default(),
            Box::new(ScriptedIds::new(script.iter().copied())),
            StdRng::seed_from_u64(9),
        )
    }

    #[tokio::test]
    async fn test_create_room_skips_live_codes() {
        let manager = manager(&["ROOMA", "ROOMA", "ROOMB"]);

        let (first, _) = manager.create_room(&creator()).await;
        let (second, _) = manager.create_room(&creator()).await;

        assert_eq!(first.as_str(), "ROOMA");
        assert_eq!(second.as_str(), "ROOMB");
        assert_eq!(manager.room_count().await, 2);
    }

    #[tokio::test]
    async fn test_destroy_requires_matching_handle() {
        let manager = manager(&["ROOMA", "ROOMB"]);
        let (room_a, handle_a) = manager.create_room(&creator()).await;
        let (_, handle_b) = manager.create_room(&creator()).await;

        assert!(!manager.destroy_room(&room_a, &handle_b).await);
        assert!(manager.get_room(&room_a).await.is_some());

        assert!(manager.destroy_room(&room_a, &handle_a).await);
        assert!(manager.get_room(&room_a).await.is_none());
        assert_eq!(manager.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_rooms() {
        let manager = manager(&["ZZZZZ", "AAAAA"]);
        manager.create_room(&creator()).await;
        manager.create_room(&creator()).await;

        let rooms = manager.list_rooms().await;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id.as_str(), "AAAAA");
        assert_eq!(rooms[0].status, RoomStatus::Waiting);
        assert_eq!(rooms[0].player_count, 0);
        assert_eq!(rooms[0].max_players, 5);
    }
}
