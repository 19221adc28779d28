use crate::game::Game;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Snapshot pushed to subscribers after every state-changing operation.
///
/// Delivery may be duplicated or reordered under subscriber lag;
/// consumers reconcile by `game.id` (replace-by-id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameUpdate {
    pub game: Game,
}

pub struct UpdateNotifier {
    sender: broadcast::Sender<GameUpdate>,
}

impl UpdateNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameUpdate> {
        self.sender.subscribe()
    }

    /// Broadcasts the full current record. A send error only means no
    /// subscriber is listening, which is fine.
    pub(crate) fn notify(&self, game: &Game) {
        let update = GameUpdate { game: game.clone() };
        if self.sender.send(update).is_err() {
            tracing::trace!(game_id = game.id, "no subscribers for game update");
        }
    }
}
