//! Broadcast-channel event publisher.
//!
//! In-process fan-out of character-change events. Delivery is
//! fire-and-forget: publishing with zero subscribers is still success, and
//! lagging subscribers miss events rather than back-pressuring the writer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use archref_domain::Character;

use crate::ports::{CharacterEventPublisher, PublishError};

/// A character-change event carrying the saved record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEvent {
    pub character: Character,
}

/// Publisher backed by a `tokio::sync::broadcast` channel.
pub struct BroadcastPublisher {
    sender: broadcast::Sender<CharacterEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to character-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CharacterEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl CharacterEventPublisher for BroadcastPublisher {
    async fn publish(&self, character: &Character) -> Result<(), PublishError> {
        let event = CharacterEvent {
            character: character.clone(),
        };

        // send only errors when there are no receivers, which is fine for
        // fire-and-forget delivery.
        if self.sender.send(event).is_err() {
            tracing::debug!("Character event published with no subscribers");
        }
        Ok(())
    }
}
