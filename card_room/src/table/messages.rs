//! Table actor message types.
//!
//! Commands flow in through an mpsc inbox with per-command `oneshot`
//! replies; state flows out as [`StateUpdate`] broadcasts. The broadcast
//! shape is the only thing external transports need to agree on.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::engine::{Observer, TableError, TableEvent, TableView};
use crate::game::entities::{Chips, PlayerAction, PlayerId, SeatIndex};

/// Identifies one broadcast subscription.
pub type SubscriberId = Uuid;

/// Messages that can be sent to a [`super::TableActor`].
#[derive(Debug)]
pub enum TableCommand {
    /// Take a seat with a buy-in. Replies with the identity that owns the
    /// seat from now on.
    Sit {
        seat: SeatIndex,
        name: String,
        buy_in: Chips,
        reply: oneshot::Sender<Result<PlayerId, TableError>>,
    },

    /// Vacate a seat. Replies with the chips the player leaves with.
    Stand {
        seat: SeatIndex,
        player: PlayerId,
        reply: oneshot::Sender<Result<Chips, TableError>>,
    },

    /// Start the next hand.
    StartHand {
        reply: oneshot::Sender<Result<(), TableError>>,
    },

    /// Player action (fold, check, call, raise).
    Act {
        player: PlayerId,
        action: PlayerAction,
        reply: oneshot::Sender<Result<(), TableError>>,
    },

    /// Snapshot of the table as a given observer sees it.
    GetView {
        observer: Observer,
        reply: oneshot::Sender<TableView>,
    },

    /// Ask the commentary service what a player should do.
    Advice {
        player: PlayerId,
        reply: oneshot::Sender<String>,
    },

    /// Subscribe to state broadcasts, redacted for `observer`.
    Subscribe {
        observer: Observer,
        sender: mpsc::Sender<StateUpdate>,
        reply: oneshot::Sender<SubscriberId>,
    },

    /// Drop a subscription.
    Unsubscribe { id: SubscriberId },

    /// Shut the table down.
    Close { reply: oneshot::Sender<()> },
}

/// A full-state notification, sent to every subscriber after each applied
/// mutation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StateUpdate {
    /// The table, redacted for the receiving observer.
    pub view: TableView,
    /// Narrative events since the previous update.
    pub events: Vec<TableEvent>,
    /// Commentary on a finished hand, when one just finished.
    pub commentary: Option<String>,
}
