//! # Card Room
//!
//! A Texas Hold'em table engine.
//!
//! The engine seats up to nine players, runs betting rounds through the
//! canonical phases (pre-flop, flop, turn, river, showdown), ranks hands,
//! and distributes the pot. One [`game::engine::Table`] is the sole source
//! of truth per table; every client view is a redactable projection of it.
//!
//! ## Architecture
//!
//! - [`game`]: the synchronous core — cards, deck, hand evaluator, and the
//!   table state machine with its action-application contract.
//! - [`table`]: the single-writer actor that serializes all mutations and
//!   broadcasts full-state updates to subscribers.
//! - [`commentary`]: the boundary trait for the optional external
//!   commentary/advice text service. It contributes no game logic.
//!
//! ## Example
//!
//! ```
//! use card_room::{Blinds, PlayerAction, PlayerName, Table};
//!
//! let mut table = Table::with_seed(Blinds { small: 10, big: 20 }, 42);
//! let alice = table.sit(0, 1000, PlayerName::new("alice")).unwrap();
//! let bob = table.sit(1, 1000, PlayerName::new("bob")).unwrap();
//! table.start_hand().unwrap();
//!
//! // Heads-up: the dealer posts the small blind and acts first.
//! table.act(alice, PlayerAction::Call).unwrap();
//! table.act(bob, PlayerAction::Check).unwrap();
//! assert_eq!(table.board().len(), 3);
//! ```

/// Boundary for the optional commentary/advice text service.
pub mod commentary;
pub use commentary::{Commentator, FALLBACK_COMMENTARY, StaticCommentator};

/// Core game logic, entities, and the table state machine.
pub mod game;
pub use game::{
    constants::{self, MAX_SEATS},
    engine::{Observer, Phase, Table, TableError, TableEvent, TableView},
    entities::{
        Blinds, Card, Chips, DEFAULT_BIG_BLIND, DEFAULT_BUY_IN, DEFAULT_SMALL_BLIND, Deck,
        HandCategory, PlayerAction, PlayerId, PlayerName, SeatStatus, Suit,
    },
    evaluator::{HandValue, evaluate},
};

/// The single-writer table actor and its message protocol.
pub mod table;
pub use table::{
    TableActor, TableConfig, TableHandle,
    messages::{StateUpdate, TableCommand},
};
