//! The single-writer actor wrapping a [`crate::game::engine::Table`].
//!
//! One actor per table; each is its own serialization domain. External
//! transports only ever see the command/broadcast message shapes in
//! [`messages`].

mod actor;
mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
