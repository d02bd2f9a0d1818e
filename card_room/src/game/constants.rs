//! Table-wide constants.

/// Number of seats at a table. Seats are indexed `0..MAX_SEATS`.
pub const MAX_SEATS: usize = 9;

/// Hole cards dealt to each player at the start of a hand.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a complete board.
pub const BOARD_SIZE: usize = 5;

/// Community cards dealt on the flop.
pub const FLOP_SIZE: usize = 3;

/// Maximum length of a player display name.
pub const MAX_NAME_LENGTH: usize = 16;

/// Number of narrative log entries retained on the table.
pub const EVENT_LOG_CAP: usize = 128;
