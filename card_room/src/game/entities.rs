use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

/// All suits, in deck construction order.
pub const SUITS: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2, ace is 14.
pub type Value = u8;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// Dealing from a deck with no cards left. Unreachable under correct
/// phase sequencing (9 players need at most 23 cards per hand), so hitting
/// this is an internal invariant violation, not a user-facing error.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("the deck is exhausted")]
pub struct DeckExhausted;

#[derive(Debug)]
pub struct Deck {
    cards: [Card; 52],
    deck_idx: usize,
}

impl Deck {
    /// Remove and return the top card.
    pub fn deal(&mut self) -> Result<Card, DeckExhausted> {
        let card = *self.cards.get(self.deck_idx).ok_or(DeckExhausted)?;
        self.deck_idx += 1;
        Ok(card)
    }

    /// Fisher-Yates shuffle with a caller-supplied randomness source, so
    /// decks are reproducible under a seeded generator.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.deck_idx = 0;
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        52 - self.deck_idx
    }

    #[must_use]
    pub fn dealt(&self) -> usize {
        self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        let cards: [Card; 52] =
            std::array::from_fn(|i| Card(2 + (i / 4) as Value, SUITS[i % 4]));
        Self { cards, deck_idx: 0 }
    }
}

/// Type alias for whole chips. All bets and player stacks are represented
/// as whole chips (there's no point arguing over fractions).
pub type Chips = u32;

pub const DEFAULT_BUY_IN: Chips = 1000;
pub const DEFAULT_BIG_BLIND: Chips = 20;
pub const DEFAULT_SMALL_BLIND: Chips = DEFAULT_BIG_BLIND / 2;

/// The identity that owns a seat. Handed out when a player sits down and
/// required for every subsequent action from that seat.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl Default for Blinds {
    fn default() -> Self {
        Self {
            small: DEFAULT_SMALL_BLIND,
            big: DEFAULT_BIG_BLIND,
        }
    }
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = format!("${}/{}", self.small, self.big);
        write!(f, "{repr}")
    }
}

/// Where a seat is in its lifecycle. Every seat always has a status;
/// `Empty` means nobody owns it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeatStatus {
    Empty,
    SittingOut,
    Playing,
    Folded,
    AllIn,
    Busted,
}

impl SeatStatus {
    /// Whether somebody owns the seat.
    #[must_use]
    pub fn is_occupied(self) -> bool {
        self != Self::Empty
    }

    /// Whether the seat is still competing for the pot this hand.
    #[must_use]
    pub fn contends(self) -> bool {
        matches!(self, Self::Playing | Self::AllIn)
    }

    /// Whether the seat can still take betting actions.
    #[must_use]
    pub fn can_act(self) -> bool {
        self == Self::Playing
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Empty => "empty",
            Self::SittingOut => "sitting out",
            Self::Playing => "playing",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::Busted => "busted",
        };
        write!(f, "{repr}")
    }
}

/// An action a seat-owning player can submit while betting is open.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Raise(Chips),
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise(amount) => &format!("raises ${amount}"),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Produced at showdown, one record per winning seat. Ties produce
/// multiple records for the same pot.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Winner {
    pub player: PlayerId,
    pub name: PlayerName,
    pub category: HandCategory,
    pub amount: Chips,
}

/// One seat at the table. The engine keeps all nine seats around at all
/// times; vacant seats carry `SeatStatus::Empty` and zeroed fields.
#[derive(Clone, Debug)]
pub struct Seat {
    pub id: Option<PlayerId>,
    pub name: Option<PlayerName>,
    pub stack: Chips,
    pub round_bet: Chips,
    pub status: SeatStatus,
    pub hole: Vec<Card>,
    pub has_acted: bool,
}

impl Seat {
    #[must_use]
    pub fn vacant() -> Self {
        Self {
            id: None,
            name: None,
            stack: 0,
            round_bet: 0,
            status: SeatStatus::Empty,
            hole: Vec::with_capacity(constants::HOLE_CARDS),
            has_acted: false,
        }
    }

    pub fn occupy(&mut self, id: PlayerId, name: PlayerName, buy_in: Chips) {
        self.id = Some(id);
        self.name = Some(name);
        self.stack = buy_in;
        self.round_bet = 0;
        self.status = SeatStatus::SittingOut;
        self.hole.clear();
        self.has_acted = false;
    }

    pub fn vacate(&mut self) {
        *self = Self::vacant();
    }

    #[must_use]
    pub fn occupant(&self) -> Option<(PlayerId, &PlayerName)> {
        match (self.id, &self.name) {
            (Some(id), Some(name)) => Some((id, name)),
            _ => None,
        }
    }

    /// Move up to `amount` chips from the stack into the live round bet,
    /// capped at the stack. A playing seat whose stack hits zero goes
    /// all-in. Returns what was actually paid.
    pub fn post(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.round_bet += paid;
        if self.stack == 0 && self.status == SeatStatus::Playing {
            self.status = SeatStatus::AllIn;
        }
        paid
    }

    /// Clear per-hand state. Status is untouched; the hand-start logic
    /// owns status transitions.
    pub fn reset_for_hand(&mut self) {
        self.round_bet = 0;
        self.hole.clear();
        self.has_acted = false;
    }
}

impl Default for Seat {
    fn default() -> Self {
        Self::vacant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    #[test]
    fn test_deck_is_canonical_permutation() {
        let mut deck = Deck::default();
        let mut seen = BTreeSet::new();
        for _ in 0..52 {
            let card = deck.deal().unwrap();
            assert!((2..=14).contains(&card.0));
            assert!(seen.insert((card.0, card.1)));
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_shuffled_deck_is_canonical_permutation() {
        let mut deck = Deck::default();
        deck.shuffle(&mut StdRng::seed_from_u64(7));
        let mut seen = BTreeSet::new();
        while let Ok(card) = deck.deal() {
            seen.insert((card.0, card.1));
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_deck_deal_exhausts_after_52() {
        let mut deck = Deck::default();
        for _ in 0..52 {
            deck.deal().unwrap();
        }
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.deal(), Err(DeckExhausted));
    }

    #[test]
    fn test_deck_remaining_tracks_deals() {
        let mut deck = Deck::default();
        assert_eq!(deck.remaining(), 52);
        deck.deal().unwrap();
        deck.deal().unwrap();
        assert_eq!(deck.remaining(), 50);
        assert_eq!(deck.dealt(), 2);
    }

    #[test]
    fn test_shuffle_resets_cursor() {
        let mut deck = Deck::default();
        deck.deal().unwrap();
        deck.deal().unwrap();
        deck.shuffle(&mut StdRng::seed_from_u64(0));
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_seeded_shuffles_are_reproducible() {
        let mut a = Deck::default();
        let mut b = Deck::default();
        a.shuffle(&mut StdRng::seed_from_u64(42));
        b.shuffle(&mut StdRng::seed_from_u64(42));
        for _ in 0..52 {
            assert_eq!(a.deal().unwrap(), b.deal().unwrap());
        }
    }

    #[test]
    fn test_card_display_face_cards() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(13, Suit::Heart).to_string(), "K♥");
        assert_eq!(Card(12, Suit::Diamond).to_string(), "Q♦");
        assert_eq!(Card(11, Suit::Club).to_string(), "J♣");
    }

    #[test]
    fn test_card_display_number_cards() {
        assert_eq!(Card(2, Suit::Club).to_string(), "2♣");
        assert_eq!(Card(10, Suit::Spade).to_string(), "10♠");
    }

    #[test]
    fn test_player_name_whitespace_replacement() {
        assert_eq!(PlayerName::new("alice bob").to_string(), "alice_bob");
    }

    #[test]
    fn test_player_name_truncation() {
        let long = "a".repeat(100);
        let name = PlayerName::new(&long);
        assert_eq!(name.to_string().len(), constants::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_player_ids_are_unique() {
        assert_ne!(PlayerId::new(), PlayerId::new());
    }

    #[test]
    fn test_blinds_display() {
        let blinds = Blinds { small: 5, big: 10 };
        assert_eq!(blinds.to_string(), "$5/10");
    }

    #[test]
    fn test_seat_status_helpers() {
        assert!(!SeatStatus::Empty.is_occupied());
        assert!(SeatStatus::SittingOut.is_occupied());
        assert!(SeatStatus::Playing.contends());
        assert!(SeatStatus::AllIn.contends());
        assert!(!SeatStatus::Folded.contends());
        assert!(!SeatStatus::Busted.contends());
        assert!(SeatStatus::Playing.can_act());
        assert!(!SeatStatus::AllIn.can_act());
    }

    #[test]
    fn test_seat_occupy_and_vacate() {
        let mut seat = Seat::vacant();
        let id = PlayerId::new();
        seat.occupy(id, PlayerName::new("alice"), 500);
        assert_eq!(seat.status, SeatStatus::SittingOut);
        assert_eq!(seat.stack, 500);
        assert_eq!(seat.occupant().map(|(i, _)| i), Some(id));

        seat.vacate();
        assert_eq!(seat.status, SeatStatus::Empty);
        assert_eq!(seat.stack, 0);
        assert!(seat.occupant().is_none());
    }

    #[test]
    fn test_seat_post_moves_chips_to_round_bet() {
        let mut seat = Seat::vacant();
        seat.occupy(PlayerId::new(), PlayerName::new("bob"), 100);
        seat.status = SeatStatus::Playing;
        let paid = seat.post(30);
        assert_eq!(paid, 30);
        assert_eq!(seat.stack, 70);
        assert_eq!(seat.round_bet, 30);
        assert_eq!(seat.status, SeatStatus::Playing);
    }

    #[test]
    fn test_seat_post_caps_at_stack_and_goes_all_in() {
        let mut seat = Seat::vacant();
        seat.occupy(PlayerId::new(), PlayerName::new("bob"), 100);
        seat.status = SeatStatus::Playing;
        let paid = seat.post(250);
        assert_eq!(paid, 100);
        assert_eq!(seat.stack, 0);
        assert_eq!(seat.round_bet, 100);
        assert_eq!(seat.status, SeatStatus::AllIn);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(PlayerAction::Fold.to_string(), "folds");
        assert_eq!(PlayerAction::Check.to_string(), "checks");
        assert_eq!(PlayerAction::Call.to_string(), "calls");
        assert_eq!(PlayerAction::Raise(100).to_string(), "raises $100");
    }

    #[test]
    fn test_hand_category_ordering() {
        assert!(HandCategory::HighCard < HandCategory::OnePair);
        assert!(HandCategory::OnePair < HandCategory::TwoPair);
        assert!(HandCategory::TwoPair < HandCategory::ThreeOfAKind);
        assert!(HandCategory::ThreeOfAKind < HandCategory::Straight);
        assert!(HandCategory::Straight < HandCategory::Flush);
        assert!(HandCategory::Flush < HandCategory::FullHouse);
        assert!(HandCategory::FullHouse < HandCategory::FourOfAKind);
        assert!(HandCategory::FourOfAKind < HandCategory::StraightFlush);
    }

    #[test]
    fn test_hand_category_display() {
        assert_eq!(HandCategory::StraightFlush.to_string(), "straight flush");
        assert_eq!(HandCategory::HighCard.to_string(), "high card");
    }
}
