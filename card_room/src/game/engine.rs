//! The authoritative table state and its action-application contract.
//!
//! Exactly one [`Table`] exists per poker table. It owns the deck, the
//! seats, the pot, and the phase pointer, and every mutation flows through
//! the handful of operations defined here: [`Table::sit`], [`Table::stand`],
//! [`Table::start_hand`], and [`Table::act`]. Callers that need
//! serialization wrap the table in a single-writer actor (see
//! [`crate::table`]); the engine itself is strictly synchronous, so no
//! half-applied action is ever observable.

use chrono::{DateTime, Utc};
use log::{error, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use super::constants::{EVENT_LOG_CAP, FLOP_SIZE, HOLE_CARDS, MAX_SEATS};
use super::entities::{
    Blinds, Card, Chips, Deck, HandCategory, PlayerAction, PlayerId, PlayerName, Seat, SeatIndex,
    SeatStatus, Winner,
};
use super::evaluator::{HandValue, evaluate};

/// Phases of a hand. `Idle` is the rest state before the first hand and
/// whenever the table empties; `Showdown` is the rest state between hands.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    Idle,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    /// Whether player actions are currently accepted.
    #[must_use]
    pub fn betting_open(self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Preflop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// Play positions: who holds the button, who posted the blinds, whose
/// turn it is, and who bet or raised last.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct Positions {
    pub dealer: Option<SeatIndex>,
    pub small_blind: Option<SeatIndex>,
    pub big_blind: Option<SeatIndex>,
    pub to_act: Option<SeatIndex>,
    pub last_aggressor: Option<SeatIndex>,
}

/// Errors that can occur while applying table operations. Every rejection
/// leaves the table untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("betting is closed")]
    BettingClosed,
    #[error("buy-in must be between ${min} and ${max}")]
    BuyInOutOfRange { min: Chips, max: Chips },
    #[error("a call of ${owed} is owed; can't check")]
    CheckNotAllowed { owed: Chips },
    #[error("hand already in progress")]
    HandInProgress,
    #[error("seat {0} does not exist")]
    InvalidSeat(SeatIndex),
    #[error("need 2+ players with chips")]
    NotEnoughPlayers,
    #[error("seat {0} isn't yours")]
    NotSeatOwner(SeatIndex),
    #[error("not your turn")]
    NotYourTurn,
    #[error("seat {0} is empty")]
    SeatEmpty(SeatIndex),
    #[error("seat {0} is taken")]
    SeatOccupied(SeatIndex),
    #[error("table is closed")]
    TableClosed,
}

/// Narrative events describing what happened at the table, in order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableEvent {
    SatDown {
        seat: SeatIndex,
        name: PlayerName,
        buy_in: Chips,
    },
    StoodUp {
        seat: SeatIndex,
        name: PlayerName,
        chips: Chips,
    },
    HandStarted {
        hand_id: u64,
        dealer: SeatIndex,
    },
    Busted {
        name: PlayerName,
    },
    PostedSmallBlind {
        name: PlayerName,
        amount: Chips,
    },
    PostedBigBlind {
        name: PlayerName,
        amount: Chips,
    },
    Acted {
        name: PlayerName,
        action: PlayerAction,
    },
    WentAllIn {
        name: PlayerName,
    },
    RoundComplete {
        phase: Phase,
        pot: Chips,
    },
    BoardDealt {
        phase: Phase,
        cards: Vec<Card>,
    },
    WonShowdown {
        name: PlayerName,
        category: HandCategory,
        amount: Chips,
    },
    WonUncontested {
        name: PlayerName,
        amount: Chips,
    },
    OddChipsWithheld {
        amount: Chips,
    },
    HandAborted {
        reason: String,
    },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SatDown { seat, name, buy_in } => {
                format!("{name} sat down at seat {seat} with ${buy_in}")
            }
            Self::StoodUp { seat, name, chips } => {
                format!("{name} left seat {seat} with ${chips}")
            }
            Self::HandStarted { hand_id, dealer } => {
                format!("hand #{hand_id} started, button on seat {dealer}")
            }
            Self::Busted { name } => format!("{name} busted"),
            Self::PostedSmallBlind { name, amount } => {
                format!("{name} posted the small blind (${amount})")
            }
            Self::PostedBigBlind { name, amount } => {
                format!("{name} posted the big blind (${amount})")
            }
            Self::Acted { name, action } => format!("{name} {action}"),
            Self::WentAllIn { name } => format!("{name} is all-in"),
            Self::RoundComplete { phase, pot } => {
                format!("{phase} betting complete, pot at ${pot}")
            }
            Self::BoardDealt { phase, cards } => {
                let cards = cards
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{phase}: {cards}")
            }
            Self::WonShowdown {
                name,
                category,
                amount,
            } => format!("{name} won ${amount} with {category}"),
            Self::WonUncontested { name, amount } => {
                format!("{name} won ${amount} uncontested")
            }
            Self::OddChipsWithheld { amount } => {
                format!("${amount} in odd chips withheld from the split")
            }
            Self::HandAborted { reason } => format!("hand aborted: {reason}"),
        };
        write!(f, "{repr}")
    }
}

/// A retained, timestamped narrative log entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub event: TableEvent,
}

/// Who is looking at the table. Views are projections of the one
/// authoritative state; hole cards are redacted per observer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Observer {
    /// Sees everything. The default for local, single-process tables.
    Omniscient,
    /// Sees their own hole cards plus whatever the showdown reveals.
    Player(PlayerId),
    /// Sees only public information.
    Spectator,
}

/// A seat as seen by an observer.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub name: Option<PlayerName>,
    pub stack: Chips,
    pub round_bet: Chips,
    pub status: SeatStatus,
    /// `None` when the observer isn't allowed to see these cards (or the
    /// seat has none).
    pub hole: Option<Vec<Card>>,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub has_acted: bool,
}

/// The table as seen by an observer: the full-state notification shape
/// handed to the broadcast boundary.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TableView {
    pub phase: Phase,
    pub board: Vec<Card>,
    /// Settled chips only; excludes live round bets.
    pub pot: Chips,
    /// What a user understands as "the pot": settled chips plus every
    /// live round bet.
    pub total_pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub to_act: Option<SeatIndex>,
    pub blinds: Blinds,
    pub seats: Vec<SeatView>,
    pub winners: Vec<Winner>,
    pub log: Vec<LogEntry>,
}

/// The authoritative table state. See the module docs for the mutation
/// contract.
#[derive(Debug)]
pub struct Table {
    seats: Vec<Seat>,
    deck: Deck,
    board: Vec<Card>,
    pot: Chips,
    phase: Phase,
    blinds: Blinds,
    positions: Positions,
    current_bet: Chips,
    min_raise: Chips,
    winners: Vec<Winner>,
    log: VecDeque<LogEntry>,
    events: VecDeque<TableEvent>,
    hand_id: u64,
    rng: StdRng,
}

impl Table {
    #[must_use]
    pub fn new(blinds: Blinds) -> Self {
        Self::with_rng(blinds, StdRng::from_os_rng())
    }

    /// A table whose decks are fully determined by `seed`. Used by tests
    /// and replays.
    #[must_use]
    pub fn with_seed(blinds: Blinds, seed: u64) -> Self {
        Self::with_rng(blinds, StdRng::seed_from_u64(seed))
    }

    fn with_rng(blinds: Blinds, rng: StdRng) -> Self {
        Self {
            seats: (0..MAX_SEATS).map(|_| Seat::vacant()).collect(),
            deck: Deck::default(),
            board: Vec::with_capacity(super::constants::BOARD_SIZE),
            pot: 0,
            phase: Phase::Idle,
            blinds,
            positions: Positions::default(),
            current_bet: 0,
            min_raise: 0,
            winners: Vec::new(),
            log: VecDeque::with_capacity(EVENT_LOG_CAP),
            events: VecDeque::new(),
            hand_id: 0,
            rng,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn blinds(&self) -> Blinds {
        self.blinds
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[must_use]
    pub fn positions(&self) -> Positions {
        self.positions
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    #[must_use]
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    #[must_use]
    pub fn hand_id(&self) -> u64 {
        self.hand_id
    }

    #[must_use]
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// Settled pot plus all live round bets: the figure observers see.
    #[must_use]
    pub fn total_pot(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.round_bet).sum::<Chips>()
    }

    /// Every chip currently on the table. Constant across all transitions
    /// within a hand except for withheld odd split chips.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.stack + s.round_bet).sum::<Chips>()
    }

    /// What the given seat would owe to call right now.
    #[must_use]
    pub fn cost_to_call(&self, seat: SeatIndex) -> Chips {
        self.seats
            .get(seat)
            .map_or(0, |s| self.current_bet.saturating_sub(s.round_bet))
    }

    /// Take any events generated since the last drain.
    pub fn drain_events(&mut self) -> VecDeque<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seat a player. Allowed at any time; mid-hand the newcomer sits out
    /// until the next deal. Returns the identity that owns the seat.
    pub fn sit(
        &mut self,
        seat_idx: SeatIndex,
        buy_in: Chips,
        name: PlayerName,
    ) -> Result<PlayerId, TableError> {
        let big_blind = self.blinds.big;
        let seat = self
            .seats
            .get_mut(seat_idx)
            .ok_or(TableError::InvalidSeat(seat_idx))?;
        if seat.status.is_occupied() {
            return Err(TableError::SeatOccupied(seat_idx));
        }
        if buy_in < big_blind {
            return Err(TableError::BuyInOutOfRange {
                min: big_blind,
                max: Chips::MAX,
            });
        }
        let id = PlayerId::new();
        seat.occupy(id, name.clone(), buy_in);
        self.push_event(TableEvent::SatDown {
            seat: seat_idx,
            name,
            buy_in,
        });
        Ok(id)
    }

    /// Vacate a seat. Only the owning identity may do so. Standing up
    /// mid-hand forfeits the seat's live bet and folds it out of the hand.
    /// Returns the chips the player leaves with.
    pub fn stand(&mut self, seat_idx: SeatIndex, player: PlayerId) -> Result<Chips, TableError> {
        let seat = self
            .seats
            .get(seat_idx)
            .ok_or(TableError::InvalidSeat(seat_idx))?;
        let Some((owner, name)) = seat.occupant() else {
            return Err(TableError::SeatEmpty(seat_idx));
        };
        if owner != player {
            return Err(TableError::NotSeatOwner(seat_idx));
        }
        let name = name.clone();
        let was_contender = seat.status.contends();
        let chips = seat.stack;

        // A live bet stays on the table.
        let forfeited = self.seats[seat_idx].round_bet;
        self.pot += forfeited;
        self.seats[seat_idx].vacate();
        self.push_event(TableEvent::StoodUp {
            seat: seat_idx,
            name,
            chips,
        });

        if self.phase.betting_open() && was_contender {
            let contenders = self.contenders();
            match contenders.as_slice() {
                [] => {
                    // Everyone left mid-hand; nobody to pay.
                    self.abort_hand("all contenders left the table");
                }
                [survivor] => {
                    let survivor = *survivor;
                    self.award_uncontested(survivor);
                }
                _ if self.positions.to_act == Some(seat_idx) => {
                    self.positions.to_act = None;
                    self.resolve_after_action(seat_idx);
                }
                _ if self.round_complete() => {
                    self.positions.to_act = None;
                    self.advance_round();
                }
                _ => {}
            }
        }
        Ok(chips)
    }

    /// Start the next hand. Requires at least two seated players with
    /// chips; otherwise the table is left exactly as it was.
    pub fn start_hand(&mut self) -> Result<(), TableError> {
        if self.phase.betting_open() {
            return Err(TableError::HandInProgress);
        }
        let hopefuls = self
            .seats
            .iter()
            .filter(|s| s.status.is_occupied() && s.stack > 0)
            .count();
        if hopefuls < 2 {
            return Err(TableError::NotEnoughPlayers);
        }

        // Reset per-hand state and settle statuses: broke carryovers bust,
        // everyone else plays.
        self.board.clear();
        self.winners.clear();
        self.pot = 0;
        for idx in 0..MAX_SEATS {
            let seat = &mut self.seats[idx];
            seat.reset_for_hand();
            if !seat.status.is_occupied() {
                continue;
            }
            if seat.stack == 0 {
                if seat.status != SeatStatus::Busted {
                    seat.status = SeatStatus::Busted;
                    let name = seat.name.clone();
                    if let Some(name) = name {
                        self.push_event(TableEvent::Busted { name });
                    }
                }
            } else {
                seat.status = SeatStatus::Playing;
            }
        }
        self.deck.shuffle(&mut self.rng);
        self.hand_id += 1;

        // Button moves to the next eligible seat; first eligible seat on
        // the very first hand.
        let from = self.positions.dealer.unwrap_or(MAX_SEATS - 1);
        let Some(dealer) = self.next_playing_after(from) else {
            return Err(TableError::NotEnoughPlayers);
        };

        // Heads-up, the button posts the small blind.
        let eligible = self
            .seats
            .iter()
            .filter(|s| s.status == SeatStatus::Playing)
            .count();
        let (small_blind, big_blind) = if eligible == 2 {
            let other = self
                .next_playing_after(dealer)
                .unwrap_or(dealer);
            (dealer, other)
        } else {
            let sb = self.next_playing_after(dealer).unwrap_or(dealer);
            let bb = self.next_playing_after(sb).unwrap_or(sb);
            (sb, bb)
        };

        self.positions = Positions {
            dealer: Some(dealer),
            small_blind: Some(small_blind),
            big_blind: Some(big_blind),
            to_act: None,
            last_aggressor: Some(big_blind),
        };
        self.push_event(TableEvent::HandStarted {
            hand_id: self.hand_id,
            dealer,
        });

        let small = self.blinds.small;
        let big = self.blinds.big;
        let paid = self.seats[small_blind].post(small);
        self.post_blind_events(small_blind, paid, false);
        let paid = self.seats[big_blind].post(big);
        self.post_blind_events(big_blind, paid, true);

        // Two cards each, starting left of the button.
        self.phase = Phase::Preflop;
        self.current_bet = big;
        self.min_raise = big;
        let order = self.hand_order(small_blind);
        for _ in 0..HOLE_CARDS {
            for &idx in &order {
                match self.deck.deal() {
                    Ok(card) => self.seats[idx].hole.push(card),
                    Err(err) => {
                        error!("dealing hole cards: {err}");
                        self.abort_hand("deck exhausted while dealing");
                        return Ok(());
                    }
                }
            }
        }

        // First to act sits left of the big blind. Blinds can already be
        // all-in here, which may close the round outright.
        if self.round_complete() {
            self.advance_round();
        } else {
            self.positions.to_act = self.next_playing_after(big_blind);
            if self.positions.to_act.is_none() {
                self.advance_round();
            }
        }
        Ok(())
    }

    /// Apply one player action. Only the seat the turn pointer designates
    /// may act, and only with its owning identity. Invalid actions are
    /// rejected without mutating anything.
    pub fn act(&mut self, player: PlayerId, action: PlayerAction) -> Result<(), TableError> {
        if !self.phase.betting_open() {
            return Err(TableError::BettingClosed);
        }
        let idx = self.positions.to_act.ok_or(TableError::BettingClosed)?;
        let seat = &self.seats[idx];
        if seat.id != Some(player) {
            return Err(TableError::NotYourTurn);
        }

        match action {
            PlayerAction::Fold => {
                self.seats[idx].status = SeatStatus::Folded;
            }
            PlayerAction::Check => {
                let owed = self.current_bet.saturating_sub(seat.round_bet);
                if owed > 0 {
                    return Err(TableError::CheckNotAllowed { owed });
                }
            }
            PlayerAction::Call => {
                let owed = self.current_bet.saturating_sub(seat.round_bet);
                self.seats[idx].post(owed);
            }
            PlayerAction::Raise(amount) => {
                let target = self.current_bet + amount;
                let needed = target.saturating_sub(seat.round_bet);
                if needed >= seat.stack {
                    // The stack can't cover the target: all-in for
                    // whatever is left. The bet to match stays put.
                    let stack = self.seats[idx].stack;
                    self.seats[idx].post(stack);
                } else {
                    self.seats[idx].post(needed);
                    self.current_bet = target;
                    self.positions.last_aggressor = Some(idx);
                }
            }
        }
        self.seats[idx].has_acted = true;

        if let Some(name) = self.seats[idx].name.clone() {
            self.push_event(TableEvent::Acted { name: name.clone(), action });
            if self.seats[idx].status == SeatStatus::AllIn {
                self.push_event(TableEvent::WentAllIn { name });
            }
        }

        self.positions.to_act = None;
        self.resolve_after_action(idx);
        Ok(())
    }

    /// Project the full state for an observer, redacting hole cards the
    /// observer may not see.
    #[must_use]
    pub fn view_for(&self, observer: Observer) -> TableView {
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(idx, seat)| {
                let revealed = match observer {
                    Observer::Omniscient => true,
                    Observer::Player(id) => seat.id == Some(id) || self.showdown_reveals(seat),
                    Observer::Spectator => self.showdown_reveals(seat),
                };
                SeatView {
                    seat: idx,
                    name: seat.name.clone(),
                    stack: seat.stack,
                    round_bet: seat.round_bet,
                    status: seat.status,
                    hole: (revealed && !seat.hole.is_empty()).then(|| seat.hole.clone()),
                    is_dealer: self.positions.dealer == Some(idx),
                    is_small_blind: self.positions.small_blind == Some(idx),
                    is_big_blind: self.positions.big_blind == Some(idx),
                    has_acted: seat.has_acted,
                }
            })
            .collect();
        TableView {
            phase: self.phase,
            board: self.board.clone(),
            pot: self.pot,
            total_pot: self.total_pot(),
            current_bet: self.current_bet,
            min_raise: self.min_raise,
            to_act: self.positions.to_act,
            blinds: self.blinds,
            seats,
            winners: self.winners.clone(),
            log: self.log.iter().cloned().collect(),
        }
    }

    /// The default, fully-visible projection.
    #[must_use]
    pub fn view(&self) -> TableView {
        self.view_for(Observer::Omniscient)
    }

    fn showdown_reveals(&self, seat: &Seat) -> bool {
        self.phase == Phase::Showdown && seat.status.contends()
    }

    fn post_blind_events(&mut self, idx: SeatIndex, amount: Chips, big: bool) {
        if let Some(name) = self.seats[idx].name.clone() {
            let event = if big {
                TableEvent::PostedBigBlind { name: name.clone(), amount }
            } else {
                TableEvent::PostedSmallBlind { name: name.clone(), amount }
            };
            self.push_event(event);
            if self.seats[idx].status == SeatStatus::AllIn {
                self.push_event(TableEvent::WentAllIn { name });
            }
        }
    }

    /// Seats still competing for the pot.
    fn contenders(&self) -> Vec<SeatIndex> {
        (0..MAX_SEATS)
            .filter(|&i| self.seats[i].status.contends())
            .collect()
    }

    /// Next seat clockwise from `start` (exclusive) that can still act.
    fn next_playing_after(&self, start: SeatIndex) -> Option<SeatIndex> {
        (1..=MAX_SEATS)
            .map(|offset| (start + offset) % MAX_SEATS)
            .find(|&i| self.seats[i].status.can_act())
    }

    /// Seats in the hand, clockwise starting at `start`.
    fn hand_order(&self, start: SeatIndex) -> Vec<SeatIndex> {
        (0..MAX_SEATS)
            .map(|offset| (start + offset) % MAX_SEATS)
            .filter(|&i| self.seats[i].status == SeatStatus::Playing || self.seats[i].status == SeatStatus::AllIn)
            .collect()
    }

    /// A betting round is complete once every contender is either all-in
    /// or has acted and matched the current bet.
    fn round_complete(&self) -> bool {
        self.seats
            .iter()
            .filter(|s| s.status.contends())
            .all(|s| {
                s.status == SeatStatus::AllIn
                    || (s.has_acted && s.round_bet == self.current_bet)
            })
    }

    /// The end-of-round check run after every applied action: detect a
    /// lone survivor, close the round, or pass the turn along.
    fn resolve_after_action(&mut self, actor: SeatIndex) {
        let contenders = self.contenders();
        if let [survivor] = contenders.as_slice() {
            let survivor = *survivor;
            self.award_uncontested(survivor);
            return;
        }
        if self.round_complete() {
            self.advance_round();
            return;
        }
        match self.next_playing_after(actor) {
            Some(next) => self.positions.to_act = Some(next),
            // Nobody can act: the round is vacuously complete.
            None => self.advance_round(),
        }
    }

    /// Sweep the finished betting round into the pot and move to the next
    /// phase, dealing the board as required. Streets where nobody can act
    /// fall straight through to the next one.
    fn advance_round(&mut self) {
        loop {
            let collected: Chips = self.seats.iter().map(|s| s.round_bet).sum();
            for seat in &mut self.seats {
                seat.round_bet = 0;
                seat.has_acted = false;
            }
            self.pot += collected;
            self.current_bet = 0;
            self.min_raise = 0;
            self.positions.last_aggressor = None;
            self.positions.to_act = None;
            self.push_event(TableEvent::RoundComplete {
                phase: self.phase,
                pot: self.pot,
            });

            match self.phase {
                Phase::Preflop => {
                    self.phase = Phase::Flop;
                    if !self.deal_board(FLOP_SIZE) {
                        return;
                    }
                }
                Phase::Flop => {
                    self.phase = Phase::Turn;
                    if !self.deal_board(1) {
                        return;
                    }
                }
                Phase::Turn => {
                    self.phase = Phase::River;
                    if !self.deal_board(1) {
                        return;
                    }
                }
                Phase::River => {
                    self.showdown();
                    return;
                }
                Phase::Idle | Phase::Showdown => {
                    error!("advance_round called outside a hand");
                    return;
                }
            }

            if !self.round_complete() {
                let from = self.positions.dealer.unwrap_or(MAX_SEATS - 1);
                self.positions.to_act = self.next_playing_after(from);
                if self.positions.to_act.is_some() {
                    return;
                }
            }
            // Everyone left is all-in; run out the next street.
        }
    }

    /// Deal `count` cards onto the board. Returns false (after safely
    /// aborting the hand) on deck exhaustion, which correct sequencing
    /// makes unreachable.
    fn deal_board(&mut self, count: usize) -> bool {
        let mut dealt = Vec::with_capacity(count);
        for _ in 0..count {
            match self.deck.deal() {
                Ok(card) => dealt.push(card),
                Err(err) => {
                    error!("dealing the board: {err}");
                    self.abort_hand("deck exhausted while dealing");
                    return false;
                }
            }
        }
        self.board.extend_from_slice(&dealt);
        self.push_event(TableEvent::BoardDealt {
            phase: self.phase,
            cards: dealt,
        });
        true
    }

    /// Evaluate every contender against the board and split the pot among
    /// the best. Odd chips are withheld, not redistributed.
    fn showdown(&mut self) {
        self.phase = Phase::Showdown;
        self.positions.to_act = None;

        let contenders = self.contenders();
        if contenders.is_empty() {
            return;
        }
        let scored: Vec<(SeatIndex, HandValue)> = contenders
            .iter()
            .map(|&idx| {
                let mut cards = self.seats[idx].hole.clone();
                cards.extend_from_slice(&self.board);
                (idx, evaluate(&cards))
            })
            .collect();
        let best = scored.iter().map(|(_, value)| value.score).max().unwrap_or(0);
        let winners: Vec<_> = scored
            .into_iter()
            .filter(|(_, value)| value.score == best)
            .collect();

        let count = winners.len() as Chips;
        let share = self.pot / count;
        let remainder = self.pot - share * count;
        for (idx, value) in winners {
            self.seats[idx].stack += share;
            let occupant = self.seats[idx].id.zip(self.seats[idx].name.clone());
            if let Some((id, name)) = occupant {
                self.winners.push(Winner {
                    player: id,
                    name: name.clone(),
                    category: value.category,
                    amount: share,
                });
                self.push_event(TableEvent::WonShowdown {
                    name,
                    category: value.category,
                    amount: share,
                });
            }
        }
        if remainder > 0 {
            warn!("withholding ${remainder} in odd chips from a split pot");
            self.push_event(TableEvent::OddChipsWithheld { amount: remainder });
        }
        self.pot = 0;
    }

    /// Hand ends early: one seat gets everything on the table, evaluated
    /// board or not.
    fn award_uncontested(&mut self, idx: SeatIndex) {
        let collected: Chips = self.seats.iter().map(|s| s.round_bet).sum();
        for seat in &mut self.seats {
            seat.round_bet = 0;
            seat.has_acted = false;
        }
        let amount = self.pot + collected;
        self.pot = 0;
        self.current_bet = 0;
        self.min_raise = 0;
        self.positions.to_act = None;
        self.positions.last_aggressor = None;
        self.phase = Phase::Showdown;

        self.seats[idx].stack += amount;
        let mut cards = self.seats[idx].hole.clone();
        cards.extend_from_slice(&self.board);
        let category = evaluate(&cards).category;
        let occupant = self.seats[idx].id.zip(self.seats[idx].name.clone());
        if let Some((id, name)) = occupant {
            self.winners.push(Winner {
                player: id,
                name: name.clone(),
                category,
                amount,
            });
            self.push_event(TableEvent::WonUncontested { name, amount });
        }
    }

    /// Fatal-to-the-hand recovery: refund live bets, split the settled pot
    /// among contenders, and return to rest without corrupting stacks.
    fn abort_hand(&mut self, reason: &str) {
        error!("aborting hand #{}: {reason}", self.hand_id);
        for seat in &mut self.seats {
            // Live bets go back where they came from.
            seat.stack += seat.round_bet;
            seat.round_bet = 0;
            seat.has_acted = false;
            seat.hole.clear();
            if seat.status.contends() || seat.status == SeatStatus::Folded {
                seat.status = SeatStatus::SittingOut;
            }
        }
        let contenders: Vec<SeatIndex> = (0..MAX_SEATS)
            .filter(|&i| self.seats[i].status == SeatStatus::SittingOut)
            .collect();
        if !contenders.is_empty() && self.pot > 0 {
            let share = self.pot / contenders.len() as Chips;
            for &idx in &contenders {
                self.seats[idx].stack += share;
            }
            let remainder = self.pot - share * contenders.len() as Chips;
            if remainder > 0 {
                self.push_event(TableEvent::OddChipsWithheld { amount: remainder });
            }
        }
        self.pot = 0;
        self.board.clear();
        self.current_bet = 0;
        self.min_raise = 0;
        self.positions.to_act = None;
        self.positions.last_aggressor = None;
        self.phase = Phase::Idle;
        self.push_event(TableEvent::HandAborted {
            reason: reason.to_string(),
        });
    }

    fn push_event(&mut self, event: TableEvent) {
        if self.log.len() == EVENT_LOG_CAP {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            at: Utc::now(),
            event: event.clone(),
        });
        self.events.push_back(event);
    }
}
