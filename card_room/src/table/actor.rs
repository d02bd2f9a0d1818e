//! Table actor: the single writer that owns a [`Table`].
//!
//! All mutation requests arrive through one mpsc inbox and are applied
//! strictly serially, in arrival order. Every phase transition completes
//! before the next command is read, so no observer can ever see a table
//! mid-transition. One actor per table; independent tables are independent
//! serialization domains.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::config::TableConfig;
use super::messages::{StateUpdate, SubscriberId, TableCommand};
use crate::commentary::{AdviceQuery, Commentator, FALLBACK_COMMENTARY, HandSummary};
use crate::game::engine::{Observer, Table, TableError, TableEvent, TableView};
use crate::game::entities::{Chips, PlayerAction, PlayerId, PlayerName, SeatIndex};

/// Cloneable handle for sending commands to a table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    async fn request<T>(
        &self,
        command: TableCommand,
        reply: oneshot::Receiver<Result<T, TableError>>,
    ) -> Result<T, TableError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| TableError::TableClosed)?;
        reply.await.map_err(|_| TableError::TableClosed)?
    }

    pub async fn sit(
        &self,
        seat: SeatIndex,
        buy_in: Chips,
        name: &str,
    ) -> Result<PlayerId, TableError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TableCommand::Sit {
                seat,
                name: name.to_string(),
                buy_in,
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn stand(&self, seat: SeatIndex, player: PlayerId) -> Result<Chips, TableError> {
        let (tx, rx) = oneshot::channel();
        self.request(TableCommand::Stand { seat, player, reply: tx }, rx)
            .await
    }

    pub async fn start_hand(&self) -> Result<(), TableError> {
        let (tx, rx) = oneshot::channel();
        self.request(TableCommand::StartHand { reply: tx }, rx).await
    }

    pub async fn act(&self, player: PlayerId, action: PlayerAction) -> Result<(), TableError> {
        let (tx, rx) = oneshot::channel();
        self.request(TableCommand::Act { player, action, reply: tx }, rx)
            .await
    }

    pub async fn view(&self, observer: Observer) -> Result<TableView, TableError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TableCommand::GetView { observer, reply: tx })
            .await
            .map_err(|_| TableError::TableClosed)?;
        rx.await.map_err(|_| TableError::TableClosed)
    }

    pub async fn advice(&self, player: PlayerId) -> Result<String, TableError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TableCommand::Advice { player, reply: tx })
            .await
            .map_err(|_| TableError::TableClosed)?;
        rx.await.map_err(|_| TableError::TableClosed)
    }

    /// Subscribe to redacted state broadcasts. Updates arrive on the
    /// returned channel; dropping it unsubscribes implicitly.
    pub async fn subscribe(
        &self,
        observer: Observer,
        capacity: usize,
    ) -> Result<(SubscriberId, mpsc::Receiver<StateUpdate>), TableError> {
        let (update_tx, update_rx) = mpsc::channel(capacity);
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TableCommand::Subscribe {
                observer,
                sender: update_tx,
                reply: tx,
            })
            .await
            .map_err(|_| TableError::TableClosed)?;
        let id = rx.await.map_err(|_| TableError::TableClosed)?;
        Ok((id, update_rx))
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Unsubscribe { id })
            .await
            .map_err(|_| TableError::TableClosed)
    }

    pub async fn close(&self) -> Result<(), TableError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TableCommand::Close { reply: tx })
            .await
            .map_err(|_| TableError::TableClosed)?;
        rx.await.map_err(|_| TableError::TableClosed)
    }
}

/// The actor managing a single poker table.
pub struct TableActor {
    config: TableConfig,
    table: Table,
    inbox: mpsc::Receiver<TableCommand>,
    subscribers: HashMap<SubscriberId, (Observer, mpsc::Sender<StateUpdate>)>,
    commentator: Option<Arc<dyn Commentator>>,
    closed: bool,
}

impl TableActor {
    /// Create an actor and the handle for talking to it.
    pub fn new(
        config: TableConfig,
        commentator: Option<Arc<dyn Commentator>>,
    ) -> (Self, TableHandle) {
        let table = Table::new(config.blinds());
        Self::with_table(config, table, commentator)
    }

    /// Like [`TableActor::new`], but with a deck seeded for reproducible
    /// hands.
    pub fn with_seed(
        config: TableConfig,
        seed: u64,
        commentator: Option<Arc<dyn Commentator>>,
    ) -> (Self, TableHandle) {
        let table = Table::with_seed(config.blinds(), seed);
        Self::with_table(config, table, commentator)
    }

    fn with_table(
        config: TableConfig,
        table: Table,
        commentator: Option<Arc<dyn Commentator>>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let actor = Self {
            config,
            table,
            inbox,
            subscribers: HashMap::new(),
            commentator,
            closed: false,
        };
        (actor, TableHandle { sender })
    }

    /// Run the actor event loop until every handle is dropped or a close
    /// command arrives.
    pub async fn run(mut self) {
        info!("table '{}' open, blinds {}", self.config.name, self.config.blinds());
        while let Some(command) = self.inbox.recv().await {
            self.handle_command(command).await;
            if self.closed {
                break;
            }
        }
        info!("table '{}' closed", self.config.name);
    }

    async fn handle_command(&mut self, command: TableCommand) {
        match command {
            TableCommand::Sit {
                seat,
                name,
                buy_in,
                reply,
            } => {
                let result = self.handle_sit(seat, buy_in, &name);
                let ok = result.is_ok();
                let _ = reply.send(result);
                if ok {
                    self.broadcast().await;
                }
            }

            TableCommand::Stand { seat, player, reply } => {
                let result = self.table.stand(seat, player);
                let ok = result.is_ok();
                let _ = reply.send(result);
                if ok {
                    self.broadcast().await;
                }
            }

            TableCommand::StartHand { reply } => {
                let result = self.table.start_hand();
                let ok = result.is_ok();
                let _ = reply.send(result);
                if ok {
                    self.broadcast().await;
                }
            }

            TableCommand::Act { player, action, reply } => {
                let result = self.table.act(player, action);
                let ok = result.is_ok();
                let _ = reply.send(result);
                if ok {
                    self.broadcast().await;
                }
            }

            TableCommand::GetView { observer, reply } => {
                let _ = reply.send(self.table.view_for(observer));
            }

            TableCommand::Advice { player, reply } => {
                let line = self.advice_for(player).await;
                let _ = reply.send(line);
            }

            TableCommand::Subscribe {
                observer,
                sender,
                reply,
            } => {
                let id = Uuid::new_v4();
                self.subscribers.insert(id, (observer, sender));
                debug!("table '{}': subscriber {id} joined", self.config.name);
                let _ = reply.send(id);
            }

            TableCommand::Unsubscribe { id } => {
                self.subscribers.remove(&id);
                debug!("table '{}': subscriber {id} left", self.config.name);
            }

            TableCommand::Close { reply } => {
                self.closed = true;
                let _ = reply.send(());
            }
        }
    }

    fn handle_sit(
        &mut self,
        seat: SeatIndex,
        buy_in: Chips,
        name: &str,
    ) -> Result<PlayerId, TableError> {
        let min = self.config.min_buy_in_chips();
        let max = self.config.max_buy_in_chips();
        if buy_in < min || buy_in > max {
            return Err(TableError::BuyInOutOfRange { min, max });
        }
        self.table.sit(seat, buy_in, PlayerName::new(name))
    }

    /// Push the applied state to every subscriber, each with their own
    /// redaction. Dead receivers are pruned; full ones miss this update.
    async fn broadcast(&mut self) {
        let events: Vec<TableEvent> = self.table.drain_events().into();

        // Presentation pacing between a completed betting round and the
        // next street being shown. The state is already fully applied, so
        // this can't admit concurrent mutation; it only delays the reveal.
        let paced = events
            .iter()
            .any(|event| matches!(event, TableEvent::RoundComplete { .. }));
        if paced && self.config.pacing_ms > 0 {
            tokio::time::sleep(self.config.pacing()).await;
        }

        let commentary = self.hand_commentary(&events).await;

        self.subscribers.retain(|id, (observer, sender)| {
            let update = StateUpdate {
                view: self.table.view_for(*observer),
                events: events.clone(),
                commentary: commentary.clone(),
            };
            match sender.try_send(update) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("subscriber {id} lagging, dropping update");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Commentary for a hand that just ended, if one did. Service failures
    /// degrade to the static fallback and never block progression.
    async fn hand_commentary(&self, events: &[TableEvent]) -> Option<String> {
        let winner = events.iter().find_map(|event| match event {
            TableEvent::WonShowdown { name, category, amount } => {
                Some((name.clone(), *category, *amount))
            }
            TableEvent::WonUncontested { name, amount } => {
                let category = self
                    .table
                    .winners()
                    .iter()
                    .find(|w| &w.name == name)
                    .map(|w| w.category)?;
                Some((name.clone(), category, *amount))
            }
            _ => None,
        })?;

        let (name, category, amount) = winner;
        let summary = HandSummary {
            board: self.table.board().to_vec(),
            winner: name,
            category,
            pot: amount,
        };
        let line = match &self.commentator {
            Some(commentator) => match commentator.hand_summary(&summary).await {
                Ok(line) => line,
                Err(err) => {
                    warn!("commentary service failed: {err}");
                    FALLBACK_COMMENTARY.to_string()
                }
            },
            None => FALLBACK_COMMENTARY.to_string(),
        };
        Some(line)
    }

    async fn advice_for(&self, player: PlayerId) -> String {
        let seat = self
            .table
            .seats()
            .iter()
            .position(|s| s.id == Some(player));
        let Some(seat) = seat else {
            return FALLBACK_COMMENTARY.to_string();
        };
        let query = AdviceQuery {
            hole: self.table.seats()[seat].hole.clone(),
            board: self.table.board().to_vec(),
            phase: self.table.phase(),
            pot: self.table.total_pot(),
            cost_to_call: self.table.cost_to_call(seat),
        };
        match &self.commentator {
            Some(commentator) => match commentator.advice(&query).await {
                Ok(line) => line,
                Err(err) => {
                    warn!("advice service failed: {err}");
                    FALLBACK_COMMENTARY.to_string()
                }
            },
            None => FALLBACK_COMMENTARY.to_string(),
        }
    }
}
