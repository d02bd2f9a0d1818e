//! Boundary for the optional commentary/advice text service.
//!
//! The service consumes snapshots of public hand data and returns freeform
//! text. It contributes no game logic: the table works identically whether
//! a commentator is wired up, erroring, or absent, degrading to
//! [`FALLBACK_COMMENTARY`].

use async_trait::async_trait;

use crate::game::engine::Phase;
use crate::game::entities::{Card, Chips, HandCategory, PlayerName};

/// Used whenever the external service is unavailable or fails.
pub const FALLBACK_COMMENTARY: &str = "What a hand!";

/// Everything the service gets to see about a finished hand.
#[derive(Clone, Debug)]
pub struct HandSummary {
    pub board: Vec<Card>,
    pub winner: PlayerName,
    pub category: HandCategory,
    pub pot: Chips,
}

/// Everything the service gets to see when a player asks for advice.
#[derive(Clone, Debug)]
pub struct AdviceQuery {
    pub hole: Vec<Card>,
    pub board: Vec<Card>,
    pub phase: Phase,
    pub pot: Chips,
    pub cost_to_call: Chips,
}

/// An external text generator. Implementations may call out over any
/// transport they like; errors are opaque and never block the game.
#[async_trait]
pub trait Commentator: Send + Sync {
    async fn hand_summary(&self, summary: &HandSummary) -> anyhow::Result<String>;
    async fn advice(&self, query: &AdviceQuery) -> anyhow::Result<String>;
}

/// The built-in commentator: canned lines assembled from the hand data.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticCommentator;

#[async_trait]
impl Commentator for StaticCommentator {
    async fn hand_summary(&self, summary: &HandSummary) -> anyhow::Result<String> {
        Ok(format!(
            "{} takes down the ${} pot with {}.",
            summary.winner, summary.pot, summary.category
        ))
    }

    async fn advice(&self, query: &AdviceQuery) -> anyhow::Result<String> {
        let line = if query.cost_to_call == 0 {
            format!("Checking on the {} costs you nothing.", query.phase)
        } else {
            format!(
                "It's ${} to keep chasing a ${} pot. Price your draw honestly.",
                query.cost_to_call, query.pot
            )
        };
        Ok(line)
    }
}
