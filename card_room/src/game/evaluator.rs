//! Best-hand evaluation over two to seven cards.
//!
//! The evaluator collapses a player's hole cards plus the board into a
//! single integer score. Categories occupy bands one million apart, so a
//! stronger category always outranks a weaker one no matter the kickers,
//! and equal scores are true ties. The best five-card subset is selected
//! implicitly by checking categories from strongest to weakest.

use serde::{Deserialize, Serialize};

use super::entities::{Card, HandCategory, Suit, Value};

/// Width of one category band. Kicker encodings must stay below this so a
/// category can never bleed into the next band.
pub const CATEGORY_BAND: u32 = 1_000_000;

/// A ranked hand. Scores form a total order; higher always wins.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub score: u32,
    pub category: HandCategory,
}

/// Rank the best five-card hand within `cards`.
///
/// Accepts 2 to 7 cards (hole cards only through hole cards plus a full
/// board) and is insensitive to input order.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    debug_assert!(
        (2..=7).contains(&cards.len()),
        "evaluate takes 2-7 cards, got {}",
        cards.len()
    );

    // Distinct values, descending.
    let mut counts = [0u8; 15];
    for card in cards {
        counts[card.0 as usize] += 1;
    }
    let distinct: Vec<Value> = (2..=14u8).rev().filter(|&v| counts[v as usize] > 0).collect();

    let flush_suit = majority_suit(cards);
    let flush_values: Option<Vec<Value>> = flush_suit.map(|suit| {
        let mut values: Vec<Value> = cards.iter().filter(|c| c.1 == suit).map(|c| c.0).collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    });

    // 1. Straight flush.
    if let Some(values) = &flush_values
        && let Some(high) = straight_high(values)
    {
        return band(HandCategory::StraightFlush, u32::from(high));
    }

    // 2. Four of a kind.
    if let Some(quad) = highest_with_count(&counts, 4) {
        let kicker = distinct.iter().copied().find(|&v| v != quad).unwrap_or(0);
        return band(
            HandCategory::FourOfAKind,
            u32::from(quad) * 100 + u32::from(kicker),
        );
    }

    // 3. Full house. A second three-of-a-kind can serve as the pair.
    if let Some(trips) = highest_with_count(&counts, 3) {
        let pair = distinct
            .iter()
            .copied()
            .find(|&v| v != trips && counts[v as usize] >= 2);
        if let Some(pair) = pair {
            return band(
                HandCategory::FullHouse,
                u32::from(trips) * 100 + u32::from(pair),
            );
        }
    }

    // 4. Flush. Only the top card decides among flushes.
    if let Some(values) = &flush_values {
        return band(HandCategory::Flush, u32::from(values[0]));
    }

    // 5. Straight, including the A-2-3-4-5 wheel.
    if let Some(high) = straight_high(&distinct) {
        return band(HandCategory::Straight, u32::from(high));
    }

    // 6. Three of a kind.
    if let Some(trips) = highest_with_count(&counts, 3) {
        let mut kickers = distinct.iter().copied().filter(|&v| v != trips);
        let k1 = kickers.next().unwrap_or(0);
        let k2 = kickers.next().unwrap_or(0);
        return band(
            HandCategory::ThreeOfAKind,
            u32::from(trips) * 1000 + u32::from(k1) * 10 + u32::from(k2),
        );
    }

    // 7 & 8. Pairs.
    let pairs: Vec<Value> = distinct
        .iter()
        .copied()
        .filter(|&v| counts[v as usize] == 2)
        .collect();
    match pairs.as_slice() {
        [high, low, ..] => {
            let kicker = distinct
                .iter()
                .copied()
                .find(|v| v != high && v != low)
                .unwrap_or(0);
            band(
                HandCategory::TwoPair,
                u32::from(*high) * 1000 + u32::from(*low) * 10 + u32::from(kicker),
            )
        }
        [pair] => {
            let mut kickers = distinct.iter().copied().filter(|v| v != pair);
            let k1 = kickers.next().unwrap_or(0);
            let k2 = kickers.next().unwrap_or(0);
            let k3 = kickers.next().unwrap_or(0);
            // Weighted so earlier kickers dominate while the total stays
            // below 100 and can never override the pair rank.
            let kicker_weight =
                u32::from(k1) * 5 + u32::from(k2) * 2 + u32::from(k3);
            band(
                HandCategory::OnePair,
                u32::from(*pair) * 100 + kicker_weight,
            )
        }
        // 9. High card.
        [] => band(HandCategory::HighCard, u32::from(distinct[0])),
    }
}

fn band(category: HandCategory, offset: u32) -> HandValue {
    debug_assert!(offset < CATEGORY_BAND);
    let base = match category {
        HandCategory::HighCard => 1,
        HandCategory::OnePair => 2,
        HandCategory::TwoPair => 3,
        HandCategory::ThreeOfAKind => 4,
        HandCategory::Straight => 5,
        HandCategory::Flush => 6,
        HandCategory::FullHouse => 7,
        HandCategory::FourOfAKind => 8,
        HandCategory::StraightFlush => 9,
    };
    HandValue {
        score: base * CATEGORY_BAND + offset,
        category,
    }
}

/// Highest value appearing at least `count` times.
fn highest_with_count(counts: &[u8; 15], count: u8) -> Option<Value> {
    (2..=14u8).rev().find(|&v| counts[v as usize] >= count)
}

/// The suit holding five or more of the cards, if any. At most one suit
/// can qualify in a seven-card hand.
fn majority_suit(cards: &[Card]) -> Option<Suit> {
    let mut counts = [0u8; 4];
    for card in cards {
        let idx = match card.1 {
            Suit::Club => 0,
            Suit::Spade => 1,
            Suit::Diamond => 2,
            Suit::Heart => 3,
        };
        counts[idx] += 1;
    }
    [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart]
        .into_iter()
        .zip(counts)
        .find(|&(_, n)| n >= 5)
        .map(|(suit, _)| suit)
}

/// High card of the best straight among `values`, which must be sorted
/// descending (duplicates are tolerated). The wheel counts as a straight
/// with high card five.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut run = 1usize;
    let mut prev: Option<Value> = None;
    for &v in values {
        match prev {
            Some(p) if p == v => continue,
            Some(p) if p == v + 1 => {
                run += 1;
                if run == 5 {
                    return Some(v + 4);
                }
            }
            _ => run = 1,
        }
        prev = Some(v);
    }
    // Ace plays low in the wheel.
    let has = |v: Value| values.contains(&v);
    if has(14) && has(5) && has(4) && has(3) && has(2) {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit::{Club, Diamond, Heart, Spade};

    fn score(cards: &[Card]) -> u32 {
        evaluate(cards).score
    }

    #[test]
    fn test_straight_flush_band() {
        let hand = [
            Card(9, Heart),
            Card(8, Heart),
            Card(7, Heart),
            Card(6, Heart),
            Card(5, Heart),
            Card(2, Club),
            Card(2, Spade),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.score, 9_000_000 + 9);
    }

    #[test]
    fn test_royal_flush_is_ace_high_straight_flush() {
        let hand = [
            Card(14, Spade),
            Card(13, Spade),
            Card(12, Spade),
            Card(11, Spade),
            Card(10, Spade),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.score, 9_000_000 + 14);
    }

    #[test]
    fn test_steel_wheel_scores_five_high() {
        let hand = [
            Card(14, Club),
            Card(2, Club),
            Card(3, Club),
            Card(4, Club),
            Card(5, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.score, 9_000_000 + 5);
    }

    #[test]
    fn test_four_of_a_kind_with_kicker() {
        let hand = [
            Card(9, Club),
            Card(9, Spade),
            Card(9, Diamond),
            Card(9, Heart),
            Card(13, Club),
            Card(4, Spade),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::FourOfAKind);
        assert_eq!(value.score, 8_000_000 + 900 + 13);
    }

    #[test]
    fn test_full_house_trips_and_pair() {
        let hand = [
            Card(8, Club),
            Card(8, Spade),
            Card(8, Diamond),
            Card(5, Heart),
            Card(5, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::FullHouse);
        assert_eq!(value.score, 7_000_000 + 800 + 5);
    }

    #[test]
    fn test_double_trips_counts_as_full_house() {
        let hand = [
            Card(8, Club),
            Card(8, Spade),
            Card(8, Diamond),
            Card(11, Heart),
            Card(11, Club),
            Card(11, Spade),
            Card(2, Heart),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::FullHouse);
        assert_eq!(value.score, 7_000_000 + 1100 + 8);
    }

    #[test]
    fn test_flush_scored_by_top_card() {
        let hand = [
            Card(13, Diamond),
            Card(10, Diamond),
            Card(7, Diamond),
            Card(4, Diamond),
            Card(2, Diamond),
            Card(14, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::Flush);
        assert_eq!(value.score, 6_000_000 + 13);
    }

    #[test]
    fn test_straight_highest_run_wins() {
        let hand = [
            Card(4, Club),
            Card(5, Spade),
            Card(6, Diamond),
            Card(7, Heart),
            Card(8, Club),
            Card(9, Spade),
            Card(2, Heart),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::Straight);
        assert_eq!(value.score, 5_000_000 + 9);
    }

    #[test]
    fn test_wheel_straight_is_five_high() {
        let wheel = [
            Card(14, Club),
            Card(2, Spade),
            Card(3, Diamond),
            Card(4, Heart),
            Card(5, Club),
        ];
        let six_high = [
            Card(2, Spade),
            Card(3, Diamond),
            Card(4, Heart),
            Card(5, Club),
            Card(6, Club),
        ];
        let wheel_value = evaluate(&wheel);
        assert_eq!(wheel_value.category, HandCategory::Straight);
        assert_eq!(wheel_value.score, 5_000_000 + 5);
        assert!(wheel_value.score < score(&six_high));
    }

    #[test]
    fn test_ace_does_not_wrap_around() {
        // Q-K-A-2-3 is not a straight.
        let hand = [
            Card(12, Club),
            Card(13, Spade),
            Card(14, Diamond),
            Card(2, Heart),
            Card(3, Club),
        ];
        assert_eq!(evaluate(&hand).category, HandCategory::HighCard);
    }

    #[test]
    fn test_three_of_a_kind_kickers() {
        let hand = [
            Card(7, Club),
            Card(7, Spade),
            Card(7, Diamond),
            Card(14, Heart),
            Card(9, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::ThreeOfAKind);
        assert_eq!(value.score, 4_000_000 + 7000 + 140 + 9);
    }

    #[test]
    fn test_two_pair_encoding() {
        let hand = [
            Card(11, Club),
            Card(11, Spade),
            Card(4, Diamond),
            Card(4, Heart),
            Card(13, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::TwoPair);
        assert_eq!(value.score, 3_000_000 + 11_000 + 40 + 13);
    }

    #[test]
    fn test_one_pair_kickers_dominate_in_order() {
        let base = [
            Card(9, Club),
            Card(9, Spade),
            Card(14, Diamond),
            Card(7, Heart),
            Card(3, Club),
        ];
        let better_first_kicker = [
            Card(9, Club),
            Card(9, Spade),
            Card(14, Diamond),
            Card(8, Heart),
            Card(3, Club),
        ];
        assert!(score(&better_first_kicker) > score(&base));

        // A higher pair beats any kicker set.
        let higher_pair = [
            Card(10, Club),
            Card(10, Spade),
            Card(4, Diamond),
            Card(3, Heart),
            Card(2, Club),
        ];
        assert!(score(&higher_pair) > score(&better_first_kicker));
    }

    #[test]
    fn test_high_card_scored_by_top_card() {
        let hand = [
            Card(14, Club),
            Card(10, Spade),
            Card(8, Diamond),
            Card(5, Heart),
            Card(3, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::HighCard);
        assert_eq!(value.score, 1_000_000 + 14);
    }

    #[test]
    fn test_two_hole_cards_only() {
        let pair = [Card(12, Club), Card(12, Spade)];
        let value = evaluate(&pair);
        assert_eq!(value.category, HandCategory::OnePair);

        let unpaired = [Card(12, Club), Card(7, Spade)];
        assert_eq!(evaluate(&unpaired).category, HandCategory::HighCard);
    }

    #[test]
    fn test_order_independence() {
        let mut hand = vec![
            Card(9, Heart),
            Card(8, Heart),
            Card(7, Heart),
            Card(6, Heart),
            Card(5, Heart),
            Card(2, Club),
            Card(14, Spade),
        ];
        let expected = evaluate(&hand);
        hand.reverse();
        assert_eq!(evaluate(&hand), expected);
        hand.swap(0, 3);
        hand.swap(1, 5);
        assert_eq!(evaluate(&hand), expected);
    }

    #[test]
    fn test_straight_flush_beats_plain_flush_and_straight() {
        let straight_flush = [
            Card(6, Club),
            Card(5, Club),
            Card(4, Club),
            Card(3, Club),
            Card(2, Club),
        ];
        let ace_high_flush = [
            Card(14, Heart),
            Card(12, Heart),
            Card(9, Heart),
            Card(6, Heart),
            Card(3, Heart),
        ];
        let ace_high_straight = [
            Card(14, Club),
            Card(13, Spade),
            Card(12, Diamond),
            Card(11, Heart),
            Card(10, Club),
        ];
        assert!(score(&straight_flush) > score(&ace_high_flush));
        assert!(score(&straight_flush) > score(&ace_high_straight));
    }

    #[test]
    fn test_flush_subset_prefers_straight_flush_over_higher_flush() {
        // Seven clubs where the straight-flush run excludes the ace: the
        // straight flush must win out over scoring it as an ace-high flush.
        let hand = [
            Card(14, Club),
            Card(9, Club),
            Card(8, Club),
            Card(7, Club),
            Card(6, Club),
            Card(5, Club),
            Card(2, Club),
        ];
        let value = evaluate(&hand);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.score, 9_000_000 + 9);
    }

    #[test]
    fn test_identical_ranks_tie_exactly() {
        let a = [
            Card(10, Club),
            Card(10, Spade),
            Card(14, Diamond),
            Card(8, Heart),
            Card(4, Club),
        ];
        let b = [
            Card(10, Diamond),
            Card(10, Heart),
            Card(14, Spade),
            Card(8, Club),
            Card(4, Diamond),
        ];
        assert_eq!(score(&a), score(&b));
    }
}
