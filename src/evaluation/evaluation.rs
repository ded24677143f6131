use super::evaluator::Evaluator;
use super::evaluator::SHORT_WHEEL;
use super::evaluator::WHEEL;
use super::ranking::Ranking;
use super::strength::HandStrength;
use super::tables;
use super::tables::Classes;
use super::wilds::WildSet;
use crate::cards::Card;
use crate::cards::DeckSpec;
use crate::cards::Rank;
use crate::errors::RulesError;
use std::cmp::Ordering;

/// The evaluation-type taxonomy.
///
/// Every variant a rule document can name maps to one of these orderings.
/// The closed enum is deliberate: a new way of ranking hands is a change
/// to the engine, not to a document.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    High,
    ShortHigh,
    #[serde(rename = "20_high")]
    TwentyHigh,
    HighWild,
    A5Low,
    A5LowHigh,
    #[serde(rename = "27_low")]
    Deuce7Low,
    Badugi,
    HiDugi,
    #[serde(rename = "49")]
    FortyNine,
    Zero,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "low_pip_6")]
    LowPipSix,
    #[serde(rename = "21")]
    TwentyOne,
}

impl Evaluation {
    /// number of cards a complete hand holds under this ordering
    pub const fn hand_size(&self) -> usize {
        match self {
            Self::Badugi | Self::HiDugi => 4,
            _ => 5,
        }
    }
    /// aces play low in these families
    pub const fn ace_low(&self) -> bool {
        matches!(self, Self::A5Low | Self::A5LowHigh | Self::Badugi)
    }
    /// the class table backing this family, if it is table-driven
    fn classes(&self) -> Option<&'static Classes> {
        match self {
            Self::High | Self::HighWild | Self::TwentyHigh => Some(&tables::HIGH),
            Self::ShortHigh => Some(&tables::SHORT),
            Self::Deuce7Low => Some(&tables::DEUCE7),
            Self::A5Low => Some(&tables::A5LOW),
            Self::A5LowHigh => Some(&tables::A5HIGH),
            _ => None,
        }
    }
    /// the wheel mask this family recognizes
    const fn wheel(&self) -> u16 {
        match self {
            Self::ShortHigh => SHORT_WHEEL,
            Self::Deuce7Low => 0,
            _ => WHEEL,
        }
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A minimum strength a hand must meet to win a pot share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Qualifier {
    pub rank: u32,
    pub ordered_rank: u32,
}

impl Qualifier {
    pub fn meets(&self, strength: &HandStrength) -> bool {
        strength.is_qualified()
            && (strength.rank, strength.ordered_rank) <= (self.rank, self.ordered_rank)
    }
    /// eight-or-better for ace-to-five low: the worst qualifying hand is 8-7-6-5-4
    pub fn eight_or_better() -> Self {
        let class = tables::A5LOW
            .lookup_values(&[7, 6, 5, 4, 3], false)
            .expect("class table covers all five-card hands");
        Self {
            rank: class.rank,
            ordered_rank: class.ordered_rank,
        }
    }
}

/// Per-evaluation options: qualifier ceiling, wild cards in force, and
/// the deck composition wild substitution may draw from.
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub qualifier: Option<Qualifier>,
    pub wilds: WildSet,
    pub deck: DeckSpec,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            qualifier: None,
            wilds: WildSet::default(),
            deck: DeckSpec::standard(),
        }
    }
}

/// Evaluate a fixed card multiset under one ordering.
///
/// Wild cards (and jokers, always) are substituted over all candidate
/// replacements and the best resulting hand kept. The qualifier, if any,
/// gates the result down to rank zero.
pub fn evaluate(
    cards: &[Card],
    eval: Evaluation,
    ctx: &EvalContext,
) -> Result<HandStrength, RulesError> {
    let marked = cards
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_joker() || ctx.wilds.is_marked(c))
        .map(|(i, _)| i)
        .collect::<Vec<usize>>();
    let mut best: Option<HandStrength> = None;
    let mut fallback: Option<HandStrength> = None;
    for variant in substitutions(cards, &marked, &ctx.deck) {
        let strength = raw(&variant, eval)?;
        let keep = |best: &mut Option<HandStrength>, strength: &HandStrength| match best {
            Some(b) if !strength.beats(b) => {}
            _ => *best = Some(strength.clone()),
        };
        if admissible(cards, &variant, &marked, &ctx.wilds, eval) {
            keep(&mut best, &strength);
        }
        keep(&mut fallback, &strength);
    }
    // a bug with no ace left to stand for degrades to a full wild
    let mut best = best.or(fallback).ok_or_else(|| {
        RulesError::InvalidRules("no evaluable hand after wild substitution".to_string())
    })?;
    best.cards_used = cards.to_vec();
    match ctx.qualifier {
        Some(q) if !q.meets(&best) => Ok(HandStrength::unqualified()),
        _ => Ok(best),
    }
}

/// Three-way comparison under one ordering: -1 if a loses, +1 if a wins.
pub fn compare(a: &HandStrength, b: &HandStrength) -> i32 {
    match a.cmp_strength(b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Sort cards strongest-first under the evaluation's ace treatment.
pub fn sort(cards: &mut [Card], eval: Evaluation) {
    cards.sort_by_key(|c| {
        std::cmp::Reverse(if c.rank().is_joker() {
            14
        } else if eval.ace_low() {
            c.rank().low_value()
        } else {
            c.rank() as u8
        })
    });
}

/// Comparable key for a partial (1..=4 card) visible hand.
///
/// Bring-in and high-hand turn orders compare exposed cards before hands
/// are complete; this is the conventional pattern-then-ranks comparison,
/// with a suit tiebreak only in the single-card case. Larger keys are
/// stronger high hands.
pub fn visible_key(cards: &[Card], eval: Evaluation) -> Vec<u8> {
    let value = |c: &Card| {
        if c.rank().is_joker() {
            14u8
        } else if eval.ace_low() {
            c.rank().low_value()
        } else {
            c.rank() as u8 + 1
        }
    };
    let mut counts: std::collections::HashMap<u8, u8> = std::collections::HashMap::new();
    for card in cards {
        *counts.entry(value(card)).or_insert(0) += 1;
    }
    let mut groups = counts.into_iter().collect::<Vec<(u8, u8)>>();
    groups.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    let shape = groups.iter().map(|g| g.1 * g.1).sum::<u8>();
    let mut key = vec![shape];
    key.extend(groups.iter().map(|g| g.0));
    if let [only] = cards {
        key.push(only.suit() as u8);
    }
    key
}

/// evaluate with no wilds in play
fn raw(cards: &[Card], eval: Evaluation) -> Result<HandStrength, RulesError> {
    match eval {
        Evaluation::Badugi => Ok(badugi(cards, false)),
        Evaluation::HiDugi => Ok(badugi(cards, true)),
        Evaluation::FortyNine
        | Evaluation::Zero
        | Evaluation::Six
        | Evaluation::LowPipSix
        | Evaluation::TwentyOne => Ok(pips(cards, eval)),
        _ => {
            if cards.len() != eval.hand_size() {
                return Err(RulesError::InvalidRules(format!(
                    "{} evaluation over {} cards",
                    eval,
                    cards.len()
                )));
            }
            let classes = eval.classes().expect("table-driven family");
            let class = classes
                .lookup(cards)
                .expect("class table covers all five-card hands");
            Ok(HandStrength {
                rank: class.rank,
                ordered_rank: class.ordered_rank,
                description: class.description.clone(),
                cards_used: cards.to_vec(),
            })
        }
    }
}

/// best badugi inside the given cards: distinct ranks, distinct suits,
/// largest first, then lowest (or highest for hi-dugi)
fn badugi(cards: &[Card], high: bool) -> HandStrength {
    let value = |c: &Card| {
        if high {
            c.rank() as u8 + 1
        } else {
            c.rank().low_value() + 1
        }
    };
    let mut best: Option<(usize, Vec<u8>, Vec<Card>)> = None;
    for mask in 1u32..(1 << cards.len().min(16)) {
        let subset = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| *c)
            .collect::<Vec<Card>>();
        if subset.len() > 4 {
            continue;
        }
        let ranks = subset.iter().map(|c| c.rank()).collect::<std::collections::HashSet<_>>();
        let suits = subset.iter().map(|c| c.suit()).collect::<std::collections::HashSet<_>>();
        if ranks.len() != subset.len() || suits.len() != subset.len() {
            continue;
        }
        let mut values = subset.iter().map(|c| value(c)).collect::<Vec<u8>>();
        values.sort_unstable_by(|a, b| b.cmp(a));
        if high {
            for v in values.iter_mut() {
                *v = 15 - *v;
            }
        }
        // larger subsets win; within a size, lexicographically smaller
        // (post-inversion) values win
        let candidate = (subset.len(), values, subset);
        let better = match best {
            None => true,
            Some((n, ref v, _)) => candidate.0 > n || (candidate.0 == n && candidate.1 < *v),
        };
        if better {
            best = Some(candidate);
        }
    }
    let (n, values, subset) = best.expect("at least one single-card badugi");
    let labels = {
        let mut cards = subset.clone();
        sort(&mut cards, if high { Evaluation::HiDugi } else { Evaluation::Badugi });
        cards
            .iter()
            .map(|c| c.rank().to_string())
            .collect::<Vec<String>>()
            .join("-")
    };
    HandStrength {
        rank: (5 - n) as u32,
        ordered_rank: values
            .iter()
            .fold(0u32, |acc, &v| (acc << 4) | v as u32)
            + 1,
        description: match n {
            4 => format!("Badugi: {}", labels),
            _ => format!("{}-Card: {}", n, labels),
        },
        cards_used: subset,
    }
}

/// pip-count orderings: rank is always 1, the total drives ordered_rank
fn pips(cards: &[Card], eval: Evaluation) -> HandStrength {
    let pip = |c: &Card| -> i32 {
        let rank = c.rank();
        match eval {
            Evaluation::FortyNine => match rank {
                Rank::Joker => 0,
                Rank::Ace => 1,
                r => r as i32 + 2,
            },
            Evaluation::TwentyOne => match rank {
                Rank::Joker => 0,
                Rank::Ace => 11,
                Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
                r => r as i32 + 2,
            },
            _ => match rank {
                Rank::Joker => 0,
                Rank::Ace => 1,
                Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 0,
                r => r as i32 + 2,
            },
        }
    };
    let mut total = cards.iter().map(|c| pip(c)).sum::<i32>();
    if eval == Evaluation::TwentyOne {
        let mut aces = cards.iter().filter(|c| c.rank() == Rank::Ace).count();
        while total > 21 && aces > 0 {
            total -= 10;
            aces -= 1;
        }
    }
    let ordered = match eval {
        Evaluation::FortyNine => 1000 - total,
        Evaluation::Zero | Evaluation::LowPipSix => total + 1,
        Evaluation::Six => {
            if total <= 6 {
                6 - total + 1
            } else {
                1000 + total
            }
        }
        Evaluation::TwentyOne => {
            if total <= 21 {
                21 - total + 1
            } else {
                1000 + total
            }
        }
        _ => unreachable!("pip families only"),
    };
    HandStrength {
        rank: 1,
        ordered_rank: ordered as u32,
        description: format!("Pip Total: {}", total),
        cards_used: cards.to_vec(),
    }
}

/// all assignments of replacement cards into the marked (wild) slots;
/// replacements come from the variant's own deck composition
fn substitutions(cards: &[Card], marked: &[usize], deck: &DeckSpec) -> Vec<Vec<Card>> {
    if marked.is_empty() {
        return vec![cards.to_vec()];
    }
    let naturals = cards
        .iter()
        .enumerate()
        .filter(|(i, _)| !marked.contains(i))
        .map(|(_, c)| *c)
        .collect::<Vec<Card>>();
    let pool = deck
        .composition()
        .into_iter()
        .filter(|c| !c.is_joker())
        .filter(|c| !naturals.contains(c))
        .collect::<Vec<Card>>();
    let mut variants = Vec::new();
    let mut slots = Vec::with_capacity(marked.len());
    expand(cards, marked, &pool, 0, &mut slots, &mut variants);
    variants
}

fn expand(
    cards: &[Card],
    marked: &[usize],
    pool: &[Card],
    from: usize,
    slots: &mut Vec<Card>,
    variants: &mut Vec<Vec<Card>>,
) {
    if slots.len() == marked.len() {
        let mut variant = cards.to_vec();
        for (slot, &index) in slots.iter().zip(marked.iter()) {
            variant[index] = *slot;
        }
        variants.push(variant);
        return;
    }
    for i in from..pool.len() {
        slots.push(pool[i]);
        expand(cards, marked, pool, i + 1, slots, variants);
        slots.pop();
    }
}

/// bugs may stand in for an ace, or for any card that completes a
/// straight or flush; full wilds stand in for anything
fn admissible(
    original: &[Card],
    variant: &[Card],
    marked: &[usize],
    wilds: &WildSet,
    eval: Evaluation,
) -> bool {
    let bugs = marked
        .iter()
        .filter(|&&i| wilds.is_bug(&original[i]) && !original[i].is_joker())
        .count();
    if bugs == 0 {
        return true;
    }
    // substitution is a multiset operation, so a bug is satisfied whenever
    // enough of the substituted cards are aces, whichever slot they fill
    let aces = marked
        .iter()
        .filter(|&&i| variant[i].rank() == Rank::Ace)
        .count();
    if aces >= bugs {
        return true;
    }
    match eval.classes() {
        None => false,
        Some(_) if variant.len() == 5 => {
            let ranking = Evaluator::new(variant, eval.wheel()).find_ranking();
            matches!(
                ranking,
                Ranking::Straight(_) | Ranking::Flush(_) | Ranking::StraightFlush(_)
            )
        }
        Some(_) => false,
    }
}

/// explicit startup initialization of the shared rank tables
pub fn preload() {
    tables::preload();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn eval(s: &str, e: Evaluation) -> HandStrength {
        evaluate(&parse_cards(s).unwrap(), e, &EvalContext::default()).unwrap()
    }

    #[test]
    fn high_beats() {
        let pair = eval("As Ah Kd Qc Js", Evaluation::High);
        let high = eval("As Kh Qd Jc 9s", Evaluation::High);
        assert_eq!(compare(&pair, &high), 1);
        assert_eq!(compare(&high, &pair), -1);
        assert_eq!(compare(&pair, &pair), 0);
    }

    #[test]
    fn qualifier_gates() {
        let ctx = EvalContext {
            qualifier: Some(Qualifier::eight_or_better()),
            ..Default::default()
        };
        let nine = evaluate(&parse_cards("9s 7h 5d 3c As").unwrap(), Evaluation::A5Low, &ctx);
        assert!(!nine.unwrap().is_qualified());
        let eight = evaluate(&parse_cards("8s 7h 5d 3c As").unwrap(), Evaluation::A5Low, &ctx);
        assert!(eight.unwrap().is_qualified());
    }

    #[test]
    fn joker_substitutes_for_best() {
        // joker completes the broadway straight
        let cards = parse_cards("As Kh Qd Jc ?c").unwrap();
        let strength =
            evaluate(&cards, Evaluation::HighWild, &EvalContext::default()).unwrap();
        assert_eq!(strength.description, "Ace-High Straight");
    }

    #[test]
    fn no_five_of_a_kind_from_wilds() {
        let mut cards = parse_cards("As Ah Ad Ac").unwrap();
        cards.push(crate::cards::Card::joker(0));
        let strength =
            evaluate(&cards, Evaluation::HighWild, &EvalContext::default()).unwrap();
        // the wild becomes a king: quad aces with the best kicker
        assert_eq!(strength.description, "Four of a Kind, Aces");
    }

    #[test]
    fn substitution_confined_to_the_deck() {
        use crate::cards::DeckKind;
        let mut cards = parse_cards("Th 9h").unwrap();
        cards.push(crate::cards::Card::joker(0));
        // a deuce would land exactly on 21, but the short deck has none;
        // the best the pool offers is a soft ace
        let short = EvalContext {
            deck: DeckSpec {
                kind: DeckKind::Short,
                cards: 37,
                jokers: 1,
            },
            ..Default::default()
        };
        let strength = evaluate(&cards, Evaluation::TwentyOne, &short).unwrap();
        assert_eq!(strength.description, "Pip Total: 20");
        let strength =
            evaluate(&cards, Evaluation::TwentyOne, &EvalContext::default()).unwrap();
        assert_eq!(strength.description, "Pip Total: 21");
    }

    #[test]
    fn badugi_orders() {
        let four = eval("As 2h 3d 4c", Evaluation::Badugi);
        let three = eval("As 2h 3d 3c", Evaluation::Badugi);
        assert_eq!(four.rank, 1);
        assert_eq!(three.rank, 2);
        assert!(four.beats(&three));
    }

    #[test]
    fn badugi_suit_collision() {
        // two spades cannot both play
        let hand = eval("As 2s 3d 4c", Evaluation::Badugi);
        assert_eq!(hand.rank, 2);
    }

    #[test]
    fn pip_games() {
        let z = eval("As 2h 3d Kc Qs", Evaluation::Zero);
        assert!(z.description.contains("6"));
        let best = eval("Ts Jh Qd Kc Ks", Evaluation::Zero);
        assert!(best.beats(&z));
        let blackjack = eval("As Kh", Evaluation::TwentyOne);
        assert_eq!(blackjack.description, "Pip Total: 21");
        let soft = eval("As Ah 9d", Evaluation::TwentyOne);
        assert_eq!(soft.description, "Pip Total: 21");
    }

    #[test]
    fn visible_keys_order_upcards() {
        let deuce = visible_key(&parse_cards("2c").unwrap(), Evaluation::High);
        let ace = visible_key(&parse_cards("As").unwrap(), Evaluation::High);
        assert!(ace > deuce);
        let pair = visible_key(&parse_cards("9s 9h").unwrap(), Evaluation::High);
        let high = visible_key(&parse_cards("As Kh").unwrap(), Evaluation::High);
        assert!(pair > high);
    }

    #[test]
    fn sorting() {
        let mut cards = parse_cards("2c As 9h").unwrap();
        sort(&mut cards, Evaluation::High);
        assert_eq!(cards, parse_cards("As 9h 2c").unwrap());
        let mut cards = parse_cards("2c As 9h").unwrap();
        sort(&mut cards, Evaluation::A5Low);
        assert_eq!(cards, parse_cards("9h 2c As").unwrap());
    }
}
