use super::evaluator::Evaluator;
use super::evaluator::SHORT_WHEEL;
use super::evaluator::WHEEL;
use super::ranking::Ranking;
use crate::cards::Card;
use crate::cards::Rank;
use crate::cards::Suit;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical key for a five-card multiset: rank values sorted descending,
/// packed four bits apiece, plus a flush flag.
pub type ClassKey = (u32, bool);

/// One equivalence class of five-card hands.
#[derive(Debug, Clone)]
pub struct Class {
    pub rank: u32,
    pub ordered_rank: u32,
    pub description: String,
}

/// A full ordering of five-card hand classes for one evaluation family.
///
/// Built once per process by exhaustive enumeration of the 7462-odd rank
/// multisets; lookup is a single hash probe. Shared immutably by every
/// game in the process.
pub struct Classes {
    ace_low: bool,
    flushes: bool,
    entries: HashMap<ClassKey, Class>,
}

impl Classes {
    pub fn lookup(&self, cards: &[Card]) -> Option<&Class> {
        let values = self.values(cards);
        let flush = self.flushes
            && cards
                .first()
                .map(|head| cards.iter().all(|c| c.suit() == head.suit()))
                .unwrap_or(false);
        self.entries.get(&(pack(&values), flush))
    }
    pub fn lookup_values(&self, values: &[u8], flush: bool) -> Option<&Class> {
        let mut values = values.to_vec();
        values.sort_unstable_by(|a, b| b.cmp(a));
        self.entries.get(&(pack(&values), flush && self.flushes))
    }
    /// rank value under this family's ace treatment
    pub fn value(&self, rank: Rank) -> u8 {
        if self.ace_low {
            rank.low_value()
        } else {
            rank as u8
        }
    }
    fn values(&self, cards: &[Card]) -> Vec<u8> {
        let mut values = cards
            .iter()
            .map(|c| self.value(c.rank()))
            .collect::<Vec<u8>>();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    }
}

fn pack(values: &[u8]) -> u32 {
    values
        .iter()
        .fold(0u32, |acc, &v| (acc << 4) | (v as u32 & 0xF))
}

/// standard high ladder, 52-card straights
pub static HIGH: Lazy<Classes> = Lazy::new(|| build_high(WHEEL, Ranking::high_category, false));
/// 36-card ladder: flush above full house, nine-high wheel
pub static SHORT: Lazy<Classes> = Lazy::new(|| build_high(SHORT_WHEEL, Ranking::short_category, false));
/// deuce-to-seven: ace strictly high, straights and flushes count against
pub static DEUCE7: Lazy<Classes> = Lazy::new(|| build_high(0, Ranking::high_category, true));
/// ace-to-five low: straights and flushes ignored, ace plays low
pub static A5LOW: Lazy<Classes> = Lazy::new(|| build_a5(false));
/// the same ladder upside down: the weakest low wins
pub static A5HIGH: Lazy<Classes> = Lazy::new(|| build_a5(true));

/// Force every table to build. Call once at startup so the cost is paid
/// before the first hand rather than under it.
pub fn preload() {
    let n = HIGH.entries.len()
        + SHORT.entries.len()
        + DEUCE7.entries.len()
        + A5LOW.entries.len()
        + A5HIGH.entries.len();
    log::debug!("[tables] {} hand classes loaded", n);
}

struct Proto {
    key: ClassKey,
    category: u32,
    primaries: Vec<u8>,
    values: Vec<u8>,
    description: String,
}

/// all non-increasing five-value sequences over 0..=12 with multiplicity <= 4
fn multisets() -> Vec<[u8; 5]> {
    let mut sets = Vec::new();
    for a in (0..13u8).rev() {
        for b in (0..=a).rev() {
            for c in (0..=b).rev() {
                for d in (0..=c).rev() {
                    for e in (0..=d).rev() {
                        let set = [a, b, c, d, e];
                        let quint = set.iter().filter(|&&v| v == e).count() == 5;
                        if !quint {
                            sets.push(set);
                        }
                    }
                }
            }
        }
    }
    sets
}

/// give the multiset concrete suits so the scanner can run over it
fn synthesize(values: &[u8; 5], flush: bool) -> Vec<Card> {
    if flush {
        return values
            .iter()
            .map(|&v| Card::from((Rank::from(v), Suit::Spade)))
            .collect();
    }
    let mut seen = [0u8; 13];
    let mut cards = values
        .iter()
        .map(|&v| {
            let suit = Suit::from(seen[v as usize]);
            seen[v as usize] += 1;
            Card::from((Rank::from(v), suit))
        })
        .collect::<Vec<Card>>();
    if cards.iter().all(|c| c.suit() == Suit::Club) {
        let last = cards.pop().expect("five cards");
        cards.push(Card::from((last.rank(), Suit::Diamond)));
    }
    cards
}

/// order strongest-first, then number categories and positions
fn number(mut protos: Vec<Proto>, invert: bool) -> HashMap<ClassKey, Class> {
    protos.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| b.primaries.cmp(&a.primaries))
            .then_with(|| b.values.cmp(&a.values))
    });
    if invert {
        protos.reverse();
    }
    let mut entries = HashMap::with_capacity(protos.len());
    let mut rank = 0u32;
    let mut ordered = 0u32;
    let mut last = None;
    for proto in protos {
        if last != Some(proto.category) {
            last = Some(proto.category);
            rank += 1;
            ordered = 0;
        }
        ordered += 1;
        entries.insert(
            proto.key,
            Class {
                rank,
                ordered_rank: ordered,
                description: proto.description,
            },
        );
    }
    entries
}

fn build_high(wheel: u16, category: fn(&Ranking) -> u32, invert: bool) -> Classes {
    let mut protos = Vec::new();
    for values in multisets() {
        let distinct = values.iter().collect::<std::collections::HashSet<_>>().len() == 5;
        for flush in [false, true] {
            if flush && !distinct {
                continue;
            }
            let cards = synthesize(&values, flush);
            let scan = Evaluator::new(&cards, wheel);
            let ranking = scan.find_ranking();
            protos.push(Proto {
                key: (pack(&values), flush),
                category: category(&ranking),
                primaries: ranking.primaries().iter().map(|&r| r as u8).collect(),
                values: values.to_vec(),
                description: ranking.describe(),
            });
        }
    }
    Classes {
        ace_low: false,
        flushes: true,
        entries: number(protos, invert),
    }
}

fn build_a5(invert: bool) -> Classes {
    let mut protos = Vec::new();
    for values in multisets() {
        let (category, primaries) = low_classify(&values);
        protos.push(Proto {
            key: (pack(&values), false),
            category,
            // low hands order ascending: negate so the shared descending
            // comparator in number() still ranks the lowest hand first
            primaries: primaries.iter().map(|&v| 13 - v).collect(),
            values: values.iter().map(|&v| 13 - v).collect(),
            description: low_describe(&values),
        });
    }
    Classes {
        ace_low: true,
        flushes: false,
        entries: number(protos, invert),
    }
}

/// pattern classification over low values, suits and straights ignored
fn low_classify(values: &[u8; 5]) -> (u32, Vec<u8>) {
    let mut counts: HashMap<u8, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut groups = counts.into_iter().collect::<Vec<(u8, usize)>>();
    groups.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    let shape = groups.iter().map(|g| g.1).collect::<Vec<usize>>();
    let primaries = groups
        .iter()
        .filter(|g| g.1 > 1)
        .map(|g| g.0)
        .collect::<Vec<u8>>();
    let category = match shape.as_slice() {
        [1, 1, 1, 1, 1] => 1,
        [2, 1, 1, 1] => 2,
        [2, 2, 1] => 3,
        [3, 1, 1] => 4,
        [3, 2] => 5,
        [4, 1] => 6,
        _ => unreachable!("five cards, multiplicity <= 4"),
    };
    (category, primaries)
}

fn low_describe(values: &[u8; 5]) -> String {
    let symbol = |v: u8| {
        let rank = if v == 0 { Rank::Ace } else { Rank::from(v - 1) };
        rank.to_string()
    };
    let distinct = values.iter().collect::<std::collections::HashSet<_>>().len() == 5;
    if distinct {
        format!(
            "{} Low",
            values
                .iter()
                .map(|&v| symbol(v))
                .collect::<Vec<String>>()
                .join("-")
        )
    } else {
        let (category, primaries) = low_classify(values);
        let name = |v: u8| {
            let rank = if v == 0 { Rank::Ace } else { Rank::from(v - 1) };
            rank.label().to_string()
        };
        match category {
            2 => format!("Pair of {}s", name(primaries[0])),
            3 => format!("Two Pair, {}s and {}s", name(primaries[0]), name(primaries[1])),
            4 => format!("Three of a Kind, {}s", name(primaries[0])),
            5 => format!("Full House, {}s over {}s", name(primaries[0]), name(primaries[1])),
            _ => format!("Four of a Kind, {}s", name(primaries[0])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn high(s: &str) -> (u32, u32) {
        let cards = parse_cards(s).unwrap();
        let class = HIGH.lookup(&cards).unwrap();
        (class.rank, class.ordered_rank)
    }

    #[test]
    fn class_count() {
        // 7462 distinct five-card hand classes in a 52-card deck
        assert_eq!(HIGH.entries.len(), 7462);
    }

    #[test]
    fn royal_flush_is_best() {
        assert_eq!(high("As Ks Qs Js Ts"), (1, 1));
    }

    #[test]
    fn worst_high_card() {
        let (rank, _) = high("7s 5h 4d 3c 2s");
        assert_eq!(rank, 9);
        let worst = HIGH
            .entries
            .values()
            .filter(|c| c.rank == 9)
            .map(|c| c.ordered_rank)
            .max()
            .unwrap();
        let class = HIGH.lookup(&parse_cards("7s 5h 4d 3c 2s").unwrap()).unwrap();
        assert_eq!(class.ordered_rank, worst);
    }

    #[test]
    fn high_orders_flush_below_full_house() {
        let flush = HIGH.lookup(&parse_cards("As Ks Qs Js 9s").unwrap()).unwrap();
        let boat = HIGH.lookup(&parse_cards("2s 2h 2d 3c 3s").unwrap()).unwrap();
        assert!(boat.rank < flush.rank);
    }

    #[test]
    fn short_orders_flush_above_full_house() {
        let flush = SHORT.lookup(&parse_cards("As Ks Qs Js 9s").unwrap()).unwrap();
        let boat = SHORT.lookup(&parse_cards("6s 6h 6d 7c 7s").unwrap()).unwrap();
        assert!(flush.rank < boat.rank);
    }

    #[test]
    fn deuce7_best_hand() {
        // 7-5-4-3-2 offsuit is the nuts in deuce-to-seven
        let cards = parse_cards("7s 5h 4d 3c 2s").unwrap();
        let class = DEUCE7.lookup(&cards).unwrap();
        assert_eq!((class.rank, class.ordered_rank), (1, 1));
        // ace is strictly high: A-2-3-4-5 is no straight, just a rough ace
        let wheel = DEUCE7.lookup(&parse_cards("As 2h 3d 4c 5s").unwrap()).unwrap();
        assert_eq!(wheel.rank, 1);
        assert!(wheel.ordered_rank > class.ordered_rank);
        // 2-3-4-5-6 is a straight and a straight counts against you
        let straight = DEUCE7.lookup(&parse_cards("2s 3h 4d 5c 6s").unwrap()).unwrap();
        assert_eq!(straight.rank, 5);
    }

    #[test]
    fn a5_best_hand() {
        // 5-4-3-2-A is the nuts in ace-to-five, flushes ignored
        let wheel = A5LOW.lookup(&parse_cards("5s 4s 3s 2s As").unwrap()).unwrap();
        assert_eq!((wheel.rank, wheel.ordered_rank), (1, 1));
        let six = A5LOW.lookup(&parse_cards("6s 4h 3d 2c As").unwrap()).unwrap();
        assert_eq!(six.rank, 1);
        assert!(wheel.ordered_rank < six.ordered_rank);
    }

    #[test]
    fn a5_pairs_always_worse() {
        let rough = A5LOW.lookup(&parse_cards("Ks Qh Jd Tc 9s").unwrap()).unwrap();
        let paired = A5LOW.lookup(&parse_cards("As Ah 2d 3c 4s").unwrap()).unwrap();
        assert!(rough.rank < paired.rank);
    }

    #[test]
    fn a5_high_inverts() {
        let wheel = A5HIGH.lookup(&parse_cards("5s 4s 3s 2s As").unwrap()).unwrap();
        let quads = A5HIGH.lookup(&parse_cards("Ks Kh Kd Kc As").unwrap()).unwrap();
        assert!(quads.rank < wheel.rank);
    }

    #[test]
    fn descriptions() {
        let cards = parse_cards("As Ah Kd Kc Qs").unwrap();
        let class = HIGH.lookup(&cards).unwrap();
        assert_eq!(class.description, "Two Pair, Aces and Kings");
        let cards = parse_cards("8s 7h 5d 3c As").unwrap();
        let class = A5LOW.lookup(&cards).unwrap();
        assert_eq!(class.description, "8-7-5-3-A Low");
    }
}
