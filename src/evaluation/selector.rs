use super::evaluation::evaluate;
use super::evaluation::EvalContext;
use super::evaluation::Evaluation;
use super::strength::HandStrength;
use crate::cards::Card;
use crate::errors::RulesError;

/// How `find_best` assembles candidate hands from a player's cards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// any hand-sized combination of hole and community together
    AnyCards,
    /// exactly `hole` hole cards, the rest from community
    HoleBoard { hole: usize },
    /// combinations drawn from named pools under per-pool bounds
    Grouped { groups: Vec<GroupRule> },
    /// the cards another configuration left unused, any combination
    UnusedFrom { configuration: String },
}

/// Per-pool bounds for a grouped selector.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupRule {
    pub subset: String,
    #[serde(default)]
    pub min: usize,
    pub max: usize,
}

/// Best hand over hole and community under a selector.
///
/// The selector produces candidate card sets; each is evaluated and the
/// lexicographically best result by strength wins. `UnusedFrom` must be
/// resolved by the caller into a leftover pool first.
pub fn find_best(
    hole: &[Card],
    community: &[Card],
    eval: Evaluation,
    selector: &Selector,
    ctx: &EvalContext,
) -> Result<Option<HandStrength>, RulesError> {
    let size = eval.hand_size();
    match selector {
        Selector::AnyCards | Selector::UnusedFrom { .. } => {
            let pool = hole
                .iter()
                .chain(community.iter())
                .copied()
                .collect::<Vec<Card>>();
            let k = size.min(pool.len());
            best_of(combos(&pool, k), eval, ctx)
        }
        Selector::HoleBoard { hole: k } => {
            if *k > size {
                return Err(RulesError::InvalidRules(format!(
                    "selector wants {} hole cards of a {}-card hand",
                    k, size
                )));
            }
            let mut candidates = Vec::new();
            for held in combos(hole, *k) {
                for board in combos(community, size - k) {
                    let mut cards = held.clone();
                    cards.extend(board);
                    candidates.push(cards);
                }
            }
            best_of(candidates, eval, ctx)
        }
        Selector::Grouped { .. } => Err(RulesError::InvalidRules(
            "grouped selector needs named pools, use find_best_grouped".to_string(),
        )),
    }
}

/// Best hand assembled from named pools under per-pool bounds.
pub fn find_best_grouped(
    pools: &[(String, Vec<Card>)],
    groups: &[GroupRule],
    eval: Evaluation,
    ctx: &EvalContext,
) -> Result<Option<HandStrength>, RulesError> {
    let size = eval.hand_size();
    for group in groups {
        if !pools.iter().any(|(name, _)| name == &group.subset) {
            return Err(RulesError::UnknownSubset(group.subset.clone()));
        }
    }
    let bounded = groups
        .iter()
        .map(|g| {
            let pool = pools
                .iter()
                .find(|(name, _)| name == &g.subset)
                .map(|(_, cards)| cards.as_slice())
                .expect("checked above");
            (pool, g.min, g.max.min(pool.len()))
        })
        .collect::<Vec<(&[Card], usize, usize)>>();
    let mut candidates = Vec::new();
    assemble(&bounded, size, Vec::new(), &mut candidates);
    best_of(candidates, eval, ctx)
}

fn assemble(
    bounded: &[(&[Card], usize, usize)],
    size: usize,
    held: Vec<Card>,
    out: &mut Vec<Vec<Card>>,
) {
    match bounded.split_first() {
        None => {
            if held.len() == size {
                out.push(held);
            }
        }
        Some((&(pool, min, max), rest)) => {
            for n in min..=max.min(size.saturating_sub(held.len())) {
                for take in combos(pool, n) {
                    let mut held = held.clone();
                    held.extend(take);
                    assemble(rest, size, held, out);
                }
            }
        }
    }
}

fn best_of(
    candidates: Vec<Vec<Card>>,
    eval: Evaluation,
    ctx: &EvalContext,
) -> Result<Option<HandStrength>, RulesError> {
    let mut best: Option<HandStrength> = None;
    for cards in candidates {
        if cards.is_empty() {
            continue;
        }
        let strength = evaluate(&cards, eval, ctx)?;
        match best {
            Some(ref b) if !strength.beats(b) => {}
            _ => best = Some(strength),
        }
    }
    Ok(best)
}

/// all k-combinations preserving order
pub fn combos(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k > cards.len() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut indices = (0..k).collect::<Vec<usize>>();
    loop {
        out.push(indices.iter().map(|&i| cards[i]).collect());
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if indices[i] != i + cards.len() - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn combination_counts() {
        let cards = parse_cards("As Kh Qd Jc 9s 8h 7d").unwrap();
        assert_eq!(combos(&cards, 5).len(), 21);
        assert_eq!(combos(&cards, 7).len(), 1);
        assert_eq!(combos(&cards, 0).len(), 1);
    }

    #[test]
    fn any_cards_finds_the_straight() {
        let hole = parse_cards("As Kh").unwrap();
        let board = parse_cards("Qd Jc Ts 3h 2d").unwrap();
        let best = find_best(
            &hole,
            &board,
            Evaluation::High,
            &Selector::AnyCards,
            &EvalContext::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.description, "Ace-High Straight");
    }

    #[test]
    fn omaha_needs_exactly_two() {
        let hole = parse_cards("Ah Kh Qh Jh").unwrap();
        let board = parse_cards("Th 9h 2h 3d 4s").unwrap();
        let best = find_best(
            &hole,
            &board,
            Evaluation::High,
            &Selector::HoleBoard { hole: 2 },
            &EvalContext::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.description, "Ace-High Flush");
        // holdem rules on the same cards make a flush too, via 1 hole card
        let best = find_best(
            &hole[..2],
            &board,
            Evaluation::High,
            &Selector::AnyCards,
            &EvalContext::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.description, "Ace-High Flush");
    }

    #[test]
    fn grouped_bounds() {
        let pools = vec![
            ("Hand 1".to_string(), parse_cards("As Ah").unwrap()),
            ("Board 1".to_string(), parse_cards("Ad Kc Ks 2h 3d").unwrap()),
        ];
        let groups = vec![
            GroupRule {
                subset: "Hand 1".to_string(),
                min: 2,
                max: 2,
            },
            GroupRule {
                subset: "Board 1".to_string(),
                min: 3,
                max: 3,
            },
        ];
        let best = find_best_grouped(&pools, &groups, Evaluation::High, &EvalContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(best.description, "Full House, Aces over Kings");
    }

    #[test]
    fn unknown_pool_rejected() {
        let pools = vec![("Hand 1".to_string(), parse_cards("As Ah").unwrap())];
        let groups = vec![GroupRule {
            subset: "Hand 9".to_string(),
            min: 0,
            max: 2,
        }];
        assert!(matches!(
            find_best_grouped(&pools, &groups, Evaluation::High, &EvalContext::default()),
            Err(RulesError::UnknownSubset(_))
        ));
    }
}
