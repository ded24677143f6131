use crate::cards::Card;
use crate::cards::Rank;
use std::collections::HashSet;

/// What a wild-card rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum WildKind {
    /// every joker in play
    Joker,
    /// every card of a fixed rank
    Rank { rank: Rank },
    /// every card matching the player's lowest hole card
    LowestHole,
    /// every card matching the lowest community card
    LowestCommunity,
    /// every card matching the last-dealt community card
    LastCommunity,
}

/// How a matched card substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildRole {
    /// substitutes for any card
    Wild,
    /// substitutes for an ace, or any card completing a straight or flush
    Bug,
    /// wild only while the matched hole card remains face down
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildScope {
    Player,
    Global,
}

/// One wild-card clause of a rule document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WildRule {
    #[serde(flatten)]
    pub kind: WildKind,
    pub role: WildRole,
    #[serde(default = "WildRule::default_scope")]
    pub scope: WildScope,
}

impl WildRule {
    fn default_scope() -> WildScope {
        WildScope::Player
    }
}

/// The concrete wild cards in force for one player's evaluation.
#[derive(Debug, Clone, Default)]
pub struct WildSet {
    wilds: HashSet<Card>,
    bugs: HashSet<Card>,
}

impl WildSet {
    pub fn is_empty(&self) -> bool {
        self.wilds.is_empty() && self.bugs.is_empty()
    }
    pub fn is_wild(&self, card: &Card) -> bool {
        self.wilds.contains(card)
    }
    pub fn is_bug(&self, card: &Card) -> bool {
        !self.is_wild(card) && self.bugs.contains(card)
    }
    pub fn is_marked(&self, card: &Card) -> bool {
        self.wilds.contains(card) || self.bugs.contains(card)
    }
    /// jokers are wild with no rule saying so, unless a rule demotes them to bugs
    pub fn joker_wild() -> Self {
        let mut set = Self::default();
        set.wilds.extend((0..4).map(Card::joker));
        set
    }
}

/// Resolve rule clauses against one player's cards and the board.
///
/// `face_down` carries the subset of `hole` still hidden; conditional
/// rules only match there. Community order matters: the last element of
/// `community` is the last-dealt card.
pub fn resolve(
    rules: &[WildRule],
    hole: &[Card],
    face_down: &[Card],
    community: &[Card],
) -> WildSet {
    let mut set = WildSet::default();
    for rule in rules {
        let matchable: &[Card] = match rule.role {
            WildRole::Conditional => face_down,
            _ => hole,
        };
        let ranks = match rule.kind {
            WildKind::Joker => vec![Rank::Joker],
            WildKind::Rank { rank } => vec![rank],
            WildKind::LowestHole => lowest(matchable).into_iter().collect(),
            WildKind::LowestCommunity => lowest(community).into_iter().collect(),
            WildKind::LastCommunity => community.last().map(|c| c.rank()).into_iter().collect(),
        };
        let matched = matchable
            .iter()
            .chain(community.iter())
            .filter(|c| ranks.contains(&c.rank()))
            .copied();
        match rule.role {
            WildRole::Bug => set.bugs.extend(matched),
            _ => set.wilds.extend(matched),
        }
    }
    set
}

fn lowest(cards: &[Card]) -> Option<Rank> {
    cards
        .iter()
        .map(|c| c.rank())
        .filter(|r| !r.is_joker())
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn rank_rule_matches_everywhere() {
        let rules = [WildRule {
            kind: WildKind::Rank { rank: Rank::Two },
            role: WildRole::Wild,
            scope: WildScope::Global,
        }];
        let hole = parse_cards("2s Kh").unwrap();
        let board = parse_cards("2d 9c").unwrap();
        let set = resolve(&rules, &hole, &hole, &board);
        assert!(set.is_wild(&hole[0]));
        assert!(set.is_wild(&board[0]));
        assert!(!set.is_wild(&hole[1]));
    }

    #[test]
    fn lowest_hole_is_per_player() {
        let rules = [WildRule {
            kind: WildKind::LowestHole,
            role: WildRole::Wild,
            scope: WildScope::Player,
        }];
        let hole = parse_cards("3s 3h Kd").unwrap();
        let set = resolve(&rules, &hole, &[], &[]);
        assert!(set.is_wild(&hole[0]));
        assert!(set.is_wild(&hole[1]));
        assert!(!set.is_wild(&hole[2]));
    }

    #[test]
    fn conditional_requires_face_down() {
        let rules = [WildRule {
            kind: WildKind::LowestHole,
            role: WildRole::Conditional,
            scope: WildScope::Player,
        }];
        let hole = parse_cards("3s Kh").unwrap();
        let exposed = resolve(&rules, &hole, &[], &[]);
        assert!(exposed.is_empty());
        let hidden = resolve(&rules, &hole, &hole[..1], &[]);
        assert!(hidden.is_wild(&hole[0]));
    }

    #[test]
    fn last_community_matcher() {
        let rules = [WildRule {
            kind: WildKind::LastCommunity,
            role: WildRole::Wild,
            scope: WildScope::Global,
        }];
        let hole = parse_cards("9s Kh").unwrap();
        let board = parse_cards("2d 9c").unwrap();
        let set = resolve(&rules, &hole, &[], &board);
        assert!(set.is_wild(&hole[0]));
        assert!(set.is_wild(&board[1]));
        assert!(!set.is_wild(&board[0]));
    }
}
