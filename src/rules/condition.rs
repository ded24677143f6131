use crate::cards::Card;
use crate::cards::Rank;
use crate::cards::Suit;
use std::collections::BTreeMap;

/// Everything a condition may inspect, snapshotted from game state.
///
/// Community maps carry only face-up cards. Per-actor fields are `None`
/// when a condition is evaluated outside any actor's turn (step-level
/// conditions on community deals, for instance).
#[derive(Debug, Clone, Default)]
pub struct ConditionContext {
    pub choices: BTreeMap<String, String>,
    pub community: BTreeMap<String, Vec<Card>>,
    pub hand_size: Option<usize>,
    pub exposed: Option<usize>,
}

/// A predicate over game state, kept purely functional.
///
/// Conditional steps, conditional deal states, conditional forced bets and
/// conditional showdown configurations all resolve through here.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Condition {
    /// a stored player choice equals a value
    ChoiceIs { name: String, value: String },
    /// cards in a community subset, bounded
    CommunityCount {
        #[serde(default)]
        subset: Option<String>,
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// at least `count` cards of a rank in a community subset
    CommunityRank {
        #[serde(default)]
        subset: Option<String>,
        rank: Rank,
        #[serde(default = "one")]
        count: usize,
    },
    /// at least `count` cards of a suit in a community subset
    CommunitySuit {
        #[serde(default)]
        subset: Option<String>,
        suit: Suit,
        #[serde(default = "one")]
        count: usize,
    },
    /// the last-dealt card of a community subset is red (or black)
    LastCommunityRed {
        #[serde(default)]
        subset: Option<String>,
        red: bool,
    },
    /// the acting player's hand size, bounded
    HandSize {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// the acting player has at least `count` face-up cards
    Exposed {
        #[serde(default = "one")]
        count: usize,
    },
    AllOf { conditions: Vec<Condition> },
    AnyOf { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

fn one() -> usize {
    1
}

impl Condition {
    pub fn eval(&self, ctx: &ConditionContext) -> bool {
        match self {
            Self::ChoiceIs { name, value } => {
                ctx.choices.get(name).map(|v| v == value).unwrap_or(false)
            }
            Self::CommunityCount { subset, min, max } => {
                let n = community(ctx, subset.as_deref()).len();
                n >= *min && max.map(|m| n <= m).unwrap_or(true)
            }
            Self::CommunityRank { subset, rank, count } => {
                community(ctx, subset.as_deref())
                    .iter()
                    .filter(|c| c.rank() == *rank)
                    .count()
                    >= *count
            }
            Self::CommunitySuit { subset, suit, count } => {
                community(ctx, subset.as_deref())
                    .iter()
                    .filter(|c| c.suit() == *suit)
                    .count()
                    >= *count
            }
            Self::LastCommunityRed { subset, red } => community(ctx, subset.as_deref())
                .last()
                .map(|c| c.suit().is_red() == *red)
                .unwrap_or(false),
            Self::HandSize { min, max } => ctx
                .hand_size
                .map(|n| n >= *min && max.map(|m| n <= m).unwrap_or(true))
                .unwrap_or(false),
            Self::Exposed { count } => ctx.exposed.map(|n| n >= *count).unwrap_or(false),
            Self::AllOf { conditions } => conditions.iter().all(|c| c.eval(ctx)),
            Self::AnyOf { conditions } => conditions.iter().any(|c| c.eval(ctx)),
            Self::Not { condition } => !condition.eval(ctx),
        }
    }
}

fn community<'a>(ctx: &'a ConditionContext, subset: Option<&str>) -> &'a [Card] {
    ctx.community
        .get(subset.unwrap_or(crate::DEFAULT_SUBSET))
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn choice_condition() {
        let mut choices = BTreeMap::new();
        choices.insert("game".to_string(), "holdem".to_string());
        let ctx = ConditionContext {
            choices,
            ..Default::default()
        };
        let hit = Condition::ChoiceIs {
            name: "game".to_string(),
            value: "holdem".to_string(),
        };
        let miss = Condition::ChoiceIs {
            name: "game".to_string(),
            value: "omaha".to_string(),
        };
        assert!(hit.eval(&ctx));
        assert!(!miss.eval(&ctx));
    }

    #[test]
    fn community_conditions() {
        let mut board = BTreeMap::new();
        board.insert("default".to_string(), parse_cards("Ah Kh 2c").unwrap());
        let ctx = ConditionContext {
            community: board,
            ..Default::default()
        };
        assert!(Condition::CommunityCount {
            subset: None,
            min: 3,
            max: Some(3)
        }
        .eval(&ctx));
        assert!(Condition::CommunitySuit {
            subset: None,
            suit: Suit::Heart,
            count: 2
        }
        .eval(&ctx));
        assert!(!Condition::LastCommunityRed { subset: None, red: true }.eval(&ctx));
        assert!(Condition::Not {
            condition: Box::new(Condition::CommunityRank {
                subset: None,
                rank: Rank::Queen,
                count: 1
            })
        }
        .eval(&ctx));
    }

    #[test]
    fn json_shape() {
        let condition: Condition = serde_json::from_str(
            r#"{"type":"community_suit","suit":"Heart","count":2}"#,
        )
        .unwrap();
        assert!(matches!(condition, Condition::CommunitySuit { .. }));
    }
}
