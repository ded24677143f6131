use crate::evaluation::Evaluation;

/// The forced-bet clause: how a hand's first chips go in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ForcedBets {
    Fixed(ForcedBetRule),
    /// keyed on a stored player choice, resolved at hand start
    Conditional {
        choice: String,
        cases: Vec<ForcedBetCase>,
        default: ForcedBetRule,
    },
}

impl ForcedBets {
    /// the rule in force given the stored choices
    pub fn resolve(&self, choices: &std::collections::BTreeMap<String, String>) -> &ForcedBetRule {
        match self {
            Self::Fixed(rule) => rule,
            Self::Conditional {
                choice,
                cases,
                default,
            } => choices
                .get(choice)
                .and_then(|value| cases.iter().find(|c| &c.value == value))
                .map(|c| &c.rule)
                .unwrap_or(default),
        }
    }
    /// every rule this clause could resolve to
    pub fn all_rules(&self) -> Vec<&ForcedBetRule> {
        match self {
            Self::Fixed(rule) => vec![rule],
            Self::Conditional { cases, default, .. } => cases
                .iter()
                .map(|c| &c.rule)
                .chain(std::iter::once(default))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForcedBetCase {
    pub value: String,
    pub rule: ForcedBetRule,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForcedBetRule {
    pub style: ForcedStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<BringInRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bring_in_eval: Option<Evaluation>,
}

impl ForcedBetRule {
    pub const fn blinds() -> Self {
        Self {
            style: ForcedStyle::Blinds,
            rule: None,
            bring_in_eval: None,
        }
    }
    pub const fn antes_only() -> Self {
        Self {
            style: ForcedStyle::AntesOnly,
            rule: None,
            bring_in_eval: None,
        }
    }
    pub const fn bring_in(rule: BringInRule, eval: Evaluation) -> Self {
        Self {
            style: ForcedStyle::BringIn,
            rule: Some(rule),
            bring_in_eval: Some(eval),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedStyle {
    Blinds,
    BringIn,
    AntesOnly,
}

/// Which exposed hand posts the bring-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BringInRule {
    LowestCard,
    HighestCard,
}

/// Who opens the first round of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialOrder {
    AfterBigBlind,
    BringIn,
    Dealer,
}

/// Who opens every later round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsequentOrder {
    HighHand,
    Dealer,
    LastActor,
}

/// The betting-order clause, optionally overridden by a player choice.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRule {
    pub initial: InitialOrder,
    pub subsequent: SubsequentOrder,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional: Vec<OrderCase>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderCase {
    pub choice: String,
    pub value: String,
    pub initial: InitialOrder,
    pub subsequent: SubsequentOrder,
}

impl OrderRule {
    pub fn resolve(
        &self,
        choices: &std::collections::BTreeMap<String, String>,
    ) -> (InitialOrder, SubsequentOrder) {
        self.conditional
            .iter()
            .find(|case| choices.get(&case.choice) == Some(&case.value))
            .map(|case| (case.initial, case.subsequent))
            .unwrap_or((self.initial, self.subsequent))
    }
}

impl Default for OrderRule {
    fn default() -> Self {
        Self {
            initial: InitialOrder::AfterBigBlind,
            subsequent: SubsequentOrder::Dealer,
            conditional: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn conditional_forced_bets_resolve() {
        let doc = r#"{
            "choice": "game",
            "cases": [
                {"value": "stud", "rule": {"style": "bring_in"}}
            ],
            "default": {"style": "blinds"}
        }"#;
        let bets: ForcedBets = serde_json::from_str(doc).unwrap();
        let mut choices = BTreeMap::new();
        assert_eq!(bets.resolve(&choices).style, ForcedStyle::Blinds);
        choices.insert("game".to_string(), "stud".to_string());
        assert_eq!(bets.resolve(&choices).style, ForcedStyle::BringIn);
    }

    #[test]
    fn order_override() {
        let rule = OrderRule {
            initial: InitialOrder::AfterBigBlind,
            subsequent: SubsequentOrder::Dealer,
            conditional: vec![OrderCase {
                choice: "game".to_string(),
                value: "stud".to_string(),
                initial: InitialOrder::BringIn,
                subsequent: SubsequentOrder::HighHand,
            }],
        };
        let mut choices = BTreeMap::new();
        assert_eq!(rule.resolve(&choices).0, InitialOrder::AfterBigBlind);
        choices.insert("game".to_string(), "stud".to_string());
        assert_eq!(rule.resolve(&choices).0, InitialOrder::BringIn);
    }
}
