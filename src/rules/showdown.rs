use super::condition::Condition;
use super::condition::ConditionContext;
use crate::evaluation::Evaluation;
use crate::evaluation::Qualifier;
use crate::evaluation::Selector;
use crate::evaluation::WildRule;

/// The showdown clause of a rule document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowdownRules {
    #[serde(default = "ShowdownRules::default_mode")]
    pub declaration_mode: DeclarationMode,
    /// pot-share configurations, high-style entries first by convention
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_hand: Vec<BestHandConfig>,
    /// configuration sets gated on game state; first match wins over best_hand
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_best_hands: Vec<ConditionalBestHands>,
    /// when no hand meets a configuration's qualifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<DefaultAction>,
    /// multi-board games: run each configuration once per listed board
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boards: Vec<String>,
    /// free-form hand classification tag carried through to results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

impl ShowdownRules {
    fn default_mode() -> DeclarationMode {
        DeclarationMode::CardsSpeak
    }
    /// the configurations in force for the current game state
    pub fn configurations(&self, ctx: &ConditionContext) -> &[BestHandConfig] {
        self.conditional_best_hands
            .iter()
            .find(|c| c.condition.eval(ctx))
            .map(|c| c.best_hand.as_slice())
            .unwrap_or(&self.best_hand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationMode {
    /// hands are evaluated mechanically
    CardsSpeak,
    /// players announce which half they compete for
    Declare,
}

/// One pot-share configuration: an ordering, a selector, and gates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BestHandConfig {
    pub name: String,
    pub evaluation: Evaluation,
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<QualifierSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wild_cards: Vec<WildRule>,
    /// declaration-mode games treat this configuration as the high side
    #[serde(default = "BestHandConfig::default_high")]
    pub is_high: bool,
}

impl BestHandConfig {
    fn default_high() -> bool {
        true
    }
    pub fn qualifier(&self) -> Option<Qualifier> {
        self.qualifier.as_ref().map(QualifierSpec::resolve)
    }
}

/// Qualifiers come named or spelled out.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum QualifierSpec {
    Named(QualifierName),
    Explicit(Qualifier),
}

impl QualifierSpec {
    pub fn resolve(&self) -> Qualifier {
        match self {
            Self::Named(QualifierName::EightOrBetter) => Qualifier::eight_or_better(),
            Self::Explicit(q) => *q,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifierName {
    EightOrBetter,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalBestHands {
    pub condition: Condition,
    pub best_hand: Vec<BestHandConfig>,
}

/// What happens to a share no hand qualified for.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DefaultAction {
    /// the share folds back into the other configurations' pool
    SplitPot,
    /// the share is re-awarded under a fallback configuration
    BestHand { configuration: BestHandConfig },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omaha_hi_lo_shape() {
        let doc = r#"{
            "declaration_mode": "cards_speak",
            "best_hand": [
                {"name": "High Hand", "evaluation": "high",
                 "selector": {"hole_board": {"hole": 2}}},
                {"name": "Low Hand", "evaluation": "a5_low",
                 "selector": {"hole_board": {"hole": 2}},
                 "qualifier": "eight_or_better", "is_high": false}
            ],
            "default_action": {"type": "split_pot"}
        }"#;
        let rules: ShowdownRules = serde_json::from_str(doc).unwrap();
        assert_eq!(rules.best_hand.len(), 2);
        assert!(rules.best_hand[1].qualifier().is_some());
        assert!(!rules.best_hand[1].is_high);
    }

    #[test]
    fn conditional_configurations() {
        let doc = r#"{
            "best_hand": [
                {"name": "High Hand", "evaluation": "high", "selector": "any_cards"}
            ],
            "conditional_best_hands": [
                {"condition": {"type": "choice_is", "name": "mode", "value": "low"},
                 "best_hand": [
                    {"name": "Low Hand", "evaluation": "a5_low",
                     "selector": "any_cards", "is_high": false}
                 ]}
            ]
        }"#;
        let rules: ShowdownRules = serde_json::from_str(doc).unwrap();
        let mut ctx = ConditionContext::default();
        assert_eq!(rules.configurations(&ctx)[0].name, "High Hand");
        ctx.choices.insert("mode".to_string(), "low".to_string());
        assert_eq!(rules.configurations(&ctx)[0].name, "Low Hand");
    }
}
