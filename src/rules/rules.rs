use super::forced::ForcedBets;
use super::forced::ForcedStyle;
use super::forced::InitialOrder;
use super::forced::OrderRule;
use super::showdown::BestHandConfig;
use super::showdown::ShowdownRules;
use super::step::BetKind;
use super::step::DealLocation;
use super::step::Step;
use super::step::StepAction;
use crate::betting::Structure;
use crate::cards::DeckSpec;
use crate::errors::RulesError;
use crate::evaluation::Selector;
use std::collections::HashSet;

/// the rule document schema version this engine speaks
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerBounds {
    pub min: usize,
    pub max: usize,
}

/// A parsed, validated, immutable variant description.
///
/// Parsing rejects unknown keys; validation is a single pass that checks
/// every cross-reference before the first hand is dealt, so step execution
/// never trips over a malformed document. Rules are freely shared across
/// tables running the same variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rules {
    pub version: u32,
    pub game: String,
    pub players: PlayerBounds,
    pub deck: DeckSpec,
    pub forced_bets: ForcedBets,
    pub betting_structures: Vec<Structure>,
    #[serde(default)]
    pub betting_order: OrderRule,
    pub gameplay: Vec<Step>,
    pub showdown: ShowdownRules,
}

impl Rules {
    pub fn from_json(doc: &str) -> Result<Self, RulesError> {
        let rules: Rules = serde_json::from_str(doc)
            .map_err(|e| RulesError::InvalidRules(format!("schema: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.version != SCHEMA_VERSION {
            return Err(RulesError::InvalidRules(format!(
                "schema version {} not supported",
                self.version
            )));
        }
        if self.players.min < 2 || self.players.min > self.players.max {
            return Err(RulesError::InvalidRules(format!(
                "player bounds {}..{} are unplayable",
                self.players.min, self.players.max
            )));
        }
        self.deck.validate()?;
        if self.betting_structures.is_empty() {
            return Err(RulesError::InvalidRules(
                "no betting structure declared".to_string(),
            ));
        }
        self.validate_orders()?;
        self.validate_steps()?;
        self.validate_showdown()?;
        Ok(())
    }

    fn validate_orders(&self) -> Result<(), RulesError> {
        let styles = self
            .forced_bets
            .all_rules()
            .iter()
            .map(|r| r.style)
            .collect::<Vec<ForcedStyle>>();
        let initials = std::iter::once(self.betting_order.initial)
            .chain(self.betting_order.conditional.iter().map(|c| c.initial));
        for initial in initials {
            let consistent = match initial {
                InitialOrder::BringIn => styles.contains(&ForcedStyle::BringIn),
                InitialOrder::AfterBigBlind => styles.contains(&ForcedStyle::Blinds),
                InitialOrder::Dealer => true,
            };
            if !consistent {
                return Err(RulesError::InvalidRules(format!(
                    "betting order {:?} has no matching forced-bet style",
                    initial
                )));
            }
        }
        for rule in self.forced_bets.all_rules() {
            if rule.style == ForcedStyle::BringIn && rule.bring_in_eval.is_none() {
                return Err(RulesError::InvalidRules(
                    "bring-in forced bets need a bring_in_eval".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// one pass over gameplay: every referenced subset must have been
    /// introduced by an earlier step
    fn validate_steps(&self) -> Result<(), RulesError> {
        let mut hole: HashSet<&str> = HashSet::from([crate::DEFAULT_SUBSET]);
        let mut community: HashSet<&str> = HashSet::new();
        let mut showdowns = 0usize;
        let known = |set: &HashSet<&str>, name: &str| -> Result<(), RulesError> {
            if set.contains(name) {
                Ok(())
            } else {
                Err(RulesError::UnknownSubset(name.to_string()))
            }
        };
        for step in self.gameplay.iter() {
            for action in step.actions() {
                match action {
                    StepAction::Bet(bet) => {
                        let styles = self
                            .forced_bets
                            .all_rules()
                            .iter()
                            .map(|r| r.style)
                            .collect::<Vec<ForcedStyle>>();
                        let consistent = match bet.kind {
                            BetKind::Blinds => styles.contains(&ForcedStyle::Blinds),
                            BetKind::AntesOnly => styles.contains(&ForcedStyle::AntesOnly),
                            BetKind::BringIn => styles.contains(&ForcedStyle::BringIn),
                            BetKind::Small | BetKind::Big => true,
                        };
                        if !consistent {
                            return Err(RulesError::InvalidRules(format!(
                                "step {:?} posts {:?} but forced_bets never allow it",
                                step.name, bet.kind
                            )));
                        }
                    }
                    StepAction::Deal(deal) => {
                        for spec in deal.cards.iter() {
                            if spec.state.is_none() && spec.conditional_state.is_none() {
                                return Err(RulesError::InvalidRules(format!(
                                    "step {:?} deals cards with no visibility",
                                    step.name
                                )));
                            }
                            match deal.location {
                                DealLocation::Player => hole.insert(spec.subset()),
                                DealLocation::Community => community.insert(spec.subset()),
                            };
                        }
                    }
                    StepAction::Discard(discard) => {
                        known(&hole, discard.subset())?;
                        if let Some(to) = &discard.to_community {
                            community.insert(to);
                        }
                    }
                    StepAction::Draw(draw) => {
                        hole.insert(draw.subset());
                    }
                    StepAction::Remove(_) => {}
                    StepAction::Expose(expose) => known(&hole, expose.subset())?,
                    StepAction::Pass(pass) => known(&hole, pass.subset())?,
                    StepAction::Separate(separate) => {
                        for subset in separate.subsets.iter() {
                            hole.insert(&subset.name);
                        }
                    }
                    StepAction::Declare(_) | StepAction::Choose(_) => {}
                    StepAction::RollDie(roll) => {
                        community.insert(&roll.subset);
                    }
                    StepAction::Showdown(_) => showdowns += 1,
                }
            }
        }
        if showdowns == 0 {
            return Err(RulesError::InvalidRules(
                "gameplay never reaches a showdown".to_string(),
            ));
        }
        for board in self.showdown.boards.iter() {
            known(&community, board)?;
        }
        for config in self.all_configurations() {
            if let Selector::Grouped { groups } = &config.selector {
                for group in groups {
                    if !hole.contains(group.subset.as_str())
                        && !community.contains(group.subset.as_str())
                    {
                        return Err(RulesError::UnknownSubset(group.subset.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_showdown(&self) -> Result<(), RulesError> {
        if self.showdown.best_hand.is_empty() && self.showdown.conditional_best_hands.is_empty() {
            return Err(RulesError::InvalidRules(
                "showdown declares no best-hand configuration".to_string(),
            ));
        }
        for configs in std::iter::once(&self.showdown.best_hand)
            .chain(self.showdown.conditional_best_hands.iter().map(|c| &c.best_hand))
        {
            for (i, config) in configs.iter().enumerate() {
                if let Selector::UnusedFrom { configuration } = &config.selector {
                    let precedes = configs[..i].iter().any(|c| &c.name == configuration);
                    if !precedes {
                        return Err(RulesError::InvalidRules(format!(
                            "configuration {:?} uses unused cards of {:?}, which does not precede it",
                            config.name, configuration
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn all_configurations(&self) -> impl Iterator<Item = &BestHandConfig> {
        self.showdown.best_hand.iter().chain(
            self.showdown
                .conditional_best_hands
                .iter()
                .flat_map(|c| c.best_hand.iter()),
        )
    }
}

impl std::fmt::Display for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} ({}-{} players, {} steps)",
            self.game,
            self.players.min,
            self.players.max,
            self.gameplay.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants;

    #[test]
    fn presets_parse_and_validate() {
        for rules in [
            variants::texas_holdem(),
            variants::omaha(),
            variants::omaha_hi_lo_8(),
            variants::seven_card_stud(),
            variants::razz(),
            variants::five_card_draw(),
            variants::badugi(),
        ] {
            assert!(rules.validate().is_ok(), "{} failed validation", rules.game);
        }
    }

    #[test]
    fn unknown_top_level_keys_rejected() {
        let doc = serde_json::to_string(&variants::texas_holdem()).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&doc).unwrap();
        doc.as_object_mut()
            .unwrap()
            .insert("house_rules".to_string(), serde_json::json!({}));
        assert!(Rules::from_json(&doc.to_string()).is_err());
    }

    #[test]
    fn version_gate() {
        let doc = serde_json::to_string(&variants::texas_holdem()).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&doc).unwrap();
        doc["version"] = serde_json::json!(99);
        assert!(matches!(
            Rules::from_json(&doc.to_string()),
            Err(RulesError::InvalidRules(_))
        ));
    }

    #[test]
    fn empty_structures_rejected() {
        let mut rules = variants::texas_holdem();
        rules.betting_structures.clear();
        assert!(rules.validate().is_err());
    }

    #[test]
    fn unknown_subset_rejected() {
        use crate::rules::StepBody;
        let mut rules = variants::five_card_draw();
        for step in rules.gameplay.iter_mut() {
            let actions = match &mut step.body {
                StepBody::Grouped { grouped_actions } => grouped_actions.iter_mut(),
                StepBody::Single(action) => std::slice::from_mut(action).iter_mut(),
            };
            for action in actions {
                if let StepAction::Discard(discard) = action {
                    discard.subset = Some("Phantom".to_string());
                }
            }
        }
        assert!(matches!(
            rules.validate(),
            Err(RulesError::UnknownSubset(_))
        ));
    }

    #[test]
    fn round_trip() {
        let rules = variants::seven_card_stud();
        let doc = serde_json::to_string(&rules).unwrap();
        let parsed = Rules::from_json(&doc).unwrap();
        assert_eq!(parsed, rules);
    }
}
