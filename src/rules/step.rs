use super::condition::Condition;
use crate::cards::Rank;
use crate::evaluation::Evaluation;

/// One entry in a rule document's gameplay list.
///
/// A step names either a single action or a grouped list executed per
/// actor in one pass (discard-then-draw, for instance). A conditional
/// step is skipped outright when its condition is false.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_state: Option<Condition>,
    #[serde(flatten)]
    pub body: StepBody,
}

impl Step {
    /// the actions of this step, grouped or not
    pub fn actions(&self) -> &[StepAction] {
        match &self.body {
            StepBody::Grouped { grouped_actions } => grouped_actions,
            StepBody::Single(action) => std::slice::from_ref(action),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StepBody {
    Grouped { grouped_actions: Vec<StepAction> },
    Single(StepAction),
}

/// The closed union of step actions.
///
/// The interpreter is an exhaustive match over this enum; a new kind of
/// step is an engine change by construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Bet(BetAction),
    Deal(DealAction),
    Discard(DiscardAction),
    Draw(DrawAction),
    Remove(RemoveAction),
    Expose(ExposeAction),
    Pass(PassAction),
    Separate(SeparateAction),
    Declare(DeclareAction),
    Choose(ChooseAction),
    RollDie(RollDieAction),
    Showdown(ShowdownAction),
}

impl StepAction {
    /// steps that wait on player decisions, as opposed to engine-driven ones
    pub fn is_interactive(&self) -> bool {
        match self {
            Self::Bet(bet) => bet.kind.is_round(),
            Self::Discard(_)
            | Self::Draw(_)
            | Self::Expose(_)
            | Self::Pass(_)
            | Self::Separate(_)
            | Self::Declare(_)
            | Self::Choose(_) => true,
            Self::Deal(_) | Self::Remove(_) | Self::RollDie(_) | Self::Showdown(_) => false,
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bet(_) => "bet",
            Self::Deal(_) => "deal",
            Self::Discard(_) => "discard",
            Self::Draw(_) => "draw",
            Self::Remove(_) => "remove",
            Self::Expose(_) => "expose",
            Self::Pass(_) => "pass",
            Self::Separate(_) => "separate",
            Self::Declare(_) => "declare",
            Self::Choose(_) => "choose",
            Self::RollDie(_) => "roll_die",
            Self::Showdown(_) => "showdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BetAction {
    #[serde(rename = "type")]
    pub kind: BetKind,
    /// Scarney-style restriction: an empty-handed player may only call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<BetRestriction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    /// forced posts, no decisions
    Blinds,
    AntesOnly,
    BringIn,
    /// betting rounds at the limit rungs (rung ignored outside Limit)
    Small,
    Big,
}

impl BetKind {
    /// a betting round rather than a forced post
    pub fn is_round(&self) -> bool {
        matches!(self, Self::Small | Self::Big | Self::BringIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetRestriction {
    CallOnly,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DealAction {
    pub location: DealLocation,
    pub cards: Vec<DealSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealLocation {
    Player,
    Community,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DealSpec {
    pub number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CardState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
    /// resolved against game state at deal time; wins over `state`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_state: Option<ConditionalCardState>,
}

impl DealSpec {
    pub fn subset(&self) -> &str {
        self.subset.as_deref().unwrap_or(crate::DEFAULT_SUBSET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    FaceUp,
    FaceDown,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalCardState {
    pub condition: Condition,
    pub then: CardState,
    pub otherwise: CardState,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscardAction {
    pub number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<DiscardRule>,
    /// discarded cards land in this community subset instead of leaving play
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_community: Option<String>,
    /// executes once across all actors rather than per actor
    #[serde(default)]
    pub once_per_step: bool,
}

impl DiscardAction {
    pub fn subset(&self) -> &str {
        self.subset.as_deref().unwrap_or(crate::DEFAULT_SUBSET)
    }
    pub fn min(&self) -> usize {
        self.min.unwrap_or(self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardRule {
    /// every selected card must share a rank
    MatchingRanks,
    /// the whole subset goes, no selection
    EntireSubset,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawAction {
    pub number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_amount: Option<DrawAmount>,
}

impl DrawAction {
    pub fn subset(&self) -> &str {
        self.subset.as_deref().unwrap_or(crate::DEFAULT_SUBSET)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawAmount {
    pub relative_to: RelativeTo,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeTo {
    Discard,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveAction {
    pub criterion: RemoveCriterion,
    /// community subsets whose names start here are compared as boards
    #[serde(default = "RemoveAction::default_prefix")]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

impl RemoveAction {
    fn default_prefix() -> String {
        "Board".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveCriterion {
    LosingBoard,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExposeAction {
    pub number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
    /// visible before the step completes, not only after
    #[serde(default)]
    pub immediate: bool,
}

impl ExposeAction {
    pub fn subset(&self) -> &str {
        self.subset.as_deref().unwrap_or(crate::DEFAULT_SUBSET)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassAction {
    pub number: usize,
    pub direction: PassDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
}

impl PassAction {
    pub fn subset(&self) -> &str {
        self.subset.as_deref().unwrap_or(crate::DEFAULT_SUBSET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassDirection {
    Left,
    Right,
    Across,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeparateAction {
    pub subsets: Vec<SeparateSubset>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeparateSubset {
    pub name: String,
    pub size: usize,
    /// at least this many face-up cards must land here
    #[serde(default)]
    pub face_up_min: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclareAction {
    /// collected before any are revealed, or in turn order
    #[serde(default = "DeclareAction::default_simultaneous")]
    pub simultaneous: bool,
    #[serde(default = "Declaration::all")]
    pub options: Vec<Declaration>,
}

impl DeclareAction {
    fn default_simultaneous() -> bool {
        true
    }
}

/// Which half(s) of the pot a player competes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    High,
    Low,
    HighLow,
}

impl Declaration {
    pub fn all() -> Vec<Self> {
        vec![Self::High, Self::Low, Self::HighLow]
    }
    /// does this declaration compete for a configuration of the given kind
    pub fn covers(&self, high: bool) -> bool {
        match self {
            Self::High => high,
            Self::Low => !high,
            Self::HighLow => true,
        }
    }
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
            Self::HighLow => write!(f, "high_low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChooseAction {
    /// choice name, referenced by conditions and conditional forced bets
    pub name: String,
    pub chooser: ChoosePosition,
    pub possible_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoosePosition {
    Utg,
    Button,
    Dealer,
    Sb,
    Bb,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollDieAction {
    /// the roll lands in this community subset as a rank-coded card:
    /// one is an ace, two through six their matching ranks
    #[serde(default = "RollDieAction::default_subset")]
    pub subset: String,
    #[serde(default = "RollDieAction::default_sides")]
    pub sides: u8,
}

impl RollDieAction {
    fn default_subset() -> String {
        "Die".to_string()
    }
    fn default_sides() -> u8 {
        6
    }
    /// encode a die face as a card rank
    pub fn rank_for(face: u8) -> Rank {
        match face {
            1 => Rank::Ace,
            n => Rank::from(n - 2),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowdownAction {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_tag_shape() {
        let step: Step = serde_json::from_str(
            r#"{"name":"Deal Flop","deal":{"location":"community","cards":[{"number":3,"state":"face_up"}]}}"#,
        )
        .unwrap();
        assert_eq!(step.actions().len(), 1);
        assert!(matches!(step.actions()[0], StepAction::Deal(_)));
        assert!(!step.actions()[0].is_interactive());
    }

    #[test]
    fn grouped_actions_shape() {
        let step: Step = serde_json::from_str(
            r#"{"name":"Discard and Draw","grouped_actions":[
                {"discard":{"number":5,"min":0}},
                {"draw":{"number":5,"draw_amount":{"relative_to":"discard"}}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(step.actions().len(), 2);
    }

    #[test]
    fn unknown_action_keys_rejected() {
        let bad = r#"{"name":"Bad","teleport":{"number":1}}"#;
        assert!(serde_json::from_str::<Step>(bad).is_err());
        let bad = r#"{"name":"Bad","deal":{"location":"community","cards":[],"extra":1}}"#;
        assert!(serde_json::from_str::<Step>(bad).is_err());
    }

    #[test]
    fn die_faces() {
        assert_eq!(RollDieAction::rank_for(1), Rank::Ace);
        assert_eq!(RollDieAction::rank_for(2), Rank::Two);
        assert_eq!(RollDieAction::rank_for(6), Rank::Six);
    }
}
