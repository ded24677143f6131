//! Preset rule documents for common variants.
//!
//! Each builder produces the same [`Rules`] the JSON parser would, so the
//! presets double as schema fixtures. Custom variants go through
//! [`Rules::from_json`] with a document of the same shape.

use crate::betting::Structure;
use crate::cards::DeckSpec;
use crate::evaluation::Evaluation;
use crate::evaluation::Selector;
use crate::rules::BetAction;
use crate::rules::BetKind;
use crate::rules::BestHandConfig;
use crate::rules::BringInRule;
use crate::rules::CardState;
use crate::rules::DealAction;
use crate::rules::DealLocation;
use crate::rules::DealSpec;
use crate::rules::DeclarationMode;
use crate::rules::DefaultAction;
use crate::rules::DiscardAction;
use crate::rules::DrawAction;
use crate::rules::DrawAmount;
use crate::rules::ForcedBetRule;
use crate::rules::ForcedBets;
use crate::rules::InitialOrder;
use crate::rules::OrderRule;
use crate::rules::PlayerBounds;
use crate::rules::QualifierName;
use crate::rules::QualifierSpec;
use crate::rules::RelativeTo;
use crate::rules::Rules;
use crate::rules::ShowdownAction;
use crate::rules::ShowdownRules;
use crate::rules::Step;
use crate::rules::StepAction;
use crate::rules::StepBody;
use crate::rules::SubsequentOrder;
use crate::rules::SCHEMA_VERSION;

fn step(name: &str, action: StepAction) -> Step {
    Step {
        name: name.to_string(),
        conditional_state: None,
        body: StepBody::Single(action),
    }
}

fn grouped(name: &str, actions: Vec<StepAction>) -> Step {
    Step {
        name: name.to_string(),
        conditional_state: None,
        body: StepBody::Grouped {
            grouped_actions: actions,
        },
    }
}

fn bet(name: &str, kind: BetKind) -> Step {
    step(
        name,
        StepAction::Bet(BetAction {
            kind,
            restriction: None,
        }),
    )
}

fn deal_hole(name: &str, number: usize) -> Step {
    deal_player(name, number, CardState::FaceDown)
}

fn deal_player(name: &str, number: usize, state: CardState) -> Step {
    step(
        name,
        StepAction::Deal(DealAction {
            location: DealLocation::Player,
            cards: vec![DealSpec {
                number,
                state: Some(state),
                subset: None,
                conditional_state: None,
            }],
        }),
    )
}

fn deal_board(name: &str, number: usize) -> Step {
    step(
        name,
        StepAction::Deal(DealAction {
            location: DealLocation::Community,
            cards: vec![DealSpec {
                number,
                state: Some(CardState::FaceUp),
                subset: None,
                conditional_state: None,
            }],
        }),
    )
}

/// stud street: two down one up on third, single up cards after
fn deal_street(name: &str, down: usize, up: usize) -> Step {
    let mut cards = Vec::new();
    if down > 0 {
        cards.push(DealSpec {
            number: down,
            state: Some(CardState::FaceDown),
            subset: None,
            conditional_state: None,
        });
    }
    if up > 0 {
        cards.push(DealSpec {
            number: up,
            state: Some(CardState::FaceUp),
            subset: None,
            conditional_state: None,
        });
    }
    step(
        name,
        StepAction::Deal(DealAction {
            location: DealLocation::Player,
            cards,
        }),
    )
}

/// discard up to `max`, then draw the same number back
fn draw_street(name: &str, max: usize) -> Step {
    grouped(
        name,
        vec![
            StepAction::Discard(DiscardAction {
                number: max,
                min: Some(0),
                subset: None,
                rule: None,
                to_community: None,
                once_per_step: false,
            }),
            StepAction::Draw(DrawAction {
                number: max,
                subset: None,
                draw_amount: Some(DrawAmount {
                    relative_to: RelativeTo::Discard,
                    offset: 0,
                }),
            }),
        ],
    )
}

fn showdown_step() -> Step {
    step("Showdown", StepAction::Showdown(ShowdownAction::default()))
}

fn high_hand(name: &str, selector: Selector) -> BestHandConfig {
    BestHandConfig {
        name: name.to_string(),
        evaluation: Evaluation::High,
        selector,
        qualifier: None,
        wild_cards: Vec::new(),
        is_high: true,
    }
}

pub fn texas_holdem() -> Rules {
    Rules {
        version: SCHEMA_VERSION,
        game: "Texas Hold'em".to_string(),
        players: PlayerBounds { min: 2, max: 10 },
        deck: DeckSpec::standard(),
        forced_bets: ForcedBets::Fixed(ForcedBetRule::blinds()),
        betting_structures: vec![Structure::Limit, Structure::NoLimit, Structure::PotLimit],
        betting_order: OrderRule {
            initial: InitialOrder::AfterBigBlind,
            subsequent: SubsequentOrder::Dealer,
            conditional: Vec::new(),
        },
        gameplay: vec![
            bet("Post Blinds", BetKind::Blinds),
            deal_hole("Deal Hole Cards", 2),
            bet("Pre-Flop Bet", BetKind::Small),
            deal_board("Deal Flop", 3),
            bet("Flop Bet", BetKind::Small),
            deal_board("Deal Turn", 1),
            bet("Turn Bet", BetKind::Big),
            deal_board("Deal River", 1),
            bet("River Bet", BetKind::Big),
            showdown_step(),
        ],
        showdown: ShowdownRules {
            declaration_mode: DeclarationMode::CardsSpeak,
            best_hand: vec![high_hand("Hand", Selector::AnyCards)],
            conditional_best_hands: Vec::new(),
            default_action: None,
            boards: Vec::new(),
            classification: None,
        },
    }
}

pub fn omaha() -> Rules {
    let mut rules = texas_holdem();
    rules.game = "Omaha".to_string();
    rules.betting_structures = vec![Structure::Limit, Structure::PotLimit];
    rules.gameplay[1] = deal_hole("Deal Hole Cards", 4);
    rules.showdown.best_hand = vec![high_hand("Hand", Selector::HoleBoard { hole: 2 })];
    rules
}

pub fn omaha_hi_lo_8() -> Rules {
    let mut rules = omaha();
    rules.game = "Omaha Hi-Lo 8 or Better".to_string();
    rules.showdown.best_hand = vec![
        high_hand("High Hand", Selector::HoleBoard { hole: 2 }),
        BestHandConfig {
            name: "Low Hand".to_string(),
            evaluation: Evaluation::A5Low,
            selector: Selector::HoleBoard { hole: 2 },
            qualifier: Some(QualifierSpec::Named(QualifierName::EightOrBetter)),
            wild_cards: Vec::new(),
            is_high: false,
        },
    ];
    rules.showdown.default_action = Some(DefaultAction::SplitPot);
    rules
}

pub fn seven_card_stud() -> Rules {
    Rules {
        version: SCHEMA_VERSION,
        game: "Seven Card Stud".to_string(),
        players: PlayerBounds { min: 2, max: 8 },
        deck: DeckSpec::standard(),
        forced_bets: ForcedBets::Fixed(ForcedBetRule::bring_in(
            BringInRule::LowestCard,
            Evaluation::High,
        )),
        betting_structures: vec![Structure::Limit],
        betting_order: OrderRule {
            initial: InitialOrder::BringIn,
            subsequent: SubsequentOrder::HighHand,
            conditional: Vec::new(),
        },
        gameplay: vec![
            bet("Post Antes", BetKind::AntesOnly),
            deal_street("Deal Third Street", 2, 1),
            bet("Third Street Bet", BetKind::BringIn),
            deal_street("Deal Fourth Street", 0, 1),
            bet("Fourth Street Bet", BetKind::Small),
            deal_street("Deal Fifth Street", 0, 1),
            bet("Fifth Street Bet", BetKind::Big),
            deal_street("Deal Sixth Street", 0, 1),
            bet("Sixth Street Bet", BetKind::Big),
            deal_street("Deal Seventh Street", 1, 0),
            bet("Seventh Street Bet", BetKind::Big),
            showdown_step(),
        ],
        showdown: ShowdownRules {
            declaration_mode: DeclarationMode::CardsSpeak,
            best_hand: vec![high_hand("Hand", Selector::AnyCards)],
            conditional_best_hands: Vec::new(),
            default_action: None,
            boards: Vec::new(),
            classification: None,
        },
    }
}

pub fn razz() -> Rules {
    let mut rules = seven_card_stud();
    rules.game = "Razz".to_string();
    rules.forced_bets = ForcedBets::Fixed(ForcedBetRule::bring_in(
        BringInRule::HighestCard,
        Evaluation::A5Low,
    ));
    rules.showdown.best_hand = vec![BestHandConfig {
        name: "Low Hand".to_string(),
        evaluation: Evaluation::A5Low,
        selector: Selector::AnyCards,
        qualifier: None,
        wild_cards: Vec::new(),
        is_high: true,
    }];
    rules
}

pub fn five_card_draw() -> Rules {
    Rules {
        version: SCHEMA_VERSION,
        game: "Five Card Draw".to_string(),
        players: PlayerBounds { min: 2, max: 6 },
        deck: DeckSpec::standard(),
        forced_bets: ForcedBets::Fixed(ForcedBetRule::blinds()),
        betting_structures: vec![Structure::Limit, Structure::NoLimit, Structure::PotLimit],
        betting_order: OrderRule {
            initial: InitialOrder::AfterBigBlind,
            subsequent: SubsequentOrder::Dealer,
            conditional: Vec::new(),
        },
        gameplay: vec![
            bet("Post Blinds", BetKind::Blinds),
            deal_hole("Deal Hands", 5),
            bet("First Bet", BetKind::Small),
            draw_street("Draw", 5),
            bet("Second Bet", BetKind::Big),
            showdown_step(),
        ],
        showdown: ShowdownRules {
            declaration_mode: DeclarationMode::CardsSpeak,
            best_hand: vec![high_hand("Hand", Selector::AnyCards)],
            conditional_best_hands: Vec::new(),
            default_action: None,
            boards: Vec::new(),
            classification: None,
        },
    }
}

pub fn badugi() -> Rules {
    let mut rules = five_card_draw();
    rules.game = "Badugi".to_string();
    rules.betting_structures = vec![Structure::Limit];
    rules.gameplay = vec![
        bet("Post Blinds", BetKind::Blinds),
        deal_hole("Deal Hands", 4),
        bet("First Bet", BetKind::Small),
        draw_street("First Draw", 4),
        bet("Second Bet", BetKind::Small),
        draw_street("Second Draw", 4),
        bet("Third Bet", BetKind::Big),
        draw_street("Third Draw", 4),
        bet("Fourth Bet", BetKind::Big),
        showdown_step(),
    ];
    rules.showdown.best_hand = vec![BestHandConfig {
        name: "Badugi".to_string(),
        evaluation: Evaluation::Badugi,
        selector: Selector::AnyCards,
        qualifier: None,
        wild_cards: Vec::new(),
        is_high: true,
    }];
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_survive_json() {
        for rules in [
            texas_holdem(),
            omaha(),
            omaha_hi_lo_8(),
            seven_card_stud(),
            razz(),
            five_card_draw(),
            badugi(),
        ] {
            let doc = serde_json::to_string_pretty(&rules).unwrap();
            let parsed = Rules::from_json(&doc).unwrap();
            assert_eq!(parsed, rules, "{} JSON round trip", rules.game);
        }
    }
}
