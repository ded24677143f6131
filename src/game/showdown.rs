use super::game::Game;
use super::event::GameEvent;
use super::results::HandResults;
use super::results::PotResult;
use super::results::ShownHand;
use super::view::GameState;
use crate::cards::Card;
use crate::errors::Error;
use crate::errors::RulesError;
use crate::evaluation;
use crate::evaluation::EvalContext;
use crate::evaluation::HandStrength;
use crate::evaluation::Selector;
use crate::rules::BestHandConfig;
use crate::rules::DeclarationMode;
use crate::rules::DefaultAction;
use crate::table::Seat;
use crate::Chips;
use crate::PlayerId;

/// The showdown pass.
///
/// Pots are awarded main first, then side pots ascending. Each pot's
/// amount splits across boards, then across the best-hand configurations
/// that produced a qualified winner, then across tied winners. Odd chips
/// fall toward the front at every split: first board, first (high)
/// configuration, and the winner closest clockwise from the button.
impl Game {
    pub(super) fn run_showdown(&mut self) -> Result<(), Error> {
        self.set_showdown_state();
        let pots = self.betting_pots();
        let ctx = self.condition_ctx(None);
        let configs = self.rules().showdown.configurations(&ctx).to_vec();
        let declaring = self.rules().showdown.declaration_mode == DeclarationMode::Declare
            && self.any_declarations();
        let boards = self.boards_in_play();
        let mut results = HandResults {
            hand_number: self.hand_number(),
            ..Default::default()
        };
        // evaluate every contender once per configuration and board
        let contenders = self.contender_ids();
        let mut strengths: Vec<(PlayerId, usize, usize, HandStrength)> = Vec::new();
        for &player in contenders.iter() {
            for (c, config) in configs.iter().enumerate() {
                for (b, board) in boards.iter().enumerate() {
                    let strength =
                        self.config_strength(player, config, board.as_deref(), &configs, &boards[..])?;
                    if let Some(strength) = strength {
                        if b == 0 {
                            self.push_shown(&mut results, player, config, &strength);
                        }
                        strengths.push((player, c, b, strength));
                    }
                }
            }
        }
        for (index, pot) in pots.all() {
            let shares = split_amount(pot.amount, boards.len());
            for (b, board) in boards.iter().enumerate() {
                let share = shares[b];
                if share == 0 {
                    continue;
                }
                // configurations that found a qualified winner
                let mut live: Vec<(usize, Vec<PlayerId>)> = Vec::new();
                for (c, config) in configs.iter().enumerate() {
                    let eligible = pot
                        .eligible
                        .iter()
                        .copied()
                        .filter(|p| contenders.contains(p))
                        .filter(|p| !declaring || self.declaration_covers(*p, config.is_high))
                        .collect::<Vec<PlayerId>>();
                    let winners = best_of_config(&strengths, c, b, &eligible);
                    if !winners.is_empty() {
                        live.push((c, winners));
                    }
                }
                if live.is_empty() {
                    self.award_by_default(
                        &mut results,
                        index,
                        share,
                        board.as_deref(),
                        &pot.eligible,
                        &contenders,
                        &boards[..],
                        &configs,
                    )?;
                    continue;
                }
                let config_shares = split_amount(share, live.len());
                for ((c, winners), amount) in live.into_iter().zip(config_shares) {
                    let ordered = self.button_order(&winners);
                    self.award_share(
                        &mut results,
                        index,
                        amount,
                        &configs[c].name,
                        board.as_deref(),
                        &ordered,
                    );
                }
            }
        }
        self.finish_hand(results)
    }

    /// best hand for one player under one configuration
    fn config_strength(
        &self,
        player: PlayerId,
        config: &BestHandConfig,
        board: Option<&str>,
        configs: &[BestHandConfig],
        boards: &[Option<String>],
    ) -> Result<Option<HandStrength>, Error> {
        let seat = self
            .table()
            .seat(player)
            .expect("contender seated")
            .clone();
        let community = self.community_pool(board);
        let wilds = evaluation::resolve(
            &config.wild_cards,
            &seat.cards(),
            &seat.face_down(),
            &community,
        );
        let ctx = EvalContext {
            qualifier: config.qualifier(),
            wilds,
            deck: self.rules().deck,
        };
        let found = match &config.selector {
            Selector::Grouped { groups } => {
                let mut pools: Vec<(String, Vec<Card>)> = seat
                    .hole
                    .iter()
                    .map(|(name, cards)| {
                        (name.clone(), cards.iter().map(|h| h.card).collect())
                    })
                    .collect();
                for (name, cards) in self.community_pools(board) {
                    pools.push((name, cards));
                }
                evaluation::find_best_grouped(&pools, groups, config.evaluation, &ctx)?
            }
            Selector::UnusedFrom { configuration } => {
                let prior = configs
                    .iter()
                    .find(|c| &c.name == configuration)
                    .ok_or_else(|| {
                        RulesError::InvalidRules(format!(
                            "unknown configuration {}",
                            configuration
                        ))
                    })?;
                let used = self
                    .config_strength(player, prior, board, configs, boards)?
                    .map(|s| s.cards_used)
                    .unwrap_or_default();
                let hole = seat
                    .cards()
                    .into_iter()
                    .filter(|c| !used.contains(c))
                    .collect::<Vec<Card>>();
                let community = community
                    .iter()
                    .copied()
                    .filter(|c| !used.contains(c))
                    .collect::<Vec<Card>>();
                evaluation::find_best(
                    &hole,
                    &community,
                    config.evaluation,
                    &Selector::AnyCards,
                    &ctx,
                )?
            }
            selector => {
                evaluation::find_best(&seat.cards(), &community, config.evaluation, selector, &ctx)?
            }
        };
        Ok(found)
    }

    fn push_shown(
        &mut self,
        results: &mut HandResults,
        player: PlayerId,
        config: &BestHandConfig,
        strength: &HandStrength,
    ) {
        results.hands.push(ShownHand {
            player,
            configuration: config.name.clone(),
            rank: strength.rank,
            ordered_rank: strength.ordered_rank,
            description: strength.description.clone(),
            cards_used: strength.cards_used.clone(),
        });
        self.push_event(GameEvent::ShowdownHand {
            hand: self.hand_number(),
            player,
            configuration: config.name.clone(),
            description: strength.description.clone(),
            cards: strength.cards_used.clone(),
        });
    }

    /// no configuration qualified: fall back per the rules
    #[allow(clippy::too_many_arguments)]
    fn award_by_default(
        &mut self,
        results: &mut HandResults,
        pot: Option<usize>,
        amount: Chips,
        board: Option<&str>,
        eligible: &[PlayerId],
        contenders: &[PlayerId],
        boards: &[Option<String>],
        configs: &[BestHandConfig],
    ) -> Result<(), Error> {
        let default = self.rules().showdown.default_action.clone();
        if let Some(DefaultAction::BestHand { configuration }) = &default {
            let mut strengths = Vec::new();
            for &player in eligible.iter().filter(|p| contenders.contains(p)) {
                if let Some(strength) =
                    self.config_strength(player, configuration, board, configs, boards)?
                {
                    strengths.push((player, 0usize, 0usize, strength));
                }
            }
            let winners = best_of_config(
                &strengths,
                0,
                0,
                &eligible
                    .iter()
                    .copied()
                    .filter(|p| contenders.contains(p))
                    .collect::<Vec<PlayerId>>(),
            );
            if !winners.is_empty() {
                let ordered = self.button_order(&winners);
                self.award_share(results, pot, amount, &configuration.name, board, &ordered);
                return Ok(());
            }
        }
        // split among everyone still eligible
        let ordered = self.button_order(
            &eligible
                .iter()
                .copied()
                .filter(|p| contenders.contains(p))
                .collect::<Vec<PlayerId>>(),
        );
        self.award_share(results, pot, amount, "Split Pot", board, &ordered);
        Ok(())
    }

    fn award_share(
        &mut self,
        results: &mut HandResults,
        pot: Option<usize>,
        amount: Chips,
        configuration: &str,
        board: Option<&str>,
        winners: &[PlayerId],
    ) {
        let payouts = split_payouts(amount, winners);
        for (player, chips) in payouts.iter() {
            self.credit(*player, *chips);
        }
        self.push_event(GameEvent::PotAwarded {
            hand: self.hand_number(),
            pot,
            configuration: configuration.to_string(),
            board: board.map(|b| b.to_string()),
            winners: payouts.clone(),
        });
        results.pots.push(PotResult {
            pot,
            configuration: configuration.to_string(),
            board: board.map(|b| b.to_string()),
            amount,
            winners: payouts,
        });
    }
}

/// winners of one configuration and board among the eligible
fn best_of_config(
    strengths: &[(PlayerId, usize, usize, HandStrength)],
    config: usize,
    board: usize,
    eligible: &[PlayerId],
) -> Vec<PlayerId> {
    let candidates = strengths
        .iter()
        .filter(|(p, c, b, s)| {
            *c == config && *b == board && eligible.contains(p) && s.is_qualified()
        })
        .collect::<Vec<_>>();
    let Some(best) = candidates
        .iter()
        .map(|(_, _, _, s)| s)
        .max_by(|a, b| a.cmp_strength(b))
    else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|(_, _, _, s)| s.ties(best))
        .map(|(p, _, _, _)| *p)
        .collect()
}

/// equal split with the remainder spread over the first entries
fn split_amount(amount: Chips, n: usize) -> Vec<Chips> {
    assert!(n > 0, "splitting across nothing");
    let n = n as Chips;
    let share = amount / n;
    let bonus = amount % n;
    (0..n).map(|i| share + if i < bonus { 1 } else { 0 }).collect()
}

fn split_payouts(amount: Chips, winners: &[PlayerId]) -> Vec<(PlayerId, Chips)> {
    assert!(!winners.is_empty(), "a share needs a winner");
    let shares = split_amount(amount, winners.len());
    winners.iter().copied().zip(shares).collect()
}

/// accessors the showdown needs that stay private to the game module
impl Game {
    fn set_showdown_state(&mut self) {
        self.force_state(GameState::Showdown);
    }

    fn any_declarations(&self) -> bool {
        self.table().occupied().any(|s| s.declaration.is_some())
    }

    fn declaration_covers(&self, player: PlayerId, high: bool) -> bool {
        self.table()
            .seat(player)
            .and_then(|s| s.declaration)
            .map(|d| d.covers(high))
            .unwrap_or(false)
    }

    /// players still contesting at showdown, seat order from the button
    fn contender_ids(&self) -> Vec<PlayerId> {
        self.table()
            .clockwise(self.table().dealer())
            .into_iter()
            .filter_map(|p| self.table().at(p))
            .map(|s: &Seat| s.id)
            .collect()
    }

    /// winners ordered clockwise from the seat after the button
    fn button_order(&self, players: &[PlayerId]) -> Vec<PlayerId> {
        let start = self
            .table()
            .next_occupied(self.table().dealer())
            .unwrap_or(self.table().dealer());
        let n = self.table().capacity();
        (0..n)
            .map(|i| (start + i) % n)
            .filter_map(|p| self.table().at(p))
            .map(|s| s.id)
            .filter(|id| players.contains(id))
            .collect()
    }

    /// boards still in play, or the single implicit board
    fn boards_in_play(&self) -> Vec<Option<String>> {
        let declared = &self.rules().showdown.boards;
        let alive = declared
            .iter()
            .filter(|b| self.has_community(b))
            .cloned()
            .map(Some)
            .collect::<Vec<Option<String>>>();
        if alive.is_empty() {
            vec![None]
        } else {
            alive
        }
    }

    /// the community cards hands may use: one board, or everything that
    /// is not a die subset
    fn community_pool(&self, board: Option<&str>) -> Vec<Card> {
        match board {
            Some(name) => self.community_cards(name),
            None => self
                .community_pools(None)
                .into_iter()
                .flat_map(|(_, cards)| cards)
                .collect(),
        }
    }

    fn community_pools(&self, board: Option<&str>) -> Vec<(String, Vec<Card>)> {
        self.community_subset_names()
            .into_iter()
            .filter(|name| !self.is_die_subset(name))
            .filter(|name| match board {
                Some(b) => {
                    !self.rules().showdown.boards.iter().any(|x| x == name)
                        || name.as_str() == b
                }
                None => true,
            })
            .map(|name| {
                let cards = self.community_cards(&name);
                (name, cards)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_spread_odd_chips_forward() {
        assert_eq!(split_amount(7, 2), vec![4, 3]);
        assert_eq!(split_amount(9, 3), vec![3, 3, 3]);
        assert_eq!(split_amount(10, 3), vec![4, 3, 3]);
    }

    #[test]
    fn best_of_config_filters_unqualified() {
        let strong = HandStrength {
            rank: 1,
            ordered_rank: 4,
            description: String::new(),
            cards_used: Vec::new(),
        };
        let weak = HandStrength {
            rank: 2,
            ordered_rank: 1,
            description: String::new(),
            cards_used: Vec::new(),
        };
        let out = HandStrength::unqualified();
        let strengths = vec![
            (1u64, 0usize, 0usize, strong.clone()),
            (2u64, 0usize, 0usize, weak),
            (3u64, 0usize, 0usize, out),
            (4u64, 0usize, 0usize, strong),
        ];
        assert_eq!(best_of_config(&strengths, 0, 0, &[1, 2, 3, 4]), vec![1, 4]);
        assert_eq!(best_of_config(&strengths, 0, 0, &[2, 3]), vec![2]);
        assert!(best_of_config(&strengths, 0, 0, &[3]).is_empty());
    }
}
