use super::pot::build;
use super::pot::Contribution;
use super::pot::Pot;
use super::pot::RoundPots;
use super::structure::Stakes;
use super::structure::Structure;
use crate::errors::PlayError;
use crate::rules::BetKind;
use crate::Chips;
use crate::PlayerId;
use crate::MAX_RAISE_REPEATS;
use std::collections::BTreeMap;

/// Why chips are going in without a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forced {
    No,
    /// counts toward the round bet; the poster keeps their option
    Blind,
    /// dead money, straight to the pot
    Ante,
    /// counts toward the round bet and as the poster's action
    BringIn,
}

/// What a bet did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetResult {
    pub delta: Chips,
    pub all_in: bool,
    pub raised: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct BetState {
    round: Chips,
    total: Chips,
    folded: bool,
    all_in: bool,
    acted: bool,
}

/// Per-hand bet accounting: round state, bounds, pots.
///
/// The manager never touches stacks or cards; the game feeds it stack
/// sizes at bet time and mirrors fold and all-in transitions into it.
/// Pots are rebuilt from the cumulative contribution ledger, so their
/// shape is correct at any instant, side pots included.
#[derive(Debug, Clone)]
pub struct BettingManager {
    structure: Structure,
    stakes: Stakes,
    rung: BetKind,
    players: BTreeMap<PlayerId, BetState>,
    order: Vec<PlayerId>,
    current_bet: Chips,
    increment: Chips,
    raises: usize,
    aggressor: Option<PlayerId>,
}

impl BettingManager {
    pub fn new(structure: Structure, stakes: Stakes) -> Self {
        Self {
            structure,
            stakes,
            rung: BetKind::Small,
            players: BTreeMap::new(),
            order: Vec::new(),
            current_bet: 0,
            increment: 0,
            raises: 0,
            aggressor: None,
        }
    }

    /// reset for a new hand; `players` in seat order from the button
    pub fn start_hand(&mut self, players: &[PlayerId]) {
        self.players = players
            .iter()
            .map(|&p| (p, BetState::default()))
            .collect();
        self.order = players.to_vec();
        self.rung = BetKind::Small;
        self.current_bet = 0;
        self.increment = 0;
        self.raises = 0;
        self.aggressor = None;
    }

    /// install a betting round at the given limit rung
    pub fn set_rung(&mut self, rung: BetKind) {
        self.rung = rung;
        if self.increment < self.rung_amount() {
            self.increment = self.rung_amount();
        }
    }

    pub const fn structure(&self) -> Structure {
        self.structure
    }
    pub const fn stakes(&self) -> &Stakes {
        &self.stakes
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn aggressor(&self) -> Option<PlayerId> {
        self.aggressor
    }

    fn rung_amount(&self) -> Chips {
        match self.rung {
            BetKind::Big => self.stakes.big_bet,
            _ => self.stakes.small_bet,
        }
    }
    fn state(&self, player: PlayerId) -> BetState {
        self.players.get(&player).copied().unwrap_or_default()
    }

    /// cumulative round bet so far
    pub fn round_bet(&self, player: PlayerId) -> Chips {
        self.state(player).round
    }
    /// chips still owed to call, before stack capping
    pub fn additional_required(&self, player: PlayerId) -> Chips {
        self.current_bet - self.state(player).round
    }
    /// total-to for the minimum opening bet or call
    pub fn min_bet(&self, _player: PlayerId) -> Chips {
        if self.current_bet == 0 {
            match self.structure {
                Structure::Limit => self.rung_amount(),
                _ => self.stakes.small_bet.max(self.stakes.big_blind),
            }
        } else {
            self.current_bet
        }
    }
    /// total-to for the minimum raise; completion of a bring-in counts
    /// as reaching the small rung, not as a raise
    pub fn min_raise(&self, player: PlayerId) -> Chips {
        if self.current_bet == 0 {
            self.min_bet(player)
        } else if self.current_bet < self.rung_amount() {
            self.rung_amount()
        } else {
            self.current_bet + self.increment
        }
    }
    /// total-to ceiling given the player's remaining stack
    pub fn max_bet(&self, player: PlayerId, stack: Chips) -> Chips {
        let shove = self.state(player).round + stack;
        match self.structure {
            Structure::Limit if self.raises >= MAX_RAISE_REPEATS => self.current_bet.min(shove),
            Structure::Limit => self.min_raise(player).min(shove),
            Structure::NoLimit => shove,
            Structure::PotLimit => {
                let pot_after_call = self.pots().total() + self.additional_required(player);
                (self.current_bet + pot_after_call).min(shove)
            }
        }
    }
    /// raising is closed once the limit cap is reached
    pub fn may_raise(&self, player: PlayerId, stack: Chips) -> bool {
        if self.structure == Structure::Limit && self.raises >= MAX_RAISE_REPEATS {
            return false;
        }
        self.state(player).round + stack > self.current_bet
    }

    /// Commit chips to `total_to` for the round. Validation follows the
    /// structure's bounds unless the post is forced or a genuine all-in.
    pub fn place_bet(
        &mut self,
        player: PlayerId,
        total_to: Chips,
        stack: Chips,
        forced: Forced,
    ) -> Result<BetResult, PlayError> {
        let round = self.state(player).round;
        let delta = total_to - round;
        if delta < 0 {
            return Err(PlayError::InvalidAction("bet below current commitment".to_string()));
        }
        if delta > stack {
            return Err(PlayError::InsufficientChips { bet: delta, stack });
        }
        let all_in = delta == stack;
        if forced == Forced::No && !all_in {
            if total_to < self.current_bet {
                return Err(PlayError::BelowMinBet {
                    bet: total_to,
                    min: self.current_bet,
                });
            }
            if self.current_bet == 0 && total_to < self.min_bet(player) {
                return Err(PlayError::BelowMinBet {
                    bet: total_to,
                    min: self.min_bet(player),
                });
            }
            if total_to > self.current_bet {
                if !self.may_raise(player, stack) {
                    return Err(PlayError::AboveMaxBet {
                        bet: total_to,
                        max: self.current_bet,
                    });
                }
                if total_to < self.min_raise(player) {
                    return Err(PlayError::BelowMinRaise {
                        bet: total_to,
                        min: self.min_raise(player),
                    });
                }
                if total_to > self.max_bet(player, stack) {
                    return Err(PlayError::AboveMaxBet {
                        bet: total_to,
                        max: self.max_bet(player, stack),
                    });
                }
            }
        }
        let prev = self.current_bet;
        let raised = total_to > prev && prev > 0;
        let state = self.players.get_mut(&player).expect("player registered");
        state.total += delta;
        match forced {
            Forced::Ante => {}
            _ => state.round = total_to,
        }
        state.all_in = state.all_in || all_in;
        match forced {
            Forced::No | Forced::BringIn => state.acted = true,
            Forced::Blind | Forced::Ante => {}
        }
        if forced != Forced::Ante && total_to > prev {
            self.current_bet = total_to;
            // a short all-in raises the bar without reopening action;
            // completing a bring-in reopens action but is no raise
            let completion = prev > 0 && prev < self.rung_amount() && total_to == self.rung_amount();
            let full = forced == Forced::No && (total_to - prev >= self.increment || completion);
            if full {
                if self.structure != Structure::Limit {
                    self.increment = total_to - prev;
                }
                self.aggressor = Some(player);
                for (&other, state) in self.players.iter_mut() {
                    if other != player && !state.all_in && !state.folded {
                        state.acted = false;
                    }
                }
                if prev >= self.rung_amount() {
                    self.raises += 1;
                }
            }
        }
        log::trace!(
            "[betting] P{} to {} ({:?}), bet {} pot {}",
            player,
            total_to,
            forced,
            self.current_bet,
            self.pots().total()
        );
        Ok(BetResult {
            delta,
            all_in,
            raised,
        })
    }

    /// a check: legal only with nothing owed
    pub fn check(&mut self, player: PlayerId) -> Result<(), PlayError> {
        if self.additional_required(player) > 0 {
            return Err(PlayError::InvalidAction("cannot check facing a bet".to_string()));
        }
        self.players.get_mut(&player).expect("player registered").acted = true;
        Ok(())
    }

    pub fn fold(&mut self, player: PlayerId) {
        let state = self.players.get_mut(&player).expect("player registered");
        state.folded = true;
        state.acted = true;
    }

    /// still owes a decision this round
    pub fn needs_action(&self, player: PlayerId) -> bool {
        let state = self.state(player);
        !state.folded && !state.all_in && (!state.acted || state.round < self.current_bet)
    }

    /// everyone unfolded and unshoved has matched the bet and acted
    pub fn round_complete(&self) -> bool {
        self.players
            .values()
            .filter(|s| !s.folded && !s.all_in)
            .all(|s| s.acted && s.round == self.current_bet)
    }

    /// `preserve` keeps the current bet when forced posts roll into the
    /// first live round; otherwise round state clears for a new street
    pub fn new_round(&mut self, preserve: bool) {
        if !preserve {
            for state in self.players.values_mut() {
                state.round = 0;
                state.acted = false;
            }
            self.current_bet = 0;
            self.raises = 0;
            self.aggressor = None;
        }
        self.increment = self.rung_amount();
    }

    /// pot structure from the cumulative ledger, side pots included
    pub fn pots(&self) -> RoundPots {
        let ledger = self
            .order
            .iter()
            .map(|&p| {
                let s = self.state(p);
                Contribution {
                    player: p,
                    total: s.total,
                    folded: s.folded,
                    all_in: s.all_in,
                }
            })
            .collect::<Vec<Contribution>>();
        build(&ledger)
    }

    pub fn pot_total(&self) -> Chips {
        self.pots().total()
    }

    /// everything a player has put into this hand
    pub fn hand_total(&self, player: PlayerId) -> Chips {
        self.state(player).total
    }

    /// Split one pot among winners: equal shares, odd chips to the first
    /// winner in the given order (callers order by button proximity).
    pub fn award(&self, pot: &Pot, winners: &[PlayerId]) -> Vec<(PlayerId, Chips)> {
        assert!(!winners.is_empty(), "a pot needs a winner");
        let n = winners.len() as Chips;
        let share = pot.amount / n;
        let bonus = pot.amount % n;
        winners
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, share + if (i as Chips) < bonus { 1 } else { 0 }))
            .collect()
    }
}
