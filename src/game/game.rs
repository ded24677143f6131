use super::action::ActionOption;
use super::action::ActionResult;
use super::action::PlayerAction;
use super::event::CardView;
use super::event::ForcedKind;
use super::event::GameEvent;
use super::results::HandResults;
use super::view::GameState;
use super::view::GameStateView;
use super::view::SeatView;
use crate::betting::BettingManager;
use crate::betting::Forced;
use crate::betting::Stakes;
use crate::betting::Structure;
use crate::cards::Card;
use crate::cards::Deck;
use crate::cards::Suit;
use crate::errors::EngineError;
use crate::errors::Error;
use crate::errors::PlayError;
use crate::errors::RulesError;
use crate::evaluation;
use crate::evaluation::Evaluation;
use crate::rules::BetAction;
use crate::rules::BetKind;
use crate::rules::BetRestriction;
use crate::rules::BringInRule;
use crate::rules::CardState;
use crate::rules::ChooseAction;
use crate::rules::ChoosePosition;
use crate::rules::ConditionContext;
use crate::rules::DealAction;
use crate::rules::DealLocation;
use crate::rules::DeclareAction;
use crate::rules::DiscardAction;
use crate::rules::DiscardRule;
use crate::rules::DrawAction;
use crate::rules::ExposeAction;
use crate::rules::ForcedStyle;
use crate::rules::InitialOrder;
use crate::rules::PassAction;
use crate::rules::PassDirection;
use crate::rules::RemoveAction;
use crate::rules::RollDieAction;
use crate::rules::Rules;
use crate::rules::SeparateAction;
use crate::rules::StepAction;
use crate::rules::SubsequentOrder;
use crate::table::DealtCard;
use crate::table::Seat;
use crate::table::SeatStatus;
use crate::table::Table;
use crate::Chips;
use crate::PlayerId;
use crate::Position;
use rand::RngCore;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Per-step scratch state, cleared on step entry.
#[derive(Debug, Default)]
pub(super) struct StepScratch {
    /// discard counts, for draws sized relative to them
    pub discards: BTreeMap<PlayerId, usize>,
    /// simultaneous declarations, revealed together
    pub declared: Vec<(PlayerId, crate::rules::Declaration)>,
    /// simultaneous passes, transferred together
    pub passes: Vec<(Position, Vec<Card>)>,
    /// non-immediate exposures, flipped together
    pub exposures: Vec<(Position, Vec<Card>)>,
}

/// The step interpreter: one table, one variant, one hand at a time.
///
/// A `Game` owns its table, betting manager, and deck outright. All card
/// and chip movement flows through `start_hand`, `player_action`, and
/// `advance`; nothing here blocks, and long waits are simply the machine
/// not advancing until the current actor moves. One logical executor per
/// game; distinct games are fully independent.
pub struct Game {
    rules: Arc<Rules>,
    stakes: Stakes,
    buy_in: RangeInclusive<Chips>,
    rng: Box<dyn RngCore + Send>,
    table: Table,
    betting: BettingManager,
    deck: Deck,
    community: BTreeMap<String, Vec<DealtCard>>,
    choices: BTreeMap<String, String>,
    state: GameState,
    step: usize,
    group: usize,
    actor: Option<Position>,
    queue: VecDeque<Position>,
    pub(super) scratch: StepScratch,
    events: Vec<GameEvent>,
    /// community subsets holding die faces, never part of a hand pool
    die_subsets: std::collections::HashSet<String>,
    hand_number: u64,
    rounds_played: usize,
    forced_open: bool,
    round_installed: bool,
    last_aggressor: Option<PlayerId>,
    baseline: Chips,
    advance_ready: bool,
    rigged: Option<Vec<Card>>,
    results: Option<HandResults>,
}

impl Game {
    pub fn new(
        rules: Rules,
        structure: Structure,
        stakes: Stakes,
        buy_in: RangeInclusive<Chips>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, RulesError> {
        rules.validate()?;
        if !rules.betting_structures.contains(&structure) {
            return Err(RulesError::InvalidRules(format!(
                "{} is not offered by {}",
                structure, rules.game
            )));
        }
        evaluation::preload();
        let deck = Deck::new(&rules.deck)?;
        let capacity = rules.players.max;
        Ok(Self {
            betting: BettingManager::new(structure, stakes),
            table: Table::new(capacity),
            rules: Arc::new(rules),
            stakes,
            buy_in,
            rng,
            deck,
            community: BTreeMap::new(),
            choices: BTreeMap::new(),
            state: GameState::Waiting,
            step: 0,
            group: 0,
            actor: None,
            queue: VecDeque::new(),
            scratch: StepScratch::default(),
            events: Vec::new(),
            die_subsets: std::collections::HashSet::new(),
            hand_number: 0,
            rounds_played: 0,
            forced_open: false,
            round_installed: false,
            last_aggressor: None,
            baseline: 0,
            advance_ready: false,
            rigged: None,
            results: None,
        })
    }

    //
    // inspection
    //

    pub fn state(&self) -> GameState {
        self.state
    }
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn pot_total(&self) -> Chips {
        self.betting.pot_total()
    }
    pub fn current_actor(&self) -> Option<PlayerId> {
        self.actor
            .and_then(|pos| self.table.at(pos))
            .map(|seat| seat.id)
    }
    pub fn current_step_name(&self) -> Option<&str> {
        self.rules.gameplay.get(self.step).map(|s| s.name.as_str())
    }
    /// script the next hand's deal order, for fixtures and replays
    pub fn rig_next_deck(&mut self, front: Vec<Card>) {
        self.rigged = Some(front);
    }
    /// drains the event log; events are totally ordered and monotonic
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
    /// the full log projected for one observer, hidden cards redacted
    pub fn events_for(&self, observer: Option<PlayerId>) -> Vec<GameEvent> {
        self.events
            .iter()
            .map(|e| e.for_observer(observer))
            .collect()
    }

    //
    // player lifecycle
    //

    pub fn add_player(&mut self, id: PlayerId, name: &str, buy_in: Chips) -> Result<Position, Error> {
        if !matches!(self.state, GameState::Waiting | GameState::Complete) {
            return Err(PlayError::InvalidAction("cannot join mid-hand".to_string()).into());
        }
        if !self.buy_in.contains(&buy_in) {
            return Err(PlayError::InvalidAction(format!(
                "buy-in {} outside {}..={}",
                buy_in,
                self.buy_in.start(),
                self.buy_in.end()
            ))
            .into());
        }
        if self.table.occupied().count() >= self.rules.players.max {
            return Err(PlayError::InvalidAction("table is full".to_string()).into());
        }
        Ok(self.table.add_player(id, name, buy_in)?)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<Chips, Error> {
        let between = matches!(self.state, GameState::Waiting | GameState::Complete);
        let sitting_out = self
            .table
            .seat(id)
            .map(|s| s.status == SeatStatus::SittingOut)
            .unwrap_or(false);
        if !between && !sitting_out {
            return Err(PlayError::InvalidAction("cannot leave mid-hand".to_string()).into());
        }
        let seat = self.table.remove_player(id)?;
        Ok(seat.stack)
    }

    //
    // hand lifecycle
    //

    pub fn start_hand(&mut self) -> Result<(), Error> {
        if !matches!(self.state, GameState::Waiting | GameState::Complete) {
            return Err(PlayError::InvalidAction("hand in progress".to_string()).into());
        }
        let funded = self
            .table
            .occupied()
            .filter(|s| s.stack > 0)
            .count();
        if funded < self.rules.players.min {
            return Err(PlayError::InvalidAction(format!(
                "{} funded players, need {}",
                funded, self.rules.players.min
            ))
            .into());
        }
        if self.hand_number > 0 {
            self.table.advance_button();
        }
        self.hand_number += 1;
        self.table.clear_hands();
        self.community.clear();
        self.choices.clear();
        self.die_subsets.clear();
        self.results = None;
        self.scratch = StepScratch::default();
        self.rounds_played = 0;
        self.forced_open = false;
        self.round_installed = false;
        self.last_aggressor = None;
        self.advance_ready = false;
        self.deck = match self.rigged.take() {
            Some(front) => Deck::rigged(&self.rules.deck, front)?,
            None => {
                let mut deck = Deck::new(&self.rules.deck)?;
                deck.shuffle(&mut self.rng);
                deck
            }
        };
        let order = self.table.clockwise(self.table.dealer());
        let ids = order
            .iter()
            .map(|&p| self.table.at(p).expect("occupied").id)
            .collect::<Vec<PlayerId>>();
        self.betting.start_hand(&ids);
        self.baseline = self.table.chips();
        self.state = GameState::Dealing;
        self.step = 0;
        self.group = 0;
        self.actor = None;
        self.queue.clear();
        self.events.push(GameEvent::HandStarted {
            hand: self.hand_number,
            dealer: self.table.dealer(),
            stacks: self
                .table
                .occupied()
                .map(|s| (s.id, s.stack))
                .collect(),
        });
        log::debug!("[game] hand #{} begins, dealer {}", self.hand_number, self.table.dealer());
        self.run_steps()
    }

    /// called when `advance_step` was signalled; finishes the step and
    /// processes everything non-interactive until a decision or the end
    pub fn advance(&mut self) -> Result<(), Error> {
        if self.state == GameState::Complete {
            return Ok(());
        }
        if !self.advance_ready {
            return Err(PlayError::InvalidAction("nothing to advance".to_string()).into());
        }
        self.advance_ready = false;
        self.step += 1;
        self.group = 0;
        self.round_installed = false;
        self.run_steps()
    }

    pub fn hand_results(&self) -> Result<&HandResults, Error> {
        match (&self.state, &self.results) {
            (GameState::Complete, Some(results)) => Ok(results),
            _ => Err(PlayError::InvalidAction("hand not complete".to_string()).into()),
        }
    }

    //
    // the interpreter loop
    //

    /// process steps until a player decision is required or the hand ends
    fn run_steps(&mut self) -> Result<(), Error> {
        while self.state != GameState::Complete {
            let Some(step) = self.rules.gameplay.get(self.step).cloned() else {
                // a fully non-interactive tail without showdown cannot
                // happen in a validated document
                return Err(EngineError::TurnOrderUnderflow.into());
            };
            if let Some(condition) = &step.conditional_state {
                if !condition.eval(&self.condition_ctx(None)) {
                    log::trace!("[game] step {:?} skipped by condition", step.name);
                    self.step += 1;
                    continue;
                }
            }
            if self.group == 0 && self.queue.is_empty() {
                self.events.push(GameEvent::PhaseChange {
                    hand: self.hand_number,
                    step: self.step,
                    name: step.name.clone(),
                });
            }
            match self.enter_step(&step)? {
                Flow::Waiting => return Ok(()),
                Flow::Done => {
                    self.step += 1;
                    self.group = 0;
                    self.round_installed = false;
                    self.queue.clear();
                    self.scratch = StepScratch::default();
                }
                Flow::Ended => return Ok(()),
            }
        }
        Ok(())
    }

    fn enter_step(&mut self, step: &crate::rules::Step) -> Result<Flow, Error> {
        let actions = step.actions().to_vec();
        // betting rounds and single non-interactive actions run directly;
        // actor-steps walk the queue through possibly grouped actions
        match actions.first() {
            Some(StepAction::Bet(bet)) if !bet.kind.is_round() => {
                self.exec_forced(bet)?;
                Ok(Flow::Done)
            }
            Some(StepAction::Bet(bet)) => self.enter_betting(bet),
            Some(StepAction::Deal(_))
            | Some(StepAction::Remove(_))
            | Some(StepAction::RollDie(_))
            | Some(StepAction::Showdown(_)) => {
                for action in actions.iter() {
                    match action {
                        StepAction::Deal(deal) => self.exec_deal(deal)?,
                        StepAction::Remove(remove) => self.exec_remove(remove)?,
                        StepAction::RollDie(roll) => self.exec_roll(roll)?,
                        StepAction::Showdown(_) => {
                            self.run_showdown()?;
                            return Ok(Flow::Ended);
                        }
                        _ => {
                            return Err(RulesError::InvalidRules(format!(
                                "step {:?} mixes engine and player actions",
                                step.name
                            ))
                            .into());
                        }
                    }
                }
                Ok(Flow::Done)
            }
            Some(StepAction::Choose(choose)) => {
                if self.queue.is_empty() && self.actor.is_none() {
                    let chooser = self.chooser_position(choose.chooser)?;
                    self.queue = VecDeque::from([chooser]);
                }
                self.walk_actor_queue(&actions)
            }
            Some(_) => {
                if self.queue.is_empty() && self.actor.is_none() && self.group == 0 {
                    self.queue = self.step_actors();
                }
                self.walk_actor_queue(&actions)
            }
            None => Ok(Flow::Done),
        }
    }

    /// actors for per-player steps: active seats, deal order
    fn step_actors(&self) -> VecDeque<Position> {
        self.table
            .actors_from(self.deal_start())
            .into_iter()
            .collect()
    }

    /// dealing starts at the small blind in blinds games (which is the
    /// dealer heads-up), otherwise left of the button
    fn deal_start(&self) -> Position {
        let style = self
            .rules
            .forced_bets
            .resolve(&self.choices)
            .style;
        match style {
            ForcedStyle::Blinds => self.table.blind_positions().0,
            _ => self
                .table
                .next_in_hand(self.table.dealer())
                .unwrap_or(self.table.dealer()),
        }
    }

    /// advance through the actor queue, executing non-interactive group
    /// actions, stopping on the first that needs input
    fn walk_actor_queue(&mut self, actions: &[StepAction]) -> Result<Flow, Error> {
        loop {
            let Some(&position) = self.queue.front() else {
                self.finalize_step(actions)?;
                self.actor = None;
                self.state = GameState::Dealing;
                return Ok(Flow::Done);
            };
            if self
                .table
                .at(position)
                .map(|s| s.status != SeatStatus::Active)
                .unwrap_or(true)
            {
                self.queue.pop_front();
                self.group = 0;
                continue;
            }
            match actions.get(self.group).cloned() {
                None => {
                    self.queue.pop_front();
                    self.group = 0;
                }
                Some(action) if action.is_interactive() => {
                    self.actor = Some(position);
                    self.state = match action {
                        StepAction::Bet(_) => GameState::Betting,
                        _ => GameState::Drawing,
                    };
                    return Ok(Flow::Waiting);
                }
                Some(action) => {
                    self.exec_for_actor(position, &action)?;
                    self.group += 1;
                }
            }
        }
    }

    /// non-interactive group actions that run per actor
    fn exec_for_actor(&mut self, position: Position, action: &StepAction) -> Result<(), Error> {
        match action {
            StepAction::Draw(draw) => self.exec_draw(position, draw),
            StepAction::Deal(deal) => {
                // a deal inside a group lands on the current actor only
                self.deal_to_player(position, deal)
            }
            other => Err(RulesError::InvalidRules(format!(
                "{} cannot run without player input",
                other.label()
            ))
            .into()),
        }
    }

    /// simultaneous buffers flush when the last actor finishes
    fn finalize_step(&mut self, actions: &[StepAction]) -> Result<(), Error> {
        for action in actions {
            match action {
                StepAction::Pass(pass) => self.flush_passes(pass)?,
                StepAction::Expose(expose) if !expose.immediate => self.flush_exposures(expose),
                StepAction::Declare(declare) if declare.simultaneous => self.flush_declarations(),
                _ => {}
            }
        }
        Ok(())
    }

    //
    // forced bets
    //

    fn exec_forced(&mut self, bet: &BetAction) -> Result<(), Error> {
        match bet.kind {
            BetKind::Blinds => {
                let (sb, bb) = self.table.blind_positions();
                self.post(sb, self.stakes.small_blind, Forced::Blind, ForcedKind::SmallBlind)?;
                self.post(bb, self.stakes.big_blind, Forced::Blind, ForcedKind::BigBlind)?;
                self.forced_open = true;
            }
            BetKind::AntesOnly => {
                let ante = self.stakes.ante;
                for position in self.table.clockwise(self.deal_start()) {
                    self.post(position, ante, Forced::Ante, ForcedKind::Ante)?;
                }
            }
            _ => unreachable!("round kinds enter betting"),
        }
        Ok(())
    }

    fn post(
        &mut self,
        position: Position,
        amount: Chips,
        forced: Forced,
        kind: ForcedKind,
    ) -> Result<(), Error> {
        let seat = self.table.at(position).expect("seat occupied");
        let (id, stack) = (seat.id, seat.stack);
        let target = match forced {
            Forced::Ante => amount.min(stack),
            _ => (self.betting.round_bet(id) + stack).min(amount),
        };
        let result = self
            .betting
            .place_bet(id, target, stack, forced)
            .map_err(Error::from)?;
        let seat = self.table.at_mut(position).expect("seat occupied");
        seat.stack -= result.delta;
        if result.all_in {
            seat.status = SeatStatus::AllIn;
        }
        self.events.push(GameEvent::ForcedBet {
            hand: self.hand_number,
            step: self.step,
            player: id,
            kind,
            amount: result.delta,
        });
        Ok(())
    }

    //
    // betting rounds
    //

    fn enter_betting(&mut self, bet: &BetAction) -> Result<Flow, Error> {
        if !self.round_installed {
            // install the round once
            self.betting.set_rung(match bet.kind {
                BetKind::Big => BetKind::Big,
                _ => BetKind::Small,
            });
            let preserve = std::mem::take(&mut self.forced_open);
            self.betting.new_round(preserve);
            let first = if bet.kind == BetKind::BringIn {
                let poster = self.bring_in_position()?;
                self.post(poster, self.stakes.bring_in, Forced::BringIn, ForcedKind::BringIn)?;
                self.next_bettor(poster)
            } else {
                let start = self.round_start()?;
                match self.betting.needs_action(self.table.at(start).expect("occupied").id) {
                    true => Some(start),
                    false => self.next_bettor(start),
                }
            };
            self.rounds_played += 1;
            self.round_installed = true;
            match first {
                Some(position) => {
                    // a lone active player facing no bet has no decision
                    if self.table.active().count() < 2
                        && self
                            .table
                            .active()
                            .all(|s| self.betting.additional_required(s.id) <= 0)
                    {
                        self.round_ended()?;
                        return Ok(Flow::Done);
                    }
                    self.actor = Some(position);
                    self.state = GameState::Betting;
                    return Ok(Flow::Waiting);
                }
                None => {
                    self.round_ended()?;
                    return Ok(Flow::Done);
                }
            }
        }
        // re-entered after the round completed
        self.round_ended()?;
        Ok(Flow::Done)
    }

    /// first to act by the initial or subsequent order policy
    fn round_start(&mut self) -> Result<Position, Error> {
        let (initial, subsequent) = self.rules.betting_order.resolve(&self.choices);
        let position = if self.rounds_played == 0 {
            match initial {
                InitialOrder::AfterBigBlind => self.table.after_big_blind(),
                InitialOrder::Dealer => self
                    .table
                    .next_occupied(self.table.dealer())
                    .ok_or(EngineError::TurnOrderUnderflow)?,
                InitialOrder::BringIn => self.bring_in_position()?,
            }
        } else {
            match subsequent {
                SubsequentOrder::Dealer => self
                    .table
                    .next_occupied(self.table.dealer())
                    .ok_or(EngineError::TurnOrderUnderflow)?,
                SubsequentOrder::HighHand => self.high_hand_position()?,
                SubsequentOrder::LastActor => self
                    .last_aggressor
                    .and_then(|id| self.table.seat(id))
                    .filter(|s| s.status == SeatStatus::Active)
                    .map(|s| s.position)
                    .map(Ok)
                    .unwrap_or_else(|| {
                        self.table
                            .next_occupied(self.table.dealer())
                            .ok_or(EngineError::TurnOrderUnderflow)
                    })?,
            }
        };
        // the policy seat may be folded or all in
        let position = match self
            .table
            .at(position)
            .map(|s| s.status == SeatStatus::Active)
            .unwrap_or(false)
        {
            true => position,
            false => self
                .table
                .actors_from(position)
                .first()
                .copied()
                .ok_or(EngineError::TurnOrderUnderflow)?,
        };
        Ok(position)
    }

    /// lowest (or highest) exposed card decides who posts the bring-in
    fn bring_in_position(&mut self) -> Result<Position, Error> {
        let rule = self.rules.forced_bets.resolve(&self.choices);
        let eval = rule.bring_in_eval.unwrap_or(Evaluation::High);
        let lowest = rule.rule.unwrap_or(BringInRule::LowestCard) == BringInRule::LowestCard;
        let mut best: Option<(Position, Vec<u8>)> = None;
        for position in self.table.actors_from(self.deal_start()) {
            let seat = self.table.at(position).expect("occupied");
            let key = evaluation::visible_key(&seat.face_up(), eval);
            let wins = match &best {
                None => true,
                Some((_, incumbent)) => {
                    if lowest {
                        key < *incumbent
                    } else {
                        key > *incumbent
                    }
                }
            };
            if wins {
                best = Some((position, key));
            }
        }
        best.map(|(p, _)| p)
            .ok_or_else(|| EngineError::TurnOrderUnderflow.into())
    }

    /// best visible hand under the bring-in evaluation opens; ties go
    /// clockwise from the button. In lowball families the best visible
    /// hand is the lowest one.
    fn high_hand_position(&mut self) -> Result<Position, Error> {
        let rule = self.rules.forced_bets.resolve(&self.choices);
        let eval = rule.bring_in_eval.unwrap_or(Evaluation::High);
        let low = eval.ace_low() || eval == Evaluation::Deuce7Low;
        let start = self
            .table
            .next_occupied(self.table.dealer())
            .ok_or(EngineError::TurnOrderUnderflow)?;
        let mut best: Option<(Position, Vec<u8>)> = None;
        for position in self.table.actors_from(start) {
            let seat = self.table.at(position).expect("occupied");
            let key = evaluation::visible_key(&seat.face_up(), eval);
            let wins = match &best {
                None => true,
                Some((_, incumbent)) => {
                    if low {
                        key < *incumbent
                    } else {
                        key > *incumbent
                    }
                }
            };
            if wins {
                best = Some((position, key));
            }
        }
        best.map(|(p, _)| p)
            .ok_or_else(|| EngineError::TurnOrderUnderflow.into())
    }

    /// next seat clockwise that still owes a betting decision
    fn next_bettor(&self, after: Position) -> Option<Position> {
        let n = self.table.capacity();
        (1..=n)
            .map(|i| (after + i) % n)
            .filter_map(|p| self.table.at(p))
            .filter(|s| s.status == SeatStatus::Active)
            .find(|s| self.betting.needs_action(s.id))
            .map(|s| s.position)
    }

    fn round_ended(&mut self) -> Result<(), Error> {
        if let Some(aggressor) = self.betting.aggressor() {
            self.last_aggressor = Some(aggressor);
        }
        self.actor = None;
        self.state = GameState::Dealing;
        self.check_conservation()?;
        log::debug!(
            "[game] betting round over, pots {}",
            self.betting.pots()
        );
        Ok(())
    }

    //
    // engine-driven steps
    //

    fn exec_deal(&mut self, deal: &DealAction) -> Result<(), Error> {
        match deal.location {
            DealLocation::Player => {
                for position in self.table.clockwise(self.deal_start()) {
                    self.deal_to_player(position, deal)?;
                }
                Ok(())
            }
            DealLocation::Community => {
                for spec in deal.cards.iter() {
                    let cards = self.deck.deal(spec.number)?;
                    let state = self.resolve_state(spec, None);
                    let views = cards
                        .iter()
                        .map(|&c| match state {
                            CardState::FaceUp => CardView::open(c),
                            CardState::FaceDown => CardView::held(c),
                        })
                        .collect();
                    self.community
                        .entry(spec.subset().to_string())
                        .or_default()
                        .extend(cards.into_iter().map(|c| DealtCard::new(c, state)));
                    self.events.push(GameEvent::Deal {
                        hand: self.hand_number,
                        step: self.step,
                        location: DealLocation::Community,
                        subset: spec.subset().to_string(),
                        player: None,
                        cards: views,
                    });
                }
                Ok(())
            }
        }
    }

    fn deal_to_player(&mut self, position: Position, deal: &DealAction) -> Result<(), Error> {
        for spec in deal.cards.iter() {
            let cards = self.deck.deal(spec.number)?;
            let state = self.resolve_state(spec, Some(position));
            let id = self.table.at(position).expect("occupied").id;
            let seat = self.table.at_mut(position).expect("occupied");
            for &card in cards.iter() {
                seat.give(spec.subset(), card, state);
            }
            self.events.push(GameEvent::Deal {
                hand: self.hand_number,
                step: self.step,
                location: DealLocation::Player,
                subset: spec.subset().to_string(),
                player: Some(id),
                cards: cards
                    .iter()
                    .map(|&c| match state {
                        CardState::FaceUp => CardView::open(c),
                        CardState::FaceDown => CardView::held(c),
                    })
                    .collect(),
            });
        }
        Ok(())
    }

    fn resolve_state(&self, spec: &crate::rules::DealSpec, position: Option<Position>) -> CardState {
        if let Some(conditional) = &spec.conditional_state {
            let ctx = self.condition_ctx(position);
            if conditional.condition.eval(&ctx) {
                conditional.then
            } else {
                conditional.otherwise
            }
        } else {
            spec.state.unwrap_or(CardState::FaceDown)
        }
    }

    fn exec_roll(&mut self, roll: &RollDieAction) -> Result<(), Error> {
        let face = (self.rng.next_u32() % roll.sides as u32) as u8 + 1;
        let card = Card::from((RollDieAction::rank_for(face), Suit::Spade));
        self.die_subsets.insert(roll.subset.clone());
        self.community
            .entry(roll.subset.clone())
            .or_default()
            .push(DealtCard::new(card, CardState::FaceUp));
        self.events.push(GameEvent::DieRolled {
            hand: self.hand_number,
            step: self.step,
            subset: roll.subset.clone(),
            face,
        });
        Ok(())
    }

    /// compare board subsets and remove the losing one
    fn exec_remove(&mut self, remove: &RemoveAction) -> Result<(), Error> {
        let eval = remove.evaluation.unwrap_or(Evaluation::High);
        let boards = self
            .community
            .keys()
            .filter(|name| name.starts_with(&remove.prefix))
            .cloned()
            .collect::<Vec<String>>();
        if boards.len() < 2 {
            return Ok(());
        }
        let ctx = crate::evaluation::EvalContext {
            deck: self.rules.deck,
            ..Default::default()
        };
        let mut losing: Option<(String, crate::evaluation::HandStrength)> = None;
        for name in boards {
            let cards = self.community_cards(&name);
            let strength = evaluation::find_best(
                &cards,
                &[],
                eval,
                &crate::evaluation::Selector::AnyCards,
                &ctx,
            )?
            .ok_or_else(|| RulesError::InvalidRules(format!("board {} is empty", name)))?;
            let worse = losing
                .as_ref()
                .map(|(_, incumbent)| incumbent.beats(&strength))
                .unwrap_or(true);
            if worse {
                losing = Some((name, strength));
            }
        }
        if let Some((name, _)) = losing {
            self.community.remove(&name);
            self.events.push(GameEvent::BoardRemoved {
                hand: self.hand_number,
                step: self.step,
                subset: name,
            });
        }
        Ok(())
    }

    fn exec_draw(&mut self, position: Position, draw: &DrawAction) -> Result<(), Error> {
        let id = self.table.at(position).expect("occupied").id;
        let n = match &draw.draw_amount {
            Some(amount) => {
                let base = self.scratch.discards.get(&id).copied().unwrap_or(0) as i64;
                (base + amount.offset).max(0) as usize
            }
            None => draw.number,
        };
        let cards = self.deck.deal(n)?;
        let seat = self.table.at_mut(position).expect("occupied");
        for &card in cards.iter() {
            seat.give(draw.subset(), card, CardState::FaceDown);
        }
        self.events.push(GameEvent::Drew {
            hand: self.hand_number,
            step: self.step,
            player: id,
            count: n,
        });
        Ok(())
    }

    //
    // player actions
    //

    pub fn valid_actions(&self, player: PlayerId) -> Vec<ActionOption> {
        let Some(position) = self.actor else {
            return Vec::new();
        };
        let Some(seat) = self.table.at(position) else {
            return Vec::new();
        };
        if seat.id != player {
            return Vec::new();
        }
        let Some(step) = self.rules.gameplay.get(self.step) else {
            return Vec::new();
        };
        let Some(action) = step.actions().get(self.group) else {
            return Vec::new();
        };
        match action {
            StepAction::Bet(bet) => self.betting_options(seat, bet),
            StepAction::Discard(discard) => vec![
                ActionOption::Fold,
                ActionOption::Discard {
                    subset: discard.subset().to_string(),
                    min: match discard.rule {
                        Some(DiscardRule::EntireSubset) => seat.cards_in(discard.subset()).len(),
                        _ => discard.min(),
                    },
                    max: match discard.rule {
                        Some(DiscardRule::EntireSubset) => seat.cards_in(discard.subset()).len(),
                        _ => discard.number,
                    },
                    matching_ranks: discard.rule == Some(DiscardRule::MatchingRanks),
                    entire_subset: discard.rule == Some(DiscardRule::EntireSubset),
                },
            ],
            StepAction::Expose(expose) => vec![
                ActionOption::Fold,
                ActionOption::Expose {
                    subset: expose.subset().to_string(),
                    number: expose.number,
                    eligible: seat
                        .hole
                        .get(expose.subset())
                        .map(|held| {
                            held.iter()
                                .filter(|h| !h.is_up())
                                .map(|h| h.card)
                                .collect()
                        })
                        .unwrap_or_default(),
                },
            ],
            StepAction::Pass(pass) => vec![
                ActionOption::Fold,
                ActionOption::Pass {
                    subset: pass.subset().to_string(),
                    number: pass.number,
                },
            ],
            StepAction::Separate(separate) => vec![
                ActionOption::Fold,
                ActionOption::Separate {
                    subsets: separate.subsets.clone(),
                },
            ],
            StepAction::Declare(declare) => vec![ActionOption::Declare {
                options: declare.options.clone(),
            }],
            StepAction::Choose(choose) => vec![ActionOption::Choose {
                name: choose.name.clone(),
                values: choose.possible_values.clone(),
            }],
            _ => Vec::new(),
        }
    }

    fn betting_options(&self, seat: &Seat, bet: &BetAction) -> Vec<ActionOption> {
        let id = seat.id;
        let owed = self.betting.additional_required(id);
        let mut options = Vec::new();
        options.push(ActionOption::Fold);
        if owed <= 0 {
            options.push(ActionOption::Check);
        } else {
            options.push(ActionOption::Call {
                amount: owed.min(seat.stack),
            });
        }
        let call_only = bet.restriction == Some(BetRestriction::CallOnly) && seat.hand_size() == 0;
        if !call_only && self.betting.may_raise(id, seat.stack) {
            let min = if self.betting.current_bet() == 0 {
                self.betting.min_bet(id)
            } else {
                self.betting.min_raise(id)
            };
            let max = self.betting.max_bet(id, seat.stack);
            let shove = self.betting.round_bet(id) + seat.stack;
            // a short stack may still shove below the minimum
            let min = min.min(shove);
            if max > self.betting.current_bet() {
                options.push(ActionOption::Bet { min, max });
            }
        }
        options
    }

    pub fn player_action(&mut self, player: PlayerId, action: PlayerAction) -> ActionResult {
        let Some(position) = self.actor else {
            return ActionResult::rejected(PlayError::NotPlayersTurn);
        };
        if self.table.at(position).map(|s| s.id) != Some(player) {
            return ActionResult::rejected(PlayError::NotPlayersTurn);
        }
        let Some(step) = self.rules.gameplay.get(self.step).cloned() else {
            return ActionResult::rejected(PlayError::InvalidAction("no step".to_string()));
        };
        let Some(spec) = step.actions().get(self.group).cloned() else {
            return ActionResult::rejected(PlayError::InvalidAction("no action".to_string()));
        };
        let before = self.events.len();
        let outcome = self.apply_action(position, player, &spec, &action, step.actions());
        match outcome {
            Err(Error::Play(e)) => {
                log::warn!("[game] P{} rejected: {}", player, e);
                ActionResult::rejected(e)
            }
            Err(other) => {
                // rules and engine failures surface through advance();
                // report and freeze
                log::error!("[game] fatal during action: {}", other);
                ActionResult::rejected(PlayError::InvalidAction(other.to_string()))
            }
            Ok(advance_step) => {
                self.advance_ready = advance_step;
                ActionResult::applied(advance_step, self.events[before..].to_vec())
            }
        }
    }

    /// returns whether the step (or round) completed
    fn apply_action(
        &mut self,
        position: Position,
        player: PlayerId,
        spec: &StepAction,
        action: &PlayerAction,
        group: &[StepAction],
    ) -> Result<bool, Error> {
        // a fold is accepted in any interactive step
        if matches!(action, PlayerAction::Fold) {
            return self.apply_fold(position, player, spec, group);
        }
        match spec {
            StepAction::Bet(bet) => self.apply_bet_action(position, player, bet, action),
            StepAction::Discard(discard) => {
                let PlayerAction::Discard { cards } = action else {
                    return Err(PlayError::InvalidAction("discard expected".to_string()).into());
                };
                self.apply_discard(position, player, discard, cards)?;
                self.actor_group_done(group)
            }
            StepAction::Expose(expose) => {
                let PlayerAction::Expose { cards } = action else {
                    return Err(PlayError::InvalidAction("expose expected".to_string()).into());
                };
                self.apply_expose(position, player, expose, cards)?;
                self.actor_group_done(group)
            }
            StepAction::Pass(pass) => {
                let PlayerAction::Pass { cards } = action else {
                    return Err(PlayError::InvalidAction("pass expected".to_string()).into());
                };
                self.apply_pass(position, player, pass, cards)?;
                self.actor_group_done(group)
            }
            StepAction::Separate(separate) => {
                let PlayerAction::Separate { assignments } = action else {
                    return Err(PlayError::InvalidAction("separate expected".to_string()).into());
                };
                self.apply_separate(position, player, separate, assignments)?;
                self.actor_group_done(group)
            }
            StepAction::Declare(declare) => {
                let PlayerAction::Declare { declaration } = action else {
                    return Err(PlayError::InvalidAction("declare expected".to_string()).into());
                };
                self.apply_declare(position, player, declare, *declaration)?;
                self.actor_group_done(group)
            }
            StepAction::Choose(choose) => {
                let PlayerAction::Choose { value } = action else {
                    return Err(PlayError::InvalidAction("choice expected".to_string()).into());
                };
                self.apply_choose(player, choose, value)?;
                self.actor_group_done(group)
            }
            _ => Err(PlayError::InvalidAction("no decision pending".to_string()).into()),
        }
    }

    /// after an actor finishes an interactive action, run the rest of
    /// their group and move the queue along
    fn actor_group_done(&mut self, group: &[StepAction]) -> Result<bool, Error> {
        self.group += 1;
        match self.walk_actor_queue(group)? {
            Flow::Waiting => Ok(false),
            _ => Ok(true),
        }
    }

    fn apply_fold(
        &mut self,
        position: Position,
        player: PlayerId,
        spec: &StepAction,
        group: &[StepAction],
    ) -> Result<bool, Error> {
        self.table.at_mut(position).expect("occupied").status = SeatStatus::Folded;
        self.betting.fold(player);
        self.events.push(GameEvent::Action {
            hand: self.hand_number,
            step: self.step,
            player,
            kind: "fold".to_string(),
            amount: None,
            pot: self.pot_total(),
        });
        // the hand ends the moment one seat remains
        if self.table.in_hand().count() == 1 {
            self.award_last_standing()?;
            return Ok(false);
        }
        match spec {
            StepAction::Bet(_) => self.after_bet_action(position),
            _ => {
                self.queue.pop_front();
                self.group = 0;
                self.actor = None;
                self.actor_group_done_after_fold(group)
            }
        }
    }

    /// like actor_group_done but the folder's group does not continue
    fn actor_group_done_after_fold(&mut self, group: &[StepAction]) -> Result<bool, Error> {
        self.group = 0;
        match self.walk_actor_queue(group)? {
            Flow::Waiting => Ok(false),
            _ => Ok(true),
        }
    }

    fn apply_bet_action(
        &mut self,
        position: Position,
        player: PlayerId,
        bet: &BetAction,
        action: &PlayerAction,
    ) -> Result<bool, Error> {
        let stack = self.table.at(position).expect("occupied").stack;
        let (kind, result) = match action {
            PlayerAction::Check => {
                self.betting.check(player)?;
                ("check", None)
            }
            PlayerAction::Call => {
                let target = self.betting.current_bet().min(self.betting.round_bet(player) + stack);
                let result = self.betting.place_bet(player, target, stack, Forced::No)?;
                ("call", Some(result))
            }
            PlayerAction::Bet { to } => {
                let call_only =
                    bet.restriction == Some(BetRestriction::CallOnly)
                        && self.table.at(position).expect("occupied").hand_size() == 0;
                if call_only && *to > self.betting.current_bet() {
                    return Err(PlayError::InvalidAction(
                        "empty hands may only call here".to_string(),
                    )
                    .into());
                }
                let result = self.betting.place_bet(player, *to, stack, Forced::No)?;
                (if result.raised { "raise" } else { "bet" }, Some(result))
            }
            _ => {
                return Err(PlayError::InvalidAction("betting action expected".to_string()).into())
            }
        };
        if let Some(result) = result {
            let seat = self.table.at_mut(position).expect("occupied");
            seat.stack -= result.delta;
            if result.all_in {
                seat.status = SeatStatus::AllIn;
            }
        }
        self.events.push(GameEvent::Action {
            hand: self.hand_number,
            step: self.step,
            player,
            kind: kind.to_string(),
            amount: result.map(|r| r.delta),
            pot: self.pot_total(),
        });
        self.after_bet_action(position)
    }

    /// move to the next bettor or end the round
    fn after_bet_action(&mut self, position: Position) -> Result<bool, Error> {
        if self.betting.round_complete() {
            self.round_ended()?;
            return Ok(true);
        }
        match self.next_bettor(position) {
            Some(next) => {
                self.actor = Some(next);
                Ok(false)
            }
            None => {
                self.round_ended()?;
                Ok(true)
            }
        }
    }

    fn apply_discard(
        &mut self,
        position: Position,
        player: PlayerId,
        discard: &DiscardAction,
        cards: &[Card],
    ) -> Result<(), Error> {
        let seat = self.table.at(position).expect("occupied");
        let held = seat.cards_in(discard.subset());
        for card in cards {
            if !held.contains(card) {
                return Err(PlayError::UnknownCardSelection(card.to_string()).into());
            }
        }
        let (min, max) = match discard.rule {
            Some(DiscardRule::EntireSubset) => (held.len(), held.len()),
            _ => (discard.min(), discard.number),
        };
        if cards.len() < min || cards.len() > max {
            return Err(PlayError::BadSubsetSizes(format!(
                "discard {} cards, allowed {}..={}",
                cards.len(),
                min,
                max
            ))
            .into());
        }
        if discard.rule == Some(DiscardRule::MatchingRanks)
            && cards.windows(2).any(|w| w[0].rank() != w[1].rank())
        {
            return Err(PlayError::InvalidAction(
                "discards must share a rank".to_string(),
            )
            .into());
        }
        let taken = self
            .table
            .at_mut(position)
            .expect("occupied")
            .take(discard.subset(), cards);
        if let Some(to) = &discard.to_community {
            self.community
                .entry(to.clone())
                .or_default()
                .extend(taken.iter().map(|h| DealtCard::new(h.card, CardState::FaceUp)));
        }
        self.scratch.discards.insert(player, cards.len());
        self.events.push(GameEvent::Discarded {
            hand: self.hand_number,
            step: self.step,
            player,
            count: cards.len(),
            to_community: discard.to_community.clone(),
        });
        // a once-per-step discard retires the whole queue
        if discard.once_per_step {
            self.queue.clear();
            self.queue.push_front(position);
        }
        Ok(())
    }

    fn apply_expose(
        &mut self,
        position: Position,
        player: PlayerId,
        expose: &ExposeAction,
        cards: &[Card],
    ) -> Result<(), Error> {
        let seat = self.table.at(position).expect("occupied");
        let down = seat
            .hole
            .get(expose.subset())
            .map(|held| {
                held.iter()
                    .filter(|h| !h.is_up())
                    .map(|h| h.card)
                    .collect::<Vec<Card>>()
            })
            .unwrap_or_default();
        for card in cards {
            if !down.contains(card) {
                return Err(PlayError::UnknownCardSelection(card.to_string()).into());
            }
        }
        if cards.len() != expose.number {
            return Err(PlayError::BadSubsetSizes(format!(
                "expose exactly {} cards",
                expose.number
            ))
            .into());
        }
        if expose.immediate {
            let step = self.step;
            self.table
                .at_mut(position)
                .expect("occupied")
                .expose(expose.subset(), cards, step);
            self.events.push(GameEvent::Exposed {
                hand: self.hand_number,
                step: self.step,
                player,
                cards: cards.to_vec(),
            });
        } else {
            self.scratch.exposures.push((position, cards.to_vec()));
        }
        Ok(())
    }

    fn flush_exposures(&mut self, expose: &ExposeAction) {
        let step = self.step;
        for (position, cards) in std::mem::take(&mut self.scratch.exposures) {
            let Some(seat) = self.table.at_mut(position) else {
                continue;
            };
            let player = seat.id;
            seat.expose(expose.subset(), &cards, step);
            self.events.push(GameEvent::Exposed {
                hand: self.hand_number,
                step,
                player,
                cards,
            });
        }
    }

    fn apply_pass(
        &mut self,
        position: Position,
        _player: PlayerId,
        pass: &PassAction,
        cards: &[Card],
    ) -> Result<(), Error> {
        let seat = self.table.at(position).expect("occupied");
        let held = seat.cards_in(pass.subset());
        for card in cards {
            if !held.contains(card) {
                return Err(PlayError::UnknownCardSelection(card.to_string()).into());
            }
        }
        if cards.len() != pass.number {
            return Err(PlayError::BadSubsetSizes(format!("pass exactly {} cards", pass.number)).into());
        }
        self.scratch.passes.push((position, cards.to_vec()));
        Ok(())
    }

    /// all passes transfer at once so nobody sees incoming cards early
    fn flush_passes(&mut self, pass: &PassAction) -> Result<(), Error> {
        let passes = std::mem::take(&mut self.scratch.passes);
        let ring = self
            .table
            .clockwise(self.table.dealer())
            .into_iter()
            .collect::<Vec<Position>>();
        for (from, cards) in passes.iter() {
            let taken = self
                .table
                .at_mut(*from)
                .expect("occupied")
                .take(pass.subset(), cards);
            let at = ring.iter().position(|p| p == from).ok_or_else(|| {
                RulesError::InvalidRules("passer left the ring".to_string())
            })?;
            let to = match pass.direction {
                PassDirection::Left => ring[(at + 1) % ring.len()],
                PassDirection::Right => ring[(at + ring.len() - 1) % ring.len()],
                PassDirection::Across => ring[(at + ring.len() / 2) % ring.len()],
            };
            let (from_id, to_id) = (
                self.table.at(*from).expect("occupied").id,
                self.table.at(to).expect("occupied").id,
            );
            let receiver = self.table.at_mut(to).expect("occupied");
            for dealt in taken {
                receiver.give(pass.subset(), dealt.card, dealt.state);
            }
            self.events.push(GameEvent::Passed {
                hand: self.hand_number,
                step: self.step,
                player: from_id,
                to: to_id,
                count: cards.len(),
            });
        }
        Ok(())
    }

    fn apply_separate(
        &mut self,
        position: Position,
        player: PlayerId,
        separate: &SeparateAction,
        assignments: &BTreeMap<String, Vec<Card>>,
    ) -> Result<(), Error> {
        let seat = self.table.at(position).expect("occupied");
        let held = seat
            .hole
            .values()
            .flatten()
            .copied()
            .collect::<Vec<DealtCard>>();
        let total_declared = separate.subsets.iter().map(|s| s.size).sum::<usize>();
        if total_declared != held.len() {
            return Err(PlayError::BadSubsetSizes(format!(
                "partition covers {} cards, hand has {}",
                total_declared,
                held.len()
            ))
            .into());
        }
        let mut seen = Vec::new();
        for spec in separate.subsets.iter() {
            let assigned = assignments
                .get(&spec.name)
                .ok_or_else(|| PlayError::BadSubsetSizes(format!("missing subset {}", spec.name)))?;
            if assigned.len() != spec.size {
                return Err(PlayError::BadSubsetSizes(format!(
                    "subset {} wants {} cards, got {}",
                    spec.name,
                    spec.size,
                    assigned.len()
                ))
                .into());
            }
            let mut face_up = 0usize;
            for card in assigned {
                let dealt = held
                    .iter()
                    .find(|h| h.card == *card)
                    .ok_or_else(|| PlayError::UnknownCardSelection(card.to_string()))?;
                if seen.contains(card) {
                    return Err(PlayError::UnknownCardSelection(format!(
                        "{} assigned twice",
                        card
                    ))
                    .into());
                }
                seen.push(*card);
                if dealt.is_up() {
                    face_up += 1;
                }
            }
            if face_up < spec.face_up_min {
                return Err(PlayError::BadSubsetSizes(format!(
                    "subset {} needs {} face-up cards",
                    spec.name, spec.face_up_min
                ))
                .into());
            }
        }
        // rebuild the hand under the new partition
        let seat = self.table.at_mut(position).expect("occupied");
        let stash = held;
        seat.hole.clear();
        for spec in separate.subsets.iter() {
            let assigned = assignments.get(&spec.name).expect("validated");
            for card in assigned {
                let dealt = stash.iter().find(|h| h.card == *card).expect("validated");
                seat.hole
                    .entry(spec.name.clone())
                    .or_default()
                    .push(*dealt);
            }
        }
        self.events.push(GameEvent::Separated {
            hand: self.hand_number,
            step: self.step,
            player,
            subsets: separate.subsets.iter().map(|s| s.name.clone()).collect(),
        });
        Ok(())
    }

    fn apply_declare(
        &mut self,
        position: Position,
        player: PlayerId,
        declare: &DeclareAction,
        declaration: crate::rules::Declaration,
    ) -> Result<(), Error> {
        if !declare.options.contains(&declaration) {
            return Err(PlayError::IllegalDeclaration(format!(
                "{} is not offered",
                declaration
            ))
            .into());
        }
        if declare.simultaneous {
            self.scratch.declared.push((player, declaration));
        } else {
            self.table.at_mut(position).expect("occupied").declaration = Some(declaration);
            self.events.push(GameEvent::Declared {
                hand: self.hand_number,
                step: self.step,
                player,
                declaration,
            });
        }
        Ok(())
    }

    fn flush_declarations(&mut self) {
        for (player, declaration) in std::mem::take(&mut self.scratch.declared) {
            if let Some(seat) = self.table.seat_mut(player) {
                seat.declaration = Some(declaration);
            }
            self.events.push(GameEvent::Declared {
                hand: self.hand_number,
                step: self.step,
                player,
                declaration,
            });
        }
    }

    fn apply_choose(
        &mut self,
        player: PlayerId,
        choose: &ChooseAction,
        value: &str,
    ) -> Result<(), Error> {
        if !choose.possible_values.iter().any(|v| v == value) {
            return Err(PlayError::InvalidAction(format!(
                "{} is not among the offered values",
                value
            ))
            .into());
        }
        self.choices
            .insert(choose.name.clone(), value.to_string());
        self.events.push(GameEvent::Chose {
            hand: self.hand_number,
            step: self.step,
            player,
            name: choose.name.clone(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn chooser_position(&self, chooser: ChoosePosition) -> Result<Position, Error> {
        let position = match chooser {
            ChoosePosition::Button | ChoosePosition::Dealer => self.table.dealer(),
            ChoosePosition::Sb => self.table.blind_positions().0,
            ChoosePosition::Bb => self.table.blind_positions().1,
            ChoosePosition::Utg => match self.rules.forced_bets.resolve(&self.choices).style {
                ForcedStyle::Blinds => self.table.after_big_blind(),
                _ => self
                    .table
                    .next_occupied(self.table.dealer())
                    .ok_or(EngineError::TurnOrderUnderflow)?,
            },
        };
        Ok(position)
    }

    //
    // plumbing shared with the showdown
    //

    pub(super) fn condition_ctx(&self, position: Option<Position>) -> ConditionContext {
        // conditions see only face-up cards
        let community = self
            .community
            .iter()
            .map(|(name, cards)| {
                (
                    name.clone(),
                    cards
                        .iter()
                        .filter(|h| h.is_up())
                        .map(|h| h.card)
                        .collect::<Vec<Card>>(),
                )
            })
            .collect();
        ConditionContext {
            choices: self.choices.clone(),
            community,
            hand_size: position
                .and_then(|p| self.table.at(p))
                .map(|s| s.hand_size()),
            exposed: position
                .and_then(|p| self.table.at(p))
                .map(|s| s.face_up().len()),
        }
    }

    pub(super) fn betting_pots(&self) -> crate::betting::RoundPots {
        self.betting.pots()
    }
    pub(super) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
    pub(super) fn credit(&mut self, player: PlayerId, amount: Chips) {
        self.table.seat_mut(player).expect("seated").win(amount);
    }
    pub(super) fn force_state(&mut self, state: GameState) {
        self.state = state;
    }
    pub(super) fn has_community(&self, subset: &str) -> bool {
        self.community.contains_key(subset)
    }
    pub(super) fn community_subset_names(&self) -> Vec<String> {
        self.community.keys().cloned().collect()
    }
    pub(super) fn is_die_subset(&self, name: &str) -> bool {
        self.die_subsets.contains(name)
    }

    pub(super) fn community_cards(&self, subset: &str) -> Vec<Card> {
        self.community
            .get(subset)
            .map(|v| v.iter().map(|h| h.card).collect())
            .unwrap_or_default()
    }

    pub(super) fn all_community_cards(&self) -> Vec<Card> {
        self.community
            .values()
            .flatten()
            .map(|h| h.card)
            .collect()
    }

    fn check_conservation(&self) -> Result<(), Error> {
        let held = self.table.chips() + self.betting.pot_total();
        if held != self.baseline {
            return Err(EngineError::ChipConservationViolated {
                expected: self.baseline,
                found: held,
            }
            .into());
        }
        Ok(())
    }

    //
    // last player standing
    //

    fn award_last_standing(&mut self) -> Result<(), Error> {
        let winner = self
            .table
            .in_hand()
            .next()
            .map(|s| s.id)
            .ok_or(EngineError::TurnOrderUnderflow)?;
        let pots = self.betting.pots();
        let mut results = HandResults {
            hand_number: self.hand_number,
            ..Default::default()
        };
        for (index, pot) in pots.all() {
            let payouts = self.betting.award(pot, &[winner]);
            for (id, amount) in payouts.iter() {
                self.table.seat_mut(*id).expect("seated").win(*amount);
            }
            self.events.push(GameEvent::PotAwarded {
                hand: self.hand_number,
                pot: index,
                configuration: "Last Player Standing".to_string(),
                board: None,
                winners: payouts.clone(),
            });
            results.pots.push(super::results::PotResult {
                pot: index,
                configuration: "Last Player Standing".to_string(),
                board: None,
                amount: pot.amount,
                winners: payouts,
            });
        }
        self.finish_hand(results)
    }

    pub(super) fn finish_hand(&mut self, results: HandResults) -> Result<(), Error> {
        if self.table.chips() != self.baseline {
            return Err(EngineError::ChipConservationViolated {
                expected: self.baseline,
                found: self.table.chips(),
            }
            .into());
        }
        self.events.push(GameEvent::HandComplete {
            hand: self.hand_number,
        });
        self.results = Some(results);
        self.state = GameState::Complete;
        self.actor = None;
        self.advance_ready = false;
        log::debug!("[game] hand #{} complete", self.hand_number);
        Ok(())
    }

    //
    // views
    //

    /// the redacted snapshot for one observer (`None` = spectator)
    pub fn view_for(&self, observer: Option<PlayerId>) -> GameStateView {
        let showdown_reveal = matches!(self.state, GameState::Showdown | GameState::Complete);
        let community = self
            .community
            .iter()
            .map(|(name, cards)| {
                (
                    name.clone(),
                    cards
                        .iter()
                        .map(|h| match h.is_up() {
                            true => CardView::open(h.card),
                            false => CardView::hidden(),
                        })
                        .collect(),
                )
            })
            .collect();
        let seats = self
            .table
            .occupied()
            .map(|seat| {
                let own = Some(seat.id) == observer;
                let reveal = showdown_reveal && seat.status.in_hand();
                let subsets = seat
                    .hole
                    .iter()
                    .map(|(name, cards)| {
                        (
                            name.clone(),
                            cards
                                .iter()
                                .map(|h| {
                                    if h.is_up() || reveal {
                                        CardView::open(h.card)
                                    } else if own {
                                        CardView::held(h.card)
                                    } else {
                                        CardView::hidden()
                                    }
                                })
                                .collect(),
                        )
                    })
                    .collect();
                SeatView {
                    position: seat.position,
                    player: seat.id,
                    name: seat.name.clone(),
                    stack: seat.stack,
                    status: seat.status,
                    round_bet: self.betting.round_bet(seat.id),
                    subsets,
                    declaration: seat.declaration,
                }
            })
            .collect();
        GameStateView {
            state: self.state,
            hand_number: self.hand_number,
            step_name: self.current_step_name().map(|s| s.to_string()),
            current_actor: self.current_actor(),
            pot_total: self.pot_total(),
            community,
            seats,
        }
    }
}

enum Flow {
    /// waiting on the current actor
    Waiting,
    /// step finished, move on
    Done,
    /// the hand ended inside the step
    Ended,
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} hand #{} {} pot {}",
            self.rules.game,
            self.hand_number,
            self.state,
            self.pot_total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn game() -> Game {
        Game::new(
            variants::texas_holdem(),
            Structure::NoLimit,
            Stakes::blinds(1, 2),
            100..=500,
            Box::new(SmallRng::seed_from_u64(0)),
        )
        .unwrap()
    }

    #[test]
    fn needs_minimum_players() {
        let mut game = game();
        game.add_player(1, "p1", 200).unwrap();
        assert!(game.start_hand().is_err());
        game.add_player(2, "p2", 200).unwrap();
        assert!(game.start_hand().is_ok());
    }

    #[test]
    fn structure_must_be_offered() {
        let mut rules = variants::texas_holdem();
        rules.betting_structures = vec![Structure::Limit];
        let result = Game::new(
            rules,
            Structure::NoLimit,
            Stakes::blinds(1, 2),
            100..=500,
            Box::new(SmallRng::seed_from_u64(0)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn no_joining_mid_hand() {
        let mut game = game();
        game.add_player(1, "p1", 200).unwrap();
        game.add_player(2, "p2", 200).unwrap();
        game.start_hand().unwrap();
        assert!(game.add_player(3, "p3", 200).is_err());
        assert!(game.remove_player(2).is_err());
    }

    #[test]
    fn buy_in_bounds() {
        let mut game = game();
        assert!(game.add_player(1, "p1", 50).is_err());
        assert!(game.add_player(1, "p1", 1000).is_err());
        assert!(game.add_player(1, "p1", 100).is_ok());
    }

    #[test]
    fn only_the_actor_may_act() {
        let mut game = game();
        game.add_player(1, "p1", 200).unwrap();
        game.add_player(2, "p2", 200).unwrap();
        game.start_hand().unwrap();
        // heads-up, the dealer opens preflop
        assert_eq!(game.current_actor(), Some(1));
        assert!(game.valid_actions(2).is_empty());
        let result = game.player_action(2, PlayerAction::Check);
        assert_eq!(result.error, Some(PlayError::NotPlayersTurn));
        assert!(!game.valid_actions(1).is_empty());
    }

    #[test]
    fn results_only_when_complete() {
        let mut game = game();
        game.add_player(1, "p1", 200).unwrap();
        game.add_player(2, "p2", 200).unwrap();
        game.start_hand().unwrap();
        assert!(game.hand_results().is_err());
        game.player_action(1, PlayerAction::Fold);
        assert!(game.hand_results().is_ok());
    }
}
