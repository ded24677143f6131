use crate::Chips;
use crate::PlayerId;
use std::collections::BTreeMap;

/// One pot layer: its chips, who can win it, who fed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<PlayerId>,
    pub contributions: BTreeMap<PlayerId, Chips>,
}

/// Main pot plus side pots in creation order.
///
/// Rebuilt from the hand's contribution ledger at every round boundary;
/// the ledger is append-only so earlier rounds' shape is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundPots {
    pub main: Pot,
    pub sides: Vec<Pot>,
}

impl RoundPots {
    pub fn total(&self) -> Chips {
        self.main.amount + self.sides.iter().map(|p| p.amount).sum::<Chips>()
    }
    pub fn get(&self, index: Option<usize>) -> Option<&Pot> {
        match index {
            None => Some(&self.main),
            Some(i) => self.sides.get(i),
        }
    }
    /// main pot first, then side pots by ascending index
    pub fn all(&self) -> impl Iterator<Item = (Option<usize>, &Pot)> {
        std::iter::once((None, &self.main))
            .chain(self.sides.iter().enumerate().map(|(i, p)| (Some(i), p)))
    }
}

/// One player's line in the contribution ledger.
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    pub player: PlayerId,
    pub total: Chips,
    pub folded: bool,
    pub all_in: bool,
}

/// Side-pot construction as a fold over ascending commitment levels.
///
/// Capping levels come only from all-in commitments; each distinct level
/// closes one layer, eligibility being everyone unfolded who reached it.
/// Folded players' chips stay in whatever layers they reached.
pub fn build(ledger: &[Contribution]) -> RoundPots {
    let top = ledger.iter().map(|c| c.total).max().unwrap_or(0);
    if top == 0 {
        return RoundPots::default();
    }
    let mut levels = ledger
        .iter()
        .filter(|c| c.all_in && !c.folded)
        .map(|c| c.total)
        .filter(|&t| t > 0 && t < top)
        .collect::<Vec<Chips>>();
    levels.sort_unstable();
    levels.dedup();
    levels.push(top);
    let mut pots: Vec<Pot> = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for level in levels {
        let mut pot = Pot::default();
        for line in ledger.iter() {
            let slice = line.total.min(level) - line.total.min(prev);
            if slice > 0 {
                pot.amount += slice;
                *pot.contributions.entry(line.player).or_insert(0) += slice;
            }
            if !line.folded && line.total >= level {
                pot.eligible.push(line.player);
            }
        }
        // a layer nobody living can claim folds back into the one below
        if pot.eligible.is_empty() {
            if let Some(last) = pots.last_mut() {
                last.amount += pot.amount;
                for (player, slice) in pot.contributions {
                    *last.contributions.entry(player).or_insert(0) += slice;
                }
                prev = level;
                continue;
            }
        }
        pots.push(pot);
        prev = level;
    }
    let main = pots.remove(0);
    RoundPots { main, sides: pots }
}

impl std::fmt::Display for RoundPots {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "main {}", self.main.amount)?;
        for (i, side) in self.sides.iter().enumerate() {
            write!(f, " side{} {}", i, side.amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(player: PlayerId, total: Chips, folded: bool, all_in: bool) -> Contribution {
        Contribution {
            player,
            total,
            folded,
            all_in,
        }
    }

    #[test]
    fn single_pot_without_all_ins() {
        let pots = build(&[line(1, 10, false, false), line(2, 10, false, false)]);
        assert_eq!(pots.main.amount, 20);
        assert!(pots.sides.is_empty());
        assert_eq!(pots.main.eligible, vec![1, 2]);
    }

    #[test]
    fn folded_chips_stay_in() {
        let pots = build(&[
            line(1, 10, false, false),
            line(2, 4, true, false),
            line(3, 10, false, false),
        ]);
        assert_eq!(pots.main.amount, 24);
        assert!(pots.sides.is_empty());
        assert_eq!(pots.main.eligible, vec![1, 3]);
    }

    #[test]
    fn three_way_all_in_waterfall() {
        // stacks 100 / 60 / 40, everyone all in
        let pots = build(&[
            line(1, 100, false, true),
            line(2, 60, false, true),
            line(3, 40, false, true),
        ]);
        assert_eq!(pots.main.amount, 120);
        assert_eq!(pots.main.eligible, vec![1, 2, 3]);
        assert_eq!(pots.sides.len(), 2);
        assert_eq!(pots.sides[0].amount, 40);
        assert_eq!(pots.sides[0].eligible, vec![1, 2]);
        assert_eq!(pots.sides[1].amount, 40);
        assert_eq!(pots.sides[1].eligible, vec![1]);
        assert_eq!(pots.total(), 200);
    }

    #[test]
    fn short_all_in_caps_main() {
        let pots = build(&[
            line(1, 50, false, true),
            line(2, 100, false, false),
            line(3, 100, false, false),
        ]);
        assert_eq!(pots.main.amount, 150);
        assert_eq!(pots.main.eligible, vec![1, 2, 3]);
        assert_eq!(pots.sides.len(), 1);
        assert_eq!(pots.sides[0].amount, 100);
        assert_eq!(pots.sides[0].eligible, vec![2, 3]);
    }

    #[test]
    fn folded_top_layer_merges_down() {
        // the deepest money belongs to a player who then folded
        let pots = build(&[
            line(1, 100, true, false),
            line(2, 60, false, true),
            line(3, 60, false, false),
        ]);
        assert_eq!(pots.total(), 220);
        assert_eq!(pots.main.amount, 220);
        assert!(pots.sides.is_empty());
    }
}
