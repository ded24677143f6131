use super::kickers::Kickers;
use super::ranking::Ranking;
use crate::cards::Card;
use crate::cards::Rank;

/// standard wheel: A-2-3-4-5
pub const WHEEL: u16 = 0b_1000000001111;
/// short-deck wheel: A-6-7-8-9
pub const SHORT_WHEEL: u16 = 0b_1000011110000;

/// A scan over exactly five cards.
///
/// Using a compact rank-mask representation we search for the highest
/// shape with bitwise operations. Jokers must be substituted away before
/// scanning; wild resolution is the caller's business.
pub struct Evaluator<'a> {
    cards: &'a [Card],
    wheel: u16,
}

impl<'a> Evaluator<'a> {
    pub fn new(cards: &'a [Card], wheel: u16) -> Self {
        assert!(cards.len() == 5, "evaluator scans exactly five cards");
        assert!(cards.iter().all(|c| !c.is_joker()), "unsubstituted joker");
        Self { cards, wheel }
    }

    pub fn find_ranking(&self) -> Ranking {
        None.or_else(|| self.find_straight_flush())
            .or_else(|| self.find_4_oak())
            .or_else(|| self.find_3_oak_2_oak())
            .or_else(|| self.find_flush())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_3_oak())
            .or_else(|| self.find_2_oak_2_oak())
            .or_else(|| self.find_2_oak())
            .or_else(|| self.find_1_oak())
            .expect("five cards always rank")
    }

    pub fn find_kickers(&self, ranking: Ranking) -> Kickers {
        let n = ranking.n_kickers();
        if n == 0 {
            return Kickers::default();
        }
        let primaries = ranking.primaries();
        let mut ranks = self
            .cards
            .iter()
            .map(|c| c.rank())
            .filter(|r| !primaries.contains(r))
            .collect::<Vec<Rank>>();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks.dedup();
        ranks.truncate(n);
        Kickers::from(ranks)
    }

    ///

    fn find_1_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(1).map(Ranking::HighCard)
    }
    fn find_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2).map(Ranking::OnePair)
    }
    fn find_3_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3).map(Ranking::ThreeOAK)
    }
    fn find_4_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(4).map(Ranking::FourOAK)
    }
    fn find_2_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2).and_then(|hi| {
            self.find_rank_of_n_oak_under(2, hi)
                .map(|lo| Ranking::TwoPair(hi, lo))
        })
    }
    fn find_3_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3).and_then(|trips| {
            self.find_rank_of_n_oak_under(2, trips)
                .map(|pairs| Ranking::FullHouse(trips, pairs))
        })
    }
    fn find_straight(&self) -> Option<Ranking> {
        self.find_rank_of_straight().map(Ranking::Straight)
    }
    fn find_flush(&self) -> Option<Ranking> {
        self.suited()
            .map(|_| Ranking::Flush(Rank::from(15 - self.rank_mask().leading_zeros() as u8)))
    }
    fn find_straight_flush(&self) -> Option<Ranking> {
        self.suited()
            .and_then(|_| self.find_rank_of_straight())
            .map(Ranking::StraightFlush)
    }

    ///

    fn find_rank_of_straight(&self) -> Option<Rank> {
        let hand = self.rank_mask();
        let mut bits = hand;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        if bits > 0 {
            Some(Rank::from(15 - bits.leading_zeros() as u8))
        } else if self.wheel == (self.wheel & hand) && hand.count_ones() == 5 {
            let below = self.wheel & !(1 << Rank::Ace as u16);
            Some(Rank::from(15 - below.leading_zeros() as u8))
        } else {
            None
        }
    }
    fn find_rank_of_n_oak(&self, n: usize) -> Option<Rank> {
        self.counts()
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &count)| count as usize >= n)
            .map(|(i, _)| Rank::from(i as u8))
    }
    fn find_rank_of_n_oak_under(&self, n: usize, under: Rank) -> Option<Rank> {
        self.counts()
            .iter()
            .enumerate()
            .take(under as usize)
            .rev()
            .find(|&(_, &count)| count as usize >= n)
            .map(|(i, _)| Rank::from(i as u8))
    }

    ///

    fn rank_mask(&self) -> u16 {
        self.cards
            .iter()
            .map(|c| 1u16 << c.rank() as u16)
            .fold(0, |acc, r| acc | r)
    }
    fn counts(&self) -> [u8; 13] {
        self.cards
            .iter()
            .map(|c| c.rank() as usize)
            .fold([0; 13], |mut counts, r| {
                counts[r] += 1;
                counts
            })
    }
    fn suited(&self) -> Option<()> {
        let suit = self.cards.first().map(|c| c.suit())?;
        if self.cards.iter().all(|c| c.suit() == suit) {
            Some(())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn ranking(s: &str) -> Ranking {
        let cards = parse_cards(s).unwrap();
        Evaluator::new(&cards, WHEEL).find_ranking()
    }

    #[test]
    fn high_card() {
        assert_eq!(ranking("As Kh Qd Jc 9s"), Ranking::HighCard(Rank::Ace));
    }
    #[test]
    fn one_pair() {
        assert_eq!(ranking("As Ah Kd Qc Js"), Ranking::OnePair(Rank::Ace));
    }
    #[test]
    fn two_pair() {
        assert_eq!(
            ranking("As Ah Kd Kc Qs"),
            Ranking::TwoPair(Rank::Ace, Rank::King)
        );
    }
    #[test]
    fn trips() {
        assert_eq!(ranking("As Ah Ad Kc Qs"), Ranking::ThreeOAK(Rank::Ace));
    }
    #[test]
    fn straight() {
        assert_eq!(ranking("Ts Jh Qd Kc As"), Ranking::Straight(Rank::Ace));
    }
    #[test]
    fn wheel_straight() {
        assert_eq!(ranking("As 2h 3d 4c 5s"), Ranking::Straight(Rank::Five));
    }
    #[test]
    fn short_wheel_straight() {
        let cards = parse_cards("As 6h 7d 8c 9s").unwrap();
        assert_eq!(
            Evaluator::new(&cards, SHORT_WHEEL).find_ranking(),
            Ranking::Straight(Rank::Nine)
        );
        assert_eq!(
            Evaluator::new(&cards, WHEEL).find_ranking(),
            Ranking::HighCard(Rank::Ace)
        );
    }
    #[test]
    fn flush() {
        assert_eq!(ranking("As Ks Qs Js 9s"), Ranking::Flush(Rank::Ace));
    }
    #[test]
    fn full_house() {
        assert_eq!(
            ranking("As Ah Ad Kc Ks"),
            Ranking::FullHouse(Rank::Ace, Rank::King)
        );
    }
    #[test]
    fn quads() {
        assert_eq!(ranking("As Ah Ad Ac Ks"), Ranking::FourOAK(Rank::Ace));
    }
    #[test]
    fn straight_flush() {
        assert_eq!(ranking("Ts Js Qs Ks As"), Ranking::StraightFlush(Rank::Ace));
    }
    #[test]
    fn wheel_straight_flush() {
        assert_eq!(ranking("As 2s 3s 4s 5s"), Ranking::StraightFlush(Rank::Five));
    }

    #[test]
    fn kickers_for_pair() {
        let cards = parse_cards("As Ah Kd Qc Js").unwrap();
        let scan = Evaluator::new(&cards, WHEEL);
        let ranking = scan.find_ranking();
        assert_eq!(
            scan.find_kickers(ranking).ranks(),
            &[Rank::King, Rank::Queen, Rank::Jack]
        );
    }
}
