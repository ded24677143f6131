use super::seat::Seat;
use super::seat::SeatStatus;
use crate::errors::PlayError;
use crate::Chips;
use crate::PlayerId;
use crate::Position;

/// Physical table state: numbered seats and the dealer button.
///
/// Seats are clockwise by index. The button always points at an occupied
/// seat and advances clockwise between hands. Turn-order policy that
/// needs card evaluation (bring-in, high hand) is composed above; this
/// type owns the pure rotation arithmetic.
#[derive(Debug, Clone)]
pub struct Table {
    seats: Vec<Option<Seat>>,
    dealer: Position,
}

impl Table {
    pub fn new(capacity: usize) -> Self {
        Self {
            seats: (0..capacity).map(|_| None).collect(),
            dealer: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.seats.len()
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }

    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: &str,
        buy_in: Chips,
    ) -> Result<Position, PlayError> {
        if self.seat(id).is_some() {
            return Err(PlayError::InvalidAction(format!("player {} already seated", id)));
        }
        let position = self
            .seats
            .iter()
            .position(|s| s.is_none())
            .ok_or_else(|| PlayError::InvalidAction("table is full".to_string()))?;
        self.seats[position] = Some(Seat::new(position, id, name.to_string(), buy_in));
        if self.occupied().count() == 1 {
            self.dealer = position;
        }
        log::debug!("[table] P{} sits at seat {}", id, position);
        Ok(position)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<Seat, PlayError> {
        let position = self
            .seat(id)
            .map(|s| s.position)
            .ok_or_else(|| PlayError::InvalidAction(format!("player {} not seated", id)))?;
        let seat = self.seats[position].take().expect("seat occupied");
        if self.dealer == position {
            self.advance_button();
        }
        log::debug!("[table] P{} leaves seat {}", id, position);
        Ok(seat)
    }

    pub fn seat(&self, id: PlayerId) -> Option<&Seat> {
        self.occupied().find(|s| s.id == id)
    }
    pub fn seat_mut(&mut self, id: PlayerId) -> Option<&mut Seat> {
        self.seats
            .iter_mut()
            .flatten()
            .find(|s| s.id == id)
    }
    pub fn at(&self, position: Position) -> Option<&Seat> {
        self.seats.get(position).and_then(|s| s.as_ref())
    }
    pub fn at_mut(&mut self, position: Position) -> Option<&mut Seat> {
        self.seats.get_mut(position).and_then(|s| s.as_mut())
    }

    pub fn occupied(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().flatten()
    }
    pub fn occupied_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.seats.iter_mut().flatten()
    }
    /// seats still contesting the hand
    pub fn in_hand(&self) -> impl Iterator<Item = &Seat> {
        self.occupied().filter(|s| s.status.in_hand())
    }
    /// seats that may still act
    pub fn active(&self) -> impl Iterator<Item = &Seat> {
        self.occupied().filter(|s| s.status == SeatStatus::Active)
    }

    pub fn is_heads_up(&self) -> bool {
        self.occupied()
            .filter(|s| s.status != SeatStatus::SittingOut)
            .count()
            == 2
    }

    /// next occupied seat clockwise after `position`, any status
    pub fn next_occupied(&self, position: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n)
            .map(|i| (position + i) % n)
            .find(|&p| self.at(p).is_some())
    }

    /// next seat clockwise after `position` still contesting the hand
    pub fn next_in_hand(&self, position: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n)
            .map(|i| (position + i) % n)
            .find(|&p| self.at(p).map(|s| s.status.in_hand()).unwrap_or(false))
    }

    /// in-hand seats clockwise, starting at `from` inclusive
    pub fn clockwise(&self, from: Position) -> Vec<Position> {
        let n = self.seats.len();
        (0..n)
            .map(|i| (from + i) % n)
            .filter(|&p| self.at(p).map(|s| s.status.in_hand()).unwrap_or(false))
            .collect()
    }

    /// seats that may act, clockwise from `from` inclusive
    pub fn actors_from(&self, from: Position) -> Vec<Position> {
        let n = self.seats.len();
        (0..n)
            .map(|i| (from + i) % n)
            .filter(|&p| {
                self.at(p)
                    .map(|s| s.status == SeatStatus::Active)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// between hands: button to the next occupied seat
    pub fn advance_button(&mut self) {
        if let Some(next) = self.next_occupied(self.dealer) {
            self.dealer = next;
        }
    }

    /// small and big blind positions, with the heads-up inversion:
    /// two-handed, the dealer posts the small blind
    pub fn blind_positions(&self) -> (Position, Position) {
        if self.is_heads_up() {
            let sb = match self.at(self.dealer).map(|s| s.status.in_hand()) {
                Some(true) => self.dealer,
                _ => self.next_in_hand(self.dealer).expect("players in hand"),
            };
            let bb = self.next_in_hand(sb).expect("two players in hand");
            (sb, bb)
        } else {
            let sb = self.next_in_hand(self.dealer).expect("players in hand");
            let bb = self.next_in_hand(sb).expect("players in hand");
            (sb, bb)
        }
    }

    /// first actor clockwise of the big blind; heads-up, the dealer opens
    pub fn after_big_blind(&self) -> Position {
        if self.is_heads_up() {
            self.blind_positions().0
        } else {
            let (_, bb) = self.blind_positions();
            self.next_in_hand(bb).expect("players in hand")
        }
    }

    /// reset every seat for a new hand
    pub fn clear_hands(&mut self) {
        for seat in self.occupied_mut() {
            seat.reset();
        }
    }

    /// total chips in stacks, for conservation checks
    pub fn chips(&self) -> Chips {
        self.occupied().map(|s| s.stack).sum()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for seat in self.occupied() {
            write!(f, "{}{}", if seat.position == self.dealer { "*" } else { " " }, seat)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> Table {
        let mut table = Table::new(6);
        for i in 0..n {
            table.add_player(i as PlayerId + 1, &format!("p{}", i + 1), 200).unwrap();
        }
        table
    }

    #[test]
    fn no_double_seating() {
        let mut table = table(2);
        assert!(table.add_player(1, "again", 200).is_err());
    }

    #[test]
    fn button_advances_clockwise() {
        let mut table = table(3);
        assert_eq!(table.dealer(), 0);
        table.advance_button();
        assert_eq!(table.dealer(), 1);
        table.remove_player(3).unwrap();
        table.advance_button();
        assert_eq!(table.dealer(), 0);
    }

    #[test]
    fn heads_up_blinds_invert() {
        let table = table(2);
        let (sb, bb) = table.blind_positions();
        assert_eq!(sb, table.dealer());
        assert_eq!(bb, 1);
        assert_eq!(table.after_big_blind(), table.dealer());
    }

    #[test]
    fn three_handed_blinds() {
        let table = table(3);
        let (sb, bb) = table.blind_positions();
        assert_eq!((sb, bb), (1, 2));
        assert_eq!(table.after_big_blind(), 0);
    }

    #[test]
    fn rotation_skips_folded() {
        let mut table = table(4);
        table.seat_mut(2).unwrap().status = SeatStatus::Folded;
        assert_eq!(table.actors_from(0), vec![0, 2, 3]);
        assert_eq!(table.clockwise(2), vec![2, 3, 0]);
    }

    #[test]
    fn clear_hands_unfolds() {
        let mut table = table(3);
        table.seat_mut(1).unwrap().status = SeatStatus::Folded;
        table.seat_mut(2).unwrap().stack = 0;
        table.clear_hands();
        assert_eq!(table.seat(1).unwrap().status, SeatStatus::Active);
        assert_eq!(table.seat(2).unwrap().status, SeatStatus::SittingOut);
    }
}
