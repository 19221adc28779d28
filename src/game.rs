use crate::commitment::Commitment;
use crate::ledger::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player's move. Closed set; invalid moves are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// Stable byte tag used inside the commitment preimage.
    pub fn tag(self) -> u8 {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
        )
    }
}

/// Which side of a game an address occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Challenger,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Creator => Role::Challenger,
            Role::Challenger => Role::Creator,
        }
    }
}

/// Game lifecycle. Transitions are one-directional; the three terminal
/// states are immutable once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Open,
    Cancelled,
    AwaitingReveals,
    AwaitingCreatorReveal,
    AwaitingChallengerReveal,
    Finished,
    Expired,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Cancelled | Status::Finished | Status::Expired)
    }

    /// True in any state where a reveal deadline is ticking.
    pub fn is_reveal_phase(self) -> bool {
        matches!(
            self,
            Status::AwaitingReveals
                | Status::AwaitingCreatorReveal
                | Status::AwaitingChallengerReveal
        )
    }
}

/// Resolution outcome. `Tie` covers both equal moves and the
/// nobody-revealed expiry refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(Address),
    Tie,
}

/// Pure win rule: the winning role for a pair of revealed moves, or
/// `None` on a tie.
pub fn winning_role(creator: Move, challenger: Move) -> Option<Role> {
    if creator.beats(challenger) {
        Some(Role::Creator)
    } else if challenger.beats(creator) {
        Some(Role::Challenger)
    } else {
        None
    }
}

/// One wager record. Field order is the persisted schema; external
/// readers depend on it, so additions go at the end only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub creator: Address,
    pub challenger: Option<Address>,
    pub wager: u64,
    pub creator_commitment: Commitment,
    pub challenger_commitment: Option<Commitment>,
    pub creator_move: Option<Move>,
    pub challenger_move: Option<Move>,
    pub status: Status,
    pub winner: Option<Winner>,
    pub created_at: DateTime<Utc>,
    pub reveal_deadline: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(
        id: u64,
        creator: Address,
        commitment: Commitment,
        wager: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creator,
            challenger: None,
            wager,
            creator_commitment: commitment,
            challenger_commitment: None,
            creator_move: None,
            challenger_move: None,
            status: Status::Open,
            winner: None,
            created_at,
            reveal_deadline: None,
        }
    }

    /// The side `address` plays on, if any.
    pub fn role_of(&self, address: &Address) -> Option<Role> {
        if *address == self.creator {
            Some(Role::Creator)
        } else if self.challenger.as_ref() == Some(address) {
            Some(Role::Challenger)
        } else {
            None
        }
    }

    pub fn address_of(&self, role: Role) -> Option<&Address> {
        match role {
            Role::Creator => Some(&self.creator),
            Role::Challenger => self.challenger.as_ref(),
        }
    }

    pub fn commitment_of(&self, role: Role) -> Option<Commitment> {
        match role {
            Role::Creator => Some(self.creator_commitment),
            Role::Challenger => self.challenger_commitment,
        }
    }

    pub fn move_of(&self, role: Role) -> Option<Move> {
        match role {
            Role::Creator => self.creator_move,
            Role::Challenger => self.challenger_move,
        }
    }

    pub fn record_move(&mut self, role: Role, mv: Move) {
        match role {
            Role::Creator => self.creator_move = Some(mv),
            Role::Challenger => self.challenger_move = Some(mv),
        }
    }

    /// Whether the reveal deadline has lapsed with the game unresolved.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_reveal_phase()
            && self.reveal_deadline.map_or(false, |deadline| now > deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn win_rule_is_exhaustive() {
        use Move::*;
        let cases = [
            (Rock, Rock, None),
            (Rock, Paper, Some(Role::Challenger)),
            (Rock, Scissors, Some(Role::Creator)),
            (Paper, Rock, Some(Role::Creator)),
            (Paper, Paper, None),
            (Paper, Scissors, Some(Role::Challenger)),
            (Scissors, Rock, Some(Role::Challenger)),
            (Scissors, Paper, Some(Role::Creator)),
            (Scissors, Scissors, None),
        ];
        for (creator, challenger, expected) in cases {
            assert_eq!(
                winning_role(creator, challenger),
                expected,
                "creator {:?} vs challenger {:?}",
                creator,
                challenger
            );
        }
    }

    #[test]
    fn reversed_pairs_flip_the_winner() {
        use Move::*;
        for (a, b) in [(Rock, Scissors), (Scissors, Paper), (Paper, Rock)] {
            assert_eq!(winning_role(a, b), Some(Role::Creator));
            assert_eq!(winning_role(b, a), Some(Role::Challenger));
        }
    }

    #[test]
    fn expiry_requires_a_lapsed_deadline_in_a_reveal_phase() {
        let now = Utc::now();
        let commitment = crate::commitment::Commitment::from_bytes([0u8; 32]);
        let mut game = Game::new(0, Address::from("alice"), commitment, 10, now);

        // Open game has no deadline.
        assert!(!game.is_expired_at(now + Duration::days(2)));

        game.status = Status::AwaitingReveals;
        game.reveal_deadline = Some(now + Duration::hours(24));
        assert!(!game.is_expired_at(now + Duration::hours(23)));
        assert!(game.is_expired_at(now + Duration::hours(25)));

        game.status = Status::Finished;
        assert!(!game.is_expired_at(now + Duration::hours(25)));
    }

    #[test]
    fn role_other_flips_sides() {
        assert_eq!(Role::Creator.other(), Role::Challenger);
        assert_eq!(Role::Challenger.other(), Role::Creator);
    }

    #[test]
    fn role_lookup_distinguishes_the_parties() {
        let commitment = crate::commitment::Commitment::from_bytes([0u8; 32]);
        let mut game = Game::new(3, Address::from("alice"), commitment, 10, Utc::now());
        assert_eq!(game.role_of(&Address::from("alice")), Some(Role::Creator));
        assert_eq!(game.role_of(&Address::from("bob")), None);

        game.challenger = Some(Address::from("bob"));
        assert_eq!(game.role_of(&Address::from("bob")), Some(Role::Challenger));
        assert_eq!(game.role_of(&Address::from("carol")), None);
    }
}
