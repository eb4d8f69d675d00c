use core::fmt;
use serde::{Deserialize, Serialize};

/// One of the three table positions. Serialized as its index (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Seat {
    First = 0,
    Second = 1,
    Third = 2,
}

impl Seat {
    pub const COUNT: usize = 3;

    pub const LOOP: [Seat; 3] = [Seat::First, Seat::Second, Seat::Third];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            2 => Some(Seat::Third),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Next seat in the fixed clockwise order.
    pub const fn next(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::Third,
            Seat::Third => Seat::First,
        }
    }

    pub const fn previous(self) -> Seat {
        match self {
            Seat::First => Seat::Third,
            Seat::Second => Seat::First,
            Seat::Third => Seat::Second,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat{}", self.index())
    }
}

impl TryFrom<u8> for Seat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::from_index(value as usize).ok_or_else(|| format!("seat index {value} out of range"))
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> Self {
        seat as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Landlord,
    Farmer,
}

impl Role {
    pub const fn is_landlord(self) -> bool {
        matches!(self, Role::Landlord)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Landlord => "landlord",
            Role::Farmer => "farmer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Seat};

    #[test]
    fn next_wraps_around() {
        assert_eq!(Seat::Third.next(), Seat::First);
        assert_eq!(Seat::First.next().next().next(), Seat::First);
    }

    #[test]
    fn previous_wraps_around() {
        assert_eq!(Seat::First.previous(), Seat::Third);
    }

    #[test]
    fn index_roundtrip() {
        for (i, seat) in Seat::LOOP.iter().enumerate() {
            assert_eq!(Seat::from_index(i), Some(*seat));
            assert_eq!(seat.index(), i);
        }
        assert_eq!(Seat::from_index(3), None);
    }

    #[test]
    fn serializes_as_index() {
        assert_eq!(serde_json::to_string(&Seat::Third).unwrap(), "2");
        let seat: Seat = serde_json::from_str("1").unwrap();
        assert_eq!(seat, Seat::Second);
        assert!(serde_json::from_str::<Seat>("3").is_err());
        assert_eq!(serde_json::to_string(&Role::Landlord).unwrap(), "\"landlord\"");
    }
}
