//! Network packet emitted as three consecutive output values.

use crate::virtual_machine::Word;
use std::fmt;

/// Number of output values that make up one packet.
pub const PACKET_WIDTH: usize = 3;

/// A `(destination, x, y)` triple.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Packet {
    pub destination: Word,
    pub x: Word,
    pub y: Word,
}

impl Packet {
    pub fn new(destination: Word, x: Word, y: Word) -> Self {
        Self { destination, x, y }
    }

    /// Builds a packet from the first three values of `values`, if there are that many.
    pub fn from_values(values: &[Word]) -> Option<Self> {
        match values {
            [destination, x, y, ..] => Some(Self::new(*destination, *x, *y)),
            _ => None,
        }
    }

    /// The values delivered to the receiving instance, in order.
    pub fn payload(&self) -> [Word; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- ({}, {})", self.destination, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_needs_three() {
        assert_eq!(Packet::from_values(&[255, 7]), None);
        assert_eq!(
            Packet::from_values(&[255, 7, 42]),
            Some(Packet::new(255, 7, 42))
        );
    }

    #[test]
    fn payload_is_x_then_y() {
        assert_eq!(Packet::new(3, -1, 9).payload(), [-1, 9]);
    }

    #[test]
    fn display() {
        assert_eq!(Packet::new(255, 7, 42).to_string(), "255 <- (7, 42)");
    }
}
