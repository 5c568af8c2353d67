//! Transmitter/receiver side selector.

use serde::Deserialize;
use std::fmt;

/// Which side of the link this node is.
///
/// The two roles run the same four components; `Role` drives the
/// asymmetries between them: where the cipher runs (ingress on the
/// transmitter, egress on the receiver) and whether a resync evolves the
/// seed (transmitter only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Encrypting side: camera in, scrambled signal out.
    Transmitter,
    /// Decrypting side: scrambled signal in, picture out.
    Receiver,
}

impl Role {
    /// True on the encrypting side.
    pub fn is_transmitter(self) -> bool {
        matches!(self, Role::Transmitter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Transmitter => write!(f, "transmitter"),
            Role::Receiver => write!(f, "receiver"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display() {
        assert_eq!(Role::Transmitter.to_string(), "transmitter");
        assert_eq!(Role::Receiver.to_string(), "receiver");
    }

    #[test]
    fn transmitter_check() {
        assert!(Role::Transmitter.is_transmitter());
        assert!(!Role::Receiver.is_transmitter());
    }
}
