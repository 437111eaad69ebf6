//! Settlement flow phases, used for structured logging and diagnostics.
//!
//! A settlement runs `VALIDATING → RESERVING → TRANSFERRING → COMMITTING
//! → DONE`. The two failure exits are `REJECTED` (a pre-condition failed,
//! nothing was touched) and `ROLLED_BACK` (partial effects were undone by
//! compensation). Once a settlement reaches `COMMITTING` it can no longer
//! be aborted — only compensated by a new reversal settlement.

use serde::{Deserialize, Serialize};

/// The phase a settlement attempt is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementPhase {
    Validating,
    Reserving,
    Transferring,
    Committing,
    Done,
    /// Pre-condition failed; no locks taken, no writes made.
    Rejected,
    /// Partial side effects were undone by compensating actions.
    RolledBack,
}

impl std::fmt::Display for SettlementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "VALIDATING"),
            Self::Reserving => write!(f, "RESERVING"),
            Self::Transferring => write!(f, "TRANSFERRING"),
            Self::Committing => write!(f, "COMMITTING"),
            Self::Done => write!(f, "DONE"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::RolledBack => write!(f, "ROLLED_BACK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_display() {
        assert_eq!(format!("{}", SettlementPhase::Validating), "VALIDATING");
        assert_eq!(format!("{}", SettlementPhase::RolledBack), "ROLLED_BACK");
    }

    #[test]
    fn serde_roundtrip() {
        let phase = SettlementPhase::Committing;
        let json = serde_json::to_string(&phase).unwrap();
        let back: SettlementPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(phase, back);
    }
}
