use std::fmt;

/// The four migration phases, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Transfer every non-zero legacy balance to the receiver.
    DrainLegacy,
    /// Replace the legacy PIN with a key-form authorization secret.
    RotatePin,
    /// Register a spend key and switch the wallet to safe custody.
    ActivateSafe,
    /// Spend every unspent safe output to the receiver.
    DrainSafe,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::DrainLegacy => "drain legacy balances",
            Phase::RotatePin => "rotate authorization key",
            Phase::ActivateSafe => "activate safe custody",
            Phase::DrainSafe => "drain safe outputs",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
