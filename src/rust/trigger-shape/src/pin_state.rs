// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};

pub const CHANNEL_COUNT: usize = 3;

/// Logical level of one channel during one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PinState {
    #[default]
    Low,
    High,
}

impl PinState {
    pub fn is_high(self) -> bool {
        self == PinState::High
    }
}

impl Not for PinState {
    type Output = PinState;

    fn not(self) -> PinState {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        if high { PinState::High } else { PinState::Low }
    }
}

impl From<PinState> for u8 {
    fn from(state: PinState) -> Self {
        match state {
            PinState::Low => 0,
            PinState::High => 1,
        }
    }
}

impl TryFrom<u8> for PinState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PinState::Low),
            1 => Ok(PinState::High),
            other => Err(format!("pin state must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinState::Low => write!(f, "L"),
            PinState::High => write!(f, "H"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Primary,
    Secondary,
    Tertiary,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] =
        [Channel::Primary, Channel::Secondary, Channel::Tertiary];

    pub const fn index(self) -> usize {
        match self {
            Channel::Primary => 0,
            Channel::Secondary => 1,
            Channel::Tertiary => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Primary => write!(f, "primary"),
            Channel::Secondary => write!(f, "secondary"),
            Channel::Tertiary => write!(f, "tertiary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_state_conversions() {
        assert_eq!(PinState::try_from(0).unwrap(), PinState::Low);
        assert_eq!(PinState::try_from(1).unwrap(), PinState::High);
        assert!(PinState::try_from(2).is_err());
        assert_eq!(u8::from(PinState::High), 1);
        assert_eq!(!PinState::Low, PinState::High);
        assert_eq!(PinState::from(true), PinState::High);
    }

    #[test]
    fn test_channel_index() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }
}
