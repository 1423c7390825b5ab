// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use trigger_shape::{Channel, PinState};

/// Directional edge on one trigger channel, as consumed by the trigger decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaftEvent {
    PrimaryRising,
    PrimaryFalling,
    SecondaryRising,
    SecondaryFalling,
    TertiaryRising,
    TertiaryFalling,
}

impl ShaftEvent {
    /// Edge on `channel` that ends at `level`.
    pub fn new(channel: Channel, level: PinState) -> Self {
        match (channel, level) {
            (Channel::Primary, PinState::High) => ShaftEvent::PrimaryRising,
            (Channel::Primary, PinState::Low) => ShaftEvent::PrimaryFalling,
            (Channel::Secondary, PinState::High) => ShaftEvent::SecondaryRising,
            (Channel::Secondary, PinState::Low) => ShaftEvent::SecondaryFalling,
            (Channel::Tertiary, PinState::High) => ShaftEvent::TertiaryRising,
            (Channel::Tertiary, PinState::Low) => ShaftEvent::TertiaryFalling,
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            ShaftEvent::PrimaryRising | ShaftEvent::PrimaryFalling => Channel::Primary,
            ShaftEvent::SecondaryRising | ShaftEvent::SecondaryFalling => Channel::Secondary,
            ShaftEvent::TertiaryRising | ShaftEvent::TertiaryFalling => Channel::Tertiary,
        }
    }

    pub fn is_rising(self) -> bool {
        matches!(
            self,
            ShaftEvent::PrimaryRising | ShaftEvent::SecondaryRising | ShaftEvent::TertiaryRising
        )
    }

    /// Same channel, opposite direction.
    pub fn inverted(self) -> Self {
        let level = if self.is_rising() {
            PinState::Low
        } else {
            PinState::High
        };
        ShaftEvent::new(self.channel(), level)
    }
}

impl fmt::Display for ShaftEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.is_rising() { "rising" } else { "falling" };
        write!(f, "{} {direction}", self.channel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for channel in Channel::ALL {
            for level in [PinState::Low, PinState::High] {
                let event = ShaftEvent::new(channel, level);
                assert_eq!(event.channel(), channel);
                assert_eq!(event.is_rising(), level.is_high());
                assert!(seen.insert(event));
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_display() {
        assert_eq!(ShaftEvent::SecondaryFalling.to_string(), "secondary falling");
        assert_eq!(
            ShaftEvent::TertiaryRising.inverted(),
            ShaftEvent::TertiaryFalling
        );
    }
}
