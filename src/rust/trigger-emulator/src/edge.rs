// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Edge detection between consecutive phases.
//!
//! All functions require `phase_count >= 1` and `current_index < phase_count`.
use trigger_shape::{Channel, ShapeSource};

use crate::event::ShaftEvent;

/// Cyclic predecessor of `current_index`; the predecessor of 0 is the last phase.
#[inline]
pub fn previous_index(current_index: usize, phase_count: usize) -> usize {
    (current_index + phase_count - 1) % phase_count
}

/// Whether `channel` changes level when entering `current_index`.
#[inline]
pub fn need_event<S: ShapeSource + ?Sized>(
    wave: &S,
    current_index: usize,
    phase_count: usize,
    channel: Channel,
) -> bool {
    let previous = previous_index(current_index, phase_count);
    wave.channel_state(channel, previous) != wave.channel_state(channel, current_index)
}

/// The edge `channel` makes when entering `current_index`, if any.
///
/// The direction follows the level of the current phase.
pub fn detect_edge<S: ShapeSource + ?Sized>(
    wave: &S,
    current_index: usize,
    phase_count: usize,
    channel: Channel,
) -> Option<ShaftEvent> {
    if need_event(wave, current_index, phase_count, channel) {
        Some(ShaftEvent::new(
            channel,
            wave.channel_state(channel, current_index),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trigger_shape::{PinState, TriggerShape};

    fn shape_from_levels(levels: &[bool]) -> TriggerShape {
        let n = levels.len();
        let switch_times = (1..=n).map(|i| i as f32 / n as f32).collect();
        let primary = levels.iter().map(|&l| PinState::from(l)).collect();
        TriggerShape::single_channel(switch_times, primary).unwrap()
    }

    fn edges(shape: &TriggerShape) -> Vec<(usize, ShaftEvent)> {
        let n = shape.phase_count();
        (0..n)
            .filter_map(|i| detect_edge(shape, i, n, Channel::Primary).map(|e| (i, e)))
            .collect()
    }

    #[test]
    fn test_previous_index_wraps() {
        assert_eq!(previous_index(0, 4), 3);
        assert_eq!(previous_index(1, 4), 0);
        assert_eq!(previous_index(3, 4), 2);
        assert_eq!(previous_index(0, 1), 0);
    }

    #[test]
    fn test_low_low_high_high() {
        let shape = shape_from_levels(&[false, false, true, true]);
        assert_eq!(
            edges(&shape),
            vec![(0, ShaftEvent::PrimaryFalling), (2, ShaftEvent::PrimaryRising)]
        );
    }

    #[test]
    fn test_single_phase_has_no_edges() {
        let shape = shape_from_levels(&[true]);
        assert!(!need_event(&shape, 0, 1, Channel::Primary));
    }

    #[test]
    fn test_idle_channels_have_no_edges() {
        let shape = TriggerShape::toothed_wheel(36, 1).unwrap();
        let n = shape.phase_count();
        for i in 0..n {
            assert!(!need_event(&shape, i, n, Channel::Secondary));
            assert!(!need_event(&shape, i, n, Channel::Tertiary));
        }
    }

    #[test]
    fn test_toothed_wheel_edges_alternate() {
        let shape = TriggerShape::toothed_wheel(60, 2).unwrap();
        let found = edges(&shape);
        assert_eq!(found.len(), shape.phase_count());
        for (index, event) in found {
            assert_eq!(event.is_rising(), index % 2 == 0);
        }
    }

    proptest! {
        #[test]
        fn prop_previous_index(phase_count in 1usize..300, offset in 0usize..300) {
            let index = offset % phase_count;
            let previous = previous_index(index, phase_count);
            prop_assert!(previous < phase_count);
            prop_assert_eq!((previous + 1) % phase_count, index);
        }

        #[test]
        fn prop_negation_inverts_direction(levels in prop::collection::vec(any::<bool>(), 1..64)) {
            let shape = shape_from_levels(&levels);
            let inverted: Vec<_> = edges(&shape.inverted())
                .into_iter()
                .map(|(i, e)| (i, e.inverted()))
                .collect();
            prop_assert_eq!(edges(&shape), inverted);
        }

        #[test]
        fn prop_edges_alternate_over_a_cycle(levels in prop::collection::vec(any::<bool>(), 1..64)) {
            let found = edges(&shape_from_levels(&levels));
            prop_assert_eq!(found.len() % 2, 0);
            for pair in found.windows(2) {
                prop_assert_ne!(pair[0].1.is_rising(), pair[1].1.is_rising());
            }
        }
    }
}
