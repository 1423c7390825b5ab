// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use trigger_log::{diagnostic, info};
use trigger_shape::{SharedShape, ShapeSource};

use crate::scheduler::WaveSchedule;

/// Keeps the scheduler's phase table in step with the canonical shape.
pub struct ShapeSynchronizer {
    source: Arc<SharedShape>,
    at_version: u64,
}

impl ShapeSynchronizer {
    /// Synchronizer that loads the shape on its first check.
    pub fn new(source: Arc<SharedShape>) -> Self {
        ShapeSynchronizer {
            source,
            at_version: 0,
        }
    }

    /// Synchronizer for a schedule that already holds `version` of the shape.
    pub fn loaded(source: Arc<SharedShape>, version: u64) -> Self {
        ShapeSynchronizer { source, at_version: version }
    }

    pub fn at_version(&self) -> u64 {
        self.at_version
    }

    /// Copy the canonical shape into `schedule` if it has a newer version.
    ///
    /// Returns whether the table was reloaded. A reload forces the scheduler to rebuild
    /// its timeline.
    pub fn update_if_needed(&mut self, schedule: &mut WaveSchedule) -> bool {
        if self.at_version >= self.source.version() {
            return false;
        }
        let (version, phase_count) = self.source.with_shape(|version, shape| {
            schedule.wave.copy_from(shape);
            (version, shape.phase_count())
        });
        self.at_version = version;
        schedule.request_reinit();
        info!(
            "Stimulator: updating trigger shape: version {} with {} phases",
            version,
            phase_count
        );
        diagnostic!("switch times: {:?}", schedule.wave.switch_times());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TrackedPeriod;
    use trigger_shape::{Channel, MultiWave, PinState, TriggerShape};

    #[test]
    fn test_reload_once_per_version() {
        let shared = Arc::new(SharedShape::new(TriggerShape::toothed_wheel(4, 1).unwrap()));
        let mut schedule = WaveSchedule::new(MultiWave::new());
        let mut synchronizer = ShapeSynchronizer::new(Arc::clone(&shared));

        assert!(synchronizer.update_if_needed(&mut schedule));
        assert_eq!(schedule.wave.phase_count(), 6);
        assert_eq!(synchronizer.at_version(), 1);
        assert!(!synchronizer.update_if_needed(&mut schedule));

        let shape = TriggerShape::single_channel(
            vec![0.5, 1.0],
            vec![PinState::Low, PinState::High],
        )
        .unwrap();
        shared.replace(shape);
        assert!(synchronizer.update_if_needed(&mut schedule));
        assert_eq!(schedule.wave.phase_count(), 2);
        assert_eq!(
            schedule.wave.levels(Channel::Primary),
            &[PinState::Low, PinState::High]
        );
        assert_eq!(schedule.tracked_period(), TrackedPeriod::NeedsReinit);
        assert_eq!(synchronizer.at_version(), 2);
        assert!(!synchronizer.update_if_needed(&mut schedule));
    }

    #[test]
    fn test_loaded_skips_current_version() {
        let shared = Arc::new(SharedShape::new(TriggerShape::toothed_wheel(4, 1).unwrap()));
        let mut schedule = WaveSchedule::new(MultiWave::new());
        let mut synchronizer = ShapeSynchronizer::loaded(shared, 1);
        assert!(!synchronizer.update_if_needed(&mut schedule));
        assert!(schedule.wave.is_empty());
    }
}
