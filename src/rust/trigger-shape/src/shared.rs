// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::TriggerShape;

/// Canonical, versioned trigger shape shared between the configuration side and the
/// emulator.
///
/// The version starts at 1 and is bumped on every [`SharedShape::replace`]. Reading the
/// version never takes the lock.
#[derive(Debug)]
pub struct SharedShape {
    version: AtomicU64,
    shape: RwLock<TriggerShape>,
}

impl SharedShape {
    pub fn new(shape: TriggerShape) -> Self {
        SharedShape {
            version: AtomicU64::new(1),
            shape: RwLock::new(shape),
        }
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Install a new shape and return its version.
    pub fn replace(&self, shape: TriggerShape) -> u64 {
        let mut guard = self.shape.write().unwrap_or_else(PoisonError::into_inner);
        *guard = shape;
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Run `f` with the current shape and its version.
    ///
    /// The version passed to `f` always belongs to the shape passed along with it.
    pub fn with_shape<R>(&self, f: impl FnOnce(u64, &TriggerShape) -> R) -> R {
        let guard = self.shape.read().unwrap_or_else(PoisonError::into_inner);
        f(self.version(), &guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeSource;

    #[test]
    fn test_replace_bumps_version() {
        let shared = SharedShape::new(TriggerShape::toothed_wheel(4, 1).unwrap());
        assert_eq!(shared.version(), 1);
        let version = shared.replace(TriggerShape::toothed_wheel(36, 1).unwrap());
        assert_eq!(version, 2);
        assert_eq!(shared.version(), 2);
        shared.with_shape(|version, shape| {
            assert_eq!(version, 2);
            assert_eq!(shape.phase_count(), 70);
        });
    }

    #[test]
    fn test_replace_from_other_thread() {
        let shared = std::sync::Arc::new(SharedShape::new(
            TriggerShape::toothed_wheel(4, 1).unwrap(),
        ));
        let writer = {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || {
                for _ in 0..10 {
                    shared.replace(TriggerShape::toothed_wheel(12, 1).unwrap());
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(shared.version(), 11);
    }
}
