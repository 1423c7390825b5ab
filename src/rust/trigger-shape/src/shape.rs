// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::pin_state::{CHANNEL_COUNT, Channel, PinState};
use crate::{Error, MAX_PHASE_COUNT, Result, ShapeSource};

/// Canonical definition of a trigger wheel.
///
/// Invariants, checked on construction:
/// * `1 <= phase_count <= MAX_PHASE_COUNT`
/// * every channel has exactly `phase_count` levels
/// * switch times are strictly increasing within `(0, 1]` and the last one is `1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeDefinition", into = "ShapeDefinition")]
pub struct TriggerShape {
    switch_times: Vec<f32>,
    channels: [Vec<PinState>; CHANNEL_COUNT],
}

/// Serialized form of a [`TriggerShape`].
///
/// Channels left empty are held low for the whole cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDefinition {
    pub switch_times: Vec<f32>,
    pub primary: Vec<PinState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<PinState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tertiary: Vec<PinState>,
}

impl TriggerShape {
    pub fn new(
        switch_times: Vec<f32>,
        channels: [Vec<PinState>; CHANNEL_COUNT],
    ) -> Result<Self> {
        validate(&switch_times, &channels)?;
        Ok(TriggerShape {
            switch_times,
            channels,
        })
    }

    /// Shape driving only the primary channel.
    pub fn single_channel(switch_times: Vec<f32>, primary: Vec<PinState>) -> Result<Self> {
        let idle = vec![PinState::Low; primary.len()];
        Self::new(switch_times, [primary, idle.clone(), idle])
    }

    /// Missing-tooth crank wheel on the primary channel, e.g. 60-2 or 36-1.
    ///
    /// Every present tooth is high for the first half of its slot. The low part of the
    /// last tooth extends over the gap left by the missing teeth.
    pub fn toothed_wheel(total_teeth: usize, missing_teeth: usize) -> Result<Self> {
        if total_teeth == 0 || missing_teeth >= total_teeth {
            return Err(Error::InvalidShape(format!(
                "wheel needs at least one present tooth, got {total_teeth}-{missing_teeth}"
            )));
        }
        let present = total_teeth - missing_teeth;
        let phase_count = present.saturating_mul(2);
        if phase_count > MAX_PHASE_COUNT {
            return Err(Error::TooManyPhases {
                count: phase_count,
                max: MAX_PHASE_COUNT,
            });
        }
        let tooth_width = 1.0 / total_teeth as f64;
        let mut switch_times = Vec::with_capacity(phase_count);
        let mut primary = Vec::with_capacity(phase_count);
        for tooth in 0..present {
            switch_times.push(((tooth as f64 + 0.5) * tooth_width) as f32);
            primary.push(PinState::High);
            let tooth_end = if tooth + 1 == present {
                1.0
            } else {
                (tooth + 1) as f64 * tooth_width
            };
            switch_times.push(tooth_end as f32);
            primary.push(PinState::Low);
        }
        Self::single_channel(switch_times, primary)
    }

    pub fn size(&self) -> usize {
        self.switch_times.len()
    }

    /// Copy of this shape with every level inverted.
    pub fn inverted(&self) -> Self {
        TriggerShape {
            switch_times: self.switch_times.clone(),
            channels: self
                .channels
                .clone()
                .map(|levels| levels.into_iter().map(|level| !level).collect()),
        }
    }
}

fn validate(switch_times: &[f32], channels: &[Vec<PinState>; CHANNEL_COUNT]) -> Result<()> {
    let phase_count = switch_times.len();
    if phase_count == 0 {
        return Err(Error::InvalidShape("shape has no phases".to_string()));
    }
    if phase_count > MAX_PHASE_COUNT {
        return Err(Error::TooManyPhases {
            count: phase_count,
            max: MAX_PHASE_COUNT,
        });
    }
    for channel in Channel::ALL {
        let levels = &channels[channel.index()];
        if levels.len() != phase_count {
            return Err(Error::InvalidShape(format!(
                "{channel} channel has {} levels, expected {phase_count}",
                levels.len()
            )));
        }
    }
    let mut previous = 0.0;
    for (phase, &time) in switch_times.iter().enumerate() {
        if !(time > previous && time <= 1.0) {
            return Err(Error::InvalidShape(format!(
                "switch time {time} of phase {phase} must be in ({previous}, 1]"
            )));
        }
        previous = time;
    }
    if previous != 1.0 {
        return Err(Error::InvalidShape(format!(
            "last switch time must be 1, got {previous}"
        )));
    }
    Ok(())
}

impl ShapeSource for TriggerShape {
    fn phase_count(&self) -> usize {
        self.switch_times.len()
    }

    fn switch_times(&self) -> &[f32] {
        &self.switch_times
    }

    fn levels(&self, channel: Channel) -> &[PinState] {
        &self.channels[channel.index()]
    }
}

impl TryFrom<ShapeDefinition> for TriggerShape {
    type Error = Error;

    fn try_from(definition: ShapeDefinition) -> Result<Self> {
        let phase_count = definition.switch_times.len();
        let fill = |levels: Vec<PinState>| {
            if levels.is_empty() {
                vec![PinState::Low; phase_count]
            } else {
                levels
            }
        };
        TriggerShape::new(
            definition.switch_times,
            [
                definition.primary,
                fill(definition.secondary),
                fill(definition.tertiary),
            ],
        )
    }
}

impl From<TriggerShape> for ShapeDefinition {
    fn from(shape: TriggerShape) -> Self {
        let [primary, secondary, tertiary] = shape.channels;
        let drop_idle = |levels: Vec<PinState>| {
            if levels.iter().all(|level| *level == PinState::Low) {
                Vec::new()
            } else {
                levels
            }
        };
        ShapeDefinition {
            switch_times: shape.switch_times,
            primary,
            secondary: drop_idle(secondary),
            tertiary: drop_idle(tertiary),
        }
    }
}
