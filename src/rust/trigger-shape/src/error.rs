// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid trigger shape: {0}")]
    InvalidShape(String),

    #[error("Trigger shape has {count} phases, at most {max} are supported")]
    TooManyPhases { count: usize, max: usize },
}
