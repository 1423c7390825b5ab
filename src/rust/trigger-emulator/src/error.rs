// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown command `{0}`")]
    UnknownCommand(String),

    #[error("Invalid argument for `{command}`: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error("Command `{0}` is already registered")]
    DuplicateCommand(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Shape(#[from] trigger_shape::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
