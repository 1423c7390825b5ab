// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Console commands.
//!
//! A command line is a name optionally followed by one integer argument, e.g. `rpm 6000`.
use indexmap::IndexMap;

use crate::control::ControlSurface;
use crate::{Error, Result};

pub const RPM_COMMAND: &str = "rpm";
pub const STOP_AT_INDEX_COMMAND: &str = "stop_stimulator_at_index";
pub const RESUME_COMMAND: &str = "resume_stimulator";

type IntAction = Box<dyn Fn(i64) -> Result<()> + Send + Sync>;
type VoidAction = Box<dyn Fn() + Send + Sync>;

enum Action {
    Int(IntAction),
    Void(VoidAction),
}

/// Named console actions, kept in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    actions: IndexMap<String, Action>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: &str, action: Action) -> Result<()> {
        if self.actions.contains_key(name) {
            return Err(Error::DuplicateCommand(name.to_string()));
        }
        self.actions.insert(name.to_string(), action);
        Ok(())
    }

    /// Register an action without argument.
    pub fn add_action(
        &mut self,
        name: &str,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Result<()> {
        self.insert(name, Action::Void(Box::new(action)))
    }

    /// Register an action taking one integer argument.
    pub fn add_action_i(
        &mut self,
        name: &str,
        action: impl Fn(i64) -> Result<()> + Send + Sync + 'static,
    ) -> Result<()> {
        self.insert(name, Action::Int(Box::new(action)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Parse and run one command line. Blank lines are ignored.
    pub fn execute(&self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(());
        };
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))?;
        let argument = tokens.next();
        if let Some(extra) = tokens.next() {
            return Err(invalid_argument(name, format!("unexpected `{extra}`")));
        }
        match (action, argument) {
            (Action::Void(action), None) => {
                action();
                Ok(())
            }
            (Action::Void(_), Some(argument)) => Err(invalid_argument(
                name,
                format!("takes no argument, got `{argument}`"),
            )),
            (Action::Int(_), None) => Err(invalid_argument(name, "expected an integer")),
            (Action::Int(action), Some(argument)) => {
                let value = argument
                    .parse::<i64>()
                    .map_err(|e| invalid_argument(name, format!("`{argument}`: {e}")))?;
                action(value)
            }
        }
    }
}

fn invalid_argument(command: &str, reason: impl Into<String>) -> Error {
    Error::InvalidArgument {
        command: command.to_string(),
        reason: reason.into(),
    }
}

/// Bind `rpm`, `stop_stimulator_at_index` and `resume_stimulator` to `control`.
pub fn register_emulator_commands(
    registry: &mut CommandRegistry,
    control: &ControlSurface,
) -> Result<()> {
    let surface = control.clone();
    registry.add_action_i(RPM_COMMAND, move |value| {
        let rpm = u32::try_from(value)
            .map_err(|_| invalid_argument(RPM_COMMAND, format!("{value} is not a valid rpm")))?;
        surface.set_rpm(rpm);
        Ok(())
    })?;

    let surface = control.clone();
    registry.add_action_i(STOP_AT_INDEX_COMMAND, move |value| {
        let index = usize::try_from(value).map_err(|_| {
            invalid_argument(STOP_AT_INDEX_COMMAND, format!("{value} is not a phase index"))
        })?;
        surface.stop_at_index(index);
        Ok(())
    })?;

    let surface = control.clone();
    registry.add_action(RESUME_COMMAND, move || surface.resume())?;
    Ok(())
}
