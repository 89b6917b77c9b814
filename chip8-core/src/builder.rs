use core::fmt;

use crate::chip8::Chip8;
use crate::context::Context;
use crate::error::Error;
use crate::quirks::Quirks;
use crate::timer::Timers;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    MissingContext,
    MissingTimers,
    MissingProgram,
    Load(Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingContext => write!(f, "context not provided"),
            BuildError::MissingTimers => write!(f, "timers not provided"),
            BuildError::MissingProgram => write!(f, "program not provided"),
            BuildError::Load(e) => write!(f, "can't load program: {}", e),
        }
    }
}

impl From<Error> for BuildError {
    fn from(e: Error) -> Self {
        BuildError::Load(e)
    }
}

pub struct Builder<'a, 't, C: Context> {
    context: Option<C>,
    timers: Option<&'t Timers>,
    program: Option<&'a [u8]>,
    quirks: Quirks,
}

impl<'a, 't, C: Context> Builder<'a, 't, C> {
    pub fn new() -> Self {
        Self {
            context: None,
            timers: None,
            program: None,
            quirks: Quirks::default(),
        }
    }

    pub fn with_context(mut self, ctx: C) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn with_timers(mut self, timers: &'t Timers) -> Self {
        self.timers = Some(timers);
        self
    }

    pub fn with_program(mut self, prog: &'a [u8]) -> Self {
        self.program = Some(prog);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn build(self) -> Result<Chip8<'t, C>, BuildError> {
        let context = self.context.ok_or(BuildError::MissingContext)?;
        let timers = self.timers.ok_or(BuildError::MissingTimers)?;
        let program = self.program.ok_or(BuildError::MissingProgram)?;
        let mut chip = Chip8::with_quirks(context, timers, self.quirks);
        chip.load_program(program)?;
        Ok(chip)
    }
}

impl<'a, 't, C: Context> Default for Builder<'a, 't, C> {
    fn default() -> Self {
        Self::new()
    }
}
