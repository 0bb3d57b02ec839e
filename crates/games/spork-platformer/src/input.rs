use spork_core::input::{InputIntent, KeyState};

use crate::ai::{AiConfig, AiController, Difficulty};
use crate::level::Level;
use crate::physics::PlayerState;

/// What an input source may look at when deciding a tick's intent.
pub struct InputContext<'a> {
    pub entity: &'a PlayerState,
    pub level: &'a Level,
    /// Key state most recently handed to the engine by the host.
    pub keys: &'a KeyState,
}

/// Produces one intent per simulation tick for the entity it drives.
pub trait InputSource: Send {
    fn intent(&mut self, ctx: &InputContext<'_>) -> InputIntent;

    /// Called when a level is loaded or the match restarts.
    fn reset(&mut self) {}

    fn label(&self) -> &'static str;
}

/// Drives an entity from the host-sampled key state.
#[derive(Debug, Default)]
pub struct ManualInput;

impl InputSource for ManualInput {
    fn intent(&mut self, ctx: &InputContext<'_>) -> InputIntent {
        ctx.keys.intent()
    }

    fn label(&self) -> &'static str {
        "manual"
    }
}

/// Drives an entity with an [`AiController`].
#[derive(Debug)]
pub struct AiInput {
    controller: AiController,
}

impl AiInput {
    pub fn new(difficulty: Difficulty, config: AiConfig) -> Self {
        Self {
            controller: AiController::new(difficulty, config),
        }
    }

    pub fn controller(&self) -> &AiController {
        &self.controller
    }
}

impl InputSource for AiInput {
    fn intent(&mut self, ctx: &InputContext<'_>) -> InputIntent {
        self.controller.decide(ctx.entity, ctx.level)
    }

    fn reset(&mut self) {
        self.controller.reset();
    }

    fn label(&self) -> &'static str {
        "ai"
    }
}
