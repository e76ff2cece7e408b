use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::debug;

use crate::{ActuatorError, SlideActuator};

/// Synthetic-input actuator: one Right-arrow key press per advance, delivered
/// to the focused window.
pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> Result<Self, ActuatorError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| ActuatorError::Unavailable(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl SlideActuator for EnigoActuator {
    fn advance(&mut self, count: u32) -> Result<(), ActuatorError> {
        for _ in 0..count {
            self.enigo
                .key(Key::RightArrow, Direction::Click)
                .map_err(|e| ActuatorError::Failed(e.to_string()))?;
        }
        debug!("Advanced {} slide(s) via synthetic Right-arrow", count);
        Ok(())
    }
}
