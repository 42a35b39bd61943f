//! Input - Discrete runner actions and the key bindings that produce them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game_server::heading::TurnDirection;

/// A performed input action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "direction", rename_all = "snake_case")]
pub enum InputAction {
    Turn(TurnDirection),
    Jump,
    Slide,
}

impl InputAction {
    /// Turn action from a signed axis value; `None` when the axis is centred
    pub fn turn_from_axis(value: f32) -> Option<Self> {
        TurnDirection::from_axis(value).map(InputAction::Turn)
    }
}

/// Key name (as reported by the frontend, e.g. `KeyA`) to action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputBindings {
    keys: HashMap<String, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let left = InputAction::Turn(TurnDirection::Left);
        let right = InputAction::Turn(TurnDirection::Right);
        let keys = [
            ("KeyA", left),
            ("ArrowLeft", left),
            ("KeyD", right),
            ("ArrowRight", right),
            ("Space", InputAction::Jump),
            ("KeyW", InputAction::Jump),
            ("ArrowUp", InputAction::Jump),
            ("KeyS", InputAction::Slide),
            ("ArrowDown", InputAction::Slide),
        ]
        .into_iter()
        .map(|(k, a)| (k.to_string(), a))
        .collect();

        Self { keys }
    }
}

impl InputBindings {
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: &str, action: InputAction) {
        self.keys.insert(key.to_string(), action);
    }

    pub fn unbind(&mut self, key: &str) -> Option<InputAction> {
        self.keys.remove(key)
    }

    pub fn resolve(&self, key: &str) -> Option<InputAction> {
        self.keys.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.resolve("ArrowLeft"),
            Some(InputAction::Turn(TurnDirection::Left))
        );
        assert_eq!(bindings.resolve("Space"), Some(InputAction::Jump));
        assert_eq!(bindings.resolve("KeyS"), Some(InputAction::Slide));
        assert_eq!(bindings.resolve("KeyQ"), None);
    }

    #[test]
    fn rebinding() {
        let mut bindings = InputBindings::empty();
        bindings.bind("KeyJ", InputAction::Jump);
        assert_eq!(bindings.resolve("KeyJ"), Some(InputAction::Jump));
        assert_eq!(bindings.unbind("KeyJ"), Some(InputAction::Jump));
        assert_eq!(bindings.resolve("KeyJ"), None);
    }

    #[test]
    fn bindings_from_json() {
        let bindings: InputBindings = serde_json::from_str(
            r#"{ "KeyH": { "action": "turn", "direction": "left" }, "KeyK": { "action": "slide" } }"#,
        )
        .unwrap();
        assert_eq!(
            bindings.resolve("KeyH"),
            Some(InputAction::Turn(TurnDirection::Left))
        );
        assert_eq!(bindings.resolve("KeyK"), Some(InputAction::Slide));
    }

    #[test]
    fn axis_to_turn() {
        assert_eq!(
            InputAction::turn_from_axis(1.0),
            Some(InputAction::Turn(TurnDirection::Right))
        );
        assert_eq!(InputAction::turn_from_axis(0.0), None);
    }
}
