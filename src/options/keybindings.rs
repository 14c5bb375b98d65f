use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::NavAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "BindingOverrides")]
/// Configurable keyboard bindings mapping navigation actions to key codes.
///
/// A `[bindings]` table only needs the actions it changes; the rest keep
/// their default keys.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `Forward` → `"KeyW"`).
    pub bindings: HashMap<NavAction, String>,
    /// Reverse lookup cache (key string → action). Rebuilt on load.
    #[serde(skip)]
    key_to_action: HashMap<String, NavAction>,
}

/// On-disk form: only the actions a file mentions.
#[derive(Deserialize, Default)]
#[serde(default)]
struct BindingOverrides {
    bindings: HashMap<NavAction, String>,
}

impl From<BindingOverrides> for KeybindingOptions {
    fn from(overrides: BindingOverrides) -> Self {
        let mut opts = Self::default();
        opts.bindings.extend(overrides.bindings);
        opts.rebuild_reverse_map();
        opts
    }
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            (NavAction::Forward, "KeyW".into()),
            (NavAction::Back, "KeyS".into()),
            (NavAction::Left, "KeyA".into()),
            (NavAction::Right, "KeyD".into()),
            (NavAction::Up, "KeyR".into()),
            (NavAction::Down, "KeyF".into()),
            (NavAction::PitchUp, "ArrowUp".into()),
            (NavAction::PitchDown, "ArrowDown".into()),
            (NavAction::YawLeft, "ArrowLeft".into()),
            (NavAction::YawRight, "ArrowRight".into()),
            (NavAction::RollLeft, "KeyQ".into()),
            (NavAction::RollRight, "KeyE".into()),
        ]);

        let mut opts = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Look up the action for a key string.
    ///
    /// Edits made directly to `bindings` need a
    /// [`rebuild_reverse_map`](Self::rebuild_reverse_map) first.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<NavAction> {
        self.key_to_action.get(key).copied()
    }

    /// Key currently bound to `action`.
    #[must_use]
    pub fn key_for(&self, action: NavAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }

    /// Bind `action` to `key`, replacing its previous key.
    pub fn bind(&mut self, action: NavAction, key: impl Into<String>) {
        let _ = self.bindings.insert(action, key.into());
        self.rebuild_reverse_map();
    }

    /// Reject a key bound to more than one action; a release of the shared
    /// key would otherwise cancel both flags.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let mut seen: HashMap<&str, NavAction> = HashMap::new();
        for action in NavAction::ALL {
            let Some(key) = self.bindings.get(&action) else {
                continue;
            };
            if let Some(other) = seen.insert(key.as_str(), action) {
                return Err(format!(
                    "key {key:?} is bound to both {other:?} and {action:?}"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let keys = KeybindingOptions::default();
        assert_eq!(keys.lookup("KeyW"), Some(NavAction::Forward));
        assert_eq!(keys.lookup("ArrowLeft"), Some(NavAction::YawLeft));
        assert_eq!(keys.lookup("KeyE"), Some(NavAction::RollRight));
        assert_eq!(keys.lookup("KeyZ"), None);
        assert!(keys.validate().is_ok());
    }

    #[test]
    fn loaded_override_replaces_only_its_action() {
        let toml_str = r#"
[bindings]
forward = "KeyI"
"#;
        let keys: KeybindingOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(keys.lookup("KeyI"), Some(NavAction::Forward));
        assert_eq!(keys.lookup("KeyW"), None);
        assert_eq!(keys.lookup("KeyS"), Some(NavAction::Back));
        assert_eq!(keys.lookup("KeyE"), Some(NavAction::RollRight));
        assert_eq!(keys.bindings.len(), NavAction::ALL.len());
        assert!(keys.validate().is_ok());
    }

    #[test]
    fn empty_table_is_the_default() {
        let keys: KeybindingOptions = toml::from_str("").unwrap();
        assert_eq!(keys, KeybindingOptions::default());
    }

    #[test]
    fn rebinding_replaces_old_key() {
        let mut keys = KeybindingOptions::default();
        keys.bind(NavAction::Forward, "KeyI");
        assert_eq!(keys.lookup("KeyI"), Some(NavAction::Forward));
        assert_eq!(keys.lookup("KeyW"), None);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut keys = KeybindingOptions::default();
        keys.bind(NavAction::Back, "KeyW");
        let err = keys.validate().unwrap_err();
        assert!(err.contains("KeyW"));
    }
}
