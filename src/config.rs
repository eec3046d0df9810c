//! Router configuration.

/// What to do when the seat reports no keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyboardPolicy {
    /// A keyboard-less seat is a fatal configuration error.
    Required,
    /// Keep running without keyboard input.
    #[default]
    Optional,
}

/// Settings for an [`InputRouter`](crate::InputRouter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterConfig {
    /// Keyboard capability policy.
    pub keyboard: KeyboardPolicy,
}

impl RouterConfig {
    /// Default configuration: keyboard optional.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keyboard capability policy.
    pub fn with_keyboard_policy(mut self, policy: KeyboardPolicy) -> Self {
        self.keyboard = policy;
        self
    }

    /// Whether a keyboard capability is mandatory.
    pub fn requires_keyboard(&self) -> bool {
        self.keyboard == KeyboardPolicy::Required
    }
}
