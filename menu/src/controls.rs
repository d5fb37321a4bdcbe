use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    #[default]
    Button,
    Toggle,
}

/// The one semantic action a control performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    OpenSettings,
    CloseSettings,
    Pause,
    Resume,
    LoadScene { index: usize },
    Quit,
    /// Toggle-driven: the new value comes from the control event.
    SetSfxEnabled,
    SetMusicEnabled,
}

/// What the host reports about a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    PointerEnter(ControlId),
    Activate(ControlId),
    ValueChanged(ControlId, bool),
}

impl ControlEvent {
    pub fn control(&self) -> &ControlId {
        match self {
            ControlEvent::PointerEnter(id)
            | ControlEvent::Activate(id)
            | ControlEvent::ValueChanged(id, _) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    pub control: ControlId,
    pub kind: ControlKind,
    pub action: Action,
    pub hover_sound: bool,
    pub click_sound: bool,
}

/// At most one binding per control.
///
/// Binding a control that is already bound replaces the old binding, so no sequence of
/// (re)binds can make a single interaction fire twice.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: BTreeMap<ControlId, ControlBinding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding this one replaced, if any.
    pub fn bind(&mut self, binding: ControlBinding) -> Option<ControlBinding> {
        self.bindings.insert(binding.control.clone(), binding)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn get(&self, control: &ControlId) -> Option<&ControlBinding> {
        self.bindings.get(control)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
