use std::collections::BTreeMap;

use engine::time::{NORMAL_TIME_SCALE, PAUSED_TIME_SCALE};
use engine::widgets::Visibility;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Panel {
    Main,
    Settings,
    InGame,
    Pause,
}

impl Panel {
    pub fn name(self) -> &'static str {
        match self {
            Panel::Main => "Main",
            Panel::Settings => "Settings",
            Panel::InGame => "InGame",
            Panel::Pause => "Pause",
        }
    }

    pub fn context(self) -> MenuContext {
        match self {
            Panel::Main | Panel::Settings => MenuContext::MainMenu,
            Panel::InGame | Panel::Pause => MenuContext::InGame,
        }
    }

    /// Pure transition function for panel navigation.
    ///
    /// Every transition is directional, so repeating an event is a no-op at the state level.
    /// Events that belong to the other context are ignored. The time scale side effect is
    /// reported through `PanelEffect` and applied by the caller in the same call.
    pub fn handle(self, event: PanelEvent) -> (Panel, PanelEffect) {
        match (self, event) {
            (Panel::Main | Panel::Settings, PanelEvent::OpenSettings) => {
                (Panel::Settings, PanelEffect::None)
            }
            (Panel::Main | Panel::Settings, PanelEvent::CloseSettings) => {
                (Panel::Main, PanelEffect::None)
            }

            (Panel::InGame | Panel::Pause, PanelEvent::Pause) => (
                Panel::Pause,
                PanelEffect::SetTimeScale(PAUSED_TIME_SCALE),
            ),
            (Panel::InGame | Panel::Pause, PanelEvent::Resume) => (
                Panel::InGame,
                PanelEffect::SetTimeScale(NORMAL_TIME_SCALE),
            ),

            (panel, _) => (panel, PanelEffect::None),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    #[default]
    MainMenu,
    InGame,
}

impl MenuContext {
    pub fn panels(self) -> &'static [Panel] {
        match self {
            MenuContext::MainMenu => &[Panel::Main, Panel::Settings],
            MenuContext::InGame => &[Panel::InGame, Panel::Pause],
        }
    }

    pub fn initial_panel(self) -> Panel {
        match self {
            MenuContext::MainMenu => Panel::Main,
            MenuContext::InGame => Panel::InGame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelEvent {
    OpenSettings,
    CloseSettings,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEffect {
    None,
    SetTimeScale(f32),
}

/// Owns the active panel for one context and mirrors it onto the host's panel views.
pub struct PanelNavigator {
    context: MenuContext,
    active: Panel,
    views: BTreeMap<Panel, Box<dyn Visibility>>,
}

impl PanelNavigator {
    pub fn new(context: MenuContext) -> Self {
        Self {
            context,
            active: context.initial_panel(),
            views: BTreeMap::new(),
        }
    }

    /// Attaches the host view for `panel`. Panels from another context are rejected.
    pub fn attach(&mut self, panel: Panel, view: Box<dyn Visibility>) -> bool {
        if panel.context() != self.context {
            tracing::warn!(
                panel = panel.name(),
                context = ?self.context,
                "panel does not belong to this menu context"
            );
            return false;
        }
        self.views.insert(panel, view);
        true
    }

    pub fn context(&self) -> MenuContext {
        self.context
    }

    pub fn active(&self) -> Panel {
        self.active
    }

    /// Returns to the context's initial panel.
    pub fn reset(&mut self) {
        self.active = self.context.initial_panel();
        self.sync_views();
    }

    pub fn apply(&mut self, event: PanelEvent) -> PanelEffect {
        let (next, effect) = self.active.handle(event);
        if next == self.active && effect == PanelEffect::None {
            tracing::debug!(?event, panel = self.active.name(), "panel event ignored");
        }
        self.active = next;
        self.sync_views();
        effect
    }

    fn sync_views(&mut self) {
        let active = self.active;
        for (panel, view) in self.views.iter_mut() {
            view.set_active(*panel == active);
        }
    }
}
