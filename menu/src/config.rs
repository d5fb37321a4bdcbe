use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::video::{VideoClip, VideoSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controls::{Action, ControlBinding, ControlId, ControlKind};
use crate::feedback::FeedbackFlags;
use crate::panels::MenuContext;

pub const DEFAULT_GAME_SCENE_INDEX: usize = 1;
pub const DEFAULT_MENU_SCENE_INDEX: usize = 0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "enabled")]
    pub play_background_video: bool,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub clip: Option<VideoClip>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            play_background_video: true,
            video: VideoSettings::default(),
            clip: None,
        }
    }
}

/// One row of the binding table as it appears in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    pub control: ControlId,
    #[serde(default)]
    pub kind: ControlKind,
    #[serde(flatten)]
    pub action: Action,
    #[serde(default = "enabled")]
    pub hover_sound: bool,
    #[serde(default = "enabled")]
    pub click_sound: bool,
}

impl BindingSpec {
    pub fn button(control: &str, action: Action) -> Self {
        Self {
            control: ControlId::from(control),
            kind: ControlKind::Button,
            action,
            hover_sound: true,
            click_sound: true,
        }
    }

    pub fn toggle(control: &str, action: Action) -> Self {
        Self {
            kind: ControlKind::Toggle,
            ..Self::button(control, action)
        }
    }

    pub fn binding(&self) -> ControlBinding {
        ControlBinding {
            control: self.control.clone(),
            kind: self.kind,
            action: self.action,
            hover_sound: self.hover_sound,
            click_sound: self.click_sound,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Declarative description of one menu: which context it runs in, which cues are on, how the
/// backdrop behaves, and what every control does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default)]
    pub context: MenuContext,
    #[serde(default)]
    pub feedback: FeedbackFlags,
    #[serde(default)]
    pub background: Option<BackgroundConfig>,
    #[serde(default)]
    pub controls: Vec<BindingSpec>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self::main_menu(DEFAULT_GAME_SCENE_INDEX)
    }
}

impl MenuConfig {
    /// Title screen: play, settings, quit, plus the two audio toggles on the settings panel.
    pub fn main_menu(game_scene_index: usize) -> Self {
        Self {
            context: MenuContext::MainMenu,
            feedback: FeedbackFlags::default(),
            background: Some(BackgroundConfig::default()),
            controls: vec![
                BindingSpec::button(
                    "play",
                    Action::LoadScene {
                        index: game_scene_index,
                    },
                ),
                BindingSpec::button("open_settings", Action::OpenSettings),
                BindingSpec::button("close_settings", Action::CloseSettings),
                BindingSpec::button("quit", Action::Quit),
                BindingSpec::toggle("music_toggle", Action::SetMusicEnabled),
                BindingSpec::toggle("sfx_toggle", Action::SetSfxEnabled),
            ],
        }
    }

    /// In-game overlay: pause, resume, and back to the title scene.
    pub fn pause_menu(menu_scene_index: usize) -> Self {
        Self {
            context: MenuContext::InGame,
            feedback: FeedbackFlags::default(),
            background: None,
            controls: vec![
                BindingSpec::button("pause", Action::Pause),
                BindingSpec::button("resume", Action::Resume),
                BindingSpec::button(
                    "menu",
                    Action::LoadScene {
                        index: menu_scene_index,
                    },
                ),
            ],
        }
    }

    pub fn preset(context: MenuContext) -> Self {
        match context {
            MenuContext::MainMenu => Self::main_menu(DEFAULT_GAME_SCENE_INDEX),
            MenuContext::InGame => Self::pause_menu(DEFAULT_MENU_SCENE_INDEX),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MenuConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.sanitized())
    }

    /// Clamps video settings and drops bindings that cannot work in this context. A control
    /// listed twice keeps its last row.
    pub fn sanitized(mut self) -> Self {
        if let Some(background) = self.background.as_mut() {
            background.video = background.video.clamped();
        }

        let context = self.context;
        let mut controls: Vec<BindingSpec> = Vec::with_capacity(self.controls.len());
        for row in self.controls {
            if !action_fits_context(row.action, context) {
                tracing::warn!(
                    control = %row.control,
                    action = ?row.action,
                    ?context,
                    "dropping binding for an action outside this context"
                );
                continue;
            }
            if let Some(pos) = controls.iter().position(|c| c.control == row.control) {
                tracing::warn!(control = %row.control, "control bound twice; keeping the last");
                controls.remove(pos);
            }
            controls.push(row);
        }
        self.controls = controls;
        self
    }

    pub fn bindings(&self) -> impl Iterator<Item = ControlBinding> + '_ {
        self.controls.iter().map(BindingSpec::binding)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn action_fits_context(action: Action, context: MenuContext) -> bool {
    match action {
        Action::OpenSettings | Action::CloseSettings => context == MenuContext::MainMenu,
        Action::Pause | Action::Resume => context == MenuContext::InGame,
        Action::LoadScene { .. }
        | Action::Quit
        | Action::SetSfxEnabled
        | Action::SetMusicEnabled => true,
    }
}
