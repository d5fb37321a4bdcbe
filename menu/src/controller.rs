use std::collections::BTreeMap;

use engine::audio::{AudioChannel, AudioClip};
use engine::lifecycle::{SceneLoader, Terminate};
use engine::storage::KeyValueStore;
use engine::time::{NORMAL_TIME_SCALE, TimeControl};
use engine::video::VideoChannel;
use engine::widgets::{ToggleView, Visibility};

use crate::config::MenuConfig;
use crate::controls::{Action, BindingTable, ControlBinding, ControlEvent, ControlId, ControlKind};
use crate::feedback::{FeedbackBinder, FeedbackKind};
use crate::panels::{MenuContext, Panel, PanelEffect, PanelEvent, PanelNavigator};
use crate::preferences::{AudioPreference, PreferenceStore};

/// Everything the host hands the controller. Any piece may be left out; the controller skips
/// work that would need it.
#[derive(Default)]
pub struct MenuHost {
    pub panels: Vec<(Panel, Box<dyn Visibility>)>,
    pub toggles: Vec<(ControlId, Box<dyn ToggleView>)>,
    pub sfx_channel: Option<Box<dyn AudioChannel>>,
    pub music_channel: Option<Box<dyn AudioChannel>>,
    pub hover_clip: Option<AudioClip>,
    pub click_clip: Option<AudioClip>,
    pub static_background: Option<Box<dyn Visibility>>,
    pub background_video: Option<Box<dyn VideoChannel>>,
    pub scene_loader: Option<Box<dyn SceneLoader>>,
    pub terminate: Option<Box<dyn Terminate>>,
    pub time: Option<Box<dyn TimeControl>>,
}

impl MenuHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_panel(mut self, panel: Panel, view: impl Visibility + 'static) -> Self {
        self.panels.push((panel, Box::new(view)));
        self
    }

    pub fn with_toggle(mut self, control: &str, view: impl ToggleView + 'static) -> Self {
        self.toggles.push((ControlId::from(control), Box::new(view)));
        self
    }

    pub fn with_sfx_channel(mut self, channel: impl AudioChannel + 'static) -> Self {
        self.sfx_channel = Some(Box::new(channel));
        self
    }

    pub fn with_music_channel(mut self, channel: impl AudioChannel + 'static) -> Self {
        self.music_channel = Some(Box::new(channel));
        self
    }

    pub fn with_clips(mut self, hover: Option<AudioClip>, click: Option<AudioClip>) -> Self {
        self.hover_clip = hover;
        self.click_clip = click;
        self
    }

    pub fn with_static_background(mut self, view: impl Visibility + 'static) -> Self {
        self.static_background = Some(Box::new(view));
        self
    }

    pub fn with_background_video(mut self, video: impl VideoChannel + 'static) -> Self {
        self.background_video = Some(Box::new(video));
        self
    }

    pub fn with_scene_loader(mut self, loader: impl SceneLoader + 'static) -> Self {
        self.scene_loader = Some(Box::new(loader));
        self
    }

    pub fn with_terminate(mut self, terminate: impl Terminate + 'static) -> Self {
        self.terminate = Some(Box::new(terminate));
        self
    }

    pub fn with_time(mut self, time: impl TimeControl + 'static) -> Self {
        self.time = Some(Box::new(time));
        self
    }
}

/// A resolved semantic action, ready to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Navigate(PanelEvent),
    SetSfxEnabled(bool),
    SetMusicEnabled(bool),
    LoadScene(usize),
    Quit,
}

/// What one control event did: which cue went to the sfx channel, and which command ran.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dispatch {
    pub feedback: Option<FeedbackKind>,
    pub command: Option<Command>,
}

/// Composition root for one menu.
///
/// Control events are handled synchronously and in a fixed order: the feedback cue goes out
/// first, then the command mutates state. All mutation goes through `&mut self`, so a handler
/// cannot be re-entered while it runs.
pub struct MenuController<S> {
    config: MenuConfig,
    preferences: PreferenceStore<S>,
    feedback: FeedbackBinder,
    panels: PanelNavigator,
    bindings: BindingTable,
    toggles: BTreeMap<ControlId, Box<dyn ToggleView>>,
    scene_loader: Option<Box<dyn SceneLoader>>,
    terminate: Option<Box<dyn Terminate>>,
    time: Option<Box<dyn TimeControl>>,
}

impl<S: KeyValueStore> MenuController<S> {
    pub fn new(config: MenuConfig, store: S, host: MenuHost) -> Self {
        let config = config.sanitized();

        let mut panels = PanelNavigator::new(config.context);
        for (panel, view) in host.panels {
            panels.attach(panel, view);
        }

        let background = config.background.clone().unwrap_or_default();
        let feedback = FeedbackBinder::new(config.feedback)
            .with_sfx_channel(host.sfx_channel)
            .with_music_channel(host.music_channel)
            .with_clips(host.hover_clip, host.click_clip)
            .with_background(
                background.video,
                background.clip,
                host.static_background,
                host.background_video,
            );

        Self {
            config,
            preferences: PreferenceStore::new(store),
            feedback,
            panels,
            bindings: BindingTable::new(),
            toggles: host.toggles.into_iter().collect(),
            scene_loader: host.scene_loader,
            terminate: host.terminate,
            time: host.time,
        }
    }

    /// Brings panels, backdrop, audio output and bindings in line with config and stored
    /// preferences. Safe to call again; bindings are rebuilt, never appended.
    pub fn initialize(&mut self) {
        self.panels.reset();
        // A host backdrop is always put into a definite mode, even when config leaves the
        // background section out.
        if self.config.background.is_some() || self.feedback.background().has_targets() {
            let video = self
                .config
                .background
                .as_ref()
                .is_none_or(|background| background.play_background_video);
            self.feedback.set_background_video_mode(video);
        }

        let prefs = self.preferences.load();
        self.feedback.apply_preferences(prefs);
        self.sync_toggles(prefs);

        self.rebind();
        tracing::debug!(
            context = ?self.config.context,
            controls = self.bindings.len(),
            ?prefs,
            "menu initialized"
        );
    }

    /// Clears the binding table and rebuilds it from config.
    pub fn rebind(&mut self) {
        self.bindings.clear();
        for binding in self.config.bindings() {
            self.bindings.bind(binding);
        }
    }

    pub fn handle(&mut self, event: ControlEvent) -> Dispatch {
        let Some(binding) = self.bindings.get(event.control()).cloned() else {
            tracing::debug!(control = %event.control(), "event for unbound control");
            return Dispatch::default();
        };

        match event {
            ControlEvent::PointerEnter(_) => {
                let feedback = (binding.hover_sound
                    && self.feedback.play_feedback(FeedbackKind::Hover))
                .then_some(FeedbackKind::Hover);
                Dispatch {
                    feedback,
                    command: None,
                }
            }
            ControlEvent::Activate(_) => {
                let command = self.resolve(&binding, None);
                self.dispatch(&binding, command)
            }
            ControlEvent::ValueChanged(_, value) => {
                if binding.kind != ControlKind::Toggle {
                    tracing::debug!(control = %binding.control, "value change on a button");
                    return Dispatch::default();
                }
                let command = self.resolve(&binding, Some(value));
                self.dispatch(&binding, command)
            }
        }
    }

    pub fn pointer_enter(&mut self, control: &str) -> Dispatch {
        self.handle(ControlEvent::PointerEnter(ControlId::from(control)))
    }

    pub fn activate(&mut self, control: &str) -> Dispatch {
        self.handle(ControlEvent::Activate(ControlId::from(control)))
    }

    pub fn value_changed(&mut self, control: &str, value: bool) -> Dispatch {
        self.handle(ControlEvent::ValueChanged(ControlId::from(control), value))
    }

    /// Runs a command directly, without a control or a feedback cue.
    pub fn perform(&mut self, command: Command) {
        match command {
            Command::Navigate(event) => {
                // Panel swap and time scale change land together.
                let effect = self.panels.apply(event);
                if let PanelEffect::SetTimeScale(scale) = effect {
                    self.set_time_scale(scale);
                }
            }
            Command::SetSfxEnabled(enabled) => {
                self.preferences.set_sfx_enabled(enabled);
                self.refresh_audio();
            }
            Command::SetMusicEnabled(enabled) => {
                self.preferences.set_music_enabled(enabled);
                self.refresh_audio();
            }
            Command::LoadScene(index) => {
                self.set_time_scale(NORMAL_TIME_SCALE);
                match self.scene_loader.as_mut() {
                    Some(loader) => {
                        tracing::info!(index, "loading scene");
                        loader.load_scene(index);
                    }
                    None => tracing::warn!(index, "no scene loader attached"),
                }
            }
            Command::Quit => match self.terminate.as_mut() {
                Some(terminate) => {
                    tracing::info!("quit requested");
                    terminate.quit();
                }
                None => tracing::warn!("no terminate strategy attached"),
            },
        }
    }

    pub fn open_settings(&mut self) {
        self.perform(Command::Navigate(PanelEvent::OpenSettings));
    }

    pub fn close_settings(&mut self) {
        self.perform(Command::Navigate(PanelEvent::CloseSettings));
    }

    pub fn pause(&mut self) {
        self.perform(Command::Navigate(PanelEvent::Pause));
    }

    pub fn resume(&mut self) {
        self.perform(Command::Navigate(PanelEvent::Resume));
    }

    pub fn set_background_video_mode(&mut self, enabled: bool) {
        self.feedback.set_background_video_mode(enabled);
    }

    pub fn context(&self) -> MenuContext {
        self.panels.context()
    }

    pub fn active_panel(&self) -> Panel {
        self.panels.active()
    }

    pub fn preferences(&self) -> AudioPreference {
        self.preferences.current()
    }

    pub fn preference_store(&self) -> &PreferenceStore<S> {
        &self.preferences
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn time_scale(&self) -> Option<f32> {
        self.time.as_ref().map(|time| time.time_scale())
    }

    pub fn background_video_enabled(&self) -> bool {
        self.feedback.background().video_enabled()
    }

    fn resolve(&self, binding: &ControlBinding, value: Option<bool>) -> Command {
        let current = self.preferences.current();
        match binding.action {
            Action::OpenSettings => Command::Navigate(PanelEvent::OpenSettings),
            Action::CloseSettings => Command::Navigate(PanelEvent::CloseSettings),
            Action::Pause => Command::Navigate(PanelEvent::Pause),
            Action::Resume => Command::Navigate(PanelEvent::Resume),
            Action::LoadScene { index } => Command::LoadScene(index),
            Action::Quit => Command::Quit,
            Action::SetSfxEnabled => {
                Command::SetSfxEnabled(value.unwrap_or(!current.sfx_enabled))
            }
            Action::SetMusicEnabled => {
                Command::SetMusicEnabled(value.unwrap_or(!current.music_enabled))
            }
        }
    }

    fn dispatch(&mut self, binding: &ControlBinding, command: Command) -> Dispatch {
        let feedback = (binding.click_sound && self.feedback.play_feedback(FeedbackKind::Click))
            .then_some(FeedbackKind::Click);
        self.perform(command);
        Dispatch {
            feedback,
            command: Some(command),
        }
    }

    fn refresh_audio(&mut self) {
        let prefs = self.preferences.current();
        self.feedback.apply_preferences(prefs);
        self.sync_toggles(prefs);
    }

    fn set_time_scale(&mut self, scale: f32) {
        if let Some(time) = self.time.as_mut() {
            time.set_time_scale(scale);
        }
    }

    fn sync_toggles(&mut self, prefs: AudioPreference) {
        for row in &self.config.controls {
            let on = match row.action {
                Action::SetSfxEnabled => prefs.sfx_enabled,
                Action::SetMusicEnabled => prefs.music_enabled,
                _ => continue,
            };
            if let Some(view) = self.toggles.get_mut(&row.control) {
                view.set_is_on(on);
            }
        }
    }
}
