//! Headless implementations of every host capability.
//!
//! Each one records what it was told into a shared [`Journal`], so tooling and tests can replay
//! or assert on the exact order of host-side effects without a window or an audio device.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::audio::{AudioChannel, AudioClip};
use crate::lifecycle::{SceneLoader, Terminate};
use crate::time::{NORMAL_TIME_SCALE, TimeControl};
use crate::video::{VideoChannel, VideoClip};
use crate::widgets::{ToggleView, Visibility};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Visibility { target: String, active: bool },
    Toggle { control: String, on: bool },
    Mute { channel: String, muted: bool },
    Volume { channel: String, volume: f32 },
    OneShot { channel: String, clip: String },
    VideoClip { channel: String, clip: String },
    PlaybackSpeed { channel: String, speed: f32 },
    Play { channel: String },
    Stop { channel: String },
    TimeScale { scale: f32 },
    LoadScene { index: usize },
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Events recorded after the first `mark` entries.
    pub fn since(&self, mark: usize) -> Vec<HostEvent> {
        self.events.borrow().iter().skip(mark).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Last recorded visibility of `target`, if it was ever set.
    pub fn is_active(&self, target: &str) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            HostEvent::Visibility { target: t, active } if t == target => Some(*active),
            _ => None,
        })
    }

    pub fn is_muted(&self, channel: &str) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            HostEvent::Mute { channel: c, muted } if c == channel => Some(*muted),
            _ => None,
        })
    }

    pub fn toggle_state(&self, control: &str) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            HostEvent::Toggle { control: c, on } if c == control => Some(*on),
            _ => None,
        })
    }

    pub fn is_playing(&self, channel: &str) -> bool {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|e| match e {
                HostEvent::Play { channel: c } if c == channel => Some(true),
                HostEvent::Stop { channel: c } if c == channel => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn one_shots(&self, channel: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HostEvent::OneShot { channel: c, clip } if c == channel => Some(clip.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn time_scale(&self) -> Option<f32> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            HostEvent::TimeScale { scale } => Some(*scale),
            _ => None,
        })
    }

    pub fn scenes_loaded(&self) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HostEvent::LoadScene { index } => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn quit_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, HostEvent::Quit))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessPanel {
    name: String,
    active: bool,
    journal: Journal,
}

impl HeadlessPanel {
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            active: true,
            journal: journal.clone(),
        }
    }
}

impl Visibility for HeadlessPanel {
    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.journal.record(HostEvent::Visibility {
            target: self.name.clone(),
            active,
        });
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessToggle {
    control: String,
    journal: Journal,
}

impl HeadlessToggle {
    pub fn new(control: impl Into<String>, journal: &Journal) -> Self {
        Self {
            control: control.into(),
            journal: journal.clone(),
        }
    }
}

impl ToggleView for HeadlessToggle {
    fn set_is_on(&mut self, on: bool) {
        self.journal.record(HostEvent::Toggle {
            control: self.control.clone(),
            on,
        });
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessChannel {
    name: String,
    muted: bool,
    journal: Journal,
}

impl HeadlessChannel {
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            muted: false,
            journal: journal.clone(),
        }
    }
}

impl AudioChannel for HeadlessChannel {
    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
        self.journal.record(HostEvent::Mute {
            channel: self.name.clone(),
            muted: mute,
        });
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn play_one_shot(&mut self, clip: &AudioClip) {
        self.journal.record(HostEvent::OneShot {
            channel: self.name.clone(),
            clip: clip.name().to_string(),
        });
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessVideo {
    name: String,
    active: bool,
    playing: bool,
    journal: Journal,
}

impl HeadlessVideo {
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            active: true,
            playing: false,
            journal: journal.clone(),
        }
    }
}

impl Visibility for HeadlessVideo {
    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.journal.record(HostEvent::Visibility {
            target: self.name.clone(),
            active,
        });
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl VideoChannel for HeadlessVideo {
    fn set_clip(&mut self, clip: &VideoClip) {
        self.journal.record(HostEvent::VideoClip {
            channel: self.name.clone(),
            clip: clip.source().to_string(),
        });
    }

    fn set_mute(&mut self, mute: bool) {
        self.journal.record(HostEvent::Mute {
            channel: self.name.clone(),
            muted: mute,
        });
    }

    fn set_volume(&mut self, volume: f32) {
        self.journal.record(HostEvent::Volume {
            channel: self.name.clone(),
            volume,
        });
    }

    fn set_playback_speed(&mut self, speed: f32) {
        self.journal.record(HostEvent::PlaybackSpeed {
            channel: self.name.clone(),
            speed,
        });
    }

    fn play(&mut self) {
        self.playing = true;
        self.journal.record(HostEvent::Play {
            channel: self.name.clone(),
        });
    }

    fn stop(&mut self) {
        self.playing = false;
        self.journal.record(HostEvent::Stop {
            channel: self.name.clone(),
        });
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessClock {
    scale: f32,
    journal: Journal,
}

impl HeadlessClock {
    pub fn new(journal: &Journal) -> Self {
        Self {
            scale: NORMAL_TIME_SCALE,
            journal: journal.clone(),
        }
    }
}

impl TimeControl for HeadlessClock {
    fn time_scale(&self) -> f32 {
        self.scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.journal.record(HostEvent::TimeScale { scale });
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessSceneLoader {
    journal: Journal,
}

impl HeadlessSceneLoader {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl SceneLoader for HeadlessSceneLoader {
    fn load_scene(&mut self, index: usize) {
        self.journal.record(HostEvent::LoadScene { index });
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessQuit {
    journal: Journal,
}

impl HeadlessQuit {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl Terminate for HeadlessQuit {
    fn quit(&mut self) {
        self.journal.record(HostEvent::Quit);
    }
}
