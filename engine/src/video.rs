use serde::{Deserialize, Serialize};

use crate::widgets::Visibility;

pub const MIN_PLAYBACK_SPEED: f32 = 0.1;
pub const MAX_PLAYBACK_SPEED: f32 = 2.0;

/// Identifies a video asset. Decoding is entirely the host's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoClip(pub String);

impl VideoClip {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &str {
        &self.0
    }
}

/// Static transport settings for a background video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VideoSettings {
    #[serde(default)]
    pub mute: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_speed")]
    pub playback_speed: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            mute: false,
            volume: default_volume(),
            playback_speed: default_speed(),
        }
    }
}

impl VideoSettings {
    pub fn clamped(mut self) -> Self {
        self.volume = self.volume.clamp(0.0, 1.0);
        self.playback_speed = self
            .playback_speed
            .clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED);
        self
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_speed() -> f32 {
    1.0
}

/// A video player living on a surface that can be shown or hidden.
pub trait VideoChannel: Visibility {
    fn set_clip(&mut self, clip: &VideoClip);
    fn set_mute(&mut self, mute: bool);
    fn set_volume(&mut self, volume: f32);
    fn set_playback_speed(&mut self, speed: f32);
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_keeps_volume_and_speed_in_range() {
        let settings = VideoSettings {
            mute: true,
            volume: 4.0,
            playback_speed: 0.0,
        }
        .clamped();
        assert!(settings.mute);
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.playback_speed, MIN_PLAYBACK_SPEED);

        let fast = VideoSettings {
            playback_speed: 9.0,
            ..VideoSettings::default()
        }
        .clamped();
        assert_eq!(fast.playback_speed, MAX_PLAYBACK_SPEED);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: VideoSettings =
            serde_json::from_str(r#"{"mute":true}"#).expect("video settings JSON should parse");
        assert!(parsed.mute);
        assert_eq!(parsed.volume, 1.0);
        assert_eq!(parsed.playback_speed, 1.0);
    }
}
