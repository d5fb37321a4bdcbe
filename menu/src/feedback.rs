use engine::audio::{AudioChannel, AudioClip};
use engine::video::{VideoChannel, VideoClip, VideoSettings};
use engine::widgets::Visibility;
use serde::{Deserialize, Serialize};

use crate::background::BackgroundVideo;
use crate::preferences::AudioPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Hover,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackFlags {
    #[serde(default = "enabled")]
    pub play_hover_sound: bool,
    #[serde(default = "enabled")]
    pub play_click_sound: bool,
}

impl Default for FeedbackFlags {
    fn default() -> Self {
        Self {
            play_hover_sound: true,
            play_click_sound: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Maps preferences onto output channels and fires hover/click cues.
///
/// Cues are gated only on the feature flags and on the clip/channel being present. Whether a
/// cue is audible is decided by the sfx channel's mute state, which `apply_preferences` keeps
/// in line with `sfx_enabled`.
pub struct FeedbackBinder {
    flags: FeedbackFlags,
    hover_clip: Option<AudioClip>,
    click_clip: Option<AudioClip>,
    sfx: Option<Box<dyn AudioChannel>>,
    music: Option<Box<dyn AudioChannel>>,
    background: BackgroundVideo,
}

impl FeedbackBinder {
    pub fn new(flags: FeedbackFlags) -> Self {
        Self {
            flags,
            hover_clip: None,
            click_clip: None,
            sfx: None,
            music: None,
            background: BackgroundVideo::new(VideoSettings::default()),
        }
    }

    pub fn with_sfx_channel(mut self, channel: Option<Box<dyn AudioChannel>>) -> Self {
        self.sfx = channel;
        self
    }

    pub fn with_music_channel(mut self, channel: Option<Box<dyn AudioChannel>>) -> Self {
        self.music = channel;
        self
    }

    pub fn with_clips(mut self, hover: Option<AudioClip>, click: Option<AudioClip>) -> Self {
        self.hover_clip = hover;
        self.click_clip = click;
        self
    }

    pub fn with_background(
        mut self,
        settings: VideoSettings,
        clip: Option<VideoClip>,
        static_panel: Option<Box<dyn Visibility>>,
        video: Option<Box<dyn VideoChannel>>,
    ) -> Self {
        let mut background = BackgroundVideo::new(settings)
            .with_clip(clip)
            .with_static_panel(static_panel)
            .with_video(video);
        background.setup();
        self.background = background;
        self
    }

    pub fn flags(&self) -> FeedbackFlags {
        self.flags
    }

    pub fn apply_preferences(&mut self, prefs: AudioPreference) {
        if let Some(sfx) = self.sfx.as_mut() {
            sfx.set_mute(!prefs.sfx_enabled);
        }
        if let Some(music) = self.music.as_mut() {
            music.set_mute(!prefs.music_enabled);
        }
    }

    /// Plays the cue for `kind`. Returns whether it was handed to the sfx channel.
    pub fn play_feedback(&mut self, kind: FeedbackKind) -> bool {
        let (flag, clip) = match kind {
            FeedbackKind::Hover => (self.flags.play_hover_sound, self.hover_clip.as_ref()),
            FeedbackKind::Click => (self.flags.play_click_sound, self.click_clip.as_ref()),
        };
        if !flag {
            return false;
        }
        let (Some(clip), Some(sfx)) = (clip, self.sfx.as_mut()) else {
            return false;
        };
        sfx.play_one_shot(clip);
        true
    }

    pub fn set_background_video_mode(&mut self, enabled: bool) {
        self.background.set_mode(enabled);
    }

    pub fn background(&self) -> &BackgroundVideo {
        &self.background
    }
}
