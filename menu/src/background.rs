use engine::video::{VideoChannel, VideoClip, VideoSettings};
use engine::widgets::Visibility;

/// Switches the menu backdrop between a static panel and a playing video.
///
/// With both targets attached, exactly one of "static panel visible" and "video playing" holds
/// after every call to `set_mode`. A missing target is skipped.
pub struct BackgroundVideo {
    settings: VideoSettings,
    clip: Option<VideoClip>,
    static_panel: Option<Box<dyn Visibility>>,
    video: Option<Box<dyn VideoChannel>>,
    video_enabled: bool,
}

impl BackgroundVideo {
    pub fn new(settings: VideoSettings) -> Self {
        Self {
            settings: settings.clamped(),
            clip: None,
            static_panel: None,
            video: None,
            video_enabled: false,
        }
    }

    pub fn with_clip(mut self, clip: Option<VideoClip>) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_static_panel(mut self, panel: Option<Box<dyn Visibility>>) -> Self {
        self.static_panel = panel;
        self
    }

    pub fn with_video(mut self, video: Option<Box<dyn VideoChannel>>) -> Self {
        self.video = video;
        self
    }

    /// Loads the configured clip into the player. Skipped unless both exist.
    pub fn setup(&mut self) {
        if let (Some(video), Some(clip)) = (self.video.as_mut(), self.clip.as_ref()) {
            video.set_clip(clip);
        }
    }

    pub fn set_mode(&mut self, video_enabled: bool) {
        self.video_enabled = video_enabled;
        if video_enabled {
            if let Some(panel) = self.static_panel.as_mut() {
                panel.set_active(false);
            }
            if let Some(video) = self.video.as_mut() {
                video.set_active(true);
                video.set_mute(self.settings.mute);
                video.set_volume(self.settings.volume);
                video.set_playback_speed(self.settings.playback_speed);
                video.play();
            }
        } else {
            if let Some(panel) = self.static_panel.as_mut() {
                panel.set_active(true);
            }
            if let Some(video) = self.video.as_mut() {
                video.set_active(false);
                video.stop();
            }
        }
    }

    /// Whether the host attached a static panel or a video player.
    pub fn has_targets(&self) -> bool {
        self.static_panel.is_some() || self.video.is_some()
    }

    pub fn video_enabled(&self) -> bool {
        self.video_enabled
    }

    pub fn settings(&self) -> VideoSettings {
        self.settings
    }
}
