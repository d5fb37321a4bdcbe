use engine::audio::AudioClip;
use engine::headless::{HeadlessChannel, HeadlessPanel, HeadlessVideo, HostEvent, Journal};
use engine::video::{VideoClip, VideoSettings};
use menu::feedback::{FeedbackBinder, FeedbackFlags, FeedbackKind};
use menu::preferences::AudioPreference;

fn channels(journal: &Journal) -> FeedbackBinder {
    FeedbackBinder::new(FeedbackFlags::default())
        .with_sfx_channel(Some(Box::new(HeadlessChannel::new("sfx", journal))))
        .with_music_channel(Some(Box::new(HeadlessChannel::new("music", journal))))
        .with_clips(Some(AudioClip::named("hover")), Some(AudioClip::named("click")))
}

fn backdrop(journal: &Journal) -> FeedbackBinder {
    FeedbackBinder::new(FeedbackFlags::default()).with_background(
        VideoSettings {
            mute: true,
            volume: 0.4,
            playback_speed: 3.0,
        },
        Some(VideoClip::new("menu_loop.webm")),
        Some(Box::new(HeadlessPanel::new("Backdrop", journal))),
        Some(Box::new(HeadlessVideo::new("video", journal))),
    )
}

#[test]
fn mute_follows_preferences_in_any_order() {
    let journal = Journal::new();
    let mut binder = channels(&journal);
    let prefs = AudioPreference {
        sfx_enabled: false,
        music_enabled: true,
    };

    binder.apply_preferences(AudioPreference::default());
    binder.apply_preferences(prefs);
    binder.apply_preferences(prefs);

    assert_eq!(journal.is_muted("sfx"), Some(true));
    assert_eq!(journal.is_muted("music"), Some(false));
}

#[test]
fn missing_channels_are_skipped() {
    let mut binder = FeedbackBinder::new(FeedbackFlags::default())
        .with_clips(Some(AudioClip::named("hover")), Some(AudioClip::named("click")));
    binder.apply_preferences(AudioPreference::default());
    assert!(!binder.play_feedback(FeedbackKind::Click));
}

#[test]
fn cues_need_flag_clip_and_channel() {
    let journal = Journal::new();
    let mut binder = channels(&journal);
    assert!(binder.play_feedback(FeedbackKind::Hover));
    assert!(binder.play_feedback(FeedbackKind::Click));
    assert_eq!(journal.one_shots("sfx"), vec!["hover", "click"]);

    let journal = Journal::new();
    let mut no_hover = FeedbackBinder::new(FeedbackFlags {
        play_hover_sound: false,
        play_click_sound: true,
    })
    .with_sfx_channel(Some(Box::new(HeadlessChannel::new("sfx", &journal))))
    .with_clips(Some(AudioClip::named("hover")), None);
    assert!(!no_hover.play_feedback(FeedbackKind::Hover));
    assert!(!no_hover.play_feedback(FeedbackKind::Click));
    assert!(journal.one_shots("sfx").is_empty());
}

#[test]
fn background_modes_are_mutually_exclusive() {
    let journal = Journal::new();
    let mut binder = backdrop(&journal);

    for enabled in [true, true, false, true, false, false] {
        binder.set_background_video_mode(enabled);
        let panel_visible = journal.is_active("Backdrop") == Some(true);
        let video_playing = journal.is_playing("video");
        assert_ne!(panel_visible, video_playing, "mode {enabled}");
        assert_eq!(video_playing, enabled);
        assert_eq!(binder.background().video_enabled(), enabled);
    }
}

#[test]
fn video_mode_applies_clamped_settings_and_clip() {
    let journal = Journal::new();
    let mut binder = backdrop(&journal);
    binder.set_background_video_mode(true);

    let events = journal.events();
    assert_eq!(
        events.first(),
        Some(&HostEvent::VideoClip {
            channel: "video".to_string(),
            clip: "menu_loop.webm".to_string(),
        })
    );
    assert!(events.contains(&HostEvent::PlaybackSpeed {
        channel: "video".to_string(),
        speed: 2.0,
    }));
    assert!(events.contains(&HostEvent::Mute {
        channel: "video".to_string(),
        muted: true,
    }));
}

#[test]
fn background_without_targets_only_tracks_mode() {
    let mut binder = FeedbackBinder::new(FeedbackFlags::default());
    binder.set_background_video_mode(true);
    assert!(binder.background().video_enabled());
}
