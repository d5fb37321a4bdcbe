use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Encoded audio bytes plus a name for logs and journals.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    name: String,
    bytes: Arc<[u8]>,
}

impl AudioClip {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// A clip with no payload. Headless channels only look at the name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An audio output sink the menu can mute and fire one-shots on.
///
/// A muted channel still accepts one-shots; they are simply inaudible. Callers rely on that:
/// mute is the only audibility gate.
pub trait AudioChannel {
    fn set_mute(&mut self, mute: bool);
    fn is_muted(&self) -> bool;
    fn play_one_shot(&mut self, clip: &AudioClip);
}

#[cfg(feature = "rodio")]
pub use output::{AudioError, RodioChannel, open_default_output};
#[cfg(feature = "rodio")]
pub use rodio::OutputStream;

#[cfg(feature = "rodio")]
mod output {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use thiserror::Error;

    use super::{AudioChannel, AudioClip};

    #[derive(Debug, Error)]
    pub enum AudioError {
        #[error("failed to open audio output: {0}")]
        Stream(#[from] rodio::StreamError),
        #[error("failed to create sink: {0}")]
        Play(#[from] rodio::PlayError),
        #[error("failed to decode clip: {0}")]
        Decode(#[from] rodio::decoder::DecoderError),
    }

    /// Opens the default device. The returned stream must outlive every channel built from
    /// the handle.
    pub fn open_default_output() -> Result<(OutputStream, OutputStreamHandle), AudioError> {
        Ok(OutputStream::try_default()?)
    }

    pub struct RodioChannel {
        handle: OutputStreamHandle,
        volume: f32,
        muted: bool,
        looping: Option<Sink>,
    }

    impl RodioChannel {
        pub fn new(handle: OutputStreamHandle) -> Self {
            Self {
                handle,
                volume: 1.0,
                muted: false,
                looping: None,
            }
        }

        pub fn with_volume(mut self, volume: f32) -> Self {
            self.volume = volume.clamp(0.0, 1.0);
            self
        }

        /// Replaces the channel's background loop (music) with `clip`.
        pub fn play_looping(&mut self, clip: &AudioClip) -> Result<(), AudioError> {
            let sink = Sink::try_new(&self.handle)?;
            sink.set_volume(self.effective_volume());
            let source = Decoder::new_looped(Cursor::new(Arc::clone(&clip.bytes)))?;
            sink.append(source);
            self.looping = Some(sink);
            Ok(())
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }

        fn try_one_shot(&self, clip: &AudioClip) -> Result<(), AudioError> {
            let sink = Sink::try_new(&self.handle)?;
            sink.set_volume(self.effective_volume());
            let source = Decoder::new(Cursor::new(Arc::clone(&clip.bytes)))?;
            sink.append(source);
            sink.detach();
            Ok(())
        }
    }

    impl AudioChannel for RodioChannel {
        fn set_mute(&mut self, mute: bool) {
            self.muted = mute;
            let volume = self.effective_volume();
            if let Some(sink) = self.looping.as_ref() {
                sink.set_volume(volume);
            }
        }

        fn is_muted(&self) -> bool {
            self.muted
        }

        fn play_one_shot(&mut self, clip: &AudioClip) {
            if self.muted {
                return;
            }
            if let Err(err) = self.try_one_shot(clip) {
                tracing::warn!(clip = clip.name(), "one-shot playback failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_clip_has_empty_payload() {
        let clip = AudioClip::named("click");
        assert_eq!(clip.name(), "click");
        assert!(clip.bytes().is_empty());
    }

    #[test]
    fn debug_output_reports_length_not_bytes() {
        let clip = AudioClip::new("hover", vec![1u8, 2, 3]);
        let text = format!("{clip:?}");
        assert!(text.contains("hover"));
        assert!(text.contains("len: 3"));
    }
}
