use std::io::Cursor;
use std::sync::Arc;

use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, PlayError, Sink, Source, StreamError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::assets::{AssetRegistry, SoundClip, SoundHandle, TrackHandle};

pub const MAX_VOLUME: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    PlaySound {
        sound: SoundHandle,
        volume: f32,
    },
    PlayMusic {
        track: TrackHandle,
        looping: bool,
        volume: f32,
    },
    StopMusic,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Output(#[from] StreamError),
    #[error("failed to open audio sink: {0}")]
    Sink(#[from] PlayError),
    #[error("failed to decode sound '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: DecoderError,
    },
}

/// Receives the cues collected during a frame.
pub trait AudioBackend {
    fn submit(&mut self, cue: AudioCue, master_volume: f32, assets: &AssetRegistry);
}

/// Fire-and-forget cue queue. Scenes push, the loop drains once per frame.
#[derive(Debug, Clone)]
pub struct AudioBus {
    master_volume: f32,
    cues: Vec<AudioCue>,
}

impl Default for AudioBus {
    fn default() -> Self {
        Self {
            master_volume: MAX_VOLUME,
            cues: Vec::new(),
        }
    }
}

impl AudioBus {
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = clamp_volume(volume);
    }

    pub fn play_sound(&mut self, sound: SoundHandle) {
        self.play_sound_at(sound, MAX_VOLUME);
    }

    pub fn play_sound_at(&mut self, sound: SoundHandle, volume: f32) {
        self.cues.push(AudioCue::PlaySound {
            sound,
            volume: clamp_volume(volume),
        });
    }

    pub fn play_music(&mut self, track: TrackHandle, looping: bool) {
        self.play_music_at(track, looping, MAX_VOLUME);
    }

    pub fn play_music_at(&mut self, track: TrackHandle, looping: bool, volume: f32) {
        self.cues.push(AudioCue::PlayMusic {
            track,
            looping,
            volume: clamp_volume(volume),
        });
    }

    pub fn stop_music(&mut self) {
        self.cues.push(AudioCue::StopMusic);
    }

    pub fn pending(&self) -> &[AudioCue] {
        &self.cues
    }

    pub fn drain_into(&mut self, backend: &mut dyn AudioBackend, assets: &AssetRegistry) {
        for cue in self.cues.drain(..) {
            backend.submit(cue, self.master_volume, assets);
        }
    }
}

/// Linear gain in `0.0..=1.0` for a cue volume scaled by the master volume.
pub fn gain(volume: f32, master_volume: f32) -> f32 {
    (clamp_volume(volume) / MAX_VOLUME) * (clamp_volume(master_volume) / MAX_VOLUME)
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, MAX_VOLUME)
    } else {
        0.0
    }
}

/// Backend that records cues as log events instead of mixing them.
#[derive(Debug, Default)]
pub struct TracingAudioBackend {
    music_playing: Option<String>,
}

impl TracingAudioBackend {
    pub fn music_playing(&self) -> Option<&str> {
        self.music_playing.as_deref()
    }
}

impl AudioBackend for TracingAudioBackend {
    fn submit(&mut self, cue: AudioCue, master_volume: f32, assets: &AssetRegistry) {
        match cue {
            AudioCue::PlaySound { sound, volume } => match assets.sound_clip(sound) {
                Some(clip) => debug!(
                    sound = clip.id(),
                    gain = gain(volume, master_volume),
                    "audio_play_sound"
                ),
                None => warn!(?sound, "audio_sound_handle_unknown"),
            },
            AudioCue::PlayMusic {
                track,
                looping,
                volume,
            } => match assets.track_clip(track) {
                Some(clip) => {
                    debug!(
                        track = clip.id(),
                        looping,
                        gain = gain(volume, master_volume),
                        "audio_play_music"
                    );
                    self.music_playing = Some(clip.id().to_string());
                }
                None => warn!(?track, "audio_track_handle_unknown"),
            },
            AudioCue::StopMusic => {
                if let Some(track) = self.music_playing.take() {
                    debug!(track = track.as_str(), "audio_stop_music");
                }
            }
        }
    }
}

type ClipDecoder = Decoder<Cursor<Arc<[u8]>>>;

fn decode_clip(clip: &SoundClip) -> Result<ClipDecoder, AudioError> {
    Decoder::new(Cursor::new(clip.data())).map_err(|source| AudioError::Decode {
        id: clip.id().to_string(),
        source,
    })
}

/// Plays cues on the default output device. The stream must stay alive
/// for as long as anything is playing.
pub struct RodioAudioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Option<(String, Sink)>,
}

impl RodioAudioBackend {
    pub fn try_default() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            music: None,
        })
    }

    fn start(&self, clip: &SoundClip, gain: f32, looping: bool) -> Result<Sink, AudioError> {
        let source = decode_clip(clip)?;
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(gain);
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        Ok(sink)
    }

    fn stop_music(&mut self) {
        if let Some((track, sink)) = self.music.take() {
            sink.stop();
            debug!(track = track.as_str(), "audio_stop_music");
        }
    }
}

impl AudioBackend for RodioAudioBackend {
    fn submit(&mut self, cue: AudioCue, master_volume: f32, assets: &AssetRegistry) {
        match cue {
            AudioCue::PlaySound { sound, volume } => {
                let Some(clip) = assets.sound_clip(sound) else {
                    warn!(?sound, "audio_sound_handle_unknown");
                    return;
                };
                match self.start(clip, gain(volume, master_volume), false) {
                    Ok(sink) => sink.detach(),
                    Err(error) => warn!(sound = clip.id(), error = %error, "audio_play_failed"),
                }
            }
            AudioCue::PlayMusic {
                track,
                looping,
                volume,
            } => {
                let Some(clip) = assets.track_clip(track) else {
                    warn!(?track, "audio_track_handle_unknown");
                    return;
                };
                self.stop_music();
                match self.start(clip, gain(volume, master_volume), looping) {
                    Ok(sink) => {
                        debug!(track = clip.id(), looping, "audio_play_music");
                        self.music = Some((clip.id().to_string(), sink));
                    }
                    Err(error) => warn!(track = clip.id(), error = %error, "audio_play_failed"),
                }
            }
            AudioCue::StopMusic => self.stop_music(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[derive(Default)]
    struct RecordingBackend {
        received: Vec<(AudioCue, f32)>,
    }

    impl AudioBackend for RecordingBackend {
        fn submit(&mut self, cue: AudioCue, master_volume: f32, _assets: &AssetRegistry) {
            self.received.push((cue, master_volume));
        }
    }

    #[test]
    fn master_volume_is_clamped() {
        let mut bus = AudioBus::default();
        bus.set_master_volume(150.0);
        assert_eq!(bus.master_volume(), 100.0);
        bus.set_master_volume(-3.0);
        assert_eq!(bus.master_volume(), 0.0);
        bus.set_master_volume(f32::NAN);
        assert_eq!(bus.master_volume(), 0.0);
        bus.set_master_volume(40.0);
        assert_eq!(bus.master_volume(), 40.0);
    }

    #[test]
    fn drain_delivers_cues_in_order_and_empties_queue() {
        let mut assets = AssetRegistry::default();
        let ding = assets.insert_sound("ding", SoundClip::silent("ding"));
        let track = assets.insert_track("ambience", SoundClip::silent("ambience"));
        let mut bus = AudioBus::default();
        bus.set_master_volume(50.0);
        bus.play_music(track, true);
        bus.play_sound(ding);
        bus.stop_music();

        let mut backend = RecordingBackend::default();
        bus.drain_into(&mut backend, &assets);

        assert!(bus.pending().is_empty());
        let cues: Vec<AudioCue> = backend.received.iter().map(|(cue, _)| *cue).collect();
        assert_eq!(
            cues,
            vec![
                AudioCue::PlayMusic {
                    track,
                    looping: true,
                    volume: 100.0
                },
                AudioCue::PlaySound {
                    sound: ding,
                    volume: 100.0
                },
                AudioCue::StopMusic,
            ]
        );
        assert!(backend.received.iter().all(|(_, master)| *master == 50.0));
    }

    #[test]
    fn music_volume_is_clamped_like_sounds() {
        let mut assets = AssetRegistry::default();
        let track = assets.insert_track("ambience", SoundClip::silent("ambience"));
        let mut bus = AudioBus::default();
        bus.play_music_at(track, true, 35.0);
        bus.play_music_at(track, false, 240.0);

        assert_eq!(
            bus.pending(),
            &[
                AudioCue::PlayMusic {
                    track,
                    looping: true,
                    volume: 35.0
                },
                AudioCue::PlayMusic {
                    track,
                    looping: false,
                    volume: 100.0
                },
            ]
        );
    }

    #[test]
    fn gain_scales_cue_by_master_volume() {
        assert_eq!(gain(100.0, 100.0), 1.0);
        assert!((gain(35.0, 100.0) - 0.35).abs() < 1e-6);
        assert!((gain(60.0, 50.0) - 0.3).abs() < 1e-6);
        assert_eq!(gain(250.0, 100.0), 1.0);
        assert_eq!(gain(80.0, 0.0), 0.0);
    }

    #[test]
    fn shipped_wave_decodes_for_playback() {
        let bytes = include_bytes!("../../../assets/sounds/step.wav");
        let clip =
            SoundClip::from_wav_bytes("step", Path::new("sounds/step.wav"), bytes).expect("wave");

        let decoder = decode_clip(&clip).expect("decode");
        assert_eq!(decoder.channels(), 1);
        assert_eq!(decoder.sample_rate(), 22050);
    }

    #[test]
    fn empty_clip_fails_to_decode() {
        let error = decode_clip(&SoundClip::silent("ding")).err().expect("nothing to decode");
        assert!(matches!(error, AudioError::Decode { ref id, .. } if id == "ding"));
    }

    #[test]
    fn tracing_backend_tracks_current_music() {
        let mut assets = AssetRegistry::default();
        let track = assets.insert_track("ambience", SoundClip::silent("ambience"));
        let mut backend = TracingAudioBackend::default();

        backend.submit(
            AudioCue::PlayMusic {
                track,
                looping: true,
                volume: 100.0,
            },
            100.0,
            &assets,
        );
        assert_eq!(backend.music_playing(), Some("ambience"));

        backend.submit(AudioCue::StopMusic, 100.0, &assets);
        assert_eq!(backend.music_playing(), None);
    }
}
