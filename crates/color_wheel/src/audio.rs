use std::sync::Arc;

use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::{AudioApp, AudioChannel, AudioControl, AudioPlugin};
use parking_lot::Mutex;

use crate::performance::AppFocusChanged;
use crate::session::{AudioService, SoundCue};

pub const DEFAULT_SFX_VOLUME: f32 = 0.7;
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.3;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
enum AssetState {
    #[default]
    Loading,
    Loaded,
    /// A track is missing or unreadable. The game carries on silently.
    Failed,
}

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/wheel_spin.ogg")]
    wheel_spin: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/correct_match.ogg")]
    correct_match: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/wrong_match.ogg")]
    wrong_match: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/game_over.ogg")]
    game_over: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/background_music.ogg")]
    music: Handle<bevy_kira_audio::prelude::AudioSource>,
}

impl AudioAssets {
    fn cue(&self, cue: SoundCue) -> Handle<bevy_kira_audio::prelude::AudioSource> {
        match cue {
            SoundCue::WheelSpin => self.wheel_spin.clone_weak(),
            SoundCue::CorrectMatch => self.correct_match.clone_weak(),
            SoundCue::WrongMatch => self.wrong_match.clone_weak(),
            SoundCue::GameOver => self.game_over.clone_weak(),
        }
    }
}

#[derive(Resource)]
pub struct SfxChannel;

#[derive(Resource)]
pub struct MusicChannel;

/// Cues requested by the session, drained once per frame by the audio plugin.
#[derive(Resource, Clone, Default)]
pub struct CueQueue(Arc<Mutex<Vec<SoundCue>>>);

impl CueQueue {
    pub fn drain(&self) -> Vec<SoundCue> {
        self.0.lock().drain(..).collect()
    }
}

impl AudioService for CueQueue {
    fn play(&self, cue: SoundCue) {
        self.0.lock().push(cue);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeChannel {
    Sfx,
    Music,
}

/// Per-channel volume, always within `[0, 1]`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AudioVolumes {
    sfx: f32,
    music: f32,
}

impl Default for AudioVolumes {
    fn default() -> Self {
        Self {
            sfx: DEFAULT_SFX_VOLUME,
            music: DEFAULT_MUSIC_VOLUME,
        }
    }
}

impl AudioVolumes {
    pub const fn get(&self, channel: VolumeChannel) -> f32 {
        match channel {
            VolumeChannel::Sfx => self.sfx,
            VolumeChannel::Music => self.music,
        }
    }

    pub fn set(&mut self, channel: VolumeChannel, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        match channel {
            VolumeChannel::Sfx => self.sfx = volume,
            VolumeChannel::Music => self.music = volume,
        }
    }

    pub fn adjust(&mut self, channel: VolumeChannel, step: f32) {
        self.set(channel, self.get(channel) + step);
    }
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .add_audio_channel::<SfxChannel>()
            .add_audio_channel::<MusicChannel>()
            .init_resource::<CueQueue>()
            .init_resource::<AudioVolumes>()
            .init_state::<AssetState>()
            .add_loading_state(
                LoadingState::new(AssetState::Loading)
                    .continue_to_state(AssetState::Loaded)
                    .on_failure_continue_to_state(AssetState::Failed)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(OnEnter(AssetState::Loaded), start_music)
            .add_systems(OnEnter(AssetState::Failed), report_missing_audio)
            .add_systems(
                Update,
                (play_cues, apply_volumes, pause_in_background),
            );
    }
}

fn start_music(audio_assets: Res<AudioAssets>, music: Res<AudioChannel<MusicChannel>>) {
    info!("Audio loaded, starting music");
    music.play(audio_assets.music.clone_weak()).looped();
}

fn report_missing_audio() {
    warn!("Audio assets failed to load, sound is disabled");
}

/// Cues requested before the assets finish loading, or after they failed to,
/// are dropped.
fn play_cues(
    queue: Res<CueQueue>,
    audio_assets: Option<Res<AudioAssets>>,
    sfx: Res<AudioChannel<SfxChannel>>,
) {
    let cues = queue.drain();
    let Some(audio_assets) = audio_assets else {
        return;
    };
    for cue in cues {
        sfx.play(audio_assets.cue(cue));
    }
}

fn apply_volumes(
    volumes: Res<AudioVolumes>,
    sfx: Res<AudioChannel<SfxChannel>>,
    music: Res<AudioChannel<MusicChannel>>,
) {
    if !volumes.is_changed() {
        return;
    }
    sfx.set_volume(f64::from(volumes.get(VolumeChannel::Sfx)));
    music.set_volume(f64::from(volumes.get(VolumeChannel::Music)));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackgroundAudio {
    Pause,
    Resume,
}

impl BackgroundAudio {
    const fn for_focus(event: &AppFocusChanged) -> Option<Self> {
        match (event.pause_audio, event.focused) {
            (false, _) => None,
            (true, true) => Some(Self::Resume),
            (true, false) => Some(Self::Pause),
        }
    }
}

fn pause_in_background(
    mut focus_events: EventReader<AppFocusChanged>,
    sfx: Res<AudioChannel<SfxChannel>>,
    music: Res<AudioChannel<MusicChannel>>,
) {
    let Some(event) = focus_events.read().last() else {
        return;
    };
    match BackgroundAudio::for_focus(event) {
        Some(BackgroundAudio::Resume) => {
            sfx.resume();
            music.resume();
        }
        Some(BackgroundAudio::Pause) => {
            sfx.pause();
            music.pause();
        }
        None => {}
    }
}
