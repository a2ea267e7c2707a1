use std::fs;
use std::path::{Path, PathBuf};

use bevy::asset::io::file::FileAssetReader;
use bevy::prelude::*;
use thiserror::Error;

use crate::session::SessionEvent;

/// Overrides the directory the high score is written to.
pub const DATA_DIR_ENV: &str = "COLOR_WHEEL_DATA_DIR";
/// Default data directory, beside `assets/` under the asset base path.
const DEFAULT_DATA_DIR: &str = "save";
const HIGH_SCORE_FILE: &str = "high_score.ron";

#[derive(Error, Debug)]
pub enum HighScoreError {
    #[error("High score file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse high score: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize high score: {0}")]
    Serialize(#[from] ron::Error),
}

/// Resolved like the asset folder (`BEVY_ASSET_ROOT`, then
/// `CARGO_MANIFEST_DIR`, then the executable's folder), so the save does not
/// move with the working directory.
pub fn default_data_dir() -> PathBuf {
    FileAssetReader::get_base_path().join(DEFAULT_DATA_DIR)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HIGH_SCORE_FILE),
        }
    }

    /// `COLOR_WHEEL_DATA_DIR` when set, otherwise [`default_data_dir`].
    pub fn from_env() -> Self {
        std::env::var_os(DATA_DIR_ENV).map_or_else(|| Self::new(default_data_dir()), Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A store that was never written reads as zero.
    pub fn load(&self) -> Result<u32, HighScoreError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(ron::from_str(&data)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, best: u32) -> Result<(), HighScoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = ron::ser::to_string_pretty(&best, ron::ser::PrettyConfig::default())?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Deref)]
pub struct HighScore(u32);

impl HighScore {
    /// Keeps `score` if it beats the current best.
    pub fn submit(&mut self, score: u32) -> bool {
        if score > self.0 {
            self.0 = score;
            true
        } else {
            false
        }
    }
}

#[derive(Resource, Deref)]
struct Store(HighScoreStore);

pub struct HighScorePlugin;

impl Plugin for HighScorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Store(HighScoreStore::from_env()))
            .init_resource::<HighScore>()
            .add_systems(Startup, load_high_score)
            .add_systems(Update, record_high_score);
    }
}

fn load_high_score(store: Res<Store>, mut high_score: ResMut<HighScore>) {
    match store.load() {
        Ok(best) => {
            info!("High score {best} loaded from {:?}", store.path());
            *high_score = HighScore(best);
        }
        Err(err) => {
            warn!("{err}, starting from a high score of 0");
            *high_score = HighScore::default();
        }
    }
}

fn record_high_score(
    mut events: EventReader<SessionEvent>,
    store: Res<Store>,
    mut high_score: ResMut<HighScore>,
) {
    for event in events.read() {
        let SessionEvent::GameOver { final_score } = event else {
            continue;
        };
        if !high_score.submit(*final_score) {
            continue;
        }
        match store.save(**high_score) {
            Ok(()) => info!("New high score {final_score}"),
            Err(err) => error!("Could not save high score: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    /// The directory is removed when the returned guard drops.
    fn temp_store() -> (TempDir, HighScoreStore) {
        let created = tempfile::tempdir();
        let Ok(dir) = created else {
            panic!("could not create a temp dir: {created:?}");
        };
        let store = HighScoreStore::new(dir.path().join("save"));
        (dir, store)
    }

    #[test]
    fn default_dir_does_not_follow_the_working_directory() {
        let dir = default_data_dir();
        assert!(dir.ends_with(DEFAULT_DATA_DIR), "got {}", dir.display());
        if std::env::var_os("BEVY_ASSET_ROOT").is_none() {
            assert!(dir.is_absolute(), "got {}", dir.display());
            assert_eq!(
                dir,
                Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_DATA_DIR),
                "save sits beside the crate assets"
            );
        }
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load().ok(), Some(0));
    }

    #[test]
    fn saved_score_loads_back() {
        let (_dir, store) = temp_store();
        assert!(store.save(120).is_ok(), "save into a fresh directory");
        assert_eq!(store.load().ok(), Some(120));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let (_dir, store) = temp_store();
        assert!(store.save(5).is_ok(), "seed the file");
        assert!(fs::write(store.path(), "not a number").is_ok(), "overwrite the file");
        assert!(matches!(store.load(), Err(HighScoreError::Parse(_))), "garbage must not load");
    }

    #[test]
    fn only_better_scores_are_kept() {
        let mut best = HighScore::default();
        assert!(best.submit(40), "first score beats zero");
        assert!(!best.submit(40), "a tie is not a new best");
        assert!(!best.submit(10), "lower scores are ignored");
        assert_eq!(*best, 40);
    }

    #[test]
    fn game_over_saves_only_when_exceeded() {
        let (_dir, store) = temp_store();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<SessionEvent>()
            .insert_resource(Store(store.clone()))
            .insert_resource(HighScore(50))
            .add_systems(Update, record_high_score);

        app.world_mut()
            .send_event(SessionEvent::GameOver { final_score: 30 });
        app.update();
        assert_eq!(store.load().ok(), Some(0), "a lower score is not written");

        app.world_mut()
            .send_event(SessionEvent::GameOver { final_score: 70 });
        app.update();
        assert_eq!(store.load().ok(), Some(70));
        assert_eq!(**app.world().resource::<HighScore>(), 70);
    }
}
