//! A color-matching wheel game.
//!
//! The core (`palette`, `wheel`, `round`, `gesture`, `session`) has no engine
//! state and is driven by explicit ticks; the rest is the Bevy shell around it.

pub mod gesture;
pub mod palette;
pub mod round;
pub mod session;
pub mod settings;
pub mod wheel;

mod audio;
mod controls;
mod gameplay;
mod high_score;
mod performance;
mod ui;

pub fn run() {
    bits_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(audio::GameAudioPlugin)
        .add_plugins(gameplay::GameplayPlugin)
        .add_plugins(controls::ControlsPlugin)
        .add_plugins(high_score::HighScorePlugin)
        .add_plugins(performance::MobileOptimizerPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
