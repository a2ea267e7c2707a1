//! Battery and frame-rate tuning for phones: frame limiting, slower frames
//! while unfocused, pausing in the background and a one-way quality downgrade
//! when frames run long.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow, WindowFocused};
use bevy_framepace::{FramepaceSettings, Limiter};
use leafwing_input_manager::prelude::ActionState;

use crate::controls::MenuAction;
use crate::gameplay::GameState;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PerformanceSettings {
    pub target_frame_rate: f64,
    pub limit_frame_rate: bool,
    pub enable_vsync: bool,
    pub reduce_fps_when_inactive: bool,
    pub inactive_frame_rate: f64,
    pub pause_when_in_background: bool,
    pub enable_anti_aliasing: bool,
    /// Smoothed frame time, in milliseconds, above which quality is lowered.
    pub low_performance_frame_ms: f64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            target_frame_rate: 60.0,
            limit_frame_rate: true,
            enable_vsync: false,
            reduce_fps_when_inactive: true,
            inactive_frame_rate: 30.0,
            pause_when_in_background: true,
            enable_anti_aliasing: false,
            low_performance_frame_ms: 1000.0 / 30.0,
        }
    }
}

impl PerformanceSettings {
    /// Frame cap for the current focus, `None` when uncapped.
    pub fn frame_rate_cap(&self, focused: bool) -> Option<f64> {
        if self.reduce_fps_when_inactive && !focused {
            Some(self.inactive_frame_rate)
        } else if self.limit_frame_rate {
            Some(self.target_frame_rate)
        } else {
            None
        }
    }

    pub fn limiter(&self, focused: bool) -> Limiter {
        self.frame_rate_cap(focused)
            .map_or(Limiter::Off, Limiter::from_framerate)
    }

    pub const fn msaa(&self) -> Msaa {
        if self.enable_anti_aliasing {
            Msaa::Sample2
        } else {
            Msaa::Off
        }
    }
}

/// Sent whenever the primary window gains or loses focus.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppFocusChanged {
    pub focused: bool,
    pub pause_audio: bool,
}

#[derive(Resource, Debug, Default)]
struct QualityState {
    downgraded: bool,
}

pub struct MobileOptimizerPlugin;

impl Plugin for MobileOptimizerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin)
            .init_resource::<PerformanceSettings>()
            .init_resource::<QualityState>()
            .add_event::<AppFocusChanged>()
            .add_systems(PostStartup, apply_mobile_optimizations)
            .add_systems(
                Update,
                (
                    track_focus,
                    detect_low_performance,
                    log_stats_on_request,
                ),
            );
    }
}

fn apply_mobile_optimizations(
    settings: Res<PerformanceSettings>,
    mut framepace: ResMut<FramepaceSettings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut Msaa, With<Camera>>,
) {
    framepace.limiter = settings.limiter(true);

    for mut window in &mut windows {
        window.present_mode = if settings.enable_vsync {
            PresentMode::AutoVsync
        } else {
            PresentMode::AutoNoVsync
        };
    }

    for mut msaa in &mut cameras {
        *msaa = settings.msaa();
    }

    info!("Mobile optimizer: performance settings applied");
}

fn track_focus(
    mut focus_events: EventReader<WindowFocused>,
    settings: Res<PerformanceSettings>,
    state: Res<State<GameState>>,
    mut framepace: ResMut<FramepaceSettings>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut focus_changed: EventWriter<AppFocusChanged>,
) {
    let Some(event) = focus_events.read().last() else {
        return;
    };
    let focused = event.focused;

    framepace.limiter = settings.limiter(focused);

    if settings.pause_when_in_background {
        if !focused {
            virtual_time.pause();
        } else if *state.get() != GameState::Paused {
            // The pause menu owns the clock while it is open.
            virtual_time.unpause();
        }
    }

    focus_changed.send(AppFocusChanged {
        focused,
        pause_audio: settings.pause_when_in_background,
    });
    info!("Mobile optimizer: application focus changed to {focused}");
}

fn smoothed_frame_ms(diagnostics: &DiagnosticsStore) -> Option<f64> {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
}

fn detect_low_performance(
    diagnostics: Res<DiagnosticsStore>,
    settings: Res<PerformanceSettings>,
    virtual_time: Res<Time<Virtual>>,
    mut quality: ResMut<QualityState>,
    mut cameras: Query<&mut Msaa, With<Camera>>,
) {
    if quality.downgraded || virtual_time.is_paused() {
        return;
    }
    let Some(frame_ms) = smoothed_frame_ms(&diagnostics) else {
        return;
    };
    if frame_ms <= settings.low_performance_frame_ms {
        return;
    }

    quality.downgraded = true;
    for mut msaa in &mut cameras {
        if *msaa != Msaa::Off {
            *msaa = Msaa::Off;
            info!("Mobile optimizer: disabled anti-aliasing due to low performance");
        }
    }
    warn!("Mobile optimizer: frames averaging {frame_ms:.1}ms, quality lowered");
}

/// Human-readable frame stats.
pub fn performance_stats(frame_ms: f64, msaa: Msaa) -> String {
    let fps = if frame_ms > 0.0 { 1000.0 / frame_ms } else { 0.0 };
    format!(
        "FPS: {fps:.1}\nFrame Time: {frame_ms:.1}ms\nAnti-Aliasing: {}x",
        msaa.samples()
    )
}

fn log_stats_on_request(
    actions: Query<&ActionState<MenuAction>>,
    diagnostics: Res<DiagnosticsStore>,
    cameras: Query<&Msaa, With<Camera>>,
) {
    if !actions
        .iter()
        .any(|action_state| action_state.just_pressed(&MenuAction::ShowStats))
    {
        return;
    }
    let frame_ms = smoothed_frame_ms(&diagnostics).unwrap_or_default();
    let msaa = cameras.iter().next().copied().unwrap_or(Msaa::Off);
    info!("{}", performance_stats(frame_ms, msaa));
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use bevy::state::app::StatesPlugin;

    use super::*;

    fn focus_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<GameState>()
            .add_event::<WindowFocused>()
            .add_event::<AppFocusChanged>()
            .insert_resource(FramepaceSettings::default())
            .init_resource::<PerformanceSettings>()
            .add_systems(Update, track_focus);
        app.update();
        app
    }

    fn send_focus(app: &mut App, focused: bool) {
        app.world_mut().send_event(WindowFocused {
            window: Entity::PLACEHOLDER,
            focused,
        });
        app.update();
    }

    fn capped_at(limiter: &Limiter, fps: f64) -> bool {
        matches!(limiter, Limiter::Manual(frame) if *frame == Duration::from_secs_f64(1.0 / fps))
    }

    #[test]
    fn losing_focus_pauses_time_and_slows_frames() {
        let mut app = focus_app();
        send_focus(&mut app, false);

        assert!(
            app.world().resource::<Time<Virtual>>().is_paused(),
            "virtual time stops in the background"
        );
        let limiter = &app.world().resource::<FramepaceSettings>().limiter;
        assert!(capped_at(limiter, 30.0), "background cap is 30 fps, got {limiter}");

        let events = app.world().resource::<Events<AppFocusChanged>>();
        let sent = events.get_cursor().read(events).copied().collect::<Vec<_>>();
        assert_eq!(
            sent,
            vec![AppFocusChanged {
                focused: false,
                pause_audio: true
            }],
            "audio is told to pause"
        );

        send_focus(&mut app, true);
        assert!(
            !app.world().resource::<Time<Virtual>>().is_paused(),
            "refocusing a running game resumes it"
        );
        let limiter = &app.world().resource::<FramepaceSettings>().limiter;
        assert!(capped_at(limiter, 60.0), "foreground cap is 60 fps, got {limiter}");
    }

    #[test]
    fn refocusing_keeps_a_player_pause() {
        let mut app = focus_app();
        send_focus(&mut app, false);

        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::Paused);
        app.update();
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Paused,
            "pause menu is open"
        );

        send_focus(&mut app, true);
        assert!(
            app.world().resource::<Time<Virtual>>().is_paused(),
            "the pause menu still owns the clock"
        );
    }

    #[test]
    fn background_pausing_can_be_turned_off() {
        let mut app = focus_app();
        app.insert_resource(PerformanceSettings {
            pause_when_in_background: false,
            ..default()
        });
        send_focus(&mut app, false);
        assert!(
            !app.world().resource::<Time<Virtual>>().is_paused(),
            "time keeps running"
        );
    }

    #[test]
    fn unfocused_app_runs_at_the_inactive_rate() {
        let settings = PerformanceSettings::default();
        assert_eq!(settings.frame_rate_cap(true), Some(60.0));
        assert_eq!(settings.frame_rate_cap(false), Some(30.0));
    }

    #[test]
    fn uncapped_when_limiting_is_off() {
        let settings = PerformanceSettings {
            limit_frame_rate: false,
            reduce_fps_when_inactive: false,
            ..default()
        };
        assert_eq!(settings.frame_rate_cap(true), None);
        assert_eq!(settings.frame_rate_cap(false), None);
        assert!(matches!(settings.limiter(true), Limiter::Off), "no cap, no limiter");
    }

    #[test]
    fn anti_aliasing_toggles_msaa() {
        let mut settings = PerformanceSettings::default();
        assert_eq!(settings.msaa(), Msaa::Off);
        settings.enable_anti_aliasing = true;
        assert_eq!(settings.msaa(), Msaa::Sample2);
    }

    #[test]
    fn stats_report_fps_from_frame_time() {
        let stats = performance_stats(20.0, Msaa::Sample2);
        assert!(stats.starts_with("FPS: 50.0"), "got {stats}");
        assert!(stats.contains("Frame Time: 20.0ms"), "got {stats}");
        assert!(stats.ends_with("Anti-Aliasing: 2x"), "got {stats}");
    }
}
