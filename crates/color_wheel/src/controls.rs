use bevy::prelude::*;
use bits_helpers::restart::RestartRequested;
use leafwing_input_manager::prelude::*;

use crate::gameplay::GameState;

// Keyboard shortcuts; the wheel itself is driven by raw pointer input
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum MenuAction {
    TogglePause,
    Restart,
    ShowStats,
}

pub fn create_input_map() -> InputMap<MenuAction> {
    let mut input_map = InputMap::default();

    input_map.insert(MenuAction::TogglePause, KeyCode::Escape);
    input_map.insert(MenuAction::TogglePause, GamepadButton::Start);
    input_map.insert(MenuAction::Restart, KeyCode::KeyR);
    input_map.insert(MenuAction::ShowStats, KeyCode::F3);

    input_map
}

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<MenuAction>::default())
            .add_systems(Startup, spawn_controls)
            .add_systems(Update, (toggle_pause, request_restart));
    }
}

fn spawn_controls(mut commands: Commands) {
    commands.spawn((
        Name::new("MenuControls"),
        InputManagerBundle::<MenuAction> {
            input_map: create_input_map(),
            ..default()
        },
    ));
}

/// Pausing only makes sense mid-round; game over has its own panel.
pub const fn toggled_state(current: GameState) -> Option<GameState> {
    match current {
        GameState::Playing => Some(GameState::Paused),
        GameState::Paused => Some(GameState::Playing),
        GameState::GameOver => None,
    }
}

fn toggle_pause(
    query: Query<&ActionState<MenuAction>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for action_state in &query {
        if !action_state.just_pressed(&MenuAction::TogglePause) {
            continue;
        }
        if let Some(next) = toggled_state(*state.get()) {
            next_state.set(next);
        }
    }
}

fn request_restart(
    query: Query<&ActionState<MenuAction>>,
    mut restart: EventWriter<RestartRequested>,
) {
    if query
        .iter()
        .any(|action_state| action_state.just_pressed(&MenuAction::Restart))
    {
        restart.send(RestartRequested);
    }
}
