use bevy::prelude::*;
use bits_helpers::input::{pointer_world_sample, LastCursor, PointerPhase};
use bits_helpers::restart::{RestartPlugin, Restartable};

use crate::audio::CueQueue;
use crate::palette::WheelColor;
use crate::session::{ColorWheelSession, PointerInput, SessionEvent};
use crate::settings::{load_settings, WheelSettings};
use crate::wheel::SEGMENT_ANGLE;

pub const WHEEL_CENTER: Vec2 = Vec2::new(0.0, -60.0);
pub const WHEEL_RADIUS: f32 = 140.0;
const HUB_RADIUS: f32 = 18.0;
const POINTER_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    GameOver,
}

#[derive(Resource, Deref, DerefMut)]
pub struct WheelSession(pub ColorWheelSession<CueQueue>);

impl Restartable for WheelSession {
    fn reset(&mut self) {
        self.restart();
    }

    fn initial_state() -> GameState {
        GameState::Playing
    }

    type State = GameState;
}

#[derive(Component)]
pub struct Wheel;

#[derive(Component)]
struct WheelPointer;

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_event::<SessionEvent>()
            .add_plugins(RestartPlugin::<WheelSession>::default())
            .add_systems(PreStartup, load_settings)
            .add_systems(Startup, (setup_session, spawn_wheel))
            .add_systems(OnEnter(GameState::Paused), pause_time)
            .add_systems(OnExit(GameState::Paused), resume_time)
            .add_systems(
                Update,
                (
                    (read_pointer, tick_session, sync_wheel_transform)
                        .chain()
                        .run_if(not(in_state(GameState::Paused))),
                    forward_session_events,
                )
                    .chain(),
            );
    }
}

fn setup_session(mut commands: Commands, settings: Res<WheelSettings>, cues: Res<CueQueue>) {
    let session = ColorWheelSession::new(
        settings.clone(),
        WHEEL_CENTER,
        fastrand::Rng::new(),
        cues.clone(),
    );
    info!("Session ready, target is {}", session.round().target());
    commands.insert_resource(WheelSession(session));
}

fn spawn_wheel(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2d);

    let segment_mesh = meshes.add(CircularSector::from_degrees(WHEEL_RADIUS, SEGMENT_ANGLE));

    commands
        .spawn((
            Name::new("Wheel"),
            Wheel,
            Transform::from_translation(WHEEL_CENTER.extend(0.0)),
            Visibility::default(),
        ))
        .with_children(|wheel| {
            // Segment i sits i * 60 degrees clockwise so that rotating the wheel
            // counter-clockwise by the same amount brings it to the top.
            for (index, color) in WheelColor::wheel_layout().into_iter().enumerate() {
                let angle = -(index as f32 * SEGMENT_ANGLE).to_radians();
                wheel.spawn((
                    Name::new(format!("Segment {color}")),
                    Mesh2d(segment_mesh.clone()),
                    MeshMaterial2d(materials.add(Color::from(color))),
                    Transform::from_rotation(Quat::from_rotation_z(angle)),
                ));
            }
            wheel.spawn((
                Mesh2d(meshes.add(Circle::new(HUB_RADIUS))),
                MeshMaterial2d(materials.add(Color::srgb(0.1, 0.1, 0.1))),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        });

    commands.spawn((
        Name::new("Pointer"),
        WheelPointer,
        Mesh2d(meshes.add(Triangle2d::new(
            Vec2::new(0.0, -POINTER_SIZE),
            Vec2::new(-POINTER_SIZE * 0.75, POINTER_SIZE * 0.5),
            Vec2::new(POINTER_SIZE * 0.75, POINTER_SIZE * 0.5),
        ))),
        MeshMaterial2d(materials.add(Color::WHITE)),
        Transform::from_translation(
            (WHEEL_CENTER + Vec2::Y * (WHEEL_RADIUS + POINTER_SIZE * 0.5)).extend(1.0),
        ),
    ));
}

fn read_pointer(
    mut session: ResMut<WheelSession>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut last_cursor: Local<LastCursor>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
) {
    let Some((phase, position)) =
        pointer_world_sample(&buttons, &touches, &mut last_cursor, &windows, &camera)
    else {
        return;
    };
    session.push_input(match phase {
        PointerPhase::Pressed => PointerInput::Down(position),
        PointerPhase::Held => PointerInput::Move(position),
        PointerPhase::Released => PointerInput::Up(position),
    });
}

fn tick_session(mut session: ResMut<WheelSession>, time: Res<Time>) {
    session.tick(time.delta_secs());
}

fn sync_wheel_transform(session: Res<WheelSession>, mut wheels: Query<&mut Transform, With<Wheel>>) {
    let rotation = Quat::from_rotation_z(session.wheel().rotation_angle().to_radians());
    for mut transform in &mut wheels {
        transform.rotation = rotation;
    }
}

fn forward_session_events(
    mut session: ResMut<WheelSession>,
    mut writer: EventWriter<SessionEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for event in session.drain_events() {
        if let SessionEvent::GameOver { final_score } = event {
            info!("Game over with {final_score} points");
            next_state.set(GameState::GameOver);
        }
        writer.send(event);
    }
}

fn pause_time(mut time: ResMut<Time<Virtual>>) {
    info!("Paused");
    time.pause();
}

fn resume_time(mut time: ResMut<Time<Virtual>>) {
    info!("Resumed");
    time.unpause();
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;
    use bits_helpers::restart::RestartRequested;

    use super::*;
    use crate::round::RoundPhase;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_resource::<CueQueue>()
            .init_state::<GameState>()
            .add_event::<SessionEvent>()
            .add_plugins(RestartPlugin::<WheelSession>::default())
            .add_systems(Update, forward_session_events);
        let session = ColorWheelSession::new(
            WheelSettings::default(),
            WHEEL_CENTER,
            fastrand::Rng::with_seed(11),
            CueQueue::default(),
        );
        app.insert_resource(WheelSession(session));
        app
    }

    fn received(app: &App) -> Vec<SessionEvent> {
        let events = app.world().resource::<Events<SessionEvent>>();
        events.get_cursor().read(events).cloned().collect()
    }

    #[test]
    fn opening_announcements_reach_the_event_queue() {
        let mut app = app();
        app.update();
        let events = received(&app);
        assert!(events.contains(&SessionEvent::ScoreChanged(0)), "got {events:?}");
        assert!(events.contains(&SessionEvent::LevelChanged(1)), "got {events:?}");
    }

    #[test]
    fn restart_request_resets_the_session_and_state() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::GameOver);
        app.update();
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::GameOver
        );

        app.world_mut().send_event(RestartRequested);
        app.update();
        app.update();

        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Playing
        );
        let session = app.world().resource::<WheelSession>();
        assert_eq!(session.round().phase(), RoundPhase::Active);
        assert!(session.input_enabled(), "restart re-enables input");
    }
}
