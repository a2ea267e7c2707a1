mod panels;
mod tween;

use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;

use crate::session::SessionEvent;
use panels::{spawn_button, MenuButton, MenuCommand, Panel, PanelKind, PanelsPlugin};
use tween::{progress, pulse_scale, sine_pulse, PULSE_PEAK, PULSE_SECONDS};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanelsPlugin)
            .add_systems(Startup, setup)
            .add_systems(Update, (update_hud, animate_pulses).chain());
    }
}

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct LevelText;

#[derive(Component)]
struct TargetText;

#[derive(Component)]
struct TargetSwatch;

/// Scale pulse, restarted whenever the value it decorates changes.
#[derive(Component, Debug)]
struct Pulse {
    elapsed: f32,
    smooth: bool,
}

impl Pulse {
    const fn idle(smooth: bool) -> Self {
        Self {
            elapsed: PULSE_SECONDS,
            smooth,
        }
    }

    const fn restart(&mut self) {
        self.elapsed = 0.0;
    }
}

fn hud_text(text: &str, font_size: f32, color: Color) -> impl Bundle + use<> {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

fn setup(mut commands: Commands) {
    commands
        .spawn((
            Name::new("GameplayPanel"),
            // Initial state transitions run before Startup, so the HUD can't
            // wait for `OnEnter(GameState::Playing)` the first time.
            Panel::shown(PanelKind::Gameplay),
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(16.0)),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            Visibility::Inherited,
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|column| {
                    column.spawn((
                        ScoreText,
                        Pulse::idle(false),
                        hud_text("Score: 0", 34.0, GOLD.into()),
                    ));
                    column.spawn((LevelText, hud_text("Level: 1", 24.0, Color::WHITE)));
                    column
                        .spawn(Node {
                            flex_direction: FlexDirection::Row,
                            align_items: AlignItems::Center,
                            column_gap: Val::Px(8.0),
                            ..default()
                        })
                        .with_children(|row| {
                            row.spawn((TargetText, hud_text("Target:", 24.0, Color::WHITE)));
                            row.spawn((
                                TargetSwatch,
                                Pulse::idle(true),
                                Node {
                                    width: Val::Px(28.0),
                                    height: Val::Px(28.0),
                                    ..default()
                                },
                                BorderRadius::all(Val::Px(6.0)),
                                BackgroundColor(Color::WHITE),
                            ));
                        });
                });

            spawn_button(
                parent,
                "II",
                MenuButton {
                    panel: PanelKind::Gameplay,
                    command: MenuCommand::Pause,
                },
                48.0,
            );
        });
}

fn update_hud(
    mut events: EventReader<SessionEvent>,
    mut score_text: Query<
        (&mut Text, &mut Pulse),
        (With<ScoreText>, Without<LevelText>, Without<TargetText>),
    >,
    mut level_text: Query<&mut Text, (With<LevelText>, Without<ScoreText>, Without<TargetText>)>,
    mut target_text: Query<&mut Text, (With<TargetText>, Without<ScoreText>, Without<LevelText>)>,
    mut swatch: Query<(&mut BackgroundColor, &mut Pulse), (With<TargetSwatch>, Without<ScoreText>)>,
) {
    for event in events.read() {
        match event {
            SessionEvent::ScoreChanged(score) => {
                for (mut text, mut pulse) in &mut score_text {
                    text.0 = format!("Score: {score}");
                    pulse.restart();
                }
            }
            SessionEvent::LevelChanged(level) => {
                for mut text in &mut level_text {
                    text.0 = format!("Level: {level}");
                }
            }
            SessionEvent::TargetColorChanged { name, color } => {
                for mut text in &mut target_text {
                    text.0 = format!("Target: {name}");
                }
                for (mut background, mut pulse) in &mut swatch {
                    // Keep whatever alpha the panel fade has applied.
                    let alpha = background.0.alpha();
                    background.0 = Color::from(*color).with_alpha(alpha);
                    pulse.restart();
                }
            }
            SessionEvent::Spun { .. }
            | SessionEvent::Stopped { .. }
            | SessionEvent::GameOver { .. } => {}
        }
    }
}

fn animate_pulses(time: Res<Time<Real>>, mut pulses: Query<(&mut Pulse, &mut Transform)>) {
    for (mut pulse, mut transform) in &mut pulses {
        if pulse.elapsed >= PULSE_SECONDS {
            continue;
        }
        pulse.elapsed += time.delta_secs();
        let t = progress(pulse.elapsed, PULSE_SECONDS);
        let scale = if pulse.smooth {
            sine_pulse(t, PULSE_PEAK)
        } else {
            pulse_scale(t, PULSE_PEAK)
        };
        transform.scale = Vec3::splat(scale);
    }
}
