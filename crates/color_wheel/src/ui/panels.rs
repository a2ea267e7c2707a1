use core::iter;

use bevy::prelude::*;
use bits_helpers::restart::RestartRequested;

use super::tween::{
    ease_out_bounce, fade_alpha, progress, BOUNCE_SECONDS, FADE_IN_SECONDS, FADE_OUT_SECONDS,
};
use crate::audio::{AudioVolumes, VolumeChannel};
use crate::gameplay::{GameState, WheelSession};
use crate::high_score::HighScore;

const VOLUME_STEP: f32 = 0.1;
const OVERLAY_ALPHA: f32 = 0.6;
const BUTTON_COLOR: Color = Color::srgb(0.15, 0.15, 0.15);
const CARD_COLOR: Color = Color::srgb(0.22, 0.22, 0.26);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Gameplay,
    GameOver,
    Pause,
}

/// Alpha and input gating for one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelFade {
    fading_in: bool,
    elapsed: f32,
    from: f32,
    alpha: f32,
}

impl Default for PanelFade {
    fn default() -> Self {
        Self {
            fading_in: false,
            elapsed: FADE_OUT_SECONDS,
            from: 0.0,
            alpha: 0.0,
        }
    }
}

impl PanelFade {
    /// Starts a fade in unless one is already running or done.
    pub const fn show(&mut self) {
        if self.fading_in {
            return;
        }
        self.fading_in = true;
        self.elapsed = 0.0;
        self.alpha = 0.0;
    }

    /// Fades out from wherever the panel currently is.
    pub const fn hide(&mut self) {
        if !self.fading_in {
            return;
        }
        self.fading_in = false;
        self.elapsed = 0.0;
        self.from = self.alpha;
    }

    pub fn advance(&mut self, delta: f32) -> f32 {
        self.elapsed += delta;
        self.alpha = if self.fading_in {
            fade_alpha(self.elapsed, FADE_IN_SECONDS, true)
        } else {
            self.from * fade_alpha(self.elapsed, FADE_OUT_SECONDS, false)
        };
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        let duration = if self.fading_in {
            FADE_IN_SECONDS
        } else {
            FADE_OUT_SECONDS
        };
        self.elapsed >= duration
    }

    /// Buttons only respond once the panel is fully shown.
    pub fn is_interactable(&self) -> bool {
        self.fading_in && self.is_settled()
    }

    pub fn is_visible(&self) -> bool {
        self.fading_in || self.alpha > 0.0
    }

    pub const fn alpha(&self) -> f32 {
        self.alpha
    }
}

#[derive(Component, Debug)]
pub struct Panel {
    pub kind: PanelKind,
    pub fade: PanelFade,
}

impl Panel {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            fade: PanelFade::default(),
        }
    }

    /// A panel that starts fading in as soon as it is spawned.
    pub fn shown(kind: PanelKind) -> Self {
        let mut panel = Self::new(kind);
        panel.fade.show();
        panel
    }
}

/// Resting alpha of a background that fades with its panel.
#[derive(Component, Debug, Clone, Copy)]
pub struct FadeBase(pub f32);

#[derive(Component, Debug, Default)]
struct Bounce {
    elapsed: f32,
}

#[derive(Component)]
struct FinalScoreText;

#[derive(Component)]
struct BestScoreText;

#[derive(Component)]
struct VolumeLabel(VolumeChannel);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Pause,
    Resume,
    Restart,
    MainMenu,
    VolumeDown(VolumeChannel),
    VolumeUp(VolumeChannel),
}

#[derive(Component, Debug, Clone, Copy)]
pub struct MenuButton {
    pub panel: PanelKind,
    pub command: MenuCommand,
}

pub struct PanelsPlugin;

impl Plugin for PanelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_game_over_panel, spawn_pause_panel))
            .add_systems(OnEnter(GameState::Playing), show_gameplay)
            .add_systems(OnEnter(GameState::Paused), show_pause)
            .add_systems(OnExit(GameState::Paused), hide_pause)
            .add_systems(OnEnter(GameState::GameOver), show_game_over)
            .add_systems(
                Update,
                (
                    fade_panels,
                    bounce_game_over,
                    handle_menu_buttons,
                    update_volume_labels,
                ),
            );
    }
}

fn set_panels(panels: &mut Query<&mut Panel>, show: &[PanelKind], hide: &[PanelKind]) {
    for mut panel in panels.iter_mut() {
        if show.contains(&panel.kind) {
            panel.fade.show();
        } else if hide.contains(&panel.kind) {
            panel.fade.hide();
        }
    }
}

fn show_pause(mut panels: Query<&mut Panel>) {
    set_panels(&mut panels, &[PanelKind::Pause], &[]);
}

fn hide_pause(mut panels: Query<&mut Panel>) {
    set_panels(&mut panels, &[], &[PanelKind::Pause]);
}

fn show_gameplay(mut panels: Query<&mut Panel>) {
    set_panels(
        &mut panels,
        &[PanelKind::Gameplay],
        &[PanelKind::GameOver, PanelKind::Pause],
    );
}

fn show_game_over(
    mut panels: Query<&mut Panel>,
    mut bounces: Query<(&mut Bounce, &mut Transform)>,
    session: Res<WheelSession>,
    high_score: Res<HighScore>,
    mut final_texts: Query<&mut Text, (With<FinalScoreText>, Without<BestScoreText>)>,
    mut best_texts: Query<&mut Text, (With<BestScoreText>, Without<FinalScoreText>)>,
) {
    set_panels(
        &mut panels,
        &[PanelKind::GameOver],
        &[PanelKind::Gameplay, PanelKind::Pause],
    );

    let final_score = session.round().final_score().unwrap_or_else(|| session.round().score());
    for mut text in &mut final_texts {
        text.0 = format!("Score: {final_score}");
    }
    for mut text in &mut best_texts {
        text.0 = format!("Best: {}", (**high_score).max(final_score));
    }

    for (mut bounce, mut transform) in &mut bounces {
        bounce.elapsed = 0.0;
        transform.scale = Vec3::ZERO;
    }
}

/// Panel fades keep running while the game clock is paused.
fn fade_panels(
    time: Res<Time<Real>>,
    mut panels: Query<(Entity, &mut Panel, &mut Visibility)>,
    children: Query<&Children>,
    mut backgrounds: Query<(&mut BackgroundColor, Option<&FadeBase>)>,
    mut texts: Query<&mut TextColor>,
) {
    for (entity, mut panel, mut visibility) in &mut panels {
        if panel.fade.is_settled() {
            continue;
        }
        let alpha = panel.fade.advance(time.delta_secs());
        *visibility = if panel.fade.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        for node in iter::once(entity).chain(children.iter_descendants(entity)) {
            if let Ok((mut background, base)) = backgrounds.get_mut(node) {
                let base = base.map_or(1.0, |base| base.0);
                background.0.set_alpha(base * alpha);
            }
            if let Ok(mut text_color) = texts.get_mut(node) {
                text_color.0.set_alpha(alpha);
            }
        }
    }
}

fn bounce_game_over(time: Res<Time<Real>>, mut bounces: Query<(&mut Bounce, &mut Transform)>) {
    for (mut bounce, mut transform) in &mut bounces {
        if bounce.elapsed >= BOUNCE_SECONDS {
            continue;
        }
        bounce.elapsed += time.delta_secs();
        let scale = ease_out_bounce(progress(bounce.elapsed, BOUNCE_SECONDS));
        transform.scale = Vec3::splat(scale);
    }
}

fn handle_menu_buttons(
    buttons: Query<(&Interaction, &MenuButton), (Changed<Interaction>, With<Button>)>,
    panels: Query<&Panel>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut restart: EventWriter<RestartRequested>,
    mut volumes: ResMut<AudioVolumes>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let interactable = panels
            .iter()
            .any(|panel| panel.kind == button.panel && panel.fade.is_interactable());
        if !interactable {
            continue;
        }

        match button.command {
            MenuCommand::Pause => {
                if *state.get() == GameState::Playing {
                    next_state.set(GameState::Paused);
                }
            }
            MenuCommand::Resume => next_state.set(GameState::Playing),
            MenuCommand::Restart => {
                restart.send(RestartRequested);
            }
            MenuCommand::MainMenu => {
                info!("No main menu yet, restarting instead");
                restart.send(RestartRequested);
            }
            MenuCommand::VolumeDown(channel) => volumes.adjust(channel, -VOLUME_STEP),
            MenuCommand::VolumeUp(channel) => volumes.adjust(channel, VOLUME_STEP),
        }
    }
}

pub fn volume_label(channel: VolumeChannel, volume: f32) -> String {
    let name = match channel {
        VolumeChannel::Sfx => "SFX",
        VolumeChannel::Music => "Music",
    };
    format!("{name} {:.0}%", volume * 100.0)
}

fn update_volume_labels(
    volumes: Res<AudioVolumes>,
    mut labels: Query<(&mut Text, &VolumeLabel)>,
) {
    if !volumes.is_changed() {
        return;
    }
    for (mut text, label) in &mut labels {
        text.0 = volume_label(label.0, volumes.get(label.0));
    }
}

fn overlay(kind: PanelKind) -> impl Bundle {
    (
        Panel::new(kind),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(12.0),
            ..default()
        },
        BackgroundColor(Color::BLACK.with_alpha(0.0)),
        FadeBase(OVERLAY_ALPHA),
        Visibility::Hidden,
        GlobalZIndex(10),
    )
}

fn label(text: &str, font_size: f32) -> impl Bundle + use<> {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
    )
}

pub fn spawn_button(parent: &mut ChildBuilder, text: &str, button: MenuButton, width: f32) {
    parent
        .spawn((
            Button,
            button,
            Node {
                width: Val::Px(width),
                height: Val::Px(48.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BorderRadius::all(Val::Px(8.0)),
            BackgroundColor(BUTTON_COLOR),
        ))
        .with_children(|parent| {
            parent.spawn(label(text, 26.0));
        });
}

fn spawn_game_over_panel(mut commands: Commands) {
    let panel = PanelKind::GameOver;
    commands
        .spawn((Name::new("GameOverPanel"), overlay(panel)))
        .with_children(|parent| {
            parent
                .spawn((
                    Bounce::default(),
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(12.0),
                        padding: UiRect::all(Val::Px(24.0)),
                        ..default()
                    },
                    BorderRadius::all(Val::Px(12.0)),
                    BackgroundColor(CARD_COLOR),
                    Transform::from_scale(Vec3::ZERO),
                ))
                .with_children(|card| {
                    card.spawn(label("Game Over", 44.0));
                    card.spawn((FinalScoreText, label("Score: 0", 30.0)));
                    card.spawn((BestScoreText, label("Best: 0", 26.0)));
                    spawn_button(
                        card,
                        "Restart",
                        MenuButton {
                            panel,
                            command: MenuCommand::Restart,
                        },
                        200.0,
                    );
                    spawn_button(
                        card,
                        "Main Menu",
                        MenuButton {
                            panel,
                            command: MenuCommand::MainMenu,
                        },
                        200.0,
                    );
                });
        });
}

fn spawn_volume_row(parent: &mut ChildBuilder, channel: VolumeChannel, volume: f32) {
    let panel = PanelKind::Pause;
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(10.0),
            ..default()
        })
        .with_children(|row| {
            spawn_button(
                row,
                "-",
                MenuButton {
                    panel,
                    command: MenuCommand::VolumeDown(channel),
                },
                48.0,
            );
            row.spawn((
                VolumeLabel(channel),
                label(&volume_label(channel, volume), 24.0),
                Node {
                    width: Val::Px(120.0),
                    ..default()
                },
            ));
            spawn_button(
                row,
                "+",
                MenuButton {
                    panel,
                    command: MenuCommand::VolumeUp(channel),
                },
                48.0,
            );
        });
}

fn spawn_pause_panel(mut commands: Commands, volumes: Res<AudioVolumes>) {
    let panel = PanelKind::Pause;
    commands
        .spawn((Name::new("PausePanel"), overlay(panel)))
        .with_children(|parent| {
            parent.spawn(label("Paused", 44.0));
            for (text, command) in [
                ("Resume", MenuCommand::Resume),
                ("Restart", MenuCommand::Restart),
                ("Main Menu", MenuCommand::MainMenu),
            ] {
                spawn_button(parent, text, MenuButton { panel, command }, 200.0);
            }
            spawn_volume_row(parent, VolumeChannel::Sfx, volumes.get(VolumeChannel::Sfx));
            spawn_volume_row(
                parent,
                VolumeChannel::Music,
                volumes.get(VolumeChannel::Music),
            );
        });
}
