//! The game loop without the engine: pointer input, wheel motion and round
//! resolution advanced by an explicit [`ColorWheelSession::tick`].

use bevy::log::{debug, info};
use bevy::math::Vec2;
use bevy::prelude::Event;
use strum::{Display, EnumIter};

use crate::gesture::SwipeTracker;
use crate::palette::{Rgb, WheelColor};
use crate::round::{Resolution, RoundState};
use crate::settings::WheelSettings;
use crate::wheel::WheelMotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SoundCue {
    WheelSpin,
    CorrectMatch,
    WrongMatch,
    GameOver,
}

/// Sound output handed to the session when it is built.
pub trait AudioService {
    fn play(&self, cue: SoundCue);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
}

/// Everything the presentation layer needs to know about.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TargetColorChanged { name: &'static str, color: Rgb },
    ScoreChanged(u32),
    LevelChanged(u32),
    Spun { speed: f32 },
    Stopped { color: Option<WheelColor> },
    GameOver { final_score: u32 },
}

pub struct ColorWheelSession<A> {
    settings: WheelSettings,
    wheel: WheelMotion,
    round: RoundState,
    swipe: SwipeTracker,
    rng: fastrand::Rng,
    audio: A,
    clock: f32,
    input_enabled: bool,
    input_lock: Option<f32>,
    pending_input: Vec<PointerInput>,
    events: Vec<SessionEvent>,
}

impl<A: AudioService> ColorWheelSession<A> {
    pub fn new(
        settings: WheelSettings,
        wheel_center: Vec2,
        mut rng: fastrand::Rng,
        audio: A,
    ) -> Self {
        let mut wheel = WheelMotion::new(&settings);
        wheel.set_colors(&WheelColor::wheel_layout());
        let round = RoundState::new(&mut rng);
        let swipe = SwipeTracker::new(wheel_center, &settings);

        let mut session = Self {
            settings,
            wheel,
            round,
            swipe,
            rng,
            audio,
            clock: 0.0,
            input_enabled: true,
            input_lock: None,
            pending_input: Vec::new(),
            events: Vec::new(),
        };
        session.announce_round();
        session
    }

    pub const fn wheel(&self) -> &WheelMotion {
        &self.wheel
    }

    pub const fn round(&self) -> &RoundState {
        &self.round
    }

    pub const fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Current flick speed before the gesture multiplier.
    pub fn spin_speed(&self) -> f32 {
        self.settings.spin_speed(self.round.level())
    }

    /// Queues pointer input for the next tick.
    pub fn push_input(&mut self, input: PointerInput) {
        self.pending_input.push(input);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        core::mem::take(&mut self.events)
    }

    /// Advances one frame: input lock, pointer input, motion, then stop detection.
    pub fn tick(&mut self, delta: f32) {
        self.clock += delta;
        self.advance_input_lock(delta);

        for input in core::mem::take(&mut self.pending_input) {
            self.handle_input(input);
        }

        if let Some(stopped) = self.wheel.tick(delta) {
            debug!("Wheel stopped on segment {}", stopped.segment);
            self.events.push(SessionEvent::Stopped {
                color: stopped.wheel_color,
            });
            self.resolve(stopped.color);
        }
    }

    pub fn restart(&mut self) {
        info!("Restarting round");
        self.round.restart(&mut self.rng);
        self.wheel.halt();
        self.swipe.cancel();
        self.pending_input.clear();
        self.input_lock = None;
        self.input_enabled = true;
        self.announce_round();
    }

    fn handle_input(&mut self, input: PointerInput) {
        // A spin in flight can't be grabbed.
        if !self.input_enabled || self.wheel.is_spinning() {
            self.swipe.cancel();
            return;
        }

        match input {
            PointerInput::Down(position) => self.swipe.begin(position, self.clock),
            PointerInput::Move(position) => {
                if let Some(degrees) = self.swipe.drag(position) {
                    self.wheel.drag(degrees);
                }
            }
            PointerInput::Up(position) => {
                if let Some(flick) = self.swipe.release(position, self.clock) {
                    let speed = self.spin_speed() * flick.multiplier;
                    self.wheel.spin(speed, flick.direction);
                    self.audio.play(SoundCue::WheelSpin);
                    self.events.push(SessionEvent::Spun {
                        speed: speed * flick.direction,
                    });
                }
            }
        }
    }

    fn resolve(&mut self, stopped: Rgb) {
        match self
            .round
            .resolve(stopped, self.settings.match_tolerance, &mut self.rng)
        {
            Resolution::Matched {
                awarded,
                score,
                level,
                next_target,
            } => {
                info!("Matched for {awarded} points, next target {next_target}");
                self.audio.play(SoundCue::CorrectMatch);
                self.events.push(SessionEvent::ScoreChanged(score));
                self.events.push(SessionEvent::LevelChanged(level));
                self.push_target();
                self.disable_input();
                self.input_lock = Some(self.settings.next_round_delay);
            }
            Resolution::Missed { final_score } => {
                info!("Missed, final score {final_score}");
                self.audio.play(SoundCue::WrongMatch);
                self.audio.play(SoundCue::GameOver);
                self.disable_input();
                self.events.push(SessionEvent::GameOver { final_score });
            }
            Resolution::Ignored => {}
        }
    }

    fn advance_input_lock(&mut self, delta: f32) {
        let Some(remaining) = self.input_lock.as_mut() else {
            return;
        };
        *remaining -= delta;
        if *remaining <= 0.0 {
            self.input_lock = None;
            if self.round.is_active() {
                self.input_enabled = true;
            }
        }
    }

    const fn disable_input(&mut self) {
        self.input_enabled = false;
        self.swipe.cancel();
    }

    fn announce_round(&mut self) {
        self.push_target();
        self.events.push(SessionEvent::ScoreChanged(self.round.score()));
        self.events.push(SessionEvent::LevelChanged(self.round.level()));
    }

    fn push_target(&mut self) {
        let target = self.round.target();
        self.events.push(SessionEvent::TargetColorChanged {
            name: target.name(),
            color: target.rgb(),
        });
    }
}
