use crate::palette::{Rgb, WheelColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundPhase {
    #[default]
    Active,
    GameOver,
}

/// What a stop did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched {
        awarded: u32,
        score: u32,
        level: u32,
        next_target: WheelColor,
    },
    Missed {
        final_score: u32,
    },
    /// The round was already over.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    score: u32,
    level: u32,
    target: WheelColor,
    phase: RoundPhase,
    final_score: Option<u32>,
}

impl RoundState {
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        Self {
            score: 0,
            level: 1,
            target: WheelColor::random(rng),
            phase: RoundPhase::Active,
            final_score: None,
        }
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn target(&self) -> WheelColor {
        self.target
    }

    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub const fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Compares the resting color against the target and advances the round.
    pub fn resolve(
        &mut self,
        stopped: Rgb,
        tolerance: f32,
        rng: &mut fastrand::Rng,
    ) -> Resolution {
        if !self.is_active() {
            return Resolution::Ignored;
        }

        if stopped.matches(self.target.rgb(), tolerance) {
            let awarded = self.level * 10;
            self.score += awarded;
            self.level += 1;
            self.target = WheelColor::random(rng);
            Resolution::Matched {
                awarded,
                score: self.score,
                level: self.level,
                next_target: self.target,
            }
        } else {
            self.phase = RoundPhase::GameOver;
            self.final_score = Some(self.score);
            Resolution::Missed {
                final_score: self.score,
            }
        }
    }

    pub fn restart(&mut self, rng: &mut fastrand::Rng) {
        *self = Self::new(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::MATCH_TOLERANCE;

    fn round() -> (RoundState, fastrand::Rng) {
        let mut rng = fastrand::Rng::with_seed(7);
        (RoundState::new(&mut rng), rng)
    }

    fn land_on_target(round: &mut RoundState, rng: &mut fastrand::Rng) -> Resolution {
        let target = round.target().rgb();
        round.resolve(target, MATCH_TOLERANCE, rng)
    }

    fn miss(round: &mut RoundState, rng: &mut fastrand::Rng) -> Resolution {
        let wrong = WheelColor::wheel_layout()
            .into_iter()
            .find(|c| *c != round.target())
            .map_or(Rgb::WHITE, WheelColor::rgb);
        round.resolve(wrong, MATCH_TOLERANCE, rng)
    }

    #[test]
    fn starts_at_level_one_with_no_score() {
        let (round, _) = round();
        assert_eq!(round.score(), 0);
        assert_eq!(round.level(), 1);
        assert!(round.is_active(), "a new round is active");
        assert_eq!(round.final_score(), None);
    }

    #[test]
    fn consecutive_matches_scale_with_level() {
        let (mut round, mut rng) = round();

        let first = land_on_target(&mut round, &mut rng);
        assert!(
            matches!(first, Resolution::Matched { awarded: 10, score: 10, level: 2, .. }),
            "got {first:?}"
        );

        let second = land_on_target(&mut round, &mut rng);
        assert!(
            matches!(second, Resolution::Matched { awarded: 20, score: 30, level: 3, .. }),
            "got {second:?}"
        );
        assert_eq!(round.score(), 30);
        assert_eq!(round.level(), 3);
    }

    #[test]
    fn miss_ends_the_round_and_freezes_the_score() {
        let (mut round, mut rng) = round();
        land_on_target(&mut round, &mut rng);

        let missed = miss(&mut round, &mut rng);
        assert_eq!(missed, Resolution::Missed { final_score: 10 });
        assert_eq!(round.phase(), RoundPhase::GameOver);
        assert_eq!(round.final_score(), Some(10));

        for _ in 0..5 {
            assert_eq!(land_on_target(&mut round, &mut rng), Resolution::Ignored);
        }
        assert_eq!(round.score(), 10, "stops after game over never score");
        assert_eq!(round.level(), 2, "stops after game over never level up");
    }

    #[test]
    fn miss_at_any_level_is_game_over() {
        for matches_before in 0..6 {
            let (mut round, mut rng) = round();
            for _ in 0..matches_before {
                land_on_target(&mut round, &mut rng);
            }
            assert!(
                matches!(miss(&mut round, &mut rng), Resolution::Missed { .. }),
                "miss after {matches_before} matches must end the round"
            );
        }
    }

    #[test]
    fn restart_resets_score_and_level() {
        let (mut round, mut rng) = round();
        land_on_target(&mut round, &mut rng);
        land_on_target(&mut round, &mut rng);
        miss(&mut round, &mut rng);

        round.restart(&mut rng);
        assert_eq!(round.score(), 0);
        assert_eq!(round.level(), 1);
        assert!(round.is_active(), "restart reopens the round");
        assert_eq!(round.final_score(), None);
    }
}
