use glam::Vec3;

/// Rate curves for tweens, named after their GSAP counterparts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out ("power1.out")
    Power1Out,
    /// Quadratic ease-in-out ("power1.inOut")
    Power1InOut,
}

impl Ease {
    /// Map linear progress `t` in [0, 1] onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// One-shot, time-based interpolation of a vector
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Vec3,
    to: Vec3,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    pub fn new(from: Vec3, to: Vec3, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.to
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn value(&self) -> Vec3 {
        self.from.lerp(self.to, self.ease.apply(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Move the clock forward and return the new value
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        self.elapsed += dt.max(0.0);
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::Power1Out, Ease::Power1InOut] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
            assert_eq!(ease.apply(2.0), 1.0, "progress past the end clamps");
        }
    }

    #[test]
    fn test_power1_out_front_loads_progress() {
        assert!((Ease::Power1Out.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Ease::Power1InOut.apply(0.25) - 0.125).abs() < 1e-6);
        assert!((Ease::Power1InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tween_reaches_target_exactly() {
        let target = Vec3::new(3.0, 1.5, 1.0);
        let mut tween = Tween::new(Vec3::ONE, target, 1.5, Ease::Power1Out);
        let mut last = Vec3::ONE;
        for _ in 0..100 {
            let v = tween.advance(1.0 / 60.0);
            assert!(v.x >= last.x - 1e-6, "x never moves backwards");
            last = v;
        }
        assert!(tween.is_finished());
        assert_eq!(tween.value(), target);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let tween = Tween::new(Vec3::ZERO, Vec3::ONE, 0.0, Ease::Linear);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), Vec3::ONE);
    }
}
