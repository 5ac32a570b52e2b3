use glam::Vec3;

use crate::config::ProximityConfig;
use crate::model::{InfoPanel, PointOfInterest};

/// How marker scale eases toward its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Fixed fraction per frame. Convergence speed depends on frame rate.
    PerFrame { alpha: f32 },
    /// Exponential decay with `alpha = 1 - exp(-rate * dt)`
    TimeScaled { rate: f32 },
}

impl Smoothing {
    /// Rate equivalent to a per-frame `alpha` at the given frame rate
    pub fn matching(alpha: f32, fps: f32) -> Self {
        Smoothing::TimeScaled { rate: -(1.0 - alpha).ln() * fps }
    }

    /// Fraction of the remaining gap closed this frame, within [0, 1]
    pub fn factor(&self, dt: f32) -> f32 {
        let alpha = match *self {
            Smoothing::PerFrame { alpha } => alpha,
            Smoothing::TimeScaled { rate } => 1.0 - (-rate * dt.max(0.0)).exp(),
        };
        alpha.clamp(0.0, 1.0)
    }
}

/// What happens to the panel in a frame where no point is near
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPolicy {
    /// Hide it as soon as the vehicle leaves every point
    HideWhenFar,
    /// Keep showing the last message
    Sticky,
}

/// Scale a marker should grow toward at `distance` from the vehicle
pub fn target_scale(distance: f32, config: &ProximityConfig) -> f32 {
    if distance < config.near_threshold {
        config.near_scale
    } else {
        config.far_scale
    }
}

/// One exponential smoothing step, per axis
pub fn smooth_toward(current: Vec3, target: f32, alpha: f32) -> Vec3 {
    current + (Vec3::splat(target) - current) * alpha
}

/// Grow markers near the vehicle, shrink the rest and drive the info panel.
///
/// Does nothing until the vehicle exists. Returns the index of the last near point.
pub fn update_markers(
    points: &mut [PointOfInterest],
    vehicle: Option<Vec3>,
    config: &ProximityConfig,
    dt: f32,
    panel: &mut InfoPanel,
) -> Option<usize> {
    let vehicle = vehicle?;
    let alpha = config.smoothing.factor(dt);

    let mut last_near = None;
    for (idx, point) in points.iter_mut().enumerate() {
        let distance = vehicle.distance(point.position);
        let target = target_scale(distance, config);

        let scale = &mut point.marker.transform.scale;
        *scale = smooth_toward(*scale, target, alpha);

        if distance < config.near_threshold {
            panel.show(&point.message);
            last_near = Some(idx);
        }
    }

    if last_near.is_none() && config.panel_policy == PanelPolicy::HideWhenFar {
        panel.hide();
    }
    last_near
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::model::Scene;

    fn setup(config: &ProximityConfig) -> (Vec<PointOfInterest>, InfoPanel) {
        let scene_config = SceneConfig { proximity: config.clone(), ..SceneConfig::default() };
        (Scene::new(&scene_config).points, InfoPanel::default())
    }

    #[test]
    fn test_target_scale_has_no_hysteresis() {
        let config = ProximityConfig::default();
        let t = config.near_threshold;
        assert_eq!(target_scale(0.0, &config), 1.8);
        assert_eq!(target_scale(t - 1e-4, &config), 1.8);
        assert_eq!(target_scale(t, &config), 1.0);
        assert_eq!(target_scale(t + 1e-4, &config), 1.0);
        assert_eq!(target_scale(100.0, &config), 1.0);
    }

    #[test]
    fn test_smoothing_moves_strictly_closer() {
        let alpha = Smoothing::PerFrame { alpha: 0.1 }.factor(0.016);
        for (start, target) in [(1.0, 1.8), (1.8, 1.0), (1.3, 1.8), (1.6, 1.0)] {
            let current = Vec3::splat(start);
            let next = smooth_toward(current, target, alpha);
            assert!((next.x - target).abs() < (current.x - target).abs());
            assert!(next.x >= 1.0 && next.x <= 1.8, "stays inside the endpoints");
        }
        let settled = smooth_toward(Vec3::splat(1.8), 1.8, alpha);
        assert_eq!(settled, Vec3::splat(1.8));
    }

    #[test]
    fn test_time_scaled_factor_is_frame_rate_independent() {
        let smoothing = Smoothing::matching(0.1, 60.0);
        assert!((smoothing.factor(1.0 / 60.0) - 0.1).abs() < 1e-5);

        // Two half frames close the same gap as one whole frame
        let whole = smooth_toward(Vec3::ONE, 1.8, smoothing.factor(0.02));
        let half = smoothing.factor(0.01);
        let halves = smooth_toward(smooth_toward(Vec3::ONE, 1.8, half), 1.8, half);
        assert!(whole.abs_diff_eq(halves, 1e-5));

        assert_eq!(smoothing.factor(0.0), 0.0);
        assert!(smoothing.factor(1000.0) <= 1.0);
    }

    #[test]
    fn test_vehicle_on_first_point_shows_message_and_grows_marker() {
        let config = ProximityConfig::default();
        let (mut points, mut panel) = setup(&config);

        for _ in 0..120 {
            update_markers(&mut points, Some(Vec3::new(5.0, 0.0, 0.0)), &config, 1.0 / 60.0, &mut panel);
        }
        assert!(panel.visible);
        assert_eq!(panel.text, "Первая точка");
        assert!((points[0].marker.transform.scale.x - 1.8).abs() < 1e-3);
        assert!((points[1].marker.transform.scale.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_panel_policy_when_leaving() {
        let hide = ProximityConfig::default();
        let (mut points, mut panel) = setup(&hide);
        update_markers(&mut points, Some(Vec3::new(5.0, 0.0, 0.0)), &hide, 0.016, &mut panel);
        assert!(panel.visible);
        update_markers(&mut points, Some(Vec3::new(2.5, 0.0, 2.5)), &hide, 0.016, &mut panel);
        assert!(!panel.visible);

        let sticky = ProximityConfig { panel_policy: PanelPolicy::Sticky, ..ProximityConfig::default() };
        let (mut points, mut panel) = setup(&sticky);
        update_markers(&mut points, Some(Vec3::new(-5.0, 0.0, 0.0)), &sticky, 0.016, &mut panel);
        update_markers(&mut points, Some(Vec3::new(2.5, 0.0, 2.5)), &sticky, 0.016, &mut panel);
        assert!(panel.visible);
        assert_eq!(panel.text, "Вторая точка");
    }

    #[test]
    fn test_absent_vehicle_leaves_markers_and_panel() {
        let config = ProximityConfig::default();
        let (mut points, mut panel) = setup(&config);
        panel.show("kept");
        let before = points.clone();

        assert_eq!(update_markers(&mut points, None, &config, 0.5, &mut panel), None);
        assert_eq!(points, before);
        assert!(panel.visible);
        assert_eq!(panel.text, "kept");
    }

    #[test]
    fn test_tight_threshold_variant() {
        let config = ProximityConfig { near_threshold: 0.5, ..ProximityConfig::default() };
        let (mut points, mut panel) = setup(&config);
        // One unit above the point is near for 1.5 but not for 0.5
        let hit = update_markers(&mut points, Some(Vec3::new(5.0, 1.0, 0.0)), &config, 0.016, &mut panel);
        assert_eq!(hit, None);
        assert!(!panel.visible);
    }
}
