use crate::config::HoverConfig;
use crate::controller::tween::Tween;
use crate::model::{Ray, SceneObject};

/// A change in whether the pointer is over the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEdge {
    Entered,
    Left,
}

/// Edge-triggered highlight for the hover target: material swap plus a scale tween,
/// fired once per transition and never while the state holds.
pub struct HoverHighlight {
    config: HoverConfig,
    hovered: bool,
    tween: Option<Tween>,
}

impl HoverHighlight {
    pub fn new(config: HoverConfig) -> Self {
        Self {
            config,
            hovered: false,
            tween: None,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn active_tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    /// Record this frame's intersection result and report a transition, if any
    pub fn observe(&mut self, intersects: bool) -> Option<HoverEdge> {
        match (self.hovered, intersects) {
            (false, true) => {
                self.hovered = true;
                Some(HoverEdge::Entered)
            }
            (true, false) => {
                self.hovered = false;
                Some(HoverEdge::Left)
            }
            _ => None,
        }
    }

    /// Cast `ray` at the target and react to a transition.
    /// Returns the edge that fired, if any.
    pub fn update(&mut self, target: &mut SceneObject, ray: &Ray) -> Option<HoverEdge> {
        let intersects = ray.intersect_unit_box(target.model_matrix()).is_some();
        let edge = self.observe(intersects)?;
        self.apply_edge(target, edge);
        Some(edge)
    }

    fn apply_edge(&mut self, target: &mut SceneObject, edge: HoverEdge) {
        let (material, scale) = match edge {
            HoverEdge::Entered => (self.config.highlight_material, self.config.hover_scale),
            HoverEdge::Left => (self.config.original_material, self.config.rest_scale),
        };
        target.material = material;
        // Start from wherever an interrupted tween left the scale
        self.tween = Some(Tween::new(
            target.transform.scale,
            scale,
            self.config.duration,
            self.config.ease,
        ));
        tracing::debug!(?edge, "hover target transition");
    }

    /// Step the running scale tween, dropping it once finished
    pub fn animate(&mut self, target: &mut SceneObject, dt: f32) {
        let Some(tween) = self.tween.as_mut() else {
            return;
        };
        target.transform.scale = tween.advance(dt);
        if tween.is_finished() {
            self.tween = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HoverConfig, SceneConfig};
    use crate::model::Scene;
    use glam::Vec3;

    fn target() -> SceneObject {
        Scene::new(&SceneConfig::default()).hover_target
    }

    /// Ray straight down -Z through the target's center, or well beside it
    fn ray_at(target: &SceneObject, hit: bool) -> Ray {
        let offset = if hit { Vec3::ZERO } else { Vec3::new(50.0, 0.0, 0.0) };
        Ray::new(target.transform.position + offset + Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_edges_fire_once_per_transition() {
        let mut hover = HoverHighlight::new(HoverConfig::default());
        let edges: Vec<_> = [false, true, true, false]
            .into_iter()
            .filter_map(|hit| hover.observe(hit))
            .collect();
        assert_eq!(edges, vec![HoverEdge::Entered, HoverEdge::Left]);
    }

    #[test]
    fn test_repeated_hit_does_not_restart_tween() {
        let config = HoverConfig::default();
        let mut hover = HoverHighlight::new(config.clone());
        let mut cube = target();

        let ray = ray_at(&cube, true);
        assert_eq!(hover.update(&mut cube, &ray), Some(HoverEdge::Entered));
        assert_eq!(cube.material, config.highlight_material);
        hover.animate(&mut cube, 0.5);
        let mid = cube.transform.scale;
        assert!(mid.x > 1.0 && mid.x < config.hover_scale.x);

        // Still hovering: no new tween, the animation keeps its progress
        let ray = ray_at(&cube, true);
        assert_eq!(hover.update(&mut cube, &ray), None);
        hover.animate(&mut cube, 0.5);
        assert!(cube.transform.scale.x > mid.x);

        hover.animate(&mut cube, 1.0);
        assert_eq!(cube.transform.scale, config.hover_scale);
        assert!(hover.active_tween().is_none());
    }

    #[test]
    fn test_leave_restores_material_and_scale() {
        let config = HoverConfig::default();
        let mut hover = HoverHighlight::new(config.clone());
        let mut cube = target();

        let ray = ray_at(&cube, true);
        hover.update(&mut cube, &ray);
        hover.animate(&mut cube, config.duration);
        // The enlarged box is still hit from the same ray
        let ray = ray_at(&cube, true);
        assert_eq!(hover.update(&mut cube, &ray), None);

        let ray = ray_at(&cube, false);
        assert_eq!(hover.update(&mut cube, &ray), Some(HoverEdge::Left));
        assert_eq!(cube.material, config.original_material);
        assert_eq!(hover.active_tween().map(|t| t.target()), Some(config.rest_scale));
        hover.animate(&mut cube, config.duration);
        assert_eq!(cube.transform.scale, config.rest_scale);
    }

    #[test]
    fn test_miss_while_idle_changes_nothing() {
        let mut hover = HoverHighlight::new(HoverConfig::default());
        let mut cube = target();
        let before = cube.clone();

        let ray = ray_at(&cube, false);
        assert_eq!(hover.update(&mut cube, &ray), None);
        assert!(!hover.is_hovered());
        assert!(hover.active_tween().is_none());
        assert_eq!(cube, before);
    }

    #[test]
    fn test_interrupted_tween_starts_from_current_scale() {
        let config = HoverConfig::default();
        let mut hover = HoverHighlight::new(config.clone());
        let mut cube = target();

        let ray = ray_at(&cube, true);
        hover.update(&mut cube, &ray);
        hover.animate(&mut cube, 0.3);
        let partway = cube.transform.scale;

        let ray = ray_at(&cube, false);
        hover.update(&mut cube, &ray);
        hover.animate(&mut cube, 0.0);
        assert_eq!(cube.transform.scale, partway);
    }
}
