//! Tracks which figures are in zoom/pan mode.
//!
//! Each active figure owns a [`FigureTransform`]. Activation creates the
//! state, deactivation discards it, so a re-activated figure always starts
//! from the original view.

use crate::transform::FigureTransform;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Activation {
    active: BTreeMap<usize, FigureTransform>,
}

impl Activation {
    /// Toggles zoom/pan mode for a figure. Returns whether it is now active.
    pub fn toggle(&mut self, figure_id: usize) -> bool {
        if self.active.remove(&figure_id).is_some() {
            false
        } else {
            self.active.insert(figure_id, FigureTransform::default());
            true
        }
    }

    pub fn is_active(&self, figure_id: usize) -> bool {
        self.active.contains_key(&figure_id)
    }

    pub fn transform(&self, figure_id: usize) -> Option<&FigureTransform> {
        self.active.get(&figure_id)
    }

    pub fn transform_mut(&mut self, figure_id: usize) -> Option<&mut FigureTransform> {
        self.active.get_mut(&figure_id)
    }

    /// Restores all active figures to their original view, keeping them active.
    pub fn reset_all(&mut self) {
        for transform in self.active.values_mut() {
            transform.reset();
        }
    }

    /// Deactivates all figures, discarding their transform state.
    pub fn deactivate_all(&mut self) {
        self.active.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn transforms_mut(&mut self) -> impl Iterator<Item = &mut FigureTransform> {
        self.active.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn toggle_activates_and_deactivates() {
        let mut activation = Activation::default();
        assert!(activation.toggle(3));
        assert!(activation.is_active(3));
        assert!(!activation.toggle(3));
        assert!(!activation.is_active(3));
        assert!(activation.is_empty());
    }

    #[test]
    fn state_is_discarded_on_deactivation() {
        let mut activation = Activation::default();
        activation.toggle(1);
        activation.transform_mut(1).unwrap().pan(vec2(50.0, 0.0), 1.0);

        activation.toggle(1);
        activation.toggle(1);
        assert!(activation.transform(1).unwrap().is_identity());
    }

    #[test]
    fn reset_all_keeps_figures_active() {
        let mut activation = Activation::default();
        activation.toggle(0);
        activation.toggle(2);
        activation
            .transform_mut(2)
            .unwrap()
            .zoom_toward(2.0, vec2(10.0, 10.0));

        activation.reset_all();
        assert!(activation.is_active(0));
        assert!(activation.is_active(2));
        assert!(activation.transform(2).unwrap().is_identity());
    }

    #[test]
    fn deactivate_all_clears_everything() {
        let mut activation = Activation::default();
        activation.toggle(0);
        activation.toggle(5);
        activation.deactivate_all();
        assert!(activation.is_empty());
        assert!(!activation.is_active(5));
    }
}
