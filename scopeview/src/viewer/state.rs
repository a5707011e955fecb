//! Shared view state for all tiles of a pyramid.

use crate::surface::{Levels, LookupTable, RenderOptions};
use crate::transform::Affine;

/// Everything that affects how tiles are placed and colored, but not their
/// pixel content.
///
/// Replacing the state re-places or re-colors attached tiles; it never
/// re-samples them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Image pixel space → world space.
    pub transform: Affine,
    pub lut: Option<LookupTable>,
    pub levels: Option<Levels>,
}

impl ViewState {
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Options for a newly attached tile.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            lut: self.lut.clone(),
            levels: self.levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = ViewState::default();
        assert_eq!(state.transform, Affine::IDENTITY);
        assert_eq!(state.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_render_options_carry_defaults() {
        let mut state = ViewState::new(Affine::scale(2.0, 2.0));
        state.levels = Some(Levels::new(1.0, 9.0));
        state.lut = Some(LookupTable::grayscale(4));

        let options = state.render_options();
        assert_eq!(options.levels, Some(Levels::new(1.0, 9.0)));
        assert!(options.lut.unwrap().ptr_eq(state.lut.as_ref().unwrap()));
    }
}
