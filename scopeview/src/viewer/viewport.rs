//! Viewport → zoom level and tile window.
//!
//! Uses the bottom-left to top-right diagonal of the viewport as a measuring
//! stick: its length in device pixels versus its length in source pixels
//! gives the zoom factor (source pixels per device pixel).

use std::fmt;

use crate::coord::{PyramidGeometry, TileBounds};
use crate::transform::Affine;

/// Visible world-space range of the plot: `x = (left, right)`,
/// `y = (bottom, top)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl ViewRange {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            x: (left, right),
            y: (bottom, top),
        }
    }

    /// Range with the same center scaled by `factor` (> 1 zooms out).
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |(a, b): (f64, f64)| {
            let center = (a + b) / 2.0;
            let half = (b - a) / 2.0 * factor;
            (center - half, center + half)
        };
        Self {
            x: scale(self.x),
            y: scale(self.y),
        }
    }

    /// Range shifted by `(dx, dy)` world units.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: (self.x.0 + dx, self.x.1 + dx),
            y: (self.y.0 + dy, self.y.1 + dy),
        }
    }

    fn is_finite(&self) -> bool {
        [self.x.0, self.x.1, self.y.0, self.y.1].iter().all(|v| v.is_finite())
    }
}

/// Why a viewport change was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Surface reported a zero or non-finite world size per device pixel.
    PixelSize,
    /// Viewport has zero extent in device pixels or non-finite bounds.
    EmptyViewport,
    /// The view transform cannot be inverted.
    SingularTransform,
    /// Viewport corners map to the same source pixel.
    ZeroSourceExtent,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DegenerateReason::PixelSize => "zero view pixel size",
            DegenerateReason::EmptyViewport => "empty viewport",
            DegenerateReason::SingularTransform => "singular view transform",
            DegenerateReason::ZeroSourceExtent => "zero source extent",
        };
        f.write_str(text)
    }
}

/// Result of resolving a viewport against the pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPlan {
    /// Source pixels per device pixel.
    pub zoom_factor: f64,
    /// Chosen zoom level.
    pub zoom: u8,
    /// Tiles to show at `zoom`.
    pub bounds: TileBounds,
}

/// Choose the zoom level and tile window for a viewport.
///
/// # Arguments
///
/// * `range` - Visible world range
/// * `pixel_size` - World units per device pixel `(px, py)`
/// * `transform` - Image pixel space → world space
/// * `geometry` - Pyramid dimensions
pub fn plan_viewport(
    range: &ViewRange,
    pixel_size: (f64, f64),
    transform: &Affine,
    geometry: &PyramidGeometry,
) -> Result<ViewportPlan, DegenerateReason> {
    let (px, py) = pixel_size;
    if !px.is_finite() || !py.is_finite() || px == 0.0 || py == 0.0 {
        return Err(DegenerateReason::PixelSize);
    }
    if !range.is_finite() {
        return Err(DegenerateReason::EmptyViewport);
    }
    let inverse = transform.inverted().ok_or(DegenerateReason::SingularTransform)?;

    let (xl, xr) = range.x;
    let (yb, yt) = range.y;

    // Corners in source pixel space
    let p0 = inverse.map(xl, yb);
    let p1 = inverse.map(xr, yt);

    if xr == xl || yt == yb {
        return Err(DegenerateReason::EmptyViewport);
    }
    let view_px = ((xr - xl) / px).hypot((yt - yb) / py);
    if !(view_px > 0.0) || !view_px.is_finite() {
        return Err(DegenerateReason::EmptyViewport);
    }
    let source_px = (p1.0 - p0.0).hypot(p1.1 - p0.1);
    if !(source_px > 0.0) || !source_px.is_finite() {
        return Err(DegenerateReason::ZeroSourceExtent);
    }

    let zoom_factor = source_px / view_px;
    let zoom = zoom_for_factor(zoom_factor, geometry.max_zoom());
    let bounds = geometry.window(p0, p1, zoom);

    Ok(ViewportPlan {
        zoom_factor,
        zoom,
        bounds,
    })
}

/// `clamp(floor(log2(zoom_factor)), 0, max_zoom)`.
pub fn zoom_for_factor(zoom_factor: f64, max_zoom: u8) -> u8 {
    let level = zoom_factor.log2().floor();
    if !(level > 0.0) {
        return 0;
    }
    level.min(f64::from(max_zoom)) as u8
}
