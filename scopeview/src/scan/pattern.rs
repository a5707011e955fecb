//! Scan pattern generation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::scan::{LinearRange, ScanError};

/// Order in which the stage visits the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    /// Every line left to right.
    #[default]
    Raster,
    /// Alternate lines reversed.
    Serpentine,
    /// Each line forward into frame 0, then backward into frame 1.
    TraceRetrace,
    /// Row-major raster into frame 0, then column-major into frame 1.
    OrthoRaster,
    /// Trace/retrace by rows (frames 0, 1), then by columns (frames 2, 3).
    OrthoTraceRetrace,
}

impl ScanType {
    pub const ALL: [ScanType; 5] = [
        ScanType::Raster,
        ScanType::Serpentine,
        ScanType::TraceRetrace,
        ScanType::OrthoRaster,
        ScanType::OrthoTraceRetrace,
    ];

    /// Number of image frames the pattern fills.
    pub fn frames(self) -> usize {
        match self {
            ScanType::Raster | ScanType::Serpentine => 1,
            ScanType::TraceRetrace | ScanType::OrthoRaster => 2,
            ScanType::OrthoTraceRetrace => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::Raster => "raster",
            ScanType::Serpentine => "serpentine",
            ScanType::TraceRetrace => "trace_retrace",
            ScanType::OrthoRaster => "ortho_raster",
            ScanType::OrthoTraceRetrace => "ortho_trace_retrace",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ScanType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ScanError::UnknownScanType(s.to_string()))
    }
}

/// Per-pixel stage positions and image indices for one scan.
///
/// Arrays are indexed by pixel number in acquisition order. `indices[p]`
/// is `[k, j, i]`: frame, vertical line, horizontal column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanPlan {
    pub scan_type: ScanType,
    pub h_array: Vec<f64>,
    pub v_array: Vec<f64>,
    pub h_positions: Vec<f64>,
    pub v_positions: Vec<f64>,
    /// `true` on the first pixel of every line: the stage makes a slow move there.
    pub slow_move: Vec<bool>,
    pub indices: Vec<[usize; 3]>,
    /// `(frames, Nv, Nh)`.
    pub shape: (usize, usize, usize),
    /// `[h0, h1, v0, v1]` as configured.
    pub range_extent: [f64; 4],
    /// `[h_first, h_last, v_first, v_last]` actual positions.
    pub corners: [f64; 4],
    /// Corners padded by half a pixel, for displaying the image.
    pub imshow_extent: [f64; 4],
}

impl ScanPlan {
    /// Lay out a scan of `h × v` positions in `scan_type` order.
    pub fn generate(scan_type: ScanType, h: &LinearRange, v: &LinearRange) -> Self {
        let h_array = h.array();
        let v_array = v.array();
        let (nh, nv) = (h_array.len(), v_array.len());
        let shape = (scan_type.frames(), nv, nh);

        let mut builder = PlanBuilder::with_capacity(shape.0 * nv * nh);
        let forward_h: Vec<usize> = (0..nh).collect();
        let reverse_h: Vec<usize> = (0..nh).rev().collect();

        match scan_type {
            ScanType::Raster => {
                for j in 0..nv {
                    builder.line(0, j, &forward_h, Axis::Horizontal);
                }
            }
            ScanType::Serpentine => {
                for j in 0..nv {
                    let order = if j % 2 == 1 { &reverse_h } else { &forward_h };
                    builder.line(0, j, order, Axis::Horizontal);
                }
            }
            ScanType::TraceRetrace => {
                for j in 0..nv {
                    builder.trace_retrace(j, [0, 1], &forward_h, &reverse_h, Axis::Horizontal);
                }
            }
            ScanType::OrthoRaster => {
                for j in 0..nv {
                    builder.line(0, j, &forward_h, Axis::Horizontal);
                }
                let forward_v: Vec<usize> = (0..nv).collect();
                for i in 0..nh {
                    builder.line(1, i, &forward_v, Axis::Vertical);
                }
            }
            ScanType::OrthoTraceRetrace => {
                for j in 0..nv {
                    builder.trace_retrace(j, [0, 1], &forward_h, &reverse_h, Axis::Horizontal);
                }
                let forward_v: Vec<usize> = (0..nv).collect();
                let reverse_v: Vec<usize> = (0..nv).rev().collect();
                for i in 0..nh {
                    builder.trace_retrace(i, [2, 3], &forward_v, &reverse_v, Axis::Vertical);
                }
            }
        }

        let PlanBuilder { slow_move, indices } = builder;
        let h_positions = indices.iter().map(|[_, _, i]| h_array[*i]).collect();
        let v_positions = indices.iter().map(|[_, j, _]| v_array[*j]).collect();

        let corners = [h.first(), h.last(), v.first(), v.last()];
        let imshow_extent = [
            corners[0] - 0.5 * h.step,
            corners[1] + 0.5 * h.step,
            corners[2] - 0.5 * v.step,
            corners[3] + 0.5 * v.step,
        ];

        Self {
            scan_type,
            h_array,
            v_array,
            h_positions,
            v_positions,
            slow_move,
            indices,
            shape,
            range_extent: [h.start, h.stop, v.start, v.stop],
            corners,
            imshow_extent,
        }
    }

    /// Total pixels visited, `frames · Nv · Nh`.
    pub fn num_pixels(&self) -> usize {
        self.indices.len()
    }

    /// Stage motion from pixel `p - 1` to pixel `p`; zero for the first.
    pub fn delta(&self, pixel: usize) -> (f64, f64) {
        if pixel == 0 {
            return (0.0, 0.0);
        }
        (
            self.h_positions[pixel] - self.h_positions[pixel - 1],
            self.v_positions[pixel] - self.v_positions[pixel - 1],
        )
    }

    /// Number of slow moves (line starts).
    pub fn num_lines(&self) -> usize {
        self.slow_move.iter().filter(|&&slow| slow).count()
    }
}

#[derive(Clone, Copy)]
enum Axis {
    /// Line fixed at `v[j]`, stepping over `h`.
    Horizontal,
    /// Line fixed at `h[i]`, stepping over `v`.
    Vertical,
}

struct PlanBuilder {
    slow_move: Vec<bool>,
    indices: Vec<[usize; 3]>,
}

impl PlanBuilder {
    fn with_capacity(pixels: usize) -> Self {
        Self {
            slow_move: Vec::with_capacity(pixels),
            indices: Vec::with_capacity(pixels),
        }
    }

    /// Append one line in frame `k`, starting with a slow move.
    fn line(&mut self, k: usize, fixed: usize, order: &[usize], axis: Axis) {
        self.push_line(k, fixed, order, axis, true);
    }

    /// Append a trace in frame `frames[0]` and a retrace in `frames[1]`;
    /// only the trace starts with a slow move.
    fn trace_retrace(&mut self, fixed: usize, frames: [usize; 2], forward: &[usize], reverse: &[usize], axis: Axis) {
        self.push_line(frames[0], fixed, forward, axis, true);
        self.push_line(frames[1], fixed, reverse, axis, false);
    }

    fn push_line(&mut self, k: usize, fixed: usize, order: &[usize], axis: Axis, slow_start: bool) {
        for (n, &step) in order.iter().enumerate() {
            self.slow_move.push(slow_start && n == 0);
            self.indices.push(match axis {
                Axis::Horizontal => [k, fixed, step],
                Axis::Vertical => [k, step, fixed],
            });
        }
    }
}

/// 3D zig-zag index generator with an arbitrary axis nesting order.
///
/// `axis_order[0]` is the slowest axis and `axis_order[2]` the fastest.
/// The middle axis reverses on every odd outer step and the fast axis
/// reverses whenever the sum of the two outer indices is odd, so
/// consecutive indices always differ by one step along a single axis.
pub fn zigzag_3d(dims: [usize; 3], axis_order: [usize; 3]) -> impl Iterator<Item = [usize; 3]> {
    let [ax0, ax1, ax2] = axis_order;
    (0..dims[ax0]).flat_map(move |i0| {
        let reverse1 = i0 % 2 == 1;
        (0..dims[ax1]).flat_map(move |n1| {
            let i1 = if reverse1 { dims[ax1] - 1 - n1 } else { n1 };
            let reverse2 = (i0 + i1) % 2 == 1;
            (0..dims[ax2]).map(move |n2| {
                let i2 = if reverse2 { dims[ax2] - 1 - n2 } else { n2 };
                let mut ijk = [0; 3];
                ijk[ax0] = i0;
                ijk[ax1] = i1;
                ijk[ax2] = i2;
                ijk
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn axis(n: usize) -> LinearRange {
        LinearRange::from_num(0.0, (n - 1) as f64, n).unwrap()
    }

    #[test]
    fn test_scan_type_names_round_trip() {
        for scan_type in ScanType::ALL {
            assert_eq!(scan_type.to_string().parse::<ScanType>().unwrap(), scan_type);
        }
        assert_eq!("Trace-Retrace".parse::<ScanType>().unwrap(), ScanType::TraceRetrace);
        assert!(matches!("spiral".parse::<ScanType>(), Err(ScanError::UnknownScanType(_))));
    }

    #[test]
    fn test_raster_order() {
        let plan = ScanPlan::generate(ScanType::Raster, &axis(3), &axis(2));
        assert_eq!(plan.shape, (1, 2, 3));
        assert_eq!(
            plan.indices,
            vec![[0, 0, 0], [0, 0, 1], [0, 0, 2], [0, 1, 0], [0, 1, 1], [0, 1, 2]]
        );
        assert_eq!(plan.slow_move, vec![true, false, false, true, false, false]);
        assert_eq!(plan.h_positions, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(plan.v_positions, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_serpentine_reverses_odd_lines() {
        let plan = ScanPlan::generate(ScanType::Serpentine, &axis(3), &axis(3));
        let columns: Vec<usize> = plan.indices.iter().map(|idx| idx[2]).collect();
        assert_eq!(columns, vec![0, 1, 2, 2, 1, 0, 0, 1, 2]);
        assert_eq!(plan.num_lines(), 3);
    }

    #[test]
    fn test_trace_retrace_frames() {
        let plan = ScanPlan::generate(ScanType::TraceRetrace, &axis(2), &axis(2));
        assert_eq!(plan.shape, (2, 2, 2));
        assert_eq!(
            plan.indices[..4],
            [[0, 0, 0], [0, 0, 1], [1, 0, 1], [1, 0, 0]]
        );
        // Only the trace of each line starts with a slow move
        assert_eq!(plan.num_lines(), 2);
    }

    #[test]
    fn test_ortho_raster_adds_column_pass() {
        let plan = ScanPlan::generate(ScanType::OrthoRaster, &axis(2), &axis(3));
        assert_eq!(plan.num_pixels(), 12);
        assert_eq!(plan.indices[6..9], [[1, 0, 0], [1, 1, 0], [1, 2, 0]]);
        assert_eq!(plan.num_lines(), 3 + 2);
    }

    #[test]
    fn test_ortho_trace_retrace_uses_four_frames() {
        let plan = ScanPlan::generate(ScanType::OrthoTraceRetrace, &axis(2), &axis(2));
        assert_eq!(plan.shape, (4, 2, 2));
        assert_eq!(plan.num_pixels(), 16);
        assert_eq!(plan.indices[8..12], [[2, 0, 0], [2, 1, 0], [3, 1, 0], [3, 0, 0]]);
    }

    #[test]
    fn test_every_pixel_visited_once() {
        let (h, v) = (axis(4), axis(3));
        for scan_type in ScanType::ALL {
            let plan = ScanPlan::generate(scan_type, &h, &v);
            let unique: HashSet<[usize; 3]> = plan.indices.iter().copied().collect();
            assert_eq!(unique.len(), plan.num_pixels(), "{scan_type}");
            assert_eq!(plan.num_pixels(), scan_type.frames() * 12, "{scan_type}");
            assert_eq!(plan.h_positions.len(), plan.num_pixels());
            assert!(plan.slow_move[0]);
        }
    }

    #[test]
    fn test_extents() {
        let h = LinearRange::from_step(25.0, 45.0, 1.0).unwrap();
        let v = LinearRange::from_step(25.0, 45.0, 2.0).unwrap();
        let plan = ScanPlan::generate(ScanType::Raster, &h, &v);
        assert_eq!(plan.range_extent, [25.0, 45.0, 25.0, 45.0]);
        assert_eq!(plan.corners, [25.0, 45.0, 25.0, 45.0]);
        assert_eq!(plan.imshow_extent, [24.5, 45.5, 24.0, 46.0]);
        assert_eq!(plan.shape, (1, 11, 21));
    }

    #[test]
    fn test_delta() {
        let plan = ScanPlan::generate(ScanType::Serpentine, &axis(2), &axis(2));
        assert_eq!(plan.delta(0), (0.0, 0.0));
        assert_eq!(plan.delta(1), (1.0, 0.0));
        assert_eq!(plan.delta(2), (0.0, 1.0));
        assert_eq!(plan.delta(3), (-1.0, 0.0));
    }

    #[test]
    fn test_zigzag_default_order() {
        let indices: Vec<[usize; 3]> = zigzag_3d([2, 2, 2], [0, 1, 2]).collect();
        assert_eq!(
            indices,
            vec![
                [0, 0, 0],
                [0, 0, 1],
                [0, 1, 1],
                [0, 1, 0],
                [1, 1, 0],
                [1, 1, 1],
                [1, 0, 1],
                [1, 0, 0],
            ]
        );
    }

    #[test]
    fn test_zigzag_steps_are_adjacent() {
        let indices: Vec<[usize; 3]> = zigzag_3d([3, 4, 2], [2, 0, 1]).collect();
        assert_eq!(indices.len(), 24);
        for pair in indices.windows(2) {
            let distance: usize = (0..3).map(|a| pair[0][a].abs_diff(pair[1][a])).sum();
            assert_eq!(distance, 1, "{:?}", pair);
        }
    }
}
