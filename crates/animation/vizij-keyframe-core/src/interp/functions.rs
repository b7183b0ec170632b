//! Interpolation helpers:
//! - lerp_f64 / lerp_vec3 (component-wise)
//! - slerp_quat (shortest arc, nlerp fallback when slerp is ill-defined)
//! - cubic Bezier evaluation in (time, value) space with a Newton solve for
//!   the curve parameter

use nalgebra::{UnitQuaternion, Vector3};

use crate::data::Vec2;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    Vector3::new(
        lerp_f64(a.x, b.x, t),
        lerp_f64(a.y, b.y, t),
        lerp_f64(a.z, b.z, t),
    )
}

/// Spherical linear interpolation along the shortest arc.
#[inline]
pub fn slerp_quat(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    a.try_slerp(b, t, 1.0e-9).unwrap_or_else(|| a.nlerp(b, t))
}

/// Cubic Bezier basis
#[inline]
pub fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    v * v * v * p0 + 3.0 * v * v * u * p1 + 3.0 * v * u * u * p2 + u * u * u * p3
}

#[inline]
pub fn cubic_bezier_derivative(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    3.0 * v * v * (p1 - p0) + 6.0 * v * u * (p2 - p1) + 3.0 * u * u * (p3 - p2)
}

/// One scalar channel segment between two keyframes in absolute (time, value) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierSegment {
    /// Start keyframe `(time, value)`.
    pub start: Vec2,
    /// Out-handle offset of the start keyframe.
    pub out_handle: Vec2,
    /// In-handle offset of the end keyframe.
    pub in_handle: Vec2,
    /// End keyframe `(time, value)`.
    pub end: Vec2,
}

/// Newton-Raphson settings for mapping time onto the curve parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverSettings {
    pub iterations: u32,
    pub tangent_epsilon: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: 5,
            tangent_epsilon: 1e-4,
        }
    }
}

/// Result of the parameter solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierSolve {
    /// Curve parameter in [0, 1].
    pub u: f64,
    /// The flat-tangent guard stopped the iteration early.
    pub degenerate: bool,
}

impl BezierSegment {
    /// Control point times `[P0, C1, C2, P1]`.
    #[inline]
    fn times(&self) -> [f64; 4] {
        [
            self.start.x,
            self.start.x + self.out_handle.x,
            self.end.x + self.in_handle.x,
            self.end.x,
        ]
    }

    /// Control point values `[P0, C1, C2, P1]`.
    #[inline]
    fn values(&self) -> [f64; 4] {
        [
            self.start.y,
            self.start.y + self.out_handle.y,
            self.end.y + self.in_handle.y,
            self.end.y,
        ]
    }

    /// Time component of the curve at parameter `u`.
    pub fn time_at(&self, u: f64) -> f64 {
        let [p0, p1, p2, p3] = self.times();
        cubic_bezier(p0, p1, p2, p3, u)
    }

    /// Value component of the curve at parameter `u`.
    pub fn value_at(&self, u: f64) -> f64 {
        let [p0, p1, p2, p3] = self.values();
        cubic_bezier(p0, p1, p2, p3, u)
    }

    /// Find `u` whose time component equals `start + t_norm * (end - start)`.
    ///
    /// Starts from `u = t_norm` and runs a fixed number of Newton steps,
    /// clamping `u` to [0, 1] after each. Stops early when the time tangent
    /// is flatter than `tangent_epsilon`.
    pub fn solve_parameter(&self, t_norm: f64, settings: &SolverSettings) -> BezierSolve {
        let [p0, p1, p2, p3] = self.times();
        let target = lerp_f64(self.start.x, self.end.x, t_norm);
        let mut u = t_norm.clamp(0.0, 1.0);
        for _ in 0..settings.iterations {
            let slope = cubic_bezier_derivative(p0, p1, p2, p3, u);
            if slope.abs() < settings.tangent_epsilon {
                return BezierSolve {
                    u,
                    degenerate: true,
                };
            }
            let err = cubic_bezier(p0, p1, p2, p3, u) - target;
            u = (u - err / slope).clamp(0.0, 1.0);
        }
        BezierSolve {
            u,
            degenerate: false,
        }
    }

    /// Solve for the curve parameter, then evaluate the value there.
    pub fn evaluate(&self, t_norm: f64, settings: &SolverSettings) -> (f64, BezierSolve) {
        let solve = self.solve_parameter(t_norm, settings);
        (self.value_at(solve.u), solve)
    }
}
