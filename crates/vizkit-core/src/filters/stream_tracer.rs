//! Streamline integration through a vector field.
//!
//! Lines are integrated with classic fourth-order Runge-Kutta. The
//! integration step is a fixed arc length (a fraction of the grid cell
//! size), so the time step shrinks where the flow is fast. The output is
//! resampled at a fixed interval of *time*, which makes point density along
//! a line proportional to the local speed.
//!
//! Every output point carries its speed as a scalar and a unit normal
//! perpendicular to the line. With vorticity enabled the normal is rotated
//! about the tangent by half the streamwise vorticity, which is what makes
//! ribbons built from the lines twist with the flow.

#![allow(clippy::cast_possible_truncation)]

use glam::{Quat, Vec3};

use super::perpendicular;
use crate::error::Result;
use crate::image_data::ImageData;
use crate::poly_data::PolyData;

/// Which way to integrate from each seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationDirection {
    /// Downstream only.
    #[default]
    Forward,
    /// Upstream only.
    Backward,
    /// Both ways, joined at the seed.
    Both,
}

/// Traces streamlines from seed points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamTracer {
    /// Maximum integration time per direction.
    pub maximum_propagation_time: f32,
    /// Integration step as a fraction of the cell size.
    pub integration_step_length: f32,
    /// Output sampling interval, in time units. Zero keeps every step.
    pub step_length: f32,
    /// Integration direction.
    pub direction: IntegrationDirection,
    /// Rotate the normals with the streamwise vorticity.
    pub compute_vorticity: bool,
    /// Integration stops where the speed drops below this.
    pub terminal_speed: f32,
    /// Hard cap on integration steps per direction.
    pub maximum_steps: usize,
}

impl Default for StreamTracer {
    fn default() -> Self {
        Self {
            maximum_propagation_time: 200.0,
            integration_step_length: 0.2,
            step_length: 0.1,
            direction: IntegrationDirection::Forward,
            compute_vorticity: true,
            terminal_speed: 1e-6,
            maximum_steps: 20_000,
        }
    }
}

/// One output point before assembly.
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Vec3,
    speed: f32,
    normal: Vec3,
    time: f32,
}

impl StreamTracer {
    /// Traces one line per seed through the active vectors of `field`.
    ///
    /// Seeds outside the field, or whose line has fewer than two points, are
    /// skipped with a warning. The result has one polyline per traced seed,
    /// speed scalars and point normals.
    pub fn execute(&self, field: &ImageData, seeds: &[Vec3]) -> Result<PolyData> {
        field.require_vectors()?;

        let mut out = PolyData::new();
        let mut speeds = Vec::new();
        let mut normals = Vec::new();
        let mut skipped = 0usize;
        for &seed in seeds {
            let samples = self.trace(field, seed);
            if samples.len() < 2 {
                skipped += 1;
                continue;
            }
            let start = out.points.len() as u32;
            out.lines
                .push((start..start + samples.len() as u32).collect());
            for s in samples {
                out.points.push(s.position);
                speeds.push(s.speed);
                normals.push(s.normal);
            }
        }
        if skipped > 0 {
            log::warn!(
                "{skipped} of {} seeds produced no streamline",
                seeds.len()
            );
        }
        out.point_data.scalars = Some(speeds);
        out.point_data.normals = Some(normals);
        log::debug!(
            "traced {} streamlines, {} points",
            out.lines.len(),
            out.num_points()
        );
        Ok(out)
    }

    fn trace(&self, field: &ImageData, seed: Vec3) -> Vec<Sample> {
        match self.direction {
            IntegrationDirection::Forward => self.integrate(field, seed, 1.0),
            IntegrationDirection::Backward => {
                let mut line = self.integrate(field, seed, -1.0);
                line.reverse();
                line
            }
            IntegrationDirection::Both => {
                let mut line = self.integrate(field, seed, -1.0);
                line.reverse();
                // The seed is the first point of both halves.
                line.pop();
                let forward = self.integrate(field, seed, 1.0);
                if forward.is_empty() {
                    return Vec::new();
                }
                line.extend(forward);
                line
            }
        }
    }

    /// Integrates from `seed` along `sign * v`.
    #[allow(clippy::similar_names)]
    fn integrate(&self, field: &ImageData, seed: Vec3, sign: f32) -> Vec<Sample> {
        let velocity = |p: Vec3| field.interpolate_vector(p).map(|v| v * sign);
        let Some(mut v) = velocity(seed) else {
            log::debug!("seed {seed} lies outside the field");
            return Vec::new();
        };

        let h = self.integration_step_length * field.cell_size();
        let resample = self.step_length > 0.0;
        let mut p = seed;
        let mut t = 0.0_f32;
        let mut normal = initial_normal(v, field.vorticity(seed));
        let mut line = vec![Sample {
            position: p,
            speed: v.length(),
            normal,
            time: 0.0,
        }];
        let mut next_output = self.step_length;

        for _ in 0..self.maximum_steps {
            let speed = v.length();
            if speed < self.terminal_speed || t >= self.maximum_propagation_time {
                break;
            }
            let dt = (h / speed).min(self.maximum_propagation_time - t);
            if dt <= f32::EPSILON {
                break;
            }
            let Some(p_next) = rk4(&velocity, p, dt) else {
                break;
            };
            let Some(v_next) = velocity(p_next) else {
                break;
            };

            let tangent = v / speed;
            let mut n_next = normal;
            if self.compute_vorticity {
                if let Some(w) = field.vorticity(p) {
                    let angle = 0.5 * (w * sign).dot(tangent) * dt;
                    n_next = Quat::from_axis_angle(tangent, angle) * n_next;
                }
            }
            let t_next_dir = v_next.normalize_or_zero();
            n_next = perpendicular(n_next, t_next_dir).unwrap_or(normal);

            let t_next = t + dt;
            if resample {
                while next_output <= t_next {
                    let f = (next_output - t) / dt;
                    line.push(Sample {
                        position: p.lerp(p_next, f),
                        speed: speed + (v_next.length() - speed) * f,
                        normal: normal.lerp(n_next, f).normalize_or(n_next),
                        time: next_output,
                    });
                    next_output += self.step_length;
                }
            } else {
                line.push(Sample {
                    position: p_next,
                    speed: v_next.length(),
                    normal: n_next,
                    time: t_next,
                });
            }
            p = p_next;
            v = v_next;
            t = t_next;
            normal = n_next;
        }

        // Keep the end of the line even when it falls between samples.
        if line
            .last()
            .is_some_and(|s| t - s.time > 1e-3 * self.step_length)
        {
            line.push(Sample {
                position: p,
                speed: v.length(),
                normal,
                time: t,
            });
        }
        line
    }
}

fn rk4(f: impl Fn(Vec3) -> Option<Vec3>, p: Vec3, dt: f32) -> Option<Vec3> {
    let k1 = f(p)?;
    let k2 = f(p + k1 * (dt * 0.5))?;
    let k3 = f(p + k2 * (dt * 0.5))?;
    let k4 = f(p + k3 * dt)?;
    Some(p + (k1 + 2.0 * k2 + 2.0 * k3 + k4) * (dt / 6.0))
}

/// Starting normal: perpendicular to both flow and vorticity when they are
/// not parallel, otherwise any vector perpendicular to the flow.
fn initial_normal(v: Vec3, vorticity: Option<Vec3>) -> Vec3 {
    let t = v.normalize_or_zero();
    if t == Vec3::ZERO {
        return Vec3::Z;
    }
    vorticity
        .and_then(|w| {
            let n = t.cross(w).normalize_or_zero();
            (n != Vec3::ZERO).then_some(n)
        })
        .unwrap_or_else(|| t.any_orthonormal_vector())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(n: usize, f: impl Fn(Vec3) -> Vec3) -> ImageData {
        let mut img = ImageData::new([n, n, n]).unwrap();
        let mut vectors = Vec::with_capacity(n * n * n);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    vectors.push(f(img.point(i, j, k)));
                }
            }
        }
        img.set_vectors("Velocity", vectors).unwrap();
        img
    }

    #[test]
    fn test_uniform_flow_is_straight_and_resampled() {
        let img = field(11, |_| Vec3::X);
        let out = StreamTracer::default()
            .execute(&img, &[Vec3::new(0.5, 5.0, 5.0)])
            .unwrap();
        assert_eq!(out.lines.len(), 1);
        let pts = &out.points;
        assert!(pts.last().unwrap().x > 9.5);
        for w in pts.windows(2) {
            assert!((w[1].y - 5.0).abs() < 1e-4 && (w[1].z - 5.0).abs() < 1e-4);
            assert!(w[1].x > w[0].x);
        }
        // Unit speed: 0.1 time units apart means 0.1 length units apart.
        assert!((pts[1].x - pts[0].x - 0.1).abs() < 1e-4);
        let speeds = out.point_data.scalars.as_ref().unwrap();
        assert!(speeds.iter().all(|s| (s - 1.0).abs() < 1e-5));
        for n in out.point_data.normals.as_ref().unwrap() {
            assert!(n.dot(Vec3::X).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_both_directions_span_the_field() {
        let img = field(11, |_| Vec3::Y);
        let tracer = StreamTracer {
            direction: IntegrationDirection::Both,
            ..StreamTracer::default()
        };
        let out = tracer.execute(&img, &[Vec3::splat(5.0)]).unwrap();
        let first = out.points.first().unwrap();
        let last = out.points.last().unwrap();
        assert!(first.y < 0.5 && last.y > 9.5);
        assert!(out.points.windows(2).all(|w| w[1].y > w[0].y));
    }

    #[test]
    fn test_rotation_keeps_radius() {
        let c = Vec3::new(10.0, 10.0, 10.0);
        let img = field(21, |p| {
            let d = p - c;
            Vec3::new(-d.y, d.x, 0.0)
        });
        let tracer = StreamTracer {
            maximum_propagation_time: 3.0,
            ..StreamTracer::default()
        };
        let out = tracer
            .execute(&img, &[c + Vec3::new(5.0, 0.0, 0.0)])
            .unwrap();
        for p in &out.points {
            assert!(((*p - c).length() - 5.0).abs() < 1e-2);
        }
        // 3 time units at 0.1 apart, plus the seed.
        assert_eq!(out.num_points(), 31);
    }

    #[test]
    fn test_normals_twist_with_streamwise_vorticity() {
        // Rigid swirl about the z axis through (5, 5) plus unit axial flow:
        // the line along the axis sees vorticity (0, 0, 2 * omega).
        let omega = 0.2;
        let img = field(11, |p| Vec3::new(-omega * (p.y - 5.0), omega * (p.x - 5.0), 1.0));
        let tracer = StreamTracer {
            maximum_propagation_time: 8.0,
            ..StreamTracer::default()
        };
        let out = tracer.execute(&img, &[Vec3::new(5.0, 5.0, 0.5)]).unwrap();
        let normals = out.point_data.normals.as_ref().unwrap();
        let n0 = normals[0];
        assert!(out.num_points() > 70);
        for (p, n) in out.points.iter().zip(normals) {
            assert!((p.x - 5.0).abs() < 1e-4 && (p.y - 5.0).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.dot(Vec3::Z).abs() < 1e-4);
            // Unit speed, so the elapsed time is the distance travelled.
            let t = p.z - 0.5;
            let turned = n0.cross(*n).z.atan2(n0.dot(*n));
            assert!((turned - omega * t).abs() < 2e-3, "t={t} turned={turned}");
        }
        let last = normals.last().unwrap();
        assert!(n0.dot(*last) < 0.0, "expected more than a quarter turn");
    }

    #[test]
    fn test_vorticity_off_keeps_normals_fixed() {
        let omega = 0.2;
        let img = field(11, |p| Vec3::new(-omega * (p.y - 5.0), omega * (p.x - 5.0), 1.0));
        let tracer = StreamTracer {
            maximum_propagation_time: 8.0,
            compute_vorticity: false,
            ..StreamTracer::default()
        };
        let out = tracer.execute(&img, &[Vec3::new(5.0, 5.0, 0.5)]).unwrap();
        let normals = out.point_data.normals.as_ref().unwrap();
        assert!(normals.iter().all(|n| (*n - normals[0]).length() < 1e-4));
    }

    #[test]
    fn test_terminal_speed_ends_line() {
        // Speed falls linearly from 1 at x = 0 to a stagnation point at x = 10.
        let img = field(11, |p| Vec3::new(1.0 - 0.1 * p.x, 0.0, 0.0));
        let tracer = StreamTracer {
            terminal_speed: 0.5,
            ..StreamTracer::default()
        };
        let out = tracer.execute(&img, &[Vec3::new(0.5, 5.0, 5.0)]).unwrap();
        let last = out.points.last().unwrap();
        assert!((4.9..5.25).contains(&last.x), "{last:?}");
        let speeds = out.point_data.scalars.as_ref().unwrap();
        let (_, before_end) = speeds.split_last().unwrap();
        assert!(before_end.iter().all(|&s| s > 0.47));
    }

    #[test]
    fn test_backward_trace_ends_at_seed() {
        let img = field(11, |_| Vec3::X);
        let tracer = StreamTracer {
            direction: IntegrationDirection::Backward,
            ..StreamTracer::default()
        };
        let seed = Vec3::splat(5.0);
        let out = tracer.execute(&img, &[seed]).unwrap();
        assert_eq!(*out.points.last().unwrap(), seed);
        assert!(out.points[0].x < 0.5);
        assert!(out.points.windows(2).all(|w| w[1].x > w[0].x));
        for n in out.point_data.normals.as_ref().unwrap() {
            assert!(n.dot(Vec3::X).abs() < 1e-4);
        }
    }

    #[test]
    fn test_outside_seed_is_skipped() {
        let img = field(5, |_| Vec3::X);
        let out = StreamTracer::default()
            .execute(&img, &[Vec3::splat(-3.0), Vec3::new(0.0, 2.0, 2.0)])
            .unwrap();
        assert_eq!(out.lines.len(), 1);
    }

    #[test]
    fn test_requires_vectors() {
        let img = ImageData::new([3, 3, 3]).unwrap();
        assert!(StreamTracer::default().execute(&img, &[Vec3::ONE]).is_err());
    }
}
