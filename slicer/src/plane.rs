use nalgebra::Vector2;

use crate::{
    error::{Degenerate, Result},
    Pos,
};

/// An oriented plane. The normal is always stored with unit length and
/// points towards the positive side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: Pos,
    normal: Pos,
}

impl Plane {
    pub fn new(origin: Pos, normal: Pos) -> Result<Self> {
        Ok(Self {
            origin,
            normal: unit_normal(normal)?,
        })
    }

    /// The plane `z = height`, facing up.
    pub fn horizontal(height: f32) -> Self {
        Self {
            origin: Pos::new(0.0, 0.0, height),
            normal: Pos::z(),
        }
    }

    pub fn origin(&self) -> Pos {
        self.origin
    }

    pub fn normal(&self) -> Pos {
        self.normal
    }

    pub fn set_origin(&mut self, origin: Pos) {
        self.origin = origin;
    }

    /// Sets the normal, normalizing it first. Fails without changing the
    /// plane if the vector is too short to have a direction.
    pub fn set_normal(&mut self, normal: Pos) -> Result<()> {
        self.normal = unit_normal(normal)?;
        Ok(())
    }

    /// Distance from the plane to a point, positive on the side the normal
    /// points towards.
    pub fn signed_distance(&self, point: &Pos) -> f32 {
        self.normal.dot(&(point - self.origin))
    }

    /// Two unit vectors spanning the plane. Together with the normal they
    /// form a right handed frame.
    pub fn basis(&self) -> (Pos, Pos) {
        let seed = if self.normal.x.abs() > 0.9 {
            Pos::y()
        } else {
            Pos::x()
        };

        let y_axis = self.normal.cross(&seed).normalize();
        let x_axis = y_axis.cross(&self.normal).normalize();
        (x_axis, y_axis)
    }

    /// Coordinates of a point in the plane's own 2D frame, centered on the
    /// origin.
    pub fn project(&self, point: &Pos) -> Vector2<f32> {
        let (x_axis, y_axis) = self.basis();
        let offset = point - self.origin;
        Vector2::new(offset.dot(&x_axis), offset.dot(&y_axis))
    }

    /// Creates `steps` planes going from `start` to `end`, interpolating both
    /// the origin and the normal. A single step gives the plane halfway
    /// between the two.
    pub fn interpolate(start: &Plane, end: &Plane, steps: usize) -> Result<Vec<Plane>> {
        (0..steps)
            .map(|i| {
                let t = match steps {
                    1 => 0.5,
                    _ => i as f32 / (steps - 1) as f32,
                };

                Plane::new(
                    start.origin.lerp(&end.origin, t),
                    start.normal.lerp(&end.normal, t),
                )
            })
            .collect()
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

fn unit_normal(normal: Pos) -> Result<Pos> {
    let length = normal.magnitude();
    if length.is_nan() || length < f32::EPSILON {
        return Err(Degenerate::ZeroNormal(length).into());
    }

    Ok(normal / length)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn normal_is_normalized() {
        let mut plane = Plane::default();
        plane.set_normal(Pos::new(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(plane.normal(), Pos::new(0.0, 0.0, 1.0));

        let plane = Plane::new(Pos::zeros(), Pos::new(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(plane.normal(), Pos::new(0.6, 0.8, 0.0));
        assert_relative_eq!(plane.normal().magnitude(), 1.0);
    }

    #[test]
    fn zero_normal_is_rejected() {
        let mut plane = Plane::horizontal(2.0);
        let err = plane.set_normal(Pos::zeros()).unwrap_err();
        assert_eq!(err.degenerate(), Some(&Degenerate::ZeroNormal(0.0)));
        assert_eq!(plane, Plane::horizontal(2.0));

        assert!(Plane::new(Pos::zeros(), Pos::repeat(f32::NAN)).is_err());
    }

    #[test]
    fn signed_distance_follows_normal() {
        let plane = Plane::new(Pos::new(0.0, 0.0, 1.0), Pos::new(0.0, 0.0, -2.0)).unwrap();
        assert_eq!(plane.signed_distance(&Pos::new(4.0, 4.0, 0.0)), 1.0);
        assert_eq!(plane.signed_distance(&Pos::new(0.0, 0.0, 3.0)), -2.0);
    }

    #[test]
    fn basis_is_orthonormal() {
        for normal in [Pos::x(), Pos::y(), Pos::z(), Pos::new(1.0, -2.0, 0.5)] {
            let plane = Plane::new(Pos::zeros(), normal).unwrap();
            let (x, y) = plane.basis();
            let n = plane.normal();

            assert_relative_eq!(x.magnitude(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(y.magnitude(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(x.dot(&y), 0.0, epsilon = 1e-6);
            assert_relative_eq!(x.dot(&n), 0.0, epsilon = 1e-6);
            assert_relative_eq!(x.cross(&y), n, epsilon = 1e-6);
        }
    }

    #[test]
    fn project_drops_normal_component() {
        let plane = Plane::horizontal(3.0);
        let local = plane.project(&Pos::new(2.0, -1.0, 10.0));
        assert_relative_eq!(local, Vector2::new(2.0, -1.0));
    }

    #[test]
    fn interpolate_planes() {
        let start = Plane::horizontal(0.0);
        let end = Plane::horizontal(4.0);

        let planes = Plane::interpolate(&start, &end, 5).unwrap();
        let heights = planes.iter().map(|x| x.origin().z).collect::<Vec<_>>();
        assert_eq!(heights, [0.0, 1.0, 2.0, 3.0, 4.0]);

        let middle = Plane::interpolate(&start, &end, 1).unwrap();
        assert_eq!(middle[0].origin().z, 2.0);

        let flipped = Plane::new(Pos::zeros(), -Pos::z()).unwrap();
        assert!(Plane::interpolate(&start, &flipped, 3).is_err());
    }
}
