use std::fmt;

use serde::{Deserialize, Serialize};

use crate::linspace::Linspace;
use crate::math::interp_one;

/// Shape of a fuzzy set over a variable's domain.
///
/// Breakpoints must be finite and non-decreasing. Membership is 0 outside
/// `[first, last]`, rises linearly to 1, stays there across the plateau and
/// falls linearly back to 0. When two neighbouring breakpoints coincide the
/// vertical edge takes the plateau value, so `Triangular(a, a, c)` is a left
/// shoulder that is fully true at `a`.
///
/// In TOML a shape is written `{ triangular = [a, b, c] }` or
/// `{ trapezoidal = [a, b, c, d] }`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShapeRepr", into = "ShapeRepr")]
pub enum MembershipShape {
    Triangular(f64, f64, f64),
    Trapezoidal(f64, f64, f64, f64),
}

// Serialized as a newtype variant over an array, which TOML can write back.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShapeRepr {
    Triangular([f64; 3]),
    Trapezoidal([f64; 4]),
}

impl From<ShapeRepr> for MembershipShape {
    fn from(repr: ShapeRepr) -> Self {
        match repr {
            ShapeRepr::Triangular([a, b, c]) => Self::Triangular(a, b, c),
            ShapeRepr::Trapezoidal([a, b, c, d]) => Self::Trapezoidal(a, b, c, d),
        }
    }
}

impl From<MembershipShape> for ShapeRepr {
    fn from(shape: MembershipShape) -> Self {
        match shape {
            MembershipShape::Triangular(a, b, c) => Self::Triangular([a, b, c]),
            MembershipShape::Trapezoidal(a, b, c, d) => Self::Trapezoidal([a, b, c, d]),
        }
    }
}

impl MembershipShape {
    /// Degree of membership of `x`, always within `[0, 1]`.
    pub fn membership(&self, x: f64) -> f64 {
        let degree = interp_one(x, &self.coords());

        // NaN in, 0 out
        if degree.is_nan() {
            0.
        } else {
            degree.clamp(0., 1.)
        }
    }

    /// The shape as `(x, degree)` corner points.
    pub(crate) fn coords(&self) -> Vec<(f64, f64)> {
        match *self {
            Self::Triangular(a, b, c) => vec![(a, 0.), (b, 1.), (c, 0.)],
            Self::Trapezoidal(a, b, c, d) => vec![(a, 0.), (b, 1.), (c, 1.), (d, 0.)],
        }
    }

    pub fn breakpoints(&self) -> Vec<f64> {
        match *self {
            Self::Triangular(a, b, c) => vec![a, b, c],
            Self::Trapezoidal(a, b, c, d) => vec![a, b, c, d],
        }
    }

    /// Finite, non-decreasing breakpoints.
    pub fn is_well_formed(&self) -> bool {
        let points = self.breakpoints();

        points.iter().all(|p| p.is_finite()) && points.windows(2).all(|w| w[0] <= w[1])
    }

    /// The closed interval outside of which membership is 0.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Self::Triangular(a, _, c) => (a, c),
            Self::Trapezoidal(a, _, _, d) => (a, d),
        }
    }

    /// Splits `[min, max]` into `n` overlapping sets with evenly spaced peaks:
    /// a left shoulder trapezoid, `n - 2` triangles and a right shoulder
    /// trapezoid. Neighbouring sets cross at 0.5 and degrees sum to 1
    /// everywhere in the domain.
    pub fn partition(min: f64, max: f64, n: usize) -> Vec<Self> {
        match n {
            0 => Vec::new(),
            1 => vec![Self::Trapezoidal(min, min, max, max)],
            _ => {
                let peaks: Vec<f64> = Linspace::new(min, max, n).collect();

                (0..n)
                    .map(|i| match i {
                        0 => Self::Trapezoidal(min, min, min, peaks[1]),
                        _ if i + 1 == n => Self::Trapezoidal(peaks[i - 1], max, max, max),
                        _ => Self::Triangular(peaks[i - 1], peaks[i], peaks[i + 1]),
                    })
                    .collect()
            },
        }
    }
}

impl fmt::Display for MembershipShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triangular(a, b, c) => write!(f, "triangular({a}, {b}, {c})"),
            Self::Trapezoidal(a, b, c, d) => write!(f, "trapezoidal({a}, {b}, {c}, {d})"),
        }
    }
}

#[test]
fn test_triangular_membership() {
    let shape = MembershipShape::Triangular(0., 5., 10.);

    assert_eq!(shape.membership(-1.), 0.);
    assert_eq!(shape.membership(0.), 0.);
    assert_eq!(shape.membership(2.5), 0.5);
    assert_eq!(shape.membership(5.), 1.);
    assert_eq!(shape.membership(7.5), 0.5);
    assert_eq!(shape.membership(10.), 0.);
    assert_eq!(shape.membership(11.), 0.);
    assert_eq!(shape.membership(f64::NAN), 0.);
}

#[test]
fn test_trapezoidal_membership() {
    let shape = MembershipShape::Trapezoidal(0., 2., 4., 8.);

    assert_eq!(shape.membership(1.), 0.5);
    assert_eq!(shape.membership(2.), 1.);
    assert_eq!(shape.membership(3.), 1.);
    assert_eq!(shape.membership(4.), 1.);
    assert_eq!(shape.membership(6.), 0.5);
    assert_eq!(shape.membership(8.), 0.);
}

#[test]
fn test_shoulders() {
    let left = MembershipShape::Triangular(0., 0., 4.);
    let right = MembershipShape::Trapezoidal(6., 10., 10., 10.);

    assert_eq!(left.membership(0.), 1.);
    assert_eq!(left.membership(1.), 0.75);
    assert_eq!(right.membership(10.), 1.);
    assert_eq!(right.membership(8.), 0.5);
}

#[test]
fn test_well_formed() {
    assert!(MembershipShape::Triangular(1., 1., 1.).is_well_formed());
    assert!(MembershipShape::Trapezoidal(0., 1., 2., 3.).is_well_formed());
    assert!(!MembershipShape::Triangular(0., 2., 1.).is_well_formed());
    assert!(!MembershipShape::Trapezoidal(0., 1., f64::INFINITY, 3.).is_well_formed());
}

#[test]
fn test_partition_sums_to_one() {
    let shapes = MembershipShape::partition(0., 100., 3);

    assert_eq!(
        shapes,
        vec![
            MembershipShape::Trapezoidal(0., 0., 0., 50.),
            MembershipShape::Triangular(0., 50., 100.),
            MembershipShape::Trapezoidal(50., 100., 100., 100.),
        ]
    );

    assert_eq!(shapes[0].membership(0.), 1.);
    assert_eq!(shapes[2].membership(100.), 1.);

    for x in [0., 12.5, 25., 50., 80., 100.] {
        let total: f64 = shapes.iter().map(|s| s.membership(x)).sum();

        assert!((total - 1.).abs() < 1e-12, "degrees at {x} sum to {total}");
    }
}
