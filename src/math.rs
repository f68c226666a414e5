use num::Float;

/// Piecewise-linear interpolation through `coords`, similar to numpy.interp.
///
/// Values left of the first point take the first `y`, values right of the last
/// point take the last `y`. A vertical segment (two points sharing an `x`) takes
/// the larger of its two `y`s, which is what gives shoulder shapes their plateau
/// value at the domain edge.
pub(crate) fn interp_one<F: Float>(x: F, coords: &[(F, F)]) -> F {
    let Some(&(first_x, first_y)) = coords.first() else {
        return F::zero();
    };

    if x < first_x {
        return first_y;
    }

    for window in coords.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];

        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return F::max(y1, y2);
            }

            return y1 + (x - x1) * (y2 - y1) / (x2 - x1);
        }
    }

    // Only reachable past the last point (or for NaN, which compares false everywhere)
    coords.last().map_or(F::zero(), |&(_, y)| y)
}

/// Interpolates every point of `x_input`.
pub(crate) fn interp<F: Float>(x_input: impl IntoIterator<Item = F>, coords: &[(F, F)]) -> Vec<F> {
    x_input.into_iter().map(|x| interp_one(x, coords)).collect()
}

#[test]
fn test_interp() {
    let x = [0., 1., 1.5, 2.72, 3.24];
    let coords = [(1., 3.), (2., 2.), (3., 0.)];

    assert_eq!(interp(x, &coords), vec![3., 3., 2.5, 0.5599999999999996, 0.]);

    let x = [2.5, -1., 7.5];
    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];

    assert_eq!(interp(x, &coords), vec![4., 0., 2.]);
}

#[test]
fn test_interp_vertical_segments() {
    // Left shoulder: rises vertically at 0, falls to 0 at 2
    let left = [(0., 0.), (0., 1.), (2., 0.)];

    assert_eq!(interp([-1., 0., 1., 2.], &left), vec![0., 1., 0.5, 0.]);

    // Right shoulder: rises from 0 to 1 at 2, drops vertically
    let right = [(0., 0.), (2., 1.), (2., 0.)];

    assert_eq!(interp([0., 1., 2., 3.], &right), vec![0., 0.5, 1., 0.]);
}
