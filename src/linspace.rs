/// Evenly spaced samples over a closed interval, both ends included.
#[derive(Clone, Debug)]
pub(crate) struct Linspace {
    start: f64,
    end: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub(crate) fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 { (max - min) / (n - 1) as f64 } else { 0. };

        Linspace {
            start: min,
            end: max,
            step,
            index: 0,
            len: n,
        }
    }

    /// Samples `[min, max]` every `step`, rounding the count down the way
    /// `int((max - min) / step) + 1` would. Always yields at least both ends.
    pub(crate) fn with_step(min: f64, max: f64, step: f64) -> Self {
        // Counted in f64 so a huge quotient saturates instead of overflowing
        let num = (((max - min) / step).floor() + 1.) as usize;

        Self::new(min, max, num.max(2))
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            return None;
        }

        let i = self.index;
        self.index += 1;

        // Pin the last sample so accumulated rounding never leaves it short of `end`
        if i + 1 == self.len && self.len > 1 {
            Some(self.end)
        } else {
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

#[test]
fn test_linspace_includes_both_ends() {
    let points: Vec<_> = Linspace::new(-3., 3., 7).collect();

    assert_eq!(points, vec![-3., -2., -1., 0., 1., 2., 3.]);
}

#[test]
fn test_linspace_with_step() {
    let points: Vec<_> = Linspace::with_step(0., 1., 0.25).collect();
    assert_eq!(points, vec![0., 0.25, 0.5, 0.75, 1.]);

    // A step wider than the span still samples both ends
    let points: Vec<_> = Linspace::with_step(0., 1., 5.).collect();
    assert_eq!(points, vec![0., 1.]);

    assert_eq!(Linspace::with_step(0., 1e300, 1e-300).len(), usize::MAX);
}
