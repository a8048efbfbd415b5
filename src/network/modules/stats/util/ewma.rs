/// Exponentially weighted moving average of a stream of observations.
///
/// Each update blends the new observation in with weight `alpha`, so a
/// larger alpha forgets older observations faster.
///
/// ```
/// use qsed::network::modules::stats::util::ewma::Ewma;
///
/// let mut ewma = Ewma::new(0.5);
/// assert_eq!(ewma.update(1.0), 1.0);
/// assert_eq!(ewma.update(0.0), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Ewma {
    alpha: f64,
    current_value: Option<f64>,
}

impl Ewma {
    /// Creates an average with smoothing factor `alpha`, clamped into `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha > 0.0 { alpha.min(1.0) } else { f64::EPSILON };
        Self {
            alpha,
            current_value: None,
        }
    }

    /// Folds in an observation and returns the updated average.
    pub fn update(&mut self, observation: f64) -> f64 {
        let value = match self.current_value {
            Some(current) => current.mul_add(1.0 - self.alpha, observation * self.alpha),
            // the first observation seeds the average
            None => observation,
        };
        self.current_value = Some(value);
        value
    }

    /// Current average, `None` until the first update
    pub fn get(&self) -> Option<f64> {
        self.current_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update() {
        let mut ewma = Ewma::new(0.5);
        assert_eq!(ewma.get(), None);
        assert_eq!(ewma.update(10.0), 10.0);
        assert_eq!(ewma.update(20.0), 15.0);
        assert_eq!(ewma.update(30.0), 22.5);
    }

    #[test]
    fn test_alpha_is_clamped() {
        // an alpha above one tracks the latest observation
        let mut ewma = Ewma::new(1.5);
        ewma.update(10.0);
        assert_eq!(ewma.update(20.0), 20.0);

        // a non-positive alpha keeps the first observation
        let mut ewma = Ewma::new(0.0);
        ewma.update(10.0);
        assert!((ewma.update(20.0) - 10.0).abs() < 1e-9);
    }
}
