use super::FormatError;

/// Classifies values into labelled ranges, e.g. for usage tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    thresholds: Vec<(f64, String)>,
    none_label: String,
    overflow_label: String,
}

impl Buckets {
    /// Builds a classifier from `(upper bound, label)` pairs.
    ///
    /// # Errors
    /// Returns [`FormatError::UnsortedThresholds`] unless the bounds are
    /// strictly ascending.
    pub fn new(
        thresholds: Vec<(f64, String)>,
        none_label: impl Into<String>,
        overflow_label: impl Into<String>,
    ) -> Result<Self, FormatError> {
        if let Some(pair) = thresholds.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(FormatError::UnsortedThresholds {
                previous: pair[0].0,
                next: pair[1].0,
            });
        }

        Ok(Self {
            thresholds,
            none_label: none_label.into(),
            overflow_label: overflow_label.into(),
        })
    }

    /// Label for `value`: the none label for exactly zero, otherwise the
    /// first bucket whose bound is at least `value`, else the overflow label.
    pub fn classify(&self, value: f64) -> &str {
        if value == 0.0 {
            return &self.none_label;
        }

        self.thresholds
            .iter()
            .find(|(threshold, _)| value <= *threshold)
            .map_or(self.overflow_label.as_str(), |(_, label)| label.as_str())
    }
}
