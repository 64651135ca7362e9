use serde::Serialize;

pub const MAX_BUCKET: u8 = 4;

const FIXED_CEILING: f64 = 40.0;
const FIXED_STEP: f64 = 10.0;

/// Maps a raw metric value onto a color bucket in `0..=4`.
///
/// Zero (and anything non-positive) always lands in bucket 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scale {
    /// `[1, 10] -> 1`, `[11, 20] -> 2`, `[21, 30] -> 3`, `> 30 -> 4`.
    Fixed,
    /// Min-max over the strictly positive values of one dataset.
    Dynamic { min: f64, max: f64 },
    /// Dataset without a single positive value.
    Empty,
}

impl Scale {
    pub fn dynamic<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let range = values
            .into_iter()
            .filter(|value| value.is_finite() && *value > 0.0)
            .fold(None, |range: Option<(f64, f64)>, value| match range {
                Some((min, max)) => Some((min.min(value), max.max(value))),
                None => Some((value, value)),
            });

        match range {
            Some((min, max)) => Self::Dynamic { min, max },
            None => Self::Empty,
        }
    }

    pub fn bucket(&self, value: f64) -> u8 {
        if !value.is_finite() || value <= 0.0 {
            return 0;
        }

        match *self {
            Self::Fixed => (value.min(FIXED_CEILING) / FIXED_STEP).ceil() as u8,
            Self::Dynamic { min, max } => {
                if max <= min {
                    return 1;
                }
                let scaled = ((value - min) / (max - min) * f64::from(MAX_BUCKET)).ceil();
                scaled.clamp(1.0, f64::from(MAX_BUCKET)) as u8
            }
            Self::Empty => 0,
        }
    }
}
