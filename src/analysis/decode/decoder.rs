use std::cmp::Ordering;

use tracing::debug;

use crate::analysis::common::error::Result;
use crate::analysis::model::{ModelOutput, OutputVector};

/// Scales quantized scores to `[0, 1]`; float scores pass through untouched.
///
/// Nothing is clamped or renormalised, the result need not sum to 1.
///
/// # Arguments
///
/// * `output` - Class scores already resolved to a supported element type
///
/// # Returns
///
/// One `f32` per class, in model output order.
pub fn decode(output: &OutputVector) -> Vec<f32> {
    match output {
        OutputVector::UInt8(values) => values.iter().map(|&v| v as f32 / 255.0).collect(),
        OutputVector::Float32(values) => values.clone(),
    }
}

/// Resolves the runtime's element type, then decodes.
///
/// # Errors
///
/// Returns `UnsupportedOutputTypeError` when the output is neither
/// `uint8` nor `float32`. No scores are produced in that case.
pub fn decode_output(output: ModelOutput) -> Result<Vec<f32>> {
    let vector = OutputVector::try_from(output)?;
    debug!("Decoding {} output of {} values", vector.element_type(), vector.len());
    Ok(decode(&vector))
}

/// Index of the largest score, first one wins on ties.
///
/// NaN ranks above every number (all NaNs equal), so a NaN score wins and an
/// all-NaN vector yields `Some(0)`. Only an empty slice gives `None`.
///
/// # Examples
///
/// ```
/// use roya_detect_rs::analysis::argmax;
///
/// assert_eq!(argmax(&[0.5, 0.5, 0.2]), Some(0));
/// assert_eq!(argmax(&[0.2, f32::NAN, 0.1]), Some(1));
/// assert_eq!(argmax(&[]), None);
/// ```
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, max)) if score_order(v, max) != Ordering::Greater => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Total order on scores: NaN above +inf, -0.0 below 0.0.
fn score_order(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
