//! # Age Assessment
//!
//! Derived display values comparing a predicted age to a declared one.
//!
//! These are pure functions. Nothing here is cached on the session, so a
//! value can never be stale with respect to the ages it was computed from.
//!
//! ## Rounding
//!
//! The predicted age is rounded to the nearest whole year before
//! differencing, with halves rounded away from zero (`f64::round`). Ages are
//! never negative, so 42.5 becomes 43.

use crate::AgeStatus;
use crate::primitives::ATTENTION_THRESHOLD_YEARS;

/// Predicted age rounded to a whole year. Negative or non-finite input maps to 0.
#[must_use]
pub fn rounded_age(predicted: f64) -> u32 {
    if !predicted.is_finite() || predicted <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX.
    predicted.round() as u32
}

/// Absolute difference in whole years between predicted and actual age.
#[must_use]
pub fn age_difference(predicted: f64, actual: u32) -> u32 {
    rounded_age(predicted).abs_diff(actual)
}

/// Classify a comparison into one of three tiers.
///
/// The favorable check uses the unrounded prediction: 35.2 against 35 is
/// already above the actual age, and lands in the moderate tier with a
/// difference of 0. The attention threshold applies to the rounded
/// difference, so 45.4 against 35 is moderate rather than attention.
#[must_use]
pub fn age_status(predicted: f64, actual: u32) -> AgeStatus {
    if predicted <= f64::from(actual) {
        return AgeStatus::Favorable;
    }
    if age_difference(predicted, actual) <= ATTENTION_THRESHOLD_YEARS {
        AgeStatus::Moderate
    } else {
        AgeStatus::Attention
    }
}
