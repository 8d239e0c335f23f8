//! Rate formatting and drop-chance arithmetic

use serde::Serialize;
use std::fmt;

/// Confidence used in place of 1.0, which no finite kill count reaches
pub const MAX_CONFIDENCE: f64 = 0.999;

/// Slack for comparing computed chances against a confidence target
const CHANCE_TOLERANCE: f64 = 1e-12;

/// Default denominator bound for [`to_nearest_fraction`]
pub const DEFAULT_MAX_DENOMINATOR: u64 = 1_000_000;

/// Count of kills, or no finite count at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KillCount {
    Finite(u64),
    Unbounded,
}

impl KillCount {
    pub fn finite(self) -> Option<u64> {
        match self {
            KillCount::Finite(n) => Some(n),
            KillCount::Unbounded => None,
        }
    }
}

impl fmt::Display for KillCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillCount::Finite(n) => write!(f, "{n}"),
            KillCount::Unbounded => write!(f, "∞"),
        }
    }
}

/// Percentage with precision that depends on magnitude: two decimals from
/// 1% up, six below so rare drops stay distinguishable.
pub fn to_percent_display(p: f64) -> String {
    if p.is_nan() || p <= 0.0 {
        "0%".to_string()
    } else if p >= 1.0 {
        "100%".to_string()
    } else if p >= 0.01 {
        format!("{:.2}%", p * 100.0)
    } else {
        format!("{:.6}%", p * 100.0)
    }
}

/// Approximate "1 in N" odds: `round(1/p)`
pub fn to_approx_fraction(p: f64) -> KillCount {
    if p.is_nan() || p <= 0.0 {
        return KillCount::Unbounded;
    }
    KillCount::Finite((1.0 / p).round() as u64)
}

/// Best rational approximation `n/d` of `p` with `d <= max_denominator`
pub fn to_nearest_fraction(p: f64, max_denominator: u64) -> String {
    if p.is_nan() || p <= 0.0 {
        return "0".to_string();
    }
    if p >= 1.0 {
        return "1/1".to_string();
    }

    let max_den = max_denominator.max(1);
    // Convergents h/k of the continued fraction of p
    let (mut h0, mut k0, mut h1, mut k1) = (0u64, 1u64, 1u64, 0u64);
    let mut x = p;
    loop {
        let a = x.floor();
        let a_int = a as u64;
        let k2 = k0.saturating_add(a_int.saturating_mul(k1));
        if k2 > max_den {
            break;
        }
        (h0, k0, h1, k1) = (h1, k1, h0.saturating_add(a_int.saturating_mul(h1)), k2);

        let rest = x - a;
        if rest <= 0.0 {
            break;
        }
        x = 1.0 / rest;
    }

    // Compare the last convergent with the best semiconvergent in bounds
    let step = (max_den - k0) / k1;
    let (sh, sk) = (
        h0.saturating_add(step.saturating_mul(h1)),
        k0.saturating_add(step.saturating_mul(k1)),
    );
    let error = |h: u64, k: u64| (h as f64 / k as f64 - p).abs();
    if error(h1, k1) <= error(sh, sk) {
        format!("{h1}/{k1}")
    } else {
        format!("{sh}/{sk}")
    }
}

/// Probability of at least one drop in `kills` kills: `1 - (1-p)^kills`
pub fn drop_chance_after_kills(p: f64, kills: u64) -> f64 {
    if p.is_nan() || p <= 0.0 || kills == 0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    -((kills as f64) * (-p).ln_1p()).exp_m1()
}

/// Fewest kills with `1 - (1-p)^n >= confidence`.
///
/// A confidence of 1 or more is treated as [`MAX_CONFIDENCE`].
pub fn expected_kills_for_confidence(p: f64, confidence: f64) -> KillCount {
    if p.is_nan() || p <= 0.0 {
        return KillCount::Unbounded;
    }
    let confidence = if confidence >= 1.0 {
        MAX_CONFIDENCE
    } else {
        confidence
    };
    if confidence.is_nan() || confidence <= 0.0 {
        return KillCount::Finite(0);
    }
    if p >= 1.0 {
        return KillCount::Finite(1);
    }

    let estimate = ((-confidence).ln_1p() / (-p).ln_1p()).ceil();
    if !estimate.is_finite() || estimate >= u64::MAX as f64 {
        return KillCount::Unbounded;
    }

    // The logarithm can land one off either side of the exact bound
    let mut n = (estimate as u64).max(1);
    if n > 1 && drop_chance_after_kills(p, n - 1) >= confidence - CHANCE_TOLERANCE {
        n -= 1;
    } else if drop_chance_after_kills(p, n) < confidence - CHANCE_TOLERANCE {
        n += 1;
    }
    KillCount::Finite(n)
}

/// Probability that at least one of several independent drops happens.
/// Rates outside [0, 1] are ignored.
pub fn combine_independent_rates<I>(rates: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let miss_all: f64 = rates
        .into_iter()
        .filter(|r| (0.0..=1.0).contains(r))
        .map(|r| 1.0 - r)
        .product();
    1.0 - miss_all
}

/// Every display form of a rate at once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateDisplay {
    /// Six-decimal percentage
    pub percent: String,
    /// Nearest fraction with denominator up to one million
    pub fraction: String,
    /// "1/N" odds
    pub inverse: String,
    /// Average kills per drop, N
    pub expected: KillCount,
}

impl RateDisplay {
    pub fn new(p: f64) -> Self {
        let expected = to_approx_fraction(p);
        let percent = if p.is_nan() || p <= 0.0 {
            "0%".to_string()
        } else {
            format!("{:.6}%", p.min(1.0) * 100.0)
        };
        Self {
            percent,
            fraction: to_nearest_fraction(p, DEFAULT_MAX_DENOMINATOR),
            inverse: match expected {
                KillCount::Finite(n) => format!("1/{n}"),
                KillCount::Unbounded => "∞".to_string(),
            },
            expected,
        }
    }
}
