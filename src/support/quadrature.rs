//! Adaptive Simpson quadrature.
//!
//! Used for the band-gain integrals of the Johnson noise analysis, where the
//! integrand is a smooth product of a Gaussian gain curve and an RC roll-off.

use thiserror::Error;

/// Errors that can occur while integrating.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuadratureError {
    /// The integrand returned NaN or an infinity.
    #[error("integrand is not finite at x={x}")]
    NonFinite { x: f64 },

    /// Subdivision reached the depth limit before meeting the tolerance.
    #[error("tolerance not met within {max_depth} subdivisions near x={x}")]
    DepthExhausted { max_depth: usize, x: f64 },
}

/// Tolerances for [`integrate`].
#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    /// Absolute error tolerance.
    pub abs_tol: f64,

    /// Error tolerance relative to a first estimate of the integral.
    pub rel_tol: f64,

    /// Levels of subdivision that are always performed.
    pub min_depth: usize,

    /// Maximum levels of interval bisection.
    pub max_depth: usize,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1.49e-8,
            rel_tol: 1.49e-8,
            min_depth: 4,
            max_depth: 40,
        }
    }
}

/// A definite integral estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    /// Estimated value of the integral.
    pub value: f64,

    /// Estimated absolute error.
    pub error: f64,
}

/// Integrates `f` over `[a, b]`.
///
/// # Errors
///
/// Returns [`QuadratureError`] if `f` is not finite somewhere it is sampled
/// or if the tolerance cannot be met within the depth limit.
///
/// # Example
///
/// ```
/// use physlab::support::quadrature::{QuadConfig, integrate};
///
/// let integral = integrate(|x| x * x, 0.0, 3.0, &QuadConfig::default()).unwrap();
/// assert!((integral.value - 9.0).abs() < 1e-12);
/// ```
pub fn integrate<F>(f: F, a: f64, b: f64, config: &QuadConfig) -> Result<Integral, QuadratureError>
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return Ok(Integral {
            value: 0.0,
            error: 0.0,
        });
    }

    let eval = |x: f64| {
        let y = f(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(QuadratureError::NonFinite { x })
        }
    };

    let fa = eval(a)?;
    let fb = eval(b)?;
    let m = 0.5 * (a + b);
    let fm = eval(m)?;
    let whole = simpson(a, b, fa, fm, fb);

    let tol = config.abs_tol.max(config.rel_tol * whole.abs());
    let segment = Segment {
        a,
        b,
        fa,
        fm,
        fb,
        whole,
    };

    let (value, error) = refine(&eval, segment, tol, 0, config)?;
    Ok(Integral { value, error })
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

fn refine<F>(
    eval: &F,
    seg: Segment,
    tol: f64,
    depth: usize,
    config: &QuadConfig,
) -> Result<(f64, f64), QuadratureError>
where
    F: Fn(f64) -> Result<f64, QuadratureError>,
{
    let m = 0.5 * (seg.a + seg.b);
    let lm = 0.5 * (seg.a + m);
    let rm = 0.5 * (m + seg.b);
    let flm = eval(lm)?;
    let frm = eval(rm)?;

    let left = simpson(seg.a, m, seg.fa, flm, seg.fm);
    let right = simpson(m, seg.b, seg.fm, frm, seg.fb);
    let delta = left + right - seg.whole;

    if depth >= config.min_depth && delta.abs() <= 15.0 * tol {
        return Ok((left + right + delta / 15.0, delta.abs() / 15.0));
    }

    if depth >= config.max_depth {
        return Err(QuadratureError::DepthExhausted {
            max_depth: config.max_depth,
            x: m,
        });
    }

    let (left_value, left_error) = refine(
        eval,
        Segment {
            a: seg.a,
            b: m,
            fa: seg.fa,
            fm: flm,
            fb: seg.fm,
            whole: left,
        },
        0.5 * tol,
        depth + 1,
        config,
    )?;
    let (right_value, right_error) = refine(
        eval,
        Segment {
            a: m,
            b: seg.b,
            fa: seg.fm,
            fm: frm,
            fb: seg.fb,
            whole: right,
        },
        0.5 * tol,
        depth + 1,
        config,
    )?;

    Ok((left_value + right_value, left_error + right_error))
}
