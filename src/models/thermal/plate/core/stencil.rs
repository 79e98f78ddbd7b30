//! Explicit five-point FTCS update.

use ndarray::Array2;

/// Advances `field` by one time step.
///
/// Interior cells follow
/// `u' = u + w·(u[j+1,i] + u[j-1,i] + u[j,i+1] + u[j,i-1] - 4u)`
/// with the per-cell weight `w = α·dt/dx²`. Edge cells are fixed.
///
/// # Panics
///
/// Panics if `weights` and `field` differ in shape.
#[must_use]
pub fn step(field: &Array2<f64>, weights: &Array2<f64>) -> Array2<f64> {
    let mut next = field.clone();
    step_into(field, &mut next, weights);
    next
}

/// Writes the next time step of `current` into `next`.
pub(super) fn step_into(current: &Array2<f64>, next: &mut Array2<f64>, weights: &Array2<f64>) {
    assert_eq!(current.dim(), weights.dim(), "weights must match the field");

    let (rows, cols) = current.dim();
    next.assign(current);

    for j in 1..rows.saturating_sub(1) {
        for i in 1..cols.saturating_sub(1) {
            let u = current[[j, i]];
            let neighbors =
                current[[j + 1, i]] + current[[j - 1, i]] + current[[j, i + 1]] + current[[j, i - 1]];
            next[[j, i]] = u + weights[[j, i]] * (neighbors - 4.0 * u);
        }
    }
}
