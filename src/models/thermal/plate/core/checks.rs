use std::fmt;

use uom::si::time::second;

use super::{HeatError, HeatSystem};

/// Largest grid or frame stride accepted.
const MAX_GRID: usize = 10_000;

/// Grid sizes must be a multiple of this.
const GRID_STEP: usize = 100;

/// Upper bound on `frames × grid²` kept in memory.
const MAX_FRAME_CELLS: f64 = 7.5e7;

/// Outcome of one input check.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    /// Short name of the check.
    pub name: &'static str,

    /// Whether the check passed.
    pub passed: bool,

    /// The values that were compared.
    pub detail: String,
}

/// Outcome of every input check, in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    checks: Vec<Check>,
}

impl CheckReport {
    /// Returns `true` if every check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Names of the failed checks.
    #[must_use]
    pub fn failures(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name)
            .collect()
    }

    /// All checks, passed or not.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            writeln!(f, "[{status}] {}: {}", check.name, check.detail)?;
        }
        Ok(())
    }
}

impl HeatSystem {
    /// Runs the input checks that gate a simulation.
    ///
    /// - background and object stability: `dt ≤ dx² / (4·α)`
    /// - resolution: grid is a positive multiple of 100, at most 10000
    /// - frame rate: stride at most 10000 and divides the runtime
    /// - frame storage: `frames × grid²` below 7.5e7 values
    #[must_use]
    pub fn checks(&self) -> CheckReport {
        let dt = self.dt().get::<second>();
        let stability = |name, diffusivity| {
            let limit = self.stable_dt(diffusivity).get::<second>();
            Check {
                name,
                passed: dt <= limit,
                detail: format!("dt = {dt} s, limit dx²/(4α) = {limit} s"),
            }
        };

        let grid = self.grid();
        let rate = self.rate();
        let runtime = self.runtime();
        // Floating point so oversized inputs fail the check instead of overflowing.
        #[allow(clippy::cast_precision_loss)]
        let cells = self.frames() as f64 * (grid as f64).powi(2);

        let checks = vec![
            stability("background stability", self.background_diffusivity()),
            stability("object stability", self.object_diffusivity()),
            Check {
                name: "resolution",
                passed: grid <= MAX_GRID && grid % GRID_STEP == 0,
                detail: format!("grid = {grid}, must be a multiple of {GRID_STEP} up to {MAX_GRID}"),
            },
            Check {
                name: "frame rate",
                passed: rate <= MAX_GRID && runtime % rate == 0,
                detail: format!("rate = {rate} must divide runtime = {runtime}"),
            },
            Check {
                name: "frame storage",
                passed: cells < MAX_FRAME_CELLS,
                detail: format!("{cells:e} values, limit {MAX_FRAME_CELLS:e}"),
            },
        ];

        CheckReport { checks }
    }

    /// Runs [`HeatSystem::checks`] and turns failures into an error.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError::ChecksFailed`] naming every failed check.
    pub fn validate(&self) -> Result<(), HeatError> {
        let report = self.checks();
        if report.passed() {
            Ok(())
        } else {
            let failed = report.failures();
            tracing::warn!(?failed, "input checks failed");
            Err(HeatError::ChecksFailed { failed })
        }
    }
}
