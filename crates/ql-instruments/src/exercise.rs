//! Option exercise schedules in year fractions.

use ql_core::{ensure, errors::Result, Time};

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
    /// Can be exercised at specific times.
    Bermudan,
}

/// Exercise specification for an option.
///
/// - European: the single expiry.
/// - American: earliest and latest exercise time.
/// - Bermudan: sorted, distinct exercise times.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exercise {
    exercise_type: ExerciseType,
    times: Vec<Time>,
}

impl Exercise {
    /// European exercise at `expiry > 0`.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry > 0.0, "expiry must be positive, got {expiry}");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// American exercise between `earliest` and `latest`.
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ensure!(
            earliest >= 0.0 && latest > earliest,
            "invalid American exercise window [{earliest}, {latest}]"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Bermudan exercise at the given times.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ensure!(!times.is_empty(), "Bermudan exercise needs at least one time");
        ensure!(
            times.iter().all(|t| t.is_finite() && *t >= 0.0),
            "exercise times must be finite and non-negative"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}
