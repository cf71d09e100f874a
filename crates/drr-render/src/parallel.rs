use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row length must be valid.
    #[error("row length must be > 0, got {0}")]
    InvalidRowLength(usize),

    /// The buffer is not a whole number of rows.
    #[error("buffer of {len} elements is not a multiple of the row length {row_len}")]
    SizeMismatch {
        /// Number of elements in the buffer.
        len: usize,
        /// Number of elements per row.
        row_len: usize,
    },
}

/// Controls how image rows are distributed over threads.
///
/// Every strategy hands each row to exactly one call of the row operation,
/// so the result never depends on the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of
    /// parallelization outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Trait to execute a row operation on a mutable buffer with a given strategy.
pub trait ExecuteRowsExt<T> {
    /// Split the buffer into rows of `row_len` elements and run `op` on each.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The execution strategy.
    /// * `row_len` - The number of elements per row.
    /// * `op` - The operation, called with the row index and the row.
    fn execute_rows<F>(
        &mut self,
        strategy: ExecutionStrategy,
        row_len: usize,
        op: F,
    ) -> Result<(), ParallelError>
    where
        F: Fn(usize, &mut [T]) + Sync + Send;
}

impl<T: Send> ExecuteRowsExt<T> for [T] {
    fn execute_rows<F>(
        &mut self,
        strategy: ExecutionStrategy,
        row_len: usize,
        op: F,
    ) -> Result<(), ParallelError>
    where
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if row_len == 0 {
            return Err(ParallelError::InvalidRowLength(row_len));
        }
        if self.len() % row_len != 0 {
            return Err(ParallelError::SizeMismatch {
                len: self.len(),
                row_len,
            });
        }

        match strategy {
            ExecutionStrategy::Serial => {
                self.chunks_exact_mut(row_len)
                    .enumerate()
                    .for_each(|(i, row)| op(i, row));
            }
            ExecutionStrategy::ParallelRows => {
                self.par_chunks_exact_mut(row_len)
                    .enumerate()
                    .for_each(|(i, row)| op(i, row));
            }
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ParallelError::InvalidThreadCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;

                pool.install(|| {
                    self.par_chunks_exact_mut(row_len)
                        .enumerate()
                        .for_each(|(i, row)| op(i, row));
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let mut dst = vec![0; 12];
        dst.execute_rows(strategy, 4, |i, row| {
            row.iter_mut().enumerate().for_each(|(j, d)| *d = 10 * i + j);
        })?;
        Ok(dst)
    }

    #[test]
    fn test_execute_serial() -> Result<(), ParallelError> {
        assert_eq!(
            fill(ExecutionStrategy::Serial)?,
            vec![0, 1, 2, 3, 10, 11, 12, 13, 20, 21, 22, 23]
        );
        Ok(())
    }

    #[test]
    fn test_execute_strategies_agree() -> Result<(), ParallelError> {
        let serial = fill(ExecutionStrategy::Serial)?;
        assert_eq!(fill(ExecutionStrategy::ParallelRows)?, serial);
        assert_eq!(fill(ExecutionStrategy::Fixed(2))?, serial);
        Ok(())
    }

    #[test]
    fn test_execute_invalid_rows() {
        let mut dst = vec![0u8; 5];
        let res = dst.execute_rows(ExecutionStrategy::Serial, 0, |_, _| {});
        assert!(matches!(res, Err(ParallelError::InvalidRowLength(0))));

        let res = dst.execute_rows(ExecutionStrategy::ParallelRows, 2, |_, _| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch { len: 5, row_len: 2 }));
    }

    #[test]
    fn test_execute_fixed_error() {
        let mut dst = vec![0u8; 4];
        let res = dst.execute_rows(ExecutionStrategy::Fixed(0), 2, |_, _| {});
        assert!(matches!(res, Err(ParallelError::InvalidThreadCount(0))));
    }

    #[test]
    fn test_strategy_serde() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&ExecutionStrategy::Fixed(3))?;
        assert_eq!(json, r#"{"fixed":3}"#);
        let back: ExecutionStrategy = serde_json::from_str(r#""parallel_rows""#)?;
        assert_eq!(back, ExecutionStrategy::ParallelRows);
        Ok(())
    }
}
