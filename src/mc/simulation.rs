//! Module `mc::simulation`.
//!
//! Geometric random-walk price paths: every simulated day multiplies the previous
//! price by `1 + r` with `r ~ N(mean_return, std_return)`.
//!
//! Key types: [`PathMatrix`] (path-major grid of simulated prices) and
//! [`PathSimulator`] (validation, work bound, random-stream strategy).
//!
//! Numerical considerations: the walk is not floored. A draw `r <= -1` takes the
//! price to zero or below and later steps keep multiplying the signed value, so a
//! path can change sign more than once. Aggregates include such paths unchanged.
use rand::Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{PathConvention, Result, SimulationError, SimulationParameters};
use crate::math::rng::{RandomSource, stream_rng};

/// Simulated prices, one row per path and one column per day.
///
/// Storage is a single row-major buffer. Column `d` (0-based) is day `d + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    path_count: usize,
    horizon_days: usize,
    values: Vec<f64>,
}

impl PathMatrix {
    /// Builds a matrix from explicit rows.
    ///
    /// An empty row list, or rows of length zero, produce an empty matrix.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let horizon_days = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != horizon_days)
        {
            return Err(SimulationError::invalid(format!(
                "path {i} has {} days, expected {horizon_days}",
                row.len()
            )));
        }
        let path_count = rows.len();
        let values = rows.into_iter().flatten().collect();
        Ok(Self {
            path_count,
            horizon_days,
            values,
        })
    }

    #[inline]
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    #[inline]
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.path_count == 0 || self.horizon_days == 0
    }

    /// Row-major view of every simulated price.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Prices of path `index`, day-ascending.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.path_count {
            return None;
        }
        let start = index * self.horizon_days;
        Some(&self.values[start..start + self.horizon_days])
    }

    /// Iterates paths in generation order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.path_count).filter_map(move |i| self.row(i))
    }

    /// Prices of every path on 0-based column `day_index`.
    pub fn column(&self, day_index: usize) -> impl Iterator<Item = f64> + '_ {
        let width = self.horizon_days;
        let valid = day_index < width;
        self.values
            .iter()
            .skip(day_index)
            .step_by(width.max(1))
            .take(if valid { self.path_count } else { 0 })
            .copied()
    }

    #[inline]
    pub fn get(&self, path: usize, day_index: usize) -> Option<f64> {
        self.row(path).and_then(|row| row.get(day_index).copied())
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        if self.horizon_days == 0 {
            return vec![Vec::new(); self.path_count];
        }
        self.values
            .chunks_exact(self.horizon_days)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// Monte Carlo generator for geometric random-walk price paths.
#[derive(Debug, Clone, Default)]
pub struct PathSimulator {
    pub random_source: RandomSource,
    pub convention: PathConvention,
    /// Upper bound on `path_count * horizon_days` for one run.
    pub max_cells: Option<usize>,
}

impl PathSimulator {
    /// Non-deterministic simulator with the default convention and no work bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator whose runs are reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::default().with_seed(seed)
    }

    pub fn with_random_source(mut self, random_source: RandomSource) -> Self {
        self.random_source = random_source;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_source = RandomSource::Seeded(seed);
        self
    }

    pub fn with_convention(mut self, convention: PathConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = Some(max_cells);
        self
    }

    /// Generates `path_count` independent paths of `horizon_days` prices.
    ///
    /// Path `i` draws from its own generator seeded from the run's base seed and
    /// `i`, so a seeded run yields bit-identical matrices with or without the
    /// `parallel` feature.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] when the parameters fail
    /// validation or the run exceeds `max_cells`.
    ///
    /// # Examples
    /// ```rust
    /// use stockpaths::core::SimulationParameters;
    /// use stockpaths::mc::PathSimulator;
    ///
    /// let params = SimulationParameters::builder()
    ///     .starting_price(100.0)
    ///     .mean_return(0.0005)
    ///     .std_return(0.015)
    ///     .horizon_days(20)
    ///     .path_count(500)
    ///     .build()
    ///     .unwrap();
    ///
    /// let matrix = PathSimulator::seeded(42).simulate(&params).unwrap();
    /// assert_eq!(matrix.path_count(), 500);
    /// assert_eq!(matrix.horizon_days(), 20);
    /// ```
    pub fn simulate(&self, params: &SimulationParameters) -> Result<PathMatrix> {
        self.simulate_from_seed(params, self.random_source.base_seed())
    }

    /// Same as [`PathSimulator::simulate`] with an explicit base seed, ignoring
    /// `random_source`.
    ///
    /// Feeding back the base seed of an entropy-backed run reproduces it exactly.
    pub fn simulate_from_seed(
        &self,
        params: &SimulationParameters,
        base_seed: u64,
    ) -> Result<PathMatrix> {
        let (normal, cells) = self.prepare(params)?;
        let width = params.horizon_days;
        let start = params.starting_price;
        let convention = self.convention;

        let mut values = allocate_cells(cells)?;
        let fill = |(i, row): (usize, &mut [f64])| {
            let mut rng = stream_rng(base_seed, i);
            fill_path(row, start, convention, &normal, &mut rng);
        };

        #[cfg(feature = "parallel")]
        values.par_chunks_mut(width).enumerate().for_each(fill);
        #[cfg(not(feature = "parallel"))]
        values.chunks_mut(width).enumerate().for_each(fill);

        tracing::debug!(
            paths = params.path_count,
            days = params.horizon_days,
            seed = base_seed,
            "simulated price paths"
        );

        Ok(PathMatrix {
            path_count: params.path_count,
            horizon_days: width,
            values,
        })
    }

    /// Generates paths sequentially from a caller-supplied generator.
    ///
    /// Every draw comes from `rng` in path-major order; `random_source` is ignored.
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
    ) -> Result<PathMatrix> {
        let (normal, cells) = self.prepare(params)?;
        let mut values = allocate_cells(cells)?;
        for row in values.chunks_mut(params.horizon_days) {
            fill_path(row, params.starting_price, self.convention, &normal, &mut *rng);
        }
        Ok(PathMatrix {
            path_count: params.path_count,
            horizon_days: params.horizon_days,
            values,
        })
    }

    fn prepare(&self, params: &SimulationParameters) -> Result<(Normal<f64>, usize)> {
        params.validate()?;
        let cells = params.cells().ok_or_else(|| {
            SimulationError::invalid(format!(
                "{} paths x {} days overflows the addressable size",
                params.path_count, params.horizon_days
            ))
        })?;
        if cells
            .checked_mul(std::mem::size_of::<f64>())
            .is_none_or(|bytes| bytes > isize::MAX as usize)
        {
            return Err(SimulationError::invalid(format!(
                "{} paths x {} days exceeds the maximum buffer size",
                params.path_count, params.horizon_days
            )));
        }
        if let Some(limit) = self.max_cells {
            if cells > limit {
                return Err(SimulationError::invalid(format!(
                    "{} paths x {} days = {cells} cells exceeds the limit of {limit}",
                    params.path_count, params.horizon_days
                )));
            }
        }
        let normal = Normal::new(params.mean_return, params.std_return).map_err(|e| {
            SimulationError::invalid(format!(
                "cannot build N({}, {}): {e}",
                params.mean_return, params.std_return
            ))
        })?;
        Ok((normal, cells))
    }
}

/// Zeroed buffer of `cells` prices; allocation failure is an error, not an abort.
fn allocate_cells(cells: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    values.try_reserve_exact(cells).map_err(|e| {
        SimulationError::invalid(format!("cannot allocate {cells} simulated prices: {e}"))
    })?;
    values.resize(cells, 0.0);
    Ok(values)
}

fn fill_path<R: Rng + ?Sized>(
    row: &mut [f64],
    starting_price: f64,
    convention: PathConvention,
    normal: &Normal<f64>,
    rng: &mut R,
) {
    let anchored_days = row.len() - convention.steps(row.len());
    let (anchored, stepped) = row.split_at_mut(anchored_days);
    anchored.fill(starting_price);

    let mut price = starting_price;
    for cell in stepped {
        let daily_return = normal.sample(rng);
        price *= 1.0 + daily_return;
        *cell = price;
    }
}
