/*
 * // Copyright (c) Radzivon Bartoshyk 10/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
//! Edge-avoiding lifting built on the 5/3 predict and update pair.
//!
//! Each neighbour enters a step with weight `1 / (|x[i + 1] - x[i]|^r + eps)`,
//! measured on the samples before the transform, so smooth neighbours
//! dominate and predictions do not straddle edges. The weights are side
//! information: the forward transform records them and the inverse replays
//! them.

use crate::coefficients::{CDF53_ALPHA, CDF53_BETA, CDF53_ZETA};
use crate::dispatch::{Acceleration, LiftConfig};
use crate::dwt2d::{
    Decomposition, LevelGeometry, band_indices, read_line, write_line, zero_padding,
};
use crate::err::{LiftletError, try_vec};
use crate::log::ldebug;
use crate::sample::LiftingSample;
use crate::strided::{StridedImage, StridedLine, StridedSignal};
use num_traits::{AsPrimitive, Float};
use rayon::prelude::*;

pub(crate) const EAW_EPSILON: f64 = 1e-5;

/// Weights recorded by [`EdgeAwareDwt::forward_2d`], per level and per pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EawWeights<T> {
    levels: Vec<LevelWeights<T>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LevelWeights<T> {
    rows: Vec<T>,
    row_len: usize,
    columns: Vec<T>,
    column_len: usize,
}

impl<T> EawWeights<T> {
    pub fn new() -> Self {
        EawWeights { levels: Vec::new() }
    }

    /// Number of levels with recorded weights.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    /// Weights between neighbouring samples of row `row` at `level`.
    pub fn row_weights(&self, level: usize, row: usize) -> Option<&[T]> {
        let l = self.levels.get(level)?;
        l.rows.chunks_exact(l.row_len).nth(row)
    }

    /// Weights of the `index`-th transformed column at `level`, low band
    /// columns first.
    pub fn column_weights(&self, level: usize, index: usize) -> Option<&[T]> {
        let l = self.levels.get(level)?;
        l.columns.chunks_exact(l.column_len).nth(index)
    }
}

#[derive(Debug, Copy, Clone)]
struct EawSteps<T> {
    predict: T,
    update: T,
    even_scale: T,
    odd_scale: T,
}

impl<T: Float + 'static> EawSteps<T>
where
    f64: AsPrimitive<T>,
{
    fn new() -> Self {
        EawSteps {
            predict: (2. * CDF53_ALPHA).as_(),
            update: (2. * CDF53_BETA).as_(),
            even_scale: CDF53_ZETA.as_(),
            odd_scale: (1. / CDF53_ZETA).as_(),
        }
    }
}

/// Records `w[i]` for the sample pair `(i, i + 1)`.
pub(crate) fn edge_weights<T: Float + 'static>(x: &[T], exponent: T, w: &mut [T])
where
    f64: AsPrimitive<T>,
{
    let eps: T = EAW_EPSILON.as_();
    for ((dst, &a), &b) in w.iter_mut().zip(x.iter()).zip(x.iter().skip(1)) {
        *dst = T::one() / ((b - a).abs().powf(exponent) + eps);
    }
}

#[inline(always)]
fn weighted<T: Float>(c: T, left: T, wl: T, right: T, wr: T) -> T {
    c * (wl * left + wr * right) / (wl + wr)
}

/// Weighted neighbours of sample `i`, mirrored at both ends.
#[inline(always)]
fn neighbours<T: Float>(x: &[T], w: &[T], i: usize) -> (T, T, T, T) {
    let n = x.len();
    let (left, wl) = if i > 0 { (x[i - 1], w[i - 1]) } else { (x[1], w[0]) };
    let (right, wr) = if i + 1 < n { (x[i + 1], w[i]) } else { (left, wl) };
    (left, wl, right, wr)
}

fn weighted_step<T: Float>(x: &mut [T], w: &[T], first: usize, c: T, inverse: bool) {
    let mut i = first;
    while i < x.len() {
        let (left, wl, right, wr) = neighbours(x, w, i);
        let delta = weighted(c, left, wl, right, wr);
        x[i] = if inverse { x[i] - delta } else { x[i] + delta };
        i += 2;
    }
}

fn eaw_forward<T: Float + 'static>(x: &mut [T], w: &[T])
where
    f64: AsPrimitive<T>,
{
    if x.len() < 2 {
        return;
    }
    let steps = EawSteps::<T>::new();
    weighted_step(x, w, 1, steps.predict, false);
    weighted_step(x, w, 0, steps.update, false);
    for (i, v) in x.iter_mut().enumerate() {
        *v = *v * if i % 2 == 0 { steps.even_scale } else { steps.odd_scale };
    }
}

fn eaw_inverse<T: Float + 'static>(x: &mut [T], w: &[T])
where
    f64: AsPrimitive<T>,
{
    if x.len() < 2 {
        return;
    }
    let steps = EawSteps::<T>::new();
    for (i, v) in x.iter_mut().enumerate() {
        *v = *v * if i % 2 == 0 { steps.odd_scale } else { steps.even_scale };
    }
    weighted_step(x, w, 0, steps.update, true);
    weighted_step(x, w, 1, steps.predict, true);
}

/// Edge-adaptive 5/3 transform.
///
/// Runs the scalar pipeline only; the configuration contributes its thread
/// pool and must select [`Acceleration::Scalar`].
pub struct EdgeAwareDwt<T> {
    exponent: T,
    config: LiftConfig,
}

impl<T> EdgeAwareDwt<T>
where
    T: LiftingSample + Float + 'static,
    f64: AsPrimitive<T>,
{
    /// `exponent` is applied to neighbour differences when weighting them.
    ///
    /// # Errors
    /// Only [`Acceleration::Scalar`] is served; offload is reported as
    /// unavailable and every other variant as unsupported.
    pub fn new(exponent: T, config: LiftConfig) -> Result<Self, LiftletError> {
        config.validate()?;
        match config.acceleration() {
            Acceleration::Scalar => {}
            Acceleration::Offload => return Err(LiftletError::OffloadUnavailable),
            other => return Err(LiftletError::UnsupportedAcceleration(other)),
        }
        Ok(EdgeAwareDwt { exponent, config })
    }

    pub fn exponent(&self) -> T {
        self.exponent
    }

    /// Transforms the signal in place, interleaved, and stores one weight
    /// per neighbouring sample pair into `weights`.
    pub fn forward_1d(
        &self,
        signal: &mut StridedSignal<'_, T>,
        weights: &mut Vec<T>,
    ) -> Result<(), LiftletError> {
        let n = signal.len();
        let line = signal.line();
        let mut x = try_vec![T::default(); n];
        read_line(&line, n, None, &mut x);
        weights.clear();
        weights.resize(n.saturating_sub(1), T::default());
        edge_weights(&x, self.exponent, weights);
        eaw_forward(&mut x, weights);
        write_line(&line, n, None, &x);
        Ok(())
    }

    pub fn inverse_1d(
        &self,
        signal: &mut StridedSignal<'_, T>,
        weights: &[T],
    ) -> Result<(), LiftletError> {
        let n = signal.len();
        if weights.len() != n.saturating_sub(1) {
            return Err(LiftletError::WeightsMismatch(
                weights.len(),
                n.saturating_sub(1),
            ));
        }
        let line = signal.line();
        let mut x = try_vec![T::default(); n];
        read_line(&line, n, None, &mut x);
        eaw_inverse(&mut x, weights);
        write_line(&line, n, None, &x);
        Ok(())
    }

    /// Multi-level forward transform; replaces the contents of `weights`.
    pub fn forward_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
        weights: &mut EawWeights<T>,
    ) -> Result<usize, LiftletError> {
        d.validate(image)?;
        let levels = d.resolved_levels();
        weights.levels.clear();
        for j in 0..levels {
            let g = LevelGeometry::new(d, j);
            let (a, h) = (g.src_active, g.dst_outer);
            ldebug!(
                "Edge-adaptive forward level {j}: active {}x{}",
                a.width,
                a.height
            );
            let mut level = LevelWeights {
                row_len: a.width.saturating_sub(1),
                rows: try_vec![T::default(); a.width.saturating_sub(1) * a.height],
                column_len: a.height.saturating_sub(1),
                columns: try_vec![T::default(); a.height.saturating_sub(1) * a.width],
            };
            let rows: Vec<StridedLine<T>> = (0..a.height)
                .map(|y| image.row_line(y, a.width.max(h.width + a.width / 2)))
                .collect();
            self.forward_lines(&rows, a.width, h.width, &mut level.rows)?;
            let columns: Vec<StridedLine<T>> = band_indices(a.width, h.width)
                .map(|x| image.column_line(x, a.height.max(h.height + a.height / 2)))
                .collect();
            self.forward_lines(&columns, a.height, h.height, &mut level.columns)?;
            weights.levels.push(level);
            if d.zero_padding {
                zero_padding(image, &g);
            }
        }
        Ok(levels)
    }

    /// Multi-level inverse transform replaying `weights`.
    pub fn inverse_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
        weights: &EawWeights<T>,
    ) -> Result<usize, LiftletError> {
        d.validate(image)?;
        let levels = d.resolved_levels();
        for j in (0..levels).rev() {
            let g = LevelGeometry::new(d, j);
            let (a, h) = (g.src_active, g.dst_outer);
            let level = weights
                .levels
                .get(j)
                .ok_or(LiftletError::MissingWeightsLevel(j))?;
            let (row_len, column_len) = (a.width.saturating_sub(1), a.height.saturating_sub(1));
            if level.row_len != row_len || level.rows.len() != row_len * a.height {
                return Err(LiftletError::WeightsMismatch(
                    level.rows.len(),
                    row_len * a.height,
                ));
            }
            if level.column_len != column_len || level.columns.len() != column_len * a.width {
                return Err(LiftletError::WeightsMismatch(
                    level.columns.len(),
                    column_len * a.width,
                ));
            }
            ldebug!(
                "Edge-adaptive inverse level {j}: active {}x{}",
                a.width,
                a.height
            );
            let columns: Vec<StridedLine<T>> = band_indices(a.width, h.width)
                .map(|x| image.column_line(x, a.height.max(h.height + a.height / 2)))
                .collect();
            self.inverse_lines(&columns, a.height, h.height, &level.columns)?;
            let rows: Vec<StridedLine<T>> = (0..a.height)
                .map(|y| image.row_line(y, a.width.max(h.width + a.width / 2)))
                .collect();
            self.inverse_lines(&rows, a.width, h.width, &level.rows)?;
        }
        Ok(levels)
    }

    fn forward_lines(
        &self,
        lines: &[StridedLine<T>],
        n: usize,
        h_offset: usize,
        weights: &mut [T],
    ) -> Result<(), LiftletError> {
        if n < 2 {
            return Ok(());
        }
        let exponent = self.exponent;
        let line_op = |scratch: &mut Vec<T>, (line, w): (&StridedLine<T>, &mut [T])| {
            read_line(line, n, None, scratch);
            edge_weights(scratch, exponent, w);
            eaw_forward(scratch, w);
            write_line(line, n, Some(h_offset), scratch);
        };
        // Workers clone the checked scratch.
        let mut scratch = try_vec![T::default(); n];
        match self.config.pool() {
            Some(pool) => pool.install(|| {
                lines
                    .par_iter()
                    .zip(weights.par_chunks_exact_mut(n - 1))
                    .for_each_with(scratch, line_op)
            }),
            None => {
                for pair in lines.iter().zip(weights.chunks_exact_mut(n - 1)) {
                    line_op(&mut scratch, pair);
                }
            }
        }
        Ok(())
    }

    fn inverse_lines(
        &self,
        lines: &[StridedLine<T>],
        n: usize,
        h_offset: usize,
        weights: &[T],
    ) -> Result<(), LiftletError> {
        if n < 2 {
            return Ok(());
        }
        let line_op = |scratch: &mut Vec<T>, (line, w): (&StridedLine<T>, &[T])| {
            read_line(line, n, Some(h_offset), scratch);
            eaw_inverse(scratch, w);
            write_line(line, n, None, scratch);
        };
        // Workers clone the checked scratch.
        let mut scratch = try_vec![T::default(); n];
        match self.config.pool() {
            Some(pool) => pool.install(|| {
                lines
                    .par_iter()
                    .zip(weights.par_chunks_exact(n - 1))
                    .for_each_with(scratch, line_op)
            }),
            None => {
                for pair in lines.iter().zip(weights.chunks_exact(n - 1)) {
                    line_op(&mut scratch, pair);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::WaveletFamily;
    use crate::dwt2d::{Extent, Levels};
    use crate::kernel::tests::reference_forward;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn forward(exponent: f64, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut data = x.to_vec();
        let mut weights = Vec::new();
        let dwt = EdgeAwareDwt::new(exponent, LiftConfig::new()).unwrap();
        let mut signal = StridedSignal::contiguous(&mut data).unwrap();
        dwt.forward_1d(&mut signal, &mut weights).unwrap();
        (data, weights)
    }

    #[test]
    fn test_flat_weights_reduce_to_cdf53() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in 1..20 {
            let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let (eaw, _) = forward(0., &x);
            let cdf53 = reference_forward(WaveletFamily::Cdf53, &x);
            for (i, (&a, &b)) in eaw.iter().zip(cdf53.iter()).enumerate() {
                assert!((a - b).abs() < 1e-12, "n {n}: {a} at {i}, expected {b}");
            }
        }
    }

    #[test]
    fn test_step_edge_is_not_predicted_across() {
        let x: Vec<f64> = (0..16).map(|i| if i < 5 { 0. } else { 10. }).collect();
        let (eaw, weights) = forward(1., &x);
        let cdf53 = reference_forward(WaveletFamily::Cdf53, &x);
        assert_eq!(weights.len(), 15);
        assert!(eaw[5].abs() < 1e-2, "Edge-adaptive detail {}", eaw[5]);
        assert!(cdf53[5].abs() > 1., "5/3 detail {}", cdf53[5]);
    }

    #[test]
    fn test_round_trip_1d() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in 1..33 {
            for exponent in [0.5, 1., 2.] {
                let x: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
                let (mut data, weights) = forward(exponent, &x);
                let dwt = EdgeAwareDwt::new(exponent, LiftConfig::new()).unwrap();
                let mut signal = StridedSignal::contiguous(&mut data).unwrap();
                dwt.inverse_1d(&mut signal, &weights).unwrap();
                for (i, (&a, &b)) in data.iter().zip(x.iter()).enumerate() {
                    assert!((a - b).abs() < 1e-9, "n {n}: restored {a} at {i}, expected {b}");
                }
            }
        }
    }

    #[test]
    fn test_round_trip_2d() {
        let mut rng = StdRng::seed_from_u64(12);
        for threads in [1, 4] {
            let config = LiftConfig::new().with_threads(threads).unwrap();
            let dwt = EdgeAwareDwt::new(1.0f32, config).unwrap();
            for (w, h) in [(1, 1), (8, 8), (17, 6), (5, 31)] {
                let original: Vec<f32> = (0..w * h).map(|_| rng.gen_range(0.0..1.0)).collect();
                let mut data = original.clone();
                let d = Decomposition::new(Extent::new(w, h));
                let mut weights = EawWeights::new();
                let mut image = StridedImage::packed(&mut data, w, h).unwrap();
                let levels = dwt.forward_2d(&mut image, &d, &mut weights).unwrap();
                assert_eq!(levels, weights.levels());
                dwt.inverse_2d(&mut image, &d, &weights).unwrap();
                for (i, (&a, &b)) in data.iter().zip(original.iter()).enumerate() {
                    assert!((a - b).abs() < 1e-4, "{w}x{h}: restored {a} at {i}, expected {b}");
                }
            }
        }
    }

    #[test]
    fn test_only_scalar_acceleration_is_accepted() {
        let config = LiftConfig::new().with_acceleration(Acceleration::Offload);
        assert!(matches!(
            EdgeAwareDwt::new(1.0f32, config),
            Err(LiftletError::OffloadUnavailable)
        ));
        for acceleration in [
            Acceleration::Shifted2,
            Acceleration::Shifted3,
            Acceleration::Shifted6,
            Acceleration::MultiWorker,
            Acceleration::Simd4,
            Acceleration::Tile4x4,
        ] {
            let config = LiftConfig::new()
                .with_acceleration(acceleration)
                .with_workers(acceleration.required_workers().unwrap_or(1))
                .unwrap();
            assert!(
                matches!(
                    EdgeAwareDwt::new(1.0f64, config),
                    Err(LiftletError::UnsupportedAcceleration(a)) if a == acceleration
                ),
                "{acceleration} must be rejected"
            );
        }
        let threaded = LiftConfig::new().with_threads(2).unwrap();
        assert!(EdgeAwareDwt::new(0.5f32, threaded).is_ok());
    }

    #[test]
    fn test_inverse_rejects_foreign_weights() {
        let dwt = EdgeAwareDwt::new(1.0f64, LiftConfig::new()).unwrap();
        let mut data = vec![1f64; 64];
        let mut image = StridedImage::packed(&mut data, 8, 8).unwrap();
        let d = Decomposition::new(Extent::new(8, 8)).with_levels(Levels::Count(2));
        let mut weights = EawWeights::new();
        dwt.forward_2d(&mut image, &d.with_levels(Levels::Count(1)), &mut weights)
            .unwrap();
        assert_eq!(
            dwt.inverse_2d(&mut image, &d, &weights),
            Err(LiftletError::MissingWeightsLevel(1))
        );
        assert_eq!(weights.row_weights(0, 7).map(|w| w.len()), Some(7));
        assert_eq!(weights.column_weights(0, 8), None);

        let mut signal_data = vec![0f64; 5];
        let mut signal = StridedSignal::contiguous(&mut signal_data).unwrap();
        assert_eq!(
            dwt.inverse_1d(&mut signal, &[1., 1.]),
            Err(LiftletError::WeightsMismatch(2, 4))
        );
    }
}
