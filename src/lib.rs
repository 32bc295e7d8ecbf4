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
#![allow(clippy::excessive_precision)]
//! Lifting scheme discrete wavelet transforms.
//!
//! CDF 9/7, CDF 5/3 and the interpolating 5/3 pair run over strided 1-D
//! signals and multi-level 2-D images, in place. Every line is lifted in a
//! single sweep: a Prolog warms up the lifting state, a Core runs in steady
//! state and an Epilog mirrors the signal at its end, so no padded copy is
//! ever made. Several Core variants (scalar, software pipelined, 4-lane SIMD,
//! fused 4x4 tiles) produce the same coefficients and are selected through
//! [`LiftConfig`].

#[cfg(all(target_arch = "x86_64", feature = "sse"))]
mod sse;
#[cfg(all(target_arch = "aarch64", feature = "neon"))]
mod neon;
mod coefficients;
mod dispatch;
mod dwt2d;
mod eaw;
mod err;
mod executor;
mod kernel;
mod log;
mod pipeline;
mod sample;
mod strided;
mod subband;
mod tile;
mod util;

use crate::executor::LiftingDwt;
use std::sync::Arc;

pub use coefficients::{LiftingCoefficients, WaveletFamily};
#[cfg(feature = "offload")]
pub use dispatch::OffloadBackend;
pub use dispatch::{Acceleration, LiftConfig};
pub use dwt2d::{Decomposition, Extent, Levels};
pub use eaw::{EawWeights, EdgeAwareDwt};
pub use err::LiftletError;
pub use sample::{LiftLane, LiftingSample};
pub use strided::{StridedImage, StridedSignal, Strides};
pub use subband::{Band, Subband, SubbandGeometry, subband_extents};
pub use util::{ceil_log2, split_lengths};

/// Single level transforms of one line.
pub trait Lifting1dExecutor<T> {
    /// Transforms the signal in place. Approximation coefficients land on
    /// even positions, details on odd ones.
    fn forward_1d(&self, signal: &mut StridedSignal<'_, T>) -> Result<(), LiftletError>;

    /// Inverse of [`Lifting1dExecutor::forward_1d`].
    fn inverse_1d(&self, signal: &mut StridedSignal<'_, T>) -> Result<(), LiftletError>;

    /// Forward transform into separate halves.
    ///
    /// # Parameters
    /// - `input`: Signal samples.
    /// - `approx`: Receives `ceil(n / 2)` approximation coefficients.
    /// - `details`: Receives `floor(n / 2)` detail coefficients.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the halves have the wrong size.
    fn forward_1d_split(
        &self,
        input: &[T],
        approx: &mut [T],
        details: &mut [T],
    ) -> Result<(), LiftletError>;

    /// Reconstructs `output` from the halves made by
    /// [`Lifting1dExecutor::forward_1d_split`].
    fn inverse_1d_split(
        &self,
        approx: &[T],
        details: &[T],
        output: &mut [T],
    ) -> Result<(), LiftletError>;
}

/// Multi-level and single axis transforms of images.
pub trait Lifting2dExecutor<T> {
    /// Runs every level `d` resolves to, returns the number of levels done.
    ///
    /// After each level the low band occupies the top left corner of the
    /// level's outer rectangle, with the three detail bands around it.
    fn forward_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError>;

    /// Undoes [`Lifting2dExecutor::forward_2d`] with the same decomposition.
    fn inverse_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError>;

    /// One level over the rows of the active rectangle.
    fn forward_rows(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError>;

    /// One level over the columns of the active rectangle.
    fn forward_cols(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError>;

    fn inverse_rows(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError>;

    fn inverse_cols(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError>;
}

/// A wavelet family bound to a pipeline variant.
pub trait LiftingExecutor<T>: Lifting1dExecutor<T> + Lifting2dExecutor<T> + Send + Sync {
    fn family(&self) -> WaveletFamily;

    /// Variant the executor was created with.
    fn acceleration(&self) -> Acceleration;
}

/// Factory for lifting executors.
pub struct Liftlet {}

impl Liftlet {
    /// Creates an executor of `family` for sample type `T`.
    ///
    /// # Errors
    /// Fails when `config` asks for a worker count its acceleration can't
    /// use, or for an offload backend that is missing or does not serve `T`.
    pub fn make_executor<T: LiftingSample + 'static>(
        family: WaveletFamily,
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<T> + Send + Sync>, LiftletError> {
        Ok(Arc::new(LiftingDwt::<T>::new(family, config)?))
    }

    /// Creates a CDF 9/7 executor for `f32` samples.
    pub fn make_cdf97_f32(
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<f32> + Send + Sync>, LiftletError> {
        Self::make_executor(WaveletFamily::Cdf97, config)
    }

    /// Creates a CDF 9/7 executor for `f64` samples.
    pub fn make_cdf97_f64(
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<f64> + Send + Sync>, LiftletError> {
        Self::make_executor(WaveletFamily::Cdf97, config)
    }

    pub fn make_cdf53_f32(
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<f32> + Send + Sync>, LiftletError> {
        Self::make_executor(WaveletFamily::Cdf53, config)
    }

    pub fn make_cdf53_f64(
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<f64> + Send + Sync>, LiftletError> {
        Self::make_executor(WaveletFamily::Cdf53, config)
    }

    /// Creates the reversible integer 5/3 executor.
    ///
    /// Every lifting step is rounded, so the inverse restores the input
    /// bit for bit.
    pub fn make_cdf53_i32(
        config: LiftConfig,
    ) -> Result<Arc<dyn LiftingExecutor<i32> + Send + Sync>, LiftletError> {
        Self::make_executor(WaveletFamily::Cdf53, config)
    }

    /// Creates an edge-adaptive 5/3 transform for `f32` samples.
    ///
    /// `exponent` shapes how strongly neighbour differences suppress a
    /// neighbour.
    pub fn make_eaw_f32(
        exponent: f32,
        config: LiftConfig,
    ) -> Result<EdgeAwareDwt<f32>, LiftletError> {
        EdgeAwareDwt::new(exponent, config)
    }

    pub fn make_eaw_f64(
        exponent: f64,
        config: LiftConfig,
    ) -> Result<EdgeAwareDwt<f64>, LiftletError> {
        EdgeAwareDwt::new(exponent, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_make_every_family() {
        for family in WaveletFamily::ALL {
            let executor = Liftlet::make_executor::<f32>(family, LiftConfig::new()).unwrap();
            assert_eq!(executor.family(), family);
            assert_eq!(executor.acceleration(), Acceleration::Scalar);
        }
    }

    #[test]
    fn test_config_errors_surface_from_factory() {
        let config = LiftConfig::new().with_acceleration(Acceleration::Simd4);
        assert!(matches!(
            Liftlet::make_cdf97_f32(config),
            Err(LiftletError::WorkersMismatch(4, 1))
        ));
        let config = LiftConfig::new().with_acceleration(Acceleration::Offload);
        assert!(matches!(
            Liftlet::make_cdf97_f32(config.clone()),
            Err(LiftletError::OffloadUnavailable)
        ));
        assert!(matches!(
            Liftlet::make_eaw_f32(1.0, config),
            Err(LiftletError::OffloadUnavailable)
        ));
        let config = LiftConfig::new().with_acceleration(Acceleration::Shifted2);
        assert!(matches!(
            Liftlet::make_eaw_f64(1.0, config),
            Err(LiftletError::UnsupportedAcceleration(Acceleration::Shifted2))
        ));
        assert!(matches!(
            Acceleration::from_id(42),
            Err(LiftletError::UnknownAcceleration(42))
        ));
    }

    #[test]
    fn test_strided_round_trip_with_padding() {
        let mut rng = StdRng::seed_from_u64(31);
        let (outer, active) = (Extent::new(24, 20), Extent::new(21, 17));
        let strides = Strides::cache_optimized::<f32>(outer.width);
        let pitch = strides.row_elements::<f32>().unwrap();
        let mut data = vec![0f32; pitch * outer.height];
        let mut image = StridedImage::new(&mut data, 0, strides, outer.width, outer.height).unwrap();
        let mut original = Vec::with_capacity(active.width * active.height);
        for y in 0..active.height {
            for x in 0..active.width {
                let v = rng.gen_range(0.0..1.0);
                image.set(y, x, v);
                original.push(v);
            }
        }
        let d = Decomposition::new(outer).with_active(active);
        let config = LiftConfig::new()
            .with_acceleration(Acceleration::Simd4)
            .with_workers(4)
            .unwrap()
            .with_threads(2)
            .unwrap();
        let executor = Liftlet::make_cdf97_f32(config).unwrap();
        let levels = executor.forward_2d(&mut image, &d).unwrap();
        assert_eq!(levels, d.resolved_levels());
        executor.inverse_2d(&mut image, &d).unwrap();
        // Samples outside the active rectangle are scratch space for the bands.
        for y in 0..active.height {
            for x in 0..active.width {
                let (a, b) = (image.get(y, x), original[y * active.width + x]);
                assert!((a - b).abs() < 1e-4, "Restored {a} at ({y}, {x}), expected {b}");
            }
        }
    }

    #[test]
    fn test_subbands_after_forward() {
        let (w, h) = (16, 16);
        let mut data = vec![3f64; w * h];
        let mut image = StridedImage::packed(&mut data, w, h).unwrap();
        let d = Decomposition::new(Extent::new(w, h)).with_levels(Levels::Count(2));
        let executor = Liftlet::make_cdf53_f64(LiftConfig::new()).unwrap();
        executor.forward_2d(&mut image, &d).unwrap();
        for band in [Band::HL, Band::LH, Band::HH] {
            let sub = image.subband(d.outer, d.active, 1, band).unwrap();
            assert!(
                sub.to_vec().iter().all(|v| v.abs() < 1e-12),
                "{band} of a constant image must vanish"
            );
        }
        let ll = image.subband(d.outer, d.active, 2, Band::LL).unwrap();
        assert_eq!((ll.width(), ll.height()), (4, 4));
        // Each level scales the low band by zeta squared.
        assert!((ll.get(0, 0) - 12.).abs() < 1e-9, "LL value {}", ll.get(0, 0));
    }

    #[cfg(feature = "offload")]
    mod offload {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingBackend {
            calls: AtomicUsize,
        }

        impl OffloadBackend for CountingBackend {
            fn forward(&self, family: WaveletFamily, line: &mut [f32]) {
                self.calls.fetch_add(1, Ordering::Relaxed);
                let executor = Liftlet::make_executor::<f32>(family, LiftConfig::new()).unwrap();
                let mut signal = StridedSignal::contiguous(line).unwrap();
                executor.forward_1d(&mut signal).unwrap();
            }

            fn inverse(&self, family: WaveletFamily, line: &mut [f32]) {
                self.calls.fetch_add(1, Ordering::Relaxed);
                let executor = Liftlet::make_executor::<f32>(family, LiftConfig::new()).unwrap();
                let mut signal = StridedSignal::contiguous(line).unwrap();
                executor.inverse_1d(&mut signal).unwrap();
            }
        }

        #[test]
        fn test_offload_backend_serves_lines() {
            let backend = Arc::new(CountingBackend {
                calls: AtomicUsize::new(0),
            });
            let config = LiftConfig::new()
                .with_acceleration(Acceleration::Offload)
                .with_offload(backend.clone());
            let offloaded = Liftlet::make_cdf97_f32(config.clone()).unwrap();
            let scalar = Liftlet::make_cdf97_f32(LiftConfig::new()).unwrap();

            let mut rng = StdRng::seed_from_u64(32);
            let original: Vec<f32> = (0..12 * 9).map(|_| rng.gen_range(0.0..1.0)).collect();
            let d = Decomposition::new(Extent::new(12, 9)).with_levels(Levels::Count(1));
            let mut a = original.clone();
            let mut b = original.clone();
            offloaded
                .forward_2d(&mut StridedImage::packed(&mut a, 12, 9).unwrap(), &d)
                .unwrap();
            scalar
                .forward_2d(&mut StridedImage::packed(&mut b, 12, 9).unwrap(), &d)
                .unwrap();
            assert_eq!(a, b);
            assert_eq!(backend.calls.load(Ordering::Relaxed), 9 + 12);

            assert!(matches!(
                Liftlet::make_cdf97_f64(config),
                Err(LiftletError::OffloadUnavailable)
            ));
        }
    }
}
