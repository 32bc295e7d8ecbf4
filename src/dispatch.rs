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
use crate::coefficients::WaveletFamily;
use crate::err::LiftletError;
use crate::kernel::{Forward, Inverse, lift_family};
use crate::log::ltrace;
use crate::pipeline::CoreVariant;
use crate::sample::{LiftLane, LiftingSample};
use rayon::ThreadPool;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// Selects which pipeline variant runs the Core phase.
///
/// Every variant computes the same transform; switching changes only speed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Acceleration {
    /// Scalar double loop.
    #[default]
    Scalar,
    /// Scalar core unrolled over blocks of 2 iterations.
    Shifted2,
    /// Scalar core unrolled over blocks of 3 iterations.
    Shifted3,
    /// Scalar core unrolled over blocks of 6 iterations.
    Shifted6,
    /// Four lines transformed together with portable lane arrays.
    MultiWorker,
    /// Four lines transformed together in native SIMD registers.
    Simd4,
    /// Fused horizontal and vertical lifting over 4x4 tiles.
    Tile4x4,
    /// Lines handed to an external [`OffloadBackend`].
    Offload,
}

impl Acceleration {
    pub const ALL: [Acceleration; 8] = [
        Acceleration::Scalar,
        Acceleration::Shifted2,
        Acceleration::Shifted3,
        Acceleration::Shifted6,
        Acceleration::MultiWorker,
        Acceleration::Simd4,
        Acceleration::Tile4x4,
        Acceleration::Offload,
    ];

    /// Maps an integer acceleration mode onto a variant.
    pub fn from_id(id: i32) -> Result<Acceleration, LiftletError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| Acceleration::ALL.get(i).copied())
            .ok_or(LiftletError::UnknownAcceleration(id))
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    /// Number of workers the variant transforms in one go, when it is fixed.
    pub fn required_workers(self) -> Option<usize> {
        match self {
            Acceleration::MultiWorker | Acceleration::Simd4 | Acceleration::Tile4x4 => Some(4),
            _ => None,
        }
    }
}

impl Display for Acceleration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Acceleration::Scalar => f.write_str("scalar"),
            Acceleration::Shifted2 => f.write_str("shifted x2"),
            Acceleration::Shifted3 => f.write_str("shifted x3"),
            Acceleration::Shifted6 => f.write_str("shifted x6"),
            Acceleration::MultiWorker => f.write_str("multi-worker x4"),
            Acceleration::Simd4 => f.write_str("simd x4"),
            Acceleration::Tile4x4 => f.write_str("tiles 4x4"),
            Acceleration::Offload => f.write_str("offload"),
        }
    }
}

/// External line transformer registered as the [`Acceleration::Offload`]
/// variant.
///
/// Lines arrive contiguous and must be transformed in place into the
/// interleaved layout: approximation at even positions, details at odd ones,
/// exactly as the built-in kernels do.
#[cfg(feature = "offload")]
pub trait OffloadBackend: Send + Sync {
    fn forward(&self, family: WaveletFamily, line: &mut [f32]);
    fn inverse(&self, family: WaveletFamily, line: &mut [f32]);
}

/// Settings shared by every entry point.
///
/// Clones share the thread pool.
#[derive(Clone)]
pub struct LiftConfig {
    acceleration: Acceleration,
    threads: usize,
    workers: usize,
    pool: Option<Arc<ThreadPool>>,
    #[cfg(feature = "offload")]
    offload: Option<Arc<dyn OffloadBackend>>,
}

impl Default for LiftConfig {
    fn default() -> Self {
        LiftConfig {
            acceleration: Acceleration::Scalar,
            threads: 1,
            workers: 1,
            pool: None,
            #[cfg(feature = "offload")]
            offload: None,
        }
    }
}

impl Debug for LiftConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("LiftConfig");
        s.field("acceleration", &self.acceleration)
            .field("threads", &self.threads)
            .field("workers", &self.workers);
        #[cfg(feature = "offload")]
        s.field("offload", &self.offload.is_some());
        s.finish()
    }
}

impl LiftConfig {
    pub fn new() -> LiftConfig {
        LiftConfig::default()
    }

    pub fn acceleration(&self) -> Acceleration {
        self.acceleration
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn set_acceleration(&mut self, acceleration: Acceleration) {
        self.acceleration = acceleration;
    }

    /// Lines of one pass are spread over `threads` threads; one keeps all
    /// work on the calling thread.
    pub fn set_threads(&mut self, threads: usize) -> Result<(), LiftletError> {
        if threads == 0 {
            return Err(LiftletError::InvalidThreadCount);
        }
        self.pool = if threads == 1 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| LiftletError::ThreadPoolCreation(e.to_string()))?;
            Some(Arc::new(pool))
        };
        self.threads = threads;
        Ok(())
    }

    /// Number of lines a 4-lane variant transforms together, 1 or 4.
    pub fn set_workers(&mut self, workers: usize) -> Result<(), LiftletError> {
        if workers != 1 && workers != 4 {
            return Err(LiftletError::InvalidWorkerCount(workers));
        }
        self.workers = workers;
        Ok(())
    }

    #[cfg(feature = "offload")]
    pub fn set_offload(&mut self, backend: Arc<dyn OffloadBackend>) {
        self.offload = Some(backend);
    }

    pub fn with_acceleration(mut self, acceleration: Acceleration) -> Self {
        self.set_acceleration(acceleration);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Result<Self, LiftletError> {
        self.set_threads(threads)?;
        Ok(self)
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, LiftletError> {
        self.set_workers(workers)?;
        Ok(self)
    }

    #[cfg(feature = "offload")]
    pub fn with_offload(mut self, backend: Arc<dyn OffloadBackend>) -> Self {
        self.set_offload(backend);
        self
    }

    /// Checks that the selected variant can run with the other settings.
    pub fn validate(&self) -> Result<(), LiftletError> {
        if let Some(required) = self.acceleration.required_workers() {
            if required != self.workers {
                return Err(LiftletError::WorkersMismatch(required, self.workers));
            }
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn pool(&self) -> Option<&ThreadPool> {
        self.pool.as_deref()
    }
}

/// A Core pipeline variant bound to a sample type.
pub trait LinePass<T>: Send + Sync {
    /// Number of lines transformed by one call.
    fn lanes(&self) -> usize;

    /// Transforms `n` samples of `lanes()` interleaved lines in place.
    fn forward(&self, family: WaveletFamily, buf: &mut [T], n: usize);

    fn inverse(&self, family: WaveletFamily, buf: &mut [T], n: usize);
}

pub(crate) struct LanePass<V> {
    core: CoreVariant,
    _phantom: PhantomData<fn() -> V>,
}

impl<V> LanePass<V> {
    pub(crate) fn new(core: CoreVariant) -> Self {
        LanePass {
            core,
            _phantom: PhantomData,
        }
    }
}

impl<T: LiftingSample, V: LiftLane<T>> LinePass<T> for LanePass<V> {
    fn lanes(&self) -> usize {
        V::LANES
    }

    fn forward(&self, family: WaveletFamily, buf: &mut [T], n: usize) {
        lift_family::<T, V, Forward>(family, buf, n, self.core);
    }

    fn inverse(&self, family: WaveletFamily, buf: &mut [T], n: usize) {
        lift_family::<T, V, Inverse>(family, buf, n, self.core);
    }
}

#[cfg(feature = "offload")]
pub(crate) struct OffloadPass {
    backend: Arc<dyn OffloadBackend>,
}

#[cfg(feature = "offload")]
impl OffloadPass {
    pub(crate) fn new(backend: Arc<dyn OffloadBackend>) -> Self {
        OffloadPass { backend }
    }
}

#[cfg(feature = "offload")]
impl LinePass<f32> for OffloadPass {
    fn lanes(&self) -> usize {
        1
    }

    fn forward(&self, family: WaveletFamily, buf: &mut [f32], n: usize) {
        self.backend.forward(family, &mut buf[..n]);
    }

    fn inverse(&self, family: WaveletFamily, buf: &mut [f32], n: usize) {
        self.backend.inverse(family, &mut buf[..n]);
    }
}

/// Resolves the configured variant for sample type `T`.
///
/// [`Acceleration::Tile4x4`] resolves to the 4-lane SIMD pass, which the
/// 2-D driver uses for anything it does not fuse.
pub(crate) fn select_line_pass<T: LiftingSample>(
    config: &LiftConfig,
) -> Result<Box<dyn LinePass<T>>, LiftletError> {
    config.validate()?;
    let pass: Box<dyn LinePass<T>> = match config.acceleration {
        Acceleration::Scalar => Box::new(LanePass::<T>::new(CoreVariant::DoubleLoop)),
        Acceleration::Shifted2 => Box::new(LanePass::<T>::new(CoreVariant::Shifted2)),
        Acceleration::Shifted3 => Box::new(LanePass::<T>::new(CoreVariant::Shifted3)),
        Acceleration::Shifted6 => Box::new(LanePass::<T>::new(CoreVariant::Shifted6)),
        Acceleration::MultiWorker => Box::new(LanePass::<[T; 4]>::new(CoreVariant::DoubleLoop)),
        Acceleration::Simd4 | Acceleration::Tile4x4 => {
            Box::new(LanePass::<T::Simd4>::new(CoreVariant::Shifted2))
        }
        Acceleration::Offload => offload_pass::<T>(config)?,
    };
    ltrace!(
        "Selected {} pipeline over {} lanes",
        config.acceleration,
        pass.lanes()
    );
    Ok(pass)
}

#[cfg(feature = "offload")]
fn offload_pass<T: LiftingSample>(
    config: &LiftConfig,
) -> Result<Box<dyn LinePass<T>>, LiftletError> {
    config
        .offload
        .as_ref()
        .and_then(|backend| T::offload_pass(backend))
        .ok_or(LiftletError::OffloadUnavailable)
}

#[cfg(not(feature = "offload"))]
fn offload_pass<T: LiftingSample>(_: &LiftConfig) -> Result<Box<dyn LinePass<T>>, LiftletError> {
    Err(LiftletError::OffloadUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceleration_ids() {
        for acceleration in Acceleration::ALL {
            assert_eq!(Acceleration::from_id(acceleration.id()), Ok(acceleration));
        }
        assert_eq!(
            Acceleration::from_id(8),
            Err(LiftletError::UnknownAcceleration(8))
        );
        assert_eq!(
            Acceleration::from_id(-1),
            Err(LiftletError::UnknownAcceleration(-1))
        );
    }

    #[test]
    fn test_worker_validation() {
        let config = LiftConfig::new().with_acceleration(Acceleration::Simd4);
        assert_eq!(
            config.validate(),
            Err(LiftletError::WorkersMismatch(4, 1))
        );
        let config = config.with_workers(4).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            LiftConfig::new().with_workers(3).err(),
            Some(LiftletError::InvalidWorkerCount(3))
        );
        assert_eq!(
            LiftConfig::new().with_threads(0).err(),
            Some(LiftletError::InvalidThreadCount)
        );
    }

    #[test]
    fn test_selected_lanes() {
        let lanes = |acceleration: Acceleration| {
            let config = LiftConfig::new()
                .with_acceleration(acceleration)
                .with_workers(acceleration.required_workers().unwrap_or(1))
                .unwrap();
            select_line_pass::<f32>(&config).map(|p| p.lanes())
        };
        assert_eq!(lanes(Acceleration::Scalar), Ok(1));
        assert_eq!(lanes(Acceleration::Shifted6), Ok(1));
        assert_eq!(lanes(Acceleration::MultiWorker), Ok(4));
        assert_eq!(lanes(Acceleration::Simd4), Ok(4));
        assert_eq!(lanes(Acceleration::Tile4x4), Ok(4));
        assert_eq!(
            lanes(Acceleration::Offload),
            Err(LiftletError::OffloadUnavailable)
        );
    }

    #[cfg(feature = "offload")]
    #[test]
    fn test_offload_only_for_f32() {
        struct Scalar;
        impl OffloadBackend for Scalar {
            fn forward(&self, family: WaveletFamily, line: &mut [f32]) {
                let n = line.len();
                lift_family::<f32, f32, Forward>(family, line, n, CoreVariant::DoubleLoop);
            }
            fn inverse(&self, family: WaveletFamily, line: &mut [f32]) {
                let n = line.len();
                lift_family::<f32, f32, Inverse>(family, line, n, CoreVariant::DoubleLoop);
            }
        }
        let config = LiftConfig::new()
            .with_acceleration(Acceleration::Offload)
            .with_offload(Arc::new(Scalar));
        assert!(select_line_pass::<f32>(&config).is_ok());
        assert!(matches!(
            select_line_pass::<f64>(&config),
            Err(LiftletError::OffloadUnavailable)
        ));
    }
}
