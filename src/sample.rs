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
use std::fmt::Debug;

/// A group of samples the lifting kernel updates with one operation.
///
/// A lane group is either a single sample (`LANES == 1`) or four samples taken
/// from four independent lines at the same position. Lanes never interact,
/// so the same Prolog/Core/Epilog code runs over scalars, portable arrays
/// and native SIMD registers.
pub trait LiftLane<T>: Copy + Send + Sync + 'static {
    /// Number of independent lines carried by one value.
    const LANES: usize;
    /// Lifting coefficient prepared for this lane group.
    type Coeff: Copy + Send + Sync + 'static;

    fn coeff(c: f64) -> Self::Coeff;

    fn zero() -> Self;

    /// Reads `LANES` consecutive samples.
    fn load(src: &[T]) -> Self;

    /// Writes `LANES` consecutive samples.
    fn store(self, dst: &mut [T]);

    /// `self + c * (left + right)`
    fn lift(self, c: Self::Coeff, left: Self, right: Self) -> Self;

    /// Exact inverse of [`LiftLane::lift`] for the same operands.
    fn unlift(self, c: Self::Coeff, left: Self, right: Self) -> Self;

    fn scale(self, c: Self::Coeff) -> Self;

    /// Transposes a 4x4 block given as four lane groups.
    ///
    /// Only meaningful for `LANES == 4`.
    fn transpose4(rows: [Self; 4]) -> [Self; 4]
    where
        T: Copy + Default,
    {
        let mut block = [[T::default(); 4]; 4];
        for (dst, row) in block.iter_mut().zip(rows.iter()) {
            row.store(dst);
        }
        let mut columns = [[T::default(); 4]; 4];
        for (y, row) in block.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                columns[x][y] = v;
            }
        }
        [
            Self::load(&columns[0]),
            Self::load(&columns[1]),
            Self::load(&columns[2]),
            Self::load(&columns[3]),
        ]
    }
}

/// Numeric kinds the lifting engine is instantiated for.
pub trait LiftingSample: LiftLane<Self> + Copy + Default + Debug + PartialEq + Send + Sync {
    /// Native 4-lane register used by the SIMD pipeline variants.
    type Simd4: LiftLane<Self>;

    #[cfg(feature = "offload")]
    #[doc(hidden)]
    fn offload_pass(
        _backend: &std::sync::Arc<dyn crate::OffloadBackend>,
    ) -> Option<Box<dyn crate::dispatch::LinePass<Self>>> {
        None
    }
}

macro_rules! define_float_lane {
    ($t: ty) => {
        impl LiftLane<$t> for $t {
            const LANES: usize = 1;
            type Coeff = $t;

            #[inline(always)]
            fn coeff(c: f64) -> $t {
                c as $t
            }

            #[inline(always)]
            fn zero() -> $t {
                0.
            }

            #[inline(always)]
            fn load(src: &[$t]) -> $t {
                src[0]
            }

            #[inline(always)]
            fn store(self, dst: &mut [$t]) {
                dst[0] = self;
            }

            #[inline(always)]
            fn lift(self, c: $t, left: $t, right: $t) -> $t {
                self + c * (left + right)
            }

            #[inline(always)]
            fn unlift(self, c: $t, left: $t, right: $t) -> $t {
                self - c * (left + right)
            }

            #[inline(always)]
            fn scale(self, c: $t) -> $t {
                self * c
            }
        }
    };
}

define_float_lane!(f32);
define_float_lane!(f64);

/// Integer lifting rounds every update as `floor(c * (left + right) + 1/2)`,
/// which keeps the transform exactly reversible for any coefficient.
#[inline(always)]
fn rounded_update(c: f64, left: i32, right: i32) -> i32 {
    let sum = left as f64 + right as f64;
    (c * sum + 0.5).floor() as i32
}

impl LiftLane<i32> for i32 {
    const LANES: usize = 1;
    type Coeff = f64;

    #[inline(always)]
    fn coeff(c: f64) -> f64 {
        c
    }

    #[inline(always)]
    fn zero() -> i32 {
        0
    }

    #[inline(always)]
    fn load(src: &[i32]) -> i32 {
        src[0]
    }

    #[inline(always)]
    fn store(self, dst: &mut [i32]) {
        dst[0] = self;
    }

    #[inline(always)]
    fn lift(self, c: f64, left: i32, right: i32) -> i32 {
        self.wrapping_add(rounded_update(c, left, right))
    }

    #[inline(always)]
    fn unlift(self, c: f64, left: i32, right: i32) -> i32 {
        self.wrapping_sub(rounded_update(c, left, right))
    }

    #[inline(always)]
    fn scale(self, _: f64) -> i32 {
        // Irrational scale factors cannot be inverted on integers.
        self
    }
}

/// Four lines unrolled by hand, used by the multi-worker variant and as the
/// fallback 4-lane register on targets without a native backend.
impl<T: LiftingSample> LiftLane<T> for [T; 4] {
    const LANES: usize = 4;
    type Coeff = <T as LiftLane<T>>::Coeff;

    #[inline(always)]
    fn coeff(c: f64) -> Self::Coeff {
        <T as LiftLane<T>>::coeff(c)
    }

    #[inline(always)]
    fn zero() -> Self {
        [T::zero(); 4]
    }

    #[inline(always)]
    fn load(src: &[T]) -> Self {
        [src[0], src[1], src[2], src[3]]
    }

    #[inline(always)]
    fn store(self, dst: &mut [T]) {
        dst[..4].copy_from_slice(&self);
    }

    #[inline(always)]
    fn lift(self, c: Self::Coeff, left: Self, right: Self) -> Self {
        [
            self[0].lift(c, left[0], right[0]),
            self[1].lift(c, left[1], right[1]),
            self[2].lift(c, left[2], right[2]),
            self[3].lift(c, left[3], right[3]),
        ]
    }

    #[inline(always)]
    fn unlift(self, c: Self::Coeff, left: Self, right: Self) -> Self {
        [
            self[0].unlift(c, left[0], right[0]),
            self[1].unlift(c, left[1], right[1]),
            self[2].unlift(c, left[2], right[2]),
            self[3].unlift(c, left[3], right[3]),
        ]
    }

    #[inline(always)]
    fn scale(self, c: Self::Coeff) -> Self {
        [
            self[0].scale(c),
            self[1].scale(c),
            self[2].scale(c),
            self[3].scale(c),
        ]
    }

    #[inline(always)]
    fn transpose4(rows: [Self; 4]) -> [Self; 4] {
        let mut columns = rows;
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                columns[x][y] = v;
            }
        }
        columns
    }
}

impl LiftingSample for f32 {
    #[cfg(all(target_arch = "x86_64", feature = "sse"))]
    type Simd4 = crate::sse::SseF32x4;
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    type Simd4 = crate::neon::NeonF32x4;
    #[cfg(not(any(
        all(target_arch = "x86_64", feature = "sse"),
        all(target_arch = "aarch64", feature = "neon")
    )))]
    type Simd4 = [f32; 4];

    #[cfg(feature = "offload")]
    fn offload_pass(
        backend: &std::sync::Arc<dyn crate::OffloadBackend>,
    ) -> Option<Box<dyn crate::dispatch::LinePass<f32>>> {
        Some(Box::new(crate::dispatch::OffloadPass::new(backend.clone())))
    }
}

impl LiftingSample for f64 {
    #[cfg(all(target_arch = "x86_64", feature = "sse"))]
    type Simd4 = crate::sse::SseF64x4;
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    type Simd4 = crate::neon::NeonF64x4;
    #[cfg(not(any(
        all(target_arch = "x86_64", feature = "sse"),
        all(target_arch = "aarch64", feature = "neon")
    )))]
    type Simd4 = [f64; 4];
}

impl LiftingSample for i32 {
    type Simd4 = [i32; 4];
}
