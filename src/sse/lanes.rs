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
use crate::sample::LiftLane;
use crate::sse::util::{
    _mm_lift_pd, _mm_lift_ps, _mm_transpose4_ps, _mm_unlift_pd, _mm_unlift_ps,
};
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Four single precision lines in one SSE register.
#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub struct SseF32x4(__m128);

/// Four double precision lines split over two SSE registers.
#[derive(Copy, Clone, Debug)]
pub struct SseF64x4(__m128d, __m128d);

impl LiftLane<f32> for SseF32x4 {
    const LANES: usize = 4;
    type Coeff = __m128;

    #[inline(always)]
    fn coeff(c: f64) -> __m128 {
        unsafe { _mm_set1_ps(c as f32) }
    }

    #[inline(always)]
    fn zero() -> Self {
        unsafe { SseF32x4(_mm_setzero_ps()) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let src = &src[..4];
        unsafe { SseF32x4(_mm_loadu_ps(src.as_ptr())) }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        let dst = &mut dst[..4];
        unsafe { _mm_storeu_ps(dst.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn lift(self, c: __m128, left: Self, right: Self) -> Self {
        unsafe { SseF32x4(_mm_lift_ps(self.0, c, left.0, right.0)) }
    }

    #[inline(always)]
    fn unlift(self, c: __m128, left: Self, right: Self) -> Self {
        unsafe { SseF32x4(_mm_unlift_ps(self.0, c, left.0, right.0)) }
    }

    #[inline(always)]
    fn scale(self, c: __m128) -> Self {
        unsafe { SseF32x4(_mm_mul_ps(self.0, c)) }
    }

    #[inline(always)]
    fn transpose4(rows: [Self; 4]) -> [Self; 4] {
        let [c0, c1, c2, c3] =
            unsafe { _mm_transpose4_ps(rows[0].0, rows[1].0, rows[2].0, rows[3].0) };
        [SseF32x4(c0), SseF32x4(c1), SseF32x4(c2), SseF32x4(c3)]
    }
}

impl LiftLane<f64> for SseF64x4 {
    const LANES: usize = 4;
    type Coeff = __m128d;

    #[inline(always)]
    fn coeff(c: f64) -> __m128d {
        unsafe { _mm_set1_pd(c) }
    }

    #[inline(always)]
    fn zero() -> Self {
        unsafe { SseF64x4(_mm_setzero_pd(), _mm_setzero_pd()) }
    }

    #[inline(always)]
    fn load(src: &[f64]) -> Self {
        let src = &src[..4];
        unsafe {
            SseF64x4(
                _mm_loadu_pd(src.as_ptr()),
                _mm_loadu_pd(src.get_unchecked(2..).as_ptr()),
            )
        }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f64]) {
        let dst = &mut dst[..4];
        unsafe {
            _mm_storeu_pd(dst.as_mut_ptr(), self.0);
            _mm_storeu_pd(dst.get_unchecked_mut(2..).as_mut_ptr(), self.1);
        }
    }

    #[inline(always)]
    fn lift(self, c: __m128d, left: Self, right: Self) -> Self {
        unsafe {
            SseF64x4(
                _mm_lift_pd(self.0, c, left.0, right.0),
                _mm_lift_pd(self.1, c, left.1, right.1),
            )
        }
    }

    #[inline(always)]
    fn unlift(self, c: __m128d, left: Self, right: Self) -> Self {
        unsafe {
            SseF64x4(
                _mm_unlift_pd(self.0, c, left.0, right.0),
                _mm_unlift_pd(self.1, c, left.1, right.1),
            )
        }
    }

    #[inline(always)]
    fn scale(self, c: __m128d) -> Self {
        unsafe { SseF64x4(_mm_mul_pd(self.0, c), _mm_mul_pd(self.1, c)) }
    }

    #[inline(always)]
    fn transpose4(rows: [Self; 4]) -> [Self; 4] {
        let [a, b, c, d] = rows;
        unsafe {
            [
                SseF64x4(_mm_unpacklo_pd(a.0, b.0), _mm_unpacklo_pd(c.0, d.0)),
                SseF64x4(_mm_unpackhi_pd(a.0, b.0), _mm_unpackhi_pd(c.0, d.0)),
                SseF64x4(_mm_unpacklo_pd(a.1, b.1), _mm_unpacklo_pd(c.1, d.1)),
                SseF64x4(_mm_unpackhi_pd(a.1, b.1), _mm_unpackhi_pd(c.1, d.1)),
            ]
        }
    }
}
