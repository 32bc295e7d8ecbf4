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
use std::arch::aarch64::*;

/// Four single precision lines in one NEON register.
#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub struct NeonF32x4(float32x4_t);

/// Four double precision lines split over two NEON registers.
#[derive(Copy, Clone, Debug)]
pub struct NeonF64x4(float64x2_t, float64x2_t);

// Multiply and add are issued separately: vfmaq would round once and break
// bit equality with the scalar kernels.

impl LiftLane<f32> for NeonF32x4 {
    const LANES: usize = 4;
    type Coeff = float32x4_t;

    #[inline(always)]
    fn coeff(c: f64) -> float32x4_t {
        unsafe { vdupq_n_f32(c as f32) }
    }

    #[inline(always)]
    fn zero() -> Self {
        unsafe { NeonF32x4(vdupq_n_f32(0.)) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let src = &src[..4];
        unsafe { NeonF32x4(vld1q_f32(src.as_ptr())) }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        let dst = &mut dst[..4];
        unsafe { vst1q_f32(dst.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn lift(self, c: float32x4_t, left: Self, right: Self) -> Self {
        unsafe { NeonF32x4(vaddq_f32(self.0, vmulq_f32(c, vaddq_f32(left.0, right.0)))) }
    }

    #[inline(always)]
    fn unlift(self, c: float32x4_t, left: Self, right: Self) -> Self {
        unsafe { NeonF32x4(vsubq_f32(self.0, vmulq_f32(c, vaddq_f32(left.0, right.0)))) }
    }

    #[inline(always)]
    fn scale(self, c: float32x4_t) -> Self {
        unsafe { NeonF32x4(vmulq_f32(self.0, c)) }
    }

    #[inline(always)]
    fn transpose4(rows: [Self; 4]) -> [Self; 4] {
        unsafe {
            let t0 = vzip1q_f32(rows[0].0, rows[2].0);
            let t1 = vzip2q_f32(rows[0].0, rows[2].0);
            let t2 = vzip1q_f32(rows[1].0, rows[3].0);
            let t3 = vzip2q_f32(rows[1].0, rows[3].0);
            [
                NeonF32x4(vzip1q_f32(t0, t2)),
                NeonF32x4(vzip2q_f32(t0, t2)),
                NeonF32x4(vzip1q_f32(t1, t3)),
                NeonF32x4(vzip2q_f32(t1, t3)),
            ]
        }
    }
}

impl LiftLane<f64> for NeonF64x4 {
    const LANES: usize = 4;
    type Coeff = float64x2_t;

    #[inline(always)]
    fn coeff(c: f64) -> float64x2_t {
        unsafe { vdupq_n_f64(c) }
    }

    #[inline(always)]
    fn zero() -> Self {
        unsafe { NeonF64x4(vdupq_n_f64(0.), vdupq_n_f64(0.)) }
    }

    #[inline(always)]
    fn load(src: &[f64]) -> Self {
        let src = &src[..4];
        unsafe {
            NeonF64x4(
                vld1q_f64(src.as_ptr()),
                vld1q_f64(src.get_unchecked(2..).as_ptr()),
            )
        }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f64]) {
        let dst = &mut dst[..4];
        unsafe {
            vst1q_f64(dst.as_mut_ptr(), self.0);
            vst1q_f64(dst.get_unchecked_mut(2..).as_mut_ptr(), self.1);
        }
    }

    #[inline(always)]
    fn lift(self, c: float64x2_t, left: Self, right: Self) -> Self {
        unsafe {
            NeonF64x4(
                vaddq_f64(self.0, vmulq_f64(c, vaddq_f64(left.0, right.0))),
                vaddq_f64(self.1, vmulq_f64(c, vaddq_f64(left.1, right.1))),
            )
        }
    }

    #[inline(always)]
    fn unlift(self, c: float64x2_t, left: Self, right: Self) -> Self {
        unsafe {
            NeonF64x4(
                vsubq_f64(self.0, vmulq_f64(c, vaddq_f64(left.0, right.0))),
                vsubq_f64(self.1, vmulq_f64(c, vaddq_f64(left.1, right.1))),
            )
        }
    }

    #[inline(always)]
    fn scale(self, c: float64x2_t) -> Self {
        unsafe { NeonF64x4(vmulq_f64(self.0, c), vmulq_f64(self.1, c)) }
    }

    #[inline(always)]
    fn transpose4(rows: [Self; 4]) -> [Self; 4] {
        let [a, b, c, d] = rows;
        unsafe {
            [
                NeonF64x4(vzip1q_f64(a.0, b.0), vzip1q_f64(c.0, d.0)),
                NeonF64x4(vzip2q_f64(a.0, b.0), vzip2q_f64(c.0, d.0)),
                NeonF64x4(vzip1q_f64(a.1, b.1), vzip1q_f64(c.1, d.1)),
                NeonF64x4(vzip2q_f64(a.1, b.1), vzip2q_f64(c.1, d.1)),
            ]
        }
    }
}
