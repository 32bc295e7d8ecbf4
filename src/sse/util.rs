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
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[inline(always)]
pub(crate) const fn shuffle(z: u32, y: u32, x: u32, w: u32) -> i32 {
    // Checked: we want to reinterpret the bits
    ((z << 6) | (y << 4) | (x << 2) | w) as i32
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_unpack2hi_ps(a: __m128, b: __m128) -> __m128 {
    _mm_shuffle_ps::<{ shuffle(3, 2, 3, 2) }>(a, b)
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_unpack2lo_ps(a: __m128, b: __m128) -> __m128 {
    _mm_castpd_ps(_mm_unpacklo_pd(_mm_castps_pd(a), _mm_castps_pd(b)))
}

/// Transposes a 4x4 block of single precision values held in four rows.
#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_transpose4_ps(r0: __m128, r1: __m128, r2: __m128, r3: __m128) -> [__m128; 4] {
    let t0 = _mm_unpacklo_ps(r0, r1);
    let t1 = _mm_unpacklo_ps(r2, r3);
    let t2 = _mm_unpackhi_ps(r0, r1);
    let t3 = _mm_unpackhi_ps(r2, r3);
    [
        _mm_unpack2lo_ps(t0, t1),
        _mm_unpack2hi_ps(t0, t1),
        _mm_unpack2lo_ps(t2, t3),
        _mm_unpack2hi_ps(t2, t3),
    ]
}

/// `a + c * (l + r)`, kept unfused so results match the scalar kernels bit for bit.
#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_lift_ps(a: __m128, c: __m128, l: __m128, r: __m128) -> __m128 {
    _mm_add_ps(a, _mm_mul_ps(c, _mm_add_ps(l, r)))
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_unlift_ps(a: __m128, c: __m128, l: __m128, r: __m128) -> __m128 {
    _mm_sub_ps(a, _mm_mul_ps(c, _mm_add_ps(l, r)))
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_lift_pd(a: __m128d, c: __m128d, l: __m128d, r: __m128d) -> __m128d {
    _mm_add_pd(a, _mm_mul_pd(c, _mm_add_pd(l, r)))
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) fn _mm_unlift_pd(a: __m128d, c: __m128d, l: __m128d, r: __m128d) -> __m128d {
    _mm_sub_pd(a, _mm_mul_pd(c, _mm_add_pd(l, r)))
}
