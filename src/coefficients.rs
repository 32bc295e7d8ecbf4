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
use std::fmt::{Display, Formatter};

pub(crate) const CDF97_ALPHA: f64 = -1.5861343420693648;
pub(crate) const CDF97_BETA: f64 = -0.0529801185718856;
pub(crate) const CDF97_GAMMA: f64 = 0.8829110755411875;
pub(crate) const CDF97_DELTA: f64 = 0.4435068520511142;
pub(crate) const CDF97_ZETA: f64 = 1.1496043988602418;

pub(crate) const CDF53_ALPHA: f64 = -0.5;
pub(crate) const CDF53_BETA: f64 = 0.25;
pub(crate) const CDF53_ZETA: f64 = std::f64::consts::SQRT_2;

/// Wavelet families with a fixed lifting factorization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum WaveletFamily {
    /// Cohen-Daubechies-Feauveau 9/7, four lifting steps.
    Cdf97,
    /// Cohen-Daubechies-Feauveau 5/3, two lifting steps.
    Cdf53,
    /// Interpolating 5/3: the 5/3 steps without normalization.
    Interpolating53,
}

/// Lifting steps in forward order followed by the normalization factor.
///
/// The forward transform multiplies approximation samples by `zeta` and
/// detail samples by `1 / zeta` after the last step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LiftingCoefficients {
    pub steps: &'static [f64],
    pub zeta: f64,
}

static CDF97_STEPS: [f64; 4] = [CDF97_ALPHA, CDF97_BETA, CDF97_GAMMA, CDF97_DELTA];
static CDF53_STEPS: [f64; 2] = [CDF53_ALPHA, CDF53_BETA];

impl WaveletFamily {
    pub const ALL: [WaveletFamily; 3] = [
        WaveletFamily::Cdf97,
        WaveletFamily::Cdf53,
        WaveletFamily::Interpolating53,
    ];

    pub fn coefficients(self) -> LiftingCoefficients {
        match self {
            WaveletFamily::Cdf97 => LiftingCoefficients {
                steps: &CDF97_STEPS,
                zeta: CDF97_ZETA,
            },
            WaveletFamily::Cdf53 => LiftingCoefficients {
                steps: &CDF53_STEPS,
                zeta: CDF53_ZETA,
            },
            WaveletFamily::Interpolating53 => LiftingCoefficients {
                steps: &CDF53_STEPS,
                zeta: 1.,
            },
        }
    }

    /// Number of predict and update steps.
    #[inline]
    pub fn lifting_steps(self) -> usize {
        self.coefficients().steps.len()
    }
}

impl Display for WaveletFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WaveletFamily::Cdf97 => f.write_str("CDF 9/7"),
            WaveletFamily::Cdf53 => f.write_str("CDF 5/3"),
            WaveletFamily::Interpolating53 => f.write_str("interpolating 5/3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf97_dc_gain() {
        // A constant signal survives the predict steps as zero details and the
        // approximation ends up scaled by sqrt(2).
        let c = WaveletFamily::Cdf97.coefficients();
        let x = 1.0f64;
        let d = x + 2. * c.steps[0] * x;
        let s = x + 2. * c.steps[1] * d;
        let d = d + 2. * c.steps[2] * s;
        let s = s + 2. * c.steps[3] * d;
        assert!(d.abs() < 1e-9, "Detail of constant signal should vanish, got {d}");
        assert!(
            (s * c.zeta - std::f64::consts::SQRT_2).abs() < 1e-6,
            "DC gain should be sqrt(2), got {}",
            s * c.zeta
        );
    }

    #[test]
    fn test_step_counts() {
        assert_eq!(WaveletFamily::Cdf97.lifting_steps(), 4);
        assert_eq!(WaveletFamily::Cdf53.lifting_steps(), 2);
        assert_eq!(WaveletFamily::Interpolating53.lifting_steps(), 2);
        assert_eq!(WaveletFamily::Interpolating53.coefficients().zeta, 1.);
    }
}
