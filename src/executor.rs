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
use crate::dispatch::{Acceleration, LanePass, LiftConfig, LinePass, select_line_pass};
use crate::dwt2d::{Decomposition, Driver, read_line, write_line};
use crate::err::{LiftletError, try_vec};
use crate::pipeline::CoreVariant;
use crate::sample::LiftingSample;
use crate::strided::{StridedImage, StridedSignal};
use crate::util::split_lengths;
use crate::{Lifting1dExecutor, Lifting2dExecutor, LiftingExecutor};

/// One wavelet family bound to one resolved pipeline variant.
pub(crate) struct LiftingDwt<T> {
    family: WaveletFamily,
    config: LiftConfig,
    pass: Box<dyn LinePass<T>>,
    // Single lines can't fill a lane group.
    scalar: LanePass<T>,
}

impl<T: LiftingSample> LiftingDwt<T> {
    pub(crate) fn new(family: WaveletFamily, config: LiftConfig) -> Result<Self, LiftletError> {
        let pass = select_line_pass::<T>(&config)?;
        Ok(LiftingDwt {
            family,
            config,
            pass,
            scalar: LanePass::new(CoreVariant::DoubleLoop),
        })
    }

    fn driver(&self) -> Driver<'_, T> {
        Driver {
            family: self.family,
            config: &self.config,
            pass: self.pass.as_ref(),
        }
    }

    fn line_pass(&self) -> &dyn LinePass<T> {
        if self.pass.lanes() == 1 {
            self.pass.as_ref()
        } else {
            &self.scalar
        }
    }

    fn check_split(
        &self,
        length: usize,
        approx: usize,
        details: usize,
    ) -> Result<(), LiftletError> {
        if length == 0 {
            return Err(LiftletError::EmptyExtent(length, 1));
        }
        let (approx_length, details_length) = split_lengths(length);
        if approx != approx_length {
            return Err(LiftletError::ApproxSizeNotMatches(approx, approx_length));
        }
        if details != details_length {
            return Err(LiftletError::DetailsSizeNotMatches(details, details_length));
        }
        Ok(())
    }
}

impl<T: LiftingSample> Lifting1dExecutor<T> for LiftingDwt<T> {
    fn forward_1d(&self, signal: &mut StridedSignal<'_, T>) -> Result<(), LiftletError> {
        let n = signal.len();
        let line = signal.line();
        let mut scratch = try_vec![T::default(); n];
        read_line(&line, n, None, &mut scratch);
        self.line_pass().forward(self.family, &mut scratch, n);
        write_line(&line, n, None, &scratch);
        Ok(())
    }

    fn inverse_1d(&self, signal: &mut StridedSignal<'_, T>) -> Result<(), LiftletError> {
        let n = signal.len();
        let line = signal.line();
        let mut scratch = try_vec![T::default(); n];
        read_line(&line, n, None, &mut scratch);
        self.line_pass().inverse(self.family, &mut scratch, n);
        write_line(&line, n, None, &scratch);
        Ok(())
    }

    fn forward_1d_split(
        &self,
        input: &[T],
        approx: &mut [T],
        details: &mut [T],
    ) -> Result<(), LiftletError> {
        self.check_split(input.len(), approx.len(), details.len())?;
        let mut scratch = try_vec![T::default(); input.len()];
        scratch.copy_from_slice(input);
        self.line_pass().forward(self.family, &mut scratch, input.len());
        for (dst, src) in approx.iter_mut().zip(scratch.iter().step_by(2)) {
            *dst = *src;
        }
        for (dst, src) in details.iter_mut().zip(scratch.iter().skip(1).step_by(2)) {
            *dst = *src;
        }
        Ok(())
    }

    fn inverse_1d_split(
        &self,
        approx: &[T],
        details: &[T],
        output: &mut [T],
    ) -> Result<(), LiftletError> {
        self.check_split(output.len(), approx.len(), details.len())?;
        for (dst, src) in output.iter_mut().step_by(2).zip(approx.iter()) {
            *dst = *src;
        }
        for (dst, src) in output.iter_mut().skip(1).step_by(2).zip(details.iter()) {
            *dst = *src;
        }
        let n = output.len();
        self.line_pass().inverse(self.family, output, n);
        Ok(())
    }
}

impl<T: LiftingSample> Lifting2dExecutor<T> for LiftingDwt<T> {
    fn forward_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError> {
        self.driver().forward_2d(image, d)
    }

    fn inverse_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError> {
        self.driver().inverse_2d(image, d)
    }

    fn forward_rows(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError> {
        self.driver().rows_only(image, d, false)
    }

    fn forward_cols(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError> {
        self.driver().columns_only(image, d, false)
    }

    fn inverse_rows(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError> {
        self.driver().rows_only(image, d, true)
    }

    fn inverse_cols(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<(), LiftletError> {
        self.driver().columns_only(image, d, true)
    }
}

impl<T: LiftingSample> LiftingExecutor<T> for LiftingDwt<T> {
    fn family(&self) -> WaveletFamily {
        self.family
    }

    fn acceleration(&self) -> Acceleration {
        self.config.acceleration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwt2d::{Extent, Levels};
    use crate::dwt2d::tests::{LOCAL_ACCELERATIONS, config_for};
    use crate::kernel::tests::reference_forward;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_split_matches_interleaved() {
        let mut rng = StdRng::seed_from_u64(21);
        for family in WaveletFamily::ALL {
            let dwt = LiftingDwt::<f64>::new(family, LiftConfig::new()).unwrap();
            for n in 1..24 {
                let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let (a, h) = split_lengths(n);
                let mut approx = vec![0.; a];
                let mut details = vec![0.; h];
                dwt.forward_1d_split(&x, &mut approx, &mut details).unwrap();
                let expected = reference_forward(family, &x);
                for i in 0..n {
                    let v = if i % 2 == 0 { approx[i / 2] } else { details[i / 2] };
                    assert!(
                        (v - expected[i]).abs() < 1e-12,
                        "{family} n {n}: {v} at {i}, expected {}",
                        expected[i]
                    );
                }
                let mut restored = vec![0.; n];
                dwt.inverse_1d_split(&approx, &details, &mut restored).unwrap();
                for (i, (&r, &o)) in restored.iter().zip(x.iter()).enumerate() {
                    assert!((r - o).abs() < 1e-12, "{family} n {n}: {r} at {i}, expected {o}");
                }
            }
        }
    }

    #[test]
    fn test_split_sizes_are_checked() {
        let dwt = LiftingDwt::<f32>::new(WaveletFamily::Cdf53, LiftConfig::new()).unwrap();
        let input = [1f32; 7];
        let (mut approx, mut details) = (vec![0f32; 3], vec![0f32; 3]);
        assert_eq!(
            dwt.forward_1d_split(&input, &mut approx, &mut details),
            Err(LiftletError::ApproxSizeNotMatches(3, 4))
        );
        let mut approx = vec![0f32; 4];
        let mut details = vec![0f32; 4];
        assert_eq!(
            dwt.forward_1d_split(&input, &mut approx, &mut details),
            Err(LiftletError::DetailsSizeNotMatches(4, 3))
        );
        assert_eq!(
            dwt.forward_1d_split(&[], &mut [], &mut []),
            Err(LiftletError::EmptyExtent(0, 1))
        );
    }

    #[test]
    fn test_strided_signal_every_acceleration() {
        let mut rng = StdRng::seed_from_u64(22);
        let x: Vec<f32> = (0..37).map(|_| rng.gen_range(0.0..1.0)).collect();
        for acceleration in LOCAL_ACCELERATIONS {
            let dwt = LiftingDwt::<f32>::new(WaveletFamily::Cdf97, config_for(acceleration, 2))
                .unwrap();
            // Every third sample of a larger buffer, walked backwards.
            let mut data = vec![0f32; 3 * x.len()];
            for (i, &v) in x.iter().enumerate() {
                data[3 * (x.len() - 1 - i)] = v;
            }
            let offset = 3 * (x.len() - 1);
            let mut signal = StridedSignal::new(&mut data, offset, -12, x.len()).unwrap();
            dwt.forward_1d(&mut signal).unwrap();
            let wide: Vec<f64> = x.iter().map(|&v| v as f64).collect();
            let expected = reference_forward(WaveletFamily::Cdf97, &wide);
            for (i, &e) in expected.iter().enumerate() {
                let v = signal.get(i) as f64;
                assert!((v - e).abs() < 1e-5, "{acceleration}: {v} at {i}, expected {e}");
            }
            dwt.inverse_1d(&mut signal).unwrap();
            for (i, &o) in x.iter().enumerate() {
                let v = signal.get(i);
                assert!((v - o).abs() < 1e-5, "{acceleration}: restored {v} at {i}, expected {o}");
            }
        }
    }

    #[test]
    fn test_rows_then_cols_match_one_level() {
        let mut rng = StdRng::seed_from_u64(23);
        let (w, h) = (19, 14);
        let original: Vec<i32> = (0..w * h).map(|_| rng.gen_range(-255..256)).collect();
        let dwt = LiftingDwt::<i32>::new(WaveletFamily::Cdf53, LiftConfig::new()).unwrap();
        let d = Decomposition::new(Extent::new(w, h)).with_levels(Levels::Count(1));

        let mut separate = original.clone();
        let mut image = StridedImage::packed(&mut separate, w, h).unwrap();
        dwt.forward_rows(&mut image, &d).unwrap();
        dwt.forward_cols(&mut image, &d).unwrap();

        let mut joint = original.clone();
        let mut joint_image = StridedImage::packed(&mut joint, w, h).unwrap();
        dwt.forward_2d(&mut joint_image, &d).unwrap();
        assert_eq!(image.to_vec(), joint_image.to_vec());

        dwt.inverse_cols(&mut image, &d).unwrap();
        dwt.inverse_rows(&mut image, &d).unwrap();
        assert_eq!(image.to_vec(), original);
    }
}
