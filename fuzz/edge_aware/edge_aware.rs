#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use liftlet::{Decomposition, EawWeights, Extent, LiftConfig, Liftlet, StridedImage};

#[derive(Arbitrary, Debug)]
struct Data {
    width: u8,
    height: u8,
    exponent: u8,
    samples: Vec<u8>,
}

fuzz_target!(|data: Data| {
    if data.width == 0 || data.height == 0 {
        return;
    }
    let (w, h) = (data.width as usize, data.height as usize);
    let mut buffer: Vec<f64> = (0..w * h)
        .map(|i| data.samples.get(i).copied().unwrap_or(0) as f64 / 255.)
        .collect();
    let original = buffer.clone();
    let exponent = (data.exponent % 9) as f64 / 4.;
    let dwt = Liftlet::make_eaw_f64(exponent, LiftConfig::new()).unwrap();
    let d = Decomposition::new(Extent::new(w, h));
    let mut weights = EawWeights::new();
    let mut image = StridedImage::packed(&mut buffer, w, h).unwrap();
    dwt.forward_2d(&mut image, &d, &mut weights).unwrap();
    dwt.inverse_2d(&mut image, &d, &weights).unwrap();
    for (i, (a, b)) in image.to_vec().iter().zip(original.iter()).enumerate() {
        assert!((a - b).abs() < 1e-6, "Restored {a} at {i}, expected {b}");
    }
});
