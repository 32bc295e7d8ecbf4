#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use liftlet::{Lifting1dExecutor, LiftConfig, Liftlet, StridedSignal, WaveletFamily, split_lengths};

#[derive(Arbitrary, Debug)]
struct Data {
    length: u8,
    stride: i8,
    family: u8,
}

fuzz_target!(|data: Data| {
    if data.length == 0 || data.stride == 0 {
        return;
    }
    let n = data.length as usize;
    let step = data.stride.unsigned_abs() as usize;
    let family = WaveletFamily::ALL[data.family as usize % WaveletFamily::ALL.len()];
    let executor = Liftlet::make_executor::<f64>(family, LiftConfig::new()).unwrap();

    let signal: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let mut buffer = vec![0f64; (n - 1) * step + 1];
    let offset = if data.stride < 0 { (n - 1) * step } else { 0 };
    for (i, &v) in signal.iter().enumerate() {
        let at = if data.stride < 0 { offset - i * step } else { i * step };
        buffer[at] = v;
    }
    let stride = data.stride as isize * size_of::<f64>() as isize;
    let mut view = StridedSignal::new(&mut buffer, offset, stride, n).unwrap();
    executor.forward_1d(&mut view).unwrap();
    executor.inverse_1d(&mut view).unwrap();
    for (i, &v) in signal.iter().enumerate() {
        assert!((view.get(i) - v).abs() < 1e-9);
    }

    let (a, h) = split_lengths(n);
    let mut approx = vec![0f64; a];
    let mut details = vec![0f64; h];
    executor
        .forward_1d_split(&signal, &mut approx, &mut details)
        .unwrap();
    let mut restored = vec![0f64; n];
    executor
        .inverse_1d_split(&approx, &details, &mut restored)
        .unwrap();
    for (r, s) in restored.iter().zip(signal.iter()) {
        assert!((r - s).abs() < 1e-9);
    }
});
