#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use liftlet::{
    Acceleration, Decomposition, Extent, LiftConfig, Lifting2dExecutor, Liftlet, StridedImage,
    WaveletFamily,
};

#[derive(Arbitrary, Debug)]
struct Data {
    width: u8,
    height: u8,
    pad_x: u8,
    pad_y: u8,
    mode: u8,
    family: u8,
    threads: u8,
    zero_padding: bool,
}

fuzz_target!(|data: Data| {
    if data.width == 0 || data.height == 0 {
        return;
    }
    let active = Extent::new(data.width as usize, data.height as usize);
    let outer = Extent::new(
        active.width + (data.pad_x % 8) as usize,
        active.height + (data.pad_y % 8) as usize,
    );
    let acceleration = Acceleration::ALL[data.mode as usize % 7];
    let family = WaveletFamily::ALL[data.family as usize % WaveletFamily::ALL.len()];
    let config = LiftConfig::new()
        .with_acceleration(acceleration)
        .with_workers(acceleration.required_workers().unwrap_or(1))
        .unwrap()
        .with_threads(1 + data.threads as usize % 3)
        .unwrap();
    let mut buffer = vec![0f32; outer.width * outer.height];
    for y in 0..active.height {
        for x in 0..active.width {
            buffer[y * outer.width + x] = ((x * 7 + y * 13) % 23) as f32 / 23.;
        }
    }
    let original = buffer.clone();
    let d = Decomposition::new(outer)
        .with_active(active)
        .with_zero_padding(data.zero_padding);
    let executor = Liftlet::make_executor::<f32>(family, config).unwrap();
    let mut image = StridedImage::packed(&mut buffer, outer.width, outer.height).unwrap();
    executor.forward_2d(&mut image, &d).unwrap();
    executor.inverse_2d(&mut image, &d).unwrap();
    for y in 0..active.height {
        for x in 0..active.width {
            let (a, b) = (image.get(y, x), original[y * outer.width + x]);
            assert!((a - b).abs() < 1e-3, "Restored {a} at ({y}, {x}), expected {b}");
        }
    }
});
