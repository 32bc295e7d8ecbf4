#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use liftlet::{
    Decomposition, Extent, Levels, LiftConfig, Lifting2dExecutor, Liftlet, StridedImage,
    WaveletFamily,
};

#[derive(Arbitrary, Debug)]
struct Data {
    width: u8,
    height: u8,
    levels: u8,
    family: u8,
    decompose_one: bool,
    samples: Vec<i16>,
}

fuzz_target!(|data: Data| {
    if data.width == 0 || data.height == 0 {
        return;
    }
    let (w, h) = (data.width as usize, data.height as usize);
    let mut buffer: Vec<i32> = (0..w * h)
        .map(|i| data.samples.get(i).copied().unwrap_or(i as i16) as i32)
        .collect();
    let original = buffer.clone();
    let family = WaveletFamily::ALL[data.family as usize % WaveletFamily::ALL.len()];
    let executor = Liftlet::make_executor::<i32>(family, LiftConfig::new()).unwrap();
    let levels = if data.levels == 0 {
        Levels::Full
    } else {
        Levels::Count(data.levels as usize % 12)
    };
    let d = Decomposition::new(Extent::new(w, h))
        .with_levels(levels)
        .with_decompose_one(data.decompose_one);
    let mut image = StridedImage::packed(&mut buffer, w, h).unwrap();
    executor.forward_2d(&mut image, &d).unwrap();
    executor.inverse_2d(&mut image, &d).unwrap();
    assert_eq!(image.to_vec(), original);
});
