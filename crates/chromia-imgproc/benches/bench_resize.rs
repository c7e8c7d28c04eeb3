use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use chromia_image::{Image, ImageSize};
use chromia_imgproc::{interpolation::InterpolationMode, resize};

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resize");

    for (width, height) in [(640, 480), (1280, 720), (1920, 1080)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let image = Image::<f32, 3>::from_size_val(image_size, 0.5).unwrap();
        let chroma = Image::<f32, 2>::from_size_val([224, 224].into(), 10.0).unwrap();

        // model input resolution
        let down_size = ImageSize {
            width: 224,
            height: 224,
        };
        let down = Image::<f32, 3>::from_size_val(down_size, 0.0).unwrap();
        let up = Image::<f32, 2>::from_size_val(image_size, 0.0).unwrap();

        for mode in [InterpolationMode::Bilinear, InterpolationMode::Nearest] {
            group.bench_with_input(
                BenchmarkId::new(format!("downscale_{mode:?}"), &parameter_string),
                &(&image, &down),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| {
                        resize::resize_native(black_box(src), black_box(&mut dst), black_box(mode))
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("upscale_{mode:?}"), &parameter_string),
                &(&chroma, &up),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| {
                        resize::resize_native(black_box(src), black_box(&mut dst), black_box(mode))
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_resize);
criterion_main!(benches);
