mod common;

use std::error::Error;

use approx::assert_abs_diff_eq;
use chromia_colorize::StageError;
use chromia_dnn::DnnError;
use chromia_image::{ops::cast_and_scale, Image, ImageSize};
use chromia_imgproc::color::lab_from_rgb;

use common::{gray, gray_ramp, session, ConstantChroma};

#[test]
fn solid_gray_gets_constant_chroma() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(10.0, -10.0), tmp_dir.path())?;

    let image = gray([2, 2].into(), 128)?;
    let colorized = session.colorize_frame(&image)?;

    assert_eq!(colorized.size(), image.size());
    for pixel in colorized.as_slice().chunks_exact(3) {
        // LAB (53.585, 10, -10)
        assert_eq!(pixel, &[138, 123, 145]);
    }
    Ok(())
}

#[test]
fn network_receives_mean_centered_luminance() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(0.0, 0.0), tmp_dir.path())?;

    session.colorize_frame(&gray([5, 3].into(), 128)?)?;

    let model = session.into_inner();
    assert_eq!(model.inputs.len(), 1);
    assert_eq!(model.inputs[0].shape, [1, 1, 8, 8]);
    for v in model.inputs[0].as_slice() {
        assert_abs_diff_eq!(*v, 53.585 - 50.0, epsilon = 1e-2);
    }
    Ok(())
}

#[test]
fn output_keeps_the_input_shape() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(20.0, 5.0), tmp_dir.path())?;

    for size in [[1, 1], [3, 7], [31, 2], [64, 48]] {
        let size = ImageSize::from(size);
        let colorized = session.colorize_frame(&gray(size, 90)?)?;
        assert_eq!(colorized.size(), size);
    }
    Ok(())
}

#[test]
fn colorization_is_deterministic() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(-15.0, 30.0), tmp_dir.path())?;

    let image = gray_ramp([37, 11].into())?;
    let first = session.colorize_frame(&image)?;
    let second = session.colorize_frame(&image)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn luminance_comes_from_the_full_resolution_frame() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(0.0, 0.0), tmp_dir.path())?;

    // a 64 pixel ramp squeezed through an 8x8 network would lose most levels
    let image = gray_ramp([64, 4].into())?;
    let colorized = session.colorize_frame(&image)?;

    let l_of = |img: &Image<u8, 3>| -> Result<Image<f32, 1>, Box<dyn Error>> {
        let mut rgb = Image::<f32, 3>::from_size_val(img.size(), 0.0)?;
        cast_and_scale(img, &mut rgb, 1.0 / 255.0)?;
        let mut lab = Image::<f32, 3>::from_size_val(img.size(), 0.0)?;
        lab_from_rgb(&rgb, &mut lab)?;
        Ok(lab.channel(0)?)
    };

    let l_in = l_of(&image)?;
    let l_out = l_of(&colorized)?;
    for (a, b) in l_in.as_slice().iter().zip(l_out.as_slice()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 0.5);
    }
    Ok(())
}

#[test]
fn inference_failures_are_reported() -> Result<(), Box<dyn Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let mut session = session(ConstantChroma::new(0.0, 0.0).failing_at(0), tmp_dir.path())?;

    let result = session.colorize_frame(&gray([4, 4].into(), 10)?);
    assert!(matches!(
        result,
        Err(StageError::Inference(DnnError::Inference(_)))
    ));
    Ok(())
}
