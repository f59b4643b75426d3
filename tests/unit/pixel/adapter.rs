use super::*;

fn u8_array(shape: Vec<usize>, data: Vec<u8>) -> SampleArray {
    SampleArray::new(shape, Samples::U8(data))
}

#[test]
fn single_channel_is_replicated_with_opaque_alpha() {
    let buf = canonicalize(u8_array(vec![1, 2], vec![10, 200])).unwrap();
    assert_eq!((buf.width(), buf.height()), (2, 1));
    assert_eq!(buf.as_bytes(), &[10, 10, 10, 255, 200, 200, 200, 255]);
}

#[test]
fn three_channels_gain_opaque_alpha() {
    let buf = canonicalize(u8_array(vec![1, 1, 3], vec![1, 2, 3])).unwrap();
    assert_eq!(buf.as_bytes(), &[1, 2, 3, 255]);
}

#[test]
fn four_channels_pass_through() {
    let buf = canonicalize(u8_array(vec![1, 1, 4], vec![1, 2, 3, 4])).unwrap();
    assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
}

#[test]
fn float_samples_are_clamped_and_rounded() {
    let arr = SampleArray::new(
        vec![1, 1, 4],
        Samples::F32(vec![0.5, -1.0, 2.0, f32::NAN]),
    );
    let buf = canonicalize(arr).unwrap();
    assert_eq!(buf.as_bytes(), &[128, 0, 255, 0]);
}

#[test]
fn u16_samples_are_scaled() {
    let arr = SampleArray::new(vec![1, 1, 3], Samples::U16(vec![0, 65535, 257 * 64]));
    let buf = canonicalize(arr).unwrap();
    assert_eq!(buf.as_bytes(), &[0, 255, 64, 255]);
}

#[test]
fn channels_first_layout_is_inferred_and_deplanarized() {
    // (C=3, H=1, W=2): planes R=[1,2], G=[3,4], B=[5,6]
    let buf = canonicalize(u8_array(vec![3, 1, 2], vec![1, 2, 3, 4, 5, 6])).unwrap();
    assert_eq!((buf.width(), buf.height()), (2, 1));
    assert_eq!(buf.as_bytes(), &[1, 3, 5, 255, 2, 4, 6, 255]);
}

#[test]
fn explicit_layout_hint_overrides_inference() {
    // (4, 1, 3) is ambiguous: channels-last wins without a hint.
    let data: Vec<u8> = (0..12).collect();
    let last = canonicalize(u8_array(vec![4, 1, 3], data.clone())).unwrap();
    assert_eq!((last.width(), last.height()), (1, 4));

    let first = canonicalize(
        u8_array(vec![4, 1, 3], data).with_layout(ChannelLayout::First),
    )
    .unwrap();
    assert_eq!((first.width(), first.height()), (3, 1));
    assert_eq!(first.pixel(0, 0), Some([0, 3, 6, 9]));
}

#[test]
fn batch_keeps_first_element_only() {
    let mut data = vec![7u8; 4];
    data.extend_from_slice(&[99u8; 4]);
    let buf = canonicalize(u8_array(vec![2, 1, 1, 4], data)).unwrap();
    assert_eq!(buf.as_bytes(), &[7, 7, 7, 7]);
}

#[test]
fn unsupported_shapes_are_rejected() {
    let cases = [
        u8_array(vec![4], vec![0; 4]),
        u8_array(vec![1, 1, 1, 1, 4], vec![0; 4]),
        u8_array(vec![5, 1, 2], vec![0; 10]),
        u8_array(vec![2, 2, 5], vec![0; 20]),
        u8_array(vec![0, 2, 4], vec![]),
        u8_array(vec![0, 1, 1, 4], vec![]),
        u8_array(vec![2, 2, 4], vec![0; 15]),
    ];
    for arr in cases {
        let shape = arr.shape.clone();
        let err = canonicalize(arr).unwrap_err();
        assert!(
            matches!(err, LayerstackError::UnsupportedImageShape(_)),
            "shape {shape:?} gave {err}"
        );
    }
}

#[test]
fn canonicalize_is_idempotent() {
    let arr = SampleArray::new(vec![2, 2, 3], Samples::F32(vec![0.25; 12]));
    let once = canonicalize(arr).unwrap();
    let twice = canonicalize(once.clone()).unwrap();
    assert_eq!(once, twice);

    // Raw bytes of a canonical buffer re-enter unchanged as well.
    let raw = u8_array(
        vec![once.height() as usize, once.width() as usize, 4],
        once.as_bytes().to_vec(),
    );
    assert_eq!(canonicalize(raw).unwrap(), once);
}

#[test]
fn dynamic_images_follow_channel_rules() {
    let luma = image::GrayImage::from_raw(1, 1, vec![42]).unwrap();
    let buf = canonicalize(image::DynamicImage::ImageLuma8(luma)).unwrap();
    assert_eq!(buf.as_bytes(), &[42, 42, 42, 255]);

    let rgb = image::RgbImage::from_raw(1, 1, vec![1, 2, 3]).unwrap();
    let buf = canonicalize(image::DynamicImage::ImageRgb8(rgb)).unwrap();
    assert_eq!(buf.as_bytes(), &[1, 2, 3, 255]);

    let rgba16 = image::ImageBuffer::<image::Rgba<u16>, _>::from_raw(
        1,
        1,
        vec![65535u16, 0, 257 * 10, 65535],
    )
    .unwrap();
    let buf = canonicalize(image::DynamicImage::ImageRgba16(rgba16)).unwrap();
    assert_eq!(buf.as_bytes(), &[255, 0, 10, 255]);
}

#[test]
fn zero_sized_canonical_buffer_is_rejected() {
    let empty = PixelBuffer::transparent(0, 3).unwrap();
    let err = canonicalize(empty).unwrap_err();
    assert!(matches!(err, LayerstackError::UnsupportedImageShape(_)));
}
