use super::*;

#[test]
fn from_rgba8_rejects_length_mismatch() {
    let err = PixelBuffer::from_rgba8(2, 2, vec![0u8; 15]).unwrap_err();
    assert!(matches!(err, LayerstackError::UnsupportedImageShape(_)));
    PixelBuffer::from_rgba8(2, 2, vec![0u8; 16]).unwrap();
}

#[test]
fn pixel_and_row_accessors_are_row_major() {
    let mut data = vec![0u8; 3 * 2 * 4];
    data[(1 * 3 + 2) * 4..(1 * 3 + 2) * 4 + 4].copy_from_slice(&[9, 8, 7, 6]);
    let buf = PixelBuffer::from_rgba8(3, 2, data).unwrap();

    assert_eq!(buf.pixel(2, 1), Some([9, 8, 7, 6]));
    assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(buf.pixel(3, 0), None);
    assert_eq!(buf.pixel(0, 2), None);
    assert_eq!(buf.row(1).unwrap().len(), 12);
    assert!(buf.row(2).is_none());
}

#[test]
fn transparent_and_filled() {
    let t = PixelBuffer::transparent(4, 3).unwrap();
    assert!(t.as_bytes().iter().all(|&b| b == 0));
    assert_eq!(t.size(), Canvas::new(4, 3));

    let f = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
    assert_eq!(f.as_bytes(), &[1, 2, 3, 4].repeat(4)[..]);
}

#[test]
fn digest_tracks_bytes_and_dimensions() {
    let a = PixelBuffer::filled(2, 1, [10, 20, 30, 40]).unwrap();
    let b = PixelBuffer::filled(2, 1, [10, 20, 30, 40]).unwrap();
    let c = PixelBuffer::filled(2, 1, [10, 20, 30, 41]).unwrap();
    let d = PixelBuffer::filled(1, 2, [10, 20, 30, 40]).unwrap();
    assert_eq!(a.digest(), b.digest());
    assert_ne!(a.digest(), c.digest());
    assert_ne!(a.digest(), d.digest());
}

#[test]
fn rgba_image_conversion_preserves_pixels() {
    let buf = PixelBuffer::filled(3, 2, [200, 100, 50, 25]).unwrap();
    let img = buf.to_rgba_image().unwrap();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [200, 100, 50, 25]);
    assert_eq!(PixelBuffer::from_rgba_image(img), buf);
}

#[test]
fn samples_f32_view_is_channels_last_unit_range() {
    let buf = PixelBuffer::filled(2, 1, [255, 0, 51, 255]).unwrap();
    let arr = buf.to_samples_f32();
    assert_eq!(arr.shape, vec![1, 2, 4]);
    assert_eq!(arr.layout, Some(ChannelLayout::Last));
    match arr.samples {
        Samples::F32(v) => {
            assert_eq!(v.len(), 8);
            assert_eq!(v[0], 1.0);
            assert_eq!(v[1], 0.0);
            assert!((v[2] - 0.2).abs() < 1e-6);
        }
        other => panic!("expected f32 samples, got {other:?}"),
    }
}
