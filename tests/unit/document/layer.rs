use super::*;

#[test]
fn opacity_clamps_and_rounds_to_nearest_step() {
    assert_eq!(Opacity::new(0.5).to_u8(), 128);
    assert_eq!(Opacity::new(0.0).to_u8(), 0);
    assert_eq!(Opacity::new(1.0).to_u8(), 255);
    assert_eq!(Opacity::new(-0.2).get(), 0.0);
    assert_eq!(Opacity::new(1.7).get(), 1.0);
    // 0.3 * 255 = 76.5 -> 77, where truncation would give 76.
    assert_eq!(Opacity::new(0.3).to_u8(), 77);
}

#[test]
fn non_finite_opacity_becomes_opaque() {
    assert_eq!(Opacity::new(f32::NAN), Opacity::OPAQUE);
    assert_eq!(Opacity::new(f32::INFINITY), Opacity::OPAQUE);
}

#[test]
fn opacity_u8_roundtrip() {
    for v in [0u8, 1, 77, 128, 254, 255] {
        assert_eq!(Opacity::from_u8(v).to_u8(), v);
    }
}

#[test]
fn layer_accessors_and_equality() {
    let px = PixelBuffer::filled(3, 2, [1, 2, 3, 255]).unwrap();
    let a = Layer::new(px.clone(), "bg".into(), BlendMode::Screen, Opacity::new(0.5));
    let b = Layer::new(px, "bg".into(), BlendMode::Screen, Opacity::new(0.5));
    assert_eq!(a.name(), "bg");
    assert_eq!(a.blend_mode(), BlendMode::Screen);
    assert_eq!(a.size(), Canvas::new(3, 2));
    assert_eq!(a, b);
    assert_eq!(a.clone(), a);

    let c = Layer::new(
        PixelBuffer::filled(3, 2, [1, 2, 3, 255]).unwrap(),
        "bg".into(),
        BlendMode::Normal,
        Opacity::new(0.5),
    );
    assert_ne!(a, c);
}
