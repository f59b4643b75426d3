use super::*;
use crate::codec::boundary::DecodedLayer;
use crate::foundation::error::LayerstackError;
use crate::pixel::adapter::{SampleArray, Samples};
use crate::pixel::buffer::PixelBuffer;

fn solid(w: u32, h: u32) -> PixelBuffer {
    PixelBuffer::filled(w, h, [10, 20, 30, 255]).unwrap()
}

#[test]
fn empty_document_has_zero_canvas() {
    let doc = Document::new();
    assert!(doc.is_empty());
    assert_eq!(doc.canvas_size(), Canvas::new(0, 0));
}

#[test]
fn canvas_is_running_max_and_monotonic() {
    let sizes = [(10, 5), (4, 20), (12, 3), (1, 1), (12, 20)];
    let mut doc = Document::new();
    let mut prev = doc.canvas_size();
    let (mut max_w, mut max_h) = (0, 0);
    for (w, h) in sizes {
        doc.append(solid(w, h), "l", BlendMode::Normal, 1.0).unwrap();
        max_w = max_w.max(w);
        max_h = max_h.max(h);
        let cur = doc.canvas_size();
        assert!(cur.contains(prev));
        assert_eq!(cur, Canvas::new(max_w, max_h));
        prev = cur;
    }
    for layer in doc.layers() {
        assert!(doc.canvas_size().contains(layer.size()));
    }
}

#[test]
fn layers_keep_append_order() {
    let mut doc = Document::new();
    for name in ["bottom", "middle", "top"] {
        doc.append(solid(1, 1), name, BlendMode::Normal, 1.0).unwrap();
    }
    let names: Vec<_> = doc.layers().iter().map(|l| l.name()).collect();
    assert_eq!(names, ["bottom", "middle", "top"]);
    assert_eq!(doc.len(), 3);
}

#[test]
fn append_returns_the_new_layer() {
    let mut doc = Document::new();
    let layer = doc
        .append(solid(2, 3), "fg", BlendMode::Multiply, 0.5)
        .unwrap();
    assert_eq!(layer.name(), "fg");
    assert_eq!(layer.blend_mode(), BlendMode::Multiply);
    assert_eq!(layer.opacity().to_u8(), 128);
    assert_eq!(layer.size(), Canvas::new(2, 3));
}

#[test]
fn adapter_failure_leaves_document_unmodified() {
    let mut doc = Document::new();
    doc.append(solid(4, 4), "ok", BlendMode::Normal, 1.0).unwrap();
    let before = doc.clone();

    let bad = SampleArray::new(vec![2, 2, 2], Samples::U8(vec![0; 8]));
    let err = doc.append(bad, "bad", BlendMode::Normal, 1.0).unwrap_err();
    assert!(matches!(err, LayerstackError::UnsupportedImageShape(_)));
    assert_eq!(doc, before);
}

#[test]
fn blank_names_get_positional_defaults() {
    let mut doc = Document::new();
    doc.append(solid(1, 1), "", BlendMode::Normal, 1.0).unwrap();
    doc.append(solid(1, 1), "   ", BlendMode::Normal, 1.0).unwrap();
    assert_eq!(doc.layers()[0].name(), "Layer 1");
    assert_eq!(doc.layers()[1].name(), "Layer 2");
}

#[test]
fn clone_is_an_independent_snapshot() {
    let mut doc = Document::new();
    doc.append(solid(2, 2), "a", BlendMode::Normal, 1.0).unwrap();
    let snapshot = doc.clone();
    doc.append(solid(5, 5), "b", BlendMode::Normal, 1.0).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.canvas_size(), Canvas::new(2, 2));
    assert_eq!(doc.canvas_size(), Canvas::new(5, 5));
}

#[test]
fn from_decoded_restores_layers_and_canvas() {
    let decoded = DecodedDocument {
        canvas: Canvas::new(8, 2),
        layers: vec![
            DecodedLayer {
                pixels: solid(3, 3),
                name: "a".into(),
                blend_mode: BlendMode::Screen,
                opacity: 128,
            },
            DecodedLayer {
                pixels: solid(1, 1),
                name: "b".into(),
                blend_mode: BlendMode::Normal,
                opacity: 255,
            },
        ],
    };
    let doc = Document::from_decoded(decoded);
    assert_eq!(doc.canvas_size(), Canvas::new(8, 3));
    assert_eq!(doc.layers()[0].opacity().to_u8(), 128);
    assert_eq!(doc.layers()[0].blend_mode(), BlendMode::Screen);
    assert_eq!(doc.layers()[1].name(), "b");
}
