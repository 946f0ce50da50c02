//! E2E Test Suite: text stream pipeline
//!
//! Arduino-Serial-Plotter-style streams through both text APIs:
//! - labeled capture → named sample lists
//! - unlabeled capture → dense matrix with a stable column map
//! - chunking invariance for both APIs
//! - matrix rows feeding the plot ring buffer end to end

use serialui_core::text::{TextOptions, TEXT_SAMPLE_TAG};
use serialui_core::{RingBuffer, TextDecoder, TextMatrixDecoder};

// ─────────────────────────────────────────────────────────────────────────────
// Sample-list API
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn labeled_capture_yields_two_named_samples() {
    let mut dec = TextDecoder::new();
    let out = dec
        .process(b"Voltage: 12, 11.8, 11.6\nCurrent: 1.2, 1.3, 1.4\n")
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].tag, TEXT_SAMPLE_TAG);
    assert_eq!(out[0].name, "Voltage");
    assert_eq!(out[0].payload.as_f64s().unwrap(), vec![12.0, 11.8, 11.6]);
    assert_eq!(out[1].name, "Current");
    assert_eq!(out[1].payload.as_f64s().unwrap(), vec![1.2, 1.3, 1.4]);
}

#[test]
fn mixed_labels_vectors_and_scalars() {
    let mut dec = TextDecoder::new();
    let out = dec
        .process(b"Accel: 0.23 0.01 0.45, T1: 35.5\n7.5, 1 2 3\n")
        .unwrap();
    let names: Vec<&str> = out.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Accel", "T1", "S1", "V1"]);
    assert_eq!(out[0].payload.as_f64s().unwrap(), vec![0.23, 0.01, 0.45]);
    assert_eq!(out[2].payload.as_f64s().unwrap(), vec![7.5]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Matrix API
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unlabeled_matrix_layout_and_padding() {
    let mut dec = TextMatrixDecoder::with_options(TextOptions {
        labels: false,
        ..TextOptions::default()
    });
    let m = dec.process(b"1 2 3, 4 5 6\n10 20, 30 40 50\n").unwrap();

    assert_eq!((m.rows(), m.cols()), (6, 2));
    let expected: [[f64; 2]; 6] = [
        [1.0, 4.0],
        [2.0, 5.0],
        [3.0, 6.0],
        [10.0, 30.0],
        [20.0, 40.0],
        [f64::NAN, 50.0],
    ];
    for (r, want) in expected.iter().enumerate() {
        for (c, w) in want.iter().enumerate() {
            let got = m.get(r, c);
            assert!(
                (w.is_nan() && got.is_nan()) || got == *w,
                "row {r} col {c}: {got} vs {w}"
            );
        }
    }

    let names: Vec<&String> = dec.columns().keys().collect();
    assert_eq!(names, ["V1", "V2"]);
    assert_eq!(dec.columns()["V1"], 0);
    assert_eq!(dec.columns()["V2"], 1);
}

#[test]
fn both_apis_share_tokenization() {
    // same stream through both APIs: channel names must agree
    let stream = b"RPM: 900, Load: 13.5\nRPM: 950, Load: 14.0\n";

    let mut samples = TextDecoder::new();
    let list = samples.process(stream).unwrap();
    let list_names: Vec<&str> = list.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(list_names, vec!["RPM", "Load", "RPM", "Load"]);

    let mut matrix = TextMatrixDecoder::new();
    let m = matrix.process(stream).unwrap();
    let col_names: Vec<&String> = matrix.columns().keys().collect();
    assert_eq!(col_names, ["RPM", "Load"]);
    assert_eq!((m.rows(), m.cols()), (2, 2));
    assert_eq!(m.row(0), &[900.0, 13.5]);
    assert_eq!(m.row(1), &[950.0, 14.0]);
}

#[test]
fn matrix_rows_flow_into_the_ring_buffer() {
    let mut dec = TextMatrixDecoder::new();
    let mut ring = RingBuffer::new(4, 2).unwrap();

    for chunk in [
        &b"A: 1, B: 10\n"[..],
        &b"A: 2, B: 20\nA: 3, B: 30\n"[..],
        &b"A: 4, B: 40\nA: 5, B: 50\nA: 6, B: 60\n"[..],
    ] {
        let m = dec.process(chunk).unwrap();
        ring.push(&m).unwrap();
    }

    // capacity 4: the plot sees the last four rows in order
    let data = ring.data();
    assert_eq!((data.rows(), data.cols()), (4, 2));
    assert_eq!(data.row(0), &[3.0, 30.0]);
    assert_eq!(data.row(3), &[6.0, 60.0]);
    assert_eq!(ring.counter(), (3, 6));
}

// ─────────────────────────────────────────────────────────────────────────────
// Chunking invariance
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn byte_level_chunking_matches_whole_buffer_parse() {
    let stream =
        b"Voltage: 12, 11.8, Current: 0.5\n1 2 3, 44\nTemp: 21.5; Hum: 40\nVoltage: 11.9\n";

    let mut whole = TextDecoder::new();
    let expected: Vec<(String, Vec<f64>)> = whole
        .process(stream)
        .unwrap()
        .into_iter()
        .map(|s| (s.name, s.payload.as_f64s().unwrap()))
        .collect();

    for chunk in [1usize, 2, 3, 7, 11] {
        let mut dec = TextDecoder::new();
        let mut got = Vec::new();
        for piece in stream.chunks(chunk) {
            got.extend(dec.process(piece).unwrap());
        }
        let got: Vec<(String, Vec<f64>)> = got
            .into_iter()
            .map(|s| (s.name, s.payload.as_f64s().unwrap()))
            .collect();
        assert_eq!(got, expected, "chunk size {chunk}");
    }
}

#[test]
fn eol_variants_frame_identically() {
    for eol in [&b"\n"[..], b"\r", b"\r\n", b"\n\r"] {
        let mut stream = Vec::new();
        for line in ["X: 1", "X: 2", "X: 3"] {
            stream.extend_from_slice(line.as_bytes());
            stream.extend_from_slice(eol);
        }
        let mut dec = TextDecoder::with_options(TextOptions {
            eol: eol.to_vec(),
            ..TextOptions::default()
        });
        let out = dec.process(&stream).unwrap();
        assert_eq!(out.len(), 3, "eol {eol:?}");
        let values: Vec<f64> = out
            .iter()
            .map(|s| s.payload.as_f64s().unwrap()[0])
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
