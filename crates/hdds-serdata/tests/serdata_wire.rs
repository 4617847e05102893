// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Serialized datum behaviour seen from the wire: fragment reassembly, byte
// order normalization, key hashes and buffer pooling.

#![allow(clippy::float_cmp)]

mod common;

use common::{pool, Note, Reading};
use hdds_serdata::core::ser::{CdrHeader, CDR_BE, HEADER_SIZE};
use hdds_serdata::{
    CdrType, Fragment, SampleKind, SerType, Serdata, SerdataConfig, SerdataPool, KEYHASH_SIZE,
};
use md5::{Digest, Md5};
use std::sync::Arc;

fn md5(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(data));
    out
}

/// Big-endian wire image of a `Reading`.
fn reading_be(sensor: u32, seq: u32, value: f64) -> Vec<u8> {
    let mut image = CdrHeader::new(CDR_BE).to_bytes().to_vec();
    image.extend_from_slice(&sensor.to_be_bytes());
    image.extend_from_slice(&seq.to_be_bytes());
    image.extend_from_slice(&value.to_be_bytes());
    image
}

/// Split `image` into overlapping fragments at random cut points.
fn fragment<'a>(image: &'a [u8], rng: &mut fastrand::Rng) -> Vec<Fragment<'a>> {
    let mut fragments = vec![Fragment::new(0, &image[..HEADER_SIZE.max(rng.usize(HEADER_SIZE..=image.len()))])];
    let mut covered = fragments[0].bytes.len();
    while covered < image.len() {
        let start = covered.saturating_sub(rng.usize(0..=3));
        let end = rng.usize(covered + 1..=image.len());
        fragments.push(Fragment::new(start, &image[start..end]));
        covered = end;
    }
    fragments
}

#[test]
fn test_fragmented_round_trip() {
    let ty = CdrType::<Note>::new(pool());
    let erased: Arc<dyn SerType> = ty.clone();
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let notes = [
        Note::new("a", "", 0),
        Note::new("valve-12", "closing slowly", 3),
        Note::new("line", &"x".repeat(300), u16::MAX),
    ];
    for note in &notes {
        let datum = Serdata::from_sample(&ty, SampleKind::Data, note).expect("datum");
        let image = datum.wire_image().expect("image").into_owned();
        assert_eq!(image.len() % 4, 0);
        for _ in 0..8 {
            let frags = fragment(&image, &mut rng);
            let rebuilt = Serdata::from_ser(&erased, SampleKind::Data, &frags, image.len()).expect("rebuild");
            assert_eq!(rebuilt.to_sample::<Note>().expect("decode"), *note);
            assert!(rebuilt.eq_key(&datum));
            assert_eq!(rebuilt.hash(), datum.hash());
        }
    }
}

#[test]
fn test_fragment_chain_must_be_contiguous() {
    let ty: Arc<dyn SerType> = CdrType::<Reading>::new(pool());
    let image = reading_be(1, 2, 3.0);
    let size = image.len();

    let gap = [Fragment::new(0, &image[..8]), Fragment::new(10, &image[10..])];
    assert!(Serdata::from_ser(&ty, SampleKind::Data, &gap, size).is_err());

    let short = [Fragment::new(0, &image[..12])];
    assert!(Serdata::from_ser(&ty, SampleKind::Data, &short, size).is_err());

    let past_end = [Fragment::new(0, &image[..])];
    assert!(Serdata::from_ser(&ty, SampleKind::Data, &past_end, size - 4).is_err());

    let headless = [Fragment::new(0, &image[..2]), Fragment::new(2, &image[2..])];
    assert!(Serdata::from_ser(&ty, SampleKind::Data, &headless, size).is_err());
}

#[test]
fn test_foreign_byte_order_is_normalized() {
    let ty: Arc<dyn SerType> = CdrType::<Reading>::new(pool());
    let image = reading_be(0x0102_0304, 9, -7.5);
    let datum = Serdata::from_ser_iov(&ty, SampleKind::Data, &[&image[..6], &image[6..]], image.len())
        .expect("datum");
    assert_eq!(
        datum.to_sample::<Reading>().expect("decode"),
        Reading::new(0x0102_0304, 9, -7.5)
    );

    let native = datum.wire_image().expect("image").into_owned();
    let header = CdrHeader::from_bytes([native[0], native[1], native[2], native[3]]);
    assert_eq!(header.identifier, hdds_serdata::core::ser::ByteOrder::native().identifier());

    // normalizing a native image is the identity
    let again = Serdata::from_ser_iov(&ty, SampleKind::Data, &[&native], native.len()).expect("again");
    assert_eq!(again.wire_image().expect("image").as_ref(), native.as_slice());
    assert!(again.eq_key(&datum));
}

#[test]
fn test_padding_larger_than_content_rejected() {
    let ty: Arc<dyn SerType> = CdrType::<Reading>::new(pool());
    let mut header = CdrHeader::new(CDR_BE);
    header.set_padding(3);
    let image = header.to_bytes();
    assert!(Serdata::from_ser_iov(&ty, SampleKind::Data, &[&image], image.len()).is_err());
}

#[test]
fn test_option_bit_0_does_not_shorten_payload() {
    let ty = CdrType::<Reading>::new(pool());
    let erased: Arc<dyn SerType> = ty.clone();
    let sample = Reading::new(11, 4, 2.5);
    let mut image = Serdata::from_sample(&ty, SampleKind::Data, &sample)
        .expect("datum")
        .wire_image()
        .expect("image")
        .into_owned();
    image[3] = 0x01;
    let datum = Serdata::from_ser_iov(&erased, SampleKind::Data, &[&image], image.len()).expect("decode");
    assert_eq!(datum.to_sample::<Reading>().expect("sample"), sample);
}

#[test]
fn test_truncated_sample_rejected() {
    let ty: Arc<dyn SerType> = CdrType::<Reading>::new(pool());
    let image = reading_be(1, 2, 3.0);
    let cut = &image[..image.len() - 8];
    assert!(Serdata::from_ser_iov(&ty, SampleKind::Data, &[cut], cut.len()).is_err());
}

#[test]
fn test_keyhash_of_variable_key_is_md5_of_key_encoding() {
    let ty = CdrType::<Note>::new(pool());
    let a = Serdata::from_sample(&ty, SampleKind::Data, &Note::new("pump-3", "ok", 1)).expect("a");
    let b = Serdata::from_sample(&ty, SampleKind::Data, &Note::new("pump-3", "alarm", 9)).expect("b");
    let key = Serdata::from_sample(&ty, SampleKind::Key, &Note::new("pump-3", "", 0)).expect("key");

    // big-endian CDR string: length including the terminator, bytes, NUL
    let mut encoded = 7u32.to_be_bytes().to_vec();
    encoded.extend_from_slice(b"pump-3\0");
    let expected = md5(&encoded);

    assert_eq!(a.get_keyhash(false), expected);
    assert_eq!(a.get_keyhash(true), expected);
    assert_eq!(b.get_keyhash(false), expected);
    assert_eq!(key.get_keyhash(false), expected);
    assert_eq!(a.hash(), b.hash());
    assert!(a.eq_key(&b));
    assert!(a.eq_key(&key));
}

#[test]
fn test_keyhash_of_fixed_key_is_literal() {
    let ty = CdrType::<Reading>::new(pool());
    let d = Serdata::from_sample(&ty, SampleKind::Data, &Reading::new(0x0a0b_0c0d, 1, 0.0)).expect("datum");
    let mut literal = [0u8; KEYHASH_SIZE];
    literal[..4].copy_from_slice(&[0x0a, 0x0b, 0x0c, 0x0d]);
    assert_eq!(d.get_keyhash(false), literal);
    assert_eq!(d.get_keyhash(true), md5(&literal));

    let erased: Arc<dyn SerType> = ty.clone();
    let key = Serdata::from_keyhash(&erased, &literal).expect("key datum");
    assert_eq!(key.kind(), SampleKind::Key);
    assert!(key.eq_key(&d));
    assert_eq!(key.to_sample::<Reading>().expect("key").sensor, 0x0a0b_0c0d);
}

#[test]
fn test_from_keyhash_refuses_digested_keys() {
    let ty: Arc<dyn SerType> = CdrType::<Note>::new(pool());
    assert!(Serdata::from_keyhash(&ty, &[0u8; KEYHASH_SIZE]).is_err());
}

#[test]
fn test_untyped_projection_identifies_instance() {
    let ty = CdrType::<Note>::new(pool());
    let d = Serdata::from_sample(&ty, SampleKind::Data, &Note::new("k", "body", 1)).expect("datum");
    let untyped = d.to_untyped().expect("untyped");
    assert!(untyped.is_untyped());
    assert_eq!(untyped.kind(), SampleKind::Key);
    assert_eq!(untyped.hash(), d.hash());
    assert!(!untyped.timestamp().is_valid());

    let mut restored = Note::new("", "kept", 4);
    untyped.untyped_to_sample(&mut restored).expect("restore");
    assert_eq!(restored.topic, "k");
}

#[test]
fn test_to_ser_window_reads_padding_as_zero() {
    let ty = CdrType::<Note>::new(pool());
    let d = Serdata::from_sample(&ty, SampleKind::Data, &Note::new("ab", "c", 1)).expect("datum");
    let size = d.size().expect("size");
    let mut tail = [0xffu8; 4];
    d.to_ser(size - 4, &mut tail).expect("last word");
    let image = d.wire_image().expect("image");
    assert_eq!(&tail[..], &image[size - 4..]);

    let slice = d.to_ser_ref(HEADER_SIZE, size - HEADER_SIZE).expect("slice");
    assert_eq!(&slice[..], &image[HEADER_SIZE..]);
    assert!(d.to_ser(size, &mut [0u8; 8]).is_err());
}

#[test]
fn test_pool_keeps_at_most_capacity_buffers() {
    let cfg = SerdataConfig {
        pool_capacity: 2,
        ..SerdataConfig::default()
    };
    let pool = Arc::new(SerdataPool::new(&cfg));
    let ty = CdrType::<Reading>::new(Arc::clone(&pool));
    let datums: Vec<Serdata> = (0..5)
        .map(|i| Serdata::from_sample(&ty, SampleKind::Data, &Reading::new(i, i, 0.0)).expect("datum"))
        .collect();
    assert!(pool.is_empty());
    drop(datums);
    assert_eq!(pool.len(), 2);

    let allocated = pool.allocated_count();
    let _reuse = Serdata::from_sample(&ty, SampleKind::Data, &Reading::new(9, 9, 9.0)).expect("datum");
    assert_eq!(pool.allocated_count(), allocated);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_large_buffers_are_not_pooled() {
    let pool = Arc::new(SerdataPool::new(&SerdataConfig::default()));
    let ty = CdrType::<Note>::new(Arc::clone(&pool));
    let big = Serdata::from_sample(&ty, SampleKind::Data, &Note::new("k", &"z".repeat(4096), 0)).expect("datum");
    drop(big);
    assert!(pool.is_empty());
}

#[test]
fn test_print_renders_sample() {
    let ty = CdrType::<Reading>::new(pool());
    let d = Serdata::from_sample(&ty, SampleKind::Data, &Reading::new(1, 2, 3.5)).expect("datum");
    let text = d.print().expect("print");
    assert!(!text.is_empty());
    let empty = Serdata::from_ser_iov(
        &(ty as Arc<dyn SerType>),
        SampleKind::Empty,
        &[&CdrHeader::new(CDR_BE).to_bytes()],
        HEADER_SIZE,
    )
    .expect("empty datum");
    assert_eq!(empty.print().expect("print"), "(empty)");
}
