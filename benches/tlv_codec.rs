use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_qris::codec::tlv::{CompositeTags, TlvCodec, parse, serialize};
use rust_qris::{Payload, validate};

const SAMPLE: &str = "00020101021126680016ID.CO.TELKOM.WWW01189360000800000000010215ID10200000000010303UMI51440014ID.CO.QRIS.WWW0215ID10200000000010303UMI5204581253033605802ID5914TOKO MAJU JAYA6007BANDUNG61054011162070703A016304E35E";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("tlv_parse_sample", |b| b.iter(|| parse(black_box(SAMPLE))));
}

fn bench_parse_flat(c: &mut Criterion) {
    // No composites: every field stays a leaf
    let flat = TlvCodec::new(CompositeTags::empty());
    c.bench_function("tlv_parse_sample_flat", |b| {
        b.iter(|| flat.parse(black_box(SAMPLE)))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let fields = parse(SAMPLE).unwrap();
    c.bench_function("tlv_serialize_sample", |b| {
        b.iter(|| serialize(black_box(&fields)))
    });
}

fn bench_payload_info(c: &mut Criterion) {
    let payload = Payload::parse(SAMPLE).unwrap();
    c.bench_function("payload_info", |b| b.iter(|| black_box(&payload).info()));
}

fn bench_validate(c: &mut Criterion) {
    c.bench_function("validate_sample", |b| b.iter(|| validate(black_box(SAMPLE))));
}

criterion_group!(
    benches,
    bench_parse,
    bench_parse_flat,
    bench_serialize,
    bench_payload_info,
    bench_validate
);
criterion_main!(benches);
