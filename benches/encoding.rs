use bacnet_pdu::tag;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn encode_benchmark(c: &mut Criterion) {
    c.bench_function("encode_real", |b| {
        b.iter(|| black_box(tag::encode_real(23.5).unwrap()))
    });
    c.bench_function("encode_object_identifier", |b| {
        b.iter(|| black_box(tag::encode_object_identifier(None, 8, 321).unwrap()))
    });
}

fn decode_benchmark(c: &mut Criterion) {
    let tag = tag::encode_real(23.5).unwrap();
    c.bench_function("decode_real", |b| {
        b.iter(|| black_box(tag::decode_real(&tag).unwrap()))
    });

    let whois = bacnet_pdu::new_whois().unwrap();
    c.bench_function("parse_whois", |b| {
        b.iter(|| black_box(bacnet_pdu::parse(&whois).unwrap()))
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
