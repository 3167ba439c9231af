use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use seal_exchange::prelude::*;
use std::hint::black_box;

const KIBIBYTE: usize = 1024;
const PAYLOAD_SIZE: usize = 64 * KIBIBYTE;

const ALGORITHMS: [(&str, u32); 3] = [
    ("AES/CBC/PKCS5Padding", 128),
    ("AES/CBC/PKCS5Padding", 256),
    ("AES/GCM/NoPadding", 256),
];

/// Builds a service holding one sender and one receiver key pair.
fn setup() -> (SecurityService, Vec<u8>) {
    let repository = MemoryRepository::new();
    for alias in ["sender", "receiver"] {
        let key = PrivateKey::generate_rsa(2048).unwrap();
        let cert = StaticCertificate::new(key.public_key(), SignatureAlgorithm::Sha256WithRsa);
        repository.insert_key_pair(alias, key, cert);
    }
    let service = SecurityServiceFactory::new().new_service();
    service
        .register_repository(&repository.into_source("bench"))
        .unwrap();

    let payload = (0..PAYLOAD_SIZE).map(|i| (i % 251) as u8).collect();
    (service, payload)
}

fn benchmark_encrypt_and_sign(c: &mut Criterion) {
    let (service, payload) = setup();
    let sender = Alias::new("sender");
    let receiver = Alias::new("receiver");

    let mut group = c.benchmark_group("Encrypt and Sign");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(PAYLOAD_SIZE as u64));

    for (transform, bits) in ALGORITHMS {
        service.set_algorithm(AlgorithmDescriptor::new(transform, bits));
        group.bench_function(format!("{transform}/{bits}"), |b| {
            b.iter(|| {
                service
                    .encrypt_and_sign(black_box(&payload), &sender, &receiver)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn benchmark_verify(c: &mut Criterion) {
    let (service, payload) = setup();
    let sender = Alias::new("sender");
    let receiver = Alias::new("receiver");

    let mut group = c.benchmark_group("Verify");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(PAYLOAD_SIZE as u64));

    for (transform, bits) in ALGORITHMS {
        service.set_algorithm(AlgorithmDescriptor::new(transform, bits));
        let sealed = service
            .encrypt_and_sign(&payload, &sender, &receiver)
            .unwrap()
            .get_bytes()
            .into_owned();
        group.bench_function(format!("{transform}/{bits}"), |b| {
            b.iter(|| service.verify(black_box(&sealed), &receiver, &sender).unwrap());
        });
    }
    group.finish();
}

fn benchmark_wire_format(c: &mut Criterion) {
    let (service, payload) = setup();
    service.set_algorithm(AlgorithmDescriptor::new("AES/GCM/NoPadding", 256));
    let sealed = service
        .encrypt_and_sign(&payload, &Alias::new("sender"), &Alias::new("receiver"))
        .unwrap()
        .get_bytes()
        .into_owned();

    let mut group = c.benchmark_group("Wire Format");
    group.throughput(Throughput::Bytes(sealed.len() as u64));
    group.bench_function("split", |b| {
        b.iter(|| FramedOutput::split(black_box(&sealed)).unwrap());
    });
    let framed = FramedOutput::split(&sealed).unwrap();
    group.bench_function("format", |b| b.iter(|| black_box(&framed).format()));
    group.finish();
}

criterion_group!(
    benches,
    benchmark_encrypt_and_sign,
    benchmark_verify,
    benchmark_wire_format
);
criterion_main!(benches);
