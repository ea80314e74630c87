//! Sharing throughput.
//!
//! The owner re-shares a monitor-signed log with a growing number of
//! receivers; every receiver costs one ECDH agreement and one key wrap on
//! encryption. Decryption is measured for the last receiver in the list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use it_crypto::{AuthenticatedUser, RemoteUser, UserDirectory};
use it_crypto_testkit::fixtures::TestFixture;

const RECEIVER_COUNTS: [usize; 5] = [1, 2, 3, 5, 10];

fn receivers(fixture: &TestFixture, count: usize) -> Vec<AuthenticatedUser> {
    let mut users = vec![fixture.owner.clone()];
    for i in 1..count {
        let id = format!("r{i}");
        users.push(AuthenticatedUser::generate(Some(id.as_str())));
    }
    users
}

fn bench_encrypt(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let signed = fixture.signed_log();

    let mut group = c.benchmark_group("encrypt");
    for count in RECEIVER_COUNTS {
        let remotes: Vec<RemoteUser> = receivers(&fixture, count)
            .iter()
            .map(|u| u.remote())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &remotes, |b, remotes| {
            b.iter(|| black_box(fixture.owner.encrypt_log(&signed, remotes).unwrap()))
        });
    }
    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let signed = fixture.signed_log();

    let mut group = c.benchmark_group("decrypt");
    for count in RECEIVER_COUNTS {
        let users = receivers(&fixture, count);
        let directory: UserDirectory = users
            .iter()
            .chain([&fixture.monitor])
            .map(|u| u.remote())
            .collect();
        let remotes: Vec<RemoteUser> = users.iter().map(|u| u.remote()).collect();
        let jwe = fixture.owner.encrypt_log(&signed, &remotes).unwrap();
        let last = &users[users.len() - 1];

        group.bench_with_input(BenchmarkId::from_parameter(count), &jwe, |b, jwe| {
            b.iter(|| black_box(last.decrypt_log(jwe, &directory).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt, bench_decrypt);
criterion_main!(benches);
