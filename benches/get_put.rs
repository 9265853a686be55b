use criterion::{Criterion, criterion_group, criterion_main};
use dialpool::{Pool, PoolConfiguration, Resource};
use std::hint::black_box;

struct Session;

impl Resource for Session {
    type Error = std::io::Error;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn get_put(c: &mut Criterion) {
    let pool = Pool::with_configuration(|| Ok(Session), PoolConfiguration::default());

    c.bench_function("get_put", |b| {
        b.iter(|| {
            let session = pool.get().unwrap();
            pool.put(black_box(session));
        })
    });

    c.bench_function("checkout_drop", |b| {
        b.iter(|| {
            let session = pool.checkout().unwrap();
            black_box(&*session);
        })
    });
}

criterion_group!(benches, get_put);
criterion_main!(benches);
