// Demo: ten workers sharing a pool bounded to five connections.

use dialpool::{Pool, Resource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

struct Conn {
    id: usize,
}

impl Resource for Conn {
    type Error = std::io::Error;

    fn close(self) -> Result<(), Self::Error> {
        println!("  close {}", self.id);
        Ok(())
    }
}

fn main() {
    println!("=== dialpool demo ===");

    let pool = Pool::new(|| {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        println!("  new {id}");
        Ok(Conn { id })
    });
    pool.set_max_open_conns(5);
    pool.set_max_idle_conns(2);

    let served = Arc::new(AtomicUsize::new(0));
    let workers: Vec<_> = (0..10)
        .map(|_| {
            let pool = pool.clone();
            let served = Arc::clone(&served);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    match pool.get() {
                        Ok(conn) => {
                            served.fetch_add(1, Ordering::Relaxed);
                            pool.put(conn);
                        }
                        Err(err) => {
                            println!("  get failed: {err}");
                            return;
                        }
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        if let Err(err) = worker.join() {
            println!("  worker panicked: {err:?}");
        }
    }

    println!(
        "Served {} requests with {} connections dialed ({} open, {} idle)",
        served.load(Ordering::Relaxed),
        NEXT_ID.load(Ordering::Relaxed),
        pool.num_open_conns(),
        pool.num_idle_conns(),
    );

    if let Err(err) = pool.close() {
        println!("close failed: {err}");
    }
}
