//! Basic usage examples for Pool

use dialpool::{Pool, PoolConfiguration, Resource};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Session {
    id: usize,
    healthy: bool,
}

impl Resource for Session {
    type Error = io::Error;

    fn close(self) -> Result<(), Self::Error> {
        println!("   closed session {}", self.id);
        Ok(())
    }
}

fn dial() -> Result<Session, io::Error> {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    Ok(Session { id, healthy: true })
}

fn main() {
    println!("=== dialpool - Basic Examples ===\n");

    // Example 1: Get and put
    get_and_put();

    // Example 2: Checkout guard
    checkout_guard();

    // Example 3: Limits and timeouts
    limits_and_timeouts();

    // Example 4: Test on borrow
    test_on_borrow();
}

fn get_and_put() {
    println!("1. Get and Put:");
    let pool = Pool::new(dial);

    let session = pool.get().unwrap();
    println!("   Got session {}", session.id);
    pool.put(session);

    let again = pool.get().unwrap();
    println!("   Reused session {}", again.id);
    pool.release(again);

    println!("   Open after release: {}\n", pool.num_open_conns());
}

fn checkout_guard() {
    println!("2. Checkout Guard:");
    let pool = Pool::new(dial);

    {
        let session = pool.checkout().unwrap();
        println!("   Checked out session {}", session.id);
        // Session goes back to the idle list when dropped
    }

    println!("   Idle after drop: {}\n", pool.num_idle_conns());
}

fn limits_and_timeouts() {
    println!("3. Limits and Timeouts:");

    let config = PoolConfiguration::new()
        .with_max_idle(1)
        .with_max_open(2)
        .with_idle_timeout(Duration::from_secs(60));
    let pool = Pool::with_configuration(dial, config);

    let first = pool.get().unwrap();
    let second = pool.get().unwrap();
    println!("   Open: {}", pool.num_open_conns());

    match pool.get_timeout(Duration::from_millis(50)) {
        Ok(_) => println!("   Unexpectedly got a third session"),
        Err(err) => println!("   Third get: {err}"),
    }

    pool.put(first);
    pool.put(second);
    println!(
        "   After put - Open: {}, Idle: {}",
        pool.num_open_conns(),
        pool.num_idle_conns()
    );

    pool.close().unwrap();
    println!("   After close: {}\n", pool.get().unwrap_err());
}

fn test_on_borrow() {
    println!("4. Test on Borrow:");
    let pool = Pool::new(dial);

    let mut session = pool.get().unwrap();
    session.healthy = false;
    pool.put(session);

    pool.set_test_on_borrow(|session, idle_since| {
        if session.healthy {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "unhealthy after {:?} idle",
                idle_since.elapsed()
            )))
        }
    });

    let fresh = pool.get().unwrap();
    println!("   Got healthy session {}", fresh.id);
}
