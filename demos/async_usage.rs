//! Async usage examples

use dialpool::{Pool, PoolConfiguration, Resource};
use std::io;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug)]
struct Session;

impl Resource for Session {
    type Error = io::Error;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    println!("=== dialpool - Async Examples ===\n");

    // Example 1: Async get
    async_get().await;

    // Example 2: Async with timeout
    async_with_timeout().await;

    // Example 3: Concurrent access
    concurrent_access().await;
}

async fn async_get() {
    println!("1. Async Get:");
    let pool = Pool::new(|| Ok(Session));

    let session = pool.get_async().await.unwrap();
    println!("   Got session asynchronously");
    pool.put(session);

    println!("   Idle after put: {}\n", pool.num_idle_conns());
}

async fn async_with_timeout() {
    println!("2. Async with Timeout:");

    let config = PoolConfiguration::new()
        .with_max_open(1)
        .with_wait_timeout(Duration::from_millis(100));
    let pool = Pool::with_configuration(|| Ok(Session), config);

    // Hold the only session
    let _held = pool.checkout().unwrap();

    match pool.get_async().await {
        Ok(_) => println!("   Got session"),
        Err(err) => println!("   {err}"),
    }

    println!();
}

async fn concurrent_access() {
    println!("3. Concurrent Access:");

    let config = PoolConfiguration::new().with_max_idle(2).with_max_open(3);
    let pool = Pool::with_configuration(|| Ok(Session), config);

    let mut tasks = Vec::new();
    for task_id in 0..10 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move {
            let session = pool.get_async().await.unwrap();
            sleep(Duration::from_millis(10)).await;
            pool.put(session);
            task_id
        }));
    }

    for task in tasks {
        if let Ok(task_id) = task.await {
            println!("   Task {task_id} done");
        }
    }

    println!(
        "   Open: {}, Idle: {}",
        pool.num_open_conns(),
        pool.num_idle_conns()
    );
}
