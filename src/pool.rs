//! The pool controller

use crate::config::{PoolConfiguration, non_zero};
use crate::conn::Resource;
use crate::errors::{PoolError, PoolResult};
use crate::idle::{IdleEntry, IdleList};

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type DialFn<R> = dyn Fn() -> Result<R, <R as Resource>::Error> + Send + Sync;
type TestOnBorrowFn<R> =
    dyn Fn(&mut R, Instant) -> Result<(), <R as Resource>::Error> + Send + Sync;

/// Everything guarded by the pool lock
struct PoolState<R: Resource> {
    open_count: usize,
    max_idle: usize,
    max_open: usize,
    idle_timeout: Option<Duration>,
    running: bool,
    idle: IdleList<R>,
    test_on_borrow: Option<Arc<TestOnBorrowFn<R>>>,
}

struct Shared<R: Resource> {
    state: Mutex<PoolState<R>>,
    available: Condvar,
    dial: Box<DialFn<R>>,
    wait_timeout: Option<Duration>,
}

impl<R: Resource> Shared<R> {
    /// Drop one connection from the books and close it with the lock released
    fn destroy(&self, state: &mut MutexGuard<'_, PoolState<R>>, conn: R) {
        state.open_count = state.open_count.saturating_sub(1);
        self.available.notify_one();
        MutexGuard::unlocked(state, || close_quietly(conn));
    }

    /// Evict idle connections from the back until the idle limit holds
    fn trim_idle(&self, mut state: MutexGuard<'_, PoolState<R>>) {
        let max_idle = state.max_idle;
        let evicted = state.idle.trim_to(max_idle);
        if evicted.is_empty() {
            return;
        }

        state.open_count = state.open_count.saturating_sub(evicted.len());
        for _ in &evicted {
            self.available.notify_one();
        }
        drop(state);

        debug!(count = evicted.len(), max_idle, "evicting idle connections");
        for entry in evicted {
            close_quietly(entry.conn);
        }
    }
}

fn close_quietly<R: Resource>(conn: R) {
    if let Err(err) = conn.close() {
        warn!(error = %err, "failed to close pooled connection");
    }
}

/// Blocking connection pool.
///
/// Connections are dialed lazily through the factory given at construction,
/// recycled through an idle list, and capped by an open-connection limit.
/// Callers that hit the limit park until a connection is returned, the limit
/// is raised, or the pool is closed.
///
/// The handle is cheap to clone; all clones drive the same pool.
///
/// # Examples
///
/// ```
/// use dialpool::{Pool, PoolConfiguration, Resource};
///
/// #[derive(Debug)]
/// struct Session;
///
/// impl Resource for Session {
///     type Error = std::io::Error;
///
///     fn close(self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// let pool = Pool::with_configuration(
///     || Ok(Session),
///     PoolConfiguration::new().with_max_idle(1).with_max_open(2),
/// );
///
/// let session = pool.get().unwrap();
/// assert_eq!(pool.num_open_conns(), 1);
///
/// pool.put(session);
/// assert_eq!(pool.num_idle_conns(), 1);
///
/// pool.close().unwrap();
/// assert!(pool.get().unwrap_err().is_closed());
/// ```
pub struct Pool<R: Resource> {
    shared: Arc<Shared<R>>,
}

impl<R: Resource> Clone for Pool<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Resource> Pool<R> {
    /// Create a pool with default limits
    pub fn new<F>(dial: F) -> Self
    where
        F: Fn() -> Result<R, R::Error> + Send + Sync + 'static,
    {
        Self::with_configuration(dial, PoolConfiguration::default())
    }

    /// Create a pool with the given limits
    pub fn with_configuration<F>(dial: F, config: PoolConfiguration) -> Self
    where
        F: Fn() -> Result<R, R::Error> + Send + Sync + 'static,
    {
        let state = PoolState {
            open_count: 0,
            max_idle: config.effective_max_idle(),
            max_open: config.max_open,
            idle_timeout: config.idle_timeout,
            running: true,
            idle: IdleList::new(),
            test_on_borrow: None,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                available: Condvar::new(),
                dial: Box::new(dial),
                wait_timeout: config.wait_timeout,
            }),
        }
    }

    /// Get a connection, blocking while the pool is at capacity.
    ///
    /// Idle connections are preferred, most recently returned first. Ones
    /// that outlived the idle timeout or fail the borrow test are closed and
    /// skipped. Otherwise a new connection is dialed if the open limit
    /// allows it.
    pub fn get(&self) -> PoolResult<R, R::Error> {
        self.acquire(None)
    }

    /// Like [`get`](Self::get) but gives up with [`PoolError::Timeout`]
    /// once `timeout` has passed without capacity becoming available
    pub fn get_timeout(&self, timeout: Duration) -> PoolResult<R, R::Error> {
        self.acquire(Some(timeout))
    }

    /// Get a connection on tokio's blocking pool.
    ///
    /// Waits at most [`PoolConfiguration::wait_timeout`] when it is set. If
    /// the returned future is dropped before the connection arrives, the
    /// connection goes back to the pool.
    pub async fn get_async(&self) -> PoolResult<R, R::Error> {
        let pool = self.clone();
        let timeout = self.shared.wait_timeout;

        // The guard puts the connection back if nobody is left to receive it.
        let guard = tokio::task::spawn_blocking(move || {
            let acquired = pool.acquire(timeout);
            acquired.map(|conn| PooledConnection::new(conn, pool))
        })
        .await
        .map_err(|_| PoolError::Cancelled)??;

        Ok(guard.detach())
    }

    /// Get a connection wrapped in a guard that returns it on drop
    pub fn checkout(&self) -> PoolResult<PooledConnection<R>, R::Error> {
        let conn = self.get()?;
        Ok(PooledConnection::new(conn, self.clone()))
    }

    fn acquire(&self, timeout: Option<Duration>) -> PoolResult<R, R::Error> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let shared = &*self.shared;
        let mut state = shared.state.lock();

        loop {
            if let Some(mut entry) = state.idle.pop_front() {
                if entry.is_expired(state.idle_timeout, Instant::now()) {
                    debug!("discarding connection past its idle timeout");
                    shared.destroy(&mut state, entry.conn);
                    continue;
                }

                if let Some(test) = state.test_on_borrow.clone()
                    && let Err(err) = test(&mut entry.conn, entry.idle_since)
                {
                    debug!(error = %err, "discarding connection that failed test on borrow");
                    shared.destroy(&mut state, entry.conn);
                    continue;
                }

                return Ok(entry.conn);
            }

            if !state.running {
                return Err(PoolError::Closed);
            }

            if state.max_open == 0 || state.open_count < state.max_open {
                let conn = (shared.dial)().map_err(PoolError::Dial)?;
                state.open_count += 1;
                debug!(open = state.open_count, "dialed new connection");
                return Ok(conn);
            }

            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    if shared.available.wait_until(&mut state, deadline).timed_out() {
                        return Err(PoolError::Timeout(timeout));
                    }
                }
                _ => shared.available.wait(&mut state),
            }
        }
    }

    /// Return a connection for reuse.
    ///
    /// If the idle list grows past its limit the oldest idle connection is
    /// closed instead, so at most one connection is closed per call. On a
    /// closed pool the connection is closed right away.
    pub fn put(&self, conn: R) {
        self.release_with(conn, false);
    }

    /// Close a connection instead of returning it, e.g. after a fault
    pub fn release(&self, conn: R) {
        self.release_with(conn, true);
    }

    /// Hand a connection back, closing it when `force_close` is set
    pub fn release_with(&self, conn: R, force_close: bool) {
        let shared = &*self.shared;
        let mut state = shared.state.lock();

        let doomed = if force_close || !state.running {
            Some(conn)
        } else {
            state.idle.push_front(IdleEntry::new(conn));
            if state.idle.len() > state.max_idle {
                state.idle.pop_back().map(|entry| entry.conn)
            } else {
                None
            }
        };

        match doomed {
            Some(conn) => shared.destroy(&mut state, conn),
            None => {
                shared.available.notify_one();
            }
        }
    }

    /// Close the pool and every idle connection.
    ///
    /// Parked callers wake up with [`PoolError::Closed`]. Connections that
    /// are checked out stay the caller's; returning them afterwards closes
    /// them. Calling this again is a no-op.
    pub fn close(&self) -> PoolResult<(), R::Error> {
        let idle = {
            let mut state = self.shared.state.lock();
            if !state.running {
                return Ok(());
            }
            state.running = false;
            state.open_count = 0;
            self.shared.available.notify_all();
            state.idle.clear()
        };

        debug!(idle = idle.len(), "closing pool");
        for entry in idle {
            close_quietly(entry.conn);
        }
        Ok(())
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        !self.shared.state.lock().running
    }

    /// Number of open connections, idle and in use
    pub fn num_open_conns(&self) -> usize {
        self.shared.state.lock().open_count
    }

    /// Number of idle connections
    pub fn num_idle_conns(&self) -> usize {
        self.shared.state.lock().idle.len()
    }

    pub fn max_idle_conns(&self) -> usize {
        self.shared.state.lock().max_idle
    }

    pub fn max_open_conns(&self) -> usize {
        self.shared.state.lock().max_open
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.shared.state.lock().idle_timeout
    }

    /// Set the idle limit, closing the oldest idle connections beyond it.
    ///
    /// The limit never exceeds a bounded open limit.
    pub fn set_max_idle_conns(&self, count: usize) {
        let mut state = self.shared.state.lock();
        state.max_idle = if state.max_open > 0 {
            count.min(state.max_open)
        } else {
            count
        };
        self.shared.trim_idle(state);
    }

    /// Set the open limit; 0 means unbounded.
    ///
    /// Lowering it below the idle limit lowers the idle limit too. Raising it
    /// wakes every parked caller.
    pub fn set_max_open_conns(&self, count: usize) {
        let mut state = self.shared.state.lock();
        let grew = state.max_open != 0 && (count == 0 || count > state.max_open);

        state.max_open = count;
        if count > 0 && state.max_idle > count {
            state.max_idle = count;
        }
        if grew {
            self.shared.available.notify_all();
        }
        self.shared.trim_idle(state);
    }

    /// Check idle connections before handing them out.
    ///
    /// The test receives the connection and the moment it went idle. A
    /// failing connection is closed and the pool moves on to the next one.
    /// Freshly dialed connections are never tested.
    pub fn set_test_on_borrow<F>(&self, test: F)
    where
        F: Fn(&mut R, Instant) -> Result<(), R::Error> + Send + Sync + 'static,
    {
        self.shared.state.lock().test_on_borrow = Some(Arc::new(test));
    }

    pub fn clear_test_on_borrow(&self) {
        self.shared.state.lock().test_on_borrow = None;
    }

    /// Set the idle timeout; zero disables it
    pub fn set_idle_timeout(&self, timeout: Duration) {
        self.shared.state.lock().idle_timeout = non_zero(timeout);
    }
}

/// A checked-out connection that goes back to the pool when dropped
pub struct PooledConnection<R: Resource> {
    conn: Option<R>,
    pool: Pool<R>,
}

impl<R: Resource> PooledConnection<R> {
    fn new(conn: R, pool: Pool<R>) -> Self {
        Self {
            conn: Some(conn),
            pool,
        }
    }

    /// Close the connection instead of returning it for reuse
    pub fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }

    /// Take the connection out of the guard; the caller must hand it back
    /// with [`Pool::put`] or [`Pool::release`]
    pub fn detach(mut self) -> R {
        self.conn.take().expect("connection already released")
    }
}

impl<R: Resource> Deref for PooledConnection<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection already released")
    }
}

impl<R: Resource> DerefMut for PooledConnection<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection already released")
    }
}

impl<R: Resource> Drop for PooledConnection<R> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put(conn);
        }
    }
}
