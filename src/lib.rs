//! # dialpool
//!
//! Blocking, thread-safe pool for connections or any other closable
//! resource. The pool dials connections lazily through a caller supplied
//! factory, keeps a bounded list of idle ones for reuse, and parks callers
//! once the open-connection limit is reached.
//!
//! ## Features
//!
//! - Open and idle limits, adjustable at runtime
//! - Most-recently-used reuse, oldest-first eviction
//! - Idle timeout and validation on borrow
//! - Bounded waiting with `get_timeout`, async acquire on tokio
//! - RAII checkout guard that returns the connection on drop
//! - Graceful, idempotent shutdown
//!
//! ## Quick Start
//!
//! ```rust
//! use dialpool::{Pool, Resource};
//!
//! struct Conn;
//!
//! impl Resource for Conn {
//!     type Error = std::io::Error;
//!
//!     fn close(self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let pool = Pool::new(|| Ok(Conn));
//! {
//!     let _conn = pool.checkout().unwrap();
//!     // Connection goes back to the idle list when `_conn` goes out of scope
//! }
//! assert_eq!(pool.num_idle_conns(), 1);
//! ```

mod pool;
mod config;
mod conn;
mod idle;
mod errors;

pub use pool::{Pool, PooledConnection};
pub use config::{PoolConfiguration, DEFAULT_MAX_IDLE, DEFAULT_MAX_OPEN};
pub use conn::Resource;
pub use errors::{PoolError, PoolResult};
