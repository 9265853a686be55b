//! The capability every pooled connection must provide

/// A closable resource managed by a [`Pool`](crate::Pool).
///
/// The pool never looks inside a connection. It only hands it out, takes it
/// back, and eventually calls [`close`](Resource::close) exactly once.
///
/// # Examples
///
/// ```
/// use dialpool::Resource;
///
/// struct Session {
///     id: u32,
/// }
///
/// impl Resource for Session {
///     type Error = std::io::Error;
///
///     fn close(self) -> Result<(), Self::Error> {
///         println!("closing session {}", self.id);
///         Ok(())
///     }
/// }
/// ```
pub trait Resource: Send + Sized + 'static {
    /// Error produced when dialing or closing fails
    type Error: std::error::Error + Send + Sync + 'static;

    /// Close the resource, consuming it
    fn close(self) -> Result<(), Self::Error>;
}
