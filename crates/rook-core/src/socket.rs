//! Transport handoff for protocol upgrades.
//!
//! The routing core never performs I/O. When an upgrade request matches, the
//! serving layer wraps its connection (TCP, TLS, an in-memory pipe in tests)
//! into a [`Socket`] and transfers ownership through the router to the
//! matched rule.

use std::fmt;
use std::io::{Read, Write};

/// A bidirectional byte stream the serving layer hands off on upgrade.
pub trait Transport: Read + Write + Send {}

impl<T: Read + Write + Send> Transport for T {}

/// An owned, type-erased connection being handed off.
pub struct Socket {
    inner: Box<dyn Transport>,
}

impl Socket {
    /// Wrap a transport for handoff.
    #[must_use]
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            inner: Box::new(transport),
        }
    }

    /// Borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut dyn Transport {
        &mut *self.inner
    }

    /// Unwrap the underlying transport.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn Transport> {
        self.inner
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket").finish_non_exhaustive()
    }
}

impl Read for Socket {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for Socket {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
