//! Stream decorators that trace raw XMPP traffic.
//!
//! Data passes through untouched. After every successful, non-empty read or
//! write the chunk is logged at the decorator's level, but only if that
//! level is enabled; otherwise the bytes are never decoded.

use std::io::{self, Read, Write};

use tracing::Level;

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

/// Whether an event at `level` would reach the current subscriber.
pub fn level_enabled(level: Level) -> bool {
    match level {
        Level::ERROR => tracing::enabled!(Level::ERROR),
        Level::WARN => tracing::enabled!(Level::WARN),
        Level::INFO => tracing::enabled!(Level::INFO),
        Level::DEBUG => tracing::enabled!(Level::DEBUG),
        _ => tracing::enabled!(Level::TRACE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Inbound,
    Outbound,
}

fn log_traffic(level: Level, direction: Direction, data: &[u8]) {
    if data.is_empty() || !level_enabled(level) {
        return;
    }

    let text = String::from_utf8_lossy(data);
    let text = text.trim_end();
    match direction {
        Direction::Inbound => event_at!(level, bytes = data.len(), "RECV: {text}"),
        Direction::Outbound => event_at!(level, bytes = data.len(), "SENT: {text}"),
    }
}

#[derive(Debug)]
pub struct LoggingReader<R> {
    inner: R,
    level: Level,
}

impl<R> LoggingReader<R> {
    pub fn new(inner: R, level: Level) -> Self {
        Self { inner, level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for LoggingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        log_traffic(self.level, Direction::Inbound, &buf[..read]);
        Ok(read)
    }
}

#[derive(Debug)]
pub struct LoggingWriter<W> {
    inner: W,
    level: Level,
}

impl<W> LoggingWriter<W> {
    pub fn new(inner: W, level: Level) -> Self {
        Self { inner, level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for LoggingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        log_traffic(self.level, Direction::Outbound, &buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(feature = "native")]
mod native {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use super::*;

    impl<R: AsyncRead + Unpin> AsyncRead for LoggingReader<R> {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let before = buf.filled().len();
            let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
            if let Poll::Ready(Ok(())) = poll {
                log_traffic(this.level, Direction::Inbound, &buf.filled()[before..]);
            }
            poll
        }
    }

    impl<W: AsyncWrite + Unpin> AsyncWrite for LoggingWriter<W> {
        fn poll_write(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            match Pin::new(&mut this.inner).poll_write(cx, buf) {
                Poll::Ready(Ok(written)) => {
                    log_traffic(this.level, Direction::Outbound, &buf[..written]);
                    Poll::Ready(Ok(written))
                }
                other => other,
            }
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_flush(cx)
        }

        fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
        }
    }
}
