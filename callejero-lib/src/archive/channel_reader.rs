use crate::Result;
use bytes::Bytes;
use std::io::{BufRead, Error as IoError, Read};
use tokio::sync::mpsc;

/// Exposes chunks received from an async download as a blocking [`Read`].
///
/// Must be used from a blocking thread, since reading waits on the channel.
#[derive(Debug)]
pub struct ChannelReader {
    rx: mpsc::Receiver<Result<Bytes>>,
    current_chunk: Bytes,
    position: usize,
}

impl ChannelReader {
    pub const fn new(rx: mpsc::Receiver<Result<Bytes>>) -> Self {
        Self {
            rx,
            current_chunk: Bytes::new(),
            position: 0,
        }
    }
}

impl BufRead for ChannelReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        while self.position >= self.current_chunk.len() {
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => {
                    self.current_chunk = chunk;
                    self.position = 0;
                }
                Some(Err(e)) => return Err(IoError::other(e.to_string())),
                None => return Ok(&[]),
            }
        }

        Ok(&self.current_chunk[self.position..])
    }

    fn consume(&mut self, amount: usize) {
        self.position += amount;
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let data = self.fill_buf()?;
        let to_copy = data.len().min(buf.len());
        buf[..to_copy].copy_from_slice(&data[..to_copy]);
        self.consume(to_copy);
        Ok(to_copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_all_chunks_in_order() {
        let (tx, rx) = mpsc::channel(4);
        tx.try_send(Ok(Bytes::from_static(b"abc"))).unwrap();
        tx.try_send(Ok(Bytes::new())).unwrap();
        tx.try_send(Ok(Bytes::from_static(b"de"))).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let _ = ChannelReader::new(rx).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcde");
    }

    #[test]
    fn test_error_is_surfaced() {
        let (tx, rx) = mpsc::channel(4);
        tx.try_send(Ok(Bytes::from_static(b"abc"))).unwrap();
        tx.try_send(Err(ohno::app_err!("connection reset"))).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let _ = ChannelReader::new(rx).read_to_end(&mut out).unwrap_err();
    }
}
