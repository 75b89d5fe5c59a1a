//! Memcached-backed store.
//!
//! Speaks the classic text protocol: `get`/`set` by opaque string key,
//! payloads are opaque bytes. One connection per operation; what happens
//! when the server is unreachable is the retry wrapper's call.

use async_trait::async_trait;
use cinder_core::{Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::store::StateStore;

// Key limit imposed by the memcached text protocol.
const MAX_KEY_LEN: usize = 250;

/// Store backed by a remote memcached instance.
pub struct MemcachedStore {
    endpoint: String,
}

impl MemcachedStore {
    /// Create a store pointed at `host:port`. No connection is made until
    /// the first operation.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn connect(&self) -> Result<BufReader<TcpStream>> {
        let stream = TcpStream::connect(&self.endpoint).await.map_err(|e| {
            Error::Connection(format!("Failed to connect to {}: {}", self.endpoint, e))
        })?;
        Ok(BufReader::new(stream))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(Error::InvalidKey(format!(
            "key length {} out of range: {}",
            key.len(),
            key
        )));
    }
    if key.bytes().any(|b| b <= b' ' || b == 0x7f) {
        return Err(Error::InvalidKey(format!(
            "whitespace or control byte in {:?}",
            key
        )));
    }
    Ok(())
}

/// Parses a `VALUE <key> <flags> <bytes>` response line into the payload
/// length.
fn parse_value_header(line: &str) -> Option<usize> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("VALUE") {
        return None;
    }
    let _key = parts.next()?;
    let _flags = parts.next()?;
    parts.next()?.parse().ok()
}

async fn read_line(stream: &mut BufReader<TcpStream>) -> Result<String> {
    let mut line = String::new();
    let read = stream
        .read_line(&mut line)
        .await
        .map_err(|e| Error::Connection(format!("Failed to read response: {}", e)))?;
    if read == 0 {
        return Err(Error::Connection("Connection closed by server".to_string()));
    }
    Ok(line.trim_end().to_string())
}

#[async_trait]
impl StateStore for MemcachedStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let mut stream = self.connect().await?;

        stream
            .write_all(format!("get {}\r\n", key).as_bytes())
            .await
            .map_err(|e| Error::Connection(format!("Failed to send get: {}", e)))?;

        let header = read_line(&mut stream).await?;
        if header == "END" {
            debug!("Cache miss for {}", key);
            return Ok(None);
        }

        let len = parse_value_header(&header)
            .ok_or_else(|| Error::Protocol(format!("Unexpected get response: {:?}", header)))?;

        // Payload block is followed by its own \r\n, then the END line.
        let mut payload = vec![0u8; len + 2];
        stream
            .read_exact(&mut payload)
            .await
            .map_err(|e| Error::Connection(format!("Failed to read payload: {}", e)))?;
        payload.truncate(len);

        let end = read_line(&mut stream).await?;
        if end != "END" {
            return Err(Error::Protocol(format!("Expected END, got {:?}", end)));
        }

        Ok(Some(payload))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        let mut stream = self.connect().await?;

        let mut request = format!("set {} 0 0 {}\r\n", key, value.len()).into_bytes();
        request.extend_from_slice(value);
        request.extend_from_slice(b"\r\n");
        stream
            .write_all(&request)
            .await
            .map_err(|e| Error::Connection(format!("Failed to send set: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| Error::Connection(format!("Failed to flush set: {}", e)))?;

        match read_line(&mut stream).await?.as_str() {
            "STORED" => {
                debug!("Stored {} bytes under {}", value.len(), key);
                Ok(())
            }
            other => Err(Error::Protocol(format!("Set not stored: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("state:1-master").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key("has\r\nnewline").is_err());
        assert!(validate_key(&"k".repeat(251)).is_err());
        assert!(validate_key(&"k".repeat(250)).is_ok());
    }

    #[test]
    fn test_parse_value_header() {
        assert_eq!(parse_value_header("VALUE state:1 0 42"), Some(42));
        assert_eq!(parse_value_header("VALUE state:1-master 0 0"), Some(0));
        assert_eq!(parse_value_header("END"), None);
        assert_eq!(parse_value_header("VALUE state:1 0"), None);
        assert_eq!(parse_value_header("ERROR"), None);
    }
}
