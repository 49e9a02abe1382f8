//! Authenticated session over the proxy's text-based control port.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use harvest_core::AppError;

/// Control-channel operations, abstracted for testing the rotation logic.
pub trait ControlLink: Send {
    fn connect(&mut self) -> impl Future<Output = Result<(), AppError>> + Send;
    fn authenticate(&mut self) -> impl Future<Output = Result<(), AppError>> + Send;
    fn signal(&mut self, name: &str) -> impl Future<Output = Result<(), AppError>> + Send;
    fn close(&mut self) -> impl Future<Output = Result<(), AppError>> + Send;
}

struct ControlStream {
    writer: OwnedWriteHalf,
    reader: BufReader<OwnedReadHalf>,
}

/// A single TCP session to the proxy control port.
///
/// Only one command may be in flight at a time; the caller serializes.
/// There is no implicit reconnect after [`ControlSession::close`].
pub struct ControlSession {
    address: String,
    password: String,
    timeout: Duration,
    stream: Option<ControlStream>,
}

impl ControlSession {
    pub fn new(
        address: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let address = address.into();
        let password = password.into();

        if address.is_empty() {
            return Err(AppError::ConfigError(
                "control port address is required but not provided".into(),
            ));
        }
        if password.is_empty() {
            return Err(AppError::ConfigError(
                "control port password is required but not provided".into(),
            ));
        }
        if timeout.is_zero() {
            return Err(AppError::ConfigError(
                "control port timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            address,
            password,
            timeout,
            stream: None,
        })
    }

    /// Establish the TCP connection; a no-op when already connected.
    pub async fn connect(&mut self) -> Result<(), AppError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| {
                AppError::NetworkError(format!(
                    "could not connect to control port {}: {e}",
                    self.address
                ))
            })?;

        let (read, write) = stream.into_split();
        self.stream = Some(ControlStream {
            writer: write,
            reader: BufReader::new(read),
        });
        tracing::debug!(address = %self.address, "connected to control port");
        Ok(())
    }

    /// Send `AUTHENTICATE "<password>"` and interpret the single-line reply.
    pub async fn authenticate(&mut self) -> Result<(), AppError> {
        let command = format!("AUTHENTICATE {:?}\n", self.password);
        let response = self.round_trip(&command).await?;
        tracing::debug!(response = %response, "AUTHENTICATE");

        if response.starts_with("250") {
            Ok(())
        } else if response.starts_with("515") {
            Err(AppError::AuthenticationFailed)
        } else {
            Err(AppError::ControlProtocol(response))
        }
    }

    /// Send `SIGNAL <name>` (e.g. `NEWNYM`) and interpret the reply.
    pub async fn signal(&mut self, name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::ConfigError("signal is required".into()));
        }

        let command = format!("SIGNAL {name}\r\n");
        let response = self.round_trip(&command).await?;
        tracing::debug!(response = %response, "SIGNAL");

        if response.starts_with("250") {
            Ok(())
        } else if response.starts_with("514") {
            Err(AppError::AuthenticationRequired)
        } else {
            Err(AppError::ControlProtocol(response))
        }
    }

    /// Release the TCP resource; a no-op when already closed.
    pub async fn close(&mut self) -> Result<(), AppError> {
        if let Some(mut stream) = self.stream.take() {
            stream.writer.shutdown().await.map_err(|e| {
                AppError::NetworkError(format!(
                    "could not close connection to {}: {e}",
                    self.address
                ))
            })?;
            tracing::debug!(address = %self.address, "control connection closed");
        }
        Ok(())
    }

    async fn round_trip(&mut self, command: &str) -> Result<String, AppError> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            AppError::NetworkError("no active connection to send the command".into())
        })?;

        stream
            .writer
            .write_all(command.as_bytes())
            .await
            .map_err(|e| AppError::NetworkError(format!("could not write command: {e}")))?;
        stream
            .writer
            .flush()
            .await
            .map_err(|e| AppError::NetworkError(format!("could not flush command: {e}")))?;

        let mut line = String::new();
        let read = stream
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| AppError::NetworkError(format!("could not read response: {e}")))?;
        if read == 0 {
            return Err(AppError::NetworkError(
                "control port closed the connection".into(),
            ));
        }
        Ok(line.trim_end().to_string())
    }
}

impl ControlLink for ControlSession {
    fn connect(&mut self) -> impl Future<Output = Result<(), AppError>> + Send {
        self.connect()
    }

    fn authenticate(&mut self) -> impl Future<Output = Result<(), AppError>> + Send {
        self.authenticate()
    }

    fn signal(&mut self, name: &str) -> impl Future<Output = Result<(), AppError>> + Send {
        self.signal(name)
    }

    fn close(&mut self) -> impl Future<Output = Result<(), AppError>> + Send {
        self.close()
    }
}
