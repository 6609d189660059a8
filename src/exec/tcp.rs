// src/exec/tcp.rs

//! Connection to a daemon over TCP.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info, trace, warn};

use crate::errors::{JunknetError, Result};
use crate::exec::connection::{BoxFuture, Connection, ConnectionFactory};
use crate::job::Job;
use crate::net::{Request, Response, host_and_port, parse_response};
use crate::types::JobResult;

/// Factory for [`TcpConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectionFactory;

impl TcpConnectionFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionFactory for TcpConnectionFactory {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        port: u16,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            let conn = TcpConnection::connect(host, port).await?;
            Ok(Box::new(conn) as Box<dyn Connection>)
        })
    }
}

/// One TCP stream to a daemon.
///
/// Each `run` writes a single `job` request line and reads response frames
/// until the `exit` frame arrives.
///
/// Any error inside `run` leaves the stream at an unknown position, so the
/// connection closes its write half and refuses every later `run`.
#[derive(Debug)]
pub struct TcpConnection {
    address: String,
    reader: BufReader<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
}

impl TcpConnection {
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let address = host_and_port(host, port);
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        info!(%address, "connected to daemon");

        let (read, write) = stream.into_split();
        Ok(Self {
            address,
            reader: BufReader::new(read),
            writer: Some(write),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn run_inner(&mut self, job: &Job) -> Result<JobResult> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            JunknetError::Transport(format!("connection to {} is closed", self.address))
        })?;

        let line = Request::from(job).to_line()?;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        debug!(address = %self.address, job = %job.target(), "job request sent");

        let mut result = JobResult::default();
        let mut lines = (&mut self.reader).lines();

        loop {
            let Some(line) = lines.next_line().await? else {
                return Err(JunknetError::Transport(format!(
                    "daemon {} closed the stream before job '{}' exited",
                    self.address,
                    job.target()
                )));
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_response(&line)? {
                Response::Output { stream, data } => {
                    trace!(job = %job.target(), %stream, "{}", data.trim_end());
                    result.push_output(stream, data.as_bytes());
                }
                Response::Exit { status } => {
                    result.status = status;
                    return Ok(result);
                }
            }
        }
    }
}

impl Connection for TcpConnection {
    fn run<'a>(&'a mut self, job: &'a Job) -> BoxFuture<'a, Result<JobResult>> {
        Box::pin(async move {
            let result = self.run_inner(job).await;
            if let Err(error) = &result {
                if self.writer.take().is_some() {
                    warn!(
                        address = %self.address,
                        job = %job.target(),
                        %error,
                        "stream out of sync; closing connection"
                    );
                }
            }
            result
        })
    }

    fn end(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(mut writer) = self.writer.take() {
                writer.shutdown().await?;
                debug!(address = %self.address, "connection closed");
            }
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}
