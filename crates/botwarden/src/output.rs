use std::collections::VecDeque;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;

const RING_BUFFER_SIZE: usize = 64 * 1024;

/// Ring buffer of recent worker output, shared between the pipe tasks and
/// the gateway's log snapshot.
#[derive(Clone, Default)]
pub struct OutputCapture {
	ring: Arc<Mutex<VecDeque<u8>>>,
}

#[derive(Clone, Copy)]
pub enum WorkerStream {
	Stdout,
	Stderr,
}

impl OutputCapture {
	pub fn new() -> Self {
		Self {
			ring: Arc::new(Mutex::new(VecDeque::with_capacity(RING_BUFFER_SIZE))),
		}
	}

	pub async fn write(&self, data: &[u8]) {
		let mut ring = self.ring.lock().await;
		for &byte in data {
			if ring.len() >= RING_BUFFER_SIZE {
				ring.pop_front();
			}
			ring.push_back(byte);
		}
	}

	pub async fn snapshot(&self) -> Vec<u8> {
		let ring = self.ring.lock().await;
		ring.iter().copied().collect()
	}
}

/// Forwards one worker stream line-by-line into the capture buffer and the
/// log output. Runs until the stream closes.
pub async fn pipe_worker_output<R>(reader: R, stream: WorkerStream, capture: OutputCapture)
where
	R: AsyncRead + Unpin,
{
	let mut lines = BufReader::new(reader).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		capture.write(line.as_bytes()).await;
		capture.write(b"\n").await;
		match stream {
			WorkerStream::Stdout => tracing::info!("worker output: {}", line),
			WorkerStream::Stderr => tracing::warn!("worker error: {}", line),
		}
	}
}
