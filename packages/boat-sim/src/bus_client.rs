//! Unix-domain-socket client for the line bus, same shape as
//! `helmsman-daemon/src/bus_client.rs`: a reader task forwarding parsed
//! `BusMessage`s into a bounded channel, and a writer task draining an
//! outbound channel. The simulator sits on the opposite side of the same
//! bus as the daemon, so it reuses the daemon's connection idiom rather
//! than inventing a second one.

use bus_proto::BusMessage;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

pub struct BusClient {
    write_tx: mpsc::Sender<String>,
}

impl BusClient {
    pub async fn connect(
        socket_path: &std::path::Path,
        message_tx: mpsc::Sender<BusMessage>,
    ) -> anyhow::Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| anyhow::anyhow!("connecting to bus socket {}: {e}", socket_path.display()))?;
        let (read_half, mut write_half) = stream.into_split();

        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match line.parse::<BusMessage>() {
                        Ok(msg) => {
                            if message_tx.try_send(msg).is_err() {
                                debug!("bus reader: channel full, dropping a sample");
                            }
                        }
                        Err(e) => debug!("bus reader: malformed line {line:?}: {e}"),
                    },
                    Ok(None) => {
                        warn!("bus reader: socket closed by peer");
                        break;
                    }
                    Err(e) => {
                        warn!("bus reader: read error: {e}");
                        break;
                    }
                }
            }
        });

        let (write_tx, mut write_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            while let Some(line) = write_rx.recv().await {
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    warn!("bus writer: write error: {e}");
                }
            }
        });

        Ok(BusClient { write_tx })
    }

    pub fn publish(&self, msg: &BusMessage) {
        match bus_proto::encode_line(msg) {
            Ok(line) => {
                if self.write_tx.try_send(line).is_err() {
                    warn!("bus writer: channel full, dropping a published message");
                }
            }
            Err(e) => warn!("bus writer: failed to encode message: {e}"),
        }
    }
}
