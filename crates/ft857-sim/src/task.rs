//! Virtual radio actor task
//!
//! This module provides an async task that owns a VirtualRadio and serves it
//! over an async stream. The task uses a select! loop to:
//! - Read command frames from the stream and write back replies
//! - Handle control commands from a channel
//! - Emit state snapshots via a broadcast channel

use std::io;

use ft857_protocol::{FrameCodec, ProtocolCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::radio::{RadioState, VirtualRadio};

/// Commands that can be sent to a virtual radio actor
#[derive(Debug, Clone)]
pub enum VirtualRadioCommand {
    /// Stop or resume replying
    Silence(bool),
    /// Set the S-meter reading
    SetSignal(u8),
    /// Truncate replies to at most this many bytes
    SetReplyLimit(Option<usize>),
    /// Shutdown the virtual radio actor
    Shutdown,
}

/// Run the virtual radio actor task
///
/// Returns when the stream closes, the command channel closes or a
/// shutdown is requested. A state snapshot is broadcast on start and after
/// every frame or command that changes the radio.
pub async fn run_virtual_radio_task<S>(
    mut stream: S,
    mut radio: VirtualRadio,
    mut cmd_rx: mpsc::Receiver<VirtualRadioCommand>,
    state_tx: broadcast::Sender<RadioState>,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut codec = FrameCodec::new();
    let mut buf = [0u8; 256];

    info!("Starting virtual radio task for {}", radio.id());

    // No receivers is fine
    let _ = state_tx.send(radio.state().clone());

    loop {
        tokio::select! {
            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        debug!("Virtual radio stream closed for {}", radio.id());
                        break;
                    }
                    Ok(n) => {
                        codec.push_bytes(&buf[..n]);
                        while let Some(frame) = codec.next_item() {
                            let before = radio.state().clone();
                            let reply = radio.handle_frame(&frame);
                            debug!(
                                "Virtual radio {} frame {:02X?} -> {:02X?}",
                                radio.id(), frame, reply
                            );

                            if !reply.is_empty() {
                                stream.write_all(&reply).await?;
                                stream.flush().await?;
                            }

                            if *radio.state() != before {
                                let _ = state_tx.send(radio.state().clone());
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Virtual radio {} stream error: {}", radio.id(), e);
                        return Err(e);
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(VirtualRadioCommand::Silence(silent)) => {
                        info!("Virtual radio {} silent: {}", radio.id(), silent);
                        radio.set_silent(silent);
                    }
                    Some(VirtualRadioCommand::SetSignal(level)) => {
                        radio.set_signal(level);
                        let _ = state_tx.send(radio.state().clone());
                    }
                    Some(VirtualRadioCommand::SetReplyLimit(limit)) => {
                        info!("Virtual radio {} reply limit: {:?}", radio.id(), limit);
                        radio.set_reply_limit(limit);
                    }
                    Some(VirtualRadioCommand::Shutdown) => {
                        info!("Shutdown requested for virtual radio {}", radio.id());
                        break;
                    }
                    None => {
                        debug!("Command channel closed for virtual radio {}", radio.id());
                        break;
                    }
                }
            }
        }
    }

    info!("Virtual radio task ended for {}", radio.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ft857_protocol::{Command, Mode};
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_task_answers_frames() {
        let (mut client, server) = duplex(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (state_tx, mut state_rx) = broadcast::channel(16);

        let handle = tokio::spawn(run_virtual_radio_task(
            server,
            VirtualRadio::new("task"),
            cmd_rx,
            state_tx,
        ));

        let initial = state_rx.recv().await.unwrap();
        assert_eq!(initial.active().mode, Mode::Usb);

        // Split across writes to exercise frame reassembly
        let frame = Command::SetMode { mode: Mode::Fm }.encode();
        client.write_all(&frame[..2]).await.unwrap();
        client.write_all(&frame[2..]).await.unwrap();

        let mut ack = [0u8; 1];
        client.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, [0x00]);

        let changed = state_rx.recv().await.unwrap();
        assert_eq!(changed.active().mode, Mode::Fm);

        cmd_tx.send(VirtualRadioCommand::Shutdown).await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_task_ends_when_stream_closes() {
        let (client, server) = duplex(64);
        let (_cmd_tx, cmd_rx) = mpsc::channel(4);
        let (state_tx, _state_rx) = broadcast::channel(16);

        let handle = tokio::spawn(run_virtual_radio_task(
            server,
            VirtualRadio::new("task"),
            cmd_rx,
            state_tx,
        ));
        drop(client);
        handle.await.unwrap().unwrap();
    }
}
