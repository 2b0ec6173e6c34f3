//! Per-client request loop.

use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::watch,
};
use tracing::{debug, error, info, warn};

use crate::{
    commands::CommandDispatcher,
    input::{CommandReadError, read_requests},
    resp::RespValue,
    state::DisconnectSignal,
};

const READ_BUFFER_CAPACITY: usize = 4096;
/// Input read ahead while a request runs stops here until the buffer drains.
const MAX_READ_AHEAD: usize = 64 * 1024;

/// Serves one client until it disconnects or its socket fails.
///
/// Requests are executed strictly in the order they arrive and every reply is
/// written before the next request is dispatched, so a blocked BLPOP holds
/// back only this client's later requests. The socket is still read while a
/// request runs, so a client that disconnects mid-BLPOP stops waiting at once.
/// Requests it sent before leaving are still executed.
pub async fn handle_client_connection<S>(
    mut stream: S,
    client_address: String,
    dispatcher: CommandDispatcher,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!(client = %client_address, "client connected");

    let mut buffer = BytesMut::with_capacity(READ_BUFFER_CAPACITY);
    let mut output = BytesMut::new();
    let (disconnect_sender, disconnect) = DisconnectSignal::channel();

    loop {
        let requests = match read_requests(&mut stream, &mut buffer).await {
            Ok(requests) => requests,
            Err(CommandReadError::ConnectionClosed) => break,
            Err(CommandReadError::RespParseError(e)) => {
                warn!(client = %client_address, error = %e, "discarding malformed input");
                continue;
            }
            Err(CommandReadError::IoError(e)) => {
                error!(client = %client_address, error = %e, "failed to read from client");
                break;
            }
        };

        for request in requests {
            let response = dispatch_while_reading(
                &mut stream,
                &mut buffer,
                &dispatcher,
                request,
                &disconnect_sender,
                disconnect.clone(),
            )
            .await;

            let Some(response) = response else {
                continue;
            };

            if let Err(e) = write_response(&mut stream, &mut output, &response).await {
                error!(client = %client_address, error = %e, "failed to write to client");
                return;
            }
        }
    }

    info!(client = %client_address, "client disconnected");
}

/// Runs one request while reading whatever the client sends meanwhile into
/// `buffer`. EOF or a read failure fires the disconnect signal. The socket is
/// polled first so a pending EOF is seen before a finished reply is taken.
async fn dispatch_while_reading<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    dispatcher: &CommandDispatcher,
    request: Vec<Bytes>,
    disconnect_sender: &watch::Sender<bool>,
    disconnect: DisconnectSignal,
) -> Option<RespValue>
where
    S: AsyncRead + Unpin,
{
    let mut client_gone = disconnect.is_disconnected();

    let dispatch = dispatcher.dispatch_for_client(request, disconnect);
    tokio::pin!(dispatch);

    loop {
        tokio::select! {
            biased;

            read = stream.read_buf(buffer), if !client_gone && buffer.len() < MAX_READ_AHEAD => {
                client_gone = match read {
                    Ok(0) => true,
                    Ok(_) => false,
                    Err(e) => {
                        debug!(error = %e, "read failed while a request was running");
                        true
                    }
                };

                if client_gone {
                    disconnect_sender.send_replace(true);
                }
            }
            response = &mut dispatch => return response,
        }
    }
}

async fn write_response<S>(
    stream: &mut S,
    output: &mut BytesMut,
    response: &RespValue,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    output.clear();
    response.encode_to(output);

    stream.write_all(&output[..]).await?;
    stream.flush().await
}
