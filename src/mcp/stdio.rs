use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::jsonrpc::parse_request;
use super::server::McpServer;

async fn write_frame<W>(writer: &mut W, response: &Value) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_vec(response)?;
    frame.push(b'\n');
    writer
        .write_all(&frame)
        .await
        .context("Failed to write response")?;
    writer.flush().await.context("Failed to flush response")?;
    Ok(())
}

/// Serve newline-delimited JSON-RPC until the input closes.
///
/// Requests are handled one at a time, in arrival order.
pub async fn serve<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let response = match parse_request(raw) {
            Ok(request) => server.handle(request).await,
            Err(error_response) => Some(error_response),
        };

        if let Some(response) = response {
            write_frame(&mut writer, &response).await?;
        }
    }

    debug!("Input closed");
    Ok(())
}

pub async fn run_stdio(server: &McpServer) -> Result<()> {
    info!("Serving MCP over stdio");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}
