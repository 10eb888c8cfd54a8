//! The read/dispatch/write loop.
//!
//! Strictly synchronous request/response: one line in, one line out, in
//! order, never reading ahead. The loop runs until a `shutdown` command or
//! end of input. Recoverable protocol errors (undecodable line, unknown
//! command) become error responses; engine failures propagate out of
//! [`Bridge::run`] and terminate the process.

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::engine::Engine;
use crate::protocol::{Request, Response};

pub struct Bridge {
    engine: Box<dyn Engine>,
}

impl Bridge {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Map one decoded request to its response. Pure apart from the engine
    /// calls behind `token` and `text`.
    pub async fn dispatch(&self, request: &Request) -> Result<Response> {
        match request.cmd_str() {
            Some("version") => Ok(Response::version(self.engine.version())),
            Some("token") => {
                let token = request.token.as_deref().unwrap_or("");
                let tag = self.engine.analyse(token).await?;
                Ok(Response::token(token, tag, self.engine.version()))
            }
            Some("text") => {
                let text = request.text.as_deref().unwrap_or("");
                let analysis = self.engine.analyse_text(text).await?;
                Ok(Response::text(analysis, self.engine.version()))
            }
            Some("shutdown") => Ok(Response::stopped()),
            // Catch-all: any other cmd value, string or not, present or not.
            _ => Ok(Response::unknown_command(request.cmd.as_ref())),
        }
    }

    /// Consume requests from `reader` until `shutdown` or end of input,
    /// writing one flushed response line per non-blank input line.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("failed to read request line")?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Two stages: the line must parse as JSON and be an object;
            // everything else about the request is the dispatcher's business.
            let decoded = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .as_ref()
                .and_then(Request::from_value);
            let (response, stop) = match decoded {
                Some(request) => {
                    let stop = request.cmd_str() == Some("shutdown");
                    (self.dispatch(&request).await?, stop)
                }
                None => (Response::invalid_json(), false),
            };

            let mut out =
                serde_json::to_string(&response).context("failed to encode response")?;
            out.push('\n');
            writer
                .write_all(out.as_bytes())
                .await
                .context("failed to write response")?;
            writer.flush().await.context("failed to flush response")?;

            if stop {
                break;
            }
        }
        Ok(())
    }
}
