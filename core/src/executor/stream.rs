use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_util::task::AbortOnDropHandle;

const LINE_BUFFER: usize = 64;

/// Decoded lines of a child's output, delivered as they are produced.
///
/// A background task reads the pipe and forwards each line over a channel,
/// so the consumer can wait on lines alongside a deadline. Bytes that are not
/// valid UTF-8 are replaced rather than ending the stream. Dropping the
/// stream stops the reader.
pub struct LineStream {
    rx: mpsc::Receiver<String>,
    _reader: AbortOnDropHandle<()>,
}

impl LineStream {
    pub fn spawn<R>(source: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<String>(LINE_BUFFER);

        let reader = tokio::spawn(async move {
            let mut source = BufReader::new(source);
            let mut buf: Vec<u8> = Vec::new();
            loop {
                buf.clear();
                match source.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line: String = String::from_utf8_lossy(&buf)
                            .trim_end_matches(['\r', '\n'])
                            .to_string();
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Output stream closed");
                        break;
                    }
                }
            }
        });

        Self {
            rx,
            _reader: AbortOnDropHandle::new(reader),
        }
    }

    /// Next line, or `None` once the source is exhausted.
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
