// src/ports/surface.rs
use crate::application::{Frame, RenderTarget, ViewRequest};
use crate::domain::DomainError;
use crate::ports::HtmlPresenter;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Background renderer for an editor.
///
/// Requests and frames travel over `watch` channels, so only the latest
/// request is rendered and a waiter always sees the newest frame.
#[derive(Debug)]
pub struct RenderSurface {
    requests: watch::Sender<Option<ViewRequest>>,
    frames: watch::Receiver<Option<Frame>>,
    task: JoinHandle<()>,
}

impl RenderSurface {
    /// Start the render task. Must be called inside a tokio runtime.
    pub fn spawn(presenter: HtmlPresenter) -> Self {
        let (requests, mut pending) = watch::channel(None::<ViewRequest>);
        let (frames_tx, frames) = watch::channel(None::<Frame>);

        let task = tokio::spawn(async move {
            while pending.changed().await.is_ok() {
                let Some(request) = pending.borrow_and_update().clone() else {
                    continue;
                };
                let html = presenter.render_editor(&request.content, request.mode);
                trace!(epoch = request.epoch, mode = %request.mode, "Rendered frame");
                frames_tx.send_replace(Some(Frame {
                    session_id: request.session_id,
                    epoch: request.epoch,
                    mode: request.mode,
                    html,
                }));
            }
            debug!("Render surface closed");
        });

        Self {
            requests,
            frames,
            task,
        }
    }

    /// Most recently rendered frame, if any.
    pub fn latest(&self) -> Option<Frame> {
        self.frames.borrow().clone()
    }
}

#[async_trait]
impl RenderTarget for RenderSurface {
    fn submit(&self, request: ViewRequest) {
        self.requests.send_replace(Some(request));
    }

    async fn frame_at(&self, session_id: &str, target: u64) -> Result<Frame, DomainError> {
        let mut frames = self.frames.clone();
        let frame = frames
            .wait_for(|f| {
                f.as_ref()
                    .is_some_and(|f| f.session_id == session_id && f.epoch >= target)
            })
            .await
            .map_err(|_| DomainError::Backend("render surface stopped".to_string()))?
            .clone();
        frame.ok_or_else(|| DomainError::Backend("render surface produced no frame".to_string()))
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.task.abort();
    }
}
