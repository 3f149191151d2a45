use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::export::{ExportJob, Exporter};
use crate::model::{Section, Template};
use crate::rendering::{ExportedImage, SectionView};
use crate::{Error, Result};

enum Command {
    ExportOne {
        section: Section,
        view: Arc<dyn SectionView>,
        template: Option<Template>,
        resp: oneshot::Sender<Result<ExportedImage>>,
    },
    ExportAll {
        job: ExportJob,
        views: Vec<Arc<dyn SectionView>>,
        resp: oneshot::Sender<Result<ExportedImage>>,
    },
    Close(oneshot::Sender<()>),
}

/// A single-flight export queue for one document.
///
/// A background task owns the `Exporter` and runs one job at a time in
/// arrival order, so two exports never interleave style overrides on the
/// same live section views. Handles are cheap to clone.
#[derive(Clone)]
pub struct ExportSession {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ExportSession {
    /// Start the session worker. Must be called from within a tokio runtime.
    pub fn spawn(exporter: Exporter) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();

        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                match cmd {
                    Command::ExportOne {
                        section,
                        view,
                        template,
                        resp,
                    } => {
                        let res = exporter
                            .export_one(&section, &*view, template.as_ref())
                            .await;
                        let _ = resp.send(res);
                    }
                    Command::ExportAll { job, views, resp } => {
                        let res = exporter.export_all(&job, &views).await;
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
            log::debug!("Export session worker stopped");
        });

        Self { cmd_tx }
    }

    /// Queue a single-section export and wait for its result.
    pub async fn export_one(
        &self,
        section: Section,
        view: Arc<dyn SectionView>,
        template: Option<Template>,
    ) -> Result<ExportedImage> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ExportOne {
                section,
                view,
                template,
                resp: tx,
            })
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Queue a multi-section export and wait for its result.
    pub async fn export_all(&self, job: ExportJob, views: Vec<Arc<dyn SectionView>>) -> Result<ExportedImage> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ExportAll { job, views, resp: tx })
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Stop the worker after the jobs already queued have finished.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)
    }
}
