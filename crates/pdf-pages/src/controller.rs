//! Async side of the page tools
//!
//! [`PageController`] owns the codec and thumbnail provider and does the
//! blocking work on tokio's blocking pool. It never touches a
//! [`ToolSession`] directly except through the `run_*` helpers, which drive
//! a whole load or commit for callers that own the session exclusively
//! (the CLI and tests). The GUI splits the two halves across its worker.

use std::sync::Arc;

use crate::codec::{DocumentCodec, assemble};
use crate::plan::CommitPlan;
use crate::progress::{Progress, ProgressSink, SharedProgress};
use crate::session::{
    CommitOutput, CommitResolution, LoadResolution, LoadTicket, LoadedDocument, ToolSession,
};
use crate::thumbnail::{ThumbnailKey, ThumbnailProvider, ThumbnailSet};
use crate::types::*;

pub struct PageController<C: DocumentCodec> {
    codec: Arc<C>,
    thumbnails: Arc<dyn ThumbnailProvider>,
}

impl<C: DocumentCodec> Clone for PageController<C> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            thumbnails: Arc::clone(&self.thumbnails),
        }
    }
}

impl<C: DocumentCodec> PageController<C> {
    pub fn new(codec: C, thumbnails: Arc<dyn ThumbnailProvider>) -> Self {
        Self {
            codec: Arc::new(codec),
            thumbnails,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Count pages and render previews for a freshly picked file.
    ///
    /// Parse failures are returned as errors; thumbnail failures are stored
    /// in the result so the pages still load.
    pub async fn load(
        &self,
        ticket: LoadTicket,
        bytes: Arc<Vec<u8>>,
        scale: f32,
        progress: SharedProgress,
    ) -> Result<LoadedDocument> {
        let codec = Arc::clone(&self.codec);
        let source = Arc::clone(&bytes);
        let page_count = tokio::task::spawn_blocking(move || {
            let document = codec.load_document(&source)?;
            Ok::<_, PagesError>(codec.page_count(&document))
        })
        .await??;
        log::debug!("Document has {page_count} pages, rendering previews");

        let provider = Arc::clone(&self.thumbnails);
        let source = Arc::clone(&bytes);
        let rendered = tokio::task::spawn_blocking(move || {
            provider.render(&source, scale, progress.as_ref())
        })
        .await;

        let key = ThumbnailKey {
            document: ticket.id(),
            scale,
        };
        let thumbnails = match rendered {
            Ok(Ok(images)) => Ok(ThumbnailSet::new(key, images)),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(PagesError::Thumbnail(e.to_string())),
        };

        Ok(LoadedDocument {
            bytes,
            page_count,
            thumbnails,
        })
    }

    /// Build the output document for `plan` from `source`.
    ///
    /// An empty plan fails before the codec is called.
    pub async fn commit(
        &self,
        source: Arc<Vec<u8>>,
        plan: &CommitPlan,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        plan.ensure_not_empty()?;
        progress.report(Progress::new(
            1,
            1,
            format!("Assembling {} pages...", plan.len()),
        ));

        let codec = Arc::clone(&self.codec);
        let pages = plan.pages().to_vec();
        tokio::task::spawn_blocking(move || {
            let document = codec.load_document(&source)?;
            assemble(codec.as_ref(), &document, &pages)
        })
        .await?
    }

    /// Load `bytes` into `session` from start to finish
    pub async fn run_load(
        &self,
        session: &mut ToolSession,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        scale: f32,
        progress: SharedProgress,
    ) -> Result<LoadResolution> {
        let ticket = session.begin_load(file_name);
        let result = self.load(ticket, Arc::new(bytes), scale, progress).await;
        session.resolve_load(ticket, result)
    }

    /// Commit the session's current plan and return the produced file
    pub async fn run_commit(
        &self,
        session: &mut ToolSession,
        progress: &dyn ProgressSink,
    ) -> Result<CommitOutput> {
        let request = session.begin_commit()?;
        let result = self.commit(request.source, &request.plan, progress).await;
        match session.finish_commit(request.ticket, result)? {
            CommitResolution::Completed(output) => Ok(output),
            // Only reachable if the session was replaced under us
            CommitResolution::Stale => Err(PagesError::InvalidState(session.state())),
        }
    }
}
