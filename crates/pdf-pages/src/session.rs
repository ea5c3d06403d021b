//! Page tool session
//!
//! [`ToolSession`] is the single owner of a page tool's state: the loaded
//! bytes, the [`PageRegistry`], the rendered thumbnails and the lifecycle
//! state. Async work (loading, committing) happens elsewhere and comes back
//! through `resolve_load` / `finish_commit` together with the ticket that was
//! handed out when the work started. Results carrying an outdated ticket are
//! dropped, so a slow load for a replaced file can never overwrite the
//! registry of the current one.

use std::sync::Arc;

use crate::naming::output_file_name;
use crate::plan::CommitPlan;
use crate::registry::PageRegistry;
use crate::thumbnail::{Thumbnail, ThumbnailSet};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    #[default]
    Empty,
    Loading,
    Ready,
    Committing,
    Error,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Empty => "empty",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Committing => "committing",
            SessionState::Error => "showing an error",
        };
        f.write_str(label)
    }
}

/// The page tools built on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToolKind {
    /// Keep the selected pages, in the chosen order
    ExtractPages,
    /// Drop the marked pages, keep the rest in the chosen order
    RemovePages,
}

impl ToolKind {
    pub fn title(&self) -> &'static str {
        match self {
            ToolKind::ExtractPages => "Extract Pages",
            ToolKind::RemovePages => "Remove Pages",
        }
    }

    pub fn output_suffix(&self) -> &'static str {
        match self {
            ToolKind::ExtractPages => "_extracted",
            ToolKind::RemovePages => "_edited",
        }
    }

    /// Preview scale used when no configuration overrides it
    pub fn default_thumbnail_scale(&self) -> f32 {
        match self {
            ToolKind::ExtractPages => 1.0,
            ToolKind::RemovePages => 0.5,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Handed out by [`ToolSession::begin_load`]; only the newest one resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Handed out by [`ToolSession::begin_commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitTicket {
    load: LoadTicket,
    serial: u64,
}

impl CommitTicket {
    pub fn load(&self) -> LoadTicket {
        self.load
    }
}

/// Outcome of loading a file, as produced by the controller
#[derive(Debug)]
pub struct LoadedDocument {
    pub bytes: Arc<Vec<u8>>,
    pub page_count: usize,
    /// A rendering failure is not fatal: the pages still load as placeholders
    pub thumbnails: Result<ThumbnailSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResolution {
    /// The result belonged to a load that has since been replaced
    Stale,
    Ready { page_count: usize, thumbnails: bool },
}

/// Everything the worker needs to assemble the output document
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub ticket: CommitTicket,
    pub source: Arc<Vec<u8>>,
    pub plan: CommitPlan,
    pub output_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutput {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResolution {
    Stale,
    Completed(CommitOutput),
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: CommitTicket,
    pages: usize,
}

#[derive(Debug)]
pub struct ToolSession {
    tool: ToolKind,
    state: SessionState,
    epoch: u64,
    commit_serial: u64,
    file_name: Option<String>,
    source: Option<Arc<Vec<u8>>>,
    registry: Option<PageRegistry>,
    thumbnails: Option<ThumbnailSet>,
    thumbnail_error: Option<String>,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
}

impl ToolSession {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            state: SessionState::Empty,
            epoch: 0,
            commit_serial: 0,
            file_name: None,
            source: None,
            registry: None,
            thumbnails: None,
            thumbnail_error: None,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the page grid accepts edits and commits
    pub fn is_interactive(&self) -> bool {
        matches!(self.state, SessionState::Ready | SessionState::Error)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Loading | SessionState::Committing)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn source(&self) -> Option<&Arc<Vec<u8>>> {
        self.source.as_ref()
    }

    pub fn registry(&self) -> Option<&PageRegistry> {
        self.registry.as_ref()
    }

    pub fn counts(&self) -> PageCounts {
        self.registry
            .as_ref()
            .map(PageRegistry::counts)
            .unwrap_or_default()
    }

    pub fn thumbnails(&self) -> Option<&ThumbnailSet> {
        self.thumbnails.as_ref()
    }

    /// Preview for a page by identity; `None` means draw a placeholder
    pub fn thumbnail(&self, original_index: u32) -> Option<&Thumbnail> {
        self.thumbnails.as_ref()?.get(original_index)
    }

    pub fn thumbnail_error(&self) -> Option<&str> {
        self.thumbnail_error.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Ticket of the load currently expected, if one is running
    pub fn pending_load(&self) -> Option<LoadTicket> {
        (self.state == SessionState::Loading).then_some(LoadTicket(self.epoch))
    }

    /// Name the committed file will get
    pub fn output_name(&self) -> String {
        let input = self.file_name.as_deref().unwrap_or("document.pdf");
        output_file_name(input, self.tool.output_suffix())
    }

    /// Start loading a new file. Whatever was loaded or in flight before is
    /// discarded.
    pub fn begin_load(&mut self, file_name: impl Into<String>) -> LoadTicket {
        self.discard_document();
        self.epoch += 1;
        self.file_name = Some(file_name.into());
        self.last_error = None;
        self.state = SessionState::Loading;
        log::debug!(
            "{}: loading {:?} (epoch {})",
            self.tool,
            self.file_name,
            self.epoch
        );
        LoadTicket(self.epoch)
    }

    pub fn resolve_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedDocument>,
    ) -> Result<LoadResolution> {
        if self.pending_load() != Some(ticket) {
            log::warn!(
                "{}: discarding stale load result (epoch {}, current {})",
                self.tool,
                ticket.0,
                self.epoch
            );
            return Ok(LoadResolution::Stale);
        }

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.fail_load(e)),
        };
        let registry = match PageRegistry::initialize(loaded.page_count) {
            Ok(registry) => registry,
            Err(e) => return Err(self.fail_load(e)),
        };

        match loaded.thumbnails {
            Ok(set) => {
                if set.len() != loaded.page_count {
                    log::warn!(
                        "{}: {} thumbnails for {} pages",
                        self.tool,
                        set.len(),
                        loaded.page_count
                    );
                }
                self.thumbnails = Some(set);
            }
            Err(e) => {
                log::warn!("{}: showing placeholders: {e}", self.tool);
                self.thumbnail_error = Some(e.to_string());
            }
        }

        let page_count = registry.len();
        self.source = Some(loaded.bytes);
        self.registry = Some(registry);
        self.state = SessionState::Ready;
        log::info!(
            "{}: loaded {:?} with {page_count} pages",
            self.tool,
            self.file_name
        );

        Ok(LoadResolution::Ready {
            page_count,
            thumbnails: self.thumbnails.is_some(),
        })
    }

    /// Remove the file and go back to an empty tool
    pub fn clear(&mut self) {
        self.discard_document();
        // Outstanding loads must not resurrect the removed file
        self.epoch += 1;
        self.file_name = None;
        self.last_error = None;
        self.state = SessionState::Empty;
    }

    pub fn toggle(&mut self, id: PageId) -> Result<bool> {
        self.edit(|registry| Ok(registry.toggle(id)))
    }

    pub fn set_included(&mut self, id: PageId, included: bool) -> Result<bool> {
        self.edit(|registry| Ok(registry.set_included(id, included)))
    }

    pub fn reorder(&mut self, source: usize, target: usize) -> Result<()> {
        self.edit(|registry| registry.reorder(source, target))
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.edit(|registry| {
            registry.select_all();
            Ok(())
        })
    }

    pub fn deselect_all(&mut self) -> Result<()> {
        self.edit(|registry| {
            registry.deselect_all();
            Ok(())
        })
    }

    pub fn commit_plan(&self) -> Result<CommitPlan> {
        self.registry
            .as_ref()
            .map(PageRegistry::commit_plan)
            .ok_or(PagesError::InvalidState(self.state))
    }

    /// Freeze the current plan and enter `Committing`. An empty plan is
    /// refused without leaving the current state.
    pub fn begin_commit(&mut self) -> Result<CommitRequest> {
        if !self.is_interactive() {
            return Err(PagesError::InvalidState(self.state));
        }
        let plan = self.commit_plan()?;
        plan.ensure_not_empty()?;
        let source = self
            .source
            .clone()
            .ok_or(PagesError::InvalidState(self.state))?;

        self.commit_serial += 1;
        let ticket = CommitTicket {
            load: LoadTicket(self.epoch),
            serial: self.commit_serial,
        };
        self.in_flight = Some(InFlight {
            ticket,
            pages: plan.len(),
        });
        self.last_error = None;
        self.state = SessionState::Committing;
        log::debug!("{}: committing plan {plan}", self.tool);

        Ok(CommitRequest {
            ticket,
            source,
            plan,
            output_name: self.output_name(),
        })
    }

    /// Apply the outcome of a commit. A failure is handed back to the caller
    /// and leaves the session in `Error` with the registry untouched.
    pub fn finish_commit(
        &mut self,
        ticket: CommitTicket,
        result: Result<Vec<u8>>,
    ) -> Result<CommitResolution> {
        let in_flight = match self.in_flight {
            Some(in_flight)
                if in_flight.ticket == ticket && self.state == SessionState::Committing =>
            {
                in_flight
            }
            _ => {
                log::warn!("{}: discarding stale commit result", self.tool);
                return Ok(CommitResolution::Stale);
            }
        };
        self.in_flight = None;

        match result {
            Ok(bytes) => {
                self.state = SessionState::Ready;
                let output = CommitOutput {
                    file_name: self.output_name(),
                    page_count: in_flight.pages,
                    bytes,
                };
                log::info!(
                    "{}: produced {} ({} pages)",
                    self.tool,
                    output.file_name,
                    output.page_count
                );
                Ok(CommitResolution::Completed(output))
            }
            Err(e) => {
                log::warn!("{}: commit failed: {e}", self.tool);
                self.state = SessionState::Error;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn edit<R>(&mut self, f: impl FnOnce(&mut PageRegistry) -> Result<R>) -> Result<R> {
        if !self.is_interactive() {
            return Err(PagesError::InvalidState(self.state));
        }
        let registry = self
            .registry
            .as_mut()
            .ok_or(PagesError::InvalidState(self.state))?;
        let out = f(registry)?;

        if self.state == SessionState::Error {
            self.state = SessionState::Ready;
            self.last_error = None;
        }
        Ok(out)
    }

    fn fail_load(&mut self, error: PagesError) -> PagesError {
        log::warn!("{}: load failed: {error}", self.tool);
        self.discard_document();
        self.file_name = None;
        self.last_error = Some(error.to_string());
        self.state = SessionState::Empty;
        error
    }

    fn discard_document(&mut self) {
        self.source = None;
        self.registry = None;
        self.thumbnails = None;
        self.thumbnail_error = None;
        self.in_flight = None;
    }
}
