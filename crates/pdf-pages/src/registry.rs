//! Ordered page descriptors for one loaded document
//!
//! The registry tracks which pages the user wants to keep and in which order.
//! Its length is fixed at load time: hiding a page flips its `included` flag,
//! it never removes the descriptor. Loading another document builds a new
//! registry instead of editing this one.

use crate::plan::CommitPlan;
use crate::types::*;

/// One page of the loaded document as tracked by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageDescriptor {
    pub id: PageId,
    /// 1-based position in the source document, fixed at load time
    pub original_index: u32,
    pub included: bool,
}

impl PageDescriptor {
    pub fn removed(&self) -> bool {
        !self.included
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistry {
    pages: Vec<PageDescriptor>,
}

impl PageRegistry {
    /// Create descriptors for pages `1..=page_count`, all included
    pub fn initialize(page_count: usize) -> Result<Self> {
        if page_count == 0 {
            return Err(PagesError::NoPages);
        }

        let last = u32::try_from(page_count).map_err(|_| PagesError::TooManyPages(page_count))?;
        let pages = (1..=last)
            .map(|n| PageDescriptor {
                id: PageId(n),
                original_index: n,
                included: true,
            })
            .collect();

        Ok(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Descriptors in display order
    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter()
    }

    pub fn get(&self, id: PageId) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Current display position of a page
    pub fn position_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    /// Flip `included` for a page. Unknown ids are ignored and return false.
    pub fn toggle(&mut self, id: PageId) -> bool {
        match self.pages.iter_mut().find(|p| p.id == id) {
            Some(page) => {
                page.included = !page.included;
                true
            }
            None => {
                log::warn!("Ignoring toggle for unknown {id}");
                false
            }
        }
    }

    pub fn set_included(&mut self, id: PageId, included: bool) -> bool {
        match self.pages.iter_mut().find(|p| p.id == id) {
            Some(page) => {
                page.included = included;
                true
            }
            None => false,
        }
    }

    /// Move the page at `source` so that it ends up at `target`.
    ///
    /// Both positions are checked before anything moves.
    pub fn reorder(&mut self, source: usize, target: usize) -> Result<()> {
        let len = self.pages.len();
        for position in [source, target] {
            if position >= len {
                return Err(PagesError::InvalidPosition { position, len });
            }
        }

        if source != target {
            let page = self.pages.remove(source);
            self.pages.insert(target, page);
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.pages.iter_mut().for_each(|p| p.included = true);
    }

    pub fn deselect_all(&mut self) {
        self.pages.iter_mut().for_each(|p| p.included = false);
    }

    pub fn counts(&self) -> PageCounts {
        let included = self.pages.iter().filter(|p| p.included).count();
        PageCounts {
            included,
            excluded: self.pages.len() - included,
        }
    }

    /// Included pages, in display order, as original indices
    pub fn commit_plan(&self) -> CommitPlan {
        CommitPlan::new(
            self.pages
                .iter()
                .filter(|p| p.included)
                .map(|p| p.original_index)
                .collect(),
        )
    }

    /// Original indices in display order, included or not
    pub fn display_order(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.original_index).collect()
    }
}
