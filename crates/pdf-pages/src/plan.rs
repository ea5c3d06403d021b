use crate::types::*;

/// Ordered original page indices (1-based) that make up an output document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitPlan(Vec<u32>);

impl CommitPlan {
    pub fn new(pages: Vec<u32>) -> Self {
        Self(pages)
    }

    /// Build a plan from user-entered page numbers, dropping any that fall
    /// outside `1..=page_count`.
    pub fn from_page_numbers(pages: &[u32], page_count: usize) -> Self {
        Self(
            pages
                .iter()
                .copied()
                .filter(|&p| p >= 1 && p as usize <= page_count)
                .collect(),
        )
    }

    /// Pages of `1..=page_count` not listed in `removed`, in source order
    pub fn keeping_all_except(removed: &[u32], page_count: usize) -> Self {
        Self(
            (1..=page_count as u32)
                .filter(|p| !removed.contains(p))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    /// Fail with `EmptyPlan` when there is nothing to assemble
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.0.is_empty() {
            Err(PagesError::EmptyPlan)
        } else {
            Ok(())
        }
    }
}

impl From<Vec<u32>> for CommitPlan {
    fn from(pages: Vec<u32>) -> Self {
        Self(pages)
    }
}

impl std::fmt::Display for CommitPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Parsed page list such as `1-3,5,8-6`.
///
/// Ranges expand inclusively in the direction written, so `8-6` yields
/// 8, 7, 6. Duplicates are kept in the order given. Spans stay unexpanded
/// until [`PageSelection::resolve`] checks them against a real document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection(Vec<(u32, u32)>);

impl PageSelection {
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let mut spans = Vec::new();

        for part in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match part.split_once('-') {
                Some((first, last)) => {
                    spans.push((parse_page_number(first)?, parse_page_number(last)?));
                }
                None => {
                    let page = parse_page_number(part)?;
                    spans.push((page, page));
                }
            }
        }

        if spans.is_empty() {
            return Err(format!("No pages in '{input}'"));
        }
        Ok(Self(spans))
    }

    /// Highest page number named anywhere in the selection
    pub fn max_page(&self) -> u32 {
        self.0
            .iter()
            .map(|&(first, last)| first.max(last))
            .max()
            .unwrap_or(0)
    }

    /// Expand into page numbers for a document of `page_count` pages.
    ///
    /// Fails before expanding anything if a page lies past the end.
    pub fn resolve(&self, page_count: usize) -> Result<Vec<u32>> {
        let page = self.max_page();
        if page as usize > page_count {
            return Err(PagesError::PageOutOfRange { page, page_count });
        }

        let mut pages = Vec::new();
        for &(first, last) in &self.0 {
            if first <= last {
                pages.extend(first..=last);
            } else {
                pages.extend((last..=first).rev());
            }
        }
        Ok(pages)
    }
}

impl std::fmt::Display for PageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|&(first, last)| {
                if first == last {
                    first.to_string()
                } else {
                    format!("{first}-{last}")
                }
            })
            .collect();
        f.write_str(&parts.join(","))
    }
}

impl std::str::FromStr for PageSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_page_number(s: &str) -> std::result::Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid page number '{}'", s.trim())),
    }
}

/// Inclusive 1-based page range used by the split tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Pages of this range that exist in a document of `page_count` pages
    pub fn clamp_to(&self, page_count: usize) -> CommitPlan {
        let last = self.end.min(u32::try_from(page_count).unwrap_or(u32::MAX));
        CommitPlan::new((self.start.max(1)..=last).collect())
    }
}

impl std::str::FromStr for PageRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                if start > end {
                    return Err(format!("Range '{s}' ends before it starts"));
                }
                Ok(Self { start, end })
            }
            None => {
                let page = parse_page_number(s)?;
                Ok(Self {
                    start: page,
                    end: page,
                })
            }
        }
    }
}
