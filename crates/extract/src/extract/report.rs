use std::fmt::{Display, Formatter, Result as FmtResult};

/// Tally of what the extractor saw inside the ranking container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Element children of the container.
    pub children: usize,
    /// Children decoded into a repository.
    pub entries: usize,
    /// Children carrying the sentinel class.
    pub sentinels: usize,
    /// Children without a heading (headers, spacer rows).
    pub ignored: usize,
    /// Children with a heading that didn't match the entry layout.
    pub malformed: usize,
}
impl Report {
    /// The container had content but none of it decoded. On a live page this
    /// almost always means the markup changed, not that nothing is trending.
    pub fn is_suspicious(&self) -> bool {
        self.children > 0 && self.entries == 0
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} entries from {} children ({} sentinel, {} ignored, {} malformed)",
            self.entries, self.children, self.sentinels, self.ignored, self.malformed
        )
    }
}
