use std::fmt::{Display, Formatter, Result as FmtResult};

/// A single ranked repository, as listed on the trending page.
///
/// Immutable once constructed; the fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRecord {
    owner: String,
    name: String,
}
impl RepositoryRecord {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// User or organisation owning the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical web location of the repository.
    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl<O: Into<String>, N: Into<String>> From<(O, N)> for RepositoryRecord {
    fn from((owner, name): (O, N)) -> Self {
        Self::new(owner, name)
    }
}

impl Display for RepositoryRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_url() {
        let record = RepositoryRecord::new("alice", "proj1");
        assert_eq!(record.to_string(), "alice/proj1");
        assert_eq!(record.url(), "https://github.com/alice/proj1");
    }

    #[test]
    fn test_from_tuple() {
        let record: RepositoryRecord = ("bob", "proj2").into();
        assert_eq!(record.owner(), "bob");
        assert_eq!(record.name(), "proj2");
    }
}
