//! The cached unit: one timestamped extraction result, and its blob codec.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use facet_json::{from_str as from_json, to_string as to_json};
use time::{Duration, UtcDateTime};
use trendinghubs_extract::models::RepositoryRecord;

/// One complete extraction result, stamped with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub timestamp: UtcDateTime,
    /// In ranking order.
    pub records: Vec<RepositoryRecord>,
}

impl FeedSnapshot {
    pub fn new(timestamp: UtcDateTime, records: Vec<RepositoryRecord>) -> Self {
        Self { timestamp, records }
    }

    /// How old the snapshot is at `now`. Negative if it was stamped in the future.
    pub fn age_at(&self, now: UtcDateTime) -> Duration {
        now - self.timestamp
    }

    /// Whether the snapshot can still be served at `now`.
    ///
    /// A snapshot stamped in the future (clock skew between writers) counts
    /// as valid.
    pub fn is_valid_at(&self, now: UtcDateTime, max_age: Duration) -> bool {
        self.age_at(now) < max_age
    }

    /// Serializes into the compact blob stored by the backend:
    /// `{"ts":<unix seconds>,"repos":[{"o":"owner","n":"name"}, ...]}`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let proxy = SnapshotProxy::from(self);
        Ok(to_json(&proxy).or_raise(|| ErrorKind::InvalidData("snapshot"))?.into_bytes())
    }

    /// Decodes a stored blob. Sub-second precision isn't stored, so a
    /// decoded timestamp is truncated to whole seconds.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let json = std::str::from_utf8(bytes).or_raise(|| ErrorKind::InvalidData("encoding"))?;
        let proxy = from_json::<SnapshotProxy>(json).or_raise(|| ErrorKind::InvalidData("snapshot"))?;
        Self::try_from(proxy)
    }
}

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
struct RecordProxy {
    #[facet(rename = "o")]
    owner: String,
    #[facet(rename = "n")]
    name: String,
}
impl From<&RepositoryRecord> for RecordProxy {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            owner: record.owner().to_string(),
            name: record.name().to_string(),
        }
    }
}

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
struct SnapshotProxy {
    #[facet(rename = "ts")]
    timestamp: Option<i64>,
    #[facet(rename = "repos")]
    records: Option<Vec<RecordProxy>>,
}
impl From<&FeedSnapshot> for SnapshotProxy {
    fn from(snapshot: &FeedSnapshot) -> Self {
        Self {
            timestamp: Some(snapshot.timestamp.unix_timestamp()),
            records: Some(snapshot.records.iter().map(RecordProxy::from).collect()),
        }
    }
}
impl TryFrom<SnapshotProxy> for FeedSnapshot {
    type Error = crate::error::Error;
    fn try_from(proxy: SnapshotProxy) -> Result<Self> {
        // Both fields are required: a blob missing either one is corrupt, not empty.
        let (Some(timestamp), Some(proxies)) = (proxy.timestamp, proxy.records) else {
            exn::bail!(ErrorKind::InvalidData("snapshot"));
        };
        let timestamp = UtcDateTime::from_unix_timestamp(timestamp).or_raise(|| ErrorKind::InvalidData("timestamp"))?;
        let mut records = Vec::with_capacity(proxies.len());
        for record in proxies {
            if record.owner.is_empty() || record.name.is_empty() {
                exn::bail!(ErrorKind::InvalidData("repository record"));
            }
            records.push(RepositoryRecord::new(record.owner, record.name));
        }
        Ok(Self { timestamp, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(ts: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(ts).unwrap()
    }

    #[test]
    fn test_blob_format() {
        let snapshot = FeedSnapshot::new(at(1_700_000_000), vec![RepositoryRecord::new("alice", "proj1")]);
        let blob = String::from_utf8(snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(blob, r#"{"ts":1700000000,"repos":[{"o":"alice","n":"proj1"}]}"#);
    }

    #[test]
    fn test_decode_preserves_order_and_content() {
        let records = vec![
            RepositoryRecord::new("zeta", "last-alphabetically"),
            RepositoryRecord::new("alice", "proj1"),
            RepositoryRecord::new("bob", "quotes\"and<markup>"),
        ];
        let snapshot = FeedSnapshot::new(at(1_700_000_000), records);
        let decoded = FeedSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_decode_truncates_subsecond_timestamp() {
        let timestamp = at(1_700_000_000) + Duration::milliseconds(250);
        let snapshot = FeedSnapshot::new(timestamp, Vec::new());
        let decoded = FeedSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.timestamp, at(1_700_000_000));
        assert!(decoded.records.is_empty());
    }

    #[rstest]
    #[case::empty(b"")]
    #[case::not_json(b"<html></html>")]
    #[case::truncated(br#"{"ts":1700000000,"repos":[{"o":"alice""#)]
    #[case::missing_records(br#"{"ts":1700000000}"#)]
    #[case::missing_timestamp(br#"{"repos":[{"o":"alice","n":"proj1"}]}"#)]
    #[case::null_records(br#"{"ts":1700000000,"repos":null}"#)]
    #[case::wrong_type(br#"{"ts":"yesterday","repos":[]}"#)]
    #[case::empty_owner(br#"{"ts":1700000000,"repos":[{"o":"","n":"proj1"}]}"#)]
    #[case::invalid_utf8(&[0xff, 0xfe, 0xfd])]
    fn test_decode_rejects_corrupt_blobs(#[case] blob: &[u8]) {
        let err = FeedSnapshot::from_bytes(blob).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData(_)));
    }

    #[test]
    fn test_decode_keeps_explicitly_empty_ranking() {
        let decoded = FeedSnapshot::from_bytes(br#"{"ts":1700000000,"repos":[]}"#).unwrap();
        assert_eq!(decoded, FeedSnapshot::new(at(1_700_000_000), Vec::new()));
    }

    #[rstest]
    #[case::fresh(0, true)]
    #[case::just_under(2 * 3600 - 1, true)]
    #[case::exactly(2 * 3600, false)]
    #[case::stale(2 * 3600 + 60, false)]
    #[case::future(-600, true)]
    fn test_validity(#[case] age_seconds: i64, #[case] valid: bool) {
        let snapshot = FeedSnapshot::new(at(1_700_000_000), Vec::new());
        let now = at(1_700_000_000 + age_seconds);
        assert_eq!(snapshot.is_valid_at(now, Duration::hours(2)), valid);
        assert_eq!(snapshot.age_at(now), Duration::seconds(age_seconds));
    }
}
