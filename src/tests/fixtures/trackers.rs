// Shared test fixtures for trackers and time.

use crate::modules::trackers::core::tracker::{Meta, Tracker};
use crate::shared::core::primitives::FixedClock;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn pinned_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    ))
}

/// Builds hydrated trackers as a store would return them.
pub struct TrackerBuilder {
    inner: Tracker,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u32,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TrackerBuilder {
    pub fn new() -> Self {
        Self {
            inner: Tracker {
                id: 1,
                start: at("2020-05-15T00:00:00Z"),
                end: Some(at("2020-05-15T10:00:00Z")),
                name: "test_time_tracker_1".to_string(),
                meta: Meta::new(),
            },
            deleted: false,
            created_at: at("2020-01-01T00:00:01Z"),
            updated_at: at("2020-01-01T00:00:01Z"),
            version: 1,
        }
    }

    pub fn id(mut self, v: u64) -> Self {
        self.inner.id = v;
        self
    }

    pub fn start(mut self, v: DateTime<Utc>) -> Self {
        self.inner.start = v;
        self
    }

    pub fn end(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.inner.end = v;
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn deleted(mut self, v: bool) -> Self {
        self.deleted = v;
        self
    }

    pub fn created_at(mut self, v: DateTime<Utc>) -> Self {
        self.created_at = v;
        self
    }

    pub fn updated_at(mut self, v: DateTime<Utc>) -> Self {
        self.updated_at = v;
        self
    }

    pub fn version(mut self, v: u32) -> Self {
        self.version = v;
        self
    }

    pub fn build(self) -> Tracker {
        Tracker {
            meta: Meta::hydrate(self.deleted, self.created_at, self.updated_at, self.version),
            ..self.inner
        }
    }
}

#[cfg(test)]
mod tracker_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_build_a_hydrated_tracker_by_default() {
        let tracker = TrackerBuilder::new().build();
        assert_eq!(tracker.id, 1);
        assert_eq!(tracker.name, "test_time_tracker_1");
        assert_eq!(tracker.meta.version(), 1);
        assert!(!tracker.meta.deleted());
        assert_eq!(tracker.meta.created_at(), Some(at("2020-01-01T00:00:01Z")));
    }

    #[rstest]
    fn setters_override_all_fields() {
        let tracker = TrackerBuilder::new()
            .id(9)
            .start(at("2020-05-16T00:00:00Z"))
            .end(None)
            .name("custom")
            .deleted(true)
            .created_at(at("2020-02-01T00:00:00Z"))
            .updated_at(at("2020-02-02T00:00:00Z"))
            .version(4)
            .build();
        assert_eq!(tracker.id, 9);
        assert_eq!(tracker.start, at("2020-05-16T00:00:00Z"));
        assert_eq!(tracker.end, None);
        assert_eq!(tracker.name, "custom");
        assert!(tracker.meta.deleted());
        assert_eq!(tracker.meta.created_at(), Some(at("2020-02-01T00:00:00Z")));
        assert_eq!(tracker.meta.updated_at(), Some(at("2020-02-02T00:00:00Z")));
        assert_eq!(tracker.meta.version(), 4);
    }
}
