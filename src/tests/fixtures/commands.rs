// Shared test fixtures for tracker commands.
// The create command defaults come from json/create_tracker.json.

use crate::modules::trackers::use_cases::create_tracker::command::CreateTracker;
use crate::modules::trackers::use_cases::update_tracker::command::UpdateTracker;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;

// JSON -> DTO (transport shape)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrackerDto {
    pub start: DateTime<Utc>,
    pub name: String,
}

pub struct CreateTrackerBuilder {
    inner: CreateTracker,
}

impl Default for CreateTrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl CreateTrackerBuilder {
    pub fn new() -> Self {
        let json_str =
            fs::read_to_string("./src/tests/fixtures/json/create_tracker.json").unwrap();
        let dto: CreateTrackerDto = serde_json::from_str(&json_str).unwrap();
        Self {
            inner: CreateTracker {
                start: dto.start,
                name: dto.name,
            },
        }
    }

    pub fn start(mut self, v: DateTime<Utc>) -> Self {
        self.inner.start = v;
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn build(self) -> CreateTracker {
        self.inner
    }
}

/// Defaults to "change nothing" at version 1.
pub struct UpdateTrackerBuilder {
    inner: UpdateTracker,
}

#[allow(dead_code)]
impl UpdateTrackerBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            inner: UpdateTracker {
                id,
                name: None,
                end: None,
                version: 1,
            },
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = Some(v.into());
        self
    }

    pub fn end(mut self, v: DateTime<Utc>) -> Self {
        self.inner.end = Some(v);
        self
    }

    pub fn version(mut self, v: u32) -> Self {
        self.inner.version = v;
        self
    }

    pub fn build(self) -> UpdateTracker {
        self.inner
    }
}

#[cfg(test)]
mod tracker_command_builder_tests {
    use super::*;
    use crate::tests::fixtures::trackers::at;
    use rstest::rstest;

    #[rstest]
    fn default_delegates_to_new_and_parses_json() {
        let built = CreateTrackerBuilder::default().build();
        assert_eq!(built.start, at("2020-05-15T00:00:00Z"));
        assert_eq!(built.name, "t1");
    }

    #[rstest]
    fn setters_override_the_create_command() {
        let built = CreateTrackerBuilder::new()
            .start(at("2020-05-16T00:00:00Z"))
            .name("t2")
            .build();
        assert_eq!(built.start, at("2020-05-16T00:00:00Z"));
        assert_eq!(built.name, "t2");
    }

    #[rstest]
    fn update_builder_changes_nothing_by_default() {
        let built = UpdateTrackerBuilder::new(4).build();
        assert_eq!(
            built,
            UpdateTracker {
                id: 4,
                name: None,
                end: None,
                version: 1,
            }
        );
    }
}
