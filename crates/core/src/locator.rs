//! Resolve a free-text recording key to a catalog recording.
//!
//! Clients send whatever path they have on hand, which may have lost or
//! gained escaping on the way. Four strategies are tried in a fixed order and
//! the first one with any match wins.

use serde::Serialize;

use crate::catalog::{final_segment, Recording, RecordingCatalog};
use crate::error::CoreError;

/// One way of matching a search key against recording directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Directory equals the full key.
    ExactPath,
    /// Directory's final segment equals the key's final segment.
    TrailingSegment,
    /// Directory equals the key with backslashes doubled.
    DoubledSeparators,
    /// Case-insensitive substring match between final segments, either way.
    FuzzySegment,
}

pub const STRATEGY_ORDER: [LookupStrategy; 4] = [
    LookupStrategy::ExactPath,
    LookupStrategy::TrailingSegment,
    LookupStrategy::DoubledSeparators,
    LookupStrategy::FuzzySegment,
];

/// What one strategy looked for and how many rows it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupAttempt {
    pub strategy: LookupStrategy,
    pub pattern: String,
    pub matches: usize,
}

/// A successful lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Located {
    pub recording: Recording,
    pub strategy: LookupStrategy,
    pub attempts: Vec<LookupAttempt>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("No recording found for '{key}'")]
    NotFound {
        key: String,
        attempts: Vec<LookupAttempt>,
    },

    #[error("Catalog query failed: {0}")]
    Catalog(#[source] E),
}

/// `A\B` -> `A\\B`.
pub fn double_separators(key: &str) -> String {
    key.replace('\\', "\\\\")
}

/// Case-insensitive containment in either direction.
pub fn segments_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Find the recording for `key`, trying each [`LookupStrategy`] in order.
///
/// Within a strategy the first row in catalog order wins.
pub async fn locate<C: RecordingCatalog>(
    catalog: &C,
    key: &str,
) -> Result<Located, LookupError<C::Error>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CoreError::Validation("Recording key must not be empty".to_string()).into());
    }

    let segment = final_segment(key);
    let mut attempts = Vec::with_capacity(STRATEGY_ORDER.len());

    for strategy in STRATEGY_ORDER {
        let (pattern, found) = match strategy {
            LookupStrategy::ExactPath => (
                key.to_string(),
                catalog
                    .find_by_directory(key)
                    .await
                    .map_err(LookupError::Catalog)?,
            ),
            LookupStrategy::TrailingSegment => (
                segment.to_string(),
                if segment.is_empty() {
                    Vec::new()
                } else {
                    catalog
                        .find_by_final_segment(segment)
                        .await
                        .map_err(LookupError::Catalog)?
                },
            ),
            LookupStrategy::DoubledSeparators => {
                let doubled = double_separators(key);
                let found = if doubled == key {
                    Vec::new()
                } else {
                    catalog
                        .find_by_directory(&doubled)
                        .await
                        .map_err(LookupError::Catalog)?
                };
                (doubled, found)
            }
            LookupStrategy::FuzzySegment => {
                let all = catalog.list_all().await.map_err(LookupError::Catalog)?;
                let found = all
                    .into_iter()
                    .filter(|r| segments_overlap(segment, final_segment(&r.directory)))
                    .collect();
                (segment.to_string(), found)
            }
        };

        attempts.push(LookupAttempt {
            strategy,
            pattern,
            matches: found.len(),
        });
        tracing::debug!(?strategy, key, matches = found.len(), "Recording lookup attempt");

        if let Some(recording) = found.into_iter().next() {
            return Ok(Located {
                recording,
                strategy,
                attempts,
            });
        }
    }

    Err(LookupError::NotFound {
        key: key.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// In-memory catalog preserving insertion order.
    struct MemoryRecordings(Vec<Recording>);

    fn recording(id: i64, directory: &str) -> Recording {
        Recording {
            id,
            directory: directory.to_string(),
            bounding_box: None,
            created: None,
        }
    }

    #[async_trait]
    impl RecordingCatalog for MemoryRecordings {
        type Error = Infallible;

        async fn find_by_directory(&self, directory: &str) -> Result<Vec<Recording>, Infallible> {
            Ok(self
                .0
                .iter()
                .filter(|r| r.directory == directory)
                .cloned()
                .collect())
        }

        async fn find_by_final_segment(&self, segment: &str) -> Result<Vec<Recording>, Infallible> {
            Ok(self
                .0
                .iter()
                .filter(|r| final_segment(&r.directory) == segment)
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> Result<Vec<Recording>, Infallible> {
            Ok(self.0.clone())
        }
    }

    /// Wrapper whose segment search never matches.
    struct SegmentBlind(MemoryRecordings);

    #[async_trait]
    impl RecordingCatalog for SegmentBlind {
        type Error = Infallible;

        async fn find_by_directory(&self, directory: &str) -> Result<Vec<Recording>, Infallible> {
            self.0.find_by_directory(directory).await
        }

        async fn find_by_final_segment(&self, _segment: &str) -> Result<Vec<Recording>, Infallible> {
            Ok(Vec::new())
        }

        async fn list_all(&self) -> Result<Vec<Recording>, Infallible> {
            self.0.list_all().await
        }
    }

    #[tokio::test]
    async fn exact_path_wins_first() {
        let catalog = MemoryRecordings(vec![
            recording(1, r"Other\C"),
            recording(2, r"A\B\C"),
        ]);
        let located = locate(&catalog, r"A\B\C").await.unwrap();
        assert_eq!(located.recording.id, 2);
        assert_eq!(located.strategy, LookupStrategy::ExactPath);
        assert_eq!(located.attempts.len(), 1);
    }

    #[tokio::test]
    async fn final_segment_locates_nested_directory() {
        let catalog = MemoryRecordings(vec![recording(3, r"A\B\C")]);
        let located = locate(&catalog, "C").await.unwrap();
        assert_eq!(located.recording.id, 3);
        assert_eq!(located.strategy, LookupStrategy::TrailingSegment);
        assert_eq!(located.attempts[0].matches, 0);
    }

    #[tokio::test]
    async fn escaped_key_falls_back_to_segment() {
        // The key arrived with doubled separators; the stored path has single ones.
        let catalog = MemoryRecordings(vec![recording(4, r"A\B\C")]);
        let located = locate(&catalog, r"A\\B\\C").await.unwrap();
        assert_eq!(located.recording.id, 4);
        assert_eq!(located.strategy, LookupStrategy::TrailingSegment);
    }

    #[tokio::test]
    async fn doubled_separators_tried_after_segment_search() {
        // A catalog whose segment search misses rows stored with escaped
        // separators still resolves them through strategy 3.
        let catalog = SegmentBlind(MemoryRecordings(vec![recording(
            5,
            r"Rotterdam360\\Ladybug5plus",
        )]));
        let located = locate(&catalog, r"Rotterdam360\Ladybug5plus").await.unwrap();
        assert_eq!(located.recording.id, 5);
        assert_eq!(located.strategy, LookupStrategy::DoubledSeparators);
        assert_eq!(located.attempts[2].pattern, r"Rotterdam360\\Ladybug5plus");
    }

    #[tokio::test]
    async fn fuzzy_segment_matches_case_insensitively_both_ways() {
        let catalog = MemoryRecordings(vec![
            recording(7, r"Rotterdam360\Ladybug5plus"),
            recording(8, r"Delft\Ladybug5"),
        ]);

        let located = locate(&catalog, "ladybug5PLUS_extra").await.unwrap();
        assert_eq!(located.recording.id, 7);
        assert_eq!(located.strategy, LookupStrategy::FuzzySegment);
        assert_eq!(located.attempts.len(), 4);

        // Key contained in the candidate: first in store order wins.
        let located = locate(&catalog, "bug5").await.unwrap();
        assert_eq!(located.recording.id, 7);
    }

    #[tokio::test]
    async fn not_found_reports_every_strategy() {
        let catalog = MemoryRecordings(vec![recording(9, r"A\B")]);
        let err = locate(&catalog, r"Q\Z").await.unwrap_err();
        assert_matches!(err, LookupError::NotFound { ref attempts, .. } if attempts.len() == 4);
    }

    #[tokio::test]
    async fn blank_key_is_invalid() {
        let catalog = MemoryRecordings(vec![]);
        let err = locate(&catalog, "   ").await.unwrap_err();
        assert_matches!(err, LookupError::Invalid(CoreError::Validation(_)));
    }

    #[test]
    fn overlap_rejects_empty_segments() {
        assert!(!segments_overlap("", "abc"));
        assert!(segments_overlap("ABC", "b"));
    }
}
