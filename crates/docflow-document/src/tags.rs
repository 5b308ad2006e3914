//! Soft-fail policy for tag attachment on create

use docflow_cloud::{ProviderError, ProviderErrorKind, Tag};
use std::collections::BTreeMap;

const TAGGING_ACTIONS: [&str; 3] = [
    "ssm:AddTagsToResource",
    "ssm:RemoveTagsFromResource",
    "ssm:ListTagsForResource",
];

/// Decides whether a create failure may be retried without tags
///
/// This is the only place where a provider error is recovered locally.
/// Nothing besides tag attachment goes through it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagPolicy;

impl TagPolicy {
    pub fn new() -> Self {
        Self
    }

    /// True when `error` is attributable to tagging and tags were actually requested
    pub fn should_soft_fail_tags(
        &self,
        previous_tags: Option<&[Tag]>,
        desired_tags: &[Tag],
        error: &ProviderError,
    ) -> bool {
        if desired_tags.is_empty() {
            return false;
        }

        if let Some(previous) = previous_tags {
            if as_map(previous) == as_map(desired_tags) {
                return false;
            }
        }

        is_tagging_error(error)
    }
}

fn as_map(tags: &[Tag]) -> BTreeMap<&str, &str> {
    tags.iter()
        .map(|t| (t.key.as_str(), t.value.as_str()))
        .collect()
}

fn is_tagging_error(error: &ProviderError) -> bool {
    let access_denied =
        error.kind == ProviderErrorKind::AccessDenied || error.status_code == Some(403);

    if access_denied {
        return TAGGING_ACTIONS
            .iter()
            .any(|action| error.message.contains(action));
    }

    error.kind == ProviderErrorKind::TooManyTagsError
}
