//! Name synthesis for documents created without an explicit name

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// System tag carrying the owning stack's name
pub const STACK_NAME_TAG: &str = "aws:cloudformation:stack-name";

const RESERVED_PREFIXES: [&str; 3] = ["aws-", "amazon", "amzn"];
const DEFAULT_NAME_PREFIX: &str = "document";
const NAME_DELIMITER: &str = "-";
const NAME_MAX_LENGTH: usize = 128;
const SUFFIX_LENGTH: usize = 12;
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a document name when the model omits one
///
/// Implementations must be deterministic: the same tags and request token
/// always produce the same name, so a retried invocation reuses it.
pub trait NameSynthesizer: Send + Sync {
    fn synthesize_name(&self, system_tags: &BTreeMap<String, String>, request_token: &str)
    -> String;
}

/// `<stack-name>-document-<suffix>`, or `document-<suffix>` without a usable stack name
#[derive(Debug, Clone, Copy, Default)]
pub struct StackNameSynthesizer;

impl StackNameSynthesizer {
    /// Stack name reduced to the characters a document name accepts
    fn stack_name(system_tags: &BTreeMap<String, String>) -> Option<String> {
        let stack_name: String = system_tags
            .get(STACK_NAME_TAG)?
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect();
        let lowered = stack_name.to_ascii_lowercase();

        // Names with reserved prefixes are rejected by the service
        if stack_name.is_empty()
            || RESERVED_PREFIXES
                .iter()
                .any(|prefix| lowered.starts_with(prefix))
        {
            return None;
        }

        Some(stack_name)
    }

    fn suffix(request_token: &str) -> String {
        let digest = Sha256::digest(request_token.as_bytes());
        digest
            .iter()
            .take(SUFFIX_LENGTH)
            .map(|b| ALPHANUMERIC[usize::from(*b) % ALPHANUMERIC.len()] as char)
            .collect()
    }
}

impl NameSynthesizer for StackNameSynthesizer {
    fn synthesize_name(
        &self,
        system_tags: &BTreeMap<String, String>,
        request_token: &str,
    ) -> String {
        let mut prefix = String::new();
        if let Some(stack_name) = Self::stack_name(system_tags) {
            prefix.push_str(&stack_name);
            prefix.push_str(NAME_DELIMITER);
        }
        prefix.push_str(DEFAULT_NAME_PREFIX);

        let max_prefix = NAME_MAX_LENGTH - (SUFFIX_LENGTH + NAME_DELIMITER.len());
        // ASCII only, so truncating by bytes stays on a char boundary
        prefix.truncate(max_prefix);

        format!("{}{}{}", prefix, NAME_DELIMITER, Self::suffix(request_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(stack: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(STACK_NAME_TAG.to_string(), stack.to_string())])
    }

    #[test]
    fn test_stack_prefix() {
        let name = StackNameSynthesizer.synthesize_name(&tags("mystack"), "token-1");
        assert!(name.starts_with("mystack-document-"));
        assert_eq!(name.len(), "mystack-document-".len() + SUFFIX_LENGTH);
    }

    #[test]
    fn test_deterministic_per_token() {
        let a = StackNameSynthesizer.synthesize_name(&tags("mystack"), "token-1");
        let b = StackNameSynthesizer.synthesize_name(&tags("mystack"), "token-1");
        let c = StackNameSynthesizer.synthesize_name(&tags("mystack"), "token-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reserved_stack_prefix_is_dropped() {
        for stack in ["aws-infra", "Amazon-Stack", "AMZN1"] {
            let name = StackNameSynthesizer.synthesize_name(&tags(stack), "token");
            assert!(name.starts_with("document-"), "{name}");
        }
    }

    #[test]
    fn test_no_system_tags() {
        let name = StackNameSynthesizer.synthesize_name(&BTreeMap::new(), "token");
        assert!(name.starts_with("document-"));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_non_ascii_stack_name_stays_within_limit() {
        let stack = format!("{}é", "s".repeat(120));
        let name = StackNameSynthesizer.synthesize_name(&tags(&stack), "token");
        assert!(name.len() <= NAME_MAX_LENGTH, "{} bytes", name.len());
        assert!(name.is_ascii());

        let wide = "ドキュメント".repeat(30);
        let name = StackNameSynthesizer.synthesize_name(&tags(&wide), "token");
        assert!(name.starts_with("document-"), "{name}");
        assert_eq!(name.len(), "document-".len() + SUFFIX_LENGTH);
    }

    #[test]
    fn test_invalid_characters_are_dropped() {
        let name = StackNameSynthesizer.synthesize_name(&tags("my stack/prod"), "token");
        assert!(name.starts_with("mystackprod-document-"), "{name}");
    }

    #[test]
    fn test_long_stack_name_is_truncated() {
        let stack = "s".repeat(200);
        let name = StackNameSynthesizer.synthesize_name(&tags(&stack), "token");
        assert_eq!(name.len(), NAME_MAX_LENGTH);
    }
}
