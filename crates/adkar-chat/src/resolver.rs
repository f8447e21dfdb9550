//! Reply resolution: turning user text into assistant reply text.
//!
//! Defines the `ReplyResolver` async trait and the local keyword variant.
//! The remote variant lives in [`crate::remote`].

use async_trait::async_trait;

use crate::catalog::{ReplyCatalog, ReplyRule};
use crate::error::ChatError;

/// Produces reply text for a non-empty user input.
#[async_trait]
pub trait ReplyResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Resolve `input` to reply text.
    ///
    /// Callers pass trimmed, non-empty input.
    async fn resolve(&self, input: &str) -> Result<String, ChatError>;
}

// =============================================================================
// KeywordResolver
// =============================================================================

/// First-match keyword lookup over a [`ReplyCatalog`].
///
/// Lowercases the input, scans rules in catalog order, and returns the reply
/// of the first rule with any keyword as a substring. Falls back to the
/// catalog's default reply. Never fails.
pub struct KeywordResolver {
    catalog: ReplyCatalog,
}

impl KeywordResolver {
    pub fn new(catalog: ReplyCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ReplyCatalog {
        &self.catalog
    }

    /// The rule that would answer `input`, if any.
    pub fn match_rule(&self, input: &str) -> Option<&ReplyRule> {
        let lowered = input.to_lowercase();
        self.catalog.rules().iter().find(|r| r.matches(&lowered))
    }

    /// Synchronous form of [`ReplyResolver::resolve`].
    pub fn reply_for(&self, input: &str) -> &str {
        match self.match_rule(input) {
            Some(rule) => rule.reply(),
            None => self.catalog.default_reply(),
        }
    }
}

impl Default for KeywordResolver {
    fn default() -> Self {
        Self::new(ReplyCatalog::builtin())
    }
}

#[async_trait]
impl ReplyResolver for KeywordResolver {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn resolve(&self, input: &str) -> Result<String, ChatError> {
        let reply = self.reply_for(input);
        tracing::debug!(
            matched = self.match_rule(input).is_some(),
            reply_len = reply.len(),
            "Keyword reply selected"
        );
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_reply(keyword: &str) -> String {
        let catalog = ReplyCatalog::builtin();
        catalog
            .rules()
            .iter()
            .find(|r| r.keywords().iter().any(|k| k == keyword))
            .map(|r| r.reply().to_string())
            .unwrap()
    }

    fn small_catalog() -> ReplyCatalog {
        ReplyCatalog::new(
            vec![
                ReplyRule::new(["change"], "generic change").unwrap(),
                ReplyRule::new(["change curve", "kubler"], "curve").unwrap(),
                ReplyRule::new(["ab"], "ab rule").unwrap(),
            ],
            "fallback",
        )
        .unwrap()
    }

    // ---- Matching ----

    #[tokio::test]
    async fn test_adkar_sentence_resolves_to_adkar_reply() {
        let resolver = KeywordResolver::default();
        let reply = resolver.resolve("Tell me about ADKAR please").await.unwrap();
        assert_eq!(reply, builtin_reply("adkar"));
    }

    #[tokio::test]
    async fn test_kotter_resolves_to_kotter_reply() {
        let resolver = KeywordResolver::default();
        let reply = resolver.resolve("Kotter").await.unwrap();
        assert_eq!(reply, builtin_reply("kotter"));
    }

    #[tokio::test]
    async fn test_no_match_returns_default() {
        let resolver = KeywordResolver::default();
        let reply = resolver.resolve("what's the weather").await.unwrap();
        assert_eq!(reply, ReplyCatalog::builtin().default_reply());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let resolver = KeywordResolver::default();
        assert_eq!(resolver.reply_for("LEWIN"), builtin_reply("lewin"));
        assert_eq!(resolver.reply_for("lewin"), builtin_reply("lewin"));
        assert_eq!(resolver.reply_for("LeWiN?"), builtin_reply("lewin"));
    }

    #[test]
    fn test_match_is_substring_not_word() {
        let resolver = KeywordResolver::default();
        assert_eq!(
            resolver.reply_for("people keep resisting"),
            builtin_reply("resist")
        );
    }

    // ---- Tie-break ----

    #[test]
    fn test_earliest_rule_wins_over_more_specific() {
        let resolver = KeywordResolver::new(small_catalog());
        // "change curve" is the longer match but "change" is defined first.
        assert_eq!(resolver.reply_for("explain the change curve"), "generic change");
    }

    #[test]
    fn test_earliest_rule_wins_in_builtin_catalog() {
        let resolver = KeywordResolver::default();
        assert_eq!(
            resolver.reply_for("compare Kotter with ADKAR"),
            builtin_reply("adkar")
        );
    }

    #[test]
    fn test_any_keyword_of_a_rule_matches() {
        let resolver = KeywordResolver::new(small_catalog());
        assert_eq!(resolver.reply_for("Kubler-Ross"), "curve");
    }

    #[test]
    fn test_keyword_inside_other_word_matches() {
        let resolver = KeywordResolver::new(small_catalog());
        assert_eq!(resolver.reply_for("cabin"), "ab rule");
    }

    #[test]
    fn test_match_rule_none_for_unmatched() {
        let resolver = KeywordResolver::new(small_catalog());
        assert!(resolver.match_rule("nothing here").is_none());
        assert_eq!(resolver.reply_for("nothing here"), "fallback");
    }

    #[test]
    fn test_empty_catalog_always_falls_back() {
        let resolver = KeywordResolver::new(ReplyCatalog::new(vec![], "only this").unwrap());
        assert_eq!(resolver.reply_for("adkar"), "only this");
    }

    #[test]
    fn test_resolver_is_deterministic() {
        let resolver = KeywordResolver::default();
        let first = resolver.reply_for("How do I handle resistance?").to_string();
        for _ in 0..10 {
            assert_eq!(resolver.reply_for("How do I handle resistance?"), first);
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(KeywordResolver::default().name(), "keyword");
    }
}
