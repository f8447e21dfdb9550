//! Reply catalog: the ordered keyword rules behind local matching.
//!
//! Order is significant. The first rule with any keyword occurring in the
//! input wins; there is no scoring and no longest-match preference.

use std::path::Path;

use serde::Deserialize;

use crate::error::ChatError;

// =============================================================================
// Built-in catalog
// =============================================================================

static BUILTIN_RULES: &[(&[&str], &str)] = &[
    (
        &["adkar"],
        "ADKAR is Prosci's individual change model. It describes the five outcomes a person \
         needs to reach for a change to stick: Awareness of the need for change, Desire to \
         support it, Knowledge of how to change, Ability to put that knowledge into practice, \
         and Reinforcement to sustain it. Diagnose which element is the first weak point and \
         focus your effort there before moving on.",
    ),
    (
        &["kotter", "8-step", "eight step", "8 step"],
        "Kotter's 8-Step Process for Leading Change: 1) create a sense of urgency, 2) build a \
         guiding coalition, 3) form a strategic vision, 4) enlist a volunteer army, 5) enable \
         action by removing barriers, 6) generate short-term wins, 7) sustain acceleration, \
         and 8) institute the change in the culture. It is an organization-level model and \
         pairs well with ADKAR for the people side.",
    ),
    (
        &["lewin", "unfreeze", "refreeze"],
        "Lewin's change model has three stages: Unfreeze (challenge the current state and \
         prepare people for change), Change (move to the new way of working with support and \
         communication), and Refreeze (embed the new behaviours in structures, rewards and \
         routines so they become the norm).",
    ),
    (
        &["mckinsey", "7-s", "7s framework", "seven-s"],
        "The McKinsey 7-S Framework looks at seven interdependent elements: Strategy, \
         Structure, Systems (the hard elements) and Shared Values, Style, Staff and Skills \
         (the soft elements). A change in one element ripples into the others, so check \
         alignment across all seven when planning a transformation.",
    ),
    (
        &["bridges", "transition model", "neutral zone"],
        "Bridges' Transition Model separates change (the external event) from transition (the \
         internal, psychological process). People move through Ending, Losing and Letting Go, \
         then the Neutral Zone, then the New Beginning. Leaders should acknowledge losses \
         openly and support people through the uncertain middle phase.",
    ),
    (
        &["kubler", "kübler", "change curve", "grief"],
        "The Change Curve, adapted from Kübler-Ross, maps typical emotional reactions to \
         change: shock, denial, frustration, depression, experiment, decision and \
         integration. Expect morale and productivity to dip before they recover, and tailor \
         communication to where people are on the curve.",
    ),
    (
        &["resist", "pushback", "push back"],
        "Resistance is a normal reaction to change and usually signals a gap in awareness or \
         desire. Listen to concerns, explain the reasons for the change, involve people in \
         shaping how it is implemented, and make sure managers are equipped to coach their \
         teams through it.",
    ),
    (
        &["communicat", "announce", "messaging"],
        "Effective change communication answers why the change is happening, what it means \
         for each audience, and what is expected of them. Repeat key messages through several \
         channels, let senders match the message (business reasons from leaders, personal \
         impact from direct managers), and create ways for people to ask questions.",
    ),
    (
        &["sponsor", "stakeholder", "leadership"],
        "Active and visible sponsorship is the strongest predictor of change success. Sponsors \
         should participate actively throughout the project, build a coalition of support \
         among other leaders, and communicate directly with employees. Map stakeholders by \
         influence and impact early so no key group is surprised.",
    ),
    (
        &["hello", "good morning", "good afternoon"],
        "Hello! I can explain change-management models such as ADKAR, Kotter's 8 steps, \
         Lewin's three stages, the McKinsey 7-S framework and Bridges' Transition Model, and \
         help with resistance, communication and sponsorship. What would you like to know?",
    ),
];

const BUILTIN_DEFAULT_REPLY: &str = "I'm not sure about that one. I can help with change \
     management topics such as the ADKAR model, Kotter's 8-step process, Lewin's change \
     model, the McKinsey 7-S framework, Bridges' Transition Model, the change curve, \
     resistance, communication and sponsorship. Try asking about one of those.";

// =============================================================================
// ReplyRule / ReplyCatalog
// =============================================================================

/// One keyword-set-to-canned-reply mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRule {
    keywords: Vec<String>,
    reply: String,
}

impl ReplyRule {
    /// Build a rule, lowercasing keywords and dropping blank ones.
    ///
    /// Fails if no usable keyword remains.
    pub fn new<I, S>(keywords: I, reply: impl Into<String>) -> Result<Self, ChatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let reply = reply.into();
        if keywords.is_empty() {
            return Err(ChatError::Catalog(format!(
                "rule has no keywords: {:?}",
                preview(&reply)
            )));
        }
        Ok(Self { keywords, reply })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Whether any keyword occurs in `lowered`, which must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Immutable ordered rule list plus the fallback reply.
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    rules: Vec<ReplyRule>,
    default_reply: String,
}

#[derive(Deserialize)]
struct CatalogFile {
    default_reply: String,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Deserialize)]
struct RuleEntry {
    keywords: Vec<String>,
    reply: String,
}

impl ReplyCatalog {
    pub fn new(rules: Vec<ReplyRule>, default_reply: impl Into<String>) -> Result<Self, ChatError> {
        let default_reply = default_reply.into();
        if default_reply.trim().is_empty() {
            return Err(ChatError::Catalog("default reply cannot be empty".to_string()));
        }
        Ok(Self {
            rules,
            default_reply,
        })
    }

    /// The built-in change-management catalog.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(keywords, reply)| ReplyRule {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                reply: reply.to_string(),
            })
            .collect();
        Self {
            rules,
            default_reply: BUILTIN_DEFAULT_REPLY.to_string(),
        }
    }

    /// Parse a catalog from TOML: `default_reply` plus `[[rules]]` tables.
    pub fn from_toml_str(content: &str) -> Result<Self, ChatError> {
        let file: CatalogFile = toml::from_str(content)?;
        let rules = file
            .rules
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                ReplyRule::new(entry.keywords, entry.reply).map_err(|e| {
                    ChatError::Catalog(format!("rule {}: {}", idx + 1, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules, file.default_reply)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            rules = catalog.len(),
            "Reply catalog loaded"
        );
        Ok(catalog)
    }

    pub fn rules(&self) -> &[ReplyRule] {
        &self.rules
    }

    pub fn default_reply(&self) -> &str {
        &self.default_reply
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}
