//! Canned Replies
//!
//! Keyword rules for ordinary chat text. Rules are evaluated in declaration
//! order and the first rule with any matching keyword wins; match position and
//! keyword length play no part.

/// A single keyword rule
#[derive(Clone, Debug)]
pub struct ReplyRule {
    /// Lowercase keywords; any substring hit selects the rule
    pub keywords: &'static [&'static str],
    /// Reply text
    pub reply: &'static str,
}

/// Reply used when no rule matches
pub const DEFAULT_REPLY: &str = "I see. Could you tell me more about that?";

/// Built-in rules, in evaluation order
pub const DEFAULT_RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["hello", "hi"],
        reply: "Hello! How can I assist you today?",
    },
    ReplyRule {
        keywords: &["help"],
        reply: "I'm here to help! What would you like to know?",
    },
    ReplyRule {
        keywords: &["thank"],
        reply: "You're welcome! Do you have any other questions?",
    },
    ReplyRule {
        keywords: &["bye"],
        reply: "Goodbye! Have a great day!",
    },
];

/// Ordered rule list with a fallback
#[derive(Clone, Debug)]
pub struct ReplyRules {
    rules: Vec<ReplyRule>,
    fallback: &'static str,
}

impl Default for ReplyRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
            fallback: DEFAULT_REPLY,
        }
    }
}

impl ReplyRules {
    /// Create a rule set from explicit rules and fallback
    pub fn new(rules: Vec<ReplyRule>, fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: ReplyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Pick the reply for `text`
    #[must_use]
    pub fn respond(&self, text: &str) -> &'static str {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
            .map_or(self.fallback, |rule| rule.reply)
    }

    /// Number of rules (excluding the fallback)
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether only the fallback is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Reply for `text` using the built-in rules
#[must_use]
pub fn respond(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    DEFAULT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(DEFAULT_REPLY, |rule| rule.reply)
}
