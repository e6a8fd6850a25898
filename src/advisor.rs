//! Scripted "AI advisor": an ordered keyword rule table.
//!
//! Rules are evaluated top to bottom against the lowercased prompt; the first
//! rule whose keyword appears as a substring wins. No match falls back to a
//! prompt listing what the advisor can talk about.

/// One `(keyword, response)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisorRule {
    /// Stable identifier used in the activity log.
    pub id: &'static str,
    /// Lowercase substring that triggers the rule.
    pub keyword: &'static str,
    /// Canned reply.
    pub response: &'static str,
}

impl AdvisorRule {
    /// Whether this rule fires for an already-lowercased prompt.
    #[must_use]
    pub fn matches(&self, lowered: &str) -> bool {
        lowered.contains(self.keyword)
    }
}

/// Rules in priority order.
pub const RULES: [AdvisorRule; 3] = [
    AdvisorRule {
        id: "undervalued",
        keyword: "undervalued stocks",
        response: "Based on our analysis, some potentially undervalued stocks to consider are: \
                   NVDA (NVIDIA Corporation), PLTR (Palantir Technologies), and CRWD (CrowdStrike \
                   Holdings). These companies show strong growth potential in emerging tech sectors.",
    },
    AdvisorRule {
        id: "sentiment",
        keyword: "sentiment",
        response: "The overall market sentiment is currently bullish, especially in the Technology \
                   sector. However, there are some concerns in the Finance sector due to recent \
                   regulatory changes. It's important to consider both positive and negative \
                   sentiments when making investment decisions.",
    },
    AdvisorRule {
        id: "related",
        keyword: "related opportunities",
        response: "When looking at related opportunities, consider companies in supporting \
                   industries. For example, if you're interested in AI companies like NVIDIA, look \
                   into data center REITs, chip manufacturing equipment suppliers, and companies \
                   providing cooling solutions for high-performance computing.",
    },
];

/// Reply when no rule matches.
pub const FALLBACK: &str = "I can help you find undervalued stocks, analyze market sentiment, and \
                            explore related opportunities in various sectors. Could you please \
                            specify which area you'd like to focus on?";

/// First rule matching the prompt, if any.
#[must_use]
pub fn matched_rule(prompt: &str) -> Option<&'static AdvisorRule> {
    let lowered = prompt.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lowered))
}

/// Reply text for a prompt.
#[must_use]
pub fn respond(prompt: &str) -> &'static str {
    matched_rule(prompt).map_or(FALLBACK, |rule| rule.response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undervalued_prompt_mentions_nvda() {
        let reply = respond("What are some undervalued stocks?");
        assert!(reply.contains("NVDA"));
        assert!(reply.contains("CRWD"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(matched_rule("UNDERVALUED STOCKS please").map(|r| r.id), Some("undervalued"));
        assert_eq!(matched_rule("Market SENTIMENT?").map(|r| r.id), Some("sentiment"));
    }

    #[test]
    fn earlier_rule_wins_when_several_match() {
        let prompt = "sentiment on undervalued stocks and related opportunities";
        assert_eq!(matched_rule(prompt).map(|r| r.id), Some("undervalued"));
        let prompt = "sentiment of related opportunities";
        assert_eq!(matched_rule(prompt).map(|r| r.id), Some("sentiment"));
    }

    #[test]
    fn related_rule_needs_full_phrase() {
        assert_eq!(
            matched_rule("show related opportunities").map(|r| r.id),
            Some("related")
        );
        assert!(matched_rule("related stuff").is_none());
    }

    #[test]
    fn partial_keyword_falls_back() {
        assert_eq!(respond("any undervalued picks?"), FALLBACK);
        assert_eq!(respond(""), FALLBACK);
    }

    #[test]
    fn responses_render_on_single_lines() {
        for rule in RULES {
            assert!(!rule.response.contains('\n'));
            assert!(!rule.response.contains("  "), "{}", rule.id);
        }
        assert!(!FALLBACK.contains("  "));
    }
}
