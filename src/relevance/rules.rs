// Relevance rules: one tagged variant per tier of the cascade.
//
// Each rule answers a single question ("does this content satisfy me?")
// using plain substring containment. Rules hold their own term sets so
// they can be tested in isolation.

use serde::{Deserialize, Serialize};

use super::lexicon::TopicLexicon;

/// Which tier of the cascade a rule belongs to, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    DirectHit,
    CoOccurrence,
    PronounAnchored,
    GenreAnchored,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::DirectHit => "direct_hit",
            RuleKind::CoOccurrence => "co_occurrence",
            RuleKind::PronounAnchored => "pronoun_anchored",
            RuleKind::GenreAnchored => "genre_anchored",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single relevance predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Any unambiguous topic term appears.
    DirectHit { terms: Vec<String> },
    /// A role-A term and a role-B term both appear. The two sets are
    /// checked independently; each must contribute its own hit.
    CoOccurrence {
        role_a: Vec<String>,
        role_b: Vec<String>,
    },
    /// The pronoun appears together with either the short role-A term or
    /// the full role-B term.
    PronounAnchored {
        pronoun: String,
        role_a_short: String,
        role_b_full: String,
    },
    /// A genre marker appears together with a role-A indicator. Broad on
    /// purpose: it also catches reviews that merely mention a family subplot.
    GenreAnchored {
        markers: Vec<String>,
        role_a_indicators: Vec<String>,
    },
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::DirectHit { .. } => RuleKind::DirectHit,
            Rule::CoOccurrence { .. } => RuleKind::CoOccurrence,
            Rule::PronounAnchored { .. } => RuleKind::PronounAnchored,
            Rule::GenreAnchored { .. } => RuleKind::GenreAnchored,
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        match self {
            Rule::DirectHit { terms } => contains_any(content, terms),
            Rule::CoOccurrence { role_a, role_b } => {
                contains_any(content, role_a) && contains_any(content, role_b)
            }
            Rule::PronounAnchored {
                pronoun,
                role_a_short,
                role_b_full,
            } => {
                content.contains(pronoun.as_str())
                    && (content.contains(role_a_short.as_str())
                        || content.contains(role_b_full.as_str()))
            }
            Rule::GenreAnchored {
                markers,
                role_a_indicators,
            } => contains_any(content, markers) && contains_any(content, role_a_indicators),
        }
    }

    /// Build the four rules from a lexicon, in cascade order.
    pub fn cascade(lexicon: &TopicLexicon) -> Vec<Rule> {
        vec![
            Rule::DirectHit {
                terms: lexicon.direct_terms.clone(),
            },
            Rule::CoOccurrence {
                role_a: lexicon.role_a_terms.clone(),
                role_b: lexicon.role_b_terms.clone(),
            },
            Rule::PronounAnchored {
                pronoun: lexicon.pronoun.clone(),
                role_a_short: lexicon.role_a_short.clone(),
                role_b_full: lexicon.role_b_full.clone(),
            },
            Rule::GenreAnchored {
                markers: lexicon.genre_markers.clone(),
                role_a_indicators: lexicon.role_a_indicators.clone(),
            },
        ]
    }
}

fn contains_any(content: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| content.contains(t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<Rule> {
        Rule::cascade(&TopicLexicon::mother_daughter())
    }

    #[test]
    fn test_cascade_order() {
        let kinds: Vec<RuleKind> = rules().iter().map(Rule::kind).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::DirectHit,
                RuleKind::CoOccurrence,
                RuleKind::PronounAnchored,
                RuleKind::GenreAnchored,
            ]
        );
    }

    #[test]
    fn test_direct_hit() {
        assert!(rules()[0].matches("母女俩的故事让人感动"));
        assert!(!rules()[0].matches("她和妈妈一起生活"));
    }

    #[test]
    fn test_co_occurrence_needs_both_sides() {
        let rule = &rules()[1];
        assert!(rule.matches("妈妈和闺女吵了一架"));
        assert!(!rule.matches("妈妈做的饭很好吃"));
        assert!(!rule.matches("这个丫头演得很好"));
    }

    #[test]
    fn test_co_occurrence_checks_are_independent() {
        // "小姑娘" contains role-A "娘" and role-B "姑娘" at overlapping
        // positions; each set still contributes its own containment hit.
        assert!(rules()[1].matches("这个小姑娘演得很好"));
    }

    #[test]
    fn test_pronoun_either_subcheck() {
        let rule = &rules()[2];
        assert!(rule.matches("她和妈妈一起生活"));
        assert!(rule.matches("她终于理解了女儿"));
        assert!(!rule.matches("她的表演很自然"));
        assert!(!rule.matches("妈妈很伟大"));
    }

    #[test]
    fn test_genre_anchored() {
        let rule = &rules()[3];
        assert!(rule.matches("亲情戏里的母亲太真实"));
        assert!(rule.matches("家庭线写得像老妈"));
        assert!(!rule.matches("亲情戏有点多"));
        assert!(!rule.matches("母亲很温柔"));
    }
}
