// Topic lexicon: the term sets the relevance rules match against.
//
// The built-in lexicon targets mother–daughter relationships in Chinese
// film reviews. It can be replaced wholesale by a JSON file with the same
// field names (see `TopicLexicon::from_file`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// All term sets used by the four-tier relevance cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLexicon {
    /// Unambiguous compound phrases for the relationship itself,
    /// including colloquial/dialect variants and honorifics.
    pub direct_terms: Vec<String>,
    /// Kinship terms for the first party (mother), including synonyms,
    /// honorifics and step-relations.
    pub role_a_terms: Vec<String>,
    /// Kinship terms for the second party (daughter), including pet names
    /// and formal terms. Must be disjoint from `role_a_terms`.
    pub role_b_terms: Vec<String>,
    /// Third-person singular pronoun anchoring the pronoun rule.
    pub pronoun: String,
    /// Short informal form of the role-A term.
    pub role_a_short: String,
    /// Full form of the role-B term.
    pub role_b_full: String,
    /// Genre/narrative markers ("family drama", "home-life subplot").
    pub genre_markers: Vec<String>,
    /// Role-A indicators accepted by the genre rule: the generic kinship
    /// character and the short informal term.
    pub role_a_indicators: Vec<String>,
}

impl TopicLexicon {
    /// The built-in mother–daughter lexicon.
    pub fn mother_daughter() -> Self {
        Self {
            direct_terms: strings(&[
                "母女", "母子", "母女关系", "母女情", "母女线", "母女档", "母爱", "亲子关系",
                "母职", "妈妈们", "母亲角色", "单亲妈妈", "独生女", "母女俩", "娘亲", "囡囡",
                "小棉袄", "慈母", "贤女", "母性光辉", "抚养女儿", "养育女儿", "陪伴女儿",
            ]),
            role_a_terms: strings(&[
                "妈妈", "母亲", "娘", "妈", "母", "老妈", "妈咪", "娘亲", "她妈", "他妈",
                "单亲妈妈", "慈母", "母上", "母親大人", "宝妈", "母性", "养母", "继母",
            ]),
            role_b_terms: strings(&[
                "女儿", "闺女", "姑娘", "小姑娘", "丫头", "囡囡", "小棉袄", "她女儿", "他女儿",
                "独生女", "贤女", "乖女儿", "囡儿", "千金", "小丫头", "干女儿",
            ]),
            pronoun: "她".to_string(),
            role_a_short: "妈".to_string(),
            role_b_full: "女儿".to_string(),
            genre_markers: strings(&["亲情戏", "家庭线"]),
            role_a_indicators: strings(&["母", "妈"]),
        }
    }

    /// Load a lexicon from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        let lexicon: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse lexicon file {}", path.display()))?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Reject lexicons that would make a rule vacuous or ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.direct_terms.iter().any(|t| t.is_empty())
            || self.role_a_terms.iter().any(|t| t.is_empty())
            || self.role_b_terms.iter().any(|t| t.is_empty())
            || self.genre_markers.iter().any(|t| t.is_empty())
            || self.role_a_indicators.iter().any(|t| t.is_empty())
        {
            anyhow::bail!("Lexicon contains an empty term, which would match every text");
        }
        if self.pronoun.is_empty() || self.role_a_short.is_empty() || self.role_b_full.is_empty() {
            anyhow::bail!("Lexicon pronoun, role_a_short and role_b_full must be non-empty");
        }
        if let Some(shared) = self.role_a_terms.iter().find(|t| self.role_b_terms.contains(t)) {
            anyhow::bail!("Lexicon role sets must be disjoint, but '{shared}' appears in both");
        }
        Ok(())
    }
}

impl Default for TopicLexicon {
    fn default() -> Self {
        Self::mother_daughter()
    }
}

fn strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}
