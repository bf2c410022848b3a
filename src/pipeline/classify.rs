use crate::config::{CategoryRule, Config};

/// Keyword-table category assignment. Rules are checked in order and the
/// first rule with a keyword contained in the text wins.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
    default_category: String,
}

impl Classifier {
    pub fn new(rules: &[CategoryRule], default_category: impl Into<String>) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CategoryRule {
                category: rule.category.clone(),
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            rules,
            default_category: default_category.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.category_rules, config.default_category.clone())
    }

    pub fn classify(&self, title: &str, summary: &str) -> &str {
        let text = format!("{} {}", title, summary).to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|rule| rule.category.as_str())
            .unwrap_or(&self.default_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::from_config(&Config::default())
    }

    #[test]
    fn test_programmatic_headline_is_adtech() {
        assert_eq!(
            classifier().classify("Programmatic ad spend up 20%", ""),
            "adtech"
        );
    }

    #[test]
    fn test_summary_text_participates() {
        assert_eq!(
            classifier().classify("Quarterly results", "Braze posts record revenue"),
            "martech"
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "attribution" is martech, but "programmatic" appears in the earlier adtech rule.
        assert_eq!(
            classifier().classify("Programmatic attribution tools", ""),
            "adtech"
        );
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        let c = classifier();
        assert_eq!(c.classify("Quarterly earnings call", "Shares fell"), "general");
    }

    #[test]
    fn test_keywords_match_case_insensitively() {
        let rules = vec![CategoryRule {
            category: "privacy".to_string(),
            keywords: vec!["SKAdNetwork".to_string()],
        }];
        let c = Classifier::new(&rules, "trend");
        assert_eq!(c.classify("Apple updates skadnetwork", ""), "privacy");
        assert_eq!(c.classify("Nothing relevant", ""), "trend");
    }

    #[test]
    fn test_deterministic() {
        let c = classifier();
        let first = c.classify("Retail media network launches", "New shoppable ads");
        for _ in 0..10 {
            assert_eq!(c.classify("Retail media network launches", "New shoppable ads"), first);
        }
    }
}
