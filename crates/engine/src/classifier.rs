use serde::{Deserialize, Serialize};
use usage_core::Category;

/// One ordered rule: a partition containing any token gets `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub category: Category,
    pub tokens: Vec<String>,
}

/// Rules are evaluated in order; the first match wins and `Commons` is
/// the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

fn default_rules() -> Vec<ClassifierRule> {
    vec![
        ClassifierRule {
            category: Category::Private,
            tokens: vec!["pi_".to_string(), "ycga".to_string(), "psych".to_string()],
        },
        ClassifierRule {
            category: Category::Scavenge,
            tokens: vec!["scavenge".to_string()],
        },
    ]
}

#[derive(Debug, Clone)]
struct CompiledRule {
    category: Category,
    tokens: Vec<String>,
}

impl CompiledRule {
    fn matches(&self, partition: &str) -> bool {
        self.tokens.iter().any(|token| partition.contains(token.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct PartitionClassifier {
    rules: Vec<CompiledRule>,
}

impl Default for PartitionClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl PartitionClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let rules = config
            .rules
            .iter()
            .map(|rule| CompiledRule {
                category: rule.category,
                // An empty token would match every partition.
                tokens: rule
                    .tokens
                    .iter()
                    .map(|token| token.trim().to_lowercase())
                    .filter(|token| !token.is_empty())
                    .collect(),
            })
            .filter(|rule| !rule.tokens.is_empty())
            .collect();
        Self { rules }
    }

    pub fn classify(&self, partition: &str) -> Category {
        let partition = partition.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&partition))
            .map(|rule| rule.category)
            .unwrap_or(Category::Commons)
    }

    /// Every rule category `partition` matches, in rule order.
    pub fn matching_categories(&self, partition: &str) -> Vec<Category> {
        let partition = partition.to_lowercase();
        let mut categories = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.matches(&partition)) {
            if !categories.contains(&rule.category) {
                categories.push(rule.category);
            }
        }
        categories
    }
}
