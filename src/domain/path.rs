//! Path Normalization
//!
//! Maps raw path tokens from a trace onto canonical node identities.

use serde::{Deserialize, Serialize};

/// One prefix-rewriting rule, applied in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StripRule {
    /// Build output tree: strip `prefix` plus the variant directory that
    /// follows it (`build/dev/`), then the first matching generated prefix.
    BuildOutput {
        prefix: String,
        #[serde(default)]
        generated: Vec<String>,
    },
    /// Vendored include tree mapped back onto logical header names.
    Prefix { prefix: String },
}

impl StripRule {
    fn apply<'a>(&self, path: &'a str) -> &'a str {
        match self {
            StripRule::BuildOutput { prefix, generated } => {
                let Some(rest) = path.strip_prefix(prefix.as_str()) else {
                    return path;
                };
                // Variant segment is only stripped when it is terminated by a separator.
                let Some(slash) = rest.find('/') else {
                    return path;
                };
                let rest = &rest[slash + 1..];
                generated
                    .iter()
                    .find_map(|g| rest.strip_prefix(g.as_str()))
                    .unwrap_or(rest)
            }
            StripRule::Prefix { prefix } => path.strip_prefix(prefix.as_str()).unwrap_or(path),
        }
    }
}

/// Rules matching the layout of a seastar-style build tree.
pub fn default_strip_rules() -> Vec<StripRule> {
    vec![
        StripRule::BuildOutput {
            prefix: "build/".to_string(),
            generated: vec!["seastar/gen/include/".to_string()],
        },
        StripRule::Prefix {
            prefix: "seastar/include/".to_string(),
        },
    ]
}

/// Settings for [`PathNormalizer`].
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Root for paths beginning with `.`
    pub base: String,
    pub strip_rules: Vec<StripRule>,
    /// Ordered list of subtrees merged into a single node.
    pub collapse: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            base: ".".to_string(),
            strip_rules: default_strip_rules(),
            collapse: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathNormalizer {
    base: String,
    strip_rules: Vec<StripRule>,
    collapse: Vec<String>,
}

impl PathNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let mut normalizer = Self {
            base: config.base,
            strip_rules: config.strip_rules,
            collapse: Vec::new(),
        };
        // Collapse targets must be fixed points of the rewrite, otherwise a
        // collapsed name would be rewritten again when it reappears.
        let collapse = config
            .collapse
            .iter()
            .map(|entry| normalizer.rewrite(entry))
            .collect();
        normalizer.collapse = collapse;
        normalizer
    }

    pub fn collapse_list(&self) -> &[String] {
        &self.collapse
    }

    /// Canonical identity for a raw trace path.
    pub fn normalize(&self, raw: &str) -> String {
        let name = self.rewrite(raw);
        for prefix in &self.collapse {
            if name.starts_with(prefix.as_str()) {
                return prefix.clone();
            }
        }
        name
    }

    fn rewrite(&self, raw: &str) -> String {
        let rooted = if raw.starts_with('.') {
            format!("{}/{}", self.base, raw)
        } else {
            raw.to_string()
        };

        // A strip rule can expose `.`/`..` segments and lexical normalization
        // can expose a strippable prefix, so run both until nothing changes.
        // Stripping only shortens a normalized path, so this terminates.
        let mut name = lexical_normalize(&rooted);
        loop {
            let stripped = self
                .strip_rules
                .iter()
                .fold(name.as_str(), |acc, rule| rule.apply(acc));
            let next = lexical_normalize(stripped);
            if next == name {
                return name;
            }
            name = next;
        }
    }
}

/// Collapse `.`/`..` segments and redundant separators without touching the
/// filesystem.
pub fn lexical_normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
