//! Robots.txt parser implementation
//!
//! Only the first `User-agent: *` block is read. Every line after it is
//! collected until the next `User-agent` line, and the rest of the document is
//! ignored, including any later wildcard block.

use crate::url::path_and_query;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Position of the line scanner relative to the wildcard block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No `User-agent: *` line seen yet
    PreApplicable,
    /// Inside the wildcard block, collecting directives
    Started,
    /// Wildcard block closed by another `User-agent` line
    Finished,
}

/// A compiled robots.txt path pattern
///
/// `*` matches any run of characters and a trailing `$` anchors the end of the
/// path. Everything else is literal, and the pattern is anchored at the start
/// of the path, so `/ads` matches `/ads/banner` but not `/recipe/ads-free`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
}

impl PathPattern {
    /// Compiles a pattern; returns `None` if it is empty or cannot be compiled
    pub fn compile(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (body, anchored_end) = match raw.strip_suffix('$') {
            Some(body) => (body, true),
            None => (raw, false),
        };

        let mut source = String::from("^");
        source.push_str(
            &body
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*"),
        );
        if anchored_end {
            source.push('$');
        }

        match Regex::new(&source) {
            Ok(regex) => Some(Self {
                raw: raw.to_string(),
                regex,
            }),
            Err(e) => {
                tracing::warn!("Skipping robots.txt pattern {:?}: {}", raw, e);
                None
            }
        }
    }

    /// The pattern as written in robots.txt
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Checks a path (optionally with `?query`) against the pattern
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Rules from the wildcard block of a robots.txt document
///
/// Built once per run and never modified afterwards. `Allow` patterns are
/// parsed and kept but do not override a `Disallow` match.
#[derive(Debug, Clone, Default)]
pub struct PolicyRuleSet {
    allowed: Vec<PathPattern>,
    disallowed: Vec<PathPattern>,
    crawl_delay: Option<Duration>,
}

impl PolicyRuleSet {
    /// Creates a rule set that restricts nothing
    ///
    /// Used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses the wildcard block of a robots.txt document
    ///
    /// # Example
    ///
    /// ```
    /// use larder::robots::PolicyRuleSet;
    ///
    /// let rules = PolicyRuleSet::from_content("User-agent: *\nDisallow: /ads\n");
    /// assert!(rules.is_disallowed("/ads/banner"));
    /// assert!(!rules.is_disallowed("/recipe/ads-free"));
    /// ```
    pub fn from_content(content: &str) -> Self {
        let mut rules = Self::default();
        let mut state = ScanState::PreApplicable;

        for line in content.lines() {
            let line = strip_comment(line);

            match state {
                ScanState::PreApplicable => {
                    if is_wildcard_agent(line) {
                        state = ScanState::Started;
                    }
                }
                ScanState::Started => {
                    if is_agent_line(line) {
                        state = ScanState::Finished;
                    } else if !line.is_empty() {
                        rules.apply_directive(line);
                    }
                }
                ScanState::Finished => break,
            }
        }

        tracing::debug!(
            "Parsed robots.txt: {} allow, {} disallow, crawl delay {:?}",
            rules.allowed.len(),
            rules.disallowed.len(),
            rules.crawl_delay
        );

        rules
    }

    /// Patterns from `Allow:` lines, in document order
    pub fn allowed(&self) -> &[PathPattern] {
        &self.allowed
    }

    /// Patterns from `Disallow:` lines, in document order
    pub fn disallowed(&self) -> &[PathPattern] {
        &self.disallowed
    }

    /// Delay requested between consecutive fetches, if any
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }

    /// Returns true if the path matches any disallow pattern
    pub fn is_disallowed(&self, path: &str) -> bool {
        self.disallowed.iter().any(|pattern| pattern.matches(path))
    }

    /// Returns the first disallow pattern matching the URL's path and query
    pub fn blocking_pattern(&self, url: &Url) -> Option<&PathPattern> {
        let target = path_and_query(url);
        self.disallowed
            .iter()
            .find(|pattern| pattern.matches(&target))
    }

    fn apply_directive(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            tracing::debug!("Ignoring robots.txt line without directive: {:?}", line);
            return;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "disallow" => self.disallowed.extend(PathPattern::compile(value)),
            "allow" => self.allowed.extend(PathPattern::compile(value)),
            "crawl-delay" => match value.parse::<f64>().map(Duration::try_from_secs_f64) {
                Ok(Ok(delay)) => self.crawl_delay = Some(delay),
                _ => tracing::debug!("Ignoring invalid crawl delay {:?}", value),
            },
            other => tracing::trace!("Ignoring robots.txt directive {:?}", other),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((before, _)) => before.trim(),
        None => line.trim(),
    }
}

fn is_agent_line(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("user-agent"))
}

fn is_wildcard_agent(line: &str) -> bool {
    line.split_once(':').is_some_and(|(key, value)| {
        key.trim().eq_ignore_ascii_case("user-agent") && value.trim() == "*"
    })
}
