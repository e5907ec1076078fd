//! Structured path patterns.
//!
//! A collection's files are described by an ordered list of segments instead
//! of a hand-concatenated regular expression:
//!
//! ```text
//! {root:docs}/{lang:[a-z]{2}}/{index:\d+}-{name:[\w-]+}\.mdx?
//! └─ Root ──┘ └─ Capture ───┘ └─Capture┘ └─ Capture ─┘└ Raw ┘
//! ```
//!
//! The root segment names the directory scanning starts from and must come
//! first. Captures named `name`, `index` and `lang` become entry properties.
//!
//! # Example
//!
//! ```ignore
//! let pattern = PathPattern::root("pages").any().raw(r"\.mdx?");
//! let compiled = pattern.compile()?;
//! assert_eq!(compiled.scan_dir(), "pages");
//! assert!(compiled.matches("pages/guide/setup.md").is_some());
//! ```

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Pattern construction and compilation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error(
        "the content pattern must start with the root directory, e.g. `{{root:pages}}/{{any}}\\.mdx?`"
    )]
    MissingRoot,

    #[error("the root directory must be the first segment of the pattern")]
    RootNotFirst,

    #[error("the root directory `{0}` contains no word characters")]
    EmptyRoot(String),

    #[error("capture group `{0}` is declared more than once")]
    DuplicateGroup(String),

    #[error("`{0}` is not a valid capture group name")]
    InvalidGroupName(String),

    #[error("unterminated `{{{0}` token")]
    Unterminated(String),

    #[error("unknown pattern token `{{{0}}}`")]
    UnknownToken(String),

    #[error("invalid regular expression: {0}")]
    Regex(String),
}

// ============================================================================
// Segments
// ============================================================================

/// Named captures with a meaning for collection entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Display name override, also used for the entry key.
    Name,
    /// Numeric sort index.
    SortIndex,
    /// Language code.
    LangCode,
    /// Any other named group; constrains matching only.
    Custom(String),
}

impl Capture {
    /// Regex group name.
    pub fn group_name(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::SortIndex => "sortIndex",
            Self::LangCode => "langCode",
            Self::Custom(name) => name,
        }
    }

    /// Template keyword.
    fn keyword(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::SortIndex => "index",
            Self::LangCode => "lang",
            Self::Custom(_) => "group",
        }
    }
}

/// One element of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Directory scanning starts from, relative to the base path.
    Root(String),
    /// Literal text, escaped on compilation.
    Literal(String),
    /// Regular expression fragment, used verbatim.
    Raw(String),
    /// Anything, including `/`.
    Any,
    /// Named capture group.
    Capture(Capture, String),
}

// ============================================================================
// PathPattern
// ============================================================================

/// Ordered list of segments describing the files of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Start a pattern at a root directory.
    pub fn root(dir: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Root(dir.into())],
        }
    }

    /// Build from explicit segments (validated on [`compile`](Self::compile)).
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn literal(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Literal(text.into()));
        self
    }

    pub fn raw(mut self, regex: impl Into<String>) -> Self {
        self.segments.push(Segment::Raw(regex.into()));
        self
    }

    pub fn any(mut self) -> Self {
        self.segments.push(Segment::Any);
        self
    }

    pub fn name(mut self, regex: impl Into<String>) -> Self {
        self.segments
            .push(Segment::Capture(Capture::Name, regex.into()));
        self
    }

    pub fn sort_index(mut self, regex: impl Into<String>) -> Self {
        self.segments
            .push(Segment::Capture(Capture::SortIndex, regex.into()));
        self
    }

    pub fn lang(mut self, regex: impl Into<String>) -> Self {
        self.segments
            .push(Segment::Capture(Capture::LangCode, regex.into()));
        self
    }

    pub fn group(mut self, name: impl Into<String>, regex: impl Into<String>) -> Self {
        self.segments
            .push(Segment::Capture(Capture::Custom(name.into()), regex.into()));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parse the template syntax used in `lectern.toml`.
    ///
    /// Tokens: `{root:DIR}` `{any}` `{name:RE}` `{index:RE}` `{lang:RE}`
    /// `{group:NAME:RE}`. Text outside tokens is a regex fragment; a `{` that
    /// does not open a known token is kept as regex text (`\d{2}`).
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut raw = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(keyword) = token_keyword(after) else {
                raw.push_str(&rest[..=open]);
                rest = after;
                continue;
            };

            raw.push_str(&rest[..open]);
            if !raw.is_empty() {
                segments.push(Segment::Raw(std::mem::take(&mut raw)));
            }

            if keyword == "any}" {
                segments.push(Segment::Any);
                rest = &after[keyword.len()..];
                continue;
            }

            let body_start = keyword.len();
            let close = find_token_end(&after[body_start..])
                .ok_or_else(|| PatternError::Unterminated(keyword.to_string()))?;
            let body = &after[body_start..body_start + close];
            rest = &after[body_start + close + 1..];

            let segment = match keyword {
                "root:" => {
                    // The separator after the root belongs to the root
                    rest = rest.strip_prefix('/').unwrap_or(rest);
                    Segment::Root(body.to_string())
                }
                "name:" => Segment::Capture(Capture::Name, body.to_string()),
                "index:" => Segment::Capture(Capture::SortIndex, body.to_string()),
                "lang:" => Segment::Capture(Capture::LangCode, body.to_string()),
                "group:" => {
                    let (name, regex) = body
                        .split_once(':')
                        .ok_or_else(|| PatternError::UnknownToken(format!("group:{body}")))?;
                    Segment::Capture(Capture::Custom(name.to_string()), regex.to_string())
                }
                other => return Err(PatternError::UnknownToken(other.to_string())),
            };
            segments.push(segment);
        }

        raw.push_str(rest);
        if !raw.is_empty() {
            segments.push(Segment::Raw(raw));
        }
        Ok(Self { segments })
    }

    /// Compile into a matcher.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        let root = match self.segments.first() {
            Some(Segment::Root(dir)) => dir,
            _ if self.segments.iter().any(|s| matches!(s, Segment::Root(_))) => {
                return Err(PatternError::RootNotFirst);
            }
            _ => return Err(PatternError::MissingRoot),
        };

        let scan_dir = scan_dir_of(root);
        if scan_dir.is_empty() {
            return Err(PatternError::EmptyRoot(root.clone()));
        }

        let mut expr = format!("^{}/", regex::escape(&scan_dir));
        let mut groups: Vec<String> = Vec::new();

        for segment in &self.segments[1..] {
            match segment {
                Segment::Root(_) => return Err(PatternError::RootNotFirst),
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
                Segment::Raw(regex) => expr.push_str(regex),
                Segment::Any => expr.push_str(".*"),
                Segment::Capture(capture, regex) => {
                    let name = capture.group_name();
                    if !is_group_name(name) {
                        return Err(PatternError::InvalidGroupName(name.to_string()));
                    }
                    if groups.iter().any(|g| g == name) {
                        return Err(PatternError::DuplicateGroup(name.to_string()));
                    }
                    groups.push(name.to_string());
                    expr.push_str(&format!("(?P<{name}>{regex})"));
                }
            }
        }

        let regex = Regex::new(&expr).map_err(|e| PatternError::Regex(e.to_string()))?;
        Ok(CompiledPattern {
            regex,
            source: self.to_string(),
            scan_dir,
            groups,
        })
    }
}

impl fmt::Display for PathPattern {
    /// Render back to template syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Root(dir) => write!(f, "{{root:{dir}}}/")?,
                Segment::Literal(text) => f.write_str(&regex::escape(text))?,
                Segment::Raw(regex) => f.write_str(regex)?,
                Segment::Any => f.write_str("{any}")?,
                Segment::Capture(Capture::Custom(name), regex) => {
                    write!(f, "{{group:{name}:{regex}}}")?;
                }
                Segment::Capture(capture, regex) => {
                    write!(f, "{{{}:{regex}}}", capture.keyword())?;
                }
            }
        }
        Ok(())
    }
}

/// Known token keywords, including their `:` (or `}` for `any`).
fn token_keyword(after_brace: &str) -> Option<&'static str> {
    ["root:", "any}", "name:", "index:", "lang:", "group:"]
        .into_iter()
        .find(|k| after_brace.starts_with(k))
}

/// Index of the `}` closing a token body, honoring nested braces and escapes.
fn find_token_end(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip the non-word characters surrounding a root directory (`^`, `./`,
/// slashes), keeping inner separators such as `blog/posts`.
fn scan_dir_of(root: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    root.trim_matches(|c: char| !is_word(c)).to_string()
}

fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// CompiledPattern
// ============================================================================

/// Path properties captured from a matching file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathProps {
    pub name: Option<String>,
    pub sort_index: Option<String>,
    pub lang_code: Option<String>,
}

/// A compiled [`PathPattern`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    source: String,
    scan_dir: String,
    groups: Vec<String>,
}

impl CompiledPattern {
    /// Directory scanning starts from, relative to the base path.
    pub fn scan_dir(&self) -> &str {
        &self.scan_dir
    }

    /// The pattern in template syntax.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared capture group names, in pattern order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Match a `/`-separated path relative to the base path.
    pub fn matches(&self, relative: &str) -> Option<PathProps> {
        let caps = self.regex.captures(relative)?;
        let get = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        Some(PathProps {
            name: get(Capture::Name.group_name()),
            sort_index: get(Capture::SortIndex.group_name()),
            lang_code: get(Capture::LangCode.group_name()),
        })
    }
}
