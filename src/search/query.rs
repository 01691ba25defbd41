use crate::record::Record;

/// Parsed search input.
///
/// Every token but the last is a *complete* tag and must equal one of a
/// record's tags. The last token is still being typed and only needs to
/// prefix one of them. Matching is case-insensitive throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    complete: Vec<String>,
    incomplete: Option<String>,
}

impl Query {
    /// Tokenizes `input` on whitespace runs and lower-cases each token.
    pub fn parse(input: &str) -> Self {
        let mut tokens: Vec<String> = input.split_whitespace().map(str::to_lowercase).collect();
        let incomplete = tokens.pop();
        Self {
            complete: tokens,
            incomplete,
        }
    }

    /// True when the input held no tokens; such a query matches everything.
    pub fn is_empty(&self) -> bool {
        self.incomplete.is_none()
    }

    /// Tokens that must match a tag exactly.
    pub fn complete_tags(&self) -> &[String] {
        &self.complete
    }

    /// Final token, matched as a prefix.
    pub fn incomplete_tag(&self) -> Option<&str> {
        self.incomplete.as_deref()
    }

    /// True when `record` satisfies every complete tag and the trailing prefix.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(incomplete) = self.incomplete.as_deref() else {
            return true;
        };

        let lowered: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
        self.complete
            .iter()
            .all(|want| lowered.iter().any(|tag| tag == want))
            && lowered.iter().any(|tag| tag.starts_with(incomplete))
    }

    /// Whether `tag` would be highlighted under this query.
    pub fn highlights(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.complete.iter().any(|want| *want == tag)
            || self
                .incomplete
                .as_deref()
                .is_some_and(|prefix| tag.starts_with(prefix))
    }
}

/// Per-tag highlight mask for `record` under `query`, aligned with its tags.
pub fn highlight(record: &Record, query: &Query) -> Vec<bool> {
    record.tags.iter().map(|tag| query.highlights(tag)).collect()
}

/// Appends `tag` to an input line, or returns `tag` alone when the line is
/// blank.
pub fn append_tag(input: &str, tag: &str) -> String {
    if input.trim().is_empty() {
        tag.to_string()
    } else {
        format!("{input} {tag}")
    }
}

/// Removes the final tag from an input line.
///
/// Leaves a trailing space when tags remain so typing continues with a new
/// tag; returns an empty string when at most one tag was present.
pub fn drop_last_tag(input: &str) -> String {
    let tags: Vec<&str> = input.split_whitespace().collect();
    if tags.len() <= 1 {
        return String::new();
    }
    let mut out = tags[..tags.len() - 1].join(" ");
    out.push(' ');
    out
}
