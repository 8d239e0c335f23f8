//! Syntactic line classification for drop files

/// Prefix shared by comments and the child-group marker
pub const COMMENT_MARKER: char = '#';

/// First token of a child-group header
pub const CHILD_MARKER: &str = "#CHILD";

/// Third token of a child-group header: distribute over the following group
pub const RANDOM_KEYWORD: &str = "RANDOM";

/// One classified line of a drop file.
///
/// Classification never looks at whether a rate token is well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// `#` comment, including a `#CHILD` line without the `RANDOM` keyword
    CommentOnly,
    /// `#CHILD <rate> RANDOM`
    ChildGroupStart { rate: &'a str },
    /// A line that is exactly `(`
    GroupOpen,
    /// A line that is exactly `)`
    GroupClose,
    /// `<rate> <item name...>`
    Entry { rate: &'a str, name: String },
    /// A single token with no item name after it
    Incomplete { text: &'a str },
}

/// Classify one line. Surrounding whitespace is ignored.
pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();

    if line.is_empty() {
        return Line::Blank;
    }
    if line == "(" {
        return Line::GroupOpen;
    }
    if line == ")" {
        return Line::GroupClose;
    }

    let mut tokens = line.split_whitespace();
    // Non-empty after trim, so there is always a first token
    let first = tokens.next().unwrap_or(line);

    if line.starts_with(COMMENT_MARKER) {
        if first == CHILD_MARKER {
            if let (Some(rate), Some(RANDOM_KEYWORD)) = (tokens.next(), tokens.next()) {
                return Line::ChildGroupStart { rate };
            }
        }
        return Line::CommentOnly;
    }

    let name = clean_item_name(&tokens.collect::<Vec<_>>().join(" "));
    if name.is_empty() {
        return Line::Incomplete { text: line };
    }

    Line::Entry { rate: first, name }
}

/// Normalize an item name: trim and drop one leading `#`.
pub fn clean_item_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix(COMMENT_MARKER)
        .unwrap_or(name)
        .trim()
        .to_string()
}
