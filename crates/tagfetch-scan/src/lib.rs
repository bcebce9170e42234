//! Scanner for `$`-prefixed layout tags.
//!
//! Layout text embeds five kinds of tags, each introduced by `$` and a
//! delimiter pair:
//!
//! | syntax        | kind                       |
//! |---------------|----------------------------|
//! | `$<...>`      | [`TagKind::Information`]   |
//! | `$(...)`      | [`TagKind::Command`]       |
//! | `$[...]`      | [`TagKind::Conditional`]   |
//! | `${...}`      | [`TagKind::Color`]         |
//! | `$%...%`      | [`TagKind::Percentage`]    |
//!
//! This crate only finds tags; it never evaluates them. The [`Tokenizer`]
//! splits a line into plain text, escaped characters and matched tag spans,
//! and the helpers [`split_fields`] and [`parse_module_ref`] break tag
//! payloads apart without descending into nested tags.
//!
//! # Example
//!
//! ```rust
//! use tagfetch_scan::{Token, TagKind, Tokenizer};
//!
//! let tokens: Vec<_> = Tokenizer::new("OS: $<os.name>").collect();
//! assert_eq!(tokens[0], Token::Text("OS: "));
//! match &tokens[1] {
//!     Token::Tag(tag) => {
//!         assert_eq!(tag.kind, TagKind::Information);
//!         assert_eq!(tag.payload, "os.name");
//!         assert_eq!(tag.span, 4..14);
//!     }
//!     other => panic!("unexpected token {:?}", other),
//! }
//! ```
//!
//! # Matching rules
//!
//! A close delimiter is found by counting occurrences of the tag's own
//! open/close pair. Nested `$`-tags of any kind are skipped as opaque units,
//! and a backslash removes the structural meaning of the character after it.
//! A `$` that is not followed by one of `< ( [ { %` is ordinary text.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// The five tag kinds of the layout language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `$<module.path>`: text from the module registry.
    Information,
    /// `$(command)`: standard output of a shell command.
    Command,
    /// `$[a,b,then,else]`: string comparison.
    Conditional,
    /// `${color}`: color and text attribute change.
    Color,
    /// `$%value,total%`: colored percentage.
    Percentage,
}

impl TagKind {
    /// Every tag kind, in the order the delimiters are documented.
    pub const ALL: [TagKind; 5] = [
        TagKind::Information,
        TagKind::Command,
        TagKind::Conditional,
        TagKind::Color,
        TagKind::Percentage,
    ];

    /// Classifies the character following a `$`.
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '<' => Some(TagKind::Information),
            '(' => Some(TagKind::Command),
            '[' => Some(TagKind::Conditional),
            '{' => Some(TagKind::Color),
            '%' => Some(TagKind::Percentage),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            TagKind::Information => '<',
            TagKind::Command => '(',
            TagKind::Conditional => '[',
            TagKind::Color => '{',
            TagKind::Percentage => '%',
        }
    }

    pub fn close(self) -> char {
        match self {
            TagKind::Information => '>',
            TagKind::Command => ')',
            TagKind::Conditional => ']',
            TagKind::Color => '}',
            TagKind::Percentage => '%',
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagKind::Information => "information",
            TagKind::Command => "command",
            TagKind::Conditional => "conditional",
            TagKind::Color => "color",
            TagKind::Percentage => "percentage",
        };
        write!(f, "{} tag `${}{}`", name, self.open(), self.close())
    }
}

/// Structural errors found while scanning layout text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// End of input reached before the tag's close delimiter.
    #[error("unterminated {kind} starting at byte {offset}")]
    UnterminatedTag { kind: TagKind, offset: usize },

    /// A conditional tag with fewer than four top-level fields.
    #[error("conditional tag needs 4 comma-separated fields, found {found}")]
    MalformedConditional { found: usize },
}

/// Result type for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// A matched tag span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub kind: TagKind,
    /// Text between the delimiters, still unresolved.
    pub payload: &'a str,
    /// The full tag text, `$` and delimiters included.
    pub source: &'a str,
    /// Half-open byte range of [`Tag::source`] in the scanned string.
    pub span: Range<usize>,
}

/// Matches the tag starting at the `$` at byte `dollar` of `src`.
///
/// Returns `Ok(None)` when `src[dollar..]` does not start with `$` followed
/// by a recognised open delimiter; such a `$` is literal text.
///
/// # Example
///
/// ```rust
/// use tagfetch_scan::{match_tag, ScanError, TagKind};
///
/// let tag = match_tag("x $(echo (hi)) y", 2).unwrap().unwrap();
/// assert_eq!(tag.payload, "echo (hi)");
///
/// assert_eq!(match_tag("$5", 0), Ok(None));
/// assert!(matches!(
///     match_tag("$<os.name", 0),
///     Err(ScanError::UnterminatedTag { kind: TagKind::Information, offset: 0 })
/// ));
/// ```
pub fn match_tag(src: &str, dollar: usize) -> Result<Option<Tag<'_>>> {
    Matcher::new(src).match_tag(dollar)
}

/// Delimiter matching over one input.
///
/// The outcome of skipping the nested tag at each `$` offset is cached, so
/// every nested tag is matched at most once however many enclosing spans
/// scan across it.
struct Matcher<'a> {
    src: &'a str,
    nested: HashMap<usize, Option<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            nested: HashMap::new(),
        }
    }

    fn match_tag(&mut self, dollar: usize) -> Result<Option<Tag<'a>>> {
        let src = self.src;
        let bytes = src.as_bytes();
        if bytes.get(dollar) != Some(&b'$') {
            return Ok(None);
        }
        let Some(kind) = bytes
            .get(dollar + 1)
            .and_then(|&b| TagKind::from_open(b as char))
        else {
            return Ok(None);
        };

        let payload_start = dollar + 2;
        match self.skip_nested(dollar).map(|end| end - 1) {
            Some(close) => Ok(Some(Tag {
                kind,
                payload: &src[payload_start..close],
                source: &src[dollar..=close],
                span: dollar..close + 1,
            })),
            None => Err(ScanError::UnterminatedTag {
                kind,
                offset: dollar,
            }),
        }
    }

    /// Finds the index of the delimiter closing a `kind` tag whose payload
    /// starts at `from`.
    ///
    /// All delimiters are ASCII, so scanning bytes never splits a UTF-8
    /// sequence: continuation bytes are always >= 0x80.
    fn find_close(&mut self, kind: TagKind, from: usize) -> Option<usize> {
        let src = self.src;
        let bytes = src.as_bytes();
        let open = kind.open() as u8;
        let close = kind.close() as u8;
        let mut depth = 1usize;
        let mut i = from;

        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == b'$' {
                if let Some(end) = self.skip_nested(i) {
                    i = end;
                    continue;
                }
            }
            // Close is tested first: `%` opens and closes percentage tags.
            if b == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            } else if b == open {
                depth += 1;
            }
            i += 1;
        }

        None
    }

    /// If a terminated tag starts at `dollar`, returns the index just past it.
    fn skip_nested(&mut self, dollar: usize) -> Option<usize> {
        if let Some(&end) = self.nested.get(&dollar) {
            return end;
        }
        let kind = self
            .src
            .as_bytes()
            .get(dollar + 1)
            .and_then(|&b| TagKind::from_open(b as char))?;
        let end = self.find_close(kind, dollar + 2).map(|close| close + 1);
        self.nested.insert(dollar, end);
        end
    }
}

/// Splits `payload` on top-level commas into at most `max` fields.
///
/// Commas inside nested tags or escaped with a backslash are not split
/// points. Once `max - 1` fields are collected, the remainder (commas and
/// all) becomes the last field.
///
/// # Example
///
/// ```rust
/// use tagfetch_scan::split_fields;
///
/// assert_eq!(
///     split_fields("$[a,b,c,d],x,y,z", 4),
///     vec!["$[a,b,c,d]", "x", "y", "z"]
/// );
/// assert_eq!(split_fields("a,b,c,d,e", 4), vec!["a", "b", "c", "d,e"]);
/// ```
pub fn split_fields(payload: &str, max: usize) -> Vec<&str> {
    let bytes = payload.as_bytes();
    let mut matcher = Matcher::new(payload);
    let mut fields = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if fields.len() + 1 >= max {
            break;
        }
        match bytes[i] {
            b'\\' => i += 2,
            b'$' => i = matcher.skip_nested(i).unwrap_or(i + 1),
            b',' => {
                fields.push(&payload[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    fields.push(&payload[start.min(payload.len())..]);
    fields
}

/// Splits a conditional tag payload into `[left, right, then, else]`.
///
/// # Example
///
/// ```rust
/// use tagfetch_scan::{split_conditional, ScanError};
///
/// let [a, b, t, f] = split_conditional("$<user.name>,toni,Hi, you,Bye").unwrap();
/// assert_eq!((a, b, t, f), ("$<user.name>", "toni", "Hi", " you,Bye"));
///
/// assert_eq!(
///     split_conditional("a,b"),
///     Err(ScanError::MalformedConditional { found: 2 })
/// );
/// ```
pub fn split_conditional(payload: &str) -> Result<[&str; 4]> {
    let fields = split_fields(payload, 4);
    match fields[..] {
        [a, b, t, f] => Ok([a, b, t, f]),
        _ => Err(ScanError::MalformedConditional {
            found: fields.len(),
        }),
    }
}

/// One segment of an information tag path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment<'a> {
    /// Segment name with any parenthesised argument removed.
    pub name: String,
    /// Raw text between the parentheses, if the segment has them.
    pub arg: Option<&'a str>,
}

/// Parses an information tag payload such as `disk(/home).used`.
///
/// The payload is split on top-level `.`; each segment may carry one
/// parenthesised argument. Parentheses and dots inside nested tags are
/// ignored, so arguments may contain arbitrary tags.
///
/// # Example
///
/// ```rust
/// use tagfetch_scan::parse_module_ref;
///
/// let segments = parse_module_ref("disk($<user.home>).used");
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].name, "disk");
/// assert_eq!(segments[0].arg, Some("$<user.home>"));
/// assert_eq!(segments[1].name, "used");
/// assert_eq!(segments[1].arg, None);
/// ```
pub fn parse_module_ref(payload: &str) -> Vec<PathSegment<'_>> {
    let bytes = payload.as_bytes();
    let mut matcher = Matcher::new(payload);
    let mut segments = Vec::new();
    let mut name = String::new();
    let mut arg: Option<&str> = None;
    let mut name_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' => i = matcher.skip_nested(i).unwrap_or(i + 1),
            b'.' => {
                name.push_str(&payload[name_start..i]);
                segments.push(PathSegment {
                    name: std::mem::take(&mut name),
                    arg: arg.take(),
                });
                i += 1;
                name_start = i;
            }
            b'(' => {
                name.push_str(&payload[name_start..i]);
                let arg_start = i + 1;
                let arg_end = matcher.find_close(TagKind::Command, arg_start);
                let end = arg_end.unwrap_or(bytes.len());
                arg = Some(&payload[arg_start..end]);
                i = (end + 1).min(bytes.len());
                name_start = i;
            }
            _ => i += 1,
        }
    }

    name.push_str(&payload[name_start.min(payload.len())..]);
    segments.push(PathSegment { name, arg });
    segments
}

/// Token types produced by the [`Tokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Plain text with no tags or escapes.
    Text(&'a str),
    /// A character that followed a backslash.
    Escaped(char),
    /// A matched tag.
    Tag(Tag<'a>),
    /// The `$` and open delimiter of a tag that is never closed.
    ///
    /// Scanning resumes right after the delimiter, so later tags on the
    /// same line are still found.
    Unterminated {
        kind: TagKind,
        text: &'a str,
        offset: usize,
    },
}

/// Splits layout text into [`Token`]s, left to right.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    matcher: Matcher<'a>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            matcher: Matcher::new(input),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];
        let bytes = remaining.as_bytes();

        // Text runs up to the next escape or tag start; a `$` without a
        // delimiter stays inside the run.
        let mut end = 0;
        while end < bytes.len() {
            match bytes[end] {
                b'\\' => break,
                b'$' if bytes
                    .get(end + 1)
                    .is_some_and(|&b| TagKind::from_open(b as char).is_some()) =>
                {
                    break
                }
                _ => end += 1,
            }
        }
        if end > 0 {
            self.pos += end;
            return Some(Token::Text(&remaining[..end]));
        }

        if bytes[0] == b'\\' {
            return match remaining[1..].chars().next() {
                Some(c) => {
                    self.pos += 1 + c.len_utf8();
                    Some(Token::Escaped(c))
                }
                None => {
                    self.pos += 1;
                    Some(Token::Text(remaining))
                }
            };
        }

        let start = self.pos;
        match self.matcher.match_tag(start) {
            Ok(Some(tag)) => {
                self.pos = tag.span.end;
                Some(Token::Tag(tag))
            }
            Err(ScanError::UnterminatedTag { kind, offset }) => {
                self.pos += 2;
                Some(Token::Unterminated {
                    kind,
                    text: &remaining[..2],
                    offset,
                })
            }
            // Unreachable given the run scan above, but stay total.
            Ok(None) | Err(ScanError::MalformedConditional { .. }) => {
                self.pos += 1;
                Some(Token::Text(&remaining[..1]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(src: &str) -> Tag<'_> {
        match match_tag(src, 0) {
            Ok(Some(tag)) => tag,
            other => panic!("expected a tag in {:?}, got {:?}", src, other),
        }
    }

    // ==================== Delimiter matching ====================

    mod matching {
        use super::*;

        #[test]
        fn every_kind_is_recognised() {
            let cases = [
                ("$<os.name>", TagKind::Information, "os.name"),
                ("$(echo hi)", TagKind::Command, "echo hi"),
                ("$[a,b,c,d]", TagKind::Conditional, "a,b,c,d"),
                ("${red}", TagKind::Color, "red"),
                ("$%1,2%", TagKind::Percentage, "1,2"),
            ];
            for (src, kind, payload) in cases {
                let t = tag(src);
                assert_eq!(t.kind, kind);
                assert_eq!(t.payload, payload);
                assert_eq!(t.source, src);
                assert_eq!(t.span, 0..src.len());
            }
        }

        #[test]
        fn same_kind_nesting_counts_depth() {
            assert_eq!(tag("$(echo (a (b)) c)").payload, "echo (a (b)) c");
            assert_eq!(tag("$<a<b>>").payload, "a<b>");
        }

        #[test]
        fn nested_tags_of_other_kinds_are_opaque() {
            let t = tag("$[$<user.name>,toni,yes,no]");
            assert_eq!(t.payload, "$<user.name>,toni,yes,no");

            // The `]` inside the command tag does not close the conditional.
            let t = tag("$[$(echo ]),x,y,z]");
            assert_eq!(t.payload, "$(echo ]),x,y,z");
        }

        #[test]
        fn nested_percentage_inside_percentage() {
            assert_eq!(tag("$%$%1,2%,4%").payload, "$%1,2%,4");
        }

        #[test]
        fn escaped_delimiters_do_not_count() {
            assert_eq!(tag("$<a\\>b>").payload, "a\\>b");
            assert_eq!(tag("$(echo \\( x)").payload, "echo \\( x");
        }

        #[test]
        fn dollar_without_delimiter_is_not_a_tag() {
            assert_eq!(match_tag("$HOME", 0), Ok(None));
            assert_eq!(match_tag("$", 0), Ok(None));
            assert_eq!(match_tag("x", 0), Ok(None));
        }

        #[test]
        fn unterminated_reports_kind_and_offset() {
            assert_eq!(
                match_tag("ab $[a,b", 3),
                Err(ScanError::UnterminatedTag {
                    kind: TagKind::Conditional,
                    offset: 3
                })
            );
        }

        #[test]
        fn multibyte_text_is_preserved() {
            let t = tag("$<héllo.wörld>");
            assert_eq!(t.payload, "héllo.wörld");
        }
    }

    // ==================== Field splitting ====================

    mod fields {
        use super::*;

        #[test]
        fn conditional_fields() {
            let [a, b, t, f] = split_conditional("1,1,yes,no").unwrap();
            assert_eq!([a, b, t, f], ["1", "1", "yes", "no"]);
        }

        #[test]
        fn empty_fields_are_kept() {
            let [a, b, t, f] = split_conditional("$(date +%m-%d),12-25,Merry Christmas!,").unwrap();
            assert_eq!(a, "$(date +%m-%d)");
            assert_eq!(b, "12-25");
            assert_eq!(t, "Merry Christmas!");
            assert_eq!(f, "");
        }

        #[test]
        fn extra_commas_fold_into_last_field() {
            let [_, _, _, f] = split_conditional("a,b,c,d,e,f").unwrap();
            assert_eq!(f, "d,e,f");
        }

        #[test]
        fn too_few_fields_is_malformed() {
            assert_eq!(
                split_conditional("a,b,c"),
                Err(ScanError::MalformedConditional { found: 3 })
            );
            assert_eq!(
                split_conditional(""),
                Err(ScanError::MalformedConditional { found: 1 })
            );
        }

        #[test]
        fn escaped_comma_is_not_a_split_point() {
            assert_eq!(split_fields("a\\,b,c", 2), vec!["a\\,b", "c"]);
        }

        #[test]
        fn nested_commas_are_skipped() {
            assert_eq!(
                split_fields("$<ram.used>,$%1,2%", 2),
                vec!["$<ram.used>", "$%1,2%"]
            );
        }
    }

    // ==================== Module references ====================

    mod module_ref {
        use super::*;

        #[test]
        fn plain_path() {
            let segs = parse_module_ref("os.kernel.name");
            let names: Vec<_> = segs.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, ["os", "kernel", "name"]);
            assert!(segs.iter().all(|s| s.arg.is_none()));
        }

        #[test]
        fn argument_on_middle_segment() {
            let segs = parse_module_ref("disk(/).mountdir");
            assert_eq!(segs[0].name, "disk");
            assert_eq!(segs[0].arg, Some("/"));
            assert_eq!(segs[1].name, "mountdir");
        }

        #[test]
        fn argument_with_dots_and_parens() {
            let segs = parse_module_ref("cmd(a.b (c)).x");
            assert_eq!(segs.len(), 2);
            assert_eq!(segs[0].arg, Some("a.b (c)"));
        }

        #[test]
        fn deeply_nested_argument() {
            let segs = parse_module_ref("disk($<disk($[1,1,$(echo -n $<disk(/).mountdir>),23]).mountdir>)");
            assert_eq!(segs.len(), 1);
            assert_eq!(
                segs[0].arg,
                Some("$<disk($[1,1,$(echo -n $<disk(/).mountdir>),23]).mountdir>")
            );
        }

        #[test]
        fn unclosed_argument_takes_rest() {
            let segs = parse_module_ref("disk(/home");
            assert_eq!(segs[0].arg, Some("/home"));
        }
    }

    // ==================== Tokenizer ====================

    mod tokenizer {
        use super::*;

        #[test]
        fn plain_text_is_one_token() {
            let tokens: Vec<_> = Tokenizer::new("hello world").collect();
            assert_eq!(tokens, vec![Token::Text("hello world")]);
        }

        #[test]
        fn literal_dollar_stays_in_text() {
            let tokens: Vec<_> = Tokenizer::new("costs $5").collect();
            assert_eq!(tokens, vec![Token::Text("costs $5")]);
        }

        #[test]
        fn escapes_become_tokens() {
            let tokens: Vec<_> = Tokenizer::new("a\\$<b>").collect();
            assert_eq!(
                tokens,
                vec![Token::Text("a"), Token::Escaped('$'), Token::Text("<b>")]
            );
        }

        #[test]
        fn trailing_backslash_is_text() {
            let tokens: Vec<_> = Tokenizer::new("a\\").collect();
            assert_eq!(tokens, vec![Token::Text("a"), Token::Text("\\")]);
        }

        #[test]
        fn unterminated_then_valid_tag() {
            let tokens: Vec<_> = Tokenizer::new("$<os.name $<user>").collect();
            assert!(matches!(
                tokens[0],
                Token::Unterminated {
                    kind: TagKind::Information,
                    text: "$<",
                    offset: 0
                }
            ));
            assert!(matches!(tokens.last(), Some(Token::Tag(t)) if t.payload == "user"));
        }

        #[test]
        fn spans_are_absolute() {
            let tokens: Vec<_> = Tokenizer::new("ab${red}cd$<x>").collect();
            let spans: Vec<_> = tokens
                .iter()
                .filter_map(|t| match t {
                    Token::Tag(tag) => Some(tag.span.clone()),
                    _ => None,
                })
                .collect();
            assert_eq!(spans, vec![2..8, 10..14]);
        }

        #[test]
        fn many_unterminated_openers() {
            let line = "$<".repeat(64);
            let tokens: Vec<_> = Tokenizer::new(&line).collect();
            assert_eq!(tokens.len(), 64);
            for (i, token) in tokens.iter().enumerate() {
                assert_eq!(
                    *token,
                    Token::Unterminated {
                        kind: TagKind::Information,
                        text: "$<",
                        offset: i * 2
                    }
                );
            }
        }

        #[test]
        fn mixed_unterminated_openers() {
            let line = "$[$($<${".repeat(32);
            let tokens: Vec<_> = Tokenizer::new(&line).collect();
            assert_eq!(tokens.len(), 128);
            assert!(tokens
                .iter()
                .all(|t| matches!(t, Token::Unterminated { .. })));
        }

        #[test]
        fn closed_tags_after_unterminated_run() {
            let line = format!("{}$<a>$(b)", "$<".repeat(40));
            let tags: Vec<_> = Tokenizer::new(&line)
                .filter_map(|t| match t {
                    Token::Tag(tag) => Some(tag.payload),
                    _ => None,
                })
                .collect();
            assert_eq!(tags, ["a", "b"]);
        }
    }
}
