//! Splits partially revealed code into plain and interactive segments.
//!
//! The typing animation reveals a cell's code one character at a time. Every
//! frame the renderer asks for the segments of the revealed prefix: plain text
//! runs interleaved with the interactive spans the cursor has reached. A span
//! straddling the cursor is shown up to the cursor; a span the cursor has not
//! reached yet does not appear at all.
//!
//! Concatenating the contents of the returned segments always yields exactly
//! the first `revealed` characters of the code, whatever the span list holds.

use crate::span::Span;

/// One renderable piece of a cell's revealed code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Interactive { content: &'a str, span: &'a Span },
}

impl<'a> Segment<'a> {
    pub fn content(&self) -> &'a str {
        match self {
            Segment::Text(content) | Segment::Interactive { content, .. } => content,
        }
    }

    pub fn span(&self) -> Option<&'a Span> {
        match self {
            Segment::Text(_) => None,
            Segment::Interactive { span, .. } => Some(span),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Segment::Interactive { .. })
    }
}

/// Computes the segments for the first `revealed` characters of `code`.
///
/// Spans are ordered by `start` (declaration order breaks ties). A span that
/// begins inside an earlier one is clipped to where the earlier one ended, and
/// offsets past the end of the code or the reveal cursor are clamped.
pub fn segments<'a>(code: &'a str, revealed: usize, spans: &'a [Span]) -> Vec<Segment<'a>> {
    let chars = CharIndex::new(code);
    let revealed = revealed.min(chars.len());
    if revealed == 0 {
        return Vec::new();
    }

    let mut visible: Vec<&Span> = spans.iter().filter(|span| span.start < revealed).collect();
    visible.sort_by_key(|span| span.start);

    let mut out = Vec::with_capacity(visible.len() * 2 + 1);
    let mut cursor = 0;

    for span in visible {
        let start = span.start.max(cursor);
        let end = span.end.min(revealed);
        if end <= start {
            continue;
        }

        if start > cursor {
            out.push(Segment::Text(chars.slice(code, cursor, start)));
        }
        out.push(Segment::Interactive {
            content: chars.slice(code, start, end),
            span,
        });
        cursor = end;
    }

    if cursor < revealed {
        out.push(Segment::Text(chars.slice(code, cursor, revealed)));
    }

    out
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Finds `needle` in `haystack` at or after character `from`.
///
/// Returns the character offset of the match.
pub fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let byte_from = haystack
        .char_indices()
        .nth(from)
        .map_or(haystack.len(), |(idx, _)| idx);
    let found = haystack[byte_from..].find(needle)?;
    Some(from + char_len(&haystack[byte_from..byte_from + found]))
}

/// Maps character offsets to byte offsets.
///
/// ASCII text maps one-to-one, so no table is built for it.
struct CharIndex {
    bytes: Option<Vec<usize>>,
    len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                bytes: None,
                len: text.len(),
            };
        }
        let mut bytes: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        let len = bytes.len();
        bytes.push(text.len());
        Self {
            bytes: Some(bytes),
            len,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn byte(&self, char_idx: usize) -> usize {
        match &self.bytes {
            None => char_idx,
            Some(table) => table[char_idx],
        }
    }

    fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        &text[self.byte(start)..self.byte(end)]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::span::{Action, SpanKind};

    fn joined(segs: &[Segment<'_>]) -> String {
        segs.iter().map(Segment::content).collect()
    }

    #[test]
    fn test_no_spans_single_text_segment() {
        let segs = segments("print(x)", 5, &[]);
        assert_eq!(segs, vec![Segment::Text("print")]);
    }

    #[test]
    fn test_zero_reveal_is_empty() {
        let spans = vec![Span::new(0, 3, SpanKind::Keyword)];
        assert!(segments("abc", 0, &spans).is_empty());
        assert!(segments("", 4, &spans).is_empty());
    }

    #[test]
    fn test_full_reveal_interleaves() {
        let code = "x = load(\"a\")";
        let spans = vec![Span::new(4, 8, SpanKind::Function)];
        let segs = segments(code, code.len(), &spans);

        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0], Segment::Text("x = "));
        assert_eq!(segs[1].content(), "load");
        assert_eq!(segs[1].span(), Some(&spans[0]));
        assert_eq!(segs[2], Segment::Text("(\"a\")"));
    }

    #[test]
    fn test_span_visibility_threshold() {
        let code = "0123456789abcdef";
        let spans = vec![Span::new(5, 9, SpanKind::Keyword)];

        for revealed in 0..=5 {
            let segs = segments(code, revealed, &spans);
            assert!(
                segs.iter().all(|seg| !seg.is_interactive()),
                "span visible too early at revealed={revealed}"
            );
        }

        let segs = segments(code, 6, &spans);
        assert_eq!(segs.last().and_then(Segment::span), Some(&spans[0]));
        assert_eq!(segs.last().map(Segment::content), Some("5"));
    }

    #[test]
    fn test_clamped_partial_span() {
        let code = "abcdefghijklmnopqrst";
        assert_eq!(code.len(), 20);
        let spans = vec![Span::new(2, 10, SpanKind::Keyword)];

        let segs = segments(code, 5, &spans);

        assert_eq!(segs[0], Segment::Text("ab"));
        assert_eq!(segs[1].content(), "cde");
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn test_unsorted_spans_are_ordered() {
        let code = "alpha beta gamma";
        let spans = vec![
            Span::new(11, 16, SpanKind::Comment),
            Span::new(0, 5, SpanKind::Keyword),
        ];

        let segs = segments(code, code.len(), &spans);
        let kinds: Vec<_> = segs
            .iter()
            .filter_map(Segment::span)
            .map(|span| span.kind)
            .collect();

        assert_eq!(kinds, vec![SpanKind::Keyword, SpanKind::Comment]);
        assert_eq!(joined(&segs), code);
    }

    #[test]
    fn test_tie_first_declared_wins() {
        let code = "dataset.info()";
        let first = Span::new(0, 14, SpanKind::Function).with_action(Action::explore("d", "a"));
        let second = Span::new(0, 14, SpanKind::Function).with_action(Action::explore("d", "b"));
        let spans = vec![first.clone(), second];

        let segs = segments(code, code.len(), &spans);

        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].span(), Some(&first));
    }

    #[test]
    fn test_out_of_range_offsets_are_clamped() {
        let code = "short";
        let spans = vec![
            Span::new(3, 99, SpanKind::Keyword),
            Span::new(4, 2, SpanKind::Comment),
        ];

        let segs = segments(code, 50, &spans);

        assert_eq!(joined(&segs), "short");
        assert_eq!(segs[1].content(), "rt");
    }

    #[test]
    fn test_overlap_is_clipped_to_cursor() {
        let code = "abcdefghij";
        let spans = vec![
            Span::new(1, 6, SpanKind::Keyword),
            Span::new(3, 8, SpanKind::Function),
        ];

        let segs = segments(code, code.len(), &spans);

        assert_eq!(joined(&segs), code);
        assert_eq!(segs[1].content(), "bcdef");
        assert_eq!(segs[2].content(), "gh");
        assert_eq!(segs[2].span().map(|s| s.kind), Some(SpanKind::Function));
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let code = "# café → données";
        let spans = vec![Span::new(2, 6, SpanKind::Comment)];

        let segs = segments(code, 9, &spans);

        assert_eq!(segs[1].content(), "café");
        assert_eq!(joined(&segs), "# café → ");
    }

    #[test]
    fn test_find_from_counts_chars() {
        let code = "é \"a\" \"a\"";
        assert_eq!(find_from(code, "\"a\"", 0), Some(2));
        assert_eq!(find_from(code, "\"a\"", 3), Some(6));
        assert_eq!(find_from(code, "\"a\"", 7), None);
        assert_eq!(find_from(code, "x", 100), None);
    }

    fn arb_kind() -> impl Strategy<Value = SpanKind> {
        prop_oneof![
            Just(SpanKind::Keyword),
            Just(SpanKind::Function),
            Just(SpanKind::Comment),
        ]
    }

    fn arb_span() -> impl Strategy<Value = Span> {
        (0usize..40, 0usize..40, arb_kind()).prop_map(|(start, end, kind)| Span::new(start, end, kind))
    }

    proptest! {
        #[test]
        fn concatenation_equals_revealed_prefix(
            code in "[a-z \n\"()é→]{0,32}",
            spans in proptest::collection::vec(arb_span(), 0..6),
        ) {
            let len = char_len(&code);
            for revealed in 0..=len {
                let segs = segments(&code, revealed, &spans);
                let expected: String = code.chars().take(revealed).collect();
                prop_assert_eq!(joined(&segs), expected);
            }
        }

        #[test]
        fn interactive_segments_start_before_cursor(
            code in "[a-z ]{1,32}",
            spans in proptest::collection::vec(arb_span(), 0..6),
            cut in 0usize..32,
        ) {
            let revealed = cut.min(code.len());
            for seg in segments(&code, revealed, &spans) {
                if let Some(span) = seg.span() {
                    prop_assert!(span.start < revealed);
                    prop_assert!(!seg.content().is_empty());
                }
            }
        }
    }
}
