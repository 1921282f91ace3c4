//! Lexical masking for brace-language source text.
//!
//! Produces a byte-for-byte copy of the input where every byte inside a
//! comment or string literal is replaced by a space (newlines are kept).
//! Offsets in the masked buffer line up exactly with the original text,
//! so the locator and classifier can search code without tripping over
//! braces or keywords that only appear in strings and comments.

/// Mask comments and string literals, preserving offsets and newlines.
pub(crate) fn mask_non_code(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut masked = bytes.to_vec();
    let mut i = 0;
    while i < bytes.len() {
        match non_code_end(bytes, i) {
            Some(end) => {
                blank(&mut masked[i..end]);
                i = end;
            }
            None => i += 1,
        }
    }
    masked
}

/// True for bytes that may appear inside an identifier.
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// True when `needle` occurs at `at` as a whole word.
pub(crate) fn word_at(haystack: &[u8], at: usize, needle: &[u8]) -> bool {
    if !haystack[at..].starts_with(needle) {
        return false;
    }
    let before_ok = at == 0 || !is_ident_byte(haystack[at - 1]);
    let after = at + needle.len();
    let after_ok = after >= haystack.len() || !is_ident_byte(haystack[after]);
    before_ok && after_ok
}

/// Offsets of every whole-word occurrence of `needle`.
pub(crate) fn find_words<'a>(
    haystack: &'a [u8],
    needle: &'a [u8],
) -> impl Iterator<Item = usize> + 'a {
    (0..haystack.len().saturating_sub(needle.len().saturating_sub(1)))
        .filter(move |&at| word_at(haystack, at, needle))
}

/// Skip ASCII whitespace starting at `i`.
pub(crate) fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Index of the delimiter closing the one at `open`, or `None` at EOF.
///
/// Expects masked input, so only code delimiters are counted.
pub(crate) fn matching_close(
    masked: &[u8],
    open: usize,
    open_byte: u8,
    close_byte: u8,
) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in masked[open..].iter().enumerate() {
        if b == open_byte {
            depth += 1;
        } else if b == close_byte {
            depth -= 1;
            if depth == 0 {
                return Some(open + offset);
            }
        }
    }
    None
}

fn blank(span: &mut [u8]) {
    for b in span.iter_mut() {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

/// If a comment or string starts at `i`, return the index just past it.
fn non_code_end(bytes: &[u8], i: usize) -> Option<usize> {
    let next = bytes.get(i + 1).copied();
    match bytes[i] {
        b'/' if next == Some(b'/') => Some(
            bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| i + p),
        ),
        b'/' if next == Some(b'*') => Some(skip_block_comment(bytes, i)),
        b'\'' | b'"' => Some(skip_string(bytes, i, false)),
        b'r' if matches!(next, Some(b'\'') | Some(b'"'))
            && (i == 0 || !is_ident_byte(bytes[i - 1])) =>
        {
            Some(skip_string(bytes, i + 1, true))
        }
        _ => None,
    }
}

// Block comments nest.
fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut j = start;
    while j < bytes.len() {
        if bytes[j..].starts_with(b"/*") {
            depth += 1;
            j += 2;
        } else if bytes[j..].starts_with(b"*/") {
            depth -= 1;
            j += 2;
            if depth == 0 {
                return j;
            }
        } else {
            j += 1;
        }
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], quote_at: usize, raw: bool) -> usize {
    let quote = bytes[quote_at];
    let triple_quote = [quote; 3];
    let triple = bytes[quote_at..].starts_with(&triple_quote);
    let mut j = quote_at + if triple { 3 } else { 1 };

    while j < bytes.len() {
        let b = bytes[j];
        if !raw && b == b'\\' {
            j += 2;
            continue;
        }
        if !raw && b == b'$' && bytes.get(j + 1) == Some(&b'{') {
            j = skip_interpolation(bytes, j + 1);
            continue;
        }
        if triple {
            if bytes[j..].starts_with(&triple_quote) {
                return j + 3;
            }
        } else if b == quote {
            return j + 1;
        } else if b == b'\n' {
            // Unterminated single-line string ends at the line break.
            return j;
        }
        j += 1;
    }
    bytes.len()
}

/// Skip a `${ ... }` interpolation whose `{` is at `open`.
fn skip_interpolation(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut j = open;
    while j < bytes.len() {
        if let Some(end) = non_code_end(bytes, j) {
            j = end;
            continue;
        }
        match bytes[j] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
        j += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked(text: &str) -> String {
        String::from_utf8(mask_non_code(text)).expect("masked text is ASCII outside code")
    }

    #[test]
    fn test_mask_preserves_length_and_code() {
        let text = "a { 'b}' } // c}\n/* d { */ e";
        let out = masked(text);
        assert_eq!(out.len(), text.len());
        assert_eq!(
            out,
            format!("a {{{}}}{}\n{}e", " ".repeat(6), " ".repeat(6), " ".repeat(10))
        );
    }

    #[test]
    fn test_mask_nested_block_comment() {
        let out = masked("x /* a /* b */ c */ y");
        assert_eq!(out, format!("x{}y", " ".repeat(19)));
    }

    #[test]
    fn test_mask_interpolation_with_nested_quotes() {
        let text = "t('${a ? 'x}' : \"y\"}') }";
        let out = masked(text);
        assert!(out.starts_with("t("));
        assert_eq!(out.matches('}').count(), 1, "Only the trailing brace is code");
    }

    #[test]
    fn test_mask_raw_and_triple_strings() {
        let out = masked(r#"r'\{' x '''a
}''' z"#);
        assert!(!out.contains('{'));
        assert!(!out.contains('}'));
        assert!(out.contains('x'));
        assert!(out.ends_with('z'));
        assert!(out.contains('\n'));
    }

    #[test]
    fn test_word_boundaries() {
        let text = b"myswitch switch switches";
        let hits: Vec<usize> = find_words(text, b"switch").collect();
        assert_eq!(hits, vec![9]);
    }

    #[test]
    fn test_matching_close_counts_depth() {
        let text = b"{ { } { } }";
        assert_eq!(matching_close(text, 0, b'{', b'}'), Some(10));
        assert_eq!(matching_close(b"{ {", 0, b'{', b'}'), None);
    }
}
