use strsim::levenshtein;

/// Find the most similar name from a list of candidates
pub fn find_similar<'a>(target: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, levenshtein(target, candidate)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

/// Joins the parts with `separator` between each pair, no trailing separator.
pub fn join<I, S>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            joined.push_str(separator);
        }
        joined.push_str(part.as_ref());
    }
    joined
}

/// Collapses every CRLF and lone CR to LF.
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            normalized.push('\n');
        } else {
            normalized.push(c);
        }
    }
    normalized
}

/// Sanitizes one raw output line: line endings first, then XML.
pub fn sanitize_line(line: &str) -> String {
    xml_sanitize(&normalize_line_endings(line))
}

/// Makes text safe to embed in XML character data.
///
/// `<` and `>` become entity references. A bare `&` becomes `&amp;`, but an
/// `&` that already starts a well-formed reference is left alone, so running
/// the text through again changes nothing. Code points XML 1.0 forbids are
/// replaced by their `U+XXXX` spelling.
pub fn xml_sanitize(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '<' => sanitized.push_str("&lt;"),
            '>' => sanitized.push_str("&gt;"),
            '&' if starts_reference(&text[i..]) => sanitized.push('&'),
            '&' => sanitized.push_str("&amp;"),
            c if is_xml_char(c) => sanitized.push(c),
            c => sanitized.push_str(&format!("U+{:04X}", u32::from(c))),
        }
    }
    sanitized
}

/// Whether `c` may appear in XML 1.0 character data.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

const NAMED_REFERENCES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

/// Whether `text` (which begins with `&`) opens a well-formed entity or
/// character reference. A character reference only counts when the code
/// point it names is itself legal XML.
fn starts_reference(text: &str) -> bool {
    if NAMED_REFERENCES.iter().any(|r| text.starts_with(r)) {
        return true;
    }

    let Some(body) = text.strip_prefix("&#") else {
        return false;
    };
    let Some(end) = body.find(';') else {
        return false;
    };
    let digits = &body[..end];
    let (digits, radix) = match digits.strip_prefix('x') {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    // from_str_radix tolerates a leading sign; references never carry one.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return false;
    }

    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .is_some_and(is_xml_char)
}
