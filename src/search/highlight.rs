use super::index::Span;

/// Sort spans and merge the ones that overlap or touch.
pub fn merge_ranges(spans: &[Span]) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sorted.sort_unstable();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Wrap the character ranges of `text` covered by `spans` in `open`/`close`.
/// Spans past the end of `text` are clipped.
pub fn highlight(text: &str, spans: &[Span], open: &str, close: &str) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    let merged = merge_ranges(spans);
    let mut out = String::with_capacity(text.len() + merged.len() * (open.len() + close.len()));
    let mut ranges = merged.iter().peekable();
    let mut inside = false;

    for (pos, ch) in text.chars().enumerate() {
        while let Some(&&(_, end)) = ranges.peek() {
            if end < pos {
                ranges.next();
            } else {
                break;
            }
        }

        let covered = matches!(ranges.peek(), Some(&&(start, end)) if start <= pos && pos <= end);
        if covered && !inside {
            out.push_str(open);
            inside = true;
        } else if !covered && inside {
            out.push_str(close);
            inside = false;
        }
        out.push(ch);
    }

    if inside {
        out.push_str(close);
    }
    out
}
