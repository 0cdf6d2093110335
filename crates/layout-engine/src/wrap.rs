//! Greedy line filling

/// Split `text` into words in order. Runs of any whitespace separate words;
/// empty tokens are dropped.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Greedily fill lines from `words`.
///
/// A word joins the current line while the joined line (single spaces) still
/// fits in `max_width`. The first word of a line is always accepted, even
/// when it alone overflows.
pub fn fill_lines<'a, F>(words: &[&'a str], max_width: f64, measure: F) -> Vec<Vec<&'a str>>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();

    for &word in words {
        if current.is_empty() {
            current.push(word);
            continue;
        }

        let candidate = format!("{} {}", current.join(" "), word);
        if measure(&candidate) <= max_width {
            current.push(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap each `\n`-separated line of `text` independently.
///
/// Always yields at least one line: empty text wraps to a single empty line.
pub fn greedy_wrap<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut out = Vec::new();
    for line in text.split('\n') {
        let line_words = words(line);
        if line_words.is_empty() {
            out.push(String::new());
            continue;
        }
        out.extend(
            fill_lines(&line_words, max_width, &measure)
                .into_iter()
                .map(|words| words.join(" ")),
        );
    }
    out
}
