/// Fuzzy closeness of two message bodies.
///
/// Both sides are lowercased and have their whitespace collapsed before
/// comparison, then scored as a normalized Levenshtein ratio over chars.
/// Returns a value in `0..=100`; identical inputs score 100.
pub fn score(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);

    let len = a.len().max(b.len());
    if len == 0 {
        return 100;
    }

    let distance = levenshtein(&a, &b);
    ((len - distance) * 100 / len) as u8
}

/// Whether two message bodies are close enough to count as duplicates
pub fn is_duplicate(a: &str, b: &str, accuracy: u8) -> bool {
    score(a, b) >= accuracy
}

fn normalize(text: &str) -> Vec<char> {
    let lowered = text.to_lowercase();
    let mut out = Vec::with_capacity(lowered.len());

    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars());
    }

    out
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
