fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(ca != cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}

fn distance_budget(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => (len / 3).max(3),
    }
}

/// Closest `candidates` to `input`, best first. Case, `_` and `-` are ignored,
/// so `namespace_id` finds `namespaceId`.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    let needle = normalize(input);
    if needle.is_empty() || candidates.is_empty() {
        return Vec::new();
    }
    let budget = distance_budget(needle.len());
    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let hay = normalize(candidate);
            if hay.is_empty() {
                return None;
            }
            let score = if hay == needle {
                0
            } else if hay.contains(&needle) || needle.contains(&hay) {
                1
            } else {
                edit_distance(&needle, &hay)
            };
            (score <= budget).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    let mut out: Vec<String> = Vec::new();
    for (_, candidate) in scored {
        if !out.contains(candidate) {
            out.push(candidate.clone());
        }
        if out.len() >= limit.max(1) {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::suggest;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn suggest_matches_across_naming_styles() {
        let candidates = names(&["namespaceId", "tenantId", "apiKey"]);
        assert_eq!(suggest("namespace_id", &candidates, 3), vec!["namespaceId"]);
    }

    #[test]
    fn suggest_tolerates_typos() {
        let candidates = names(&["listNamespaces", "getNamespace", "semanticSearch"]);
        assert_eq!(
            suggest("listNamespace", &candidates, 1),
            vec!["listNamespaces"]
        );
        assert_eq!(suggest("semantcSearch", &candidates, 3), vec!["semanticSearch"]);
    }

    #[test]
    fn suggest_returns_nothing_for_unrelated_input() {
        let candidates = names(&["createConnection"]);
        assert!(suggest("zzz", &candidates, 3).is_empty());
        assert!(suggest("", &candidates, 3).is_empty());
    }
}
