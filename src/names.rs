// Player name normalization and variant enumeration.
//
// Ranking lists key players by free-text name ("D.J. Moore", "Kenneth
// Walker III") while the Sleeper catalog keys them by opaque ID. Everything
// that crosses that boundary goes through `normalize` / `variations` so the
// identity index can match the two worlds.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Generational suffixes dropped from the end of a name. Compared after
/// punctuation removal, so "Jr." and "jr" both match.
const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Default nickname equivalences, nickname -> formal first name. The table is
/// bidirectional in effect: both spellings canonicalize to the formal form,
/// so "Cam Ward" and "Cameron Ward" normalize identically. Substitution is
/// whole-token only; curated full-name entries are checked first and win.
const NICKNAMES: &[(&str, &str)] = &[
    ("cam", "cameron"),
    ("dj", "david"),
    ("mike", "michael"),
    ("matt", "matthew"),
    ("chris", "christopher"),
    ("rob", "robert"),
    ("will", "william"),
    ("zach", "zachary"),
    ("alex", "alexander"),
    ("jeff", "jeffrey"),
    ("dan", "daniel"),
    ("gabe", "gabriel"),
];

/// Curated full-name entries for known-ambiguous players. A hit here
/// bypasses generic nickname substitution entirely: the real "DJ Moore" is
/// not legally "David", so the `dj -> david` default must not rewrite him.
/// Values may also redirect a common alias to the catalog spelling.
const CURATED: &[(&str, &str)] = &[
    ("dj moore", "dj moore"),
    ("dj chark", "dj chark"),
    ("dj turner", "dj turner"),
    ("hollywood brown", "marquise brown"),
];

fn nickname_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        for &(nick, formal) in NICKNAMES {
            m.insert(nick, formal);
        }
        m
    })
}

fn curated_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| CURATED.iter().copied().collect())
}

/// Lowercase, strip periods/apostrophes, collapse whitespace, and drop a
/// trailing generational suffix. This is the shared base form that both
/// `normalize` and `variations` build on; it performs no nickname handling.
fn canonical_base(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.trim().chars() {
        match c {
            '.' | '\'' | '\u{2019}' => {}
            c if c.is_whitespace() => cleaned.push(' '),
            c => cleaned.extend(c.to_lowercase()),
        }
    }

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() > 1 {
        if let Some(last) = tokens.last() {
            if GENERATIONAL_SUFFIXES.contains(last) {
                tokens.pop();
            }
        }
    }
    tokens.join(" ")
}

/// Canonicalize a free-text player name into a matchable form.
///
/// Lowercases, removes periods and apostrophes, collapses internal
/// whitespace, strips a trailing generational suffix, and applies the
/// nickname table to whole tokens. Curated full-name entries take precedence
/// over generic nickname substitution. Idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    let base = canonical_base(name);
    if base.is_empty() {
        return base;
    }
    if let Some(curated) = curated_table().get(base.as_str()) {
        return (*curated).to_string();
    }
    let table = nickname_table();
    base.split(' ')
        .map(|token| *table.get(token).unwrap_or(&token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Enumerate plausible variant spellings of a name, deduplicated, with the
/// normalized base form first.
///
/// Produces the normalized form, the punctuation-stripped base without
/// nickname substitution, a periods-expanded-to-spaces form ("D.J. Moore"
/// -> "d j moore"), a first+last-only form (middle tokens dropped), and any
/// curated entry for the full name. Empty input yields an empty set.
pub fn variations(name: &str) -> Vec<String> {
    let base = canonical_base(name);
    if base.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    push(normalize(name));
    push(base.clone());

    // Periods expanded to spaces: "d.j. moore" reads as "d j moore".
    let spaced = name
        .trim()
        .to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .replace('.', " ");
    push(canonical_base(&spaced));

    // First + last only, dropping middle tokens.
    let tokens: Vec<&str> = base.split(' ').collect();
    if tokens.len() > 2 {
        let first_last = format!("{} {}", tokens[0], tokens[tokens.len() - 1]);
        push(normalize(&first_last));
        push(first_last);
    }

    if let Some(curated) = curated_table().get(base.as_str()) {
        push((*curated).to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("A.J. Brown"), "aj brown");
        assert_eq!(normalize("AJ Brown"), "aj brown");
        assert_eq!(normalize("Ja'Marr Chase"), "jamarr chase");
    }

    #[test]
    fn normalize_case_insensitive() {
        assert_eq!(normalize("Josh ALLEN"), normalize("josh allen"));
    }

    #[test]
    fn normalize_strips_generational_suffixes() {
        assert_eq!(normalize("Michael Pittman Jr."), "michael pittman");
        assert_eq!(normalize("Kenneth Walker III"), "kenneth walker");
        assert_eq!(normalize("Odell Beckham Jr"), "odell beckham");
        assert_eq!(normalize("Marvin Harrison Sr."), "marvin harrison");
        assert_eq!(normalize("Brian Robinson IV"), "brian robinson");
    }

    #[test]
    fn normalize_does_not_strip_suffix_as_whole_name() {
        // A single-token name that happens to be a suffix is left alone.
        assert_eq!(normalize("Jr"), "jr");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Josh   Allen "), "josh allen");
        assert_eq!(normalize("Josh\tAllen"), "josh allen");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in [
            "A.J. Brown",
            "Michael Pittman Jr.",
            "D.J. Moore",
            "Cam Ward",
            "Ja'Marr Chase",
        ] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn normalize_applies_nickname_table_to_whole_tokens() {
        assert_eq!(normalize("Cam Ward"), "cameron ward");
        assert_eq!(normalize("Cameron Ward"), "cameron ward");
        assert_eq!(normalize("Mike Evans"), "michael evans");
    }

    #[test]
    fn normalize_never_substitutes_partial_tokens() {
        // "Camden" contains "cam" but is not the whole token.
        assert_eq!(normalize("Camden Smith"), "camden smith");
        assert_eq!(normalize("Mikel Jones"), "mikel jones");
    }

    #[test]
    fn curated_entry_wins_over_generic_nickname_rule() {
        // The generic dj -> david rule would produce "david moore" and
        // mismatch the real WR; the curated entry blocks it.
        assert_eq!(normalize("DJ Moore"), "dj moore");
        assert_eq!(normalize("D.J. Moore"), "dj moore");
        assert_eq!(normalize("DJ Chark"), "dj chark");
        // Non-curated DJ still gets the default expansion.
        assert_eq!(normalize("DJ Smith"), "david smith");
    }

    #[test]
    fn curated_alias_redirects_to_catalog_spelling() {
        assert_eq!(normalize("Hollywood Brown"), "marquise brown");
    }

    #[test]
    fn variations_empty_input() {
        assert!(variations("").is_empty());
        assert!(variations("   ").is_empty());
    }

    #[test]
    fn variations_always_contains_normalized_form() {
        for name in ["Josh Allen", "D.J. Moore", "Kenneth Walker III", "Cam Ward"] {
            let vars = variations(name);
            assert!(
                vars.contains(&normalize(name)),
                "variations({name:?}) missing normalize output: {vars:?}"
            );
            assert_eq!(vars[0], normalize(name));
        }
    }

    #[test]
    fn variations_expands_periods_to_spaces() {
        let vars = variations("D.J. Moore");
        assert!(vars.contains(&"dj moore".to_string()));
        assert!(vars.contains(&"d j moore".to_string()));
    }

    #[test]
    fn variations_first_last_only() {
        let vars = variations("Kenneth Scott Walker III");
        assert!(vars.contains(&"kenneth walker".to_string()));
    }

    #[test]
    fn variations_are_deduplicated() {
        let vars = variations("Josh Allen");
        let mut sorted = vars.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(vars.len(), sorted.len(), "duplicates in {vars:?}");
    }

    #[test]
    fn variations_keeps_pre_nickname_base_form() {
        // The raw base "cam ward" must survive alongside the canonical
        // "cameron ward" so a catalog storing either spelling still matches.
        let vars = variations("Cam Ward");
        assert!(vars.contains(&"cameron ward".to_string()));
        assert!(vars.contains(&"cam ward".to_string()));
    }
}
