// Identity index: reconciling free-text names with catalog identities.
//
// Built once per catalog load. Every canonical player is inserted under all
// of its name variations; lookups run the query through the same variation
// machinery and disambiguate collisions with position and team hints.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{CanonicalPlayer, PlayerCatalog};
use crate::names::variations;

/// Optional disambiguation hints for a name lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hint<'a> {
    pub position: Option<&'a str>,
    pub team: Option<&'a str>,
}

impl<'a> Hint<'a> {
    pub fn new(position: &'a str, team: &'a str) -> Self {
        Hint {
            position: Some(position),
            team: Some(team),
        }
    }
}

/// Multimap from normalized name variant to canonical players, plus a direct
/// id map for O(1) resolution when an authoritative id is already known.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    players: Vec<CanonicalPlayer>,
    by_id: HashMap<String, usize>,
    by_variation: HashMap<String, Vec<usize>>,
}

impl IdentityIndex {
    /// Index every catalog player under the variations of its full name and,
    /// when first/last names are separately available, of their join. A
    /// variation may legitimately map to multiple distinct players.
    pub fn build(catalog: &PlayerCatalog) -> Self {
        let mut index = IdentityIndex::default();

        let mut players: Vec<CanonicalPlayer> = catalog.iter().cloned().collect();
        // Stable insertion order keeps the ambiguity fallback reproducible.
        players.sort_by(|a, b| a.id.cmp(&b.id));

        for (i, player) in players.iter().enumerate() {
            index.by_id.insert(player.id.clone(), i);

            let mut names = variations(&player.full_name);
            if let (Some(first), Some(last)) = (&player.first_name, &player.last_name) {
                for v in variations(&format!("{first} {last}")) {
                    if !names.contains(&v) {
                        names.push(v);
                    }
                }
            }
            for variation in names {
                let entry = index.by_variation.entry(variation).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        index.players = players;
        index
    }

    /// Direct lookup by authoritative catalog id.
    pub fn by_id(&self, id: &str) -> Option<&CanonicalPlayer> {
        self.by_id.get(id).map(|&i| &self.players[i])
    }

    /// Resolve a free-text name to a canonical player.
    ///
    /// Candidates are gathered across all variations of the query. Collisions
    /// are narrowed in order: exact position match, then exact team match
    /// within the position matches. If the hints fail to disambiguate, the
    /// candidate with the lowest canonical id wins so the fallback is
    /// reproducible; the ambiguity is logged.
    pub fn lookup(&self, name: &str, hint: Hint<'_>) -> Option<&CanonicalPlayer> {
        let mut candidates: Vec<usize> = Vec::new();
        for variation in variations(name) {
            if let Some(indices) = self.by_variation.get(&variation) {
                for &i in indices {
                    if !candidates.contains(&i) {
                        candidates.push(i);
                    }
                }
            }
        }

        if candidates.is_empty() {
            return None;
        }
        if candidates.len() == 1 {
            return Some(&self.players[candidates[0]]);
        }

        if let Some(position) = hint.position {
            let by_position: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| self.players[i].position.eq_ignore_ascii_case(position))
                .collect();
            if !by_position.is_empty() {
                candidates = by_position;
            }
        }

        if candidates.len() > 1 {
            if let Some(team) = hint.team {
                let by_team: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| self.players[i].team.eq_ignore_ascii_case(team))
                    .collect();
                if !by_team.is_empty() {
                    candidates = by_team;
                }
            }
        }

        let chosen = candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.players[a].id.cmp(&self.players[b].id))?;

        if candidates.len() > 1 {
            debug!(
                name,
                candidates = candidates.len(),
                chosen_id = %self.players[chosen].id,
                "ambiguous name after hint filtering; using lowest canonical id"
            );
        }

        Some(&self.players[chosen])
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleeper::PlayerPayload;
    use std::collections::HashMap as StdHashMap;

    fn catalog_from(entries: &[(&str, &str, &str, &str, &str)]) -> PlayerCatalog {
        // (id, first, last, position, team)
        let mut raw = StdHashMap::new();
        for &(id, first, last, pos, team) in entries {
            raw.insert(
                id.to_string(),
                PlayerPayload {
                    first_name: Some(first.to_string()),
                    last_name: Some(last.to_string()),
                    full_name: Some(format!("{first} {last}")),
                    position: Some(pos.to_string()),
                    team: Some(team.to_string()),
                },
            );
        }
        PlayerCatalog::from_payloads(&raw)
    }

    #[test]
    fn lookup_exact_name() {
        let catalog = catalog_from(&[("1", "Josh", "Allen", "QB", "BUF")]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("Josh Allen", Hint::default()).unwrap();
        assert_eq!(p.id, "1");
    }

    #[test]
    fn lookup_matches_across_punctuation() {
        // Catalog stores "AJ Brown"; the ranking list says "A.J. Brown".
        let catalog = catalog_from(&[("7", "AJ", "Brown", "WR", "PHI")]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("A.J. Brown", Hint::new("WR", "PHI")).unwrap();
        assert_eq!(p.id, "7");
        // And the reverse spelling direction.
        assert!(index.lookup("AJ Brown", Hint::default()).is_some());
    }

    #[test]
    fn lookup_matches_suffix_differences() {
        let catalog = catalog_from(&[("9", "Michael", "Pittman", "WR", "IND")]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("Michael Pittman Jr.", Hint::default()).unwrap();
        assert_eq!(p.id, "9");
    }

    #[test]
    fn curated_dj_moore_does_not_match_david_moore() {
        let catalog = catalog_from(&[
            ("100", "DJ", "Moore", "WR", "CAR"),
            ("200", "David", "Moore", "WR", "SEA"),
        ]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("D.J. Moore", Hint::new("WR", "CAR")).unwrap();
        assert_eq!(p.id, "100");
    }

    #[test]
    fn position_hint_disambiguates() {
        let catalog = catalog_from(&[
            ("10", "Mike", "Williams", "WR", "LAC"),
            ("20", "Mike", "Williams", "TE", "NYJ"),
        ]);
        let index = IdentityIndex::build(&catalog);
        let p = index
            .lookup(
                "Mike Williams",
                Hint {
                    position: Some("TE"),
                    team: None,
                },
            )
            .unwrap();
        assert_eq!(p.id, "20");
    }

    #[test]
    fn team_hint_refines_position_matches() {
        let catalog = catalog_from(&[
            ("10", "Mike", "Williams", "WR", "LAC"),
            ("20", "Mike", "Williams", "WR", "TB"),
        ]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("Mike Williams", Hint::new("WR", "TB")).unwrap();
        assert_eq!(p.id, "20");
    }

    #[test]
    fn unresolvable_hints_fall_back_to_lowest_id() {
        let catalog = catalog_from(&[
            ("30", "Mike", "Williams", "WR", "LAC"),
            ("04", "Mike", "Williams", "WR", "TB"),
        ]);
        let index = IdentityIndex::build(&catalog);
        // Hint team matches neither; the lowest canonical id wins.
        let p = index.lookup("Mike Williams", Hint::new("WR", "DAL")).unwrap();
        assert_eq!(p.id, "04");
    }

    #[test]
    fn no_hint_ambiguity_is_deterministic() {
        let catalog = catalog_from(&[
            ("2", "Mike", "Williams", "WR", "LAC"),
            ("1", "Mike", "Williams", "WR", "TB"),
        ]);
        let index = IdentityIndex::build(&catalog);
        for _ in 0..5 {
            assert_eq!(index.lookup("Mike Williams", Hint::default()).unwrap().id, "1");
        }
    }

    #[test]
    fn unknown_name_returns_none() {
        let catalog = catalog_from(&[("1", "Josh", "Allen", "QB", "BUF")]);
        let index = IdentityIndex::build(&catalog);
        assert!(index.lookup("Nobody Atall", Hint::default()).is_none());
        assert!(index.lookup("", Hint::default()).is_none());
    }

    #[test]
    fn by_id_direct_map() {
        let catalog = catalog_from(&[
            ("1", "Josh", "Allen", "QB", "BUF"),
            ("2", "Lamar", "Jackson", "QB", "BAL"),
        ]);
        let index = IdentityIndex::build(&catalog);
        assert_eq!(index.by_id("2").unwrap().full_name, "Lamar Jackson");
        assert!(index.by_id("999").is_none());
    }

    #[test]
    fn nickname_equivalence_bridges_sources() {
        // Catalog uses the formal first name; rankings use the nickname.
        let catalog = catalog_from(&[("5", "Cameron", "Ward", "QB", "TEN")]);
        let index = IdentityIndex::build(&catalog);
        let p = index.lookup("Cam Ward", Hint::default()).unwrap();
        assert_eq!(p.id, "5");
    }
}
