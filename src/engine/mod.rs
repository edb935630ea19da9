//! Facet and free-text filtering over loaded records.
//!
//! Every call recomputes from the source collections; nothing is indexed.

use crate::facets::{Facet, FacetSelection};
use crate::model::{norm, Ability, Fighter, UNIVERSAL_WARBAND};

/// Auxiliary data a predicate may consult.
#[derive(Clone, Copy, Debug)]
pub struct FilterContext<'a> {
    pub fighters: &'a [Fighter],
}

impl<'a> FilterContext<'a> {
    pub fn new(fighters: &'a [Fighter]) -> Self {
        Self { fighters }
    }
}

pub trait Filterable {
    /// Whether the record satisfies a non-empty set of active values for `facet`.
    fn facet_matches(&self, facet: Facet, active: &[String], ctx: &FilterContext<'_>) -> bool;

    /// Lower-cased fields searched by the free-text query.
    fn search_fields(&self) -> Vec<String>;
}

/// Split a query into lower-cased word tokens.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Every token must be a substring of at least one field.
pub fn matches_query(fields: &[String], tokens: &[String]) -> bool {
    tokens
        .iter()
        .all(|t| fields.iter().any(|field| field.contains(t.as_str())))
}

pub fn matches_selection<R: Filterable>(
    record: &R,
    selection: &FacetSelection,
    ctx: &FilterContext<'_>,
) -> bool {
    selection
        .iter()
        .all(|(facet, active)| record.facet_matches(facet, active, ctx))
}

/// Records passing every active facet and every query token, in input order.
pub fn filter<'r, R: Filterable>(
    records: &'r [R],
    selection: &FacetSelection,
    query: &str,
    ctx: &FilterContext<'_>,
) -> Vec<&'r R> {
    let tokens = query_tokens(query);
    records
        .iter()
        .filter(|r| matches_selection(*r, selection, ctx))
        .filter(|r| tokens.is_empty() || matches_query(&r.search_fields(), &tokens))
        .collect()
}

/// Fighters whose warband or subfaction is the ability's warband.
fn associated_fighters<'f>(
    warband_key: &str,
    fighters: &'f [Fighter],
) -> impl Iterator<Item = &'f Fighter> + 'f {
    let key = warband_key.to_string();
    fighters.iter().filter(move |f| f.belongs_to(&key))
}

/// Normalized grand alliances of the fighters sharing the ability's warband.
/// Empty for universal or warband-less abilities.
pub fn derived_grand_alliances(ability: &Ability, fighters: &[Fighter]) -> Vec<String> {
    let key = norm(&ability.warband);
    if key.is_empty() || key == UNIVERSAL_WARBAND {
        return Vec::new();
    }
    let mut out: Vec<String> = Vec::new();
    for f in associated_fighters(&key, fighters) {
        let ga = norm(&f.grand_alliance);
        if !ga.is_empty() && !out.contains(&ga) {
            out.push(ga);
        }
    }
    out
}

/// Grand alliance text for an ability card. Associated fighters win over the
/// record's own field.
pub fn display_grand_alliance(ability: &Ability, fighters: &[Fighter]) -> String {
    let key = norm(&ability.warband);
    let explicit = ability.grand_alliance.trim();
    if key.is_empty() || key == UNIVERSAL_WARBAND {
        return if explicit.is_empty() {
            "Universal".to_string()
        } else {
            explicit.to_string()
        };
    }
    let mut seen: Vec<&str> = Vec::new();
    for f in associated_fighters(&key, fighters) {
        let ga = f.grand_alliance.as_str();
        if !ga.is_empty() && !seen.contains(&ga) {
            seen.push(ga);
        }
    }
    if !seen.is_empty() {
        seen.join(", ")
    } else if !explicit.is_empty() {
        explicit.to_string()
    } else {
        "N/A".to_string()
    }
}

pub fn fighter_matches_ability(ability: &Ability, fighter: &Fighter) -> bool {
    let key = norm(&ability.warband);
    let warband_ok = key == UNIVERSAL_WARBAND || fighter.belongs_to(&key);
    let runemark_ok =
        ability.runemarks.is_empty() || ability.runemarks.iter().any(|r| fighter.has_runemark(r));
    warband_ok && runemark_ok
}

/// Fighters able to use an ability, in collection order.
pub fn fighters_for_ability<'f>(ability: &Ability, fighters: &'f [Fighter]) -> Vec<&'f Fighter> {
    fighters
        .iter()
        .filter(|f| fighter_matches_ability(ability, f))
        .collect()
}

impl Filterable for Ability {
    fn facet_matches(&self, facet: Facet, active: &[String], ctx: &FilterContext<'_>) -> bool {
        match facet {
            Facet::GrandAlliance => {
                let explicit = norm(&self.grand_alliance);
                let candidates = if explicit.is_empty() {
                    derived_grand_alliances(self, ctx.fighters)
                } else {
                    vec![explicit]
                };
                candidates.is_empty() || candidates.iter().any(|ga| active.contains(ga))
            }
            Facet::Warband => active.contains(&norm(&self.warband)),
            Facet::Runemark => self
                .runemarks
                .iter()
                .map(|r| norm(r))
                .any(|r| active.contains(&r)),
            Facet::Cost => active.contains(&norm(&self.cost)),
            _ => true,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.name.to_lowercase(),
            self.title.to_lowercase(),
            self.description.to_lowercase(),
            self.warband.to_lowercase(),
        ];
        fields.extend(self.runemarks.iter().map(|r| norm(r)));
        fields
    }
}

fn numeric_matches(value: Option<f64>, active: &[String]) -> bool {
    let Some(value) = value else {
        return false;
    };
    active
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .any(|v| v == value)
}

impl Filterable for Fighter {
    fn facet_matches(&self, facet: Facet, active: &[String], _ctx: &FilterContext<'_>) -> bool {
        match facet {
            Facet::GrandAlliance => active.contains(&norm(&self.grand_alliance)),
            Facet::Warband => active.contains(&norm(&self.warband)),
            Facet::Runemark => self
                .runemarks
                .iter()
                .map(|r| norm(r))
                .any(|r| active.contains(&r)),
            Facet::Points => numeric_matches(self.points, active),
            Facet::Movement => numeric_matches(self.movement, active),
            Facet::Toughness => numeric_matches(self.toughness, active),
            Facet::Wounds => numeric_matches(self.wounds, active),
            Facet::Cost => true,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.name.to_lowercase(),
            self.description.to_lowercase(),
            self.warband.to_lowercase(),
        ];
        fields.extend(self.runemarks.iter().map(|r| r.to_lowercase()));
        fields
    }
}
