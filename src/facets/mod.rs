use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

use crate::model::{format_number, norm, Ability, Fighter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    GrandAlliance,
    Warband,
    Runemark,
    Cost,
    Points,
    Movement,
    Toughness,
    Wounds,
}

impl Facet {
    /// Selection key, as shown in the active-filter summary.
    pub fn key(&self) -> &'static str {
        match self {
            Self::GrandAlliance => "grandAlliance",
            Self::Warband => "warband",
            Self::Runemark => "runemark",
            Self::Cost => "cost",
            Self::Points => "points",
            Self::Movement => "movement",
            Self::Toughness => "toughness",
            Self::Wounds => "wounds",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GrandAlliance => "Grand Alliance",
            Self::Warband => "Warband",
            Self::Runemark => "Runemark",
            Self::Cost => "Cost",
            Self::Points => "Points",
            Self::Movement => "Movement",
            Self::Toughness => "Toughness",
            Self::Wounds => "Wounds",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Points | Self::Movement | Self::Toughness | Self::Wounds
        )
    }
}

/// Active checkbox values per facet. Values are stored normalized, in the
/// order they were first selected.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FacetSelection {
    active: BTreeMap<Facet, Vec<String>>,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the selection changed.
    pub fn select(&mut self, facet: Facet, value: &str) -> bool {
        let value = norm(value);
        if value.is_empty() {
            return false;
        }
        let values = self.active.entry(facet).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    /// Returns true when the selection changed.
    pub fn deselect(&mut self, facet: Facet, value: &str) -> bool {
        let value = norm(value);
        let Some(values) = self.active.get_mut(&facet) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != &value);
        let changed = values.len() != before;
        if values.is_empty() {
            self.active.remove(&facet);
        }
        changed
    }

    pub fn values(&self, facet: Facet) -> &[String] {
        self.active.get(&facet).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.active.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Non-empty facets in facet order.
    pub fn iter(&self) -> impl Iterator<Item = (Facet, &[String])> {
        self.active
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(f, v)| (*f, v.as_slice()))
    }
}

/// Selectable values per facet, in display order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FacetOptions {
    options: BTreeMap<Facet, Vec<String>>,
}

impl FacetOptions {
    pub fn get(&self, facet: Facet) -> &[String] {
        self.options.get(&facet).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, &[String])> {
        self.options.iter().map(|(f, v)| (*f, v.as_slice()))
    }

    fn insert(&mut self, facet: Facet, values: Vec<String>) {
        self.options.insert(facet, values);
    }
}

fn distinct_sorted<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    values
        .into_iter()
        .map(|v| norm(&v))
        .filter(|v| !v.is_empty())
        .unique()
        .sorted_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)))
        .collect()
}

fn distinct_numeric<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .map(format_number)
        .collect()
}

/// Options for the abilities view. Grand alliances come from the fighter
/// collection since ability records often omit them.
pub fn ability_facet_options(abilities: &[Ability], fighters: &[Fighter]) -> FacetOptions {
    let mut out = FacetOptions::default();
    out.insert(
        Facet::GrandAlliance,
        distinct_sorted(fighters.iter().map(|f| f.grand_alliance.clone())),
    );
    out.insert(
        Facet::Warband,
        distinct_sorted(abilities.iter().map(|a| a.warband.clone())),
    );
    out.insert(
        Facet::Runemark,
        distinct_sorted(abilities.iter().flat_map(|a| a.runemarks.iter().cloned())),
    );
    out.insert(
        Facet::Cost,
        distinct_sorted(abilities.iter().map(|a| a.cost.clone())),
    );
    out
}

pub fn fighter_facet_options(fighters: &[Fighter]) -> FacetOptions {
    let known = |values: Vec<String>| {
        values
            .into_iter()
            .filter(|v| v != "unknown")
            .collect::<Vec<_>>()
    };

    let mut out = FacetOptions::default();
    out.insert(
        Facet::GrandAlliance,
        known(distinct_sorted(
            fighters.iter().map(|f| f.grand_alliance.clone()),
        )),
    );
    out.insert(
        Facet::Warband,
        known(distinct_sorted(fighters.iter().map(|f| f.warband.clone()))),
    );
    out.insert(
        Facet::Runemark,
        known(distinct_sorted(
            fighters.iter().flat_map(|f| f.runemarks.iter().cloned()),
        )),
    );
    out.insert(
        Facet::Points,
        distinct_numeric(fighters.iter().map(|f| f.points)),
    );
    out.insert(
        Facet::Movement,
        distinct_numeric(fighters.iter().map(|f| f.movement)),
    );
    out.insert(
        Facet::Toughness,
        distinct_numeric(fighters.iter().map(|f| f.toughness)),
    );
    out.insert(
        Facet::Wounds,
        distinct_numeric(fighters.iter().map(|f| f.wounds)),
    );
    out
}
