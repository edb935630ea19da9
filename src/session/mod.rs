use serde::Serialize;

use crate::engine::{self, FilterContext};
use crate::facets::{self, Facet, FacetOptions, FacetSelection};
use crate::loader::Dataset;
use crate::model::{Ability, Fighter};
use crate::pagination::{self, Page, ITEMS_PER_PAGE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Abilities,
    Fighters,
}

impl View {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "abilities" | "ability" | "traits" => Some(Self::Abilities),
            "fighters" | "fighter" => Some(Self::Fighters),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Abilities => "abilities",
            Self::Fighters => "fighters",
        }
    }

    pub fn facets(&self) -> &'static [Facet] {
        match self {
            Self::Abilities => &[
                Facet::GrandAlliance,
                Facet::Warband,
                Facet::Runemark,
                Facet::Cost,
            ],
            Self::Fighters => &[
                Facet::GrandAlliance,
                Facet::Warband,
                Facet::Runemark,
                Facet::Points,
                Facet::Movement,
                Facet::Toughness,
                Facet::Wounds,
            ],
        }
    }

    pub fn supports(&self, facet: Facet) -> bool {
        self.facets().contains(&facet)
    }
}

/// Results of one view after filtering.
#[derive(Clone, Debug)]
pub enum Results<'a> {
    Abilities(Vec<&'a Ability>),
    Fighters(Vec<&'a Fighter>),
}

impl Results<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Abilities(v) => v.len(),
            Self::Fighters(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One page of results, already bucketed by warband.
#[derive(Clone, Debug)]
pub enum PageGroups<'a> {
    Abilities(Vec<(String, Vec<&'a Ability>)>),
    Fighters(Vec<(String, Vec<&'a Fighter>)>),
}

#[derive(Clone, Debug)]
pub struct ResultsPage<'a> {
    pub total_results: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub groups: PageGroups<'a>,
}

/// UI state shared by every interaction: loaded data, active facets, query
/// and current page.
#[derive(Clone, Debug)]
pub struct Session {
    view: View,
    dataset: Dataset,
    selection: FacetSelection,
    query: String,
    current_page: usize,
}

impl Session {
    pub fn new(view: View, dataset: Dataset) -> Self {
        Self {
            view,
            dataset,
            selection: FacetSelection::new(),
            query: String::new(),
            current_page: 1,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Check or uncheck one facet value. Returns to the first page.
    pub fn toggle_facet(&mut self, facet: Facet, value: &str, checked: bool) {
        if checked {
            self.selection.select(facet, value);
        } else {
            self.selection.deselect(facet, value);
        }
        self.current_page = 1;
    }

    /// Replace the search text. Returns to the first page.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.current_page = 1;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next_page(&mut self) {
        let last = self.page().total_pages;
        if self.current_page < last {
            self.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.query.clear();
        self.current_page = 1;
    }

    pub fn facet_options(&self) -> FacetOptions {
        match self.view {
            View::Abilities => {
                facets::ability_facet_options(&self.dataset.abilities, &self.dataset.fighters)
            }
            View::Fighters => facets::fighter_facet_options(&self.dataset.fighters),
        }
    }

    /// Active filters as `KEY: a, b` lines, or `none`.
    pub fn filters_summary(&self) -> String {
        let lines: Vec<String> = self
            .selection
            .iter()
            .map(|(facet, values)| format!("{}: {}", facet.key().to_uppercase(), values.join(", ")))
            .collect();
        if lines.is_empty() {
            "none".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn results(&self) -> Results<'_> {
        let ctx = FilterContext::new(&self.dataset.fighters);
        match self.view {
            View::Abilities => Results::Abilities(engine::filter(
                &self.dataset.abilities,
                &self.selection,
                &self.query,
                &ctx,
            )),
            View::Fighters => Results::Fighters(engine::filter(
                &self.dataset.fighters,
                &self.selection,
                &self.query,
                &ctx,
            )),
        }
    }

    /// Current page of results. The stored page is not changed; see
    /// [`Session::clamp_page`].
    pub fn page(&self) -> ResultsPage<'_> {
        match self.results() {
            Results::Abilities(items) => {
                let page = pagination::paginate(&items, ITEMS_PER_PAGE, self.current_page);
                let groups = pagination::group_by_warband(page.items.clone(), |a| {
                    a.warband.as_str()
                });
                results_page(&page, PageGroups::Abilities(groups))
            }
            Results::Fighters(items) => {
                let ordered = pagination::order_by_warband(items, |f| f.warband.as_str());
                let page = pagination::paginate(&ordered, ITEMS_PER_PAGE, self.current_page);
                let groups = pagination::group_by_warband(page.items.clone(), |f| {
                    f.warband.as_str()
                });
                results_page(&page, PageGroups::Fighters(groups))
            }
        }
    }

    /// Pull the stored page back into range after the result set shrank.
    pub fn clamp_page(&mut self) -> usize {
        let total = pagination::total_pages(self.results().len(), ITEMS_PER_PAGE);
        if self.current_page > total {
            self.current_page = total;
        }
        self.current_page
    }
}

fn results_page<'a, T>(page: &Page<T>, groups: PageGroups<'a>) -> ResultsPage<'a> {
    ResultsPage {
        total_results: page.total_results,
        total_pages: page.total_pages,
        current_page: page.current_page,
        groups,
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::model::AbilitySource;

    fn fighters(n: usize) -> Vec<Fighter> {
        (0..n)
            .map(|i| Fighter {
                id: i.to_string(),
                name: format!("fighter {i}"),
                grand_alliance: "Order".to_string(),
                warband: if i % 2 == 0 { "Zeta" } else { "alpha" }.to_string(),
                points: Some(100.0 + i as f64),
                ..Default::default()
            })
            .collect()
    }

    fn session(view: View) -> Session {
        let abilities = vec![Ability {
            source: AbilitySource::Ability,
            name: "Onslaught".to_string(),
            title: String::new(),
            warband: "alpha".to_string(),
            runemarks: Vec::new(),
            cost: "double".to_string(),
            description: String::new(),
            grand_alliance: String::new(),
        }];
        Session::new(
            view,
            Dataset {
                fighters: fighters(23),
                abilities,
            },
        )
    }

    #[test]
    fn toggling_resets_page_and_updates_summary() {
        let mut s = session(View::Fighters);
        s.go_to_page(3);
        s.toggle_facet(Facet::Warband, "Alpha", true);
        s.toggle_facet(Facet::Points, "101", true);
        assert_eq!(s.current_page(), 1);
        assert_eq!(s.filters_summary(), "WARBAND: alpha\nPOINTS: 101");
        s.toggle_facet(Facet::Points, "101", false);
        assert_eq!(s.filters_summary(), "WARBAND: alpha");
        s.clear();
        assert_eq!(s.filters_summary(), "none");
    }

    #[test]
    fn fighters_page_walks_warband_groups_in_order() {
        let s = session(View::Fighters);
        let page = s.page();
        assert_eq!(page.total_results, 23);
        assert_eq!(page.total_pages, 3);
        match page.groups {
            PageGroups::Fighters(groups) => {
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].0, "alpha");
                assert_eq!(groups[0].1.len(), 10);
            }
            PageGroups::Abilities(_) => panic!("wrong view"),
        }
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let mut s = session(View::Fighters);
        s.go_to_page(9);
        assert_eq!(s.page().current_page, 3);
        assert_eq!(s.clamp_page(), 3);
        s.next_page();
        assert_eq!(s.current_page(), 3);
        s.previous_page();
        assert_eq!(s.current_page(), 2);
    }

    #[test]
    fn query_is_normalized() {
        let mut s = session(View::Abilities);
        s.go_to_page(2);
        s.set_query("  ONSLAUGHT ");
        assert_eq!(s.query(), "onslaught");
        assert_eq!(s.current_page(), 1);
        assert_eq!(s.results().len(), 1);
    }
}
