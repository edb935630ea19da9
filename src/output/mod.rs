pub mod report;

use colored::Colorize;
use serde::Serialize;

use crate::engine;
use crate::facets::FacetOptions;
use crate::model::{format_number, Ability, Fighter, Weapon};
use crate::pagination::{self, PageControl};
use crate::session::{PageGroups, Session, View};

pub const DEFAULT_DETAIL_PAGE: &str = "fighter-detail.html";
pub const VISIBLE_FIGHTER_LINKS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct FighterLink {
    pub name: String,
    pub detail_url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AbilityCard {
    pub kind: &'static str,
    pub name: String,
    pub grand_alliance: String,
    pub warband: String,
    pub runemarks: String,
    pub cost: String,
    pub description: String,
    pub fighters: Vec<FighterLink>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FighterCard {
    pub name: String,
    pub grand_alliance: String,
    pub warband: String,
    pub subfaction: String,
    pub runemarks: String,
    pub points: String,
    pub movement: String,
    pub toughness: String,
    pub wounds: String,
    pub weapons: Vec<Weapon>,
    pub detail_url: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Card {
    Ability(AbilityCard),
    Fighter(FighterCard),
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportGroup {
    pub warband: String,
    pub heading: String,
    pub cards: Vec<Card>,
}

/// Everything needed to draw one results page.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub view: View,
    pub query: String,
    pub filters: String,
    pub total_results: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub pagination: Vec<PageControl>,
    pub groups: Vec<ReportGroup>,
}

impl Report {
    pub fn results_label(&self) -> String {
        let n = self.total_results;
        format!("{n} result{}", if n == 1 { "" } else { "s" })
    }
}

fn or_none(value: &str) -> String {
    if value.trim().is_empty() {
        "none".to_string()
    } else {
        value.to_string()
    }
}

fn stat(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

pub fn detail_url(detail_page: &str, id: &str) -> String {
    format!("{detail_page}?_id={}", urlencoding::encode(id))
}

pub fn ability_card(ability: &Ability, fighters: &[Fighter], detail_page: &str) -> AbilityCard {
    let name = ability.display_name();
    let links = engine::fighters_for_ability(ability, fighters)
        .into_iter()
        .map(|f| FighterLink {
            name: f.name.clone(),
            detail_url: detail_url(detail_page, &f.id),
        })
        .collect();
    AbilityCard {
        kind: ability.source.label(),
        name: if name.is_empty() {
            "Name unavailable".to_string()
        } else {
            name.to_string()
        },
        grand_alliance: or_none(&engine::display_grand_alliance(ability, fighters)),
        warband: or_none(&ability.warband).to_lowercase(),
        runemarks: or_none(&ability.runemarks.join(", ")),
        cost: or_none(&ability.cost),
        description: ability.description.clone(),
        fighters: links,
    }
}

pub fn fighter_card(fighter: &Fighter, detail_page: &str) -> FighterCard {
    FighterCard {
        name: if fighter.name.is_empty() {
            "Name unavailable".to_string()
        } else {
            fighter.name.clone()
        },
        grand_alliance: or_none(&fighter.grand_alliance),
        warband: or_none(&fighter.warband).to_lowercase(),
        subfaction: or_none(&fighter.subfaction).to_lowercase(),
        runemarks: or_none(&fighter.runemarks.join(", ")),
        points: stat(fighter.points),
        movement: stat(fighter.movement),
        toughness: stat(fighter.toughness),
        wounds: stat(fighter.wounds),
        weapons: fighter.weapons.clone(),
        detail_url: detail_url(detail_page, &fighter.id),
    }
}

fn report_group(warband: String, cards: Vec<Card>) -> ReportGroup {
    ReportGroup {
        heading: warband.to_uppercase(),
        warband,
        cards,
    }
}

pub fn build_report(session: &Session, detail_page: &str) -> Report {
    let page = session.page();
    let fighters = &session.dataset().fighters;
    let groups = match page.groups {
        PageGroups::Abilities(groups) => groups
            .into_iter()
            .map(|(warband, items)| {
                let cards = items
                    .into_iter()
                    .map(|a| Card::Ability(ability_card(a, fighters, detail_page)))
                    .collect();
                report_group(warband, cards)
            })
            .collect(),
        PageGroups::Fighters(groups) => groups
            .into_iter()
            .map(|(warband, items)| {
                let cards = items
                    .into_iter()
                    .map(|f| Card::Fighter(fighter_card(f, detail_page)))
                    .collect();
                report_group(warband, cards)
            })
            .collect(),
    };
    Report {
        view: session.view(),
        query: session.query().to_string(),
        filters: session.filters_summary(),
        total_results: page.total_results,
        current_page: page.current_page,
        total_pages: page.total_pages,
        pagination: pagination::page_controls(page.total_pages, page.current_page),
        groups,
    }
}

fn format_kv_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(":: {:<10}: {}\n", label, value));
}

fn render_controls(controls: &[PageControl]) -> String {
    controls
        .iter()
        .map(|c| match c {
            PageControl::Previous { disabled: true } => "Previous".dimmed().to_string(),
            PageControl::Previous { disabled: false } => "Previous".to_string(),
            PageControl::Page { number, active: true } => {
                format!("[{number}]").bold().green().to_string()
            }
            PageControl::Page { number, .. } => number.to_string(),
            PageControl::Ellipsis => "…".to_string(),
            PageControl::Next { disabled: true } => "Next".dimmed().to_string(),
            PageControl::Next { disabled: false } => "Next".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_ability_text(out: &mut String, card: &AbilityCard) {
    out.push_str(&format!("  {} ({})\n", card.name.bold().white(), card.kind));
    out.push_str(&format!("    Grand Alliance: {}\n", card.grand_alliance));
    out.push_str(&format!("    Warband: {}\n", card.warband));
    out.push_str(&format!("    Runemarks: {}\n", card.runemarks));
    out.push_str(&format!("    Cost: {}\n", card.cost));
    if !card.description.is_empty() {
        out.push_str(&format!("    {}\n", card.description));
    }
    let names: Vec<&str> = card
        .fighters
        .iter()
        .take(VISIBLE_FIGHTER_LINKS)
        .map(|f| f.name.as_str())
        .collect();
    let hidden = card.fighters.len().saturating_sub(VISIBLE_FIGHTER_LINKS);
    let mut line = names.join(", ");
    if hidden > 0 {
        line.push_str(&format!(" (+{hidden} more)"));
    }
    out.push_str(&format!("    Fighters: {}\n", or_none(&line)));
}

fn render_fighter_text(out: &mut String, card: &FighterCard) {
    out.push_str(&format!("  {}\n", card.name.bold().white()));
    out.push_str(&format!("    Grand Alliance: {}\n", card.grand_alliance));
    out.push_str(&format!("    Warband: {}\n", card.warband));
    out.push_str(&format!("    Subfaction: {}\n", card.subfaction));
    out.push_str(&format!("    Runemarks: {}\n", card.runemarks));
    out.push_str(&format!(
        "    Points {} | Movement {} | Toughness {} | Wounds {}\n",
        card.points, card.movement, card.toughness, card.wounds
    ));
    if card.weapons.is_empty() {
        out.push_str("    No weapons available\n");
    }
    for w in &card.weapons {
        out.push_str(&format!(
            "    - {:<10} range {}-{}  attacks {}  strength {}  damage {}/{}\n",
            w.runemark, w.min_range, w.max_range, w.attacks, w.strength, w.dmg_hit, w.dmg_crit
        ));
    }
    out.push_str(&format!("    Details: {}\n", card.detail_url));
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    format_kv_line(&mut out, "View", report.view.name());
    format_kv_line(&mut out, "Query", if report.query.is_empty() { "none" } else { report.query.as_str() });
    format_kv_line(&mut out, "Filters", &report.filters.replace('\n', "; "));
    format_kv_line(
        &mut out,
        "Results",
        &format!(
            "{} (page {}/{})",
            report.results_label(),
            report.current_page,
            report.total_pages
        ),
    );
    out.push('\n');
    for group in &report.groups {
        out.push_str(&format!("== {} ==\n", group.heading.bold().cyan()));
        for card in &group.cards {
            match card {
                Card::Ability(c) => render_ability_text(&mut out, c),
                Card::Fighter(c) => render_fighter_text(&mut out, c),
            }
        }
        out.push('\n');
    }
    if !report.pagination.is_empty() {
        out.push_str(&render_controls(&report.pagination));
        out.push('\n');
    }
    out
}

pub fn render_json(report: &Report) -> Vec<u8> {
    serde_json::to_vec_pretty(report).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(report: &Report) -> Vec<u8> {
    report::render_html(report)
}

pub fn render(report: &Report, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(report).into_bytes(),
        OutputFormat::Json => render_json(report),
        OutputFormat::Html => render_html(report),
    }
}

pub fn render_facet_options(options: &FacetOptions) -> String {
    let mut out = String::new();
    for (facet, values) in options.iter() {
        out.push_str(&format!("{}:\n", facet.label().bold()));
        if values.is_empty() {
            out.push_str("  (none)\n");
        }
        for v in values {
            out.push_str(&format!("  {v}\n"));
        }
    }
    out
}
