use super::{AbilityCard, Card, FighterCard, Report, VISIBLE_FIGHTER_LINKS};
use crate::pagination::PageControl;
use crate::utils::{escape_html, slugify};

fn render_ability_card(card: &AbilityCard, uid: usize) -> String {
    let links: Vec<String> = card
        .fighters
        .iter()
        .map(|f| {
            format!(
                r#"<a href="{}" target="_blank">{}</a>"#,
                escape_html(&f.detail_url),
                escape_html(&f.name)
            )
        })
        .collect();
    let visible = links
        .iter()
        .take(VISIBLE_FIGHTER_LINKS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let hidden = if links.len() > VISIBLE_FIGHTER_LINKS {
        format!(
            r#"<details id="hidden-fighters-{}-{uid}" class="d-inline"><summary>+</summary>{}</details>"#,
            slugify(&card.name),
            links[VISIBLE_FIGHTER_LINKS..].join(", ")
        )
    } else {
        String::new()
    };
    let description = if card.description.is_empty() {
        String::new()
    } else {
        format!("<h3>Description</h3>{}", escape_html(&card.description))
    };

    format!(
        r#"
    <div class="card m-5 bg-dark opacity-75">
      <div class="card-header">
        <h2>{name}</h2>
      </div>
      <div class="card-body">
        <p><b>Type:</b> {kind}</p>
        <p><b>Grand Alliance:</b> {ga}</p>
        <p><b>Warband:</b> {warband}</p>
        <p><b>Runemarks:</b> {runemarks}</p>
        <p><b>Cost:</b> {cost}</p>
        {description}
        <h3>Fighters</h3>
        <p>{visible}{hidden}</p>
      </div>
    </div>"#,
        name = escape_html(&card.name),
        kind = card.kind,
        ga = escape_html(&card.grand_alliance),
        warband = escape_html(&card.warband),
        runemarks = escape_html(&card.runemarks),
        cost = escape_html(&card.cost),
    )
}

fn render_fighter_card(card: &FighterCard) -> String {
    let weapons = if card.weapons.is_empty() {
        r#"<tr><td colspan="5">No weapons available</td></tr>"#.to_string()
    } else {
        card.weapons
            .iter()
            .map(|w| {
                format!(
                    "<tr><td>{}</td><td>{}-{}</td><td>{}</td><td>{}</td><td>{}/{}</td></tr>",
                    escape_html(&w.runemark),
                    escape_html(&w.min_range),
                    escape_html(&w.max_range),
                    escape_html(&w.attacks),
                    escape_html(&w.strength),
                    escape_html(&w.dmg_hit),
                    escape_html(&w.dmg_crit)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"
    <div class="card m-5 bg-dark opacity-75">
      <div class="card-header">
        <h2>{name}</h2>
      </div>
      <div class="card-body">
        <p><b>Grand Alliance:</b> {ga}</p>
        <p><b>Warband:</b> {warband}</p>
        <p><b>Subfaction:</b> {subfaction}</p>
        <p><b>Runemarks:</b> {runemarks}</p>
        <table class="table table-sm table-hover">
          <thead><tr><th>Points</th><th>Movement</th><th>Toughness</th><th>Wounds</th></tr></thead>
          <tbody><tr><td>{points}</td><td>{movement}</td><td>{toughness}</td><td>{wounds}</td></tr></tbody>
        </table>
        <div class="weapons-section">
          <h3>Weapons</h3>
          <table class="table table-sm table-hover">
            <thead><tr><th>Runemark</th><th>Range</th><th>Attack</th><th>Strength</th><th>Damage (Hit/Crit)</th></tr></thead>
            <tbody>{weapons}</tbody>
          </table>
        </div>
        <a class="btn btn-secondary mt-3" href="{detail}" target="_blank">View More Details</a>
      </div>
    </div>"#,
        name = escape_html(&card.name),
        ga = escape_html(&card.grand_alliance),
        warband = escape_html(&card.warband),
        subfaction = escape_html(&card.subfaction),
        runemarks = escape_html(&card.runemarks),
        points = escape_html(&card.points),
        movement = escape_html(&card.movement),
        toughness = escape_html(&card.toughness),
        wounds = escape_html(&card.wounds),
        detail = escape_html(&card.detail_url),
    )
}

/// The written page is a single snapshot, so controls are labels, not links.
fn page_item(label: &str, disabled: bool, active: bool) -> String {
    let mut class = String::from("page-item");
    if disabled {
        class.push_str(" disabled");
    }
    let mut current = "";
    if active {
        class.push_str(" active");
        current = r#" aria-current="page""#;
    }
    format!(r#"<li class="{class}"{current}><span class="page-link">{label}</span></li>"#)
}

fn render_pagination(controls: &[PageControl]) -> String {
    if controls.is_empty() {
        return String::new();
    }
    let items: Vec<String> = controls
        .iter()
        .map(|c| match c {
            PageControl::Previous { disabled } => page_item("Previous", *disabled, false),
            PageControl::Page { number, active } => {
                page_item(&number.to_string(), false, *active)
            }
            PageControl::Ellipsis => page_item("…", true, false),
            PageControl::Next { disabled } => page_item("Next", *disabled, false),
        })
        .collect();
    format!(
        "<ul class=\"pagination justify-content-center\">\n{}\n</ul>",
        items.join("\n")
    )
}

pub fn render_html(report: &Report) -> Vec<u8> {
    let mut sections = String::new();
    let mut uid = 0usize;
    for group in &report.groups {
        let mut cards = String::new();
        for card in &group.cards {
            match card {
                Card::Ability(c) => cards.push_str(&render_ability_card(c, uid)),
                Card::Fighter(c) => cards.push_str(&render_fighter_card(c)),
            }
            uid += 1;
        }
        sections.push_str(&format!(
            r#"
  <div class="warband-section p-4 m-4 border rounded-3" id="warband-{slug}" data-warband="{warband}">
    <h3>{heading}</h3>{cards}
  </div>"#,
            slug = slugify(&group.warband),
            warband = escape_html(&group.warband),
            heading = escape_html(&group.heading),
        ));
    }

    let pagination = render_pagination(&report.pagination);
    let filters = escape_html(&report.filters).replace('\n', "<br>");

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>WarForger - {view}</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet"/>
</head>
<body class="bg-dark text-light" data-bs-theme="dark">
  <main class="container py-4">
    <p id="{view}ResultsCount">{results}</p>
    <div id="{view}FiltersDisplay">{filters}</div>
    <nav id="{view}PaginationTop">{pagination}</nav>
    <div id="{view}Container">{sections}
    </div>
    <nav id="{view}PaginationBottom">{pagination}</nav>
  </main>
</body>
</html>
"#,
        view = report.view.name(),
        results = escape_html(&report.results_label()),
    );
    html.into_bytes()
}

#[cfg(test)]
mod report_tests {
    use super::*;
    use crate::output::FighterLink;
    use crate::session::View;

    fn ability_card(fighters: usize) -> AbilityCard {
        AbilityCard {
            kind: "ability",
            name: "Rampage <All>".to_string(),
            grand_alliance: "Destruction".to_string(),
            warband: "ironskins".to_string(),
            runemarks: "none".to_string(),
            cost: "double".to_string(),
            description: String::new(),
            fighters: (0..fighters)
                .map(|i| FighterLink {
                    name: format!("f{i}"),
                    detail_url: format!("fighter-detail.html?_id={i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn long_fighter_lists_collapse_after_five() {
        let html = render_ability_card(&ability_card(7), 0);
        assert!(html.contains("<details id=\"hidden-fighters-rampage-all-0\""));
        assert!(html.contains("Rampage &lt;All&gt;"));
        let short = render_ability_card(&ability_card(5), 1);
        assert!(!short.contains("<details"));
    }

    #[test]
    fn single_page_has_no_pagination_markup() {
        let report = Report {
            view: View::Abilities,
            query: String::new(),
            filters: "none".to_string(),
            total_results: 1,
            current_page: 1,
            total_pages: 1,
            pagination: Vec::new(),
            groups: Vec::new(),
        };
        let html = String::from_utf8(render_html(&report)).unwrap();
        assert!(!html.contains("pagination"));
        assert!(html.contains("1 result<"));
    }

    #[test]
    fn pagination_renders_as_labels() {
        let html = render_pagination(&crate::pagination::page_controls(10, 1));
        assert!(!html.contains("<a "));
        assert!(html.contains(
            r#"<li class="page-item disabled"><span class="page-link">Previous</span></li>"#
        ));
        assert!(html.contains(
            r#"<li class="page-item active" aria-current="page"><span class="page-link">1</span></li>"#
        ));
        assert!(html.contains(r#"<span class="page-link">10</span>"#));
    }
}
