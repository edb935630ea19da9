use serde_json::{json, Value};

use crate::engine::{self, FilterContext};
use crate::facets::{self, Facet, FacetSelection};
use crate::loader::{self, Collection, DataSource, LoadOptions};
use crate::model::{self, AbilitySource, Ability, Fighter};
use crate::output;
use crate::pagination;
use crate::session::{Session, View};

fn fighter_fixture() -> Vec<Value> {
    vec![
        json!({
            "_id": "f1", "name": "Ironskin Boss", "grand_alliance": "Destruction",
            "warband": "Ironskins", "runemarks": ["Leader", "Brute"],
            "points": 240, "movement": 4, "toughness": 5, "wounds": 30,
            "weapons": [{"runemark": "axe", "min_range": 0, "max_range": 1,
                         "attacks": 5, "strength": 5, "dmg_hit": 2, "dmg_crit": 5}]
        }),
        json!({
            "_id": "f2", "name": "Goblin Spearman", "grand_alliance": "Order",
            "warband": "Cities", "subfaction": "ironskins", "runemarks": ["Minion"],
            "points": 60, "movement": 4, "toughness": 3, "wounds": 8
        }),
        json!({
            "_id": "f3", "name": "Deathrattle Skeleton", "grand_alliance": "Death",
            "warband": "Deathrattle", "runemarks": ["Minion"],
            "points": "75", "movement": 4, "toughness": 3, "wounds": 10
        }),
        json!({"_id": "f4", "name": "Drifter", "runemarks": []}),
    ]
}

fn ability_fixture() -> Vec<Value> {
    vec![
        json!({"name": "Rampage", "warband": "ironskins", "runemarks": ["Brute"], "cost": "double",
               "description": "Make a bonus move action."}),
        json!({"name": "Rush", "warband": "universal", "cost": "double",
               "description": "Add 1 to movement."}),
        json!({"name": "Shield Wall", "warband": "Cities", "runemark": "Minion", "cost": "triple",
               "grand_alliance": "Order"}),
        json!({"name": "Grave Chill", "warband": "Deathrattle", "runemarks": ["Minion"], "cost": "quad",
               "description": "A goblin would never use a spear like this."}),
        json!({"title": "Lost Relic", "cost": "reaction"}),
    ]
}

fn traits_fixture() -> Vec<Value> {
    vec![json!({"name": "Iron Hide", "warband": "IRONSKINS", "runemark": "Brute", "cost": 3})]
}

fn fighters() -> Vec<Fighter> {
    model::parse_fighters(&fighter_fixture())
}

fn abilities() -> Vec<Ability> {
    let mut out = model::parse_abilities(&ability_fixture(), AbilitySource::Ability);
    out.extend(model::parse_abilities(
        &traits_fixture(),
        AbilitySource::BattleTrait,
    ));
    out
}

fn names<'a>(items: &[&'a Ability]) -> Vec<&'a str> {
    items.iter().map(|a| a.display_name()).collect()
}

#[test]
fn empty_selection_and_query_is_identity() {
    let fighters = fighters();
    let abilities = abilities();
    let ctx = FilterContext::new(&fighters);
    let selection = FacetSelection::new();

    let out = engine::filter(&abilities, &selection, "", &ctx);
    assert_eq!(out.len(), abilities.len());
    assert!(out.iter().zip(abilities.iter()).all(|(a, b)| std::ptr::eq(*a, b)));

    let out = engine::filter(&fighters, &selection, "   ", &ctx);
    assert_eq!(out.len(), fighters.len());
}

#[test]
fn selecting_every_option_keeps_every_valued_record() {
    let fighters = fighters();
    let abilities = abilities();
    let ctx = FilterContext::new(&fighters);
    let options = facets::ability_facet_options(&abilities, &fighters);

    for facet in View::Abilities.facets() {
        let mut selection = FacetSelection::new();
        for value in options.get(*facet) {
            selection.select(*facet, value);
        }
        let kept = engine::filter(&abilities, &selection, "", &ctx).len();
        let eligible = abilities
            .iter()
            .filter(|a| match facet {
                Facet::Warband => !a.warband.is_empty(),
                Facet::Runemark => !a.runemarks.is_empty(),
                Facet::Cost => !a.cost.is_empty(),
                _ => true,
            })
            .count();
        assert_eq!(kept, eligible, "{facet:?}");
    }

    let options = facets::fighter_facet_options(&fighters);
    for facet in View::Fighters.facets() {
        let mut selection = FacetSelection::new();
        for value in options.get(*facet) {
            selection.select(*facet, value);
        }
        let kept = engine::filter(&fighters, &selection, "", &ctx).len();
        let eligible = fighters
            .iter()
            .filter(|f| match facet {
                Facet::GrandAlliance => !f.grand_alliance.is_empty(),
                Facet::Warband => !f.warband.is_empty(),
                Facet::Runemark => !f.runemarks.is_empty(),
                Facet::Points => f.points.is_some(),
                Facet::Movement => f.movement.is_some(),
                Facet::Toughness => f.toughness.is_some(),
                Facet::Wounds => f.wounds.is_some(),
                Facet::Cost => true,
            })
            .count();
        assert_eq!(kept, eligible, "{facet:?}");
    }
}

#[test]
fn runemark_shape_does_not_matter() {
    let scalar = model::parse_abilities(
        &[json!({"name": "a", "runemark": "X"})],
        AbilitySource::Ability,
    );
    let list = model::parse_abilities(
        &[json!({"name": "b", "runemarks": ["X"]})],
        AbilitySource::Ability,
    );
    let ctx = FilterContext::new(&[]);
    let mut selection = FacetSelection::new();
    selection.select(Facet::Runemark, "X");
    assert_eq!(engine::filter(&scalar, &selection, "", &ctx).len(), 1);
    assert_eq!(engine::filter(&list, &selection, "", &ctx).len(), 1);
}

#[test]
fn query_words_may_hit_different_fields() {
    let fighters = fighters();
    let abilities = abilities();
    let ctx = FilterContext::new(&fighters);
    let selection = FacetSelection::new();

    let out = engine::filter(&abilities, &selection, "goblin spear", &ctx);
    assert_eq!(names(&out), vec!["Grave Chill"]);

    let out = engine::filter(&abilities, &selection, "rampage ironskins", &ctx);
    assert_eq!(names(&out), vec!["Rampage"]);

    let out = engine::filter(&abilities, &selection, "rampage deathrattle", &ctx);
    assert!(out.is_empty());

    let out = engine::filter(&fighters, &selection, "goblin spear", &ctx);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "f2");
}

#[test]
fn facets_combine_with_query() {
    let fighters = fighters();
    let abilities = abilities();
    let ctx = FilterContext::new(&fighters);
    let mut selection = FacetSelection::new();
    selection.select(Facet::Cost, "double");
    let out = engine::filter(&abilities, &selection, "move", &ctx);
    assert_eq!(names(&out), vec!["Rampage", "Rush"]);
    selection.select(Facet::Warband, "Universal");
    let out = engine::filter(&abilities, &selection, "", &ctx);
    assert_eq!(names(&out), vec!["Rush"]);
}

#[test]
fn numeric_cost_matches_string_selection() {
    let fighters = fighters();
    let abilities = abilities();
    let ctx = FilterContext::new(&fighters);
    let mut selection = FacetSelection::new();
    selection.select(Facet::Cost, "3");
    let out = engine::filter(&abilities, &selection, "", &ctx);
    assert_eq!(names(&out), vec!["Iron Hide"]);
}

#[test]
fn pagination_clamps_to_last_page() {
    let items: Vec<u32> = (1..=23).collect();
    let page = pagination::paginate(&items, pagination::ITEMS_PER_PAGE, 5);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.items.len(), 3);
}

#[test]
fn pagination_window_from_first_page() {
    let controls = pagination::page_controls(10, 1);
    assert_eq!(pagination::window_numbers(&controls), vec![1, 2, 3, 4, 5, 10]);
    let ellipsis_at = controls
        .iter()
        .position(|c| *c == pagination::PageControl::Ellipsis)
        .unwrap();
    assert_eq!(
        controls[ellipsis_at + 1],
        pagination::PageControl::Page {
            number: 10,
            active: false
        }
    );
    assert_eq!(
        controls
            .iter()
            .filter(|c| **c == pagination::PageControl::Ellipsis)
            .count(),
        1
    );
}

#[test]
fn universal_ability_without_runemarks_matches_every_fighter() {
    let fighters = fighters();
    let abilities = abilities();
    let rush = abilities.iter().find(|a| a.name == "Rush").unwrap();
    assert_eq!(
        engine::fighters_for_ability(rush, &fighters).len(),
        fighters.len()
    );
}

#[test]
fn derived_grand_alliance_spans_warband_and_subfaction() {
    let fighters = fighters();
    let abilities = abilities();
    let rampage = abilities.iter().find(|a| a.name == "Rampage").unwrap();

    assert_eq!(
        engine::derived_grand_alliances(rampage, &fighters),
        vec!["destruction", "order"]
    );
    assert_eq!(
        engine::display_grand_alliance(rampage, &fighters),
        "Destruction, Order"
    );

    let ctx = FilterContext::new(&fighters);
    for ga in ["order", "destruction"] {
        let mut selection = FacetSelection::new();
        selection.select(Facet::GrandAlliance, ga);
        let out = engine::filter(&abilities, &selection, "", &ctx);
        assert!(names(&out).contains(&"Rampage"), "{ga}");
    }

    let mut selection = FacetSelection::new();
    selection.select(Facet::GrandAlliance, "death");
    let out = engine::filter(&abilities, &selection, "", &ctx);
    assert_eq!(names(&out), vec!["Rush", "Grave Chill", "Lost Relic"]);
}

#[test]
fn cross_reference_requires_shared_runemark() {
    let fighters = fighters();
    let abilities = abilities();
    let rampage = abilities.iter().find(|a| a.name == "Rampage").unwrap();
    let matched: Vec<_> = engine::fighters_for_ability(rampage, &fighters)
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(matched, vec!["f1"]);
}

#[test]
fn abilities_page_groups_after_slicing() {
    let dataset = loader::Dataset {
        fighters: fighters(),
        abilities: abilities(),
    };
    let session = Session::new(View::Abilities, dataset);
    let report = output::build_report(&session, output::DEFAULT_DETAIL_PAGE);
    assert_eq!(report.total_results, 6);
    assert_eq!(report.total_pages, 1);
    assert!(report.pagination.is_empty());
    let headings: Vec<_> = report.groups.iter().map(|g| g.heading.as_str()).collect();
    assert_eq!(
        headings,
        vec![
            "CITIES",
            "DEATHRATTLE",
            "IRONSKINS",
            "IRONSKINS",
            "UNASSIGNED",
            "UNIVERSAL"
        ]
    );
    let warbands: Vec<_> = report.groups[2..4]
        .iter()
        .map(|g| (g.warband.as_str(), g.cards.len()))
        .collect();
    assert_eq!(warbands, vec![("ironskins", 1), ("IRONSKINS", 1)]);
}

#[test]
fn fighter_report_renders_as_json() {
    let dataset = loader::Dataset {
        fighters: fighters(),
        abilities: Vec::new(),
    };
    let mut session = Session::new(View::Fighters, dataset);
    session.toggle_facet(Facet::Runemark, "minion", true);
    let report = output::build_report(&session, "detail.html");
    let json: Value = serde_json::from_slice(&output::render_json(&report)).unwrap();
    assert_eq!(json["total_results"], 2);
    assert_eq!(json["filters"], "RUNEMARK: minion");
    assert_eq!(json["groups"][0]["warband"], "Cities");
    assert_eq!(
        json["groups"][0]["cards"][0]["detail_url"],
        "detail.html?_id=f2"
    );
}

#[tokio::test]
async fn loads_collections_from_directory() {
    let dir = std::env::temp_dir().join(format!("warforger-data-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let write = |c: Collection, v: Value| {
        let path = dir.join(c.file_name());
        async move { tokio::fs::write(path, v.to_string()).await.unwrap() }
    };
    write(Collection::Fighters, Value::Array(fighter_fixture())).await;
    write(Collection::Abilities, Value::Array(ability_fixture())).await;
    write(Collection::BattleTraits, json!({"not": "an array"})).await;

    let options = LoadOptions {
        source: DataSource::Directory(dir.clone()),
        ..Default::default()
    };
    let dataset = loader::load_abilities(&options).await.unwrap();
    assert_eq!(dataset.fighters.len(), 4);
    assert_eq!(dataset.abilities.len(), 5);
    assert!(dataset
        .abilities
        .iter()
        .all(|a| a.source == AbilitySource::Ability));

    let fighters_only = loader::load_fighters(&options).await.unwrap();
    assert!(fighters_only.abilities.is_empty());

    let missing = LoadOptions {
        source: DataSource::Directory(dir.join("missing")),
        ..Default::default()
    };
    assert!(matches!(
        loader::load_fighters(&missing).await,
        Err(loader::LoadError::FileRead { .. })
    ));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
