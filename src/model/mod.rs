use serde::Serialize;
use serde_json::{Map, Value};

/// Sentinel warband meaning "applies to every warband".
pub const UNIVERSAL_WARBAND: &str = "universal";

/// Trim and lower-case a value for comparisons.
pub fn norm(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilitySource {
    Ability,
    BattleTrait,
}

impl AbilitySource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ability => "ability",
            Self::BattleTrait => "battle trait",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Weapon {
    pub runemark: String,
    pub min_range: String,
    pub max_range: String,
    pub attacks: String,
    pub strength: String,
    pub dmg_hit: String,
    pub dmg_crit: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Fighter {
    pub id: String,
    pub name: String,
    pub grand_alliance: String,
    pub warband: String,
    pub subfaction: String,
    pub runemarks: Vec<String>,
    pub description: String,
    pub points: Option<f64>,
    pub movement: Option<f64>,
    pub toughness: Option<f64>,
    pub wounds: Option<f64>,
    pub weapons: Vec<Weapon>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ability {
    pub source: AbilitySource,
    pub name: String,
    pub title: String,
    pub warband: String,
    pub runemarks: Vec<String>,
    pub cost: String,
    pub description: String,
    pub grand_alliance: String,
}

impl Ability {
    /// Name shown on cards: `name`, falling back to `title`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.title
        } else {
            &self.name
        }
    }

    pub fn is_universal(&self) -> bool {
        norm(&self.warband) == UNIVERSAL_WARBAND
    }
}

impl Fighter {
    pub fn belongs_to(&self, warband_key: &str) -> bool {
        norm(&self.warband) == warband_key || norm(&self.subfaction) == warband_key
    }

    /// Exact, case-sensitive membership.
    pub fn has_runemark(&self, runemark: &str) -> bool {
        self.runemarks.iter().any(|r| r == runemark)
    }
}

/// Render a numeric stat the way the dataset writes it (`3`, not `3.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First key present with a non-null value, rendered as text.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
        .and_then(scalar_text)
        .unwrap_or_default()
}

/// First key whose value is a non-empty scalar or any list, as a list of strings.
fn list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(scalar_text)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            Some(v) => {
                if let Some(s) = scalar_text(v) {
                    let s = s.trim();
                    if !s.is_empty() {
                        return vec![s.to_string()];
                    }
                }
            }
            None => {}
        }
    }
    Vec::new()
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn parse_weapon(value: &Value) -> Option<Weapon> {
    let obj = value.as_object()?;
    Some(Weapon {
        runemark: text_field(obj, &["runemark"]),
        min_range: text_field(obj, &["min_range"]),
        max_range: text_field(obj, &["max_range"]),
        attacks: text_field(obj, &["attacks"]),
        strength: text_field(obj, &["strength"]),
        dmg_hit: text_field(obj, &["dmg_hit"]),
        dmg_crit: text_field(obj, &["dmg_crit"]),
    })
}

/// Normalize one fighter record. Non-object values yield `None`.
pub fn parse_fighter(value: &Value) -> Option<Fighter> {
    let obj = value.as_object()?;
    let weapons = match obj.get("weapons") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_weapon).collect(),
        _ => Vec::new(),
    };
    Some(Fighter {
        id: text_field(obj, &["_id"]),
        name: text_field(obj, &["name"]),
        grand_alliance: text_field(obj, &["grand_alliance", "grandAlliance", "GA"]),
        warband: text_field(obj, &["warband"]),
        subfaction: text_field(obj, &["subfaction"]),
        runemarks: list_field(obj, &["runemarks"]),
        description: text_field(obj, &["description"]),
        points: number_field(obj, "points"),
        movement: number_field(obj, "movement"),
        toughness: number_field(obj, "toughness"),
        wounds: number_field(obj, "wounds"),
        weapons,
    })
}

/// Normalize one ability or battle trait record. Non-object values yield `None`.
pub fn parse_ability(value: &Value, source: AbilitySource) -> Option<Ability> {
    let obj = value.as_object()?;
    Some(Ability {
        source,
        name: text_field(obj, &["name"]),
        title: text_field(obj, &["title"]),
        warband: text_field(obj, &["warband"]),
        runemarks: list_field(obj, &["runemarks", "runemark"]),
        cost: text_field(obj, &["cost", "Cost"]).trim().to_string(),
        description: text_field(obj, &["description"]),
        grand_alliance: text_field(
            obj,
            &["grand_alliance", "grandAlliance", "grand alliance", "GA"],
        ),
    })
}

pub fn parse_fighters(items: &[Value]) -> Vec<Fighter> {
    items.iter().filter_map(parse_fighter).collect()
}

pub fn parse_abilities(items: &[Value], source: AbilitySource) -> Vec<Ability> {
    items
        .iter()
        .filter_map(|v| parse_ability(v, source))
        .collect()
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn runemark_scalar_and_list_normalize_alike() {
        let a = parse_ability(&json!({"name": "a", "runemark": "Bulwark"}), AbilitySource::Ability)
            .unwrap();
        let b = parse_ability(
            &json!({"name": "b", "runemarks": ["Bulwark"]}),
            AbilitySource::Ability,
        )
        .unwrap();
        assert_eq!(a.runemarks, b.runemarks);
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let f = parse_fighter(&json!({
            "_id": 42,
            "name": null,
            "runemarks": "hero",
            "points": "125",
            "wounds": {"bad": true},
            "weapons": "none"
        }))
        .unwrap();
        assert_eq!(f.id, "42");
        assert_eq!(f.name, "");
        assert_eq!(f.runemarks, vec!["hero"]);
        assert_eq!(f.points, Some(125.0));
        assert_eq!(f.wounds, None);
        assert!(f.weapons.is_empty());
    }

    #[test]
    fn non_objects_are_skipped() {
        let fighters = parse_fighters(&[json!(1), json!("x"), json!({"name": "ok"})]);
        assert_eq!(fighters.len(), 1);
    }

    #[test]
    fn ability_fallback_keys() {
        let a = parse_ability(
            &json!({"title": "Onslaught", "Cost": 2, "GA": "Chaos"}),
            AbilitySource::BattleTrait,
        )
        .unwrap();
        assert_eq!(a.display_name(), "Onslaught");
        assert_eq!(a.cost, "2");
        assert_eq!(a.grand_alliance, "Chaos");
    }

    #[test]
    fn format_number_drops_trailing_zero() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
