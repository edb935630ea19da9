use clap::{ArgAction, Parser};

use crate::facets::Facet;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "warforger",
    version,
    about = "browse Warcry fighters, abilities and battle traits",
    long_about = "WarForger fetches the Warcry fighter, ability and battle trait collections and lets you narrow them down with facets and a free-text search.\n\nExamples:\n  warforger --view abilities --warband ironskins\n  warforger --view fighters --runemark hero --points 125 -q spear\n  warforger --data-dir ./warcry_data --list-facets\n  warforger -q \"goblin spear\" --page 2 -o results.html"
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'k',
        long = "vw",
        visible_alias = "view",
        value_name = "VIEW",
        help_heading = "Browse",
        help = "Collection to browse: abilities (abilities and battle traits) or fighters."
    )]
    pub view: Option<String>,

    #[arg(
        short = 'q',
        long = "qry",
        visible_alias = "query",
        value_name = "TEXT",
        help_heading = "Browse",
        help = "Free-text search; every word must appear in name, description, warband or runemarks."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Browse",
        help = "Results page to show (clamped to the last page)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'l',
        long = "lf",
        visible_alias = "list-facets",
        help_heading = "Browse",
        help = "Print the selectable values of every facet and exit."
    )]
    pub list_facets: bool,

    #[arg(
        short = 'g',
        long = "ga",
        visible_alias = "grand-alliance",
        value_name = "VALUE",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Grand alliance to include (repeatable, comma-separated)."
    )]
    pub grand_alliance: Vec<String>,

    #[arg(
        short = 'w',
        long = "wb",
        visible_alias = "warband",
        value_name = "VALUE",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Warband to include (repeatable, comma-separated)."
    )]
    pub warband: Vec<String>,

    #[arg(
        short = 'r',
        long = "rm",
        visible_alias = "runemark",
        value_name = "VALUE",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Runemark to include (repeatable, comma-separated)."
    )]
    pub runemark: Vec<String>,

    #[arg(
        long = "cst",
        visible_alias = "cost",
        value_name = "VALUE",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Ability cost to include, e.g. double, triple, quad (abilities view)."
    )]
    pub cost: Vec<String>,

    #[arg(
        long = "pts",
        visible_alias = "points",
        value_name = "N",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Fighter points value to include (fighters view)."
    )]
    pub points: Vec<String>,

    #[arg(
        long = "mv",
        visible_alias = "movement",
        value_name = "N",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Fighter movement value to include (fighters view)."
    )]
    pub movement: Vec<String>,

    #[arg(
        long = "tgh",
        visible_alias = "toughness",
        value_name = "N",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Fighter toughness value to include (fighters view)."
    )]
    pub toughness: Vec<String>,

    #[arg(
        long = "wnd",
        visible_alias = "wounds",
        value_name = "N",
        action = ArgAction::Append,
        help_heading = "Facets",
        help = "Fighter wounds value to include (fighters view)."
    )]
    pub wounds: Vec<String>,

    #[arg(
        short = 'u',
        long = "du",
        visible_alias = "data-url",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL serving fighters.json, abilities.json and battletraits.json."
    )]
    pub data_url: Option<String>,

    #[arg(
        short = 'd',
        long = "dd",
        visible_alias = "data-dir",
        value_name = "DIR",
        help_heading = "Input",
        help = "Read the JSON collections from a local directory instead of the network."
    )]
    pub data_dir: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.warforger/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the results page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "dp",
        visible_alias = "detail-page",
        value_name = "PAGE",
        help_heading = "Output",
        help = "Page that shows one fighter, linked as <PAGE>?_id=<id>."
    )]
    pub detail_page: Option<String>,
}

impl CliArgs {
    /// Raw facet flag values, split on commas.
    pub fn facet_values(&self) -> Vec<(Facet, Vec<String>)> {
        fn split(values: &[String]) -> Vec<String> {
            values
                .iter()
                .flat_map(|v| crate::utils::split_csv(v))
                .collect()
        }
        vec![
            (Facet::GrandAlliance, split(&self.grand_alliance)),
            (Facet::Warband, split(&self.warband)),
            (Facet::Runemark, split(&self.runemark)),
            (Facet::Cost, split(&self.cost)),
            (Facet::Points, split(&self.points)),
            (Facet::Movement, split(&self.movement)),
            (Facet::Toughness, split(&self.toughness)),
            (Facet::Wounds, split(&self.wounds)),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect()
    }
}
