use crate::cli::args::CliArgs;
use crate::facets::Facet;
use crate::output::OutputFormat;
use crate::session::View;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.view.as_deref() {
        View::parse(raw).ok_or_else(|| {
            format!("invalid --view '{raw}', expected abilities or fighters")
        })?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw).ok_or_else(|| {
            format!("invalid --output-format '{raw}', expected text, json or html")
        })?;
    }
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.data_url.is_some() && args.data_dir.is_some() {
        return Err("use either --data-url or --data-dir, not both".to_string());
    }
    for (facet, values) in args.facet_values() {
        if !facet.is_numeric() {
            continue;
        }
        for v in values {
            if v.parse::<f64>().is_err() {
                return Err(format!(
                    "invalid --{} '{v}', expected a number",
                    facet.label().to_lowercase()
                ));
            }
        }
    }
    Ok(())
}

/// Facet flags given on the command line that the chosen view does not offer.
pub fn unsupported_facets(args: &CliArgs, view: View) -> Vec<Facet> {
    args.facet_values()
        .into_iter()
        .map(|(facet, _)| facet)
        .filter(|facet| !view.supports(*facet))
        .collect()
}
