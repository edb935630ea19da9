use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::facets::Facet;
use crate::loader::{self, DataSource, Dataset, LoadOptions};
use crate::output::{self, OutputFormat};
use crate::session::{Session, View};
use crate::utils;

#[derive(Clone, Debug)]
struct RunConfig {
    view: View,
    source: DataSource,
    timeout: u64,
    proxy: Option<String>,
    query: String,
    facets: Vec<(Facet, Vec<String>)>,
    page: usize,
    list_facets: bool,
    output: Option<String>,
    output_format: OutputFormat,
    detail_page: String,
    no_color: bool,
    verbose: u8,
}

fn resolve_source(args: &CliArgs, cfg: &ConfigFile) -> Result<DataSource, String> {
    if let Some(dir) = args.data_dir.as_deref() {
        return Ok(DataSource::Directory(config::expand_tilde(dir)));
    }
    if let Some(url) = args.data_url.as_deref() {
        return Ok(DataSource::Remote(url.trim().to_string()));
    }
    match (cfg.data_dir.as_deref(), cfg.data_url.as_deref()) {
        (Some(_), Some(_)) => Err("config sets both data_dir and data_url".to_string()),
        (Some(dir), None) => Ok(DataSource::Directory(config::expand_tilde(dir))),
        (None, Some(url)) => Ok(DataSource::Remote(url.trim().to_string())),
        (None, None) => Ok(DataSource::default()),
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let view_raw = args
        .view
        .clone()
        .or_else(|| cfg.view.clone())
        .unwrap_or_else(|| "abilities".to_string());
    let view = View::parse(&view_raw)
        .ok_or_else(|| format!("invalid view '{view_raw}', expected abilities or fighters"))?;

    let unsupported = validation::unsupported_facets(&args, view);
    if let Some(facet) = unsupported.first() {
        return Err(format!(
            "the {} facet is not available in the {} view",
            facet.label().to_lowercase(),
            view.name()
        ));
    }

    let source = resolve_source(&args, &cfg)?;
    let facets = args.facet_values();

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}'"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        view,
        source,
        timeout: args.timeout.or(cfg.timeout).unwrap_or(10),
        proxy: args.proxy.or(cfg.proxy),
        query: args.query.unwrap_or_default(),
        facets,
        page: args.page.unwrap_or(1),
        list_facets: args.list_facets,
        output,
        output_format,
        detail_page: args
            .detail_page
            .or(cfg.detail_page)
            .unwrap_or_else(|| output::DEFAULT_DETAIL_PAGE.to_string()),
        no_color,
        verbose: args.verbose,
    })
}

fn fetch_spinner(view: View) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("fetching {} data", view.name()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn load_dataset(run: &RunConfig) -> Dataset {
    let options = LoadOptions {
        source: run.source.clone(),
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
    };
    let started = Instant::now();
    let pb = fetch_spinner(run.view);
    let loaded = match run.view {
        View::Abilities => loader::load_abilities(&options).await,
        View::Fighters => loader::load_fighters(&options).await,
    };
    pb.finish_and_clear();

    match loaded {
        Ok(dataset) => {
            utils::info(&format!(
                "loaded {} fighters and {} abilities in {}ms",
                dataset.fighters.len(),
                dataset.abilities.len(),
                started.elapsed().as_millis()
            ));
            dataset
        }
        Err(e) => {
            utils::error(&format!("Failed to fetch: {e}"));
            Dataset::default()
        }
    }
}

fn build_session(run: &RunConfig, dataset: Dataset) -> Session {
    let mut session = Session::new(run.view, dataset);
    for (facet, values) in run.facets.iter() {
        for value in values {
            session.toggle_facet(*facet, value, true);
        }
    }
    session.set_query(&run.query);
    session.go_to_page(run.page);
    let page = session.clamp_page();
    if page != run.page {
        utils::warn(&format!(
            "page {} is past the last page, showing page {page}",
            run.page
        ));
    }
    session
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    utils::set_verbosity(run.verbose);
    if run.no_color {
        colored::control::set_override(false);
    }
    utils::debug(&format!("data source: {:?}", run.source));

    let dataset = load_dataset(&run).await;
    let session = build_session(&run, dataset);

    if run.list_facets {
        print!("{}", output::render_facet_options(&session.facet_options()));
        return Ok(());
    }

    match run.output.as_deref() {
        Some(path) => {
            if run.output_format == OutputFormat::Text {
                colored::control::set_override(false);
            }
            let report = output::build_report(&session, &run.detail_page);
            let rendered = output::render(&report, run.output_format);
            write_output(path, &rendered).await?;
            utils::info(&format!("{} written to {path}", report.results_label()));
        }
        None => {
            let report = output::build_report(&session, &run.detail_page);
            let rendered = output::render(&report, run.output_format);
            print!("{}", String::from_utf8_lossy(&rendered));
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                print!("{}", CliArgs::command().render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            println!("wrote {}", path.display());
        } else {
            println!("{} already exists", path.display());
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
