//! Command-line interface.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap::value_parser;
use log::info;
use tableview_lib::TableView;
use tableview_lib::export::JsonWorkbookWriter;
use tableview_lib::export::WorkbookWriter;
use tableview_lib::model::Record;
use tableview_lib::query::SortState;

use crate::definition::ViewDefinition;
use crate::definition::load_rows;
use crate::error::CliError;
use crate::render::write_view;

const PROGRAM_NAME: &str = "tableview";

/// Builds the argument parser.
pub fn command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Search, filter, sort, page and export JSON row collections")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log to stderr instead of the log file"),
        )
        .subcommand(show_subcommand())
        .subcommand(export_subcommand())
}

fn input_args() -> [Arg; 2] {
    [
        Arg::new("rows")
            .long("rows")
            .short('r')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("JSON file with an array of row objects"),
        Arg::new("view")
            .long("view")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("JSON view definition"),
    ]
}

fn query_args() -> [Arg; 4] {
    [
        Arg::new("search")
            .long("search")
            .short('s')
            .help("Case-insensitive search over the searchable columns"),
        Arg::new("filter")
            .long("filter")
            .short('f')
            .action(ArgAction::Append)
            .help("Panel filter as key=value, e.g. 'status=active' or 'joined_from=2024-01-01'"),
        Arg::new("inline")
            .long("inline")
            .action(ArgAction::Append)
            .help("Inline facet filter as key=value, matched exactly"),
        Arg::new("sort")
            .long("sort")
            .help("Sort column, e.g. 'followers' or 'followers:desc'"),
    ]
}

fn show_subcommand() -> Command {
    Command::new("show")
        .about("Print one page of the table")
        .args(input_args())
        .args(query_args())
        .arg(
            Arg::new("page")
                .long("page")
                .short('p')
                .value_parser(value_parser!(usize))
                .help("Page to show (clamped into range)"),
        )
        .arg(
            Arg::new("page_size")
                .long("page-size")
                .allow_hyphen_values(true)
                .value_parser(value_parser!(i64))
                .help("Rows per page"),
        )
        .arg(
            Arg::new("toggle")
                .long("toggle")
                .short('t')
                .action(ArgAction::Append)
                .help("Show or hide a column by key"),
        )
}

fn export_subcommand() -> Command {
    Command::new("export")
        .about("Write the matching rows as a JSON workbook")
        .args(input_args())
        .args(query_args())
        .arg(
            Arg::new("context")
                .long("context")
                .short('c')
                .required(true)
                .help("Name the sheet is derived from, e.g. a campaign name"),
        )
        .arg(
            Arg::new("columns")
                .long("columns")
                .value_delimiter(',')
                .help("Column keys to export, in order. Defaults to the visible columns"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Output file"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Indent the JSON output"),
        )
}

/// Runs the selected subcommand.
pub async fn run(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("show", sub)) => show(sub).await,
        Some(("export", sub)) => export(sub).await,
        _ => Ok(()),
    }
}

async fn show(matches: &ArgMatches) -> Result<(), CliError> {
    let mut view = load_view(matches).await?;
    apply_query(&mut view, matches)?;

    for key in matches.get_many::<String>("toggle").into_iter().flatten() {
        view.toggle_column(key);
    }
    if let Some(size) = matches.get_one::<i64>("page_size") {
        view.set_page_size(*size)?;
    }
    if let Some(page) = matches.get_one::<usize>("page") {
        view.set_page(*page);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_view(&view.render(), &mut out).map_err(|e| CliError::write("<stdout>", e))
}

async fn export(matches: &ArgMatches) -> Result<(), CliError> {
    let mut view = load_view(matches).await?;
    apply_query(&mut view, matches)?;

    let context = matches.get_one::<String>("context").map_or("", String::as_str);
    let keys: Option<Vec<String>> = matches
        .get_many::<String>("columns")
        .map(|keys| keys.map(|k| k.trim().to_string()).collect());
    let workbook = view.export(context, keys.as_deref())?;

    let writer = if matches.get_flag("pretty") {
        JsonWorkbookWriter::pretty()
    } else {
        JsonWorkbookWriter::new()
    };
    let mut buffer = Vec::new();
    writer.write(&workbook, &mut buffer)?;

    let out = required_path(matches, "out");
    tokio::fs::write(out, buffer)
        .await
        .map_err(|e| CliError::write(out, e))?;
    info!(
        "exported {} row(s) to sheet '{}' in {}",
        workbook.rows.len(),
        workbook.sheet_name,
        out.display()
    );
    Ok(())
}

async fn load_view(matches: &ArgMatches) -> Result<TableView<Record>, CliError> {
    let definition = ViewDefinition::load(required_path(matches, "view")).await?;
    let rows = load_rows(required_path(matches, "rows")).await?;
    info!("loaded {} row(s)", rows.len());
    definition.build_view(rows)
}

fn required_path<'a>(matches: &'a ArgMatches, id: &str) -> &'a Path {
    matches
        .get_one::<PathBuf>(id)
        .map_or(Path::new(""), PathBuf::as_path)
}

fn apply_query(view: &mut TableView<Record>, matches: &ArgMatches) -> Result<(), CliError> {
    if let Some(query) = matches.get_one::<String>("search") {
        view.set_search(query);
    }

    let filters = key_values(matches, "filter")?;
    if !filters.is_empty() {
        view.apply_filters(filters.into_iter().collect());
    }
    for (key, value) in key_values(matches, "inline")? {
        view.set_inline_filter(&key, &value);
    }

    if let Some(sort) = matches.get_one::<String>("sort") {
        let sort: SortState = sort.parse().map_err(CliError::Sort)?;
        view.set_sort(sort);
    }
    Ok(())
}

fn key_values(matches: &ArgMatches, flag: &'static str) -> Result<Vec<(String, String)>, CliError> {
    matches
        .get_many::<String>(flag)
        .into_iter()
        .flatten()
        .map(|raw| parse_key_value(flag, raw))
        .collect()
}

fn parse_key_value(flag: &'static str, raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::KeyValue {
            flag,
            value: raw.to_string(),
        }),
    }
}
