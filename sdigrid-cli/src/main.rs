mod error;
mod paths;
mod settings;
mod view;

use std::cell::RefCell;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;

use clap::Parser;
use sdigrid::prelude::*;
use sdigrid_remote::bulk::{ButtonStates, ITEM_MODIFY_FIELD, selected_ids_field};
use sdigrid_remote::filter::FILTER_PARAM;
use sdigrid_remote::live::{RECONNECT_DELAY, apply_live_event, handle_reconnected};
use sdigrid_remote::status::StatusBoard;
use sdigrid_remote::{ContentsClient, RemoteModel, SparseRows};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::{CliError, Result};
use crate::settings::Settings;

/// Viewport width in pixels handed to the grid.
const VIEWPORT_WIDTH: u32 = 960;

#[derive(Parser, Debug)]
#[command(version, about = "Page through a remote contents listing")]
struct Cli {
    /// Settings file, defaults to contents.json in the config directory
    #[arg(short, long = "config")]
    config: Option<PathBuf>,

    /// Contents URL, overrides the settings file
    #[arg(long = "url")]
    url: Option<String>,

    /// Row scrolled to the top of the viewport
    #[arg(long = "row", default_value_t = 0)]
    row: usize,

    /// Number of visible rows
    #[arg(long = "rows", default_value_t = 20)]
    rows: usize,

    /// Server-side sort column
    #[arg(long = "sort")]
    sort: Option<String>,

    /// Sort descending
    #[arg(long = "desc", requires = "sort")]
    desc: bool,

    /// Filter text passed to the server
    #[arg(long = "filter")]
    filter: Option<String>,

    /// Comma separated rows to select; prints the bulk action form field
    #[arg(long = "select")]
    select: Option<String>,

    /// Keep running and reload on content changes
    #[arg(short, long = "watch")]
    watch: bool,

    /// Log at debug level
    #[arg(long = "debug")]
    debug: bool,
}

type Model = RemoteModel<ContentsClient>;
type Grid = VirtualGrid<SparseRows>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Failed to initialize logger: {e}");
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {e}", path.display()),
    }
}

fn parse_rows(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(|row| row.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| CliError::InvalidRows(list.to_string()))
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        settings.remote.url = url;
    }
    if let Some(sort) = cli.sort {
        settings.remote.sort_col = Some(sort);
        settings.remote.sort_dir = !cli.desc;
    }
    if let Some(filter) = cli.filter {
        settings.remote.extra_query.insert(FILTER_PARAM.to_string(), filter);
    }
    let selection = cli.select.as_deref().map(parse_rows).transpose()?;

    let mut builder = ContentsClient::builder()
        .url(settings.remote.url.clone())
        .timeout(settings.timeout());
    if let Some(events_url) = &settings.events_url {
        builder = builder.events_url(events_url.clone());
    }
    let client = builder.build()?;
    log::info!("paging {}", client.url());

    let mut columns = settings.columns.clone();
    if columns.is_empty() {
        columns.push(Column::new("name", "Name").with_width(320));
    }
    let row_height = settings.grid_options.row_height;
    let mut grid = VirtualGrid::new(SparseRows::new(), columns, settings.grid_options.clone());
    grid.set_selection_model(RowSelectionModel::new());
    grid.resize_viewport(VIEWPORT_WIDTH, cli.rows as f64 * row_height);

    let status = Rc::new(RefCell::new(StatusBoard::new()));
    let mut model = RemoteModel::new(settings.remote.clone(), Arc::new(client.clone()));
    subscribe_status(&mut model, &status);
    model.attach(&mut grid);
    model.sync_grid_selection(&mut grid, true)?;

    model.handle_viewport_changed(&mut grid)?;
    settle(&mut model, &mut grid).await?;
    if cli.row > 0 {
        grid.scroll_row_to_top(cli.row);
        model.sync(&mut grid)?;
        settle(&mut model, &mut grid).await?;
    }

    if let Some(rows) = &selection {
        grid.set_selected_rows(rows)?;
        model.sync(&mut grid)?;
    }

    print_grid(&grid, &status);
    if selection.is_some() {
        print_bulk(&grid)?;
    }

    if cli.watch {
        if settings.events_url.is_some() {
            watch(&client, &mut model, &mut grid, &status).await?;
        } else {
            log::warn!("watch requested without an events URL");
            eprintln!("Nothing to watch: the settings have no eventsUrl.");
        }
    }
    model.destroy(&mut grid);
    Ok(())
}

fn subscribe_status(model: &mut Model, status: &Rc<RefCell<StatusBoard>>) {
    let board = Rc::clone(status);
    model.on_ajax_error.subscribe(move |args| {
        if let Some(banner) = board.borrow_mut().handle_error(&args.error) {
            log::warn!("{}", banner.message());
        }
        Propagation::Continue
    });
    let board = Rc::clone(status);
    model.on_data_loaded.subscribe(move |args| {
        board.borrow_mut().handle_loaded(args.batch.as_ref());
        Propagation::Continue
    });
}

/// Applies completions until no request is outstanding.
async fn settle(model: &mut Model, grid: &mut Grid) -> Result<()> {
    while model.has_active_request() {
        let Some(completion) = model.next_completion().await else {
            break;
        };
        model.complete(completion, grid)?;
    }
    Ok(())
}

fn print_grid(grid: &Grid, status: &Rc<RefCell<StatusBoard>>) {
    let mut board = status.borrow_mut();
    print!("{}", view::render_status(&board));
    print!("{}", view::render_viewport(grid));
    if board.take_reload_prompt() {
        eprintln!("Your session has expired. Log in again and rerun.");
    }
    board.dismiss_flash();
}

fn print_bulk(grid: &Grid) -> Result<()> {
    let rows = grid.selected_rows()?.to_vec();
    let ids = selected_ids_field(grid.data(), &rows)?;
    println!("{ITEM_MODIFY_FIELD}={ids}");

    let states = ButtonStates::compute(grid.data(), &rows);
    println!(
        "selection buttons: {}, single-row buttons: {}",
        enabled(states.selection_enabled),
        enabled(states.single_enabled)
    );
    if !states.disabled.is_empty() {
        let disabled: Vec<&str> = states.disabled.iter().map(String::as_str).collect();
        println!("disabled by selection: {}", disabled.join(", "));
    }
    Ok(())
}

fn enabled(on: bool) -> &'static str {
    if on { "enabled" } else { "disabled" }
}

/// Follows the server's change stream, reconnecting after outages.
async fn watch(
    client: &ContentsClient,
    model: &mut Model,
    grid: &mut Grid,
    status: &Rc<RefCell<StatusBoard>>,
) -> Result<()> {
    loop {
        match client.events().await {
            Ok(mut stream) => {
                log::info!("listening for content changes");
                if handle_reconnected(model, grid, &mut status.borrow_mut())? {
                    settle(model, grid).await?;
                    print_grid(grid, status);
                }
                loop {
                    tokio::select! {
                        Some(completion) = model.next_completion() => {
                            model.complete(completion, grid)?;
                            if !model.has_active_request() {
                                print_grid(grid, status);
                            }
                        }
                        event = stream.next_event() => match event {
                            Ok(Some(event)) => {
                                apply_live_event(event, model, grid, &mut status.borrow_mut())?;
                            }
                            Ok(None) => {
                                log::info!("event stream closed");
                                break;
                            }
                            Err(err) => {
                                log::warn!("event stream failed: {err}");
                                status.borrow_mut().handle_error(&err);
                                break;
                            }
                        },
                        _ = tokio::signal::ctrl_c() => return Ok(()),
                    }
                }
            }
            Err(err) => {
                log::warn!("event stream unavailable: {err}");
                status.borrow_mut().handle_error(&err);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        assert_eq!(parse_rows("1, 3,4").unwrap(), vec![1, 3, 4]);
        assert!(matches!(parse_rows("1,x"), Err(CliError::InvalidRows(_))));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["sdigrid", "--url", "http://cms/@@contents", "--sort", "title", "--desc", "-w"])
            .unwrap();
        assert_eq!(cli.sort.as_deref(), Some("title"));
        assert!(cli.desc);
        assert!(cli.watch);
        assert_eq!(cli.rows, 20);

        assert!(Cli::try_parse_from(["sdigrid", "--desc"]).is_err());
    }
}
