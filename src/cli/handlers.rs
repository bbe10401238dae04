use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    app::{App, Dispatched},
    bookmarks::{Bookmark, BookmarkCreate, BookmarkUpdate},
    id::BookmarkId,
    search::{highlight, Field},
    store::{Action, OpKind, Transition},
};

use super::{
    errors::{CliError, CliResult},
    validation::{validate_bookmark_create, validate_bookmark_update},
    Command,
};

const MARK_OPEN: &str = "\x1b[1;33m";
const MARK_CLOSE: &str = "\x1b[0m";

pub async fn run(app: &App, command: Command) -> CliResult<()> {
    match command {
        Command::List {} => handle_list(app).await,
        Command::Search { query } => handle_search(app, &query).await,
        Command::Get { id } => handle_get(app, id.into()).await,
        Command::Add { title, url } => handle_add(app, title, url).await,
        Command::Edit { id, title, url } => handle_edit(app, id.into(), title, url).await,
        Command::Delete { id, yes } => handle_delete(app, id.into(), yes).await,
    }
}

async fn handle_list(app: &App) -> CliResult<()> {
    let bmarks = load(app).await?;
    println!("{}", serde_json::to_string_pretty(bmarks.as_ref())?);
    Ok(())
}

async fn handle_search(app: &App, query: &str) -> CliResult<()> {
    load(app).await?;

    let feed = app.search_feed();
    let mut results = feed.results();
    feed.set_query(query);
    results
        .changed()
        .await
        .map_err(|_| CliError::internal("search feed stopped"))?;

    let bmarks = feed.current();
    log::debug!(
        "{} hits for {query:?}, index built {} times",
        bmarks.len(),
        feed.index_builds()
    );
    if bmarks.is_empty() {
        println!("no bookmarks found");
        return Ok(());
    }

    for bmark in bmarks.iter() {
        let spans = |field| feed.matches_for(&bmark.id, field).unwrap_or_default();
        println!(
            "{:>6}  {}",
            bmark.id.to_string(),
            highlight(&bmark.title, &spans(Field::Title), MARK_OPEN, MARK_CLOSE)
        );
        println!(
            "        {}",
            highlight(&bmark.url, &spans(Field::Url), MARK_OPEN, MARK_CLOSE)
        );
    }
    Ok(())
}

async fn handle_get(app: &App, id: BookmarkId) -> CliResult<()> {
    let bmark = app.pipeline.fetch(&id).await?;
    println!("{}", serde_json::to_string_pretty(&bmark)?);
    Ok(())
}

async fn handle_add(app: &App, title: String, url: String) -> CliResult<()> {
    let (title, url) = (title.trim().to_string(), url.trim().to_string());
    validate_bookmark_create(&title, &url)?;

    let transitions = app.store().transitions();
    expect_started(app.pipeline.create(BookmarkCreate::new(title, url)), OpKind::Create)?;

    match settle(app, transitions, OpKind::Create).await? {
        Action::CreateSuccess(bmark) => print_bookmark("Bookmark created", &bmark),
        action => Err(unexpected(&action)),
    }
}

async fn handle_edit(
    app: &App,
    id: BookmarkId,
    title: Option<String>,
    url: Option<String>,
) -> CliResult<()> {
    let changes = BookmarkUpdate {
        title: title.map(|t| t.trim().to_string()),
        url: url.map(|u| u.trim().to_string()),
    };
    validate_bookmark_update(&changes)?;

    let transitions = app.store().transitions();
    expect_started(app.pipeline.update(id, changes), OpKind::Update)?;

    match settle(app, transitions, OpKind::Update).await? {
        Action::UpdateSuccess(bmark) => print_bookmark("Bookmark updated", &bmark),
        action => Err(unexpected(&action)),
    }
}

async fn handle_delete(app: &App, id: BookmarkId, yes: bool) -> CliResult<()> {
    if !yes {
        let prompt = format!("Are you sure you want to delete bookmark {id}?");
        let confirmed = inquire::prompt_confirmation(prompt)?;
        if !confirmed {
            return Err(CliError::UserCancelled);
        }
    }

    let transitions = app.store().transitions();
    expect_started(app.pipeline.delete(id), OpKind::Delete)?;

    match settle(app, transitions, OpKind::Delete).await? {
        Action::DeleteSuccess(id) => {
            println!("Bookmark {id} deleted");
            Ok(())
        }
        action => Err(unexpected(&action)),
    }
}

/// Load everything and return the ordered list, or the load failure.
async fn load(app: &App) -> CliResult<std::sync::Arc<Vec<Bookmark>>> {
    let transitions = app.store().transitions();
    expect_started(app.pipeline.load(), OpKind::Load)?;
    settle(app, transitions, OpKind::Load).await?;
    Ok(app.store().all())
}

fn expect_started(dispatched: Dispatched, kind: OpKind) -> CliResult<()> {
    match dispatched {
        Dispatched::Dropped => Err(CliError::internal(format!(
            "{kind} is already in progress"
        ))),
        Dispatched::Started | Dispatched::Queued => Ok(()),
    }
}

/// Wait for the pipeline to drain and return the last outcome of `kind`.
/// An error left in the store fails the command with that message.
async fn settle(
    app: &App,
    mut transitions: broadcast::Receiver<Transition>,
    kind: OpKind,
) -> CliResult<Action> {
    log::debug!("waiting on {} pending intents", app.pipeline.pending());
    app.pipeline.idle().await;

    if let Some(message) = app.store().error() {
        return Err(CliError::remote(message));
    }

    let mut outcome = None;
    loop {
        match transitions.try_recv() {
            Ok(transition) => {
                if transition.action.kind() == kind && transition.action.is_outcome() {
                    log::debug!(
                        "{} left {} bookmarks",
                        transition.action.name(),
                        transition.state.all().len()
                    );
                    outcome = Some(transition.action);
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                log::warn!("missed {skipped} store transitions");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    outcome.ok_or_else(|| CliError::internal(format!("{kind} produced no outcome")))
}

fn print_bookmark(message: &str, bmark: &Bookmark) -> CliResult<()> {
    log::info!("{message}");
    println!("{}", serde_json::to_string_pretty(bmark)?);
    Ok(())
}

fn unexpected(action: &Action) -> CliError {
    CliError::internal(format!("unexpected outcome: {}", action.name()))
}
