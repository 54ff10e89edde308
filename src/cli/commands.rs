use std::fmt::Write as _;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::App;
use crate::config::AppConfig;
use crate::storage::{NoteId, NoteRecord, NoteStore};
use crate::toolbar::{collect_previews, Preview};
use crate::window::content::{chrome_label, derive_title};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only show notes whose title contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Provide the note body inline. If omitted, reads from stdin.
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Note identifier, or a unique prefix of one
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn list_notes(config: &AppConfig, args: ListArgs) -> Result<()> {
    let store = NoteStore::open(&config.storage);
    print!("{}", run_list(&store, args.filter.as_deref()));
    Ok(())
}

fn run_list(store: &NoteStore, filter: Option<&str>) -> String {
    format_previews(&collect_previews(store, filter.unwrap_or_default()))
}

fn format_previews(previews: &[Preview]) -> String {
    if previews.is_empty() {
        return "No notes found.\n".to_string();
    }
    let mut out = String::new();
    for preview in previews {
        let _ = writeln!(
            &mut out,
            "{}  {}",
            preview.id.short(),
            chrome_label(&preview.title)
        );
    }
    out
}

pub fn new_note(config: &AppConfig, args: NewArgs) -> Result<()> {
    let body = match args.body {
        Some(body) => body,
        None => read_stdin()?.unwrap_or_default(),
    };
    let mut store = NoteStore::open(&config.storage);
    let id = create_note(&mut store, config, &body)?;
    println!("Created note {id}");
    Ok(())
}

fn create_note(store: &mut NoteStore, config: &AppConfig, body: &str) -> Result<NoteId> {
    let id = NoteId::generate();
    let mut record = NoteRecord::new(id.clone(), config.window.default_geometry);
    record.content = body.trim_end_matches(['\r', '\n']).to_string();
    record.title = derive_title(&record.content, config.preview_lines(), &id);
    store.upsert(record);
    store.try_save().context("saving new note")?;
    tracing::info!(%id, "created note from the command line");
    Ok(id)
}

pub fn delete_note(config: &AppConfig, args: DeleteArgs) -> Result<()> {
    let mut store = NoteStore::open(&config.storage);
    let deleted = run_delete(&mut store, &args.id, |record| {
        if args.yes {
            return Ok(true);
        }
        let answer = prompt(&format!(
            "Delete \"{}\"? [y/N]",
            chrome_label(&record.display_title())
        ))?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    })?;
    match deleted {
        Some(id) => println!("Deleted note {id}"),
        None => println!("Aborted"),
    }
    Ok(())
}

fn run_delete(
    store: &mut NoteStore,
    raw_id: &str,
    confirm: impl FnOnce(&NoteRecord) -> Result<bool>,
) -> Result<Option<NoteId>> {
    let id = resolve_id(store, raw_id)?;
    let Some(record) = store.get(&id) else {
        bail!("no note with id {id}");
    };
    if !confirm(record)? {
        return Ok(None);
    }
    store.remove(&id);
    store.try_save().context("saving notes after delete")?;
    tracing::info!(%id, "deleted note from the command line");
    Ok(Some(id))
}

fn resolve_id(store: &NoteStore, raw_id: &str) -> Result<NoteId> {
    let raw_id = raw_id.trim();
    if raw_id.is_empty() {
        bail!("note id cannot be empty");
    }
    let exact = NoteId::from(raw_id);
    if store.contains(&exact) {
        return Ok(exact);
    }
    let mut matches = store
        .records()
        .filter(|record| record.id.as_str().starts_with(raw_id))
        .map(|record| record.id.clone());
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => bail!("no note matches {raw_id}"),
        (Some(_), Some(_)) => bail!("{raw_id} is ambiguous, give more of the id"),
    }
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}
