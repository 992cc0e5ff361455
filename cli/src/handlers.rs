use std::io::{self, BufRead, Write};

use posts_core::{
    CollectionState, Confirmation, Post, PostFields, PostStore, Status, StoreError, Transport,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no post with id {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

pub fn handle_list<T: Transport>(store: &PostStore<T>) -> Result<()> {
    store.load()?;
    print_state(&store.snapshot());
    Ok(())
}

pub fn handle_create<T: Transport>(store: &PostStore<T>, fields: PostFields) -> Result<()> {
    store.create(&fields)?;
    print_state(&store.snapshot());
    Ok(())
}

pub fn handle_update<T: Transport>(
    store: &PostStore<T>,
    id: &str,
    date: Option<String>,
    title: Option<String>,
    read_time: Option<String>,
) -> Result<()> {
    store.load()?;
    let current = store
        .begin_edit(id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;
    let fields = merge(current.fields(), date, title, read_time);
    if let Err(e) = store.update(id, &fields) {
        store.cancel_edit();
        return Err(e.into());
    }
    print_state(&store.snapshot());
    Ok(())
}

pub fn handle_delete<T: Transport>(store: &PostStore<T>, id: &str, yes: bool) -> Result<()> {
    store.load()?;
    let post = store
        .snapshot()
        .find(id)
        .cloned()
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    let confirmation = if yes {
        Confirmation::Confirmed
    } else {
        prompt(&post)?
    };
    if confirmation == Confirmation::Declined {
        println!("kept \"{}\"", post.title);
        return Ok(());
    }
    store.remove(id, confirmation)?;
    print_state(&store.snapshot());
    Ok(())
}

fn prompt(post: &Post) -> Result<Confirmation> {
    print!("Delete \"{}\"? [y/N] ", post.title);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(confirmation_from(&answer))
}

fn confirmation_from(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "s" | "sim" => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    }
}

/// Overlay the flags the user passed onto the record's current fields.
fn merge(
    current: PostFields,
    date: Option<String>,
    title: Option<String>,
    read_time: Option<String>,
) -> PostFields {
    PostFields {
        date: date.unwrap_or(current.date),
        title: title.unwrap_or(current.title),
        read_time: read_time.unwrap_or(current.read_time),
    }
}

fn render(post: &Post) -> String {
    format!("{:>4}  {:<12}  {}  ({})", post.id, post.date, post.title, post.read_time)
}

/// Warning for a change that was saved but whose follow-up reload failed,
/// leaving the printed list as it was before the change.
fn refresh_notice(state: &CollectionState<Post>) -> Option<String> {
    match &state.status {
        Status::Failed(reason) => Some(format!(
            "warning: change saved, but the list could not be reloaded ({reason}); showing the last loaded posts"
        )),
        _ => None,
    }
}

fn print_state(state: &CollectionState<Post>) {
    if let Some(notice) = refresh_notice(state) {
        eprintln!("{notice}");
    }
    if state.records.is_empty() {
        println!("no posts");
        return;
    }
    for post in &state.records {
        println!("{}", render(post));
    }
}
