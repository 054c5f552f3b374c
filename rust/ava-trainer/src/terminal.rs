//! Terminal front end
//!
//! A line-oriented view over the two workflows. The tagger reads one command
//! per line (a word number, `f`, `b`, `s` or `q`) and redraws the session
//! after each; the feed prints every message as it arrives.

use std::fmt::Write as _;

use anyhow::Result;
use ava_tagger::{Category, SaveState, TaggingSession, Word};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::TrainerError;
use crate::feed::{Connector, ConversationFeed, FeedEvent, FeedMessage, FeedState};
use crate::store::SentenceStore;
use crate::trainer::{Progress, SessionHandle, Trainer};

const USAGE: &str = "Type a word number to tag it, f for next, b for back, s to skip, q to quit.";
const ALL_DONE: &str = "All done!";
const THANK_YOU: &str = "Thank you!";

/// One line of trainer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Toggle the word at this (zero-based) index.
    Toggle(usize),
    Advance,
    Retreat,
    Skip,
    Quit,
}

impl Input {
    /// Parse a line. Word numbers are one-based, as displayed.
    pub fn parse(line: &str) -> Option<Input> {
        match line.trim() {
            "f" | "F" => Some(Input::Advance),
            "b" | "B" => Some(Input::Retreat),
            "s" | "S" => Some(Input::Skip),
            "q" | "Q" => Some(Input::Quit),
            other => match other.parse::<usize>() {
                Ok(number) if number > 0 => Some(Input::Toggle(number - 1)),
                _ => None,
            },
        }
    }
}

/// Terminal color for each category's highlight: red, blue, green, yellow
/// and pink (magenta).
fn ansi_code(category: Category) -> u8 {
    match category {
        Category::Command => 31,
        Category::Object => 34,
        Category::Actor => 32,
        Category::Time => 33,
        Category::Place => 35,
    }
}

fn paint(word: &Word, colored: bool) -> String {
    match word.tag {
        Some(category) if colored => {
            format!("\x1b[{}m{}\x1b[0m", ansi_code(category), word.wrapper())
        }
        _ => word.wrapper(),
    }
}

/// Draw the session: the active category with its help, the numbered words
/// and the save status.
pub fn render_session(session: &TaggingSession, colored: bool) -> String {
    let active = session.active();
    let mut view = String::new();

    let _ = writeln!(
        view,
        "Tap the {} ({}/{})",
        active.heading(),
        active.index() + 1,
        Category::ALL.len()
    );
    let _ = writeln!(view, "{} {}", active.help_title(), active.help_body());
    view.push('\n');

    for (number, word) in session.words().iter().enumerate() {
        let _ = writeln!(view, "{:>3}  {}", number + 1, paint(word, colored));
    }

    match session.save_state() {
        SaveState::Idle => {}
        SaveState::Saving => view.push_str("\nSaving...\n"),
        SaveState::Failed(message) => {
            let _ = writeln!(view, "\n{}", message);
        }
        SaveState::Complete => {
            let _ = writeln!(view, "\n{}", THANK_YOU);
        }
    }

    view
}

/// One line per message, prefixed with who sent it.
pub fn render_message(message: &FeedMessage) -> String {
    let speaker = if message.ava_sent { "Ava" } else { "User" };
    match message.created_at {
        Some(created_at) => format!(
            "[{}] {}: {}",
            created_at.format("%Y-%m-%d %H:%M:%S"),
            speaker,
            message.sentence
        ),
        None => format!("{}: {}", speaker, message.sentence),
    }
}

async fn say<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    output.flush().await?;
    Ok(())
}

/// Where the trainer stands after asking for another sentence.
enum Fetch {
    Session(SessionHandle),
    AllDone,
    /// The fetch failed; the current session stays on screen.
    Kept,
}

/// Show a failed fetch instead of ending the run, so the trainer can skip
/// again by hand.
async fn next_session<W>(
    fetched: Result<Option<SessionHandle>, TrainerError>,
    output: &mut W,
) -> Result<Fetch>
where
    W: AsyncWrite + Unpin,
{
    match fetched {
        Ok(Some(next)) => Ok(Fetch::Session(next)),
        Ok(None) => Ok(Fetch::AllDone),
        Err(TrainerError::Store(error)) => {
            tracing::warn!(%error, "fetching next sentence failed");
            say(output, &format!("{} (s to try again)", error.message())).await?;
            Ok(Fetch::Kept)
        }
        Err(error) => Err(error.into()),
    }
}

/// Run tagging sessions until the trainer quits, input ends or no sentences
/// remain.
pub async fn run_tagger<S, R, W>(
    trainer: &Trainer<S>,
    input: R,
    output: &mut W,
    sentence_id: Option<u64>,
    assignment_id: Option<String>,
    colored: bool,
) -> Result<()>
where
    S: SentenceStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(mut handle) = trainer.start(sentence_id, assignment_id).await? else {
        return say(output, ALL_DONE).await;
    };
    say(output, &render_session(&handle.snapshot(), colored)).await?;
    say(output, USAGE).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Input::parse(&line) else {
            say(output, USAGE).await?;
            continue;
        };

        let next: Option<SessionHandle> = match command {
            Input::Quit => break,
            Input::Toggle(index) => {
                if let Err(error) = trainer.toggle(&handle, index) {
                    say(output, &error.to_string()).await?;
                }
                None
            }
            Input::Retreat => {
                trainer.retreat(&handle);
                None
            }
            Input::Skip => match next_session(trainer.skip(&handle).await, output).await? {
                Fetch::Session(next) => Some(next),
                Fetch::AllDone => return say(output, ALL_DONE).await,
                Fetch::Kept => None,
            },
            Input::Advance => match trainer.advance(&handle).await {
                Ok(Progress::Saved { .. }) => {
                    say(output, &render_session(&handle.snapshot(), colored)).await?;
                    match next_session(trainer.next_after_reset().await, output).await? {
                        Fetch::Session(next) => Some(next),
                        Fetch::AllDone => return say(output, ALL_DONE).await,
                        Fetch::Kept => None,
                    }
                }
                Ok(_) => None,
                // The failure message is part of the session and shows below.
                Err(TrainerError::SaveFailed { .. }) => None,
                Err(error) => return Err(error.into()),
            },
        };

        if let Some(next) = next {
            handle = next;
        }
        say(output, &render_session(&handle.snapshot(), colored)).await?;
    }

    Ok(())
}

/// Print feed messages as they arrive. Returns when the feed stops.
pub async fn run_feed<C, W>(
    feed: ConversationFeed<C>,
    mut events: mpsc::UnboundedReceiver<FeedEvent>,
    output: &mut W,
) -> Result<()>
where
    C: Connector + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let log = feed.messages();
    say(output, &format!("Following {}", feed.uri())).await?;
    let task = feed.spawn();

    let mut printed = 0;
    while let Some(event) = events.recv().await {
        match event {
            FeedEvent::Messages { .. } => {
                for message in log.since(printed) {
                    say(output, &render_message(&message)).await?;
                    printed += 1;
                }
            }
            FeedEvent::State(FeedState::Disconnected) => {
                say(output, "Disconnected, retrying...").await?;
            }
            FeedEvent::RetryCancelled => say(output, "Reconnected").await?,
            _ => {}
        }
    }

    task.abort();
    Ok(())
}
