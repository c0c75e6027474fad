// Line-oriented developer console standing in for the game UI.

use crate::domain::{ContactKind, Vec3};
use crate::interface_adapters::net::SessionEvent;
use crate::use_cases::{LocalIntent, SessionStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Intent(LocalIntent),
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
}

fn number<T: std::str::FromStr>(arg: Option<&str>, name: &'static str) -> Result<T, ConsoleError> {
    let arg = arg.ok_or(ConsoleError::MissingArgument(name))?;
    arg.parse()
        .map_err(|_| ConsoleError::InvalidNumber(arg.to_string()))
}

pub fn parse_command(line: &str) -> Result<Command, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ConsoleError::Empty);
    };

    let intent = match verb.to_ascii_lowercase().as_str() {
        "status" => return Ok(Command::Status),
        "char" => {
            let character = words.next().ok_or(ConsoleError::MissingArgument("character"))?;
            LocalIntent::SelectCharacter(character.to_string())
        }
        "start" => LocalIntent::StartSession,
        "pick" => LocalIntent::Pick(number(words.next(), "slot")?),
        "build" => LocalIntent::BeginPlacement,
        "rotate" => LocalIntent::Rotate,
        "place" => {
            let x: f32 = number(words.next(), "x")?;
            let y: f32 = number(words.next(), "y")?;
            let z: f32 = number(words.next(), "z")?;
            LocalIntent::Place(Vec3::new(x, y, z))
        }
        "goal" => LocalIntent::Contact(ContactKind::Goal),
        "hazard" => LocalIntent::Contact(ContactKind::Hazard),
        "coin" => LocalIntent::Contact(ContactKind::Collectible),
        "bounce" => LocalIntent::Contact(ContactKind::BouncePad),
        "push" => LocalIntent::Contact(ContactKind::PushZone),
        "next" => LocalIntent::ScoreRevealFinished,
        "dismiss" => LocalIntent::DismissWinScreen,
        other => return Err(ConsoleError::Unknown(other.to_string())),
    };
    Ok(Command::Intent(intent))
}

fn log_status(status: &SessionStatus) {
    info!(
        local_id = %status.local_id,
        is_host = status.is_host,
        phase = status.phase.as_str(),
        round = status.round,
        participants = status.participants.len(),
        "status"
    );
    for p in &status.participants {
        info!(
            id = %p.id,
            name = %p.display_name,
            character = %p.character,
            score = p.total_score,
            spectating = p.spectating,
            "participant"
        );
    }
}

/// Reads stdin until EOF, forwarding each command to the session driver.
pub fn spawn_console(
    events_tx: mpsc::Sender<SessionEvent>,
    status_rx: watch::Receiver<SessionStatus>,
) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Ok(Command::Intent(intent)) => {
                    if events_tx.send(SessionEvent::Local(intent)).await.is_err() {
                        break;
                    }
                }
                Ok(Command::Status) => log_status(&status_rx.borrow()),
                Err(ConsoleError::Empty) => {}
                Err(e) => warn!(error = ?e, "unrecognised command"),
            }
        }
    });
}
