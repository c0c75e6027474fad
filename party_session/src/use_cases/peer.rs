// Role-agnostic entry point used by the session driver.

use super::client::ClientSession;
use super::host::HostSession;
use super::ports::{Frontend, Transport};
use super::types::{LocalIntent, SessionMessage, SessionStatus};
use tracing::debug;

pub(crate) const HOST_ONLY: &str = "Only the host can start the game";

/// Either side of a session; the role is fixed when the peer is created.
pub enum Peer<T, F> {
    Host(HostSession<T, F>),
    Client(ClientSession<T, F>),
}

impl<T: Transport, F: Frontend> Peer<T, F> {
    pub fn is_host(&self) -> bool {
        matches!(self, Peer::Host(_))
    }

    pub fn apply_intent(&mut self, intent: LocalIntent) {
        debug!(?intent, "local intent");
        match self {
            Peer::Host(host) => match intent {
                LocalIntent::SelectCharacter(character) => host.select_character(&character),
                LocalIntent::StartSession => {
                    host.start_session();
                }
                LocalIntent::Pick(index) => {
                    host.pick(index);
                }
                LocalIntent::BeginPlacement => {
                    host.begin_placement();
                }
                LocalIntent::Rotate => host.rotate(),
                LocalIntent::Place(position) => {
                    host.place(position);
                }
                LocalIntent::Contact(kind) => host.report_contact(kind),
                LocalIntent::ScoreRevealFinished => host.score_reveal_finished(),
                LocalIntent::DismissWinScreen => host.dismiss_win_screen(),
            },
            Peer::Client(client) => match intent {
                LocalIntent::SelectCharacter(character) => {
                    client.select_character(&character);
                }
                LocalIntent::StartSession => client.show_message(HOST_ONLY),
                LocalIntent::Pick(index) => {
                    client.pick(index);
                }
                LocalIntent::BeginPlacement => {
                    client.begin_placement();
                }
                LocalIntent::Rotate => client.rotate(),
                LocalIntent::Place(position) => {
                    client.place(position);
                }
                LocalIntent::Contact(kind) => client.report_contact(kind),
                // The host paces the score screen.
                LocalIntent::ScoreRevealFinished => {}
                LocalIntent::DismissWinScreen => client.dismiss_win_screen(),
            },
        }
    }

    pub fn handle_message(&mut self, from: &str, message: SessionMessage) {
        match self {
            Peer::Host(host) => host.handle_message(from, message),
            Peer::Client(client) => client.handle_message(from, message),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        match self {
            Peer::Host(host) => host.tick(dt),
            Peer::Client(client) => client.tick(dt),
        }
    }

    pub fn peer_opened(&mut self, peer: &str) {
        if let Peer::Host(host) = self {
            host.peer_opened(peer);
        }
    }

    /// Returns false when this peer can no longer take part in the session.
    pub fn peer_closed(&mut self, peer: &str) -> bool {
        match self {
            Peer::Host(host) => {
                host.peer_closed(peer);
                true
            }
            Peer::Client(client) => client.peer_closed(peer),
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            Peer::Host(host) => host.status(),
            Peer::Client(client) => client.status(),
        }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        match self {
            Peer::Host(host) => host.transport_mut(),
            Peer::Client(client) => client.transport_mut(),
        }
    }
}
