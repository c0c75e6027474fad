// Participants in a party session and display name rules.

/// Opaque peer identity assigned by the transport on connect.
pub type PeerId = String;

const MAX_DISPLAY_NAME_CHARS: usize = 24;
const DEFAULT_DISPLAY_NAME: &str = "Player";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: PeerId,
    pub display_name: String,
    // Empty until the participant picks a character in the lobby.
    pub character: String,
    pub is_host: bool,
    // Cumulative across rounds; reset on return to the lobby.
    pub total_score: u32,
    // Joined while a round was running; sits that round out.
    pub spectating: bool,
}

impl Participant {
    pub fn host(id: impl Into<PeerId>, display_name: &str) -> Self {
        Self {
            is_host: true,
            ..Self::guest(id, display_name)
        }
    }

    pub fn guest(id: impl Into<PeerId>, display_name: &str) -> Self {
        Self {
            id: id.into(),
            display_name: sanitize_display_name(display_name),
            character: String::new(),
            is_host: false,
            total_score: 0,
            spectating: false,
        }
    }

    pub fn has_character(&self) -> bool {
        !self.character.is_empty()
    }
}

/// Trims and caps a requested display name, falling back to a default when empty.
pub fn sanitize_display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_DISPLAY_NAME.to_string();
    }
    trimmed.chars().take(MAX_DISPLAY_NAME_CHARS).collect()
}
