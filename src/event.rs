use teloxide::types::{Message, User};

/// One inbound unit of work from the messaging platform.
///
/// Built once per update, routed, and discarded; nothing here is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain text that is not a command.
    Text(String),
    /// A bot command, name without the leading slash or `@bot` suffix.
    Command { name: String },
    /// A callback tag sent by an inline keyboard button.
    Callback(String),
    /// The opaque data string a mini-app sent back to the chat.
    WebAppData(String),
}

impl Event {
    /// Translate an incoming message. Mini-app data wins over text; messages
    /// carrying neither (stickers, photos, service messages) produce nothing.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if let Some(web_app_data) = msg.web_app_data() {
            return Some(Event::WebAppData(web_app_data.data.clone()));
        }
        msg.text().map(Self::classify)
    }

    /// Classify raw message text: commands follow Telegram's grammar, a
    /// leading `/` then `[A-Za-z0-9_]+`, optionally suffixed with `@botname`
    /// and arguments. Everything else is plain text.
    pub fn classify(text: &str) -> Self {
        match parse_command_name(text) {
            Some(name) => Event::Command {
                name: name.to_string(),
            },
            None => Event::Text(text.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text(_) => "text message",
            Event::Command { .. } => "command",
            Event::Callback(_) => "callback query",
            Event::WebAppData(_) => "web-app data",
        }
    }
}

/// Identity of the user an event came from, as handlers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub username: Option<String>,
}

impl Sender {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.0,
            first_name: user.first_name.clone(),
            username: user.username.clone(),
        }
    }
}

fn parse_command_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let word = rest.split(char::is_whitespace).next()?;
    let name = word.split('@').next()?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name)
}
