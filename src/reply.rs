use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use url::Url;

/// Outbound response: text, optionally HTML-formatted, with an optional
/// inline keyboard. Handlers build one of these; the delivery layer turns
/// it into the actual API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Deliver with HTML parse mode. Text must already be escaped.
    pub markup: bool,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: false,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: true,
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Inline keyboard: rows of selectable actions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyboard {
    rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn to_markup(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(self.rows.iter().map(|row| {
            row.iter()
                .map(|button| match button {
                    Button::Callback { label, tag } => {
                        InlineKeyboardButton::callback(label.clone(), tag.clone())
                    }
                    Button::MiniApp { label, url } => {
                        InlineKeyboardButton::web_app(label.clone(), WebAppInfo { url: url.clone() })
                    }
                })
                .collect::<Vec<_>>()
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Button {
    /// Sends its tag back as a callback query when pressed.
    Callback { label: String, tag: String },
    /// Opens the mini-app at the given URL.
    MiniApp { label: String, url: Url },
}

impl Button {
    pub fn callback(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Button::Callback {
            label: label.into(),
            tag: tag.into(),
        }
    }

    pub fn miniapp(label: impl Into<String>, url: Url) -> Self {
        Button::MiniApp {
            label: label.into(),
            url,
        }
    }
}
