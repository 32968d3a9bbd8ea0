//! The deployed dispatch table and the replies it produces.

use teloxide::utils::command::BotCommands;
use teloxide::utils::html;
use url::Url;

use crate::bot::Command;
use crate::config::MiniAppConfig;
use crate::event::{Event, Sender};
use crate::reply::{Button, Keyboard, Reply};
use crate::router::{Action, Binding, Predicate, Router};
use crate::webapp;

/// Build the production routing table.
///
/// The order is load-bearing, first match wins:
/// - `web_app_data` sits before `echo`, whose broad message predicate also
///   matches mini-app data;
/// - `unknown_command` carries the catch-all command predicate and stays
///   last, after every named command.
///
/// Callback tags other than `help`/`start` match nothing and are dropped.
pub fn schema(miniapp: &MiniAppConfig) -> Router {
    let url = miniapp.url.clone();
    let label = miniapp.button_label.clone();

    Router::new(vec![
        Binding::new("web_app_data", Predicate::WebAppData, web_app_data),
        Binding::new("start_command", Predicate::Command("start"), {
            let (url, label) = (url.clone(), label.clone());
            move |_event, sender| Action::Send(start_screen(sender, &url, &label))
        }),
        Binding::new("help_command", Predicate::Command("help"), |_event, _sender| {
            Action::Send(help_screen())
        }),
        Binding::new("help_screen", Predicate::Callback("help"), |_event, _sender| {
            Action::Edit(help_screen())
        }),
        Binding::new("start_screen", Predicate::Callback("start"), {
            move |_event, sender| Action::Edit(start_screen(sender, &url, &label))
        }),
        Binding::new("echo", Predicate::PlainMessage, echo),
        Binding::new("unknown_command", Predicate::AnyCommand, unknown_command),
    ])
}

fn web_app_data(event: &Event, sender: &Sender) -> Action {
    match event {
        Event::WebAppData(raw) => Action::Send(webapp::interpret(raw, sender)),
        _ => Action::None,
    }
}

/// The original bot behavior: whatever text arrives comes straight back.
fn echo(event: &Event, _sender: &Sender) -> Action {
    match event {
        Event::Text(text) => Action::Send(Reply::text(text.clone())),
        Event::WebAppData(raw) => Action::Send(Reply::text(raw.clone())),
        _ => Action::None,
    }
}

fn unknown_command(event: &Event, _sender: &Sender) -> Action {
    let name = match event {
        Event::Command { name } => name,
        _ => return Action::None,
    };
    Action::Send(Reply::text(format!(
        "🤷 I don't know the /{name} command. Try /help."
    )))
}

/// Greeting screen: sent for /start, restored in place by the `start` tag.
fn start_screen(sender: &Sender, url: &Url, button_label: &str) -> Reply {
    let text = format!(
        "👋 Hi, {}!\n\nI'm RideBot. Send me any message and I'll echo it \
         back, or order a ride straight from the mini-app below.",
        mention(sender),
    );
    Reply::html(text).with_keyboard(
        Keyboard::new()
            .row(vec![Button::miniapp(button_label, url.clone())])
            .row(vec![Button::callback("ℹ️ Help", "help")]),
    )
}

/// Command reference: sent for /help, shown in place by the `help` tag.
fn help_screen() -> Reply {
    let text = format!(
        "<b>RideBot</b>\n\n{}\n\nAnything else you send me comes right back. \
         The 🚕 button on the start screen opens the ride-ordering mini-app.",
        html::escape(&Command::descriptions().to_string()),
    );
    Reply::html(text).with_keyboard(
        Keyboard::new().row(vec![Button::callback("⬅️ Back to start", "start")]),
    )
}

fn mention(sender: &Sender) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        sender.id,
        html::escape(&sender.first_name)
    )
}
