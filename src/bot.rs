use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::event::{Event, Sender};
use crate::handlers;
use crate::reply::Reply;
use crate::router::{Action, Outcome, Router};

/// Commands advertised to Telegram clients. Dispatch goes through the
/// routing table; this enum only feeds the platform command list and the
/// help text, and a test pins its names to named bindings.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Here's what I can do:")]
pub enum Command {
    #[command(description = "greeting and the ride-ordering button")]
    Start,
    #[command(description = "this help message")]
    Help,
}

/// Start the Telegram bot and block until shutdown.
pub async fn run(config: Config) -> Result<()> {
    let bot = create_bot(&config)?;
    let router = Arc::new(handlers::schema(&config.miniapp));

    // Command-menu registration is best-effort; startup continues without it.
    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register the command list: {err}");
    }

    info!("Starting Telegram bot...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn create_bot(config: &Config) -> Result<Bot> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.telegram.request_timeout_secs))
        .build()
        .context("Failed to build the HTTP client for the Telegram API")?;
    Ok(Bot::with_client(config.telegram.bot_token.clone(), client))
}

async fn handle_message(bot: Bot, msg: Message, router: Arc<Router>) -> ResponseResult<()> {
    // Channel posts and service messages carry no sender; nothing to route.
    let sender = match msg.from.as_ref() {
        Some(user) => Sender::from_user(user),
        None => return Ok(()),
    };

    let event = match Event::from_message(&msg) {
        Some(event) => event,
        None => {
            debug!("Ignoring non-text message in chat {}", msg.chat.id);
            return Ok(());
        }
    };

    info!("Incoming {} from user {}", event.kind(), sender.id);
    debug!("Event payload: {:?}", event);

    match router.dispatch(&event, &sender) {
        Outcome::Handled { binding, action } => {
            debug!("Binding '{binding}' matched");
            perform(&bot, msg.chat.id, None, action).await?;
        }
        Outcome::NoOp => debug!("No binding matched; event dropped"),
    }

    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, router: Arc<Router>) -> ResponseResult<()> {
    // Acknowledge first so the client stops its spinner whatever happens.
    bot.answer_callback_query(q.id.clone()).await?;

    let tag = match q.data.as_deref() {
        Some(tag) => tag,
        None => return Ok(()),
    };
    let sender = Sender::from_user(&q.from);
    let event = Event::Callback(tag.to_string());

    info!("Incoming {} from user {}", event.kind(), sender.id);

    match router.dispatch(&event, &sender) {
        Outcome::Handled { binding, action } => {
            debug!("Binding '{binding}' matched");
            // The message the pressed keyboard hangs off; edits rewrite it.
            match q.message.as_ref().map(|m| (m.chat().id, m.id())) {
                Some((chat_id, message_id)) => {
                    perform(&bot, chat_id, Some(message_id), action).await?;
                }
                None => debug!("Callback without an originating message; nothing to act on"),
            }
        }
        Outcome::NoOp => debug!("No binding matched callback tag '{tag}'"),
    }

    Ok(())
}

/// Carry out a handler's action. An edit degrades to a fresh send when the
/// event carried no editable message.
async fn perform(
    bot: &Bot,
    chat_id: ChatId,
    edit_target: Option<MessageId>,
    action: Action,
) -> ResponseResult<()> {
    match action {
        Action::Send(reply) => send_reply(bot, chat_id, &reply).await,
        Action::Edit(reply) => match edit_target {
            Some(message_id) => edit_reply(bot, chat_id, message_id, &reply).await,
            None => send_reply(bot, chat_id, &reply).await,
        },
        Action::None => Ok(()),
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, reply.text.clone());
    if reply.markup {
        request = request.parse_mode(ParseMode::Html);
    }
    if let Some(keyboard) = &reply.keyboard {
        request = request.reply_markup(keyboard.to_markup());
    }
    request.await?;
    Ok(())
}

async fn edit_reply(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    reply: &Reply,
) -> ResponseResult<()> {
    let mut request = bot.edit_message_text(chat_id, message_id, reply.text.clone());
    if reply.markup {
        request = request.parse_mode(ParseMode::Html);
    }
    if let Some(keyboard) = &reply.keyboard {
        request = request.reply_markup(keyboard.to_markup());
    }
    request.await?;
    Ok(())
}
