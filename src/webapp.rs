//! Interpreter for the data strings the mini-app sends back to the chat.
//!
//! The mini-app and the bot share one contract: the string should be a JSON
//! record with an `action` discriminant. `new_order_test` carries `from`
//! and `to`; `show_profile` carries nothing. Everything the mini-app could
//! possibly send, including garbage, maps to exactly one reply; this module
//! never errors out of a request.

use serde_json::{Map, Value};
use teloxide::utils::html;
use tracing::{info, warn};

use crate::event::Sender;
use crate::reply::Reply;

/// A mini-app payload after decoding, classified by its `action` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `new_order_test`: a ride order sketch with pickup and destination.
    NewOrder { from: String, to: String },
    /// `show_profile`: asks for the sender's own identity; payload fields
    /// are ignored.
    ShowProfile,
    /// Any other record: unrecognized or missing `action`, or a recognized
    /// action whose required fields are absent or not strings.
    Unknown(Map<String, Value>),
}

impl Payload {
    /// Decode one raw payload string. `Err` means the string is not a JSON
    /// record at all; the caller still owns the raw text for echoing.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let record: Map<String, Value> = serde_json::from_str(raw)?;
        Ok(Self::classify(record))
    }

    fn classify(record: Map<String, Value>) -> Self {
        match record.get("action").and_then(Value::as_str) {
            Some("new_order_test") => {
                let from = record.get("from").and_then(Value::as_str);
                let to = record.get("to").and_then(Value::as_str);
                match (from, to) {
                    (Some(from), Some(to)) => Payload::NewOrder {
                        from: from.to_string(),
                        to: to.to_string(),
                    },
                    // Recognized action but the order fields don't fit;
                    // diagnose instead of confirming a half-empty order.
                    _ => Payload::Unknown(record),
                }
            }
            Some("show_profile") => Payload::ShowProfile,
            _ => Payload::Unknown(record),
        }
    }
}

/// Turn one raw mini-app payload into exactly one reply.
///
/// Pure and total: the same payload and sender always yield the same reply,
/// and no input leaves the request unanswered.
pub fn interpret(raw: &str, sender: &Sender) -> Reply {
    let payload = match Payload::decode(raw) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("Mini-app payload from user {} is not a JSON record: {err}", sender.id);
            return raw_echo(raw);
        }
    };

    match payload {
        Payload::NewOrder { from, to } => {
            info!("Mini-app order from user {}: {from} -> {to}", sender.id);
            order_confirmation(&from, &to)
        }
        Payload::ShowProfile => profile_summary(sender),
        Payload::Unknown(record) => unknown_record(record),
    }
}

fn raw_echo(raw: &str) -> Reply {
    Reply::text(format!(
        "I couldn't read that as mini-app data, so here it is back:\n{raw}"
    ))
}

/// Field values go in verbatim, escaped for HTML only. Address validation
/// belongs to the ordering service, not here.
fn order_confirmation(from: &str, to: &str) -> Reply {
    Reply::html(format!(
        "✅ Order received!\nFrom: <b>{}</b>\nTo: <b>{}</b>\n\nA driver would be assigned about now if this were the real service.",
        html::escape(from),
        html::escape(to),
    ))
}

fn profile_summary(sender: &Sender) -> Reply {
    let handle = match sender.username.as_deref() {
        Some(username) => format!("@{username}"),
        None => "no username".to_string(),
    };
    Reply::html(format!(
        "👤 <b>Your profile</b>\nName: {}\nId: {}\nUsername: {}",
        html::escape(&sender.first_name),
        sender.id,
        html::escape(&handle),
    ))
}

fn unknown_record(record: Map<String, Value>) -> Reply {
    let dump = Value::Object(record).to_string();
    Reply::text(format!(
        "🤷 I don't know what to do with this mini-app data:\n{dump}"
    ))
}
