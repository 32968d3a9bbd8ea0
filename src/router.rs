use crate::event::{Event, Sender};
use crate::reply::Reply;

/// Event shapes a binding can match. A closed set: these are the only
/// distinctions the bot ever draws between inbound events.
///
/// Two predicates are deliberately broad and therefore order-sensitive:
/// `AnyCommand` also matches every named command, and `PlainMessage` also
/// matches mini-app data. A table that registers either one too early
/// silently shadows the narrower bindings behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// A command with this exact name; `Command("start")` matches `/start`.
    Command(&'static str),
    /// Any command regardless of name. Register after every named command.
    AnyCommand,
    /// A callback query carrying this exact tag.
    Callback(&'static str),
    /// A message carrying mini-app data.
    WebAppData,
    /// Any non-command message: plain text or mini-app data. Register
    /// after `WebAppData`.
    PlainMessage,
}

impl Predicate {
    pub fn matches(&self, event: &Event) -> bool {
        match (self, event) {
            (Predicate::Command(name), Event::Command { name: got }) => got == name,
            (Predicate::AnyCommand, Event::Command { .. }) => true,
            (Predicate::Callback(tag), Event::Callback(got)) => got == tag,
            (Predicate::WebAppData, Event::WebAppData(_)) => true,
            (Predicate::PlainMessage, Event::Text(_) | Event::WebAppData(_)) => true,
            _ => false,
        }
    }
}

/// The one externally visible thing a handler may do per event.
#[derive(Debug, PartialEq)]
pub enum Action {
    /// Send a fresh reply to the chat.
    Send(Reply),
    /// Rewrite the message the event originated from.
    Edit(Reply),
    /// Answer with nothing.
    None,
}

type HandlerFn = Box<dyn Fn(&Event, &Sender) -> Action + Send + Sync>;

/// A registered (predicate, handler) pair. The name only feeds logs and
/// assertions; dispatch is decided by the predicate alone.
pub struct Binding {
    name: &'static str,
    predicate: Predicate,
    handler: HandlerFn,
}

impl Binding {
    pub fn new(
        name: &'static str,
        predicate: Predicate,
        handler: impl Fn(&Event, &Sender) -> Action + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            predicate,
            handler: Box::new(handler),
        }
    }
}

/// Result of routing one event.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The named binding matched and produced this action.
    Handled {
        binding: &'static str,
        action: Action,
    },
    /// No predicate matched. The event is dropped without a reply; this is
    /// the deliberate answer for event shapes the bot does not understand,
    /// not an error.
    NoOp,
}

/// Ordered dispatch table, built once at startup and immutable afterwards.
///
/// Bindings are tried in registration order and the first matching
/// predicate wins; later bindings are not evaluated. The order is part of
/// the routing contract, not an implementation detail.
pub struct Router {
    bindings: Vec<Binding>,
}

impl Router {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Route one event: invoke the first matching binding's handler, or
    /// report `NoOp` when nothing matches. At most one handler runs.
    pub fn dispatch(&self, event: &Event, sender: &Sender) -> Outcome {
        match self
            .bindings
            .iter()
            .find(|binding| binding.predicate.matches(event))
        {
            Some(binding) => Outcome::Handled {
                binding: binding.name,
                action: (binding.handler)(event, sender),
            },
            None => Outcome::NoOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sender() -> Sender {
        Sender {
            id: 7,
            first_name: "Ann".to_string(),
            username: None,
        }
    }

    fn reply_with(text: &'static str) -> impl Fn(&Event, &Sender) -> Action + Send + Sync {
        move |_, _| Action::Send(Reply::text(text))
    }

    fn handled_by(outcome: &Outcome) -> Option<&'static str> {
        match outcome {
            Outcome::Handled { binding, .. } => Some(binding),
            Outcome::NoOp => None,
        }
    }

    #[test]
    fn predicate_matrix() {
        let start = Event::Command {
            name: "start".to_string(),
        };
        let help = Event::Command {
            name: "help".to_string(),
        };
        let text = Event::Text("hi".to_string());
        let data = Event::WebAppData("{}".to_string());
        let callback = Event::Callback("help".to_string());

        assert!(Predicate::Command("start").matches(&start));
        assert!(!Predicate::Command("start").matches(&help));
        assert!(!Predicate::Command("start").matches(&text));

        assert!(Predicate::AnyCommand.matches(&start));
        assert!(Predicate::AnyCommand.matches(&help));
        assert!(!Predicate::AnyCommand.matches(&text));

        assert!(Predicate::Callback("help").matches(&callback));
        assert!(!Predicate::Callback("start").matches(&callback));
        assert!(!Predicate::Callback("help").matches(&text));

        assert!(Predicate::WebAppData.matches(&data));
        assert!(!Predicate::WebAppData.matches(&text));

        assert!(Predicate::PlainMessage.matches(&text));
        // The broad message predicate overlaps mini-app data on purpose;
        // routing order is what keeps the narrow binding reachable.
        assert!(Predicate::PlainMessage.matches(&data));
        assert!(!Predicate::PlainMessage.matches(&start));
        assert!(!Predicate::PlainMessage.matches(&callback));
    }

    #[test]
    fn first_match_wins_when_two_predicates_overlap() {
        let event = Event::WebAppData("payload".to_string());
        assert!(Predicate::WebAppData.matches(&event));
        assert!(Predicate::PlainMessage.matches(&event));

        let router = Router::new(vec![
            Binding::new("narrow", Predicate::WebAppData, reply_with("narrow")),
            Binding::new("broad", Predicate::PlainMessage, reply_with("broad")),
        ]);

        let outcome = router.dispatch(&event, &sender());
        assert_eq!(handled_by(&outcome), Some("narrow"));
    }

    #[test]
    fn registration_order_is_the_priority_order() {
        // Same two bindings, registered the hazardous way round: the broad
        // predicate now shadows the narrow one. This is the behavior the
        // production table must avoid, pinned down so it stays visible.
        let router = Router::new(vec![
            Binding::new("broad", Predicate::PlainMessage, reply_with("broad")),
            Binding::new("narrow", Predicate::WebAppData, reply_with("narrow")),
        ]);

        let event = Event::WebAppData("payload".to_string());
        let outcome = router.dispatch(&event, &sender());
        assert_eq!(handled_by(&outcome), Some("broad"));
    }

    #[test]
    fn catch_all_command_shadows_named_commands_when_registered_first() {
        let shadowing = Router::new(vec![
            Binding::new("fallback", Predicate::AnyCommand, reply_with("fallback")),
            Binding::new("start", Predicate::Command("start"), reply_with("start")),
        ]);
        let safe = Router::new(vec![
            Binding::new("start", Predicate::Command("start"), reply_with("start")),
            Binding::new("fallback", Predicate::AnyCommand, reply_with("fallback")),
        ]);

        let event = Event::Command {
            name: "start".to_string(),
        };
        assert_eq!(handled_by(&shadowing.dispatch(&event, &sender())), Some("fallback"));
        assert_eq!(handled_by(&safe.dispatch(&event, &sender())), Some("start"));
    }

    #[test]
    fn at_most_one_handler_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counting = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            move |_: &Event, _: &Sender| {
                calls.fetch_add(1, Ordering::SeqCst);
                Action::None
            }
        };

        let router = Router::new(vec![
            Binding::new("first", Predicate::PlainMessage, counting(&calls)),
            Binding::new("second", Predicate::PlainMessage, counting(&calls)),
        ]);

        router.dispatch(&Event::Text("hi".to_string()), &sender());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unmatched_events_are_noop() {
        let router = Router::new(vec![
            Binding::new("start", Predicate::Command("start"), reply_with("start")),
            Binding::new("fallback", Predicate::AnyCommand, reply_with("fallback")),
        ]);

        let outcome = router.dispatch(&Event::Callback("nope".to_string()), &sender());
        assert_eq!(outcome, Outcome::NoOp);
    }

    #[test]
    fn empty_table_is_always_noop() {
        let router = Router::new(Vec::new());
        let outcome = router.dispatch(&Event::Text("hi".to_string()), &sender());
        assert_eq!(outcome, Outcome::NoOp);
    }

    #[test]
    fn handler_sees_event_and_sender() {
        let router = Router::new(vec![Binding::new(
            "echo_name",
            Predicate::PlainMessage,
            |event: &Event, sender: &Sender| match event {
                Event::Text(text) => Action::Send(Reply::text(format!(
                    "{} said {text}",
                    sender.first_name
                ))),
                _ => Action::None,
            },
        )]);

        let outcome = router.dispatch(&Event::Text("hi".to_string()), &sender());
        match outcome {
            Outcome::Handled {
                action: Action::Send(reply),
                ..
            } => assert_eq!(reply.text, "Ann said hi"),
            other => panic!("expected a send action, got {other:?}"),
        }
    }
}
