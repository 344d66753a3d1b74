//! Inbox and the open conversation

use super::layout::empty;
use crate::actions::Intent;
use crate::markup::Markup;
use crate::record::Record;
use crate::render::{hook, EventKind};
use crate::state::{ActivePeer, AppState, Collection};

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    match &state.active_peer {
        Some(peer) => thread(state, peer),
        None => inbox(state),
    }
}

/// The other party of a message, from the point of view of `me`
fn counterpart<'a>(message: &'a Record, me: &str) -> Option<&'a str> {
    let sender = message.str("sender_id")?;
    if sender == me {
        message.str("receiver_id")
    } else {
        Some(sender)
    }
}

fn peer_name(state: &AppState, peer_id: &str) -> String {
    state
        .find(Collection::Profiles, peer_id)
        .and_then(|p| p.text("full_name"))
        .unwrap_or_else(|| "Farmer".to_string())
}

fn inbox(state: &AppState) -> Markup {
    let me = state.user_id().unwrap_or_default();
    let mut peers: Vec<(&str, &Record)> = Vec::new();
    // Messages arrive oldest first; keep the latest per peer
    for message in state.collection(Collection::Messages) {
        let Some(peer) = counterpart(message, me) else {
            continue;
        };
        match peers.iter_mut().find(|(id, _)| *id == peer) {
            Some(entry) => entry.1 = message,
            None => peers.push((peer, message)),
        }
    }

    if peers.is_empty() {
        return empty(
            "fa-comments",
            "No conversations yet",
            "Open a listing and tap \"Chat with farmer\" to start one.",
        );
    }

    let rows: Markup = peers
        .iter()
        .rev()
        .map(|(peer, last)| {
            markup!(
                "<li class=\"conversation\" {}><strong>{}</strong><p>{}</p></li>",
                hook(
                    &format!("conversation-{}", peer),
                    EventKind::Click,
                    &Intent::StartConversation {
                        peer_id: peer.to_string()
                    }
                ),
                peer_name(state, peer),
                last.text("content").unwrap_or_default()
            )
        })
        .collect();

    markup!("<ul class=\"glass-card conversation-list\">{}</ul>", rows)
}

fn thread(state: &AppState, peer: &ActivePeer) -> Markup {
    let me = state.user_id().unwrap_or_default();
    let bubbles: Markup = state
        .collection(Collection::Messages)
        .iter()
        .filter(|m| counterpart(m, me) == Some(peer.id.as_str()))
        .map(|m| {
            let side = if m.str("sender_id") == Some(me) {
                "sent"
            } else {
                "received"
            };
            markup!(
                "<div class=\"bubble {}\">{}</div>",
                side,
                m.text("content").unwrap_or_default()
            )
        })
        .collect();

    let body = if bubbles.is_empty() {
        Markup::trusted("<p class=\"chat-empty\">Say hello to start the conversation.</p>")
    } else {
        bubbles
    };

    markup!(
        "<div class=\"glass-card chat-window\"><div class=\"chat-header\"><i class=\"fa-solid fa-user\"></i> {}</div><div class=\"chat-messages\">{}</div><form class=\"chat-input\" {}><input type=\"text\" name=\"message\" {} value=\"{}\" placeholder=\"Type a message...\"><button type=\"submit\" class=\"btn-primary\"><i class=\"fa-solid fa-paper-plane\"></i></button></form></div>",
        peer.name,
        body,
        hook("send-message-form", EventKind::Submit, &Intent::SendMessage),
        hook("message-draft", EventKind::Input, &Intent::EditDraft),
        state.message_draft
    )
}
