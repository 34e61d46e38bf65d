//! Reliable ordered transport seam + in-memory loopback

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{trace, warn};
use uuid::Uuid;

use super::{AuthorityMessage, AuthorityRole};
use crate::error::{CoreError, Result};

/// Wire frame around one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    pub session: Uuid,
    /// Per-sender sequence number, starting at 1
    pub seq: u64,
    pub sent_at: DateTime<Utc>,
    pub message: AuthorityMessage,
}

/// Reliable, ordered channel between one participant and the rest
pub trait Transport {
    /// Coordinator: broadcast to every client. Client: send to the coordinator.
    fn send(&mut self, message: &AuthorityMessage) -> Result<()>;

    /// Everything received since the last call, in order.
    fn drain_inbox(&mut self) -> Vec<AuthorityMessage>;
}

#[derive(Debug, Default)]
struct Channels {
    to_coordinator: VecDeque<String>,
    to_clients: Vec<VecDeque<String>>,
}

/// In-memory hub (tests, headless runs). Single-threaded.
#[derive(Debug, Clone)]
pub struct LoopbackHub {
    session: Uuid,
    channels: Rc<RefCell<Channels>>,
}

impl Default for LoopbackHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self { session: Uuid::new_v4(), channels: Rc::new(RefCell::new(Channels::default())) }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn coordinator(&self) -> LoopbackEndpoint {
        LoopbackEndpoint::new(self, AuthorityRole::Coordinator, None)
    }

    /// Register a new client queue.
    pub fn client(&self) -> LoopbackEndpoint {
        let index = {
            let mut channels = self.channels.borrow_mut();
            channels.to_clients.push(VecDeque::new());
            channels.to_clients.len() - 1
        };
        LoopbackEndpoint::new(self, AuthorityRole::Client, Some(index))
    }

    /// Push a raw frame to the coordinator (fault injection in tests).
    pub fn inject_to_coordinator(&self, raw: impl Into<String>) {
        self.channels.borrow_mut().to_coordinator.push_back(raw.into());
    }
}

pub struct LoopbackEndpoint {
    session: Uuid,
    role: AuthorityRole,
    client_index: Option<usize>,
    channels: Rc<RefCell<Channels>>,
    next_seq: u64,
}

impl LoopbackEndpoint {
    fn new(hub: &LoopbackHub, role: AuthorityRole, client_index: Option<usize>) -> Self {
        Self { session: hub.session, role, client_index, channels: Rc::clone(&hub.channels), next_seq: 1 }
    }

    pub fn role(&self) -> AuthorityRole {
        self.role
    }

    fn decode(&self, raw: &str) -> Result<AuthorityMessage> {
        let envelope: Envelope =
            serde_json::from_str(raw).map_err(|e| CoreError::MalformedMessage(e.to_string()))?;
        if envelope.session != self.session {
            return Err(CoreError::MalformedMessage(format!("foreign session {}", envelope.session)));
        }
        trace!("{} <- #{} {}", self.role.as_str(), envelope.seq, envelope.message.kind());
        Ok(envelope.message)
    }
}

impl Transport for LoopbackEndpoint {
    fn send(&mut self, message: &AuthorityMessage) -> Result<()> {
        let envelope = Envelope { session: self.session, seq: self.next_seq, sent_at: Utc::now(), message: message.clone() };
        let raw = serde_json::to_string(&envelope)?;
        self.next_seq += 1;

        let mut channels = self.channels.borrow_mut();
        match self.role {
            AuthorityRole::Coordinator => {
                for queue in channels.to_clients.iter_mut() {
                    queue.push_back(raw.clone());
                }
            }
            AuthorityRole::Client => channels.to_coordinator.push_back(raw),
        }
        Ok(())
    }

    fn drain_inbox(&mut self) -> Vec<AuthorityMessage> {
        let raw: Vec<String> = {
            let mut channels = self.channels.borrow_mut();
            match (self.role, self.client_index) {
                (AuthorityRole::Coordinator, _) => channels.to_coordinator.drain(..).collect(),
                (AuthorityRole::Client, Some(i)) => {
                    channels.to_clients.get_mut(i).map(|q| q.drain(..).collect()).unwrap_or_default()
                }
                (AuthorityRole::Client, None) => Vec::new(),
            }
        };
        raw.iter()
            .filter_map(|frame| match self.decode(frame) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("dropping frame: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ShotOptions;
    use crate::models::PlayerId;
    use std::collections::BTreeMap;

    #[test]
    fn test_broadcast_reaches_every_client_in_order() {
        let hub = LoopbackHub::new();
        let mut coordinator = hub.coordinator();
        let mut a = hub.client();
        let mut b = hub.client();

        for tick in 1..=3 {
            coordinator.send(&AuthorityMessage::StateDelta { tick, values: BTreeMap::new() }).unwrap();
        }
        for client in [&mut a, &mut b] {
            let ticks: Vec<u64> = client
                .drain_inbox()
                .into_iter()
                .filter_map(|m| match m {
                    AuthorityMessage::StateDelta { tick, .. } => Some(tick),
                    _ => None,
                })
                .collect();
            assert_eq!(ticks, vec![1, 2, 3]);
        }
        assert!(a.drain_inbox().is_empty());
        assert!(coordinator.drain_inbox().is_empty());
    }

    #[test]
    fn test_request_goes_to_coordinator() {
        let hub = LoopbackHub::new();
        let mut coordinator = hub.coordinator();
        let mut client = hub.client();
        let request = AuthorityMessage::ShotRequest { shooter: PlayerId(2), options: ShotOptions::default() };
        client.send(&request).unwrap();
        assert_eq!(coordinator.drain_inbox(), vec![request]);
    }

    #[test]
    fn test_garbage_and_foreign_frames_dropped() {
        let hub = LoopbackHub::new();
        let mut coordinator = hub.coordinator();
        hub.inject_to_coordinator("not json");

        let foreign = Envelope {
            session: Uuid::new_v4(),
            seq: 1,
            sent_at: Utc::now(),
            message: AuthorityMessage::ShotRequest { shooter: PlayerId(0), options: ShotOptions::default() },
        };
        hub.inject_to_coordinator(serde_json::to_string(&foreign).unwrap());
        assert!(coordinator.drain_inbox().is_empty());
    }
}
