//! Watch-party chat and presence over the realtime change feed.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::rate_limit::RateLimiter;
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeFilter, ChangeKind, Subscription};

pub const MAX_MESSAGE_CHARS: usize = 500;
pub const MESSAGES_PER_WINDOW: usize = 5;
pub const MESSAGE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyEvent {
    Message(ChatMessage),
    MessageDeleted(u64),
    Joined(String),
    /// Reply to a `Joined` from someone already in the party
    Present(String),
    Left(String),
}

impl PartyEvent {
    fn kind(&self) -> ChangeKind {
        match self {
            PartyEvent::Message(_) | PartyEvent::Joined(_) => ChangeKind::Insert,
            PartyEvent::Present(_) => ChangeKind::Update,
            PartyEvent::MessageDeleted(_) | PartyEvent::Left(_) => ChangeKind::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchPartyError {
    EmptyMessage,
    MessageTooLong { chars: usize },
    RateLimited(Duration),
    Closed,
}

impl fmt::Display for WatchPartyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchPartyError::EmptyMessage => write!(f, "message is empty"),
            WatchPartyError::MessageTooLong { chars } => {
                write!(f, "message is {} chars (max {})", chars, MAX_MESSAGE_CHARS)
            }
            WatchPartyError::RateLimited(wait) => {
                write!(f, "slow down, try again in {:.0}s", wait.as_secs_f32().ceil())
            }
            WatchPartyError::Closed => write!(f, "left the watch party"),
        }
    }
}

impl std::error::Error for WatchPartyError {}

pub fn channel_name(party_id: u64) -> String {
    format!("watch_party:{}", party_id)
}

/// One participant's view of a watch party.
pub struct WatchParty {
    party_id: u64,
    user: String,
    feed: ChangeFeed<PartyEvent>,
    subscription: Subscription<PartyEvent>,
    messages: Vec<ChatMessage>,
    presence: BTreeSet<String>,
    limiter: RateLimiter,
    next_local_id: u64,
}

impl WatchParty {
    /// Subscribe to the party channel and announce `user`.
    pub fn join(feed: &ChangeFeed<PartyEvent>, party_id: u64, user: impl Into<String>) -> Self {
        let user = user.into();
        let subscription = feed.subscribe(ChangeFilter::channel(channel_name(party_id)));
        let party = Self {
            party_id,
            user,
            feed: feed.clone(),
            subscription,
            messages: Vec::new(),
            presence: BTreeSet::new(),
            limiter: RateLimiter::new(MESSAGES_PER_WINDOW, MESSAGE_WINDOW),
            next_local_id: 1,
        };
        party.publish(PartyEvent::Joined(party.user.clone()));
        log::info!("{} joined watch party {}", party.user, party_id);
        party
    }

    pub fn party_id(&self) -> u64 {
        self.party_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn presence(&self) -> &BTreeSet<String> {
        &self.presence
    }

    pub fn is_open(&self) -> bool {
        self.subscription.is_open()
    }

    /// Apply pending events in delivery order. Returns how many changed state.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        for event in self.subscription.drain() {
            if self.apply(event.payload) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, event: PartyEvent) -> bool {
        match event {
            PartyEvent::Message(msg) => {
                if self.messages.iter().any(|m| m.id == msg.id) {
                    return false;
                }
                self.messages.push(msg);
                true
            }
            PartyEvent::MessageDeleted(id) => {
                let before = self.messages.len();
                self.messages.retain(|m| m.id != id);
                self.messages.len() != before
            }
            PartyEvent::Joined(user) => {
                // Newcomers subscribed after our own Joined; tell them we're here.
                // Present is never answered, so replies cannot ping-pong.
                if user != self.user {
                    self.publish(PartyEvent::Present(self.user.clone()));
                }
                self.presence.insert(user)
            }
            PartyEvent::Present(user) => self.presence.insert(user),
            PartyEvent::Left(user) => self.presence.remove(&user),
        }
    }

    /// Validate, rate-limit and publish a chat message.
    pub fn send(&mut self, body: &str, now: Instant) -> Result<ChatMessage, WatchPartyError> {
        if !self.is_open() {
            return Err(WatchPartyError::Closed);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(WatchPartyError::EmptyMessage);
        }
        let chars = body.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(WatchPartyError::MessageTooLong { chars });
        }
        self.limiter
            .check(&self.user, now)
            .map_err(|e| WatchPartyError::RateLimited(e.retry_after))?;

        let msg = ChatMessage {
            id: self.next_message_id(),
            author: self.user.clone(),
            body: body.to_string(),
        };
        self.publish(PartyEvent::Message(msg.clone()));
        Ok(msg)
    }

    /// Retract one of this user's own messages.
    pub fn delete(&mut self, id: u64) -> Result<(), WatchPartyError> {
        if !self.is_open() {
            return Err(WatchPartyError::Closed);
        }
        if self.messages.iter().any(|m| m.id == id && m.author == self.user) {
            self.publish(PartyEvent::MessageDeleted(id));
        }
        Ok(())
    }

    /// Announce departure and close the subscription.
    pub fn leave(&mut self) {
        if self.is_open() {
            self.publish(PartyEvent::Left(self.user.clone()));
            self.subscription.close();
            log::info!("{} left watch party {}", self.user, self.party_id);
        }
    }

    fn publish(&self, event: PartyEvent) {
        let kind = event.kind();
        self.feed
            .publish(ChangeEvent::new(channel_name(self.party_id), kind, event));
    }

    fn next_message_id(&mut self) -> u64 {
        // Per-user id space: hash of the author in the high bits
        let id = (user_tag(&self.user) << 32) | self.next_local_id;
        self.next_local_id += 1;
        id
    }
}

impl Drop for WatchParty {
    fn drop(&mut self) {
        self.leave();
    }
}

fn user_tag(user: &str) -> u64 {
    // FNV-1a, folded to 32 bits
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in user.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash ^ (hash >> 32)) & 0xffff_ffff
}
