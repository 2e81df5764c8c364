//! Session and channel membership registry
//!
//! Membership is stored in both directions: each session knows its channels
//! and each channel knows its members. Every mutation updates both sides,
//! so callers must hold the hub's registry lock for the whole operation.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{ChannelName, HubStats, SessionId};

/// Result of a join or leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Membership changed
    Changed,
    /// Session was already in (join) or already out of (leave) the channel
    Unchanged,
    /// No such session is connected
    UnknownSession,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, HashSet<ChannelName>>,
    channels: HashMap<ChannelName, HashSet<SessionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. Returns false if the id was already present.
    pub fn connect(&mut self, session_id: &str) -> bool {
        if self.sessions.contains_key(session_id) {
            return false;
        }
        self.sessions.insert(session_id.to_string(), HashSet::new());
        true
    }

    /// Remove a session and all of its memberships.
    ///
    /// Returns the channels it belonged to, or `None` if it was not connected.
    pub fn disconnect(&mut self, session_id: &str) -> Option<HashSet<ChannelName>> {
        let channels = self.sessions.remove(session_id)?;
        for channel in &channels {
            self.remove_member(channel, session_id);
        }
        Some(channels)
    }

    /// Add a session to a channel, creating the channel on first use
    pub fn join(&mut self, session_id: &str, channel: &str) -> Membership {
        let Some(session_channels) = self.sessions.get_mut(session_id) else {
            return Membership::UnknownSession;
        };
        if !session_channels.insert(channel.to_string()) {
            return Membership::Unchanged;
        }
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(session_id.to_string());
        Membership::Changed
    }

    /// Remove a session from a channel. Empty channels are dropped.
    pub fn leave(&mut self, session_id: &str, channel: &str) -> Membership {
        let Some(session_channels) = self.sessions.get_mut(session_id) else {
            return Membership::UnknownSession;
        };
        if !session_channels.remove(channel) {
            return Membership::Unchanged;
        }
        self.remove_member(channel, session_id);
        Membership::Changed
    }

    fn remove_member(&mut self, channel: &str, session_id: &str) {
        if let Some(members) = self.channels.get_mut(channel) {
            members.remove(session_id);
            if members.is_empty() {
                self.channels.remove(channel);
            }
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Members of a channel; empty for unknown channels
    pub fn members(&self, channel: &str) -> Vec<SessionId> {
        self.channels
            .get(channel)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Channels a session has joined
    pub fn channels_of(&self, session_id: &str) -> Vec<ChannelName> {
        self.sessions
            .get(session_id)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            sessions: self.sessions.len(),
            channels: self
                .channels
                .iter()
                .map(|(name, members)| (name.clone(), members.len()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Both membership directions agree
    pub fn is_consistent(&self) -> bool {
        let forward = self.sessions.iter().all(|(id, channels)| {
            channels
                .iter()
                .all(|ch| self.channels.get(ch).is_some_and(|m| m.contains(id)))
        });
        let backward = self.channels.iter().all(|(ch, members)| {
            !members.is_empty()
                && members
                    .iter()
                    .all(|id| self.sessions.get(id).is_some_and(|c| c.contains(ch)))
        });
        forward && backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_creates_channel_lazily() {
        let mut registry = SessionRegistry::new();
        assert!(registry.connect("a"));
        assert!(registry.members("dashboard").is_empty());

        assert_eq!(registry.join("a", "dashboard"), Membership::Changed);
        assert_eq!(registry.join("a", "dashboard"), Membership::Unchanged);
        assert_eq!(registry.members("dashboard"), vec!["a".to_string()]);
        assert_eq!(registry.channels_of("a"), vec!["dashboard".to_string()]);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_join_unknown_session() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.join("ghost", "dashboard"), Membership::UnknownSession);
        assert!(registry.members("dashboard").is_empty());
    }

    #[test]
    fn test_duplicate_connect_keeps_memberships() {
        let mut registry = SessionRegistry::new();
        registry.connect("a");
        registry.join("a", "dashboard");
        assert!(!registry.connect("a"));
        assert_eq!(registry.channels_of("a").len(), 1);
    }

    #[test]
    fn test_disconnect_clears_every_channel() {
        let mut registry = SessionRegistry::new();
        registry.connect("a");
        registry.connect("b");
        for ch in ["dashboard", "energy", "climate"] {
            registry.join("a", ch);
        }
        registry.join("b", "dashboard");

        let left = registry.disconnect("a").unwrap();
        assert_eq!(left.len(), 3);
        assert!(!registry.contains("a"));
        for ch in ["dashboard", "energy", "climate"] {
            assert!(!registry.members(ch).contains(&"a".to_string()));
        }
        assert_eq!(registry.members("dashboard"), vec!["b".to_string()]);
        assert!(registry.is_consistent());

        // stale disconnect
        assert!(registry.disconnect("a").is_none());
    }

    #[test]
    fn test_leave_drops_empty_channel() {
        let mut registry = SessionRegistry::new();
        registry.connect("a");
        registry.join("a", "energy");

        assert_eq!(registry.leave("a", "energy"), Membership::Changed);
        assert_eq!(registry.leave("a", "energy"), Membership::Unchanged);
        assert!(registry.stats().channels.is_empty());
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_stats() {
        let mut registry = SessionRegistry::new();
        registry.connect("a");
        registry.connect("b");
        registry.join("a", "dashboard");
        registry.join("b", "dashboard");
        registry.join("b", "energy");

        let stats = registry.stats();
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.channels.get("dashboard"), Some(&2));
        assert_eq!(stats.channels.get("energy"), Some(&1));
    }
}
