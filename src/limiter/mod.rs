use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::identity::TOKEN_TTL_SECS;


/// Per-client quota state: `Unseen -> Active -> Banned`, where `Banned` is
/// terminal for the life of the token.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub id: u64,
    pub request_count: u32,
    pub banned: bool,
    pub issued_at: SystemTime,
    pub expires_at: SystemTime,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// Request admitted; `minted` carries a freshly issued identity id that
    /// must be communicated back to the client as a cookie.
    Allow { minted: Option<u64> },
    /// Request rejected. `newly_banned` is true only on the transition into
    /// the banned state, so the caller can set the ban marker once.
    Reject { newly_banned: bool },
}

/// Identity table with a monotonic id generator. Expired identities are
/// swept lazily whenever a fresh identity is minted.
pub struct RateLimiterState {
    identities: HashMap<u64, ClientIdentity>,
    next_id: u64,
    max_requests: u32,
    token_ttl: Duration,
}

impl RateLimiterState {
    pub fn new(max_requests: u32) -> Self {
        Self {
            identities: HashMap::new(),
            next_id: 0,
            max_requests,
            token_ttl: Duration::from_secs(TOKEN_TTL_SECS),
        }
    }

    /// Admits or rejects one request. The request that crosses the quota is
    /// itself rejected: requests 1..=max are allowed, request max+1 bans.
    pub fn admit(&mut self, token: Option<u64>, now: SystemTime) -> Admission {
        if let Some(id) = token {
            let expired = self
                .identities
                .get(&id)
                .map(|client| now >= client.expires_at)
                .unwrap_or(false);
            if expired {
                self.identities.remove(&id);
            }

            if let Some(client) = self.identities.get_mut(&id) {
                if client.banned {
                    return Admission::Reject { newly_banned: false };
                }
                client.request_count += 1;
                if client.request_count > self.max_requests {
                    client.banned = true;
                    tracing::info!(id, count = client.request_count, "identity banned");
                    return Admission::Reject { newly_banned: true };
                }
                return Admission::Allow { minted: None };
            }
        }

        // No token, or the token no longer names a live identity.
        Admission::Allow {
            minted: Some(self.mint(now)),
        }
    }

    pub fn identity(&self, id: u64) -> Option<&ClientIdentity> {
        self.identities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    fn mint(&mut self, now: SystemTime) -> u64 {
        self.identities.retain(|_, client| now < client.expires_at);

        let id = self.next_id;
        self.next_id += 1;
        self.identities.insert(
            id,
            ClientIdentity {
                id,
                request_count: 1,
                banned: false,
                issued_at: now,
                expires_at: now + self.token_ttl,
            },
        );
        tracing::debug!(id, "minted identity");
        id
    }
}
