//! Connection pool
//!
//! Hands out one connection per worker. Connections are never shared
//! between requests in flight, so per-connection FIFO ordering holds.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::Result;

use super::connection::Client;

/// A pool of idle client connections
pub struct ClientPool {
    config: ClientConfig,

    /// Connections waiting to be reused (most recently returned last)
    idle: Mutex<Vec<Client>>,
}

impl ClientPool {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle connection or open a new one
    pub fn get(&self) -> Result<PooledClient<'_>> {
        let reused = {
            let mut idle = self.idle.lock();
            // Drop anything that died while parked
            idle.retain(|c| !c.is_closed());
            idle.pop()
        };

        let client = match reused {
            Some(client) => client,
            None => {
                tracing::debug!(addr = %self.config.addr, "opening pooled connection");
                Client::connect(self.config.clone())?
            }
        };

        Ok(PooledClient {
            pool: self,
            client: Some(client),
        })
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn put_back(&self, client: Client) {
        if client.is_closed() {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.config.pool_max_idle {
            idle.push(client);
        } else {
            drop(idle);
            let _ = client.close();
        }
    }
}

/// A connection checked out of a [`ClientPool`]
///
/// Returns to the pool on drop unless it was closed.
pub struct PooledClient<'p> {
    pool: &'p ClientPool,
    client: Option<Client>,
}

impl Deref for PooledClient<'_> {
    type Target = Client;

    fn deref(&self) -> &Client {
        self.client.as_ref().expect("pooled client present until drop")
    }
}

impl DerefMut for PooledClient<'_> {
    fn deref_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("pooled client present until drop")
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.put_back(client);
        }
    }
}
