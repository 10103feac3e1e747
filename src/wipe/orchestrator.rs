use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{info, warn};

use super::{error::WipeError, retry::request_wait, sleep::Sleeper};
use crate::{
    api::{ApiClient, Channel, Guild, Relationship, RemoteResponse, Reply},
    config::WipeConfig,
};

/// One of the collections we wipe, in the order we wipe them.
///
/// Relationships go first and guilds last: deleting an owned guild is the
/// one step nobody can take back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Relationships,
    Channels,
    Guilds,
}

impl Pass {
    pub const ORDER: [Pass; 3] = [Pass::Relationships, Pass::Channels, Pass::Guilds];
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relationships => write!(f, "relationships"),
            Self::Channels => write!(f, "channels"),
            Self::Guilds => write!(f, "guilds"),
        }
    }
}

/// What happened during a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: Pass,
    /// Items Discord accepted the removal of.
    pub removed: usize,
    /// Items Discord answered with an error status or body,
    /// e.g. because they were already gone.
    pub rejected: usize,
}

impl PassSummary {
    fn new(pass: Pass) -> Self {
        Self {
            pass,
            removed: 0,
            rejected: 0,
        }
    }

    /// Tallies the answer to a removal.
    fn record(&mut self, id: &str, reply: &Reply) {
        if !reply.is_rejection() {
            info!(pass = %self.pass, id, "removed");
            self.removed += 1;
            return;
        }

        match reply.body.platform_error() {
            Some(error) => warn!(
                pass = %self.pass,
                id,
                status = %reply.status,
                code = error.code,
                reason = %error.message,
                "Discord refused removal, skipping"
            ),
            None => warn!(
                pass = %self.pass,
                id,
                status = %reply.status,
                "removal failed, skipping"
            ),
        }
        self.rejected += 1;
    }
}

/// Removes everything, one pass per collection.
#[derive(Debug)]
pub struct Wiper<'a, S> {
    client: &'a ApiClient,
    config: WipeConfig,
    sleeper: S,
}

impl<'a, S: Sleeper> Wiper<'a, S> {
    pub fn new(client: &'a ApiClient, config: WipeConfig, sleeper: S) -> Self {
        Self {
            client,
            config,
            sleeper,
        }
    }

    /// Runs every pass in order, stopping at the first fatal error.
    ///
    /// Anything removed before an error stays removed.
    pub async fn run(&self) -> Result<Vec<PassSummary>, WipeError> {
        let mut summaries = Vec::with_capacity(Pass::ORDER.len());
        for pass in Pass::ORDER {
            let summary = match pass {
                Pass::Relationships => self.delete_relationships().await?,
                Pass::Channels => self.delete_channels().await?,
                Pass::Guilds => self.leave_guilds().await?,
            };
            info!(
                pass = %summary.pass,
                removed = summary.removed,
                rejected = summary.rejected,
                "pass complete"
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }

    /// Removes friends, friend requests and blocks.
    pub async fn delete_relationships(&self) -> Result<PassSummary, WipeError> {
        let client = self.client;
        let relationships: Vec<Relationship> = self.list(Pass::Relationships).await?;

        let mut summary = PassSummary::new(Pass::Relationships);
        for relationship in relationships {
            let id = relationship.id.as_str();
            let reply = request_wait(&self.config.retry, &self.sleeper, move || {
                client.delete_relationship(id)
            })
            .await?;
            summary.record(id, &reply);
            self.pace().await;
        }
        Ok(summary)
    }

    /// Closes every DM and group DM.
    pub async fn delete_channels(&self) -> Result<PassSummary, WipeError> {
        let client = self.client;
        let channels: Vec<Channel> = self.list(Pass::Channels).await?;

        let mut summary = PassSummary::new(Pass::Channels);
        for channel in channels {
            let id = channel.id.as_str();
            let reply = request_wait(&self.config.retry, &self.sleeper, move || {
                client.delete_channel(id)
            })
            .await?;
            summary.record(id, &reply);
            self.pace().await;
        }
        Ok(summary)
    }

    /// Leaves every guild, deleting the ones the user owns.
    pub async fn leave_guilds(&self) -> Result<PassSummary, WipeError> {
        let client = self.client;
        let guilds: Vec<Guild> = self.list(Pass::Guilds).await?;

        let mut summary = PassSummary::new(Pass::Guilds);
        for guild in guilds {
            let id = guild.id.as_str();
            let owner = guild.owner;
            let reply = request_wait(&self.config.retry, &self.sleeper, move || async move {
                if owner {
                    client.delete_guild(id).await
                } else {
                    client.leave_guild(id).await
                }
            })
            .await?;
            summary.record(id, &reply);
            self.pace().await;
        }
        Ok(summary)
    }

    /// Fetches and decodes a collection.
    async fn list<T: DeserializeOwned>(&self, pass: Pass) -> Result<Vec<T>, WipeError> {
        let client = self.client;
        let reply = request_wait(&self.config.retry, &self.sleeper, move || async move {
            match pass {
                Pass::Relationships => client.list_relationships().await,
                Pass::Channels => client.list_channels().await,
                Pass::Guilds => client.list_guilds().await,
            }
        })
        .await?;

        let items = match reply.body {
            RemoteResponse::List(items) => items,
            response => return Err(WipeError::UnexpectedListing { pass, response }),
        };
        info!(%pass, count = items.len(), "fetched");

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|source| WipeError::MalformedItem { pass, source })
            })
            .collect()
    }

    async fn pace(&self) {
        self.sleeper.sleep(self.config.pace).await;
    }
}
