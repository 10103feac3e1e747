use serde::Deserialize;

/// The account behind the token, as returned by `/users/@me`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
}

/// A friend, incoming/outgoing friend request, or blocked user.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
}

/// A private channel: a DM or group DM.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
}

/// A guild the user is a member of.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Guild {
    pub id: String,
    /// Whether the user owns this guild.
    /// Owned guilds can't be left, only deleted.
    #[serde(default)]
    pub owner: bool,
}
