use reqwest::{header, Method};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{
    response::{RemoteResponse, Reply},
    types::User,
};
use crate::config::ClientConfig;

/// A thin client over the Discord endpoints we need.
///
/// Every method issues exactly one request and hands back the normalized
/// body. Retrying and rate-limit handling are left to the caller.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    /// Base URL, without a trailing slash.
    base_url: String,
    /// The user's token, sent as-is within `Authorization`.
    token: String,
    /// Who the token belongs to, if we verified it.
    user: Option<User>,
}

/// Possible failures while talking to Discord.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid user token")]
    InvalidToken,
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl ApiClient {
    /// Creates a new API client around the given token.
    ///
    /// Unless disabled within `config`, the token is verified before returning.
    pub async fn connect(token: String, config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let mut client = Self {
            http,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            token,
            user: None,
        };

        if config.verify_token {
            client.user = Some(client.verify_credential().await?);
        }
        Ok(client)
    }

    /// The verified account, if verification was performed.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Ensures the token resolves to an account.
    ///
    /// Discord answers an invalid token with `{"message": "401: Unauthorized", "code": 0}`,
    /// so the absence of `id` is what we go by. Whatever `id` holds is kept as-is.
    pub async fn verify_credential(&self) -> Result<User, ApiError> {
        let reply = self.request(Method::GET, "/users/@me", None).await?;
        let Some(object) = reply.body.as_object() else {
            return Err(ApiError::InvalidToken);
        };
        let Some(id) = object.get("id") else {
            return Err(ApiError::InvalidToken);
        };

        Ok(User {
            id: match id {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            },
            username: object
                .get("username")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub async fn list_guilds(&self) -> Result<Reply, ApiError> {
        self.request(Method::GET, "/users/@me/guilds", None).await
    }

    pub async fn leave_guild(&self, guild_id: &str) -> Result<Reply, ApiError> {
        self.request(Method::DELETE, &format!("/users/@me/guilds/{guild_id}"), None)
            .await
    }

    /// Deletes a guild outright. Only valid for guilds the user owns.
    pub async fn delete_guild(&self, guild_id: &str) -> Result<Reply, ApiError> {
        self.request(Method::POST, &format!("/guilds/{guild_id}/delete"), Some(json!({})))
            .await
    }

    pub async fn list_channels(&self) -> Result<Reply, ApiError> {
        self.request(Method::GET, "/users/@me/channels", None).await
    }

    /// Closes a private channel, non-silently like the official client.
    pub async fn delete_channel(&self, channel_id: &str) -> Result<Reply, ApiError> {
        let url = self.url(&format!("/channels/{channel_id}"));
        let request = self
            .http
            .request(Method::DELETE, url)
            .query(&[("silent", "false")]);
        self.execute(request).await
    }

    pub async fn list_relationships(&self) -> Result<Reply, ApiError> {
        self.request(Method::GET, "/users/@me/relationships", None)
            .await
    }

    pub async fn delete_relationship(
        &self,
        relationship_id: &str,
    ) -> Result<Reply, ApiError> {
        self.request(
            Method::DELETE,
            &format!("/users/@me/relationships/{relationship_id}"),
            None,
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply, ApiError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request).await
    }

    /// Sends the request with our token attached and normalizes whatever comes back.
    ///
    /// A non-2xx status is not an error here. Error bodies, rate limits
    /// included, are returned like any other reply.
    #[instrument(skip_all)]
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Reply, ApiError> {
        let result = request
            .header(header::AUTHORIZATION, &self.token)
            .send()
            .await?;

        let status = result.status();
        let path = result.url().path().to_string();
        let body = result.text().await?;
        debug!(%status, %path, "received response");

        Ok(Reply::new(status, RemoteResponse::from_body(body)))
    }
}
