//! services/api/src/adapters/github.rs
//!
//! The GitHub implementation of the `IdentityProvider` port: OAuth2 through the
//! `oauth2` crate, REST calls through `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use repo_bulletin_core::domain::{ProviderProfile, RepoId, UserId};
use repo_bulletin_core::ports::{IdentityProvider, PortError, PortResult};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const AUTH_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "repo-bulletin";
const SCOPE: &str = "read:user";
const PAGE_SIZE: usize = 100;

// Type alias for a fully configured OAuth client
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

#[derive(Deserialize)]
struct GithubUser {
    id: UserId,
    login: String,
}

#[derive(Deserialize)]
struct GithubRepo {
    id: RepoId,
}

pub struct GithubAdapter {
    oauth: ConfiguredClient,
    // Token requests must not follow redirects.
    oauth_http: Client,
    http: Client,
}

impl GithubAdapter {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
        timeout: Duration,
    ) -> PortResult<Self> {
        let auth_url = AuthUrl::new(AUTH_URL.to_string())
            .map_err(|e| PortError::Unexpected(format!("Invalid GitHub auth URL: {}", e)))?;
        let token_url = TokenUrl::new(TOKEN_URL.to_string())
            .map_err(|e| PortError::Unexpected(format!("Invalid GitHub token URL: {}", e)))?;
        let redirect_url = RedirectUrl::new(redirect_url.to_string())
            .map_err(|e| PortError::Unexpected(format!("Invalid redirect URL: {}", e)))?;

        let oauth = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let oauth_http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            oauth,
            oauth_http,
            http,
        })
    }

    /// `{API_BASE}/users/{handle}/{tail...}` with the handle escaped as one segment.
    fn user_url(handle: &str, tail: &[&str]) -> PortResult<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| PortError::Unexpected(format!("Invalid GitHub API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("GitHub API URL cannot be a base".to_string()))?
            .push("users")
            .push(handle)
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        access_token: Option<&str>,
    ) -> PortResult<T> {
        let mut request = self
            .http
            .get(url.clone())
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("GitHub request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "GitHub API returned status: {} for {}",
                status,
                url.path()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to decode GitHub response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GithubAdapter {
    fn authorize_url(&self, state: &str) -> String {
        let (url, _) = self
            .oauth
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scope(Scope::new(SCOPE.to_string()))
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> PortResult<String> {
        debug!("Exchanging GitHub code for token");
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.oauth_http)
            .await
            .map_err(|e| PortError::Unexpected(format!("Token exchange failed: {}", e)))?;
        Ok(token.access_token().secret().to_string())
    }

    async fn fetch_profile(&self, access_token: &str) -> PortResult<ProviderProfile> {
        let url = Url::parse(&format!("{}/user", API_BASE))
            .map_err(|e| PortError::Unexpected(format!("Invalid GitHub API URL: {}", e)))?;
        let user: GithubUser = self.get_json(url, Some(access_token)).await?;
        Ok(ProviderProfile {
            id: user.id,
            handle: user.login,
        })
    }

    async fn list_repos(&self, handle: &str, access_token: &str) -> PortResult<Vec<RepoId>> {
        let mut ids = Vec::new();
        for page in 1.. {
            let mut url = Self::user_url(handle, &["repos"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let repos: Vec<GithubRepo> = self.get_json(url, Some(access_token)).await?;
            let fetched = repos.len();
            ids.extend(repos.into_iter().map(|repo| repo.id));
            debug!(handle, page, fetched, "Fetched repository page");

            if fetched < PAGE_SIZE {
                break;
            }
        }
        Ok(ids)
    }

    async fn lookup_user(&self, handle: &str) -> PortResult<UserId> {
        let user: GithubUser = self.get_json(Self::user_url(handle, &[])?, None).await?;
        Ok(user.id)
    }
}
