use agendabot::components::google_auth::{GOOGLE_AUTH_URL, GOOGLE_SCOPES};
use agendabot::components::token_store::StoredToken;
use agendabot::config::Config;
use agendabot::error::{auth_error, env_error, other_error, AgendaResult};
use agendabot::startup;
use serde::Deserialize;
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;
    authorize().await?;
    Ok(())
}

async fn authorize() -> AgendaResult<()> {
    let config = Config::load()?;
    if config.google_client_id.is_empty() {
        return Err(env_error("GOOGLE_CLIENT_ID"));
    }
    if config.google_client_secret.is_empty() {
        return Err(env_error("GOOGLE_CLIENT_SECRET"));
    }
    let store = startup::token_store(&config)?;

    // Random state guards the callback against forged requests
    let state = uuid::Uuid::new_v4().to_string();

    let mut auth_url = Url::parse(GOOGLE_AUTH_URL)
        .map_err(|e| other_error(&format!("Failed to parse URL: {}", e)))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &config.google_client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &GOOGLE_SCOPES.join(" "))
        .append_pair("state", &state);

    println!("Opening browser for Google authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Open this URL manually:\n{}", auth_url);
    }

    let server = tiny_http::Server::http(LISTEN_ADDR)
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(&format!("{}{}", REDIRECT_URI, request.url()))
        .map_err(|e| other_error(&format!("Malformed callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(auth_error("Callback state does not match the request"));
    }
    let code = param("code").ok_or_else(|| auth_error("No authorization code found in callback"))?;

    let client = reqwest::Client::new();
    let response = client
        .post(&config.google_token_url)
        .form(&[
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(auth_error(&format!("Failed to get token: {}", error_text)));
    }

    let token: TokenResponse = response.json().await?;
    let stored = StoredToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: chrono::Utc::now().timestamp() + token.expires_in.unwrap_or(3600),
        scope: token.scope,
    };
    store.save(&stored).await?;

    let reply = tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(reply)?;

    println!("Token saved to the {:?} token store", config.token_store);
    Ok(())
}
