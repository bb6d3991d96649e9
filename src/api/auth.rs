use crate::config::Config;
use crate::token::{basic_auth_header, StoredToken, TokenResponse, TokenStore};
use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::info;
use url::Url;

/// Scopes needed to read the user's playlists and write private or public ones.
pub const SCOPES: &[&str] = &[
    "playlist-modify-private",
    "playlist-read-private",
    "playlist-modify-public",
];

/// Manual authorization-code flow:
/// 1. Build the authorization URL and print it.
/// 2. The user approves in a browser and is redirected to the redirect URI
///    (the page may fail to load if nothing listens there).
/// 3. The user pastes the full redirect URL back into the terminal.
/// 4. The `code` param is exchanged for an access + refresh token.
/// 5. The token is saved to the token file.
pub async fn run_auth(cfg: &Config) -> Result<()> {
    use std::io;

    if !cfg.has_client_credentials() {
        return Err(anyhow!(
            "client_id and client_secret must be set in the config file or via SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET"
        ));
    }

    let url = authorize_url(cfg)?;
    println!(
        "Open this URL in your browser and authorize the application:\n\n{}\n",
        url
    );
    println!("After authorizing, you'll be redirected to your redirect URI. Copy the full redirect URL and paste it here.");
    println!("Paste redirect URL:");
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = extract_code(input.trim())?;

    let st = exchange_code(cfg, &code).await?;
    let store = TokenStore::new(cfg.token_path.clone());
    store.save(&st)?;

    info!("Spotify token saved to {}", store.path().display());
    println!("Saved token. You can now run a sync.");
    Ok(())
}

pub fn authorize_url(cfg: &Config) -> Result<Url> {
    let base = format!("{}/authorize", cfg.auth_base.trim_end_matches('/'));
    let mut url = Url::parse(&base)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &cfg.client_id)
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("redirect_uri", &cfg.redirect_uri)
        .append_pair("show_dialog", "true");
    Ok(url)
}

/// Pull the `code` query parameter out of a pasted redirect URL. An `error`
/// parameter (the user denied access) is reported as such.
pub fn extract_code(redirect_url: &str) -> Result<String> {
    let parsed = Url::parse(redirect_url).map_err(|e| anyhow!("invalid url pasted: {}", e))?;
    if let Some((_, err)) = parsed.query_pairs().find(|(k, _)| k == "error") {
        return Err(anyhow!("authorization denied: {}", err));
    }
    let code = parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .ok_or_else(|| anyhow!("no code in redirect URL"))?
        .1
        .into_owned();
    Ok(code)
}

pub async fn exchange_code(cfg: &Config, code: &str) -> Result<StoredToken> {
    let client = Client::new();
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", cfg.redirect_uri.as_str()),
    ];
    let url = format!("{}/api/token", cfg.auth_base.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .header("Authorization", basic_auth_header(&cfg.client_id, &cfg.client_secret))
        .form(&params)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        return Err(anyhow!("token exchange failed: {} => {}", status, txt));
    }
    let tr: TokenResponse = resp.json().await?;
    Ok(tr.into_stored(None))
}
