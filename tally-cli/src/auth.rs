use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::state::{ensure_tally_home, tally_home};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub openai_api_key: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = ensure_tally_home()?.join("auth.json");
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// API key from `$OPENAI_API_KEY`, else `~/.tally/auth.json`.
///
/// `None` is not an error: classification then runs on keyword rules only.
pub fn resolve_api_key() -> Result<Option<String>> {
    let from_env = std::env::var(API_KEY_ENV).ok();
    pick_key(from_env, || load_auth().map(|a| a.openai_api_key))
}

fn pick_key(
    from_env: Option<String>,
    from_file: impl FnOnce() -> Result<Option<String>>,
) -> Result<Option<String>> {
    let usable = |k: &String| !k.trim().is_empty();
    if let Some(k) = from_env.filter(usable) {
        debug!("using API key from {API_KEY_ENV}");
        return Ok(Some(k.trim().to_string()));
    }
    let stored = from_file()?.filter(usable).map(|k| k.trim().to_string());
    if stored.is_none() {
        debug!("no API key configured");
    }
    Ok(stored)
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn openai_paste_api_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste OpenAI API key (starts with sk-)")?;
    if !key.starts_with("sk-") {
        bail!("key didn't look like an OpenAI API key (expected prefix sk-)");
    }
    auth.openai_api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved OpenAI API key to {}", auth_path()?.display());
    Ok(())
}
