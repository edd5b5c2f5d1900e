use crate::{model::Shot, utils::Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info, warn};

const ADMIN: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.username == ADMIN
    }

    /// Shots may be removed by whoever logged them, or by the admin.
    pub fn may_delete(&self, shot: &Shot) -> bool {
        self.is_admin() || shot.gebruiker.as_deref() == Some(self.username.as_str())
    }

    pub fn is_valid(&self) -> bool {
        is_token_valid(&self.token, SystemTime::now())
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: f64,
}

/// `exp` claim of a JWT, in seconds since the epoch.
pub fn token_expiry(token: &str) -> Option<f64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    json::from_slice::<Claims>(&bytes).ok().map(|claims| claims.exp)
}

pub fn is_token_valid(token: &str, now: SystemTime) -> bool {
    let Some(exp) = token_expiry(token) else {
        return false;
    };
    let now_ms = now
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |since| since.as_secs_f64() * 1000.0);
    exp * 1000.0 > now_ms
}

/// Local persistent storage of the logged in user.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the stored session, dropping it when the token has expired.
    pub fn restore(&self) -> Option<Session> {
        match self.load() {
            Ok(Some(session)) if session.is_valid() => {
                info!(username = %session.username, "restored session");
                Some(session)
            }
            Ok(Some(_)) => {
                debug!("stored token expired");
                self.clear_or_warn();
                None
            }
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "unreadable session file");
                self.clear_or_warn();
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json::to_vec_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    pub fn clear_or_warn(&self) {
        if let Err(error) = self.clear() {
            warn!(%error, "could not remove session file");
        }
    }
}
