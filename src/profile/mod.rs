// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signed-in user session.
//!
//! The session is the only state the dashboard keeps between runs: the
//! bearer token and the cached user profile. It is stored as a JSON file.
//! The profile's organization ids drive [`FeatureFlags`].
//!
//! # Examples
//!
//! ```no_run
//! use iotdash::profile::{AuthSession, ChartRules};
//! use iotdash::protocol::HttpConfig;
//! use iotdash::analytics::Metric;
//!
//! # fn example() -> iotdash::Result<()> {
//! let Some(session) = AuthSession::load("session.json")? else {
//!     // Not signed in
//!     return Ok(());
//! };
//!
//! let config = HttpConfig::new("https://api.example.com").with_token(session.token.clone());
//! let flags = ChartRules::default().resolve(&session.profile);
//! assert!(flags.is_visible(Metric::Power));
//! # Ok(())
//! # }
//! ```

mod features;

pub use features::{ChartRules, FeatureFlags};

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Cached profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user id.
    #[serde(alias = "_id")]
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Role name, e.g. `"admin"`.
    pub role: Option<String>,
    /// Organizations the user belongs to.
    #[serde(alias = "orgIds", alias = "organizations", alias = "organization_ids")]
    pub organization_ids: Vec<String>,
}

impl UserProfile {
    /// Returns `true` if the user belongs to `organization_id`.
    #[must_use]
    pub fn belongs_to(&self, organization_id: &str) -> bool {
        self.organization_ids.iter().any(|id| id == organization_id)
    }
}

/// Bearer token plus cached profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for the backend.
    pub token: String,
    /// Cached profile.
    #[serde(default)]
    pub profile: UserProfile,
}

impl AuthSession {
    /// Creates a session.
    #[must_use]
    pub fn new(token: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            token: token.into(),
            profile,
        }
    }

    /// Reads a session file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid session.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Self = serde_json::from_str(&text).map_err(ParseError::from)?;
        if session.token.trim().is_empty() {
            return Err(ParseError::MissingField("token".to_string()).into());
        }

        tracing::debug!(path = %path.display(), "Loaded session");
        Ok(Some(session))
    }

    /// Writes the session file, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(ParseError::from)?;
        std::fs::write(path, text)?;

        tracing::debug!(path = %path.display(), "Saved session");
        Ok(())
    }

    /// Deletes the session file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed.
    pub fn clear(path: impl AsRef<Path>) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
