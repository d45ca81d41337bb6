//! Application settings loaded via OrthoConfig, the server configuration
//! object derived from them, and session key loading.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use cap_std::{ambient_authority, fs::Dir};
use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::DEFAULT_OTP_TTL_SECONDS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Shortest key file accepted; `Key::derive_from` needs at least 32 bytes.
pub const SESSION_KEY_MIN_LEN: usize = 64;

/// Runtime settings, read from `PROPVEST_*` environment variables,
/// configuration files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROPVEST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory for JSON snapshots. Without it nothing survives a restart.
    pub data_dir: Option<PathBuf>,
    /// Directory uploaded images are written to.
    pub upload_dir: Option<PathBuf>,
    /// Insert the demo accounts and listings on startup. Defaults to on.
    pub seed_demo_data: Option<bool>,
    /// Return issued verification codes in API responses. Development only.
    pub expose_dev_otp: Option<bool>,
    /// Lifetime of a verification code, in seconds.
    pub otp_ttl_seconds: Option<u32>,
    /// File holding the session signing key. An ephemeral key is used when
    /// unset.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`. Defaults to on.
    pub cookie_secure: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn seed_demo_data(&self) -> bool {
        self.seed_demo_data.unwrap_or(true)
    }

    pub fn expose_dev_otp(&self) -> bool {
        self.expose_dev_otp.unwrap_or(false)
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn otp_ttl(&self) -> TimeDelta {
        let seconds = self
            .otp_ttl_seconds
            .map_or(DEFAULT_OTP_TTL_SECONDS, i64::from);
        TimeDelta::seconds(seconds)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site: SameSite::Lax,
            bind_addr,
        }
    }

    /// Override the `SameSite` attribute of the session cookie.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionKeyError {
    #[error("failed to read session key at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

fn read_key_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path names no file")
    })?;
    Dir::open_ambient_dir(parent, ambient_authority())?.read(file_name)
}

/// Derive the cookie signing key from `path`, or generate a temporary one
/// when no path is configured.
pub fn load_session_key(path: Option<&Path>) -> Result<Key, SessionKeyError> {
    let Some(path) = path else {
        warn!("no session key file configured; using temporary session key (dev only)");
        return Ok(Key::generate());
    };
    let mut bytes = read_key_file(path).map_err(|source| SessionKeyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SessionKeyError::TooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and key loading.

    use super::*;
    use std::ffi::OsString;

    use crate::test_support::cap_fs::write_file;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "PROPVEST_BIND_ADDR",
        "PROPVEST_DATA_DIR",
        "PROPVEST_UPLOAD_DIR",
        "PROPVEST_SEED_DEMO_DATA",
        "PROPVEST_EXPOSE_DEV_OTP",
        "PROPVEST_OTP_TTL_SECONDS",
        "PROPVEST_SESSION_KEY_FILE",
        "PROPVEST_COOKIE_SECURE",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("propvest")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:4000".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.data_dir.is_none());
        assert_eq!(settings.upload_dir(), PathBuf::from("uploads"));
        assert!(settings.seed_demo_data());
        assert!(!settings.expose_dev_otp());
        assert_eq!(settings.otp_ttl(), TimeDelta::seconds(600));
        assert!(settings.session_key_file.is_none());
        assert!(settings.cookie_secure());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PROPVEST_BIND_ADDR", Some("127.0.0.1:8080".to_owned())),
            ("PROPVEST_DATA_DIR", Some("/tmp/propvest-data".to_owned())),
            ("PROPVEST_UPLOAD_DIR", Some("/tmp/propvest-uploads".to_owned())),
            ("PROPVEST_SEED_DEMO_DATA", Some("false".to_owned())),
            ("PROPVEST_EXPOSE_DEV_OTP", Some("true".to_owned())),
            ("PROPVEST_OTP_TTL_SECONDS", Some("120".to_owned())),
            ("PROPVEST_SESSION_KEY_FILE", None),
            ("PROPVEST_COOKIE_SECURE", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/propvest-data")));
        assert_eq!(settings.upload_dir(), PathBuf::from("/tmp/propvest-uploads"));
        assert!(!settings.seed_demo_data());
        assert!(settings.expose_dev_otp());
        assert_eq!(settings.otp_ttl(), TimeDelta::seconds(120));
        assert!(!settings.cookie_secure());
    }

    #[rstest]
    fn switches_default_on_and_follow_the_environment() {
        let _guard = lock_env([
            ("PROPVEST_SEED_DEMO_DATA", None),
            ("PROPVEST_COOKIE_SECURE", None),
            ("PROPVEST_EXPOSE_DEV_OTP", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.cookie_secure(), "cookies stay Secure unless disabled");
        assert!(settings.seed_demo_data());
        assert!(settings.expose_dev_otp());
    }

    #[rstest]
    fn missing_key_path_yields_a_temporary_key() {
        assert!(load_session_key(None).is_ok());
    }

    #[rstest]
    fn short_key_files_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session_key");
        write_file(&path, &[7_u8; 16]).expect("write key");

        let outcome = load_session_key(Some(&path));
        assert!(matches!(
            outcome,
            Err(SessionKeyError::TooShort { length: 16, .. })
        ));
    }

    #[rstest]
    fn long_key_files_are_accepted() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session_key");
        write_file(&path, &[7_u8; SESSION_KEY_MIN_LEN]).expect("write key");

        let (Ok(first), Ok(second)) = (
            load_session_key(Some(&path)),
            load_session_key(Some(&path)),
        ) else {
            panic!("key files of sufficient length must load");
        };
        assert_eq!(first.master(), second.master());
    }

    #[rstest]
    fn unreadable_key_files_are_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outcome = load_session_key(Some(&dir.path().join("absent")));
        assert!(matches!(outcome, Err(SessionKeyError::Read { .. })));
    }
}
