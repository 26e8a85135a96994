use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use liverelay_core::error::{RelayError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub ingest: IngestSection,

    #[serde(default)]
    pub relay: RelaySection,

    #[serde(default)]
    pub avatar: AvatarSection,

    #[serde(default)]
    pub dispatch: DispatchSection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.ingest.validate()?;
        self.relay.validate()?;
        self.avatar.validate()?;
        self.dispatch.validate()?;

        Ok(())
    }
}

fn check_range(name: &str, v: u64, lo: u64, hi: u64) -> Result<()> {
    if !(lo..=hi).contains(&v) {
        return Err(RelayError::BadConfig(format!(
            "{name} must be between {lo} and {hi}"
        )));
    }
    Ok(())
}

fn parse_addr(name: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| RelayError::BadConfig(format!("{name} must be a valid SocketAddr: {e}")))
}

/// Upstream side: WebSocket endpoint the live-room client pushes events into.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ingest_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_frame_bytes: default_ingest_max_frame_bytes(),
        }
    }
}

impl IngestSection {
    pub fn validate(&self) -> Result<()> {
        parse_addr("ingest.listen", &self.listen)?;
        check_range("ingest.max_frame_bytes", self.max_frame_bytes as u64, 1024, 4 * 1024 * 1024)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_addr("ingest.listen", &self.listen)
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
fn default_ingest_max_frame_bytes() -> usize {
    64 * 1024
}

/// Downstream side: the consumer chat messages are forwarded to.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default = "default_relay_addr")]
    pub addr: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_relay_max_frame_bytes")]
    pub max_frame_bytes: usize,

    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            addr: default_relay_addr(),
            connect_timeout_ms: default_connect_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            max_frame_bytes: default_relay_max_frame_bytes(),
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        parse_addr("relay.addr", &self.addr)?;
        check_range("relay.connect_timeout_ms", self.connect_timeout_ms, 100, 30_000)?;
        check_range("relay.queue_capacity", self.queue_capacity as u64, 1, 65_536)?;
        check_range("relay.max_frame_bytes", self.max_frame_bytes as u64, 64, 16 * 1024 * 1024)?;
        check_range("relay.drain_timeout_ms", self.drain_timeout_ms, 0, 60_000)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        parse_addr("relay.addr", &self.addr)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

fn default_relay_addr() -> String {
    "127.0.0.1:8052".into()
}
fn default_connect_timeout_ms() -> u64 {
    1000
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_relay_max_frame_bytes() -> usize {
    liverelay_core::protocol::frame::DEFAULT_MAX_FRAME_BYTES
}
fn default_drain_timeout_ms() -> u64 {
    5000
}

/// Local avatar cache and the remote profile endpoint that fills it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvatarSection {
    #[serde(default = "default_avatar_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_fallback_file")]
    pub fallback_file: String,

    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AvatarSection {
    fn default() -> Self {
        Self {
            dir: default_avatar_dir(),
            fallback_file: default_fallback_file(),
            profile_url: default_profile_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl AvatarSection {
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(RelayError::BadConfig("avatar.dir must not be empty".into()));
        }
        if self.fallback_file.is_empty() || self.fallback_file.contains(['/', '\\']) {
            return Err(RelayError::BadConfig(
                "avatar.fallback_file must be a bare file name".into(),
            ));
        }
        if !(self.profile_url.starts_with("http://") || self.profile_url.starts_with("https://")) {
            return Err(RelayError::BadConfig(
                "avatar.profile_url must be an http(s) url".into(),
            ));
        }
        check_range("avatar.request_timeout_ms", self.request_timeout_ms, 100, 60_000)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_avatar_dir() -> PathBuf {
    PathBuf::from("./user_photos")
}
fn default_fallback_file() -> String {
    "0.png".into()
}
fn default_profile_url() -> String {
    "https://api.bilibili.com/x/space/acc/info".into()
}
fn default_request_timeout_ms() -> u64 {
    5000
}

/// Operator-tunable part of the dispatch table.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    /// Extra tags to drop silently, on top of the built-in ignore list.
    #[serde(default)]
    pub extra_ignored_cmds: Vec<String>,
}

impl DispatchSection {
    pub fn validate(&self) -> Result<()> {
        for cmd in &self.extra_ignored_cmds {
            if cmd.is_empty() || cmd.contains(':') {
                return Err(RelayError::BadConfig(format!(
                    "dispatch.extra_ignored_cmds entry {cmd:?} must be a non-empty tag without a version suffix"
                )));
            }
        }
        Ok(())
    }
}
