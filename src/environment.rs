//! Execution environment classification.
//!
//! The panel either runs inside the game client's embedded browser (NUI mode)
//! or in a plain browser / native process during development. The
//! classification is derived once at startup from [`HostSignals`] and
//! installed as a single process-wide value; later checks only read it.

use std::fmt;
use std::sync::OnceLock;

/// Where the panel is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    /// Inside the game client; requests reach the host process.
    EmbeddedHost,
    /// Plain browser (dev mode); callers may short-circuit to fallback values.
    StandaloneBrowser,
}

impl Environment {
    /// Classify from raw signals.
    ///
    /// Embedded iff the native-call bridge is present, the mode flag is not
    /// explicitly false, and the page is not served over http(s).
    pub fn classify(signals: &HostSignals) -> Self {
        let served_from_web = matches!(
            signals.origin_scheme.as_deref(),
            Some("http") | Some("https")
        );
        if signals.native_bridge_present && signals.mode_flag != Some(false) && !served_from_web {
            Environment::EmbeddedHost
        } else {
            Environment::StandaloneBrowser
        }
    }

    #[inline]
    pub fn is_embedded(self) -> bool {
        matches!(self, Environment::EmbeddedHost)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::EmbeddedHost => write!(f, "embedded-host"),
            Environment::StandaloneBrowser => write!(f, "standalone-browser"),
        }
    }
}

/// Independent heuristics gathered from the hosting context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostSignals {
    /// A host-injected native-call function is present.
    pub native_bridge_present: bool,
    /// Explicit mode flag set by the host page, if any.
    pub mode_flag: Option<bool>,
    /// Scheme of the page origin without the trailing colon (`https`, `nui`, ...).
    pub origin_scheme: Option<String>,
}

impl HostSignals {
    /// Signals as seen inside the game client.
    pub fn embedded() -> Self {
        HostSignals {
            native_bridge_present: true,
            mode_flag: None,
            origin_scheme: Some("nui".to_string()),
        }
    }

    /// Signals as seen from a plain browser tab.
    pub fn standalone() -> Self {
        HostSignals {
            native_bridge_present: false,
            mode_flag: None,
            origin_scheme: Some("http".to_string()),
        }
    }

    /// Read signals from the current context.
    ///
    /// In the browser this inspects the host-injected globals. Native
    /// processes talk to the host directly, so they report an embedded
    /// context with no origin.
    pub fn detect() -> Self {
        crate::webshim::read_host_signals()
    }
}

static INSTALLED: OnceLock<Environment> = OnceLock::new();

/// Install the process-wide environment. First write wins; the value that
/// ends up installed is returned.
pub fn install(env: Environment) -> Environment {
    match INSTALLED.set(env) {
        Ok(()) => {
            log::info!("[nui][env] running as {env}");
            env
        }
        Err(_) => {
            let current = current();
            if current != env {
                log::warn!("[nui][env] ignoring reinstall as {env}; already {current}");
            }
            current
        }
    }
}

/// Installed environment, standalone browser when nothing was installed.
#[inline]
pub fn current() -> Environment {
    INSTALLED
        .get()
        .copied()
        .unwrap_or(Environment::StandaloneBrowser)
}

#[inline]
pub fn is_embedded_host() -> bool {
    current().is_embedded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_requires_bridge_function() {
        let mut signals = HostSignals::embedded();
        assert_eq!(Environment::classify(&signals), Environment::EmbeddedHost);

        signals.native_bridge_present = false;
        assert_eq!(
            Environment::classify(&signals),
            Environment::StandaloneBrowser
        );
    }

    #[test]
    fn explicit_false_mode_flag_wins() {
        let signals = HostSignals {
            mode_flag: Some(false),
            ..HostSignals::embedded()
        };
        assert_eq!(
            Environment::classify(&signals),
            Environment::StandaloneBrowser
        );

        let signals = HostSignals {
            mode_flag: Some(true),
            ..HostSignals::embedded()
        };
        assert_eq!(Environment::classify(&signals), Environment::EmbeddedHost);
    }

    #[test]
    fn web_origin_means_standalone() {
        for scheme in ["http", "https"] {
            let signals = HostSignals {
                origin_scheme: Some(scheme.to_string()),
                ..HostSignals::embedded()
            };
            assert!(!Environment::classify(&signals).is_embedded());
        }
        assert!(!Environment::classify(&HostSignals::standalone()).is_embedded());
        assert!(!Environment::classify(&HostSignals::default()).is_embedded());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_process_detects_embedded() {
        assert_eq!(
            Environment::classify(&HostSignals::detect()),
            Environment::EmbeddedHost
        );
    }

    #[test]
    fn install_is_first_write_wins() {
        assert_eq!(install(Environment::EmbeddedHost), Environment::EmbeddedHost);
        assert_eq!(
            install(Environment::StandaloneBrowser),
            Environment::EmbeddedHost
        );
        assert!(is_embedded_host());
    }
}
