//! Host metadata for native processes
//!
//! Fills the browser-shaped report fields from the operating system when
//! the reporter runs outside a browser. Never includes hostname or
//! username.

use erraroo_core::ports::{HostContext, LibraryInfo, CLIENT_NAME};

/// [`HostContext`] backed by process and OS information
#[derive(Debug, Clone)]
pub struct SystemContext {
    language: Option<String>,
    user_agent: String,
    url: Option<String>,
    libraries: Vec<LibraryInfo>,
}

impl SystemContext {
    /// Collect information from the current process.
    pub fn collect() -> Self {
        let kernel = read_kernel_version();
        let platform = if kernel.is_empty() {
            format!("{}; {}", std::env::consts::OS, std::env::consts::ARCH)
        } else {
            format!("{}; {}; {}", std::env::consts::OS, std::env::consts::ARCH, kernel)
        };

        Self {
            language: locale_language(),
            user_agent: format!("{CLIENT_NAME}/{} ({platform})", env!("CARGO_PKG_VERSION")),
            url: std::env::current_exe()
                .ok()
                .and_then(|p| url::Url::from_file_path(p).ok())
                .map(String::from),
            libraries: Vec::new(),
        }
    }

    /// Registers a library reported under `libaries`
    pub fn with_library(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.libraries.push(LibraryInfo {
            name: name.into(),
            version: version.into(),
        });
        self
    }
}

impl HostContext for SystemContext {
    fn language(&self) -> Option<String> {
        self.language.clone()
    }

    fn user_agent(&self) -> Option<String> {
        Some(self.user_agent.clone())
    }

    fn libraries(&self) -> Vec<LibraryInfo> {
        self.libraries.clone()
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }
}

fn locale_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty())
        .and_then(|v| language_tag(&v))
}

/// `en_US.UTF-8` -> `en-US`. `C` and `POSIX` carry no language.
fn language_tag(locale: &str) -> Option<String> {
    let base = locale.split(|c: char| c == '.' || c == '@').next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

fn read_kernel_version() -> String {
    std::fs::read_to_string("/proc/version")
        .ok()
        .and_then(|v| v.split_whitespace().nth(2).map(String::from))
        .unwrap_or_default()
}
