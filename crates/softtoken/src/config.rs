//! Runtime configuration for the software token

/// Capabilities and limits of a [`SoftToken`](crate::SoftToken)
///
/// Built with the `with_*` methods or, with the `serde` feature, read from
/// any serde format. Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SoftTokenConfig {
    /// Label reported by `Token::name`
    pub label: String,
    /// Upper bound on sessions open at once
    pub max_sessions: usize,
    /// Offer PKCS#5 padding for ECB and CBC mechanisms
    pub native_padding: bool,
    /// Allow an operation to be abandoned with a discarded finalize
    pub can_cancel: bool,
}

impl Default for SoftTokenConfig {
    fn default() -> Self {
        Self {
            label: "soft-token".to_string(),
            max_sessions: 16,
            native_padding: false,
            can_cancel: true,
        }
    }
}

impl SoftTokenConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn with_native_padding(mut self, native_padding: bool) -> Self {
        self.native_padding = native_padding;
        self
    }

    pub fn with_can_cancel(mut self, can_cancel: bool) -> Self {
        self.can_cancel = can_cancel;
        self
    }
}
