//! Request interceptors, applied to every template before the target is applied.

use std::fmt;

use rustfeign_model::{HttpMethod, RequestTemplate};
use tracing::Level;

use crate::config::FeignConfig;

/// A hook that may modify a fully bound template.
pub trait RequestInterceptor: Send + Sync + fmt::Debug {
    /// Modify `template` in place.
    fn apply(&self, template: &mut RequestTemplate);
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// Logs each outgoing request, at info level unless configured otherwise.
///
/// Bodies of `POST`, `PUT`, and `PATCH` requests are included.
#[derive(Debug, Clone, Copy)]
pub struct LoggingInterceptor {
    level: Level,
}

impl LoggingInterceptor {
    /// An interceptor logging at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// An interceptor logging at the configured `log_level`.
    #[must_use]
    pub fn from_config(config: &FeignConfig) -> Self {
        Self::new(config.request_log_level())
    }

    /// The level requests are logged at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl RequestInterceptor for LoggingInterceptor {
    fn apply(&self, template: &mut RequestTemplate) {
        let method = template.method().map_or("?", |m| m.as_str());
        let url = template.url();
        match template.method() {
            Some(HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch) => {
                let body = template
                    .body()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default();
                log_at!(self.level, method, url = %url, body = %body, "outgoing request");
            }
            _ => log_at!(self.level, method, url = %url, "outgoing request"),
        }
    }
}

/// Adds fixed headers unless the template already carries them.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeadersInterceptor {
    headers: Vec<(String, String)>,
}

impl DefaultHeadersInterceptor {
    /// An interceptor adding `headers`.
    #[must_use]
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }
}

impl RequestInterceptor for DefaultHeadersInterceptor {
    fn apply(&self, template: &mut RequestTemplate) {
        for (name, value) in &self.headers {
            if !template.headers().contains(name) {
                template.header(name, [value.as_str()]);
            }
        }
    }
}

/// Interceptor backed by a closure.
pub struct FnInterceptor<F>(pub F);

impl<F> fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnInterceptor(..)")
    }
}

impl<F> RequestInterceptor for FnInterceptor<F>
where
    F: Fn(&mut RequestTemplate) + Send + Sync,
{
    fn apply(&self, template: &mut RequestTemplate) {
        (self.0)(template);
    }
}
