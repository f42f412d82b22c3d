//! Client-side URL interception.
//!
//! Calls aimed at a legacy host are redirected to the gateway base selected
//! for the current page: the emulator when the page is served from a
//! loopback host, the deployed functions host otherwise. Path and query are
//! carried over verbatim. Callers opt in by sending requests through
//! [`InterceptingClient`]; nothing is patched globally.

mod client;

pub use client::{InterceptingClient, SocketStream};

use url::Url;

use crate::config::InterceptorConfig;

/// Page hostnames that select the emulator base
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

pub fn is_loopback_page(page: &Url) -> bool {
    page.host_str()
        .map(|host| LOOPBACK_HOSTS.contains(&host))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct UrlRewriter {
    legacy_hosts: Vec<String>,
    base: String,
    page_origin: Option<Url>,
}

impl UrlRewriter {
    /// `page` is the URL of the document the calls originate from. It is used
    /// to pick the base and to resolve relative URLs.
    pub fn new(config: &InterceptorConfig, page: &Url) -> Self {
        let base = if is_loopback_page(page) {
            &config.emulator_base
        } else {
            &config.production_base
        };

        // Opaque origins (file:, data:) cannot anchor relative URLs
        let origin = page.origin();
        let page_origin = if origin.is_tuple() {
            Url::parse(&origin.ascii_serialization()).ok()
        } else {
            None
        };

        Self {
            legacy_hosts: config.legacy_hosts.clone(),
            base: base.trim_end_matches('/').to_string(),
            page_origin,
        }
    }

    /// Base URL requests are redirected to, without trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Substring match, so preview subdomains are covered as well
    pub fn is_legacy_host(&self, host: &str) -> bool {
        self.legacy_hosts.iter().any(|legacy| host.contains(legacy.as_str()))
    }

    fn resolve(&self, input: &str) -> Result<Url, url::ParseError> {
        Url::options().base_url(self.page_origin.as_ref()).parse(input)
    }

    /// `Some(base + path + query)` when `url` targets a legacy host
    fn redirect(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        if !self.is_legacy_host(host) {
            return None;
        }

        let mut target = format!("{}{}", self.base, url.path());
        if let Some(query) = url.query().filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }

    /// Rewrite a URL string. Anything that does not parse or does not target
    /// a legacy host is returned unchanged.
    pub fn rewrite(&self, input: &str) -> String {
        match self.resolve(input) {
            Ok(url) => match self.redirect(&url) {
                Some(target) => {
                    log::debug!("[interceptor] {} -> {}", input, target);
                    target
                }
                None => input.to_string(),
            },
            Err(_) => input.to_string(),
        }
    }

    /// Structured form of [`rewrite`](Self::rewrite): `None` means "leave the
    /// request alone".
    pub fn rewrite_url(&self, url: &Url) -> Option<Url> {
        let target = self.redirect(url)?;
        match Url::parse(&target) {
            Ok(rewritten) => {
                log::debug!("[interceptor] {} -> {}", url, rewritten);
                Some(rewritten)
            }
            Err(e) => {
                log::warn!("[interceptor] base {} produced an invalid URL: {}", self.base, e);
                None
            }
        }
    }
}
