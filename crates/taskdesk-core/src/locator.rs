use url::{Host, Url};

/// Decides whether a value may be used as a redirect destination.
pub trait LocatorValidator: Send + Sync {
    fn is_valid_locator(&self, value: &str) -> bool;
}

/// Strict website address check.
///
/// Accepts absolute `http`/`https` URLs without credentials or surrounding
/// whitespace whose host is an IP address or a dotted domain ending in an
/// alphabetic top-level label.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebsiteValidator;

impl LocatorValidator for WebsiteValidator {
    fn is_valid_locator(&self, value: &str) -> bool {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return false;
        }

        let Ok(url) = Url::parse(value) else {
            return false;
        };

        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        if !url.username().is_empty() || url.password().is_some() {
            return false;
        }

        match url.host() {
            Some(Host::Domain(domain)) => is_website_domain(domain),
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
            None => false,
        }
    }
}

fn is_website_domain(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let mut labels = domain.split('.');

    let Some(tld) = labels.next_back() else {
        return false;
    };
    if labels.clone().next().is_none() {
        return false;
    }
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    labels.all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
