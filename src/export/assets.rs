//! Remote asset discovery, public-address checks and loading for the off-screen document.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;

use crate::render::STYLE_SCRIPT_URL;

/// Confirms an image referenced by the document can actually be loaded.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<(), String>;

    /// Decide whether the server may fetch `url` at all.
    ///
    /// The default only looks at the URL itself; loaders that touch the
    /// network also check where the host resolves.
    async fn admit(&self, url: &str) -> Result<(), String> {
        public_host(url).map(|_| ())
    }
}

/// Whether an address belongs to the public internet.
///
/// Loopback, private, link-local, shared (CGNAT), unspecified, broadcast and
/// documentation ranges are all refused, including IPv4-mapped IPv6 forms.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public_v4(v4);
            }
            let first = v6.segments()[0];
            let unique_local = first & 0xfe00 == 0xfc00;
            let link_local = first & 0xffc0 == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    let shared = a == 100 && b & 0xc0 == 64;
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || shared)
}

/// Parse an http(s) URL and refuse hosts that name this machine or a
/// non-public address literally. Returns the host and port to resolve.
pub fn public_host(url: &str) -> Result<(String, u16), String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| format!("Invalid image URL {}: {}", url, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("Image URL must be http(s): {}", url));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("Image URL has no host: {}", url))?;
    let port = parsed.port_or_known_default().unwrap_or(80);

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    let local = match bare.parse::<IpAddr>() {
        Ok(ip) => !is_public_ip(ip),
        Err(_) => {
            let lower = bare.to_ascii_lowercase();
            lower == "localhost" || lower.ends_with(".localhost")
        }
    };
    if local {
        return Err(format!("Image host {} is not allowed", host));
    }
    Ok((bare.to_string(), port))
}

/// Loads assets over HTTP and checks they decode as images.
pub struct HttpAssetLoader {
    client: reqwest::Client,
}

impl HttpAssetLoader {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        // Redirects may not hop to a literal private address.
        let redirects = reqwest::redirect::Policy::custom(|attempt| {
            if attempt.previous().len() >= 5 {
                attempt.error("too many redirects")
            } else if public_host(attempt.url().as_str()).is_err() {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });
        let client = reqwest::Client::builder()
            .user_agent(concat!("placard/", env!("CARGO_PKG_VERSION")))
            .redirect(redirects)
            .timeout(timeout)
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn admit(&self, url: &str) -> Result<(), String> {
        let (host, port) = public_host(url)?;
        let addrs: Vec<_> = tokio::net::lookup_host((host.as_str(), port))
            .await
            .map_err(|e| format!("Failed to resolve {}: {}", host, e))?
            .collect();
        if addrs.is_empty() {
            return Err(format!("{} did not resolve", host));
        }
        if let Some(addr) = addrs.iter().find(|a| !is_public_ip(a.ip())) {
            return Err(format!("Image host {} resolves to non-public {}", host, addr.ip()));
        }
        Ok(())
    }

    async fn load(&self, url: &str) -> Result<(), String> {
        self.admit(url).await?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Failed to download {}: {}", url, e))?;
        if !response.status().is_success() {
            return Err(format!("Failed to download {}: HTTP {}", url, response.status()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read {}: {}", url, e))?;
        image::guess_format(&bytes)
            .map(|_| ())
            .map_err(|_| format!("{} is not an image", url))
    }
}

/// Openers after which an image URL may appear.
const URL_OPENERS: &[&str] = &["src=\"", "src='", "url('", "url(\"", "url("];

/// Every distinct `http(s)` image URL referenced through `src` or CSS `url()`.
///
/// Inline `data:` sources and the styling script are not assets.
pub fn remote_asset_urls(html: &str) -> Vec<String> {
    let mut urls = BTreeSet::new();

    for opener in URL_OPENERS {
        for (idx, _) in html.match_indices(opener) {
            let rest = &html[idx + opener.len()..];
            if !(rest.starts_with("https://") || rest.starts_with("http://")) {
                continue;
            }
            let end = rest
                .find(|c: char| matches!(c, '"' | '\'' | ')' | '>') || c.is_whitespace())
                .unwrap_or(rest.len());
            let url = &rest[..end];
            if url != STYLE_SCRIPT_URL {
                urls.insert(url.to_string());
            }
        }
    }

    urls.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyer::CanvasFormat;
    use crate::render::compose;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finds_img_and_css_urls() {
        let markup = r#"<div style="background-image: url('https://a.test/bg.jpg')"></div>
<img src="https://b.test/logo.png?w=10&h=2"><img src="data:image/png;base64,AAA">
<img src="https://b.test/logo.png?w=10&h=2">"#;
        let doc = compose(markup, CanvasFormat::Square.dimensions());
        assert_eq!(
            remote_asset_urls(&doc.html),
            vec!["https://a.test/bg.jpg", "https://b.test/logo.png?w=10&h=2"]
        );
    }

    #[test]
    fn test_public_ip_ranges() {
        for blocked in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.9",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:127.0.0.1",
        ] {
            assert!(!is_public_ip(blocked.parse().unwrap()), "{}", blocked);
        }
        for allowed in ["151.101.2.132", "2606:4700::1111"] {
            assert!(is_public_ip(allowed.parse().unwrap()), "{}", allowed);
        }
    }

    #[test]
    fn test_public_host_rejects_local_urls() {
        assert!(public_host("http://127.0.0.1:8080/admin").is_err());
        assert!(public_host("http://[::1]/x.png").is_err());
        assert!(public_host("http://169.254.169.254/latest/meta-data").is_err());
        assert!(public_host("http://LOCALHOST/x.png").is_err());
        assert!(public_host("ftp://images.test/x.png").is_err());
        assert_eq!(
            public_host("https://images.unsplash.com/photo-1?q=80").unwrap(),
            ("images.unsplash.com".to_string(), 443)
        );
    }

    #[tokio::test]
    async fn test_loader_never_contacts_private_hosts() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/internal/secret.png", listener.local_addr().unwrap());

        let loader = HttpAssetLoader::new(Duration::from_secs(2)).unwrap();
        let err = loader.load(&url).await.unwrap_err();
        assert!(err.contains("not allowed"), "{}", err);

        let contacted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(contacted.is_err(), "loader connected to {}", url);
    }

    #[test]
    fn test_ignores_unresolved_tokens() {
        let doc = compose(r#"<img src="[QR_CODE_IMAGE_URL]">"#, CanvasFormat::Square.dimensions());
        assert!(remote_asset_urls(&doc.html).is_empty());
    }
}
