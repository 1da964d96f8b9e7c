// Fetch boundary - requests for fragments and the capability that performs them
use crate::csrf;
use crate::error::FetchError;
use crate::fragment::Fragment;
use crate::target::NavigationTarget;
use reqwest::header::COOKIE;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One serialized form control, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    /// Element id to keep from the response.
    pub selector: Option<String>,
    pub form: Vec<FormField>,
}

impl FetchRequest {
    pub fn get(target: &NavigationTarget) -> Self {
        Self {
            method: Method::Get,
            url: target.url().to_string(),
            selector: target.selector().map(str::to_string),
            form: Vec::new(),
        }
    }

    pub fn post_form(action: impl Into<String>, form: Vec<FormField>) -> Self {
        Self {
            method: Method::Post,
            url: action.into(),
            selector: None,
            form,
        }
    }
}

/// Performs requests. Implementations return the raw body of a 2xx response
/// and map everything else to a `FetchError`.
pub trait Fetcher: Send {
    fn fetch(&self, request: &FetchRequest) -> Result<Fragment, FetchError>;
}

/// Fetch and post-process: narrow to the selector and reject blank GET bodies.
pub fn fetch_fragment(fetcher: &dyn Fetcher, request: &FetchRequest) -> Result<Fragment, FetchError> {
    let fragment = fetcher.fetch(request)?;
    let fragment = match &request.selector {
        Some(id) => fragment
            .select_id(id)
            .ok_or_else(|| FetchError::SelectorNotFound(id.clone()))?,
        None => fragment,
    };
    if request.method == Method::Get && fragment.is_blank() {
        return Err(FetchError::EmptyBody);
    }
    Ok(fragment)
}

/// Fetcher backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base: reqwest::Url,
    timeout: Duration,
    cookies: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base = reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);
        // Loopback servers are reached directly even when a proxy is configured.
        if base.host_str().is_some_and(is_loopback_host) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base,
            timeout,
            cookies: String::new(),
        })
    }

    /// Session cookies sent with every request. The CSRF token is read from here.
    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = cookies.into();
        self
    }
}

fn is_loopback_host(host: &str) -> bool {
    host == "localhost" || host.parse::<std::net::IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Fragment, FetchError> {
        let url = self
            .base
            .join(&request.url)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let token = if csrf::requires_token(request.method.as_str()) {
            csrf::token_from_cookies(&self.cookies)
        } else {
            None
        };

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => {
                let mut pairs: Vec<(&str, &str)> = request
                    .form
                    .iter()
                    .map(|field| (field.name.as_str(), field.value.as_str()))
                    .collect();
                if let Some(token) = token {
                    pairs.push((csrf::TOKEN_COOKIE, token));
                }
                self.client.post(url).form(&pairs)
            }
        };
        if !self.cookies.is_empty() {
            builder = builder.header(COOKIE, self.cookies.as_str());
        }
        if let Some(token) = token {
            builder = builder.header(csrf::TOKEN_HEADER, token);
        }

        tracing::debug!(method = request.method.as_str(), url = %request.url, "fetching");
        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                FetchError::TimedOut(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Fragment::new(body))
    }
}

/// Fetcher answering from a fixed table, recording every request it sees.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Result<String, FetchError>>,
    seen: Mutex<Vec<FetchRequest>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Fragment, FetchError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        match self.responses.get(&request.url) {
            Some(Ok(body)) => Ok(Fragment::new(body.clone())),
            Some(Err(error)) => Err(error.clone()),
            None => Err(FetchError::Status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one request on a local port and hand back its raw text.
    fn capture_one_request(body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let read = stream.read(&mut chunk).expect("read request");
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write response");
            String::from_utf8_lossy(&raw).to_string()
        });
        (base, handle)
    }

    fn header_value<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request
            .lines()
            .take_while(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':'))
            .find(|(header, _)| header.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    #[test]
    fn test_http_post_carries_csrf_token() {
        let (base, server) = capture_one_request("done");
        let fetcher = HttpFetcher::new(&base, Duration::from_secs(5))
            .unwrap()
            .with_cookies("user=alice; _xsrf=2|ab|cd");
        let request = FetchRequest::post_form("/files/mkdir", vec![FormField::new("name", "docs")]);
        let fragment = fetcher.fetch(&request).unwrap();
        assert_eq!(fragment.html(), "done");

        let raw = server.join().expect("server thread");
        assert!(raw.starts_with("POST /files/mkdir "));
        assert_eq!(header_value(&raw, csrf::TOKEN_HEADER), Some("2|ab|cd"));
        assert_eq!(header_value(&raw, "cookie"), Some("user=alice; _xsrf=2|ab|cd"));
        let (_, body) = raw.split_once("\r\n\r\n").expect("request body");
        assert_eq!(body, "name=docs&_xsrf=2%7Cab%7Ccd");
    }

    #[test]
    fn test_http_get_has_no_csrf_token() {
        let (base, server) = capture_one_request("<p>files</p>");
        let fetcher = HttpFetcher::new(&base, Duration::from_secs(5))
            .unwrap()
            .with_cookies("_xsrf=abc");
        let target = NavigationTarget::parse("/files").unwrap();
        let fragment = fetcher.fetch(&FetchRequest::get(&target)).unwrap();
        assert_eq!(fragment.html(), "<p>files</p>");

        let raw = server.join().expect("server thread");
        assert!(raw.starts_with("GET /files "));
        assert_eq!(header_value(&raw, csrf::TOKEN_HEADER), None);
        assert_eq!(header_value(&raw, "cookie"), Some("_xsrf=abc"));
        let (_, body) = raw.split_once("\r\n\r\n").expect("request end");
        assert!(body.is_empty());
    }

    #[test]
    fn test_get_request_from_target() {
        let target = NavigationTarget::parse("/ #bzs-index-main-sidebar").unwrap();
        let request = FetchRequest::get(&target);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "/");
        assert_eq!(request.selector.as_deref(), Some("bzs-index-main-sidebar"));
    }

    #[test]
    fn test_fetch_fragment_applies_selector() {
        let fetcher = StaticFetcher::new().with_page("/", r#"<div id="a">A</div><div id="b">B</div>"#);
        let target = NavigationTarget::parse("/ #b").unwrap();
        let fragment = fetch_fragment(&fetcher, &FetchRequest::get(&target)).unwrap();
        assert_eq!(fragment.html(), r#"<div id="b">B</div>"#);

        let missing = NavigationTarget::parse("/ #c").unwrap();
        assert_eq!(
            fetch_fragment(&fetcher, &FetchRequest::get(&missing)),
            Err(FetchError::SelectorNotFound("c".to_string()))
        );
    }

    #[test]
    fn test_blank_get_is_a_failure() {
        let fetcher = StaticFetcher::new().with_page("/empty", "  ");
        let target = NavigationTarget::parse("/empty").unwrap();
        assert_eq!(
            fetch_fragment(&fetcher, &FetchRequest::get(&target)),
            Err(FetchError::EmptyBody)
        );
    }

    #[test]
    fn test_blank_post_is_accepted() {
        let fetcher = StaticFetcher::new().with_page("/files/mkdir", "");
        let request = FetchRequest::post_form("/files/mkdir", vec![FormField::new("name", "docs")]);
        assert!(fetch_fragment(&fetcher, &request).is_ok());
        assert_eq!(fetcher.requests(), vec![request]);
    }

    #[test]
    fn test_unknown_url_is_404() {
        let fetcher = StaticFetcher::new();
        let target = NavigationTarget::parse("/missing").unwrap();
        assert_eq!(
            fetch_fragment(&fetcher, &FetchRequest::get(&target)),
            Err(FetchError::Status(404))
        );
    }

    #[test]
    fn test_http_fetcher_rejects_bad_base() {
        assert!(matches!(
            HttpFetcher::new("not a url", Duration::from_secs(1)),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
