use url::Url;

/// One line of a workout feed: `title | detail`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub detail: Option<String>,
}

/// Result of fetching a feed
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub url: String,
    pub status: u16,
    pub entries: Vec<FeedEntry>,
}

/// Error during fetch
#[derive(Debug, Clone)]
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Add a scheme when missing and validate the URL.
pub fn normalize_url(url_str: &str) -> Result<Url, FetchError> {
    let url = if !url_str.starts_with("http://") && !url_str.starts_with("https://") {
        format!("https://{}", url_str.trim())
    } else {
        url_str.trim().to_string()
    };

    Url::parse(&url).map_err(|e| FetchError {
        message: format!("Invalid URL: {}", e),
    })
}

/// Parse a plain-text feed. Blank lines and `#` comments are skipped.
pub fn parse_feed(body: &str) -> Vec<FeedEntry> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('|') {
            Some((title, detail)) => FeedEntry {
                title: title.trim().to_string(),
                detail: Some(detail.trim().to_string()).filter(|d| !d.is_empty()),
            },
            None => FeedEntry {
                title: line.to_string(),
                detail: None,
            },
        })
        .collect()
}

/// Fetch a workout feed (blocking). Non-2xx responses are errors.
pub fn fetch_feed(url_str: &str) -> Result<FeedSnapshot, FetchError> {
    let parsed = normalize_url(url_str)?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pull-refresh/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError {
            message: format!("Client error: {}", e),
        })?;

    let response = client
        .get(parsed.as_str())
        .header("Accept", "text/plain,*/*;q=0.8")
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError {
            message: format!("HTTP {} from {}", status.as_u16(), parsed),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })?;

    log::debug!("fetched feed {} ({} bytes)", final_url, body.len());

    Ok(FeedSnapshot {
        url: final_url,
        status: status.as_u16(),
        entries: parse_feed(&body),
    })
}
