use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server: &str, token: Option<String>) -> Self {
        Self {
            base: normalize_base(server),
            token: token.filter(|t| !t.trim().is_empty()),
            http: reqwest::Client::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // Each segment is percent-encoded, so ids may contain `/` or spaces.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base).with_context(|| format!("invalid server URL '{}'", self.base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL '{}' cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let builder = self.http.request(method, self.endpoint(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .request(Method::GET, segments)?
            .query(query)
            .send()
            .await
            .context("failed to reach server")?;
        read_json(resp).await
    }

    pub async fn send_json<B: Serialize + ?Sized>(&self, method: Method, segments: &[&str], body: &B) -> Result<Value> {
        let resp = self
            .request(method, segments)?
            .json(body)
            .send()
            .await
            .context("failed to reach server")?;
        read_json(resp).await
    }

    pub async fn post_empty(&self, segments: &[&str]) -> Result<Value> {
        let resp = self
            .request(Method::POST, segments)?
            .send()
            .await
            .context("failed to reach server")?;
        read_json(resp).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<()> {
        let resp = self
            .request(Method::DELETE, segments)?
            .send()
            .await
            .context("failed to reach server")?;
        check_status(resp).await.map(|_| ())
    }

    pub async fn check(&self, segments: &[&str]) -> Result<()> {
        let resp = self
            .request(Method::GET, segments)?
            .send()
            .await
            .context("connection failed")?;
        check_status(resp).await.map(|_| ())
    }
}

pub fn normalize_base(server: &str) -> String {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

async fn read_json(resp: Response) -> Result<Value> {
    let resp = check_status(resp).await?;
    resp.json().await.context("invalid JSON in server response")
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    bail!("{}", describe_error(status, &body))
}

pub fn describe_error(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        format!("server returned {status}")
    } else {
        format!("server returned {status}: {message}")
    }
}

pub fn parse_json_data(data: &str) -> Result<Value> {
    if std::path::Path::new(data).exists() {
        let content = std::fs::read_to_string(data).with_context(|| format!("reading {data}"))?;
        serde_json::from_str(&content).with_context(|| format!("parsing JSON from {data}"))
    } else {
        serde_json::from_str(data).context("parsing inline JSON")
    }
}

pub fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value[key].as_str().unwrap_or("-")
}

pub fn format_ms(value: &Value) -> String {
    match value.as_i64() {
        Some(ms) => crate::output::format_timestamp(ms),
        None => "-".into(),
    }
}
