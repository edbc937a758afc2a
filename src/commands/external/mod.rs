//! Commands that depend on outside collaborators, and those collaborators.
//!
//! The engine only sees the [`HttpClient`] and [`MarkdownRenderer`] traits;
//! the real implementations live here and tests swap in fakes. Calls are
//! blocking and any timeout policy belongs to the collaborator.

/// `http`: GET or POST, returning the response body.
pub mod http;
/// `markdown`: render to HTML, then reindent.
pub mod markdown;

use std::time::Duration;

use pulldown_cmark::{Options, Parser, html};

use crate::config::HttpConfig;
use crate::error::CollaboratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Case-insensitive `get` / `post`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Issues one request and returns the response body text.
pub trait HttpClient {
    /// GET sends `params` as the query string, POST as a form body.
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, CollaboratorError>;
}

/// Blocking `reqwest` client.
pub struct ReqwestClient {
    timeout: Duration,
    user_agent: String,
}

impl ReqwestClient {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl HttpClient for ReqwestClient {
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, CollaboratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        let request = match method {
            HttpMethod::Get => client.get(url).query(params),
            HttpMethod::Post => client.post(url).form(params),
        };
        log::debug!("http: {} {url} ({} params)", method.as_str(), params.len());
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            log::warn!("http: {} {url} returned {status}", method.as_str());
        }
        Ok(body)
    }
}

/// Turns Markdown into HTML.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, CollaboratorError>;
}

/// CommonMark via `pulldown-cmark`, with tables, strikethrough, task lists
/// and footnotes.
pub struct PulldownRenderer;

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> Result<String, CollaboratorError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES;
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markdown, options));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("delete"), None);
    }

    #[test]
    fn reqwest_failures_are_errors() {
        let client = ReqwestClient::from_config(&HttpConfig {
            timeout_secs: 2,
            ..HttpConfig::default()
        });
        let params = [("q".to_string(), "x".to_string())];
        assert!(client.request(HttpMethod::Get, "not a url", &params).is_err());
        assert!(client.request(HttpMethod::Post, "http://127.0.0.1:1/", &params).is_err());
    }

    #[test]
    fn pulldown_renders_html() {
        let html = PulldownRenderer.render("# Title\n\nsome *text*").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }
}
