use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::OverpassConfig;
use crate::domain::BBox;

const USER_AGENT: &str = "osm-boundaries/0.1.0";

/// Longest error body kept in an `OverpassError::Status` message
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Overpass API returned error status: {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Set by Overpass when the query failed server-side (e.g. runtime timeout)
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).context("Failed to parse Overpass JSON response")
    }
}

/// A single element from Overpass (node, way or relation)
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Inline geometry, present with `out geom` on ways
    #[serde(default)]
    pub geometry: Option<Vec<GeomPoint>>,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }
}

/// Relation membership record
#[derive(Debug, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct GeomPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Build the Overpass QL query for administrative boundary relations
///
/// `out geom` asks Overpass to inline coordinates so no node lookup is needed.
pub fn build_boundary_query(bbox: &BBox, admin_level: u8, timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout_secs}][bbox:{bbox}];
(
  relation["boundary"="administrative"]["admin_level"="{admin_level}"];
);
out geom;
"#
    )
}

/// POST a query to Overpass and return the raw response body
///
/// The query is sent as the request body. There is no retry: a failed
/// request or a non-success status is returned as an error.
pub fn fetch_overpass(query: &str, config: &OverpassConfig) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.client_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .post(&config.url)
        .body(query.to_string())
        .send()
        .with_context(|| format!("Failed to send request to {}", config.url))?;

    let status = response.status();
    if !status.is_success() {
        let body = truncate_body(&response.text().unwrap_or_default());
        return Err(OverpassError::Status { status, body }.into());
    }

    let bytes = response
        .bytes()
        .context("Failed to read Overpass response body")?;

    Ok(bytes.to_vec())
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    /// Read one HTTP request and return its body
    fn read_request_body(stream: &mut TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        String::from_utf8(body).unwrap()
    }

    /// Answer a single request on localhost, sending the received body back on the channel
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (OverpassConfig, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request_body = read_request_body(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(request_body);
        });

        let config = OverpassConfig {
            url: format!("http://{addr}/api/interpreter"),
            timeout_secs: 5,
        };
        (config, rx)
    }

    #[test]
    fn test_default_query() {
        let query = build_boundary_query(&BBox::DEFAULT, 8, 60);

        assert!(query.starts_with("[out:json][timeout:60][bbox:0.7,104.3,1.1,104.6];"));
        assert!(query.contains(r#"relation["boundary"="administrative"]["admin_level"="8"];"#));
        assert!(query.trim_end().ends_with("out geom;"));
    }

    #[test]
    fn test_query_uses_admin_level() {
        let bbox = BBox::new(-6.4, 106.6, -6.1, 107.0).unwrap();
        let query = build_boundary_query(&bbox, 7, 120);

        assert!(query.contains("[timeout:120][bbox:-6.4,106.6,-6.1,107]"));
        assert!(query.contains(r#"["admin_level"="7"]"#));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {
                    "type": "relation",
                    "id": 5,
                    "members": [
                        {"type": "way", "ref": 10, "role": "outer", "geometry": [{"lat": 0.9, "lon": 104.4}]}
                    ],
                    "tags": {"boundary": "administrative", "name": "Kampung Bugis"}
                },
                {"type": "way", "id": 10, "geometry": [{"lat": 0.9, "lon": 104.4}]}
            ]
        }"#;

        let response = OverpassResponse::from_slice(json.as_bytes()).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(response.elements[0].type_, "relation");
        assert_eq!(response.elements[0].tag("name"), Some("Kampung Bugis"));
        assert_eq!(response.elements[0].members[0].role, "outer");
        assert!(response.elements[0].geometry.is_none());
        assert_eq!(
            response.elements[1].geometry.as_deref(),
            Some(&[GeomPoint { lat: 0.9, lon: 104.4 }][..])
        );
        assert!(response.remark.is_none());
    }

    #[test]
    fn test_parse_response_without_elements() {
        let json = r#"{"remark": "runtime error: Query timed out in \"query\" at line 3"}"#;
        let response = OverpassResponse::from_slice(json.as_bytes()).unwrap();

        assert!(response.elements.is_empty());
        assert!(response.remark.unwrap().starts_with("runtime error"));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(OverpassResponse::from_slice(b"<osm version=\"0.6\">").is_err());
    }

    #[test]
    fn test_fetch_returns_body_unchanged() {
        let payload = r#"{"elements": [{"type": "relation", "id": 1}]}"#;
        let (config, rx) = serve_once("200 OK", payload);
        let query = build_boundary_query(&BBox::DEFAULT, 8, 60);

        let raw = fetch_overpass(&query, &config).unwrap();
        assert_eq!(raw, payload.as_bytes());
        assert_eq!(rx.recv().unwrap(), query);
    }

    #[test]
    fn test_fetch_error_status_keeps_body() {
        let (config, _rx) = serve_once(
            "400 Bad Request",
            "Error: line 1: parse error: unknown admin level",
        );

        let err = fetch_overpass("[out:json];", &config).unwrap_err();
        match err.downcast_ref::<OverpassError>() {
            Some(OverpassError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "Error: line 1: parse error: unknown admin level");
            }
            None => panic!("expected a status error, got {err:?}"),
        }
        assert!(err.to_string().contains("parse error: unknown admin level"));
    }

    #[test]
    fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = OverpassConfig {
            url: format!("http://{addr}/api/interpreter"),
            timeout_secs: 5,
        };
        assert!(fetch_overpass("[out:json];", &config).is_err());
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  runtime error\n"), "runtime error");

        let long = "é".repeat(MAX_ERROR_BODY_CHARS + 20);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }
}
