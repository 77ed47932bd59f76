use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::SecondsFormat;
use padsim::prelude::*;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::cli::STDOUT;

/// APM system metrics shape of a document.
pub fn apm_document(document: &MetricDocument) -> Value {
    json!({
        "@timestamp": document
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        "host": {
            "name": document.entity,
        },
        "system": {
            "cpu": {
                "total": {
                    "norm": {
                        "pct": document.value,
                    },
                },
            },
        },
    })
}

/// Writes documents as Elasticsearch bulk NDJSON: an index action line
/// followed by the document line. Output is flushed after every document so
/// a `_bulk` tail or `tail -f` sees it right away.
pub struct BulkSink<W: Write + Send> {
    action: String,
    writer: W,
    sample: Option<Value>,
}

impl<W: Write + Send> BulkSink<W> {
    pub fn new(index: &str, writer: W) -> Self {
        Self {
            action: json!({ "index": { "_index": index } }).to_string(),
            writer,
            sample: None,
        }
    }

    /// First document written, for display.
    pub fn sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl BulkSink<Box<dyn Write + Send>> {
    /// `-` opens stdout; anything else is a file opened for appending.
    pub fn open(destination: &str, index: &str) -> io::Result<Self> {
        let writer: Box<dyn Write + Send> = if destination == STDOUT {
            Box::new(io::stdout())
        } else {
            Box::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(Path::new(destination))?,
            )
        };
        Ok(Self::new(index, writer))
    }
}

impl<W: Write + Send> DocumentSink for BulkSink<W> {
    fn write(&mut self, document: &MetricDocument) -> Result<(), Box<dyn Error>> {
        let body = apm_document(document);
        writeln!(self.writer, "{}", self.action)?;
        writeln!(self.writer, "{}", body)?;
        self.writer.flush()?;

        if self.sample.is_none() {
            self.sample = Some(body);
        }

        Ok(())
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Indexes each document into an Elasticsearch cluster with
/// `POST {url}/{index}/_doc`. Credentials in the URL are sent as basic auth.
/// Anything other than `201 Created` is an error.
pub struct HttpSink {
    client: Client,
    endpoint: Url,
    credentials: Option<(String, Option<String>)>,
    sample: Option<Value>,
}

impl HttpSink {
    pub fn new(cluster: &str, index: &str) -> Result<Self, Box<dyn Error>> {
        let mut endpoint = Url::parse(cluster)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!("Not an http(s) cluster URL: {}", cluster).into());
        }

        let credentials = (!endpoint.username().is_empty()).then(|| {
            (
                endpoint.username().to_string(),
                endpoint.password().map(str::to_string),
            )
        });
        let _ = endpoint.set_username("");
        let _ = endpoint.set_password(None);

        endpoint
            .path_segments_mut()
            .map_err(|_| format!("Unusable cluster URL: {}", cluster))?
            .pop_if_empty()
            .push(index)
            .push("_doc");

        // Local clusters commonly run with self-signed certificates.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            credentials,
            sample: None,
        })
    }

    /// Target URL without credentials.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn sample(&self) -> Option<&Value> {
        self.sample.as_ref()
    }
}

impl DocumentSink for HttpSink {
    fn write(&mut self, document: &MetricDocument) -> Result<(), Box<dyn Error>> {
        let body = apm_document(document);
        trace!("POST {}: {}", self.endpoint, body);

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send()?;
        let status = response.status();
        if status != StatusCode::CREATED {
            let reason = response.text().unwrap_or_default();
            return Err(format!(
                "Unexpected status {} indexing document: {}",
                status, reason
            )
            .into());
        }

        if self.sample.is_none() {
            self.sample = Some(body);
        }

        Ok(())
    }
}

/// Sink picked from the command line destination.
pub enum OutputSink {
    Bulk(BulkSink<Box<dyn Write + Send>>),
    Http(HttpSink),
}

impl OutputSink {
    /// `http(s)://` URLs index into a cluster; anything else is bulk NDJSON
    /// to stdout (`-`) or a file.
    pub fn open(destination: &str, index: &str) -> Result<Self, Box<dyn Error>> {
        if is_cluster_url(destination) {
            Ok(Self::Http(HttpSink::new(destination, index)?))
        } else {
            Ok(Self::Bulk(BulkSink::open(destination, index)?))
        }
    }

    pub fn sample(&self) -> Option<&Value> {
        match self {
            Self::Bulk(sink) => sink.sample(),
            Self::Http(sink) => sink.sample(),
        }
    }

    /// Where documents go, safe to log.
    pub fn target(&self, destination: &str) -> String {
        match self {
            Self::Bulk(_) if destination == STDOUT => "stdout".to_string(),
            Self::Bulk(_) => destination.to_string(),
            Self::Http(sink) => sink.endpoint().to_string(),
        }
    }
}

impl DocumentSink for OutputSink {
    fn write(&mut self, document: &MetricDocument) -> Result<(), Box<dyn Error>> {
        match self {
            Self::Bulk(sink) => sink.write(document),
            Self::Http(sink) => sink.write(document),
        }
    }
}

fn is_cluster_url(destination: &str) -> bool {
    let lower = destination.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
