//! The SigBox HTTP client and its request plumbing.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{SealPlacement, SignedDocument, Template, TemplateListResponse};

/// Round-trip bound applied by [`SigBoxClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header the server expects the API key in, on every single request.
const API_KEY_HEADER: &str = "x-api-key";

/// Fixed signing metadata sent with every document upload.
const DOCUMENT_LOCATION: &str = "Austria";
const DOCUMENT_REASON: &str = "";

/// Blocking client for a remote SigBox signing service.
///
/// Each method is one authenticated HTTP round-trip; the client holds no
/// state beyond its credentials, so a single instance can drive any number
/// of templates and signature batches. Cloning is cheap and clones share
/// the underlying connection pool.
///
/// See the crate docs for the end-to-end signing workflow.
#[derive(Clone)]
pub struct SigBoxClient {
    http: Client,
    server_url: String,
}

impl SigBoxClient {
    /// Creates a client for the SigBox instance at `server_url`,
    /// authenticating every request with `api_key`.
    ///
    /// Fails with [`Error::Configuration`] when the key is empty or not a
    /// legal header value, or when the URL is not an absolute `http`/`https`
    /// address.
    pub fn new(api_key: &str, server_url: &str) -> Result<Self> {
        Self::with_timeout(api_key, server_url, DEFAULT_TIMEOUT)
    }

    /// Same as [`SigBoxClient::new`] with an explicit per-request timeout.
    pub fn with_timeout(api_key: &str, server_url: &str, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Configuration("API key must not be empty".into()));
        }
        let key = HeaderValue::from_str(api_key).map_err(|_| {
            Error::Configuration("API key contains characters not allowed in a header".into())
        })?;

        let url = Url::parse(server_url).map_err(|e| {
            Error::Configuration(format!("server URL {server_url:?} is not a valid URL: {e}"))
        })?;
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::Configuration(format!(
                "server URL must use http or https, got {scheme:?}"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            server_url: server_url.to_string(),
        })
    }

    /// Lists the seal templates registered on the server.
    pub fn list_templates(&self) -> Result<Vec<Template>> {
        let listing: TemplateListResponse = self.get_json("/templates")?;
        Ok(listing.template_list)
    }

    /// Fetches one template's content verbatim.
    pub fn get_template(&self, template_id: u64) -> Result<Vec<u8>> {
        self.get_raw(&format!("/templates/{template_id}"))
    }

    /// Uploads a new seal template and returns the id the server assigned
    /// to it.
    pub fn add_template(&self, path: impl AsRef<Path>) -> Result<u64> {
        let response = self.post("/templates", Some(template_form(path.as_ref())?))?;
        let location = location_header(&response)?;
        last_segment(&location).parse().map_err(|_| {
            Error::ResponseFormat(format!(
                "Location {location:?} does not end in a template id"
            ))
        })
    }

    /// Replaces the content of an existing template.
    pub fn replace_template(&self, path: impl AsRef<Path>, template_id: u64) -> Result<()> {
        let form = template_form(path.as_ref())?;
        self.put(&format!("/templates/{template_id}"), Some(form))?;
        Ok(())
    }

    /// Removes a template from the server.
    pub fn delete_template(&self, template_id: u64) -> Result<()> {
        self.delete(&format!("/templates/{template_id}"))?;
        Ok(())
    }

    /// Opens a new signature batch and returns its ticket id.
    ///
    /// The server redirects the signer to `success_url` or `error_url`
    /// once the batch is signed or aborted.
    pub fn start_signature(&self, success_url: &str, error_url: &str) -> Result<String> {
        let form = Form::new()
            .text("RedirectUrl", success_url.to_string())
            .text("ErrorUrl", error_url.to_string());
        let response = self.post("/signaturebatches", Some(form))?;
        Ok(last_segment(&location_header(&response)?))
    }

    /// Uploads a document into an open batch and returns the document id
    /// the server assigned within that batch.
    pub fn add_document(&self, ticket_id: &str, path: impl AsRef<Path>) -> Result<String> {
        let form = document_form(path.as_ref())?;
        let response = self.post(&format!("/signaturebatches/{ticket_id}/documents"), Some(form))?;
        Ok(last_segment(&location_header(&response)?))
    }

    /// Uploads a document whose seal is rendered from a stored template.
    ///
    /// Unlike [`SigBoxClient::add_document`] this returns the document's
    /// full `Location` address, not just the trailing id; the server
    /// answers the two upload variants differently and both shapes are
    /// surfaced as-is.
    pub fn add_document_with_template(
        &self,
        ticket_id: &str,
        path: impl AsRef<Path>,
        template_id: u64,
    ) -> Result<String> {
        let form = document_form(path.as_ref())?.text("template", template_id.to_string());
        let response = self.post(&format!("/signaturebatches/{ticket_id}/documents"), Some(form))?;
        location_header(&response)
    }

    /// Like [`SigBoxClient::add_document_with_template`], additionally
    /// pinning the seal to an explicit page position.
    ///
    /// Returns the document's full `Location` address.
    pub fn add_document_with_template_at(
        &self,
        ticket_id: &str,
        path: impl AsRef<Path>,
        template_id: u64,
        placement: SealPlacement,
    ) -> Result<String> {
        let form = document_form(path.as_ref())?
            .text("template", template_id.to_string())
            .text("page", placement.page.to_string())
            .text("x", placement.x.to_string())
            .text("y", placement.y.to_string())
            .text("w", placement.width.to_string())
            .text("h", placement.height.to_string());
        let response = self.post(&format!("/signaturebatches/{ticket_id}/documents"), Some(form))?;
        location_header(&response)
    }

    /// Closes the batch and returns the URL where the signer performs the
    /// actual signature.
    pub fn finalize(&self, ticket_id: &str) -> Result<String> {
        let response = self.post(&format!("/signaturebatches/{ticket_id}/mobilesignature"), None)?;
        location_header(&response)
    }

    /// Like [`SigBoxClient::finalize`], passing an operator-specific
    /// mobile signature parameter along to the signing provider.
    pub fn finalize_with_parameter(&self, ticket_id: &str, parameter: &str) -> Result<String> {
        let form = Form::new().text("handySigParameter", parameter.to_string());
        let response = self.post(
            &format!("/signaturebatches/{ticket_id}/mobilesignature"),
            Some(form),
        )?;
        location_header(&response)
    }

    /// Retrieves a signed document and removes it from the server.
    ///
    /// The fetch itself is the deletion: the first call returns the signed
    /// file, any repeat is answered by the server as it sees fit (usually
    /// with an error). Callers must persist [`SignedDocument::content`]
    /// before dropping it.
    pub fn take_document(&self, ticket_id: &str, document_id: &str) -> Result<SignedDocument> {
        let response =
            self.delete(&format!("/signaturebatches/{ticket_id}/documents/{document_id}"))?;
        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name);
        let content = response.bytes()?.to_vec();
        Ok(SignedDocument { content, file_name })
    }

    /// GET returning a JSON-decoded body.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.dispatch(Method::GET, path, None)?;
        let url = response.url().clone();
        let body = response.bytes()?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::ResponseFormat(format!("undecodable JSON from {url}: {e}")))
    }

    /// GET returning the body bytes untouched.
    fn get_raw(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.dispatch(Method::GET, path, None)?.bytes()?.to_vec())
    }

    fn post(&self, path: &str, form: Option<Form>) -> Result<Response> {
        self.dispatch(Method::POST, path, form)
    }

    fn put(&self, path: &str, form: Option<Form>) -> Result<Response> {
        self.dispatch(Method::PUT, path, form)
    }

    fn delete(&self, path: &str) -> Result<Response> {
        self.dispatch(Method::DELETE, path, None)
    }

    /// Sends one request and turns every non-2xx answer into
    /// [`Error::RemoteRequest`].
    fn dispatch(&self, method: Method, path: &str, form: Option<Form>) -> Result<Response> {
        let url = self.endpoint(path);
        let mut request = self.http.request(method.clone(), url.as_str());
        if let Some(form) = form {
            request = request.multipart(form);
        }
        let response = request.send()?;
        let status = response.status();
        debug!(method = %method, url = %url, status = status.as_u16(), "sigbox answered");

        if !status.is_success() {
            return Err(Error::RemoteRequest {
                method: method.to_string(),
                url,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn endpoint(&self, path: &str) -> String {
        combine_url(&self.server_url, path)
    }
}

// The API key lives in the HTTP client's default headers; keep it out of
// debug output.
impl fmt::Debug for SigBoxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigBoxClient")
            .field("server_url", &self.server_url)
            .finish_non_exhaustive()
    }
}

/// Joins a base URL and an endpoint path with exactly one `/` between
/// them, whatever slash habits either side arrives with.
fn combine_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (true, false) | (false, true) => format!("{base}{path}"),
        (false, false) => format!("{base}/{path}"),
    }
}

/// Reads the `Location` header off a creation response.
fn location_header(response: &Response) -> Result<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::ResponseFormat(format!("no Location header from {}", response.url()))
        })
}

/// Trailing path segment of a `Location` value; the server encodes fresh
/// resource ids as the last segment of the resource address. Values
/// without any slash are already the segment.
fn last_segment(location: &str) -> String {
    location
        .rsplit_once('/')
        .map_or(location, |(_, tail)| tail)
        .to_string()
}

/// Pulls the `filename=` parameter out of a `Content-Disposition` value.
fn disposition_file_name(value: &str) -> Option<String> {
    let (_, tail) = value.split_once("filename=")?;
    let name = tail.split(';').next()?.trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

/// Multipart body for template upload and replacement. Templates are
/// textual seal definitions, so the file is read as UTF-8.
fn template_form(path: &Path) -> Result<Form> {
    let content = fs::read_to_string(path)?;
    let part = Part::text(content).file_name(file_name_of(path));
    Ok(Form::new().part("template", part))
}

/// Multipart body for document upload: fixed signing metadata plus the
/// file itself. Template and placement fields are appended by callers.
fn document_form(path: &Path) -> Result<Form> {
    Ok(Form::new()
        .text("location", DOCUMENT_LOCATION)
        .text("reason", DOCUMENT_REASON)
        .part("document", file_part(path)?))
}

fn file_part(path: &Path) -> Result<Part> {
    let bytes = fs::read(path)?;
    Ok(Part::bytes(bytes).file_name(file_name_of(path)))
}

/// Final path component, as the upload filename the server will see.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
