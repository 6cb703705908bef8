use reqwest::StatusCode;
use reqwest::blocking;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::DirectoryError;
use crate::model::{CodeEntry, RemoteCodeList};

/// Result alias for remote directory operations.
pub type ClientResult<T> = std::result::Result<T, DirectoryError>;

/// Substring the service embeds in the response body when a bulk update
/// targets a list that no longer exists. Matching it is what triggers the
/// create fallback.
const NOT_FOUND_MARKER: &str = "Codelist not found";

/// Abstract remote operations the reconciliation engine depends on. All
/// calls are synchronous and never retried.
pub trait DirectoryClient {
    /// Probes service reachability. Failure is a fatal precondition for a
    /// run; nothing remote is touched after a failed ping.
    fn ping(&self) -> ClientResult<()>;

    /// Fetches the full current state of the named list, entries included.
    fn fetch_snapshot(&self, name: &str) -> ClientResult<RemoteCodeList>;

    /// Resolves a list name to its stable identifier without transferring
    /// the entry set.
    fn lookup_id(&self, name: &str) -> ClientResult<String>;

    /// Deletes a list, keyed solely by its identifier.
    fn delete_by_id(&self, id: &str) -> ClientResult<()>;

    /// Replaces the complete entry set of an existing list.
    fn bulk_replace_entries(&self, id: &str, entries: &[CodeEntry]) -> ClientResult<()>;

    /// Creates a new list holding the given entries.
    fn create_list(&self, name: &str, entries: &[CodeEntry]) -> ClientResult<()>;
}

/// One code entry in the service's wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireCode {
    sender_code: String,
    receiver_code: String,
    description: String,
    text1: String,
    text2: String,
    text3: String,
    text4: String,
    text5: String,
    text6: String,
    text7: String,
    text8: String,
    text9: String,
}

impl From<&CodeEntry> for WireCode {
    fn from(entry: &CodeEntry) -> Self {
        let text = &entry.text;
        Self {
            sender_code: entry.sender_code.clone(),
            receiver_code: entry.receiver_code.clone(),
            description: entry.description.clone(),
            text1: text[0].clone(),
            text2: text[1].clone(),
            text3: text[2].clone(),
            text4: text[3].clone(),
            text5: text[4].clone(),
            text6: text[5].clone(),
            text7: text[6].clone(),
            text8: text[7].clone(),
            text9: text[8].clone(),
        }
    }
}

impl WireCode {
    /// Remote entries are always live; the spreadsheet-only active flag is
    /// re-stamped on the way in.
    fn into_entry(self) -> CodeEntry {
        CodeEntry {
            active: true,
            sender_code: self.sender_code,
            receiver_code: self.receiver_code,
            description: self.description,
            text: [
                self.text1, self.text2, self.text3, self.text4, self.text5, self.text6,
                self.text7, self.text8, self.text9,
            ],
        }
    }
}

/// A code list summary or full record as returned by the lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct WireCodeList {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "codeListName")]
    code_list_name: String,
    #[serde(rename = "versionNumber")]
    version_number: f64,
    #[serde(rename = "createDate")]
    create_date: String,
    #[serde(rename = "userName")]
    user_name: String,
    #[serde(rename = "listStatus")]
    list_status: f64,
    codes: Vec<WireCode>,
}

impl WireCodeList {
    fn into_remote(self, requested_name: &str) -> RemoteCodeList {
        let name = if self.code_list_name.is_empty() {
            requested_name.to_string()
        } else {
            self.code_list_name
        };
        RemoteCodeList {
            id: self.id,
            name,
            version_number: self.version_number as i64,
            create_date: self.create_date,
            owner: self.user_name,
            status: self.list_status as i64,
            entries: self.codes.into_iter().map(WireCode::into_entry).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BulkReplaceRequest {
    codes: Vec<WireCode>,
    #[serde(rename = "listStatus")]
    list_status: i64,
}

#[derive(Debug, Serialize)]
struct CreateRequest {
    #[serde(rename = "codeListName")]
    code_list_name: String,
    codes: Vec<WireCode>,
}

fn bulk_replace_request(entries: &[CodeEntry]) -> BulkReplaceRequest {
    BulkReplaceRequest {
        codes: entries.iter().map(WireCode::from).collect(),
        list_status: 1,
    }
}

fn create_request(name: &str, entries: &[CodeEntry]) -> CreateRequest {
    CreateRequest {
        code_list_name: name.to_string(),
        codes: entries.iter().map(WireCode::from).collect(),
    }
}

fn protocol(status: StatusCode, body: String) -> DirectoryError {
    DirectoryError::Protocol {
        status: status.as_u16(),
        body,
    }
}

/// Maps a failed bulk update response onto the error taxonomy. The service
/// reports a vanished target list in the body text, not the status code.
fn classify_replace_failure(status: StatusCode, body: String) -> DirectoryError {
    if body.contains(NOT_FOUND_MARKER) {
        DirectoryError::NotFound
    } else {
        protocol(status, body)
    }
}

fn classify_create_failure(status: StatusCode, body: String) -> DirectoryError {
    if status == StatusCode::CONFLICT {
        DirectoryError::AlreadyExists
    } else {
        protocol(status, body)
    }
}

/// [`DirectoryClient`] implementation speaking the Sterling B2B Integrator
/// code list REST API over HTTPS with basic authentication.
pub struct HttpDirectoryClient {
    http: blocking::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpDirectoryClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = blocking::Client::builder()
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/B2BAPIs/svc/codelists/", self.base_url)
    }

    fn send(&self, request: blocking::RequestBuilder) -> ClientResult<(StatusCode, String)> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()?;
        let status = response.status();
        let body = response.text()?;
        Ok((status, body))
    }

    /// Queries the collection endpoint by list name, optionally excluding
    /// the entry sets from the response.
    fn query_lists(&self, name: &str, exclude_codes: bool) -> ClientResult<Vec<WireCodeList>> {
        let mut params = vec![
            ("locale", "en_US"),
            ("codeListName", name),
            ("_accept", "application/json"),
            ("_contentType", "application/json"),
        ];
        if exclude_codes {
            params.push(("_exclude", "codes"));
        }

        let (status, body) = self.send(self.http.get(self.collection_url()).query(&params))?;
        if status != StatusCode::OK {
            return Err(protocol(status, body));
        }
        serde_json::from_str(&body).map_err(|err| protocol(status, format!("invalid body: {err}")))
    }
}

impl DirectoryClient for HttpDirectoryClient {
    fn ping(&self) -> ClientResult<()> {
        let params = [
            ("locale", "en_US"),
            ("_range", "0-999"),
            ("_accept", "application/json"),
            ("_contentType", "application/json"),
            ("_method", "HEAD"),
        ];
        let (status, body) = self.send(self.http.head(self.collection_url()).query(&params))?;
        if status != StatusCode::OK {
            return Err(protocol(status, body));
        }
        Ok(())
    }

    fn fetch_snapshot(&self, name: &str) -> ClientResult<RemoteCodeList> {
        let lists = self.query_lists(name, false)?;
        debug!(list = %name, matches = lists.len(), "fetched remote state");
        lists
            .into_iter()
            .find(|list| !list.id.is_empty())
            .map(|list| list.into_remote(name))
            .ok_or(DirectoryError::NotFound)
    }

    fn lookup_id(&self, name: &str) -> ClientResult<String> {
        let lists = self.query_lists(name, true)?;
        lists
            .into_iter()
            .map(|list| list.id)
            .find(|id| !id.is_empty())
            .ok_or(DirectoryError::NotFound)
    }

    fn delete_by_id(&self, id: &str) -> ClientResult<()> {
        let url = format!("{}{id}", self.collection_url());
        let params = [("locale", "en_US")];
        let (status, body) = self.send(self.http.delete(url).query(&params))?;
        if status != StatusCode::OK {
            return Err(protocol(status, body));
        }
        Ok(())
    }

    fn bulk_replace_entries(&self, id: &str, entries: &[CodeEntry]) -> ClientResult<()> {
        let url = format!("{}{id}/actions/bulkupdatecodes", self.collection_url());
        let payload = bulk_replace_request(entries);
        let (status, body) = self.send(self.http.post(url).json(&payload))?;
        if status != StatusCode::OK {
            return Err(classify_replace_failure(status, body));
        }
        Ok(())
    }

    fn create_list(&self, name: &str, entries: &[CodeEntry]) -> ClientResult<()> {
        let payload = create_request(name, entries);
        let (status, body) = self.send(self.http.post(self.collection_url()).json(&payload))?;
        if status != StatusCode::CREATED {
            return Err(classify_create_failure(status, body));
        }
        Ok(())
    }
}
