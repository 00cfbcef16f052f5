//! Twenty CRM GraphQL adapter.

use crate::config::AppConfig;
use crate::domain::model::{Attachment, ExtractedCustomerInfo};
use crate::domain::ports::CrmGateway;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const CREATE_PERSON_MUTATION: &str = r#"
mutation CreatePerson($data: PersonCreateInput!) {
  createPerson(data: $data) {
    id
    name {
      firstName
      lastName
    }
    emails {
      primaryEmail
    }
    phones {
      primaryPhoneNumber
    }
    city
  }
}
"#;

const UPLOAD_FILE_MUTATION: &str = r#"
mutation UploadFile($file: Upload!, $fileFolder: FileFolder) {
  uploadFile(file: $file, fileFolder: $fileFolder)
}
"#;

const CREATE_ATTACHMENT_MUTATION: &str = r#"
mutation CreateAttachment($data: AttachmentCreateInput!) {
  createAttachment(data: $data) {
    id
    name
    type
    personId
    person {
      id
      name { firstName lastName }
    }
    fullPath
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct CreatedPerson {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatePersonData {
    #[serde(rename = "createPerson")]
    create_person: CreatedPerson,
}

/// `uploadFile` returns a bare path string on older servers and a
/// `{ path, token }` object on newer ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadedFile {
    Reference(String),
    Signed { path: String, token: Option<String> },
}

impl UploadedFile {
    fn into_reference(self) -> String {
        match self {
            UploadedFile::Reference(reference) => reference,
            UploadedFile::Signed {
                path,
                token: Some(token),
            } => format!("{}?token={}", path, token),
            UploadedFile::Signed { path, token: None } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadFileData {
    #[serde(rename = "uploadFile")]
    upload_file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct CreateAttachmentData {
    #[serde(rename = "createAttachment")]
    create_attachment: Attachment,
}

/// Reference with any `?query` suffix removed.
pub fn strip_query(reference: &str) -> &str {
    reference.split('?').next().unwrap_or(reference)
}

/// Last path segment of the reference, without query string.
pub fn display_name_from_reference(reference: &str) -> &str {
    let path = strip_query(reference);
    path.rsplit('/').next().unwrap_or(path)
}

/// Variables for `createPerson`; absent fields become empty strings.
pub fn person_variables(info: &ExtractedCustomerInfo) -> Value {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    json!({
        "data": {
            "name": {
                "firstName": field(&info.first_name),
                "lastName": field(&info.last_name),
            },
            "emails": {
                "primaryEmail": field(&info.email),
            },
            "phones": {
                "primaryPhoneNumber": field(&info.phone),
            },
            "city": field(&info.city),
        }
    })
}

#[derive(Clone)]
pub struct TwentyClient {
    client: Client,
    endpoint: String,
    token: String,
    upload_folder: String,
    attachment_type: String,
}

impl TwentyClient {
    pub fn new(config: &AppConfig, token: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.crm_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.crm.endpoint.clone(),
            token: token.into(),
            upload_folder: config.crm.upload_folder.clone(),
            attachment_type: config.crm.attachment_type.clone(),
        })
    }

    async fn execute<T: DeserializeOwned>(&self, operation: &str, query: &str, variables: Value) -> Result<T> {
        tracing::debug!("GraphQL {} -> {}", operation, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        unwrap_graphql(operation, response).await
    }
}

/// Maps HTTP failures and GraphQL `errors` lists to `GraphQlError`.
async fn unwrap_graphql<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::GraphQlError {
            operation: operation.to_string(),
            message: format!("HTTP {}: {}", status.as_u16(), body),
        });
    }

    let body: GraphQlResponse<T> = response.json().await?;

    if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
        return Err(SyncError::GraphQlError {
            operation: operation.to_string(),
            message: Value::Array(errors).to_string(),
        });
    }

    body.data.ok_or_else(|| SyncError::GraphQlError {
        operation: operation.to_string(),
        message: "response carried no data".to_string(),
    })
}

#[async_trait]
impl CrmGateway for TwentyClient {
    async fn create_person(&self, info: &ExtractedCustomerInfo) -> Result<String> {
        let data: CreatePersonData = self
            .execute("createPerson", CREATE_PERSON_MUTATION, person_variables(info))
            .await?;

        tracing::info!("👤 Created person {}", data.create_person.id);
        Ok(data.create_person.id)
    }

    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<String> {
        let operations = json!({
            "query": UPLOAD_FILE_MUTATION,
            "variables": {
                "file": null,
                "fileFolder": self.upload_folder,
            }
        });
        let map = json!({ "0": ["variables.file"] });

        let form = Form::new()
            .text("operations", operations.to_string())
            .text("map", map.to_string())
            .part("0", Part::bytes(content).file_name(file_name.to_string()));

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let data: UploadFileData = unwrap_graphql("uploadFile", response).await?;
        let reference = data.upload_file.into_reference();
        tracing::info!("📤 Uploaded {} -> {}", file_name, strip_query(&reference));
        Ok(reference)
    }

    async fn create_attachment(
        &self,
        file_reference: &str,
        person_id: &str,
        name: Option<&str>,
    ) -> Result<Attachment> {
        let name = name.unwrap_or_else(|| display_name_from_reference(file_reference));
        let variables = json!({
            "data": {
                "name": name,
                "fullPath": strip_query(file_reference),
                "type": self.attachment_type,
                "personId": person_id,
            }
        });

        let data: CreateAttachmentData = self
            .execute("createAttachment", CREATE_ATTACHMENT_MUTATION, variables)
            .await?;

        tracing::info!(
            "📎 Attachment {} created for person {}",
            data.create_attachment.id,
            person_id
        );
        Ok(data.create_attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> TwentyClient {
        let mut config = AppConfig::default();
        config.crm.endpoint = server.url("/graphql");
        config.crm.attachment_type = "attachment".to_string();
        TwentyClient::new(&config, "crm-token").unwrap()
    }

    #[test]
    fn test_reference_helpers() {
        let reference = "attachment/5f1c.pdf?token=abc";
        assert_eq!(strip_query(reference), "attachment/5f1c.pdf");
        assert_eq!(display_name_from_reference(reference), "5f1c.pdf");
        assert_eq!(display_name_from_reference("plain.xlsx"), "plain.xlsx");
    }

    #[test]
    fn test_person_variables_default_to_empty_strings() {
        let info = ExtractedCustomerInfo {
            first_name: Some("Jane".to_string()),
            city: Some("Tampa, FL".to_string()),
            ..Default::default()
        };
        let vars = person_variables(&info);

        assert_eq!(vars["data"]["name"]["firstName"], "Jane");
        assert_eq!(vars["data"]["name"]["lastName"], "");
        assert_eq!(vars["data"]["emails"]["primaryEmail"], "");
        assert_eq!(vars["data"]["phones"]["primaryPhoneNumber"], "");
        assert_eq!(vars["data"]["city"], "Tampa, FL");
    }

    #[tokio::test]
    async fn test_create_person_returns_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("Authorization", "Bearer crm-token")
                .body_contains("createPerson")
                .body_contains("\"primaryEmail\":\"jane.doe@example.com\"");
            then.status(200).json_body(json!({
                "data": {"createPerson": {
                    "id": "person-1",
                    "name": {"firstName": "Jane", "lastName": "Doe"},
                    "emails": {"primaryEmail": "jane.doe@example.com"},
                    "phones": {"primaryPhoneNumber": ""},
                    "city": ""
                }}
            }));
        });

        let info = ExtractedCustomerInfo {
            email: Some("jane.doe@example.com".to_string()),
            ..Default::default()
        }
        .with_derived_name("Jane_Doe_info.pdf");

        let id = client_for(&server).create_person(&info).await.unwrap();

        mock.assert();
        assert_eq!(id, "person-1");
    }

    #[tokio::test]
    async fn test_create_person_graphql_errors_are_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "data": null,
                "errors": [{"message": "Duplicate email"}]
            }));
        });

        let err = client_for(&server)
            .create_person(&ExtractedCustomerInfo::default())
            .await
            .unwrap_err();

        match err {
            SyncError::GraphQlError { operation, message } => {
                assert_eq!(operation, "createPerson");
                assert!(message.contains("Duplicate email"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_file_sends_multipart_descriptor() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("name=\"operations\"")
                .body_contains("\"fileFolder\":\"Attachment\"")
                .body_contains("name=\"map\"")
                .body_contains("{\"0\":[\"variables.file\"]}")
                .body_contains("filename=\"Jane_Doe_notes.pdf\"");
            then.status(200).json_body(json!({
                "data": {"uploadFile": "attachment/abc.pdf?token=xyz"}
            }));
        });

        let reference = client_for(&server)
            .upload_file("Jane_Doe_notes.pdf", b"%PDF".to_vec())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reference, "attachment/abc.pdf?token=xyz");
    }

    #[tokio::test]
    async fn test_upload_file_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500).body("boom");
        });

        let err = client_for(&server)
            .upload_file("a.pdf", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_create_attachment_strips_query_and_derives_name() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .json_body_partial(
                    r#"{"variables": {"data": {
                        "name": "abc.pdf",
                        "fullPath": "attachment/abc.pdf",
                        "type": "attachment",
                        "personId": "person-1"
                    }}}"#,
                );
            then.status(200).json_body(json!({
                "data": {"createAttachment": {
                    "id": "att-1",
                    "name": "abc.pdf",
                    "type": "attachment",
                    "personId": "person-1",
                    "person": {"id": "person-1", "name": {"firstName": "Jane", "lastName": "Doe"}},
                    "fullPath": "attachment/abc.pdf"
                }}
            }));
        });

        let attachment = client_for(&server)
            .create_attachment("attachment/abc.pdf?token=xyz", "person-1", None)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(attachment.id, "att-1");
        assert_eq!(attachment.full_path.as_deref(), Some("attachment/abc.pdf"));
        assert_eq!(attachment.person.unwrap().id, "person-1");
    }
}
