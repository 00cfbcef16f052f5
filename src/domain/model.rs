use serde::{Deserialize, Serialize};

/// 產生器端的合成客戶資料，建立後不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub job_title: String,
    pub industry: String,
    pub annual_revenue: String,
    pub account_manager: String,
    pub customer_id: String,
    pub created_at: String,
    pub last_contact: String,
    pub retirement_date: String,
    pub age: u32,
}

/// Fields scraped from an info PDF. A field the document lacks stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCustomerInfo {
    pub customer_id: Option<String>,
    pub account_manager: Option<String>,
    pub age: Option<u32>,
    pub retirement_date: Option<String>,
    pub industry: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub annual_revenue: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ExtractedCustomerInfo {
    /// Fills first/last name from the source file name unless a first name
    /// is already present.
    pub fn with_derived_name(mut self, file_name: &str) -> Self {
        if self.first_name.as_deref().map_or(true, str::is_empty) {
            let (first, last) = derive_name(file_name);
            self.first_name = Some(first);
            self.last_name = Some(last);
        }
        self
    }
}

/// `"Jane_Mary_Doe_info.pdf"` -> `("Jane", "Mary Doe")`.
/// A single token yields an empty last name.
pub fn derive_name(file_name: &str) -> (String, String) {
    let base = file_name.replace(INFO_FILE_SUFFIX, "").replace('_', " ");
    let mut parts = base.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

pub const INFO_FILE_SUFFIX: &str = "_info.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
    Deleted,
}

/// One row of a remote folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub kind: EntryKind,
    pub name: String,
    pub path_display: String,
}

impl StorageEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_info_document(&self) -> bool {
        self.is_file() && self.name.ends_with(INFO_FILE_SUFFIX)
    }
}

/// A rendered document ready for upload
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub name: Option<PersonName>,
}

/// `createAttachment` 回傳的完整資料
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub attachment_type: Option<String>,
    pub person_id: Option<String>,
    pub person: Option<PersonRef>,
    pub full_path: Option<String>,
}

/// Result of one customer folder once a person exists for it
#[derive(Debug, Clone, Default)]
pub struct FolderOutcome {
    pub folder: String,
    pub person_id: String,
    pub attached: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub folders: Vec<FolderOutcome>,
    pub failed_folders: Vec<(String, String)>,
    pub aborted: bool,
}

impl SyncReport {
    pub fn attachments_created(&self) -> usize {
        self.folders.iter().map(|f| f.attached.len()).sum()
    }

    pub fn attachment_failures(&self) -> usize {
        self.folders.iter().map(|f| f.failed.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_folders.is_empty() && !self.aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_splits_underscored_tokens() {
        let (first, last) = derive_name("Jane_Mary_Doe_info.pdf");
        assert_eq!(first, "Jane");
        assert_eq!(last, "Mary Doe");
    }

    #[test]
    fn test_derive_name_with_spaces_from_generator() {
        let (first, last) = derive_name("Emma Garcia_info.pdf");
        assert_eq!(first, "Emma");
        assert_eq!(last, "Garcia");
    }

    #[test]
    fn test_derive_name_single_token_has_empty_last_name() {
        let (first, last) = derive_name("Cher_info.pdf");
        assert_eq!(first, "Cher");
        assert_eq!(last, "");
    }

    #[test]
    fn test_with_derived_name_keeps_existing_first_name() {
        let info = ExtractedCustomerInfo {
            first_name: Some("Janet".to_string()),
            last_name: Some("Roe".to_string()),
            ..Default::default()
        }
        .with_derived_name("Jane_Doe_info.pdf");

        assert_eq!(info.first_name.as_deref(), Some("Janet"));
        assert_eq!(info.last_name.as_deref(), Some("Roe"));
    }

    #[test]
    fn test_info_document_detection() {
        let entry = StorageEntry {
            kind: EntryKind::File,
            name: "Jane Doe_info.pdf".to_string(),
            path_display: "/Root/Jane Doe/Jane Doe_info.pdf".to_string(),
        };
        assert!(entry.is_info_document());

        let folder = StorageEntry {
            kind: EntryKind::Folder,
            name: "x_info.pdf".to_string(),
            path_display: "/Root/x_info.pdf".to_string(),
        };
        assert!(!folder.is_info_document());
    }
}
