use crate::domain::model::ExtractedCustomerInfo;
use crate::utils::error::{Result, SyncError};
use lopdf::Document;
use regex::Regex;
use std::io::Write;
use std::path::Path;

/// Label/value patterns applied independently to the info document's text.
/// Free-text values run to the end of their line.
pub struct InfoExtractor {
    customer_id: Regex,
    account_manager: Regex,
    age: Regex,
    retirement_date: Regex,
    industry: Regex,
    email: Regex,
    phone: Regex,
    city: Regex,
    annual_revenue: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SyncError::ProcessingError {
        message: format!("invalid pattern {}: {}", pattern, e),
    })
}

impl InfoExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            customer_id: compile(r"Customer ID: (CUST-\d{3})")?,
            account_manager: compile(r"Account Manager: (.*)")?,
            age: compile(r"Age: (\d+)")?,
            retirement_date: compile(r"Retirement Date: (\d{4}-\d{2}-\d{2})")?,
            industry: compile(r"Previous Industry: (.*)")?,
            email: compile(r"Primary contact: (.*)")?,
            phone: compile(r"Phone: (.*)")?,
            city: compile(r"City: (.*)")?,
            annual_revenue: compile(r"Annual Retirement Income: (\$[\d,]+)")?,
        })
    }

    /// 從 PDF 位元組擷取欄位；只有 PDF 無法解析時才回傳錯誤
    pub fn extract(&self, source_name: &str, pdf: &[u8]) -> Result<ExtractedCustomerInfo> {
        let text = extract_text(pdf).map_err(|e| SyncError::ExtractionError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("Extracted {} chars of text from {}", text.len(), source_name);
        Ok(self.parse(&text))
    }

    pub fn parse(&self, text: &str) -> ExtractedCustomerInfo {
        let capture = |re: &Regex| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        };

        ExtractedCustomerInfo {
            customer_id: capture(&self.customer_id),
            account_manager: capture(&self.account_manager),
            age: capture(&self.age).and_then(|age| age.parse().ok()),
            retirement_date: capture(&self.retirement_date),
            industry: capture(&self.industry),
            email: capture(&self.email),
            phone: capture(&self.phone),
            city: capture(&self.city),
            annual_revenue: capture(&self.annual_revenue),
            first_name: None,
            last_name: None,
        }
    }
}

/// Page text concatenated in page order. The bytes go through a temporary
/// `.pdf` file under the system temp dir.
pub fn extract_text(pdf: &[u8]) -> Result<String> {
    extract_text_in(&std::env::temp_dir(), pdf)
}

/// Same as [`extract_text`] with an explicit scratch directory. The temporary
/// file is removed on every return path.
pub fn extract_text_in(temp_dir: &Path, pdf: &[u8]) -> Result<String> {
    let mut temp_file = tempfile::Builder::new()
        .prefix("customer-info-")
        .suffix(".pdf")
        .tempfile_in(temp_dir)?;
    temp_file.write_all(pdf)?;
    temp_file.flush()?;

    let document = Document::load(temp_file.path())?;
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::generator::documents::render_info_pdf;
    use crate::domain::model::CustomerRecord;
    use tempfile::TempDir;

    const FULL_TEXT: &str = "Customer Information for Jane Doe
Customer ID: CUST-042
Account Manager: Sarah Johnson
Status: Retired
Age: 71
Retirement Date: 2015-06-30
Previous Industry: Former Healthcare
Created at: 2024-01-02T10:11:12.000000

Notes:
- Primary contact: jane.doe@example.com
- Phone: +1-305-555-1234
- City: Miami, FL
- Previous Role: Retired Executive
- Annual Retirement Income: $123,456
- Last contact: 2024-05-01
";

    fn sample_customer() -> CustomerRecord {
        CustomerRecord {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            phone: "+1-305-555-1234".to_string(),
            city: "Fort Lauderdale, FL".to_string(),
            job_title: "Former Engineer".to_string(),
            industry: "Retired - Technology".to_string(),
            annual_revenue: "$88,000".to_string(),
            account_manager: "David Wilson".to_string(),
            customer_id: "CUST-777".to_string(),
            created_at: "2024-02-03T04:05:06.000000".to_string(),
            last_contact: "2024-05-20".to_string(),
            retirement_date: "2012-09-01".to_string(),
            age: 80,
        }
    }

    #[test]
    fn test_parse_all_labels() {
        let info = InfoExtractor::new().unwrap().parse(FULL_TEXT);

        assert_eq!(info.customer_id.as_deref(), Some("CUST-042"));
        assert_eq!(info.account_manager.as_deref(), Some("Sarah Johnson"));
        assert_eq!(info.age, Some(71));
        assert_eq!(info.retirement_date.as_deref(), Some("2015-06-30"));
        assert_eq!(info.industry.as_deref(), Some("Former Healthcare"));
        assert_eq!(info.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(info.phone.as_deref(), Some("+1-305-555-1234"));
        assert_eq!(info.city.as_deref(), Some("Miami, FL"));
        assert_eq!(info.annual_revenue.as_deref(), Some("$123,456"));
        assert_eq!(info.first_name, None);
    }

    #[test]
    fn test_parse_missing_labels_are_omitted() {
        let text = "Customer ID: CUST-100\nAge: sixty\nCity: Naples, FL\n";
        let info = InfoExtractor::new().unwrap().parse(text);

        assert_eq!(info.customer_id.as_deref(), Some("CUST-100"));
        assert_eq!(info.city.as_deref(), Some("Naples, FL"));
        assert_eq!(info.age, None);
        assert_eq!(info.email, None);
        assert_eq!(info.phone, None);
        assert_eq!(info.account_manager, None);
        assert_eq!(info.annual_revenue, None);
    }

    #[test]
    fn test_parse_empty_text() {
        let info = InfoExtractor::new().unwrap().parse("");
        assert_eq!(info, ExtractedCustomerInfo::default());
    }

    #[test]
    fn test_extract_from_generated_info_pdf() {
        let customer = sample_customer();
        let document = render_info_pdf(&customer).unwrap();

        let info = InfoExtractor::new()
            .unwrap()
            .extract(&document.file_name, &document.content)
            .unwrap();

        assert_eq!(info.customer_id.as_deref(), Some("CUST-777"));
        assert_eq!(info.account_manager.as_deref(), Some("David Wilson"));
        assert_eq!(info.age, Some(80));
        assert_eq!(info.retirement_date.as_deref(), Some("2012-09-01"));
        assert_eq!(info.industry.as_deref(), Some("Retired - Technology"));
        assert_eq!(info.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(info.city.as_deref(), Some("Fort Lauderdale, FL"));
        assert_eq!(info.annual_revenue.as_deref(), Some("$88,000"));
    }

    #[test]
    fn test_corrupt_pdf_fails_and_cleans_up() {
        let scratch = TempDir::new().unwrap();

        let result = extract_text_in(scratch.path(), b"definitely not a pdf");

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_temp_file_removed_after_success() {
        let scratch = TempDir::new().unwrap();
        let document = render_info_pdf(&sample_customer()).unwrap();

        let text = extract_text_in(scratch.path(), &document.content).unwrap();

        assert!(text.contains("Customer ID: CUST-777"));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_extract_error_names_source() {
        let err = InfoExtractor::new()
            .unwrap()
            .extract("Jane Doe_info.pdf", b"%PDF-broken")
            .unwrap_err();
        assert!(matches!(err, SyncError::ExtractionError { ref source_name, .. } if source_name == "Jane Doe_info.pdf"));
    }
}
