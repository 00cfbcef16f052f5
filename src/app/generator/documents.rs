use crate::domain::model::{CustomerRecord, GeneratedDocument};
use crate::utils::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;

const ADDITIONAL_DOC_TYPES: [&str; 8] = [
    "Investment Strategy Review",
    "Tax Planning Document",
    "Insurance Coverage Analysis",
    "Estate Planning Update",
    "Healthcare Cost Projection",
    "Social Security Benefits Analysis",
    "Retirement Income Forecast",
    "Long-term Care Planning",
];

const PORTFOLIO_ASSETS: [(&str, u32, u32, u32); 6] = [
    ("Retirement Accounts (401k/IRA)", 35, 300_000, 1_000_000),
    ("Social Security", 25, 20_000, 40_000),
    ("Pension", 15, 50_000, 200_000),
    ("Investment Portfolio", 15, 100_000, 500_000),
    ("Real Estate", 5, 100_000, 300_000),
    ("Cash Reserves", 5, 50_000, 200_000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
}

#[derive(Debug, Clone)]
pub struct PdfLine {
    pub text: String,
    pub style: LineStyle,
}

impl PdfLine {
    pub fn title(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::Title,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::Body,
        }
    }

    fn font(&self) -> (&'static str, i64, i64) {
        match self.style {
            LineStyle::Title => ("F2", 16, 28),
            LineStyle::Body => ("F1", 12, 18),
        }
    }
}

/// `$123,456`
pub fn format_currency(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

/// Lays lines top-down on A4 pages using the built-in Helvetica fonts.
/// Every line is its own text object, so text extraction yields one line
/// per entry.
pub fn render_text_pdf(lines: &[PdfLine]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut pages: Vec<Vec<Operation>> = vec![Vec::new()];
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let (font, size, advance) = line.font();
        if y - advance < MARGIN {
            pages.push(Vec::new());
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= advance;

        // 空行只推進位置
        if line.text.is_empty() {
            continue;
        }

        let x = match line.style {
            LineStyle::Title => centered_x(&line.text, size),
            LineStyle::Body => MARGIN,
        };

        if let Some(operations) = pages.last_mut() {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font.into(), size.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]),
                Operation::new("ET", vec![]),
            ]);
        }
    }

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

// Helvetica averages roughly half an em per glyph.
fn centered_x(text: &str, size: i64) -> i64 {
    let width = text.chars().count() as i64 * size / 2;
    ((PAGE_WIDTH - width) / 2).max(MARGIN)
}

fn multi_line(text: &str) -> impl Iterator<Item = PdfLine> + '_ {
    text.split('\n').map(PdfLine::body)
}

/// The primary `<Name>_info.pdf`; its labels are what the sync side parses.
pub fn render_info_pdf(customer: &CustomerRecord) -> Result<GeneratedDocument> {
    let mut lines = vec![
        PdfLine::title(format!("Customer Information for {}", customer.name)),
        PdfLine::body(""),
    ];
    lines.extend(
        [
            format!("Customer ID: {}", customer.customer_id),
            format!("Account Manager: {}", customer.account_manager),
            "Status: Retired".to_string(),
            format!("Age: {}", customer.age),
            format!("Retirement Date: {}", customer.retirement_date),
            format!("Previous Industry: {}", customer.industry),
            format!("Created at: {}", customer.created_at),
            String::new(),
            "Notes:".to_string(),
            format!("- Primary contact: {}", customer.email),
            format!("- Phone: {}", customer.phone),
            format!("- City: {}", customer.city),
            format!("- Previous Role: {}", customer.job_title),
            format!("- Annual Retirement Income: {}", customer.annual_revenue),
            format!("- Last contact: {}", customer.last_contact),
        ]
        .into_iter()
        .map(PdfLine::body),
    );

    Ok(GeneratedDocument {
        file_name: format!("{}_info.pdf", customer.name),
        content: render_text_pdf(&lines)?,
    })
}

pub fn render_notes_pdf(customer: &CustomerRecord) -> Result<GeneratedDocument> {
    let body = format!(
        "Meeting Date: {}\n\n\
         Discussion Points:\n\
         - Retirement Income Planning\n\
         - Social Security Optimization\n\
         - Required Minimum Distribution (RMD) Planning\n\
         - Estate Planning Review\n\
         - Healthcare Cost Planning\n\n\
         Next Steps:\n\
         - Review retirement account distributions\n\
         - Update estate planning documents\n\
         - Schedule annual healthcare review\n\
         - Review long-term care insurance options",
        customer.last_contact
    );

    let mut lines = vec![
        PdfLine::body(format!("Meeting Notes - {}", customer.name)),
        PdfLine::body(""),
    ];
    lines.extend(multi_line(&body));

    Ok(GeneratedDocument {
        file_name: format!("{}_notes.pdf", customer.name),
        content: render_text_pdf(&lines)?,
    })
}

fn render_sheet(headers: &[&str], rows: &[Vec<SheetCell>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    {
        let worksheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }
        for (row, cells) in rows.iter().enumerate() {
            let row = row as u32 + 1;
            for (col, cell) in cells.iter().enumerate() {
                match cell {
                    SheetCell::Text(text) => worksheet.write_string(row, col as u16, text.as_str())?,
                    SheetCell::Number(value) => worksheet.write_number(row, col as u16, *value)?,
                };
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

enum SheetCell {
    Text(String),
    Number(f64),
}

/// `<Name>_portfolio.xlsx`: asset type, allocation and a random value per asset.
pub fn render_portfolio_xlsx<R: Rng + ?Sized>(
    customer: &CustomerRecord,
    rng: &mut R,
) -> Result<GeneratedDocument> {
    let rows: Vec<Vec<SheetCell>> = PORTFOLIO_ASSETS
        .iter()
        .map(|(asset, allocation, low, high)| {
            vec![
                SheetCell::Text(asset.to_string()),
                SheetCell::Number(f64::from(*allocation)),
                SheetCell::Text(format_currency(rng.gen_range(*low..=*high))),
            ]
        })
        .collect();

    Ok(GeneratedDocument {
        file_name: format!("{}_portfolio.xlsx", customer.name),
        content: render_sheet(&["Asset Type", "Allocation (%)", "Value ($)"], &rows)?,
    })
}

fn render_additional_pdf<R: Rng + ?Sized>(
    customer: &CustomerRecord,
    rng: &mut R,
) -> Result<GeneratedDocument> {
    let doc_type = ADDITIONAL_DOC_TYPES
        .choose(rng)
        .copied()
        .unwrap_or(ADDITIONAL_DOC_TYPES[0]);

    let body = format!(
        "Document Date: {}\n\n\
         Key Points:\n\
         - Sample point 1\n\
         - Sample point 2\n\
         - Sample point 3\n\n\
         Recommendations:\n\
         - Sample recommendation 1\n\
         - Sample recommendation 2",
        customer.last_contact
    );

    let mut lines = vec![
        PdfLine::body(format!("{} - {}", doc_type, customer.name)),
        PdfLine::body(""),
    ];
    lines.extend(multi_line(&body));

    Ok(GeneratedDocument {
        file_name: format!(
            "{}_{}.pdf",
            customer.name,
            doc_type.to_lowercase().replace(' ', "_")
        ),
        content: render_text_pdf(&lines)?,
    })
}

fn render_additional_xlsx<R: Rng + ?Sized>(
    customer: &CustomerRecord,
    index: usize,
    rng: &mut R,
) -> Result<GeneratedDocument> {
    let rows: Vec<Vec<SheetCell>> = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(i, category)| {
            vec![
                SheetCell::Text(format!("Category {}", category)),
                SheetCell::Text(format_currency(rng.gen_range(10_000..=100_000))),
                SheetCell::Text(format!("Note {}", i + 1)),
            ]
        })
        .collect();

    Ok(GeneratedDocument {
        file_name: format!("{}_additional_data_{}.xlsx", customer.name, index + 1),
        content: render_sheet(&["Category", "Value", "Notes"], &rows)?,
    })
}

/// Appends `_<n>` before the extension until the name is unused.
fn unique_name(file_name: String, used: &mut HashSet<String>) -> String {
    if used.insert(file_name.clone()) {
        return file_name;
    }
    let (stem, ext) = file_name
        .rsplit_once('.')
        .map(|(stem, ext)| (stem.to_string(), format!(".{}", ext)))
        .unwrap_or_else(|| (file_name.clone(), String::new()));

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Renders the full document set for one customer: info, portfolio, notes,
/// then `additional` documents that are each randomly a PDF or a spreadsheet.
pub fn build_customer_documents<R: Rng + ?Sized>(
    customer: &CustomerRecord,
    additional: usize,
    rng: &mut R,
) -> Result<Vec<GeneratedDocument>> {
    let mut documents = vec![
        render_info_pdf(customer)?,
        render_portfolio_xlsx(customer, rng)?,
        render_notes_pdf(customer)?,
    ];
    let mut used: HashSet<String> = documents.iter().map(|d| d.file_name.clone()).collect();

    for index in 0..additional {
        let mut document = if rng.gen_bool(0.5) {
            render_additional_pdf(customer, rng)?
        } else {
            render_additional_xlsx(customer, index, rng)?
        };
        document.file_name = unique_name(document.file_name, &mut used);
        documents.push(document);
    }

    Ok(documents)
}
