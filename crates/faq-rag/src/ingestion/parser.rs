//! Source readers: uploaded bytes to grids or lines

use calamine::{Data, Reader};
use std::fmt;

use crate::error::{Error, Result};
use crate::extraction::Grid;
use crate::types::CellValue;

/// File type detected from the upload's extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Xlsx,
    Pdf,
    Txt,
    Docx,
    Unsupported(String),
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" => FileType::Xlsx,
            "pdf" => FileType::Pdf,
            "txt" => FileType::Txt,
            "docx" => FileType::Docx,
            other => FileType::Unsupported(other.to_string()),
        }
    }

    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => FileType::Unsupported(String::new()),
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            FileType::Xlsx => "xlsx",
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
            FileType::Docx => "docx",
            FileType::Unsupported(ext) => ext,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// How an upload is turned into documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Extract question/answer records
    QaPairs,
    /// Store every non-empty line as its own document
    RawParagraphs,
}

impl IngestMode {
    pub fn from_flag(is_qa: bool) -> Self {
        if is_qa {
            IngestMode::QaPairs
        } else {
            IngestMode::RawParagraphs
        }
    }

    pub fn accepted_types(&self) -> &'static [FileType] {
        const QA_TYPES: &[FileType] = &[FileType::Xlsx, FileType::Pdf, FileType::Txt];
        const RAW_TYPES: &[FileType] = &[FileType::Txt, FileType::Pdf, FileType::Docx];

        match self {
            IngestMode::QaPairs => QA_TYPES,
            IngestMode::RawParagraphs => RAW_TYPES,
        }
    }

    pub fn accepts(&self, file_type: &FileType) -> bool {
        self.accepted_types().contains(file_type)
    }

    /// Resolve the file type for this mode, or `UnsupportedFileType`
    pub fn check(&self, filename: &str) -> Result<FileType> {
        let file_type = FileType::from_filename(filename);
        if self.accepts(&file_type) {
            return Ok(file_type);
        }

        let accepted = self
            .accepted_types()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::UnsupportedFileType(format!(
            "{} ({} mode accepts {})",
            file_type, self, accepted
        )))
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestMode::QaPairs => f.write_str("QA"),
            IngestMode::RawParagraphs => f.write_str("raw"),
        }
    }
}

/// Decoded source, shaped for a segmenter
#[derive(Debug, Clone, PartialEq)]
pub enum SourceContent {
    /// One grid per kept sheet
    Sheets(Vec<Grid>),
    /// Text lines, untrimmed
    Lines(Vec<String>),
}

/// Multi-format file reader
pub struct FileParser;

impl FileParser {
    /// Decode `data` according to its extension
    pub fn parse(filename: &str, data: &[u8], skip_sheets: usize) -> Result<SourceContent> {
        match FileType::from_filename(filename) {
            FileType::Xlsx => Self::parse_xlsx(filename, data, skip_sheets).map(SourceContent::Sheets),
            FileType::Pdf => Self::parse_pdf(filename, data).map(SourceContent::Lines),
            FileType::Txt => Ok(SourceContent::Lines(Self::parse_text(data))),
            FileType::Docx => Self::parse_docx(filename, data).map(SourceContent::Lines),
            other => Err(Error::UnsupportedFileType(other.to_string())),
        }
    }

    /// Every sheet after the first `skip_sheets`, anchored at A1
    pub fn parse_xlsx(filename: &str, data: &[u8], skip_sheets: usize) -> Result<Vec<Grid>> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut grids = Vec::new();
        for sheet_name in workbook.sheet_names().into_iter().skip(skip_sheets) {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("Skipping sheet '{}' in {}: {}", sheet_name, filename, e);
                    continue;
                }
            };

            let rows = match range.end() {
                Some((last_row, last_col)) => (0..=last_row)
                    .map(|row| {
                        (0..=last_col)
                            .map(|col| {
                                range
                                    .get_value((row, col))
                                    .map_or(CellValue::Null, cell_value)
                            })
                            .collect()
                    })
                    .collect(),
                None => Vec::new(),
            };

            grids.push(Grid::new(rows).with_name(sheet_name));
        }

        tracing::debug!("Read {} sheets from {}", grids.len(), filename);
        Ok(grids)
    }

    pub fn parse_pdf(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let content = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// UTF-8, lossily decoded
    pub fn parse_text(data: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(data)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// One entry per non-empty paragraph
    pub fn parse_docx(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }
        Ok(paragraphs)
    }
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

/// Trimmed, non-empty lines
pub fn paragraphs<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
