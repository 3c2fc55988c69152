//! Document text extraction: PDF, DOCX, HTML and plain text uploads.
//!
//! PDF parsing is CPU-bound and may panic on malformed input, so it runs inside
//! `tokio::task::spawn_blocking`; a panic surfaces as a `SourceError::Decode` for that
//! document only.

use std::io::{Cursor, Read, Write};
use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;

use crate::sources::web::html_to_text;
use crate::sources::SourceError;

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Html,
    PlainText,
}

impl DocumentKind {
    /// Picks the kind from the file extension, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "html" | "htm" => Some(Self::Html),
            "txt" | "md" | "csv" | "eml" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Extracts plain text from an uploaded document.
pub async fn extract_document_text(name: &str, bytes: Bytes) -> Result<String, SourceError> {
    let kind = DocumentKind::from_name(name)
        .ok_or_else(|| SourceError::UnsupportedFormat(name.to_string()))?;

    match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| SourceError::Decode(format!("pdf: {e}")))
        })
        .await
        .map_err(|e| SourceError::Decode(format!("pdf reader aborted: {e}")))?,
        DocumentKind::Docx => text_from_docx(&bytes),
        DocumentKind::Html => Ok(html_to_text(&utf8(&bytes)?)),
        DocumentKind::PlainText => utf8(&bytes),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, SourceError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| SourceError::Encoding(e.to_string()))
}

/// Reads the main document part of a DOCX archive, one line per paragraph.
fn text_from_docx(bytes: &[u8]) -> Result<String, SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SourceError::Decode(format!("docx archive: {e}")))?;
    let mut part = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| SourceError::Decode(format!("docx body: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| SourceError::Encoding(format!("docx body: {e}")))?;

    docx_xml_to_text(&xml)
}

/// Tag patterns for `word/document.xml`, compiled on first use.
struct DocxPatterns {
    paragraph_end: Regex,
    line_break: Regex,
    tab: Regex,
    any_tag: Regex,
    entity: Regex,
}

impl DocxPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            paragraph_end: Regex::new(r"</w:p>")?,
            line_break: Regex::new(r"<w:(?:br|cr)\s*/>")?,
            tab: Regex::new(r"<w:tab\s*/>")?,
            any_tag: Regex::new(r"<[^>]+>")?,
            entity: Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-z]+);")?,
        })
    }
}

static DOCX_PATTERNS: OnceLock<Result<DocxPatterns, String>> = OnceLock::new();

fn docx_patterns() -> Result<&'static DocxPatterns, SourceError> {
    DOCX_PATTERNS
        .get_or_init(|| DocxPatterns::new().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| SourceError::Decode(e.clone()))
}

fn docx_xml_to_text(xml: &str) -> Result<String, SourceError> {
    let patterns = docx_patterns()?;

    let text = patterns.paragraph_end.replace_all(xml, "\n");
    let text = patterns.line_break.replace_all(&text, "\n");
    let text = patterns.tab.replace_all(&text, "\t");
    let text = patterns.any_tag.replace_all(&text, "");

    Ok(unescape_xml(&patterns.entity, text.trim_end()))
}

/// Decodes the five predefined XML entities and numeric character references.
/// Anything unrecognised is left as written.
fn unescape_xml(entity: &Regex, s: &str) -> String {
    entity
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => numeric_reference(name),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn numeric_reference(name: &str) -> Option<char> {
    let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => name.strip_prefix('#')?.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const DOCX_PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Builds a minimal DOCX package holding `text`, one paragraph per line.
pub fn text_to_docx(text: &str) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for line in text.lines() {
        body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
        body.push_str(&escape_xml(line));
        body.push_str("</w:t></w:r></w:p>");
    }
    body.push_str("</w:body></w:document>");

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in [
        ("[Content_Types].xml", DOCX_CONTENT_TYPES),
        ("_rels/.rels", DOCX_PACKAGE_RELS),
        (DOCX_BODY_PART, body.as_str()),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(content.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docx_with_body(xml: &str) -> Bytes {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file(DOCX_BODY_PART, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        Bytes::from(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(DocumentKind::from_name("offers.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_name("cv.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_name("page.htm"), Some(DocumentKind::Html));
        assert_eq!(DocumentKind::from_name("notes.txt"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::from_name("archive.tar.gz"), None);
        assert_eq!(DocumentKind::from_name("README"), None);
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let text = extract_document_text("a.txt", Bytes::from_static(b"hr@acme.io\nbye"))
            .await
            .unwrap();
        assert_eq!(text, "hr@acme.io\nbye");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_encoding_error() {
        let err = extract_document_text("a.txt", Bytes::from_static(&[0xff, 0xfe, 0x00]))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let err = extract_document_text("slides.pptx", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_decode_error() {
        let err = extract_document_text("broken.pdf", Bytes::from_static(b"not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_docx_paragraphs_become_lines() {
        let body = r#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Backend team</w:t></w:r></w:p><w:p><w:r><w:t>Write to jobs@acme.io &amp; cc hr@acme.io</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_document_text("offer.docx", docx_with_body(body))
            .await
            .unwrap();
        assert_eq!(text, "Backend team\nWrite to jobs@acme.io & cc hr@acme.io");
    }

    #[tokio::test]
    async fn test_docx_numeric_references_are_decoded() {
        let body = r#"<w:document><w:body><w:p><w:r><w:t>Caf&#233; team, write to jobs&#x40;acme.io &amp;c &bogus;</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_document_text("offer.docx", docx_with_body(body))
            .await
            .unwrap();
        assert_eq!(text, "Café team, write to jobs@acme.io &c &bogus;");
    }

    #[test]
    fn test_unescape_xml_is_single_pass() {
        let patterns = docx_patterns().unwrap();
        assert_eq!(unescape_xml(&patterns.entity, "&amp;lt; &#60;"), "&lt; <");
        assert_eq!(unescape_xml(&patterns.entity, "&#xZZ; &#1114112;"), "&#xZZ; &#1114112;");
    }

    #[tokio::test]
    async fn test_written_docx_reads_back() {
        let letter = "Madame, Monsieur,\n\nJe postule chez R&D <Acme>.\nCordialement";
        let bytes = text_to_docx(letter).unwrap();
        let text = extract_document_text("lettre_acme.docx", Bytes::from(bytes))
            .await
            .unwrap();
        assert_eq!(text, letter);
    }

    #[tokio::test]
    async fn test_docx_without_body_is_decode_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("other.xml", options).unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = Bytes::from(writer.finish().unwrap().into_inner());

        let err = extract_document_text("offer.docx", bytes).await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_html_upload_is_stripped() {
        let html = b"<html><body><p>Contact <b>hr@acme.io</b></p><script>var x = 1;</script></body></html>";
        let text = extract_document_text("page.html", Bytes::from_static(html))
            .await
            .unwrap();
        assert_eq!(text, "Contact hr@acme.io");
    }
}
