use crate::error::IngestError;
use crate::models::Document;
use lopdf::Document as PdfDocument;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            PdfDocument::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages)
    }
}

pub fn source_id(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))
}

pub fn extract_document(path: &Path) -> Result<Document, IngestError> {
    extract_document_with(&LopdfExtractor, path)
}

pub fn extract_document_with<E>(extractor: &E, path: &Path) -> Result<Document, IngestError>
where
    E: PdfExtractor + ?Sized,
{
    let source = source_id(path)?;
    let content = extractor
        .extract_pages(path)?
        .into_iter()
        .map(|page| page.text)
        .collect::<String>();

    Ok(Document { source, content })
}

#[cfg(test)]
mod tests {
    use super::{extract_document, extract_document_with, source_id, PageText, PdfExtractor};
    use crate::error::IngestError;
    use std::path::Path;

    struct FixedPages;

    impl PdfExtractor for FixedPages {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<PageText>, IngestError> {
            Ok(vec![
                PageText {
                    number: 1,
                    text: "First page. ".to_string(),
                },
                PageText {
                    number: 2,
                    text: "Second page.".to_string(),
                },
            ])
        }
    }

    #[test]
    fn document_concatenates_pages_under_file_name() {
        let document = extract_document_with(&FixedPages, Path::new("/tmp/uploads/manual.pdf"))
            .expect("fixed pages never fail");

        assert_eq!(document.source, "manual.pdf");
        assert_eq!(document.content, "First page. Second page.");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(matches!(
            source_id(Path::new("/")),
            Err(IngestError::MissingFileName(_))
        ));
    }

    #[test]
    fn broken_pdf_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%broken")?;

        assert!(matches!(
            extract_document(&path),
            Err(IngestError::PdfParse(_))
        ));
        Ok(())
    }
}
