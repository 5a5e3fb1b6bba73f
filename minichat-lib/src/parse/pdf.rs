use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::{Error, Result};

/// Extract the text layer of a PDF, one entry per page in page order.
///
/// `pdf-extract` panics on some malformed files; that is reported as a parse
/// error like any other.
pub(super) fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(Error::Parse(e.to_string())),
        Err(_) => Err(Error::Parse(format!(
            "could not extract text from {}",
            path.display()
        ))),
    }
}
