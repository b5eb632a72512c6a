use thiserror::Error;

/// Represents errors that can occur while reading or writing office documents.
#[derive(Error, Debug)]
pub enum OfficeError {
    /// The file name does not carry a supported spreadsheet extension.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// The wrapped spreadsheet reader failed.
    #[error("spreadsheet read error: {0}")]
    Read(#[from] calamine::Error),
    /// The wrapped spreadsheet writer failed.
    #[error("spreadsheet write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    /// The wrapped Word writer failed.
    #[error("document write error: {0}")]
    Doc(#[from] docx_rs::DocxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OfficeError {
    /// Returns the stable short error code for this error.
    ///
    /// Upstream callers match on these codes rather than on messages.
    pub fn code(&self) -> &'static str {
        match self {
            OfficeError::UnsupportedFormat(_) => "7002",
            OfficeError::Read(_) => "7003",
            OfficeError::Write(_) => "7004",
            OfficeError::Doc(_) => "7005",
            OfficeError::Io(_) => "7006",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_code() {
        let err = OfficeError::UnsupportedFormat(".csv".to_string());
        assert_eq!(err.code(), "7002");
        assert_eq!(err.to_string(), "unsupported file format: .csv");
    }

    #[test]
    fn test_io_error_code() {
        let err = OfficeError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.code(), "7006");
    }
}
