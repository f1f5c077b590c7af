use crate::error::{Error, Result};

/// File-validation capability delegated to the upload layer: the core only
/// sees metadata and checks it against an assignment's constraints.
#[derive(Debug, Clone)]
pub struct FileConstraints {
    pub max_size: i64,
    pub allowed_extensions: Vec<String>,
}

impl FileConstraints {
    pub fn check(&self, file_name: &str, file_size: i64) -> Result<()> {
        if self.max_size > 0 && file_size > self.max_size {
            return Err(Error::ValidationMsg(format!(
                "File too large. Maximum allowed size is {}MB.",
                self.max_size / (1024 * 1024)
            )));
        }

        if !self.allowed_extensions.is_empty() {
            let ext = file_name
                .rsplit('.')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            if !self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
                return Err(Error::ValidationMsg(format!(
                    "File type not allowed. Allowed types: {}",
                    self.allowed_extensions.join(", ")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> FileConstraints {
        FileConstraints {
            max_size: 10 * 1024 * 1024,
            allowed_extensions: vec!["pdf".into(), "docx".into(), "txt".into()],
        }
    }

    #[test]
    fn accepts_file_within_limits() {
        assert!(constraints().check("essay.pdf", 1024).is_ok());
        assert!(constraints().check("ESSAY.PDF", 1024).is_ok());
    }

    #[test]
    fn rejects_oversized_file_with_limit_in_message() {
        let err = constraints().check("essay.pdf", 11 * 1024 * 1024).unwrap_err();
        assert!(err.to_string().contains("Maximum allowed size is 10MB"));
    }

    #[test]
    fn rejects_disallowed_extension_and_lists_allowed() {
        let err = constraints().check("payload.exe", 512).unwrap_err();
        assert!(err.to_string().contains("pdf, docx, txt"));
    }
}
