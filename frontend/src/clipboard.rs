use crate::page::{ConsoleLine, Page};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipboardError {
    /// The browser exposes no clipboard (insecure context, old engine)
    #[error("clipboard API unavailable")]
    Unavailable,
    /// The write promise was rejected
    #[error("{0}")]
    Rejected(String),
}

/// Copy text to the clipboard and report the result on the console.
///
/// Without a clipboard this is a silent no-op; a rejected write is logged and
/// otherwise ignored.
pub async fn copy_to_clipboard<P: Page>(page: &mut P, text: &str) {
    match page.write_clipboard(text).await {
        Ok(()) => page.console(ConsoleLine::log(format!("Texte copié: {text}"))),
        Err(ClipboardError::Unavailable) => {
            log::debug!("clipboard unavailable, copy skipped");
        }
        Err(error) => page.console(ConsoleLine::error(format!("Erreur de copie: {error}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;
    use crate::page::ConsoleLevel;

    #[tokio::test]
    async fn test_copy_logs_success() {
        let mut page = MemoryPage::new();

        copy_to_clipboard(&mut page, "contact@example.fr").await;

        assert_eq!(page.clipboard_writes(), ["contact@example.fr"]);
        assert_eq!(page.console_lines().len(), 1);
        assert_eq!(page.console_lines()[0].text, "Texte copié: contact@example.fr");
    }

    #[tokio::test]
    async fn test_copy_rejection_is_logged_as_error() {
        let mut page = MemoryPage::new();
        page.set_clipboard(Err(ClipboardError::Rejected("NotAllowedError".to_string())));

        copy_to_clipboard(&mut page, "secret").await;

        let line = &page.console_lines()[0];
        assert_eq!(line.level, ConsoleLevel::Error);
        assert_eq!(line.text, "Erreur de copie: NotAllowedError");
    }

    #[tokio::test]
    async fn test_copy_without_clipboard_is_silent() {
        let mut page = MemoryPage::new();
        page.set_clipboard(Err(ClipboardError::Unavailable));

        copy_to_clipboard(&mut page, "ignored").await;

        assert!(page.console_lines().is_empty());
        assert!(page.clipboard_writes().is_empty());
    }
}
