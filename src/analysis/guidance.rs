// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LINKS DE AJUDA E SUGESTÕES POR PÁGINA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Cada diagnóstico aponta para a lição que explica o assunto. Se o aluno
// já está nessa lição, o link é omitido e a sugestão muda de tom.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::config::DEFAULT_COMMENTS_PAGE;
use crate::types::Diagnostic;

/// Lição de strings
pub const STRINGS_PAGE: &str = "/learn/strings";
/// Lição de console.log
pub const CONSOLE_PAGE: &str = "/learn/console-log";
/// Lição de instruções e quebras de linha
pub const STATEMENTS_PAGE: &str = "/learn/statements";

/// Assunto de ajuda associado a um diagnóstico
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    /// Comentários (`//` e `/* */`)
    Comments,
    /// Strings e aspas
    Strings,
    /// `console.log`
    ConsoleLog,
    /// Instruções e quebras de linha
    Statements,
}

/// Resolve links de ajuda e a redação das sugestões para a página atual
#[derive(Debug, Clone)]
pub struct Guidance {
    comments_page: String,
}

impl Default for Guidance {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENTS_PAGE)
    }
}

impl Guidance {
    /// Cria guidance com o caminho configurado da lição de comentários
    pub fn new(comments_page: &str) -> Self {
        Self {
            comments_page: comments_page.to_string(),
        }
    }

    /// Página que explica o assunto
    pub fn page_for(&self, topic: HelpTopic) -> &str {
        match topic {
            HelpTopic::Comments => &self.comments_page,
            HelpTopic::Strings => STRINGS_PAGE,
            HelpTopic::ConsoleLog => CONSOLE_PAGE,
            HelpTopic::Statements => STATEMENTS_PAGE,
        }
    }

    /// Verifica se o aluno já está na lição do assunto
    pub fn is_on_topic_page(&self, topic: HelpTopic, page: Option<&str>) -> bool {
        page == Some(self.page_for(topic))
    }

    /// Link de ajuda, omitido quando o aluno já está na página
    pub fn help_link(&self, topic: HelpTopic, page: Option<&str>) -> Option<String> {
        if self.is_on_topic_page(topic, page) {
            None
        } else {
            Some(self.page_for(topic).to_string())
        }
    }

    /// Anexa link e sugestão adaptada à página.
    ///
    /// `here` é usada quando o aluno está na lição do assunto, `elsewhere` nos demais casos.
    pub fn decorate(
        &self,
        diagnostic: Diagnostic,
        topic: HelpTopic,
        page: Option<&str>,
        here: &str,
        elsewhere: &str,
    ) -> Diagnostic {
        let suggestion = if self.is_on_topic_page(topic, page) {
            here
        } else {
            elsewhere
        };

        diagnostic
            .with_help_link(self.help_link(topic, page))
            .with_suggestion(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiagnosticKind;

    #[test]
    fn test_help_link_omitted_on_same_page() {
        let guidance = Guidance::default();

        assert_eq!(
            guidance.help_link(HelpTopic::Comments, Some("/lessons/introduction")),
            Some("/learn/comments".to_string())
        );
        assert_eq!(guidance.help_link(HelpTopic::Comments, Some("/learn/comments")), None);
        assert_eq!(
            guidance.help_link(HelpTopic::Strings, None),
            Some(STRINGS_PAGE.to_string())
        );
    }

    #[test]
    fn test_custom_comments_page() {
        let guidance = Guidance::new("/course/comments");
        assert!(guidance.is_on_topic_page(HelpTopic::Comments, Some("/course/comments")));
        assert!(!guidance.is_on_topic_page(HelpTopic::Comments, Some("/learn/comments")));
    }

    #[test]
    fn test_decorate_switches_wording() {
        let guidance = Guidance::default();
        let base = Diagnostic::new(DiagnosticKind::CommentError, "msg");

        let here = guidance.decorate(base.clone(), HelpTopic::Comments, Some("/learn/comments"), "A", "B");
        assert_eq!(here.suggestion.as_deref(), Some("A"));
        assert!(here.help_link.is_none());

        let away = guidance.decorate(base, HelpTopic::Comments, None, "A", "B");
        assert_eq!(away.suggestion.as_deref(), Some("B"));
        assert_eq!(away.help_link.as_deref(), Some("/learn/comments"));
    }
}
