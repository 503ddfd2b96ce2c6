// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ANÁLISE ESTÁTICA DE DIAGNÓSTICOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Inspeciona o texto do código (sem executá-lo) procurando erros comuns de
// iniciantes. A ordem das regras é a política de desempate: a primeira
// família encontrada vence, para não sobrecarregar o aluno.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Links de ajuda e redação das sugestões por página.
pub mod guidance;
mod hints;
mod lexical;
/// Parse sem execução e classificação das mensagens do parser.
pub mod syntax_probe;

pub use guidance::{Guidance, HelpTopic};
pub use hints::hints;
pub use lexical::check_lines;
pub use syntax_probe::{classify, parse_error, ProbeFailure};

use crate::config::RunnerConfig;
use crate::types::{Diagnostic, DiagnosticKind};
use crate::utils::column_at;

use lexical::scan_line;

/// Analisador estático de código de aluno
///
/// # Ordem das regras
/// 1. Marcadores `/*` e `*/` desbalanceados
/// 2. String aberta em uma linha e fechada em outra dentro de `console.log(...)`
/// 3. Sonda de sintaxe (parse sem execução)
/// 4. Verificações léxicas linha a linha (podem acumular categorias distintas)
///
/// As regras 1 a 3 retornam imediatamente no primeiro achado.
///
/// # Exemplo
/// ```ignore
/// let analyzer = Analyzer::default();
/// let diags = analyzer.analyze("/ not a real comment", Some("/lessons/introduction"));
/// assert_eq!(diags[0].kind, DiagnosticKind::CommentError);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    guidance: Guidance,
}

impl Analyzer {
    /// Cria um analisador a partir da configuração do runner
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            guidance: Guidance::new(&config.comments_page),
        }
    }

    /// Guidance usada para links e sugestões
    pub fn guidance(&self) -> &Guidance {
        &self.guidance
    }

    /// Analisa o código e retorna os diagnósticos encontrados
    pub fn analyze(&self, code: &str, page: Option<&str>) -> Vec<Diagnostic> {
        if let Some(diag) = self.check_block_comments(code, page) {
            log::debug!("analysis stopped at block comment check");
            return vec![diag];
        }

        if let Some(diag) = self.check_multiline_string(code, page) {
            log::debug!("analysis stopped at multi-line string check");
            return vec![diag];
        }

        if let Some(diag) = self.check_syntax(code, page) {
            log::debug!("analysis stopped at syntax probe: {}", diag.message);
            return vec![diag];
        }

        check_lines(code, page, &self.guidance)
    }

    /// Regra 1: quantidade de `/*` diferente da quantidade de `*/`
    fn check_block_comments(&self, code: &str, page: Option<&str>) -> Option<Diagnostic> {
        let opens = code.matches("/*").count();
        let closes = code.matches("*/").count();

        if opens == closes {
            return None;
        }

        let (marker, message) = if opens > closes {
            (
                "/*",
                "This block comment is never closed. Every /* needs a matching */.",
            )
        } else {
            (
                "*/",
                "Found */ without a matching /*. Block comments must start with /*.",
            )
        };

        let mut diagnostic = Diagnostic::new(DiagnosticKind::CommentError, message);
        let located = if opens > closes {
            // O marcador sobrando é o último aberto
            code.lines()
                .enumerate()
                .filter_map(|(i, l)| l.rfind(marker).map(|pos| (i, l, pos)))
                .last()
        } else {
            code.lines()
                .enumerate()
                .find_map(|(i, l)| l.find(marker).map(|pos| (i, l, pos)))
        };
        if let Some((index, line, pos)) = located {
            diagnostic = diagnostic.at(index + 1, column_at(line, pos));
        }

        Some(self.guidance.decorate(
            diagnostic,
            HelpTopic::Comments,
            page,
            "Check that every /* in your code has a */ to close it.",
            "Block comments start with /* and end with */. Make sure both are there.",
        ))
    }

    /// Regra 2: string aberta dentro de `console.log(` que só fecha em outra linha
    fn check_multiline_string(&self, code: &str, page: Option<&str>) -> Option<Diagnostic> {
        let mut in_console_log = false;
        let mut open: Option<(char, usize, usize)> = None; // (aspa, linha, coluna)

        for (index, line) in code.lines().enumerate() {
            if !in_console_log && line.contains("console.log(") {
                in_console_log = true;
            }

            if in_console_log {
                match open {
                    None => {
                        if let Some((quote, pos)) = scan_line(line).unclosed {
                            open = Some((quote, index + 1, column_at(line, pos)));
                        }
                    }
                    Some((quote, line_no, column)) => {
                        if line.contains(quote) {
                            return Some(self.guidance.decorate(
                                Diagnostic::new(
                                    DiagnosticKind::StringError,
                                    "This string starts on one line and ends on another. Strings must stay on a single line.",
                                )
                                .at(line_no, column),
                                HelpTopic::Strings,
                                page,
                                "Move the closing quote onto the same line as the opening quote.",
                                "Keep the whole text on one line, or use \\n inside the quotes for a line break.",
                            ));
                        }
                    }
                }
            }

            if line.contains(");") {
                in_console_log = false;
                open = None;
            }
        }

        None
    }

    /// Regra 3: parse sem execução
    fn check_syntax(&self, code: &str, page: Option<&str>) -> Option<Diagnostic> {
        let message = parse_error(code)?;

        let mut failure = classify(&message);
        if matches!(failure, ProbeFailure::EndOfInput | ProbeFailure::Other(_))
            && starts_with_lone_slash(code)
        {
            failure = ProbeFailure::RegularExpression;
        }

        let diagnostic = match failure {
            ProbeFailure::RegularExpression => {
                let mut diag = Diagnostic::new(
                    DiagnosticKind::CommentError,
                    "Comments need two slashes (//). A single / confuses JavaScript.",
                );
                if let Some((index, line)) = code.lines().enumerate().find(|(_, l)| l.contains('/')) {
                    let pos = line.find('/').unwrap_or(0);
                    diag = diag.at(index + 1, column_at(line, pos));
                }
                self.guidance.decorate(
                    diag,
                    HelpTopic::Comments,
                    page,
                    "Use two slashes like the examples in this lesson: // your comment",
                    "Start comments with two slashes: // your comment",
                )
            }
            ProbeFailure::Quote => {
                let mut diag = Diagnostic::new(
                    DiagnosticKind::StringError,
                    "There is a problem with a quote. Check that every string opens and closes with the same quote.",
                );
                if let Some((index, line)) = code
                    .lines()
                    .enumerate()
                    .find(|(_, l)| l.contains('"') || l.contains('\''))
                {
                    let pos = line.find(['"', '\'']).unwrap_or(0);
                    diag = diag.at(index + 1, column_at(line, pos));
                }
                self.guidance.decorate(
                    diag,
                    HelpTopic::Strings,
                    page,
                    "Match each opening quote with a closing quote of the same kind.",
                    "Match each opening quote with a closing quote of the same kind: \"text\" or 'text'.",
                )
            }
            ProbeFailure::EndOfInput => Diagnostic::new(
                DiagnosticKind::SyntaxError,
                "Your code looks incomplete. Check for missing closing brackets, parentheses or quotes.",
            ),
            ProbeFailure::Other(raw) => Diagnostic::new(DiagnosticKind::SyntaxError, raw),
        };

        Some(diagnostic)
    }
}

/// Alguma linha começa com uma barra simples (`/` que não é `//` nem `/*`)
fn starts_with_lone_slash(code: &str) -> bool {
    code.lines().any(|l| {
        let t = l.trim_start();
        t.starts_with('/') && !t.starts_with("//") && !t.starts_with("/*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTRO: Option<&str> = Some("/lessons/introduction");

    fn analyze(code: &str) -> Vec<Diagnostic> {
        Analyzer::default().analyze(code, INTRO)
    }

    #[test]
    fn test_default_program_is_clean() {
        assert!(analyze(r#"console.log("Hello, World!");"#).is_empty());
    }

    #[test]
    fn test_unclosed_block_comment() {
        let diags = analyze("/* start\nconsole.log(\"hi\");");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::CommentError);
        assert_eq!(diags[0].line, Some(1));
        assert_eq!(diags[0].column, Some(1));
        assert!(diags[0].help_link.is_some());
    }

    #[test]
    fn test_extra_block_comment_close() {
        let diags = analyze("console.log(\"hi\"); */");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::CommentError);
        assert!(diags[0].message.contains("without a matching"));
    }

    #[test]
    fn test_block_comment_mismatch_hides_other_problems() {
        // Também tem texto sem aspas, mas só o erro de comentário aparece
        let diags = analyze("/* a */ /*\nconsole.log(hello);\n/ oops");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::CommentError);
    }

    #[test]
    fn test_multiline_string_in_console_log() {
        let code = "console.log(\"Hello\nWorld\n\");";
        let diags = analyze(code);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::StringError);
        assert_eq!(diags[0].line, Some(1));
        assert_eq!(diags[0].column, Some(13));
    }

    #[test]
    fn test_lone_slash_comment() {
        let diags = analyze("/ not a real comment");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::CommentError);
        assert!(diags[0].message.contains("two slashes"));
        assert_eq!(diags[0].help_link.as_deref(), Some("/learn/comments"));
    }

    #[test]
    fn test_lone_slash_on_comments_page_has_no_link() {
        let diags = Analyzer::default().analyze("/ not a real comment", Some("/learn/comments"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].help_link.is_none());
        assert!(diags[0].suggestion.as_deref().unwrap_or("").contains("this lesson")
            || diags[0].suggestion.as_deref().unwrap_or("").contains("examples above"));
    }

    #[test]
    fn test_incomplete_code_is_syntax_error() {
        let diags = analyze("if (true) {\nconsole.log(\"hi\");");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::SyntaxError);
        assert!(diags[0].help_link.is_none());
    }

    #[test]
    fn test_parseable_code_reaches_lexical_checks() {
        let diags = analyze("console.log(hello);");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::StringError);
    }

    fn assert_inside_source(code: &str, diagnostic: &Diagnostic) {
        let line = diagnostic.line.expect("line");
        let column = diagnostic.column.expect("column");
        let source_line = code.lines().nth(line - 1).expect("line exists");
        assert!(
            column >= 1 && column <= source_line.chars().count(),
            "{:?} column {} outside {:?}",
            diagnostic.kind,
            column,
            source_line
        );
    }

    #[test]
    fn test_positions_index_into_source() {
        let code = "let a = 1;\n/* open\nconsole.log(a);";
        let diags = analyze(code);
        assert_inside_source(code, &diags[0]);
        let source_line = code.lines().nth(1).unwrap();
        let column = diags[0].column.unwrap();
        assert_eq!(&source_line[column - 1..column + 1], "/*");

        // Uma amostra por regra léxica
        let samples = [
            "/ not a real comment",
            "// console.log(\"hidden\");",
            "console.log \"hi\";",
            "console.log(\"hi\";",
            "console.log(hello);",
            "console.log(\"It's\");",
            "console\n.log(\"hi\");",
            "let out = console.\nlog(\"hi\");",
        ];
        for code in samples {
            let diags = check_lines(code, INTRO, &Guidance::default());
            assert!(!diags.is_empty(), "no diagnostic for {:?}", code);
            for diagnostic in &diags {
                assert_inside_source(code, diagnostic);
            }
        }
    }

    #[test]
    fn test_parser_quote_failure_is_string_error() {
        let diags = analyze(r#"console.log("hi);"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::StringError);
        assert_eq!(diags[0].line, Some(1));
        assert_eq!(diags[0].column, Some(13));
        assert_eq!(diags[0].help_link.as_deref(), Some("/learn/strings"));
    }

    #[test]
    fn test_odd_quote_count_in_console_log() {
        let diags = analyze(r#"console.log("It's fine");"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::StringError);
        assert!(diags[0].message.contains("never closed"));
        assert_inside_source(r#"console.log("It's fine");"#, &diags[0]);
    }

    #[test]
    fn test_raw_parser_message_cites_learner_line() {
        let diags = analyze("let x = ;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::SyntaxError);
        assert!(diags[0].message.contains("line 1,"), "message: {}", diags[0].message);

        let diags = analyze("let a = 1;\nlet x = ;");
        assert!(diags[0].message.contains("line 2,"), "message: {}", diags[0].message);
    }
}
