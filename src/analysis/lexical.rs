// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VERIFICAÇÕES LÉXICAS LINHA A LINHA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Heurísticas de texto para erros comuns de iniciantes. Não é um parser:
// os falsos positivos e negativos fazem parte do comportamento esperado.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::guidance::{Guidance, HelpTopic};
use crate::types::{Diagnostic, DiagnosticKind};
use crate::utils::{column_at, has_digit, has_quote};

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:let|const|var|function)\s+([A-Za-z_$][\w$]*)").unwrap());

static FUNCTION_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\b[^(]*\(([^)]*)\)").unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*").unwrap());

/// Nomes que podem aparecer em `console.log(...)` sem aspas e sem declaração
const KNOWN_NAMES: &[&str] = &[
    "true", "false", "null", "undefined", "NaN", "Infinity", "Math", "Date", "parseInt",
    "parseFloat", "String", "Number", "Array", "new", "typeof",
];

/// Regra léxica que produziu um diagnóstico.
///
/// Cada regra aparece no máximo uma vez no resultado, mesmo quando duas
/// regras compartilham o mesmo `DiagnosticKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LexicalRule {
    LoneSlash,
    CommentedOutCode,
    MissingParen,
    UnclosedParen,
    BareText,
    OddQuotes,
    SplitStatement,
}

/// Resultado da varredura de strings de uma linha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LineScan {
    /// Aspa (`"` ou `'`) aberta e não fechada na linha, com seu offset em bytes
    pub unclosed: Option<(char, usize)>,
    /// Offset de um `//` fora de string
    pub comment_start: Option<usize>,
}

/// Percorre a linha acompanhando strings, escapes e comentários de linha
pub(crate) fn scan_line(line: &str) -> LineScan {
    let mut scan = LineScan::default();
    let mut open: Option<(char, usize)> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match open {
            Some((quote, _)) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    open = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => open = Some((c, i)),
                '/' if matches!(chars.peek(), Some((_, '/'))) => {
                    scan.comment_start = Some(i);
                    break;
                }
                _ => {}
            },
        }
    }

    scan.unclosed = open.filter(|(quote, _)| *quote != '`');
    scan
}

/// Identificadores declarados no buffer (variáveis, funções e parâmetros)
pub(crate) fn declared_names(code: &str) -> HashSet<String> {
    let mut names: HashSet<String> = DECLARATION
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect();

    for caps in FUNCTION_PARAMS.captures_iter(code) {
        for param in caps[1].split(',') {
            let param = param.trim();
            if !param.is_empty() {
                names.insert(param.to_string());
            }
        }
    }

    names
}

/// Parte da linha antes de um comentário `//`
fn code_part(line: &str) -> &str {
    match scan_line(line).comment_start {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Procura uma barra solta: nem `//`, nem `/*`, nem `*/`, fora de string
/// e que não seja uma divisão entre dois operandos.
fn lone_slash(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'/' {
            continue;
        }

        let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
        let next = bytes.get(i + 1).copied();

        // Qualquer coisa depois de `//` é comentário
        if next == Some(b'/') {
            return None;
        }
        if next == Some(b'*') || prev == Some(b'*') || prev == Some(b'/') {
            continue;
        }
        if has_quote(&line[..i]) {
            continue;
        }
        if is_division(line, i) {
            continue;
        }

        return Some(i);
    }

    None
}

/// Verifica se a barra na posição `i` está entre dois operandos (`a / b`)
fn is_division(line: &str, i: usize) -> bool {
    let before = line[..i].trim_end();
    let after = line[i + 1..].trim_start();

    let left_operand = before
        .chars()
        .last()
        .map(|c| c.is_alphanumeric() || c == '_' || c == ')' || c == ']')
        .unwrap_or(false);
    let right_operand = after
        .chars()
        .next()
        .map(|c| c.is_alphanumeric() || c == '_' || c == '(' || c == '-')
        .unwrap_or(false);

    left_operand && right_operand
}

/// Texto entre o `(` de `console.log(` e o último `)` da linha
fn console_argument(code: &str, open_paren: usize) -> &str {
    let rest = &code[open_paren + 1..];
    match rest.rfind(')') {
        Some(close) => &rest[..close],
        None => rest,
    }
}

/// Aspa com contagem ímpar no argumento, com o offset da última ocorrência.
///
/// Conta `"` e `'` sem olhar para escapes nem para aspas de outro tipo, então
/// `"It's"` também é sinalizado.
fn odd_quote(argument: &str) -> Option<usize> {
    ['"', '\'']
        .into_iter()
        .find(|&quote| argument.matches(quote).count() % 2 == 1)
        .and_then(|quote| argument.rfind(quote))
}

/// Verifica se um argumento sem aspas e sem números é só texto solto.
///
/// Argumentos formados apenas por nomes declarados ou conhecidos não contam.
fn is_bare_text(argument: &str, declared: &HashSet<String>) -> bool {
    let argument = argument.trim();
    if argument.is_empty() || has_quote(argument) || has_digit(argument) {
        return false;
    }

    IDENTIFIER.find_iter(argument).any(|m| {
        let after_dot = argument[..m.start()].trim_end().ends_with('.');
        !after_dot && !declared.contains(m.as_str()) && !KNOWN_NAMES.contains(&m.as_str())
    })
}

/// Executa as verificações em uma linha e retorna o primeiro achado
fn check_line(
    line: &str,
    line_no: usize,
    declared: &HashSet<String>,
    guidance: &Guidance,
    page: Option<&str>,
) -> Option<(LexicalRule, Diagnostic)> {
    // 1. Barra simples no lugar de comentário
    if let Some(i) = lone_slash(line) {
        return Some((LexicalRule::LoneSlash, guidance.decorate(
            Diagnostic::new(
                DiagnosticKind::CommentError,
                "Comments need two slashes (//). A single / is not a comment.",
            )
            .at(line_no, column_at(line, i)),
            HelpTopic::Comments,
            page,
            "Add a second slash so the line reads // like the examples above.",
            "Start a comment with two slashes: // your note here",
        )));
    }

    // 2. Código acidentalmente comentado
    if let Some(start) = scan_line(line).comment_start {
        let commented = &line[start + 2..];
        if commented.contains("console.log") || commented.contains("function") {
            return Some((LexicalRule::CommentedOutCode, guidance.decorate(
                Diagnostic::new(
                    DiagnosticKind::CommentError,
                    "This code is inside a comment, so it will not run.",
                )
                .at(line_no, column_at(line, start)),
                HelpTopic::Comments,
                page,
                "Remove the // in front of the code you want to run.",
                "Remove the // in front of the code you want to run. Comments are ignored by JavaScript.",
            )));
        }
    }

    let code = code_part(line);

    if let Some(pos) = code.find("console.log") {
        let after = &code[pos + "console.log".len()..];
        let trimmed_after = after.trim_start();

        // 3. console.log sem parênteses
        if !trimmed_after.starts_with('(') {
            return Some((LexicalRule::MissingParen, guidance.decorate(
                Diagnostic::new(
                    DiagnosticKind::ConsoleError,
                    "console.log needs parentheses around what you want to print.",
                )
                .at(line_no, column_at(line, pos)),
                HelpTopic::ConsoleLog,
                page,
                "Write it as console.log(\"your text\").",
                "Write it as console.log(\"your text\"). The parentheses tell JavaScript what to print.",
            )));
        }

        let open_paren = pos + "console.log".len() + (after.len() - trimmed_after.len());

        // 4. Parêntese não fechado
        if !code[open_paren..].contains(')') {
            return Some((LexicalRule::UnclosedParen, guidance.decorate(
                Diagnostic::new(
                    DiagnosticKind::ConsoleError,
                    "This console.log has an unclosed parenthesis.",
                )
                .at(line_no, column_at(line, open_paren)),
                HelpTopic::ConsoleLog,
                page,
                "Add a closing ) after the value you print.",
                "Every ( needs a matching ). Add a closing ) after the value you print.",
            )));
        }

        let argument = console_argument(code, open_paren);

        // 5. Texto sem aspas
        if is_bare_text(argument, declared) {
            return Some((LexicalRule::BareText, guidance.decorate(
                Diagnostic::new(
                    DiagnosticKind::StringError,
                    "Text must be wrapped in quotes to be printed.",
                )
                .at(line_no, column_at(line, open_paren + 1)),
                HelpTopic::Strings,
                page,
                "Put quotes around the text: console.log(\"Hello\").",
                "Put quotes around the text: console.log(\"Hello\"). Without quotes JavaScript looks for a variable with that name.",
            )));
        }

        // 6. Quantidade ímpar de `"` ou de `'` dentro da chamada
        if let Some(offset) = odd_quote(argument) {
            let quote_pos = open_paren + 1 + offset;
            return Some((LexicalRule::OddQuotes, guidance.decorate(
                Diagnostic::new(
                    DiagnosticKind::StringError,
                    "This string is never closed. Strings need a quote at both ends.",
                )
                .at(line_no, column_at(line, quote_pos)),
                HelpTopic::Strings,
                page,
                "Add the matching closing quote at the end of the text.",
                "Add the matching closing quote. If you open with \" close with \", if you open with ' close with '.",
            )));
        }
    }

    // 7. Instrução quebrada entre linhas
    let trimmed = code.trim_end();
    if trimmed.ends_with("console") || trimmed.ends_with("console.") {
        let start = trimmed.rfind("console").unwrap_or(0);
        return Some((LexicalRule::SplitStatement, guidance.decorate(
            Diagnostic::new(
                DiagnosticKind::NewlineError,
                "This statement is split across lines. Keep console.log(...) on one line.",
            )
            .at(line_no, column_at(line, start)),
            HelpTopic::Statements,
            page,
            "Join this line with the next one so the whole statement is on a single line.",
            "Join this line with the next one so console.log(...) is written on a single line.",
        )));
    }

    None
}

/// Verificações linha a linha.
///
/// Cada regra aparece no máximo uma vez (a primeira linha vence),
/// mas regras diferentes em linhas diferentes se acumulam.
pub fn check_lines(code: &str, page: Option<&str>, guidance: &Guidance) -> Vec<Diagnostic> {
    let declared = declared_names(code);
    let mut seen: HashSet<LexicalRule> = HashSet::new();
    let mut diagnostics = Vec::new();

    for (index, line) in code.lines().enumerate() {
        if let Some((rule, diagnostic)) = check_line(line, index + 1, &declared, guidance, page) {
            if seen.insert(rule) {
                diagnostics.push(diagnostic);
            }
        }
    }

    diagnostics
}
