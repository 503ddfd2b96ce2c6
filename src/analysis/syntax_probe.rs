// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SONDA DE SINTAXE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Faz o parse do código (sem executar) e classifica a mensagem de erro do
// parser em uma das famílias que o aluno entende.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use boa_engine::{Context, Script, Source};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Posição no formato do Boa: `line N, col M`
static WRAPPED_POSITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bline (\d+), col").unwrap());

/// Família de uma falha de parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// Barra solta interpretada como expressão regular
    RegularExpression,
    /// Token inesperado vindo de uma aspa
    Quote,
    /// Código terminou antes do esperado
    EndOfInput,
    /// Qualquer outra mensagem, repassada como está
    Other(String),
}

/// Envolve o código como corpo de função, como o sandbox faz ao executar.
pub(crate) fn wrap_as_function_body(code: &str) -> String {
    format!("(function () {{\n{}\n}})", code)
}

/// Converte as linhas citadas numa mensagem do engine (código envolvido)
/// para as linhas do código do aluno.
pub(crate) fn to_source_lines(message: &str) -> String {
    WRAPPED_POSITION
        .replace_all(message, |caps: &Captures<'_>| {
            let wrapped: usize = caps[1].parse().unwrap_or(1);
            format!("line {}, col", wrapped.saturating_sub(1).max(1))
        })
        .into_owned()
}

/// Faz o parse do código sem executá-lo.
///
/// Retorna a mensagem do parser em caso de falha.
pub fn parse_error(code: &str) -> Option<String> {
    let mut context = Context::default();
    let wrapped = wrap_as_function_body(code);

    match Script::parse(Source::from_bytes(&wrapped), None, &mut context) {
        Ok(_) => None,
        Err(e) => Some(to_source_lines(&e.to_string())),
    }
}

/// Classifica a mensagem do parser.
///
/// Aceita tanto a redação dos navegadores ("Invalid regular expression",
/// "Invalid or unexpected token", "Unexpected end of input") quanto a do Boa
/// ("abrupt end on regular expression", "unterminated string literal", "abrupt end").
pub fn classify(message: &str) -> ProbeFailure {
    let lower = message.to_lowercase();

    if lower.contains("regular expression") || lower.contains("regexp") {
        return ProbeFailure::RegularExpression;
    }

    let quote_token = lower.contains("unexpected token '\"")
        || lower.contains("unexpected token '''")
        || lower.contains("unexpected token \"")
        || lower.contains("unexpected string");
    if lower.contains("invalid or unexpected token")
        || lower.contains("string literal")
        || lower.contains("unterminated string")
        || quote_token
    {
        return ProbeFailure::Quote;
    }

    if lower.contains("end of input") || lower.contains("abrupt end") {
        return ProbeFailure::EndOfInput;
    }

    ProbeFailure::Other(message.to_string())
}
