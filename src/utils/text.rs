// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para processamento de texto:
// - Neutralização de HTML na saída do console
// - Normalização de linhas de saída
// - Conversão de offsets em colunas 1-based
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Neutraliza markup antes de exibir texto vindo do código do aluno.
///
/// Escapa `&`, `<` e `>`, o suficiente para que nenhuma tag seja
/// interpretada pela camada de apresentação. Texto comum passa intacto.
pub fn sanitize_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Normaliza uma linha de saída: remove espaços nas pontas e descarta vazias
pub fn normalize_output_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Converte um offset em bytes dentro da linha para coluna 1-based (em caracteres)
pub fn column_at(line: &str, byte_offset: usize) -> usize {
    let mut end = byte_offset.min(line.len());
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].chars().count() + 1
}

/// Verifica se o texto contém pelo menos um dígito ASCII
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Verifica se o texto contém aspas simples ou duplas
pub fn has_quote(text: &str) -> bool {
    text.contains('"') || text.contains('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_html_plain_text_untouched() {
        assert_eq!(sanitize_html("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_sanitize_html_neutralizes_tags() {
        assert_eq!(
            sanitize_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert('x')&lt;/script&gt;"
        );
        assert_eq!(sanitize_html("a & b"), "a &amp; b");
    }

    #[test]
    fn test_normalize_output_line() {
        assert_eq!(normalize_output_line("  hi  "), Some("hi".to_string()));
        assert_eq!(normalize_output_line("   "), None);
        assert_eq!(normalize_output_line(""), None);
    }

    #[test]
    fn test_column_at() {
        assert_eq!(column_at("console.log(\"x", 12), 13);
        assert_eq!(column_at("abc", 0), 1);
        // "é" ocupa 2 bytes mas 1 coluna
        assert_eq!(column_at("é\"", 2), 2);
        assert_eq!(column_at("abc", 99), 4);
    }

    #[test]
    fn test_char_helpers() {
        assert!(has_digit("x = 42"));
        assert!(!has_digit("hello"));
        assert!(has_quote("'x'"));
        assert!(!has_quote("age"));
    }
}
