// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GERADOR DE DICAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::utils::{has_digit, has_quote};

/// Dicas de incentivo, independentes dos diagnósticos.
///
/// Todas as dicas aplicáveis são retornadas juntas, na ordem abaixo.
pub fn hints(code: &str) -> Vec<String> {
    let mut tips = Vec::new();

    if code.contains("console.log") {
        if !has_quote(code) {
            tips.push("Try printing a message in quotes, like console.log(\"Hi!\").".to_string());
        }
        if !has_digit(code) {
            tips.push("You can print numbers too: console.log(42).".to_string());
        }
        if !code.contains(',') {
            tips.push(
                "console.log can print several values at once: console.log(\"Age:\", 12)."
                    .to_string(),
            );
        }
    }

    let first_line_blank = code.split('\n').next().map_or(true, |l| l.trim().is_empty());
    if first_line_blank {
        tips.push("Start your code on line 1 so it is easier to read.".to_string());
    }

    if code.lines().any(|l| l.trim_start().starts_with("//")) {
        tips.push("Remember: lines starting with // are comments and do not run.".to_string());
    }

    tips
}
