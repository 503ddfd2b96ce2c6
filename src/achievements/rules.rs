// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MOTOR DE REGRAS DE CONQUISTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Função pura: (contexto da execução, ids já obtidos) → conquistas novas.
// Cada página tem uma lista ordenada de predicados independentes; a ordem
// de declaração define a ordem da saída.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::catalog::{AchievementCatalog, INTRODUCTION_PAGE, VARIABLES_PAGE};
use crate::types::{Achievement, RunContext, DEFAULT_PROGRAM};
use crate::utils::has_quote;

static DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:let|const|var)\s+[A-Za-z_$]").unwrap());

static DECLARED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:let|const|var)\s+([A-Za-z_$][\w$]*)").unwrap());

static NUMBER_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:let|const|var)\s+[A-Za-z_$][\w$]*\s*=\s*-?\d").unwrap());

static CAMEL_CASE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:let|const|var)\s+[a-z_$][\w$]*[A-Z][\w$]*").unwrap());

static BOOLEAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:true|false)\b").unwrap());

static NULLISH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:null|undefined)\b").unwrap());

static ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[\s\S]*?\]").unwrap());

static OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*?\}").unwrap());

/// Uma regra: id da conquista + predicado sobre o contexto
struct Rule {
    id: &'static str,
    predicate: fn(&RunContext) -> bool,
}

/// Conjunto de regras de uma página
struct RuleSet {
    page: &'static str,
    rules: &'static [Rule],
}

const INTRODUCTION_RULES: &[Rule] = &[
    // A ausência em earned_ids é a condição; chegar aqui já implica execução sem erros
    Rule { id: "first-program", predicate: |_| true },
    Rule { id: "hello-coder", predicate: |ctx| ctx.code.contains("Hello") },
    Rule { id: "quick-learner", predicate: |ctx| ctx.run_count == 1 },
    Rule { id: "code-explorer", predicate: |ctx| ctx.run_count >= 3 },
    Rule { id: "creative-coder", predicate: |ctx| !ctx.unique_output_lines.is_empty() },
    Rule {
        id: "personalized-hello",
        predicate: |ctx| ctx.code.contains("Hello") && ctx.code.trim() != DEFAULT_PROGRAM.trim(),
    },
];

const VARIABLES_RULES: &[Rule] = &[
    Rule { id: "variable-master", predicate: |ctx| DECLARATION.is_match(&ctx.code) },
    Rule { id: "string-sage", predicate: |ctx| has_quote(&ctx.code) },
    Rule { id: "number-ninja", predicate: |ctx| NUMBER_DECLARATION.is_match(&ctx.code) },
    Rule { id: "boolean-boss", predicate: |ctx| BOOLEAN.is_match(&ctx.code) },
    Rule { id: "array-ace", predicate: |ctx| ARRAY.is_match(&ctx.code) },
    Rule { id: "object-expert", predicate: |ctx| OBJECT.is_match(&ctx.code) },
    Rule { id: "name-wizard", predicate: |ctx| CAMEL_CASE_DECLARATION.is_match(&ctx.code) },
    Rule { id: "value-changer", predicate: |ctx| has_reassignment(&ctx.code) },
    Rule { id: "null-navigator", predicate: |ctx| NULLISH.is_match(&ctx.code) },
];

const RULE_SETS: &[RuleSet] = &[
    RuleSet { page: INTRODUCTION_PAGE, rules: INTRODUCTION_RULES },
    RuleSet { page: VARIABLES_PAGE, rules: VARIABLES_RULES },
];

/// Uma variável declarada recebe nova atribuição em uma linha posterior,
/// sem nova palavra-chave de declaração (`x = 2`, `x += 1`).
fn has_reassignment(code: &str) -> bool {
    let lines: Vec<&str> = code.lines().collect();

    for (decl_line, line) in lines.iter().enumerate() {
        for caps in DECLARED_NAME.captures_iter(line) {
            let name = regex::escape(&caps[1]);
            let Ok(assignment) = Regex::new(&format!(r"^\s*{}\s*[+\-*/]?=(?:[^=]|$)", name)) else {
                continue;
            };

            if lines[decl_line + 1..].iter().any(|later| assignment.is_match(later)) {
                return true;
            }
        }
    }

    false
}

/// Motor de regras (puro e determinístico)
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: Arc<AchievementCatalog>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(Arc::new(AchievementCatalog::builtin()))
    }
}

impl RuleEngine {
    /// Cria o motor sobre um catálogo
    pub fn new(catalog: Arc<AchievementCatalog>) -> Self {
        Self { catalog }
    }

    /// Catálogo usado para montar as conquistas
    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Páginas com regras
    pub fn pages() -> impl Iterator<Item = &'static str> {
        RULE_SETS.iter().map(|set| set.page)
    }

    /// Avalia as regras da página do contexto.
    ///
    /// Retorna vazio para páginas ausentes ou desconhecidas. Conquistas já
    /// presentes em `earned_ids` nunca aparecem, mesmo com o predicado satisfeito.
    pub fn evaluate(&self, context: &RunContext, earned_ids: &HashSet<String>) -> Vec<Achievement> {
        let Some(page) = context.page.as_deref() else {
            return Vec::new();
        };
        let Some(set) = RULE_SETS.iter().find(|set| set.page == page) else {
            return Vec::new();
        };

        set.rules
            .iter()
            .filter(|rule| !earned_ids.contains(rule.id))
            .filter(|rule| (rule.predicate)(context))
            .filter_map(|rule| match self.catalog.require(rule.id) {
                Ok(achievement) => Some(achievement.clone()),
                Err(e) => {
                    log::warn!("⚠️ Skipping rule: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(page: &str, code: &str, run_count: u32) -> RunContext {
        RunContext {
            run_count,
            code: code.to_string(),
            page: Some(page.to_string()),
            ..Default::default()
        }
    }

    fn ids(achievements: &[Achievement]) -> Vec<&str> {
        achievements.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_no_page_no_achievements() {
        let engine = RuleEngine::default();
        let mut ctx = context(INTRODUCTION_PAGE, DEFAULT_PROGRAM, 1);
        ctx.page = None;
        assert!(engine.evaluate(&ctx, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_unknown_page_no_achievements() {
        let engine = RuleEngine::default();
        let ctx = context("/learn/comments", DEFAULT_PROGRAM, 1);
        assert!(engine.evaluate(&ctx, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_first_run_of_default_program() {
        let engine = RuleEngine::default();
        let ctx = context(INTRODUCTION_PAGE, DEFAULT_PROGRAM, 1);
        let result = engine.evaluate(&ctx, &HashSet::new());
        assert_eq!(ids(&result), vec!["first-program", "hello-coder", "quick-learner"]);
    }

    #[test]
    fn test_personalized_hello_and_creative_coder() {
        let engine = RuleEngine::default();
        let mut ctx = context(INTRODUCTION_PAGE, r#"console.log("Hello there!");"#, 2);
        ctx.unique_output_lines.insert("Hello there!".to_string());

        let earned: HashSet<String> = ["first-program", "hello-coder", "quick-learner"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = engine.evaluate(&ctx, &earned);
        assert_eq!(ids(&result), vec!["creative-coder", "personalized-hello"]);
    }

    #[test]
    fn test_code_explorer_after_three_runs() {
        let engine = RuleEngine::default();
        let ctx = context(INTRODUCTION_PAGE, "console.log(1);", 3);
        assert!(ids(&engine.evaluate(&ctx, &HashSet::new())).contains(&"code-explorer"));
    }

    #[test]
    fn test_earned_ids_are_excluded() {
        let engine = RuleEngine::default();
        let ctx = context(INTRODUCTION_PAGE, DEFAULT_PROGRAM, 1);
        let earned: HashSet<String> = engine
            .catalog()
            .for_lesson(INTRODUCTION_PAGE)
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert!(engine.evaluate(&ctx, &earned).is_empty());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let engine = RuleEngine::default();
        let ctx = context(VARIABLES_PAGE, "let isReady = true;\nlet items = [1, 2];", 4);
        let earned = HashSet::new();
        assert_eq!(engine.evaluate(&ctx, &earned), engine.evaluate(&ctx, &earned));
    }

    #[test]
    fn test_value_changer_and_number_ninja() {
        let engine = RuleEngine::default();
        let ctx = context(
            VARIABLES_PAGE,
            "let age = 25;\nconsole.log(age);\nage = 30;\nconsole.log(age);",
            1,
        );
        let awarded = engine.evaluate(&ctx, &HashSet::new());
        let result = ids(&awarded);
        assert!(result.contains(&"value-changer"));
        assert!(result.contains(&"number-ninja"));
        assert!(result.contains(&"variable-master"));
        assert!(!result.contains(&"string-sage"));
    }

    #[test]
    fn test_variables_rules() {
        let engine = RuleEngine::default();
        let code = r#"const userName = "Ana";
let scores = [1, 2];
let profile = { active: false };
let nothing = null;"#;
        let awarded = engine.evaluate(&context(VARIABLES_PAGE, code, 1), &HashSet::new());
        let result = ids(&awarded);
        assert_eq!(
            result,
            vec![
                "variable-master",
                "string-sage",
                "boolean-boss",
                "array-ace",
                "object-expert",
                "name-wizard",
                "null-navigator",
            ]
        );
    }

    #[test]
    fn test_reassignment_detection() {
        assert!(has_reassignment("let x = 1;\nx = 2;"));
        assert!(has_reassignment("let total = 1;\n  total += 5;"));
        // Comparação não é atribuição
        assert!(!has_reassignment("let x = 1;\nx == 2;"));
        // Nova declaração não conta
        assert!(!has_reassignment("let x = 1;\nlet y = 2;"));
        // Atribuição antes da declaração não conta
        assert!(!has_reassignment("x = 2;\nvar x = 1;"));
    }

    #[test]
    fn test_pages() {
        let pages: Vec<_> = RuleEngine::pages().collect();
        assert_eq!(pages, vec![INTRODUCTION_PAGE, VARIABLES_PAGE]);
    }
}
