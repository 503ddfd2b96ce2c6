// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Programa inicial exibido no editor de cada lição.
pub const DEFAULT_PROGRAM: &str = r#"console.log("Hello, World!");"#;

/// Saída produzida pelo programa inicial (sem a quebra de linha).
///
/// Linhas iguais a esta nunca entram no conjunto de saídas únicas.
pub const DEFAULT_OUTPUT: &str = "Hello, World!";

/// Categoria de um diagnóstico
///
/// Todas as categorias de análise estática são recuperáveis: o aluno
/// edita o código e executa novamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Marcadores de comentário errados (`/*` sem `*/`, barra simples...)
    CommentError,
    /// String não fechada ou texto sem aspas
    StringError,
    /// Falha genérica de sintaxe detectada pelo parser
    SyntaxError,
    /// Uso incorreto de `console.log`
    ConsoleError,
    /// Instrução quebrada entre linhas
    NewlineError,
    /// Erro lançado durante a execução no sandbox
    RuntimeError,
}

impl DiagnosticKind {
    /// Retorna o nome da categoria como string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommentError => "CommentError",
            Self::StringError => "StringError",
            Self::SyntaxError => "SyntaxError",
            Self::ConsoleError => "ConsoleError",
            Self::NewlineError => "NewlineError",
            Self::RuntimeError => "RuntimeError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Problema detectado no código do aluno
///
/// `line` e `column` são 1-based e sempre apontam para o texto que
/// produziu o diagnóstico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Categoria do problema
    pub kind: DiagnosticKind,
    /// Mensagem legível para o aluno
    pub message: String,
    /// Linha (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Coluna (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Página de ajuda com a lição relacionada
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_link: Option<String>,
    /// Sugestão de correção
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Cria um diagnóstico sem posição, link ou sugestão
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
            help_link: None,
            suggestion: None,
        }
    }

    /// Define linha e coluna (1-based)
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Define a sugestão de correção
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Define o link de ajuda (ou remove, com `None`)
    pub fn with_help_link(mut self, link: Option<String>) -> Self {
        self.help_link = link;
        self
    }

    /// Erro de execução com a mensagem original do engine
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::RuntimeError, message)
    }
}

/// Resultado publicado a cada execução
///
/// Criado do zero a cada execução, substituindo o anterior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Saída acumulada de `console.log`
    pub output: String,
    /// Diagnósticos (vazio em execuções bem-sucedidas)
    pub diagnostics: Vec<Diagnostic>,
    /// Dicas não bloqueantes
    pub hints: Vec<String>,
}

impl RunResult {
    /// Resultado bloqueado pela análise estática: nunca tem saída
    pub fn blocked(diagnostics: Vec<Diagnostic>, hints: Vec<String>) -> Self {
        Self {
            output: String::new(),
            diagnostics,
            hints,
        }
    }

    /// Resultado de uma execução sem erros
    pub fn success(output: String, hints: Vec<String>) -> Self {
        Self {
            output,
            diagnostics: vec![],
            hints,
        }
    }

    /// Verifica se a execução foi bem-sucedida
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Estado acumulado consultado pelas regras de conquistas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Execuções sem diagnóstico desde a montagem do componente
    pub run_count: u32,
    /// Código da última execução
    pub code: String,
    /// Linhas de saída únicas, normalizadas, diferentes da saída padrão
    pub unique_output_lines: BTreeSet<String>,
    /// Página da lição (chave das regras)
    pub page: Option<String>,
}

impl RunContext {
    /// Cria um contexto vazio para uma página
    pub fn for_page(page: Option<&str>) -> Self {
        Self {
            page: page.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Entrada do catálogo de conquistas (imutável)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Identificador único (ex: "first-program")
    pub id: String,
    /// Título exibido
    pub title: String,
    /// Descrição do que foi conquistado
    pub description: String,
    /// Pontos de experiência (positivo)
    pub xp: u32,
    /// Ícone (emoji)
    pub icon: String,
    /// Lição onde a conquista pode ser obtida
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_path: Option<String>,
}

/// Conquista registrada para um usuário no store externo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievement {
    /// Usuário dono da conquista
    pub user_id: String,
    /// Conquista obtida
    pub achievement_id: String,
    /// Momento do registro
    pub earned_at: DateTime<Utc>,
}

impl EarnedAchievement {
    /// Cria um registro com timestamp atual
    pub fn now(user_id: &str, achievement_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            achievement_id: achievement_id.to_string(),
            earned_at: Utc::now(),
        }
    }
}
