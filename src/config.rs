// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO RUNNER E DO STORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações do sandbox, das páginas de ajuda e do backend de
// persistência de conquistas. Todas podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::path::PathBuf;

/// Caminho padrão da lição de comentários
pub const DEFAULT_COMMENTS_PAGE: &str = "/learn/comments";

/// Configuração do runner de lições.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Limite de iterações de loop dentro do sandbox.
    /// Padrão: 100_000
    pub loop_iteration_limit: u64,

    /// Limite de profundidade de recursão dentro do sandbox.
    /// Padrão: 512
    pub recursion_limit: usize,

    /// Caminho da lição de comentários.
    /// Quando o aluno já está nela, o link de ajuda é omitido.
    pub comments_page: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 100_000,
            recursion_limit: 512,
            comments_page: DEFAULT_COMMENTS_PAGE.to_string(),
        }
    }
}

/// Backend de persistência de conquistas.
///
/// - `Memory`: tudo em memória (testes, sessões descartáveis)
/// - `Local`: um arquivo JSON por usuário em disco (padrão)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Store em memória.
    Memory,
    /// Store local em arquivos JSON.
    #[default]
    Local,
}

impl StoreBackend {
    /// Converte string do .env para StoreBackend.
    ///
    /// Case-insensitive:
    /// - "memory" → Memory
    /// - "local" ou qualquer outro valor → Local
    pub fn from_env(value: &str) -> Self {
        match value.to_lowercase().trim() {
            "memory" => Self::Memory,
            _ => Self::Local,
        }
    }

    /// Retorna nome legível para logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuração do store de conquistas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend escolhido.
    pub backend: StoreBackend,
    /// Diretório dos arquivos JSON (backend local).
    pub directory: PathBuf,
    /// Usuário atual.
    pub user_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            directory: PathBuf::from("./progress"),
            user_id: "anonymous".to_string(),
        }
    }
}

/// Lê um inteiro positivo de uma variável de ambiente.
///
/// Valores ausentes retornam `None`; valores inválidos são logados e ignorados.
fn positive_from_env<T: std::str::FromStr + PartialOrd + Default>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Some(value),
        _ => {
            log::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}

/// Carrega configuração do runner a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `CODE_QUEST_LOOP_LIMIT`: Limite de iterações de loop (padrão: 100000)
/// - `CODE_QUEST_RECURSION_LIMIT`: Limite de recursão (padrão: 512)
/// - `CODE_QUEST_COMMENTS_PAGE`: Caminho da lição de comentários (padrão: /learn/comments)
pub fn load_runner_config() -> RunnerConfig {
    let mut config = RunnerConfig::default();

    if let Some(limit) = positive_from_env::<u64>("CODE_QUEST_LOOP_LIMIT") {
        config.loop_iteration_limit = limit;
        log::info!("📦 CODE_QUEST_LOOP_LIMIT={}", limit);
    }

    if let Some(limit) = positive_from_env::<usize>("CODE_QUEST_RECURSION_LIMIT") {
        config.recursion_limit = limit;
        log::info!("📦 CODE_QUEST_RECURSION_LIMIT={}", limit);
    }

    if let Ok(page) = std::env::var("CODE_QUEST_COMMENTS_PAGE") {
        if !page.trim().is_empty() {
            config.comments_page = page.trim().to_string();
            log::info!("📦 CODE_QUEST_COMMENTS_PAGE={}", config.comments_page);
        }
    }

    config
}

/// Carrega configuração do store a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `CODE_QUEST_STORE`: Backend ("memory", "local") - padrão: "local"
/// - `CODE_QUEST_STORE_DIR`: Diretório do backend local (padrão: ./progress)
/// - `CODE_QUEST_USER`: Usuário atual (padrão: anonymous)
pub fn load_store_config() -> StoreConfig {
    let mut config = StoreConfig::default();

    if let Ok(backend) = std::env::var("CODE_QUEST_STORE") {
        config.backend = StoreBackend::from_env(&backend);
    }

    if let Ok(dir) = std::env::var("CODE_QUEST_STORE_DIR") {
        if !dir.trim().is_empty() {
            config.directory = PathBuf::from(dir.trim());
        }
    }

    if let Ok(user) = std::env::var("CODE_QUEST_USER") {
        if !user.trim().is_empty() {
            config.user_id = user.trim().to_string();
        }
    }

    log::info!(
        "🔧 Store: {} (dir: {}, user: {})",
        config.backend,
        config.directory.display(),
        config.user_id
    );

    config
}
