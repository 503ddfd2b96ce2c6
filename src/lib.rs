//! # Code Quest - Runner de código para lições de programação
//!
//! Este crate implementa o núcleo do editor de código das lições do
//! **Code Quest**: análise estática de erros de iniciante, execução isolada
//! de JavaScript e concessão de conquistas (badges com XP).
//!
//! ## Fluxo de uma execução
//!
//! Imagine um aluno clicando em "Executar":
//! 1. O código é analisado sem ser executado (`analysis`)
//! 2. Se houver erros comuns (comentário com uma barra, string sem fechar...),
//!    o resultado traz diagnósticos com linha, coluna, sugestão e link de ajuda
//! 3. Sem diagnósticos, o código roda no sandbox (`runner`)
//! 4. As regras da lição decidem quais conquistas foram obtidas (`achievements`)
//! 5. As conquistas novas são persistidas ANTES de qualquer notificação (`store`)
//!
//! ## Arquitetura Principal
//!
//! ### 1. Análise Estática (`analysis`)
//! Heurísticas de texto, na ordem de desempate:
//! - Marcadores `/*` e `*/` desbalanceados
//! - String quebrada entre linhas dentro de `console.log(...)`
//! - Sonda de sintaxe (parse sem execução)
//! - Verificações linha a linha
//!
//! ### 2. Runner (`runner`)
//! Máquina de estados `Idle → Analyzing → (Blocked | Executing) → Idle`,
//! com um único run por vez e sandbox Boa restrito a uma allow-list de globais.
//!
//! ### 3. Conquistas (`achievements`)
//! Motor de regras puro por página + coordinator que deduplica, persiste em
//! lote e notifica uma única vez pelo canal de eventos da sessão.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use code_quest::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let events = AchievementEvents::default();
//!     let coordinator = Arc::new(AwardCoordinator::new(
//!         Arc::new(InMemoryStore::new()),
//!         "ana",
//!         events.clone(),
//!     ));
//!     let runner = LessonRunner::new(
//!         Some("/lessons/introduction"),
//!         &RunnerConfig::default(),
//!         coordinator,
//!         events,
//!     );
//!
//!     let report = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();
//!     println!("{}", report.result.output);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`types::Diagnostic`]: problema detectado no código do aluno
/// - [`types::RunResult`]: resultado publicado a cada execução
/// - [`types::RunContext`]: estado acumulado consultado pelas regras
/// - [`types::Achievement`]: entrada do catálogo de conquistas
pub mod types;

/// Análise estática de diagnósticos e gerador de dicas.
pub mod analysis;

/// Sandbox e orquestração de cada execução.
pub mod runner;

/// Catálogo, regras, coordinator, fila e eventos de conquistas.
pub mod achievements;

/// Persistência de conquistas obtidas (memória ou arquivos JSON).
pub mod store;

/// Configuração via variáveis de ambiente.
pub mod config;

/// Utilitários de texto e timing.
pub mod utils;

/// Re-exports convenientes para uso comum
pub mod prelude {
    pub use crate::achievements::{
        AchievementCatalog, AchievementEvent, AchievementEvents, AchievementQueue,
        AwardCoordinator, RuleEngine,
    };
    pub use crate::analysis::{hints, Analyzer};
    pub use crate::config::{load_runner_config, load_store_config, RunnerConfig, StoreConfig};
    pub use crate::runner::{LessonRunner, RunReport, RunState, SandboxError, SandboxExecutor};
    pub use crate::store::{create_store, AchievementStore, InMemoryStore, LocalStore, StoreError};
    pub use crate::types::*;
}

/// Versão do crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
