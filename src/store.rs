// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// STORE DE CONQUISTAS - Multi-Backend (Memory/Local)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// O store é a fonte da verdade sobre conquistas obtidas. O núcleo só lê um
// snapshot e propõe inserções; a deduplicação no momento da escrita
// (erro Conflict) é a fronteira real de corretude.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::config::{StoreBackend, StoreConfig};
use crate::types::EarnedAchievement;

/// Erros de persistência
#[derive(Debug, Error)]
pub enum StoreError {
    /// Conquista já registrada para o usuário (no-op idempotente)
    #[error("achievement '{achievement_id}' already earned by '{user_id}'")]
    Conflict {
        /// Usuário
        user_id: String,
        /// Conquista duplicada
        achievement_id: String,
    },

    /// Falha de I/O no backend
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arquivo de progresso corrompido ou não serializável
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend indisponível
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Conflitos são benignos: a conquista já está salva
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TRAIT: AchievementStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Persistência de conquistas obtidas.
///
/// Implementações disponíveis:
/// - `InMemoryStore`: memória do processo (testes, sessões descartáveis)
/// - `LocalStore`: um arquivo JSON por usuário
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementStore: Send + Sync {
    /// Nome do backend
    fn name(&self) -> &'static str;

    /// Lista as conquistas obtidas pelo usuário
    async fn list_earned(&self, user_id: &str) -> Result<Vec<EarnedAchievement>, StoreError>;

    /// Registra uma conquista. Retorna `Conflict` se ela já existir.
    async fn insert_earned(&self, user_id: &str, achievement_id: &str) -> Result<(), StoreError>;

    /// Remove todas as conquistas do usuário
    async fn delete_all_earned(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Cria o store configurado
pub fn create_store(config: &StoreConfig) -> Arc<dyn AchievementStore> {
    match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::Local => Arc::new(LocalStore::new(config.directory.clone())),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BACKEND: Memory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Store em memória, compartilhável entre runners da mesma sessão
#[derive(Debug, Default)]
pub struct InMemoryStore {
    earned: RwLock<HashMap<String, Vec<EarnedAchievement>>>,
}

impl InMemoryStore {
    /// Cria um store vazio
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AchievementStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_earned(&self, user_id: &str) -> Result<Vec<EarnedAchievement>, StoreError> {
        let earned = self.earned.read().await;
        Ok(earned.get(user_id).cloned().unwrap_or_default())
    }

    async fn insert_earned(&self, user_id: &str, achievement_id: &str) -> Result<(), StoreError> {
        let mut earned = self.earned.write().await;
        let entries = earned.entry(user_id.to_string()).or_default();

        if entries.iter().any(|e| e.achievement_id == achievement_id) {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
                achievement_id: achievement_id.to_string(),
            });
        }

        entries.push(EarnedAchievement::now(user_id, achievement_id));
        Ok(())
    }

    async fn delete_all_earned(&self, user_id: &str) -> Result<(), StoreError> {
        self.earned.write().await.remove(user_id);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BACKEND: Local (arquivos JSON)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Store local com um arquivo `<usuário>.json` por usuário.
///
/// As escritas são serializadas por um lock interno, já que o coordinator
/// insere um lote inteiro concorrentemente.
pub struct LocalStore {
    directory: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Cria um store local no diretório informado
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            write_lock: Mutex::new(()),
        }
    }

    /// Diretório dos arquivos de progresso
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn user_file(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.json", safe))
    }

    async fn load(&self, user_id: &str) -> Result<Vec<EarnedAchievement>, StoreError> {
        let path = self.user_file(user_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, user_id: &str, entries: &[EarnedAchievement]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(self.user_file(user_id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl AchievementStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list_earned(&self, user_id: &str) -> Result<Vec<EarnedAchievement>, StoreError> {
        self.load(user_id).await
    }

    async fn insert_earned(&self, user_id: &str, achievement_id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load(user_id).await?;

        if entries.iter().any(|e| e.achievement_id == achievement_id) {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
                achievement_id: achievement_id.to_string(),
            });
        }

        entries.push(EarnedAchievement::now(user_id, achievement_id));
        self.save(user_id, &entries).await
    }

    async fn delete_all_earned(&self, user_id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.user_file(user_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
