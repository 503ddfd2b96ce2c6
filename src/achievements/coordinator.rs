// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AWARD COORDINATOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Garante para cada lote de conquistas novas:
// 1. Deduplicação contra o snapshot de conquistas obtidas
// 2. Persistência concorrente de todo o lote ANTES de notificar
// 3. Uma única notificação `Earned` por lote
// 4. Refresh externo só depois que a apresentação dispensa o lote
//
// Política de falha parcial: notifica apenas o subconjunto persistido
// (Conflict conta como persistido). Itens que falharam ficam fora do
// snapshot e voltam a qualificar na próxima execução bem-sucedida.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;

use super::events::{AchievementEvent, AchievementEvents};
use crate::store::{AchievementStore, StoreError};
use crate::types::Achievement;

/// Coordena persistência e notificação de conquistas de um usuário
pub struct AwardCoordinator {
    store: Arc<dyn AchievementStore>,
    user_id: String,
    events: AchievementEvents,
    /// Snapshot dos ids obtidos (`None` até a primeira leitura do store)
    earned: RwLock<Option<HashSet<String>>>,
    pending_refresh: AtomicBool,
    last_store_error: RwLock<Option<String>>,
}

impl AwardCoordinator {
    /// Cria um coordinator para o usuário, publicando no canal da sessão
    pub fn new(store: Arc<dyn AchievementStore>, user_id: impl Into<String>, events: AchievementEvents) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            events,
            earned: RwLock::new(None),
            pending_refresh: AtomicBool::new(false),
            last_store_error: RwLock::new(None),
        }
    }

    /// Usuário atual
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Relê os ids obtidos do store e atualiza o snapshot.
    pub async fn refresh(&self) -> Result<HashSet<String>, StoreError> {
        match self.store.list_earned(&self.user_id).await {
            Ok(entries) => {
                let ids: HashSet<String> = entries.into_iter().map(|e| e.achievement_id).collect();
                *self.earned.write().await = Some(ids.clone());
                Ok(ids)
            }
            Err(e) => {
                log::error!("❌ Failed to load earned achievements for '{}': {}", self.user_id, e);
                *self.last_store_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Snapshot dos ids obtidos, carregado do store na primeira chamada.
    ///
    /// Se o store falhar, retorna o que houver em cache (ou vazio); a
    /// deduplicação na escrita continua protegendo contra duplicatas.
    pub async fn earned_ids(&self) -> HashSet<String> {
        if let Some(ids) = self.earned.read().await.as_ref() {
            return ids.clone();
        }
        self.refresh().await.unwrap_or_default()
    }

    /// Persiste e notifica as conquistas recém-qualificadas.
    ///
    /// Retorna o subconjunto efetivamente concedido.
    pub async fn award(&self, newly_qualified: Vec<Achievement>, earned_ids: &HashSet<String>) -> Vec<Achievement> {
        let mut seen = HashSet::new();
        let unique_new: Vec<Achievement> = newly_qualified
            .into_iter()
            .filter(|a| !earned_ids.contains(&a.id) && seen.insert(a.id.clone()))
            .collect();

        if unique_new.is_empty() {
            return Vec::new();
        }

        let results = join_all(
            unique_new
                .iter()
                .map(|a| self.store.insert_earned(&self.user_id, &a.id)),
        )
        .await;

        let mut persisted = Vec::with_capacity(unique_new.len());
        let mut last_error = None;
        for (achievement, result) in unique_new.into_iter().zip(results) {
            match result {
                Ok(()) => persisted.push(achievement),
                Err(e) if e.is_conflict() => {
                    log::debug!("achievement '{}' was already stored", achievement.id);
                    persisted.push(achievement);
                }
                Err(e) => {
                    log::error!("❌ Failed to persist achievement '{}': {}", achievement.id, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        if let Some(error) = last_error {
            *self.last_store_error.write().await = Some(error);
        }

        if persisted.is_empty() {
            return Vec::new();
        }

        {
            let mut earned = self.earned.write().await;
            let snapshot = earned.get_or_insert_with(|| earned_ids.clone());
            snapshot.extend(persisted.iter().map(|a| a.id.clone()));
        }

        self.pending_refresh.store(true, Ordering::SeqCst);
        log::info!(
            "🏆 Awarded {} achievement(s) to '{}': {}",
            persisted.len(),
            self.user_id,
            persisted.iter().map(|a| a.id.as_str()).collect::<Vec<_>>().join(", ")
        );
        self.events.publish(AchievementEvent::Earned(persisted.clone()));

        persisted
    }

    /// Sinal de que a apresentação terminou de exibir o lote.
    ///
    /// Consome o refresh pendente e emite `RefreshRequested` uma única vez.
    pub fn dismissed(&self) -> bool {
        if self.pending_refresh.swap(false, Ordering::SeqCst) {
            self.events.publish(AchievementEvent::RefreshRequested);
            true
        } else {
            false
        }
    }

    /// Há um refresh aguardando a dispensa do lote
    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh.load(Ordering::SeqCst)
    }

    /// Última falha do store (flag de erro local, não fatal)
    pub async fn last_store_error(&self) -> Option<String> {
        self.last_store_error.read().await.clone()
    }

    /// Apaga todo o progresso do usuário
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.delete_all_earned(&self.user_id).await?;
        *self.earned.write().await = Some(HashSet::new());
        self.pending_refresh.store(false, Ordering::SeqCst);
        log::info!("🧹 Progress reset for '{}'", self.user_id);
        Ok(())
    }
}
