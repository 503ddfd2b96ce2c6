// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONQUISTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Catálogo → motor de regras (puro) → coordinator (persistência + eventos)
//          → fila de apresentação
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod catalog;
mod coordinator;
mod events;
mod queue;
mod rules;

pub use catalog::{AchievementCatalog, CatalogError, INTRODUCTION_PAGE, VARIABLES_PAGE};
pub use coordinator::AwardCoordinator;
pub use events::{AchievementEvent, AchievementEvents, DEFAULT_EVENT_CAPACITY};
pub use queue::AchievementQueue;
pub use rules::RuleEngine;
