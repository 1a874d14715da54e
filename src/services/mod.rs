// Startup registration: asks once, remembers the answer, keeps the OS entry in place
pub mod autostart;
pub mod command_runner;
pub mod preference;
pub mod prompt;

use std::io;
use thiserror::Error;

use crate::services::autostart::{AutoStartRegistry, LaunchCommand};
use crate::services::preference::{PreferenceStore, StartupPreference};
use crate::services::prompt::DecisionPrompt;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("impossible d'obtenir la réponse de l'utilisateur: {0}")]
    Prompt(#[source] io::Error),
    #[error("impossible de lire ou d'écrire la préférence de démarrage: {0}")]
    Persistence(#[source] io::Error),
    #[error("la création de la tâche de démarrage '{0}' a échoué")]
    CreateFailed(String),
}

impl RegistrationError {
    fn is_permission_denied(&self) -> bool {
        match self {
            RegistrationError::Prompt(e) | RegistrationError::Persistence(e) => {
                e.kind() == io::ErrorKind::PermissionDenied
            }
            RegistrationError::CreateFailed(_) => false,
        }
    }
}

/// Where a `reconcile` pass ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// First answer was yes; the entry was created.
    Registered,
    /// Already decided yes and the entry is present.
    Verified,
    /// Already decided yes but the entry had vanished; it was created again.
    Recreated,
    /// The operator does not want auto-start.
    Declined,
    /// Something failed; see the diagnostic log.
    Failed,
}

pub struct StartupRegistrar {
    task_name: String,
    launch: LaunchCommand,
    prompt: Box<dyn DecisionPrompt>,
    registry: Box<dyn AutoStartRegistry>,
    store: Box<dyn PreferenceStore>,
}

impl StartupRegistrar {
    pub fn new(
        task_name: impl Into<String>,
        launch: LaunchCommand,
        prompt: Box<dyn DecisionPrompt>,
        registry: Box<dyn AutoStartRegistry>,
        store: Box<dyn PreferenceStore>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            launch,
            prompt,
            registry,
            store,
        }
    }

    /// Brings the OS entry in line with the stored preference, asking the operator
    /// only if no decision is stored. Errors are logged, never returned.
    pub async fn reconcile(&self) -> RegistrationState {
        match self.try_reconcile().await {
            Ok(state) => state,
            Err(e) => {
                if e.is_permission_denied() {
                    tracing::error!("Startup registration: permission denied, run as administrator ({})", e);
                } else {
                    tracing::error!("Startup registration failed: {}", e);
                }
                RegistrationState::Failed
            }
        }
    }

    async fn try_reconcile(&self) -> Result<RegistrationState, RegistrationError> {
        let preference = self.store.load().map_err(RegistrationError::Persistence)?;

        if !preference.asked_already {
            return self.decide().await;
        }

        if !preference.wants_auto_start() {
            tracing::info!("Auto-start declined earlier, nothing to do.");
            return Ok(RegistrationState::Declined);
        }

        if self.external_registration_exists().await {
            tracing::info!("Program is already scheduled to start at login.");
            return Ok(RegistrationState::Verified);
        }

        tracing::warn!("Startup task '{}' is missing, creating it again.", self.task_name);
        self.register().await?;
        Ok(RegistrationState::Recreated)
    }

    async fn decide(&self) -> Result<RegistrationState, RegistrationError> {
        let outcome = self.prompt.ask().map_err(RegistrationError::Prompt)?;
        let preference = StartupPreference {
            asked_already: outcome.dont_ask_again,
            wants_auto_start: outcome.wants_auto_start,
        };
        self.store
            .save(&preference)
            .map_err(RegistrationError::Persistence)?;

        if !outcome.wants_auto_start {
            tracing::info!("Auto-start declined by the user.");
            return Ok(RegistrationState::Declined);
        }

        self.register().await?;
        Ok(RegistrationState::Registered)
    }

    async fn register(&self) -> Result<(), RegistrationError> {
        if self.create_external_registration().await {
            tracing::info!("Program scheduled to start at login.");
            Ok(())
        } else {
            Err(RegistrationError::CreateFailed(self.task_name.clone()))
        }
    }

    /// Creates or overwrites the OS entry. True only when the OS tool succeeded.
    pub async fn create_external_registration(&self) -> bool {
        self.registry.create(&self.task_name, &self.launch).await
    }

    /// Query failures count as "absent" so the entry gets recreated.
    pub async fn external_registration_exists(&self) -> bool {
        self.registry.exists(&self.task_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompt::PromptOutcome;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct StubPrompt {
        answer: Option<PromptOutcome>,
        calls: Arc<AtomicUsize>,
    }

    impl StubPrompt {
        fn answering(dont_ask_again: bool, wants_auto_start: bool) -> Self {
            Self {
                answer: Some(PromptOutcome {
                    dont_ask_again,
                    wants_auto_start,
                }),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn broken() -> Self {
            Self {
                answer: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl DecisionPrompt for StubPrompt {
        fn ask(&self) -> io::Result<PromptOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.ok_or_else(|| io::Error::other("no terminal"))
        }
    }

    #[derive(Clone, Default)]
    struct StubRegistry {
        entries: Arc<Mutex<HashSet<String>>>,
        creates: Arc<AtomicUsize>,
        refuse: bool,
    }

    #[async_trait]
    impl AutoStartRegistry for StubRegistry {
        async fn create(&self, name: &str, _launch: &LaunchCommand) -> bool {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return false;
            }
            self.entries.lock().unwrap().insert(name.to_string());
            true
        }

        async fn exists(&self, name: &str) -> bool {
            self.entries.lock().unwrap().contains(name)
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        record: Arc<Mutex<Option<StartupPreference>>>,
        writes: Arc<Mutex<Vec<StartupPreference>>>,
        read_only: bool,
    }

    impl PreferenceStore for MemoryStore {
        fn load(&self) -> io::Result<StartupPreference> {
            Ok(self.record.lock().unwrap().unwrap_or_default())
        }

        fn save(&self, preference: &StartupPreference) -> io::Result<()> {
            if self.read_only {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            *self.record.lock().unwrap() = Some(*preference);
            self.writes.lock().unwrap().push(*preference);
            Ok(())
        }
    }

    fn registrar(prompt: &StubPrompt, registry: &StubRegistry, store: &MemoryStore) -> StartupRegistrar {
        StartupRegistrar::new(
            "TempFolderApp",
            LaunchCommand {
                executable: PathBuf::from("/opt/tempsweep/tempsweep"),
                args: vec!["config.json".to_string()],
            },
            Box::new(prompt.clone()),
            Box::new(registry.clone()),
            Box::new(store.clone()),
        )
    }

    #[tokio::test]
    async fn yes_dont_ask_again_prompts_and_registers_once() {
        let prompt = StubPrompt::answering(true, true);
        let registry = StubRegistry::default();
        let store = MemoryStore::default();
        let registrar = registrar(&prompt, &registry, &store);

        assert_eq!(registrar.reconcile().await, RegistrationState::Registered);
        assert_eq!(registrar.reconcile().await, RegistrationState::Verified);

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.creates.load(Ordering::SeqCst), 1);
        assert_eq!(
            *store.writes.lock().unwrap(),
            vec![StartupPreference {
                asked_already: true,
                wants_auto_start: true
            }]
        );
    }

    #[tokio::test]
    async fn vanished_entry_is_recreated_without_prompting() {
        let prompt = StubPrompt::answering(true, true);
        let registry = StubRegistry::default();
        let store = MemoryStore::default();
        let registrar = registrar(&prompt, &registry, &store);

        registrar.reconcile().await;
        registry.entries.lock().unwrap().clear();

        assert_eq!(registrar.reconcile().await, RegistrationState::Recreated);
        assert!(registrar.external_registration_exists().await);
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.creates.load(Ordering::SeqCst), 2);
        assert_eq!(store.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn permanent_decline_is_terminal() {
        let prompt = StubPrompt::answering(true, false);
        let registry = StubRegistry::default();
        let store = MemoryStore::default();
        let registrar = registrar(&prompt, &registry, &store);

        assert_eq!(registrar.reconcile().await, RegistrationState::Declined);
        assert_eq!(registrar.reconcile().await, RegistrationState::Declined);

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_again_later_prompts_on_next_pass() {
        let prompt = StubPrompt::answering(false, false);
        let registry = StubRegistry::default();
        let store = MemoryStore::default();
        let registrar = registrar(&prompt, &registry, &store);

        registrar.reconcile().await;
        registrar.reconcile().await;

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.writes.lock().unwrap().len(), 2);
        assert!(!store.load().unwrap().asked_already);
    }

    #[tokio::test]
    async fn stale_wish_without_an_answer_still_prompts() {
        let prompt = StubPrompt::answering(true, false);
        let registry = StubRegistry::default();
        let store = MemoryStore::default();
        *store.record.lock().unwrap() = Some(StartupPreference {
            asked_already: false,
            wants_auto_start: true,
        });
        let registrar = registrar(&prompt, &registry, &store);

        assert_eq!(registrar.reconcile().await, RegistrationState::Declined);
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.creates.load(Ordering::SeqCst), 0);
        assert!(!store.load().unwrap().wants_auto_start());
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let store = MemoryStore::default();

        let broken_prompt = registrar(&StubPrompt::broken(), &StubRegistry::default(), &store);
        assert_eq!(broken_prompt.reconcile().await, RegistrationState::Failed);
        assert!(store.writes.lock().unwrap().is_empty());

        let refusing = StubRegistry {
            refuse: true,
            ..StubRegistry::default()
        };
        let broken_registry = registrar(&StubPrompt::answering(true, true), &refusing, &store);
        assert_eq!(broken_registry.reconcile().await, RegistrationState::Failed);
        // The answer is still remembered.
        assert!(store.load().unwrap().wants_auto_start());

        let read_only = MemoryStore {
            read_only: true,
            ..MemoryStore::default()
        };
        let registry = StubRegistry::default();
        let broken_store = registrar(&StubPrompt::answering(true, true), &registry, &read_only);
        assert_eq!(broken_store.reconcile().await, RegistrationState::Failed);
        assert_eq!(registry.creates.load(Ordering::SeqCst), 0);
    }
}
