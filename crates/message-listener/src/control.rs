//! Dashboard command handling: configuration, session control and the
//! test chat.

use std::sync::Arc;

use bot_store::ConfigStore;
use broadcaster::{BotStatus, EventBroadcaster, PlaygroundReply};
use tracing::{error, info, warn};
use zap_core::{BotConfig, BotConfigPatch, ChatTurn, Transport, TransportError};

use crate::generator::ResponseGenerator;

/// Executes dashboard commands against the shared state.
#[derive(Clone)]
pub struct Controller {
    config: Arc<ConfigStore>,
    transport: Arc<dyn Transport>,
    generator: ResponseGenerator,
    broadcaster: EventBroadcaster,
}

impl Controller {
    pub fn new(
        config: Arc<ConfigStore>,
        transport: Arc<dyn Transport>,
        generator: ResponseGenerator,
        broadcaster: EventBroadcaster,
    ) -> Self {
        Self {
            config,
            transport,
            generator,
            broadcaster,
        }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<BotConfig> {
        self.config.get()
    }

    /// Merge, normalize and persist a configuration update.
    pub fn update_config(&self, patch: BotConfigPatch) -> Arc<BotConfig> {
        let updated = self.config.update(patch);
        info!(
            "Config updated: active={}, only_allowed={}, {} allowed numbers",
            updated.is_active,
            updated.only_allowed,
            updated.allowed_numbers.len()
        );
        self.broadcaster.info("Configuration saved and applied.");
        updated
    }

    /// Tear the session down and start it again.
    ///
    /// A failing teardown is ignored; a failing start is logged and returned.
    pub async fn restart_client(&self) -> Result<(), TransportError> {
        self.broadcaster.warning("Restarting WhatsApp client...");

        if let Err(e) = self.transport.destroy().await {
            warn!("Session teardown failed (ignored): {}", e);
        }

        self.transport.initialize().await.map_err(|e| {
            error!("Session restart failed: {}", e);
            self.broadcaster
                .error(format!("Failed to restart WhatsApp client: {}", e));
            e
        })
    }

    /// Log out of WhatsApp. Always ends in the `DISCONNECTED` state.
    pub async fn disconnect_session(&self) {
        if let Err(e) = self.transport.logout().await {
            warn!("Logout failed (ignored): {}", e);
        }
        self.broadcaster.set_status(BotStatus::Disconnected);
    }

    /// Answer a dashboard test-chat message with the live configuration.
    ///
    /// Stats and the delivery queue are not touched.
    pub async fn playground(&self, history: &[ChatTurn], message: &str) -> PlaygroundReply {
        let config = self.config.get();
        match self.generator.generate(history, message, &config).await {
            Ok(text) => PlaygroundReply::text(text),
            Err(e) => {
                warn!("Playground generation failed: {}", e);
                PlaygroundReply::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadcaster::{BotEvent, LogLevel};
    use mock_brain::{EchoModel, RecordingTransport, TransportCall};
    use tempfile::TempDir;

    fn controller(
        generator: ResponseGenerator,
    ) -> (TempDir, Controller, Arc<RecordingTransport>, EventBroadcaster) {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ConfigStore::load(dir.path().join("bot_config.json")));
        let transport = Arc::new(RecordingTransport::new());
        let broadcaster = EventBroadcaster::new();
        let controller = Controller::new(config, transport.clone(), generator, broadcaster.clone());
        (dir, controller, transport, broadcaster)
    }

    #[test]
    fn test_update_config_merges_persists_and_logs() {
        let (dir, controller, _transport, broadcaster) = controller(ResponseGenerator::disabled());
        let mut events = broadcaster.subscribe();

        let updated = controller.update_config(BotConfigPatch {
            allowed_numbers: Some(vec![
                "55 11 99999-8888".to_string(),
                "5511999998888".to_string(),
                "123".to_string(),
            ]),
            temperature: Some(0.3),
            ..Default::default()
        });

        assert_eq!(updated.allowed_numbers, vec!["5511999998888"]);
        assert_eq!(updated.temperature, 0.3);
        assert!(updated.is_active);
        assert_eq!(controller.config(), updated);

        let reloaded = ConfigStore::load(dir.path().join("bot_config.json"));
        assert_eq!(*reloaded.get(), *updated);

        match events.try_recv() {
            Ok(BotEvent::Log(log)) => {
                assert_eq!(log.level, LogLevel::Info);
                assert_eq!(log.message, "Configuration saved and applied.");
            }
            other => panic!("Expected info log, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_restart_ignores_teardown_failure() {
        let (_dir, controller, transport, _broadcaster) = controller(ResponseGenerator::disabled());

        assert!(controller.restart_client().await.is_ok());
        assert_eq!(
            transport.operations(),
            vec![TransportCall::Destroy, TransportCall::Initialize]
        );

        transport.set_fail_session(true);
        assert!(controller.restart_client().await.is_err());
        assert_eq!(transport.operations().len(), 4);
    }

    #[tokio::test]
    async fn test_disconnect_always_reports_disconnected() {
        let (_dir, controller, transport, broadcaster) = controller(ResponseGenerator::disabled());
        broadcaster.set_status(BotStatus::Connected);
        transport.set_fail_session(true);

        controller.disconnect_session().await;

        assert_eq!(transport.operations(), vec![TransportCall::Logout]);
        assert_eq!(broadcaster.current_status(), BotStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_playground_uses_history_and_does_not_deliver() {
        let model = Arc::new(EchoModel::with_prefix("Bot: "));
        let (_dir, controller, transport, _broadcaster) =
            controller(ResponseGenerator::new(model.clone()));

        let history = vec![
            ChatTurn::bot("Olá! Como posso ajudar você hoje?"),
            ChatTurn::system("ignored"),
        ];
        let reply = controller.playground(&history, "Qual o horário?").await;

        assert_eq!(reply, PlaygroundReply::text("Bot: Qual o horário?"));
        assert_eq!(model.requests()[0].contents.len(), 2);
        assert!(transport.operations().is_empty());
    }

    #[tokio::test]
    async fn test_playground_without_model_reports_error() {
        let (_dir, controller, _transport, _broadcaster) = controller(ResponseGenerator::disabled());

        let reply = controller.playground(&[], "hi").await;
        assert!(reply.text.is_none());
        assert!(reply.error.unwrap().contains("unavailable"));
    }
}
