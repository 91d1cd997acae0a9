pub mod commands;
pub mod replies;
pub mod telegram;

use crate::bot::commands::BotCommand;
use crate::bot::telegram::{BotError, TelegramClient, Update};
use livescore_api::SnapshotStore;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// A command addressed to the bot, tagged with where to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRequest {
    pub chat_id: i64,
    pub command: BotCommand,
}

/// Long-polls Telegram and forwards recognised commands.
pub struct UpdatePoller {
    client: TelegramClient,
    requests: mpsc::Sender<BotRequest>,
    offset: i64,
}

impl UpdatePoller {
    pub fn new(client: TelegramClient, requests: mpsc::Sender<BotRequest>) -> Self {
        Self {
            client,
            requests,
            offset: 0,
        }
    }

    pub async fn run(mut self) {
        loop {
            match self.poll_once().await {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    warn!("telegram poll failed: {e}");
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    /// One `getUpdates` round. `Ok(false)` once the responder has gone away.
    async fn poll_once(&mut self) -> Result<bool, BotError> {
        let updates = self.client.get_updates(self.offset, POLL_TIMEOUT_SECS).await?;
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let Some(request) = request_from(update) else {
                continue;
            };
            if self.requests.send(request).await.is_err() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn request_from(update: Update) -> Option<BotRequest> {
    let message = update.message?;
    let command = BotCommand::parse(message.text.as_deref()?)?;
    Some(BotRequest {
        chat_id: message.chat.id,
        command,
    })
}

/// Answers commands from the newest stored snapshot.
pub struct Responder {
    client: TelegramClient,
    store: Arc<dyn SnapshotStore>,
    requests: mpsc::Receiver<BotRequest>,
}

impl Responder {
    pub fn new(
        client: TelegramClient,
        store: Arc<dyn SnapshotStore>,
        requests: mpsc::Receiver<BotRequest>,
    ) -> Self {
        Self {
            client,
            store,
            requests,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            debug!("answering {:?} in chat {}", request.command, request.chat_id);
            let text = self.answer(request.command);
            if let Err(e) = self
                .client
                .send_message(&request.chat_id.to_string(), &text)
                .await
            {
                error!("failed to reply in chat {}: {e}", request.chat_id);
            }
        }
    }

    fn answer(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Start | BotCommand::Help => replies::reply(command, None),
            BotCommand::Live | BotCommand::Matches => {
                let snapshot = self.store.latest();
                replies::reply(command, snapshot.as_ref().map(|s| &s.schedule))
            }
        }
    }
}

/// Run the bot until the poller stops.
pub async fn run(client: TelegramClient, store: Arc<dyn SnapshotStore>) {
    let (request_tx, request_rx) = mpsc::channel::<BotRequest>(100);

    let poller = UpdatePoller::new(client.clone(), request_tx);
    let responder = Responder::new(client, store, request_rx);

    info!("telegram bot polling for commands");
    let responder_task = tokio::spawn(responder.run());
    poller.run().await;
    responder_task.abort();
}
