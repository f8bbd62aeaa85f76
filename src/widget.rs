//! Joke widget: the three page actions.
//!
//! Every action looks up its target element, sends one request on a spawned
//! task and hands the finished exchange back as a [`Completion`] on a channel.
//! The owner of the [`Document`] applies completions in arrival order with
//! [`apply`], so overlapping requests for the same target never block each
//! other and the last reply to arrive wins.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{JokeAction, JokeClient, JokeError, Person, Reply};
use crate::page::{Document, CUSTOM_MODAL_ID, FIRST_NAME_ID, LAST_NAME_ID};

/// The single resolution of one joke request.
#[derive(Debug)]
pub struct Completion {
    pub action: JokeAction,
    pub outcome: Result<Reply, JokeError>,
}

/// What [`apply`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Replaced,
    /// Reply arrived with a status other than 200.
    Rejected(u16),
    /// The request failed after it was sent.
    Failed,
    /// The target element is gone from the page.
    Detached,
}

#[derive(Clone)]
pub struct JokeWidget {
    client: JokeClient,
    completions: mpsc::UnboundedSender<Completion>,
}

impl JokeWidget {
    pub fn new(client: JokeClient, completions: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            client,
            completions,
        }
    }

    pub fn client(&self) -> &JokeClient {
        &self.client
    }

    /// `GET /jokes/random`, replacing `#rJoke` on success.
    pub fn fetch_random_joke(&self, doc: &Document) -> Option<JoinHandle<()>> {
        self.dispatch(doc, JokeAction::Random, None)
    }

    /// `GET /jokes/personal`, replacing `#pJoke` on success.
    pub fn fetch_personal_joke(&self, doc: &Document) -> Option<JoinHandle<()>> {
        self.dispatch(doc, JokeAction::Personal, None)
    }

    /// `POST /jokes/custom` with `person` as JSON, replacing `#cJoke` on success.
    pub fn fetch_custom_joke(&self, doc: &Document, person: Person) -> Option<JoinHandle<()>> {
        self.dispatch(doc, JokeAction::Custom, Some(person))
    }

    /// Modal-dismiss hook: reads both name inputs, hides the modal and sends
    /// the custom request. Hiding does not wait for the request.
    pub fn dismiss_custom_modal(&self, doc: &mut Document) -> Option<JoinHandle<()>> {
        let person = Person::new(
            doc.input_value(FIRST_NAME_ID).unwrap_or_default(),
            doc.input_value(LAST_NAME_ID).unwrap_or_default(),
        );
        doc.hide_dialog(CUSTOM_MODAL_ID);
        self.fetch_custom_joke(doc, person)
    }

    pub fn fetch(&self, doc: &Document, action: JokeAction) -> Option<JoinHandle<()>> {
        match action {
            JokeAction::Random => self.fetch_random_joke(doc),
            JokeAction::Personal => self.fetch_personal_joke(doc),
            JokeAction::Custom => {
                let person = Person::new(
                    doc.input_value(FIRST_NAME_ID).unwrap_or_default(),
                    doc.input_value(LAST_NAME_ID).unwrap_or_default(),
                );
                self.fetch_custom_joke(doc, person)
            }
        }
    }

    fn dispatch(
        &self,
        doc: &Document,
        action: JokeAction,
        person: Option<Person>,
    ) -> Option<JoinHandle<()>> {
        if !doc.contains(action.target()) {
            let err = JokeError::MissingTarget(action.target());
            tracing::error!(action = ?action, error = %err, "joke request not sent");
            return None;
        }

        let request = match self.client.prepare(action, person.as_ref()) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(action = ?action, error = %err, "joke request not sent");
                return None;
            }
        };

        tracing::debug!(action = ?action, url = %request.url(), "joke request sent");

        let client = self.client.clone();
        let completions = self.completions.clone();
        Some(tokio::spawn(async move {
            let outcome = client.execute(action, request).await;
            // The receiver is gone once the page is torn down.
            let _ = completions.send(Completion { action, outcome });
        }))
    }
}

/// Applies a finished request to the page.
///
/// Only a reply with status exactly 200 changes the page.
pub fn apply(doc: &mut Document, completion: Completion) -> Applied {
    let action = completion.action;
    match completion.outcome {
        Ok(reply) if reply.is_ok() => {
            if doc.replace_outer_html(action.target(), &reply.body) {
                tracing::debug!(action = ?action, bytes = reply.body.len(), "joke replaced");
                Applied::Replaced
            } else {
                tracing::warn!(
                    action = ?action,
                    target = action.target(),
                    "joke target no longer on page"
                );
                Applied::Detached
            }
        }
        Ok(reply) => {
            tracing::warn!(action = ?action, status = reply.status, "joke request rejected");
            Applied::Rejected(reply.status)
        }
        Err(err) => {
            tracing::debug!(action = ?action, error = %err, "joke request failed");
            Applied::Failed
        }
    }
}
