//! The "my jobs" screen as a Crux app.
//!
//! The shell renders [`ListViewModel`] and carries out the effects: page
//! fetches and actions go out as [`ApiRequest`]s, destructive actions ask
//! through the confirm capability first. Every page request carries its
//! [`FetchTicket`] out and back, so a response the collection no longer
//! wants is dropped when it returns.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capabilities::{ApiRequest, Capabilities, PageAdapter};
use crate::collection::{ApplyOutcome, Collection, FetchTicket};
use crate::config::CollectionConfig;
use crate::error::FetchError;
use crate::event::{Event, ListViewModel, ToastKind, ToastMessage};
use crate::model::{Job, JobStatus};
use crate::mutation::{InFlightActions, MutationRequest};

pub const MY_JOBS_LABEL: &str = "my-jobs";

#[derive(Debug)]
pub struct Model {
    pub collection: Collection<Job>,
    pub actions: InFlightActions,
    pub toast: Option<ToastMessage>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            collection: Collection::new(CollectionConfig::new(MY_JOBS_LABEL)).unwrap_or_default(),
            actions: InFlightActions::default(),
            toast: None,
        }
    }
}

#[derive(Default)]
pub struct App;

impl App {
    fn fetch(ticket: FetchTicket<JobStatus>, label: &str, caps: &Capabilities) {
        debug!(
            collection = label,
            token = %ticket.token,
            kind = ticket.kind.as_str(),
            page = ticket.params.page,
            "fetching"
        );
        let request = ApiRequest::fetch_page(label, &ticket.params);
        caps.api.send(request, move |reply| Event::PageFetched {
            result: reply.into_fetch_result(),
            ticket,
        });
    }

    fn fetch_if_issued(ticket: Option<FetchTicket<JobStatus>>, model: &Model, caps: &Capabilities) {
        match ticket {
            Some(ticket) => Self::fetch(ticket, &model.collection.config().label, caps),
            None => debug!(status = ?model.collection.status(), "fetch not started"),
        }
    }

    fn refresh(model: &mut Model, caps: &Capabilities) {
        let ticket = model.collection.begin_refresh();
        Self::fetch(ticket, &model.collection.config().label, caps);
    }

    fn send_mutation(request: MutationRequest, caps: &Capabilities) {
        info!(action = %request.action, target = ?request.target, "sending action");
        let api_request = ApiRequest::mutate(&request);
        caps.api.send(api_request, move |reply| Event::MutationFinished {
            result: reply.into_mutation_result(),
            request,
        });
    }

    fn apply_page(
        model: &mut Model,
        ticket: &FetchTicket<JobStatus>,
        result: Result<Value, FetchError>,
    ) {
        let page = result.and_then(|body| Job::page_adapter().normalize(ticket.params.page, body));
        let failure = page.as_ref().err().cloned();
        match model.collection.apply(ticket, page) {
            ApplyOutcome::Applied => info!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                items = model.collection.items().len(),
                has_more = model.collection.has_more(),
                "page applied"
            ),
            ApplyOutcome::Failed => warn!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                error = ?failure,
                "fetch failed"
            ),
            ApplyOutcome::Stale => debug!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                "discarding stale response"
            ),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ListViewModel<Job, JobStatus>;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "event");
        }

        match event {
            Event::Configure(config) => match Collection::new(config) {
                Ok(collection) => model.collection = collection,
                Err(e) => warn!(error = %e, "configuration rejected"),
            },

            Event::Mounted => {
                let ticket = model.collection.begin_load();
                Self::fetch_if_issued(ticket, model, caps);
            }

            Event::PulledToRefresh => Self::refresh(model, caps),

            Event::ScrolledToEnd => {
                let ticket = model.collection.begin_load_more();
                Self::fetch_if_issued(ticket, model, caps);
            }

            Event::FilterChanged(criteria) => {
                if model.collection.set_filter(criteria).needs_refetch {
                    Self::refresh(model, caps);
                }
            }

            Event::SearchTextChanged(text) => {
                model.collection.update_filter(|filter| filter.text = text);
            }

            Event::StatusSelected(status) => {
                if model
                    .collection
                    .update_filter(|filter| filter.status = status)
                    .needs_refetch
                {
                    Self::refresh(model, caps);
                }
            }

            Event::ActionRequested { action, id } => {
                let request = action.on(id);
                if let Err(e) = model.actions.try_acquire(request.key()) {
                    debug!(error = %e, "action ignored");
                } else if let Some(message) = action.confirmation() {
                    caps.confirm.ask(message, move |confirmed| Event::ConfirmationAnswered {
                        request,
                        confirmed,
                    });
                } else {
                    Self::send_mutation(request, caps);
                }
            }

            Event::ConfirmationAnswered { request, confirmed } => {
                if confirmed {
                    Self::send_mutation(request, caps);
                } else {
                    info!(action = %request.action, "action declined");
                    model.actions.release(&request.key());
                }
            }

            Event::MutationFinished { request, result } => {
                model.actions.release(&request.key());
                match result {
                    Ok(_) => {
                        info!(action = %request.action, target = ?request.target, "action completed");
                        model.toast = Some(ToastMessage::new(
                            format!("{} succeeded", capitalize(&request.action)),
                            ToastKind::Success,
                        ));
                        Self::refresh(model, caps);
                    }
                    Err(e) => {
                        warn!(action = %request.action, error = %e, "action failed");
                        model.toast = e
                            .user_message()
                            .map(|message| ToastMessage::new(message, ToastKind::Error));
                    }
                }
            }

            Event::ToastDismissed => model.toast = None,

            Event::PageFetched { ticket, result } => Self::apply_page(model, &ticket, result),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> Self::ViewModel {
        ListViewModel::from_snapshot(model.collection.snapshot(), model.toast.clone())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_action_names() {
        assert_eq!(capitalize("cancel"), "Cancel");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn default_model_is_an_unloaded_job_list() {
        let model = Model::default();
        assert_eq!(model.collection.config().label, MY_JOBS_LABEL);
        assert!(!model.collection.is_loaded());
        assert!(model.actions.is_empty());
        assert_eq!(model.toast, None);
    }
}
