use std::sync::Arc;

use chromiumoxide::cdp::js_protocol::runtime::EventBindingCalled;
use chromiumoxide::page::Page as CrPage;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::{RelayBuilder, RelayConfig};
use crate::dom;
use crate::error::Result;
use crate::mapper;

/// A web-to-lead relay installed on a live page.
///
/// Installation eagerly inserts the hidden shadow frame and shadow form into
/// the document, whether or not the source form is ever submitted. In
/// listener mode the spawned tasks hold their own page and config handles,
/// so dropping this value does not detach the relay; it lives until the page
/// navigates away.
pub struct LeadRelay {
    page: CrPage,
    config: Arc<RelayConfig>,
}

impl LeadRelay {
    /// Start configuring a relay for the given endpoint and source form.
    pub fn builder(action: impl Into<String>, form_id: impl Into<String>) -> RelayBuilder {
        RelayBuilder::new(action, form_id)
    }

    /// Entry point with optional configuration: `None` performs zero DOM
    /// mutations and reports back `None`.
    pub async fn init(
        page: &CrPage,
        config: Option<RelayConfig>,
    ) -> Result<Option<LeadRelay>> {
        match config {
            None => Ok(None),
            Some(config) => Self::install(page, config).await.map(Some),
        }
    }

    /// Install the relay: build the shadow frame and form, then wire the
    /// configured trigger mode.
    ///
    /// Direct mode relays once synchronously before returning. Listener mode
    /// intercepts every subsequent submit of the source form for the page's
    /// lifetime; a missing source form fails installation in both modes.
    pub async fn install(page: &CrPage, config: RelayConfig) -> Result<LeadRelay> {
        let config = Arc::new(config);

        if config.after_submit.is_some() {
            // Subscribe before the frame exists so the initial about:blank
            // load cannot slip past the stream.
            let mut load_events = page.event_listener::<EventBindingCalled>().await?;
            dom::register_binding(page, dom::LOADED_BINDING).await?;

            let callback_config = Arc::clone(&config);
            tokio::spawn(async move {
                while let Some(event) = load_events.next().await {
                    if event.name != dom::LOADED_BINDING {
                        continue;
                    }
                    debug!("shadow frame finished loading");
                    if let Some(callback) = &callback_config.after_submit {
                        callback();
                    }
                }
            });
        }

        dom::build_shadow_frame(page, config.after_submit.is_some()).await?;
        dom::build_shadow_form(page, &config.action).await?;

        let relay = LeadRelay {
            page: page.clone(),
            config: Arc::clone(&config),
        };

        if config.direct_submit {
            relay.submit_now().await?;
        } else {
            let mut submit_events = page.event_listener::<EventBindingCalled>().await?;
            dom::register_binding(page, dom::SUBMIT_BINDING).await?;
            dom::attach_submit_listener(page, &config.form_id).await?;

            let task_page = page.clone();
            let task_config = Arc::clone(&config);
            tokio::spawn(async move {
                while let Some(event) = submit_events.next().await {
                    if event.name != dom::SUBMIT_BINDING {
                        continue;
                    }
                    if let Err(e) = relay_once(&task_page, &task_config).await {
                        warn!(error = %e, "relay submission failed");
                    }
                }
            });
        }

        Ok(relay)
    }

    /// Run one relay pass now: scrape the source form, map its fields into
    /// the shadow form, append the configured extras, submit, mark sent.
    ///
    /// Each pass appends a fresh batch of inputs; earlier batches are never
    /// cleared, so repeated passes accumulate duplicates in the shadow form.
    pub async fn submit_now(&self) -> Result<()> {
        relay_once(&self.page, &self.config).await
    }

    /// Whether the source form carries the sent marker.
    pub async fn sent(&self) -> Result<bool> {
        dom::sent_marker(&self.page, &self.config.form_id).await
    }
}

/// One relay pass, shared by direct mode, `submit_now`, and the listener
/// task.
async fn relay_once(page: &CrPage, config: &RelayConfig) -> Result<()> {
    let source = dom::scrape_source_fields(page, &config.form_id).await?;
    let mut inputs = mapper::map_fields(config, &source);
    inputs.extend(mapper::extra_inputs(config));
    debug!(inputs = inputs.len(), form = %config.form_id, "relaying submission");
    dom::insert_inputs(page, &inputs).await?;
    dom::submit_shadow_form(page, &config.form_id).await?;
    Ok(())
}
