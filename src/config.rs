use std::collections::HashMap;

use chromiumoxide::page::Page as CrPage;

use crate::error::Result;
use crate::relay::LeadRelay;

/// Value transform applied after name translation, keyed by the
/// *destination* field name.
pub type TransformFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Callback invoked with no arguments when the shadow frame finishes
/// loading a document.
pub type AfterSubmitFn = Box<dyn Fn() + Send + Sync>;

/// Configuration for one relay installation. Immutable once built; the
/// installed relay and its background tasks share it behind an `Arc`.
pub struct RelayConfig {
    /// Destination URL the shadow form POSTs to.
    pub action: String,
    /// Id of the source form element in the document.
    pub form_id: String,
    /// Source field name → destination field name. `None` selects identity
    /// mode: every field keeps its name and is copied as a text input.
    /// `Some` (even empty) selects mapping mode: fields absent from the map
    /// are dropped and copied fields become hidden inputs.
    pub mapping: Option<HashMap<String, String>>,
    /// Literal destination fields appended to every submission, in insertion
    /// order. Transforms never apply to these.
    pub additional_fields: Vec<(String, String)>,
    /// Per-destination-name value transforms.
    pub transforms: HashMap<String, TransformFn>,
    /// Submit once during installation instead of listening for the source
    /// form's submit event. Default false.
    pub direct_submit: bool,
    /// When set and non-empty, a `debug=1` and a `debugEmail=<value>` field
    /// ride along with every submission.
    pub debug_email: Option<String>,
    /// See [`RelayBuilder::after_submit`].
    pub after_submit: Option<AfterSubmitFn>,
}

impl RelayConfig {
    pub fn new(action: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            form_id: form_id.into(),
            mapping: None,
            additional_fields: Vec::new(),
            transforms: HashMap::new(),
            direct_submit: false,
            debug_email: None,
            after_submit: None,
        }
    }
}

pub struct RelayBuilder {
    config: RelayConfig,
}

impl RelayBuilder {
    pub fn new(action: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            config: RelayConfig::new(action, form_id),
        }
    }

    /// Add one source → destination name mapping. The first call switches
    /// the relay from identity mode into mapping mode.
    pub fn map_field(
        mut self,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.config
            .mapping
            .get_or_insert_with(HashMap::new)
            .insert(source.into(), destination.into());
        self
    }

    /// Replace the whole name mapping. Passing an empty map still selects
    /// mapping mode, which drops every source field.
    pub fn mapping(mut self, mapping: HashMap<String, String>) -> Self {
        self.config.mapping = Some(mapping);
        self
    }

    /// Append a literal field to every submission.
    pub fn additional_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.config
            .additional_fields
            .push((name.into(), value.into()));
        self
    }

    /// Register a value transform for a destination field name.
    pub fn transform(
        mut self,
        destination: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.config
            .transforms
            .insert(destination.into(), Box::new(transform));
        self
    }

    /// Submit synchronously during installation instead of intercepting the
    /// source form's submit event.
    pub fn direct_submit(mut self, direct: bool) -> Self {
        self.config.direct_submit = direct;
        self
    }

    /// Ask the endpoint for a debug trace mailed to the given address.
    /// An empty string disables this, same as not calling it.
    pub fn debug_email(mut self, email: impl Into<String>) -> Self {
        self.config.debug_email = Some(email.into());
        self
    }

    /// Invoke the callback whenever the shadow frame fires a load event.
    /// The hook is bound at frame creation, so the frame's initial
    /// about:blank load reaches it once before any real submission.
    pub fn after_submit(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.after_submit = Some(Box::new(callback));
        self
    }

    pub fn build_config(self) -> RelayConfig {
        self.config
    }

    /// Build the configuration and install the relay on the given page.
    pub async fn install(self, page: &CrPage) -> Result<LeadRelay> {
        LeadRelay::install(page, self.build_config()).await
    }
}
