//! JS bridge between the relay and the live document.
//!
//! Every mutation and read goes through one `Runtime.evaluate` round trip;
//! values cross the boundary as JSON and strings are embedded with
//! `serde_json` rather than hand escaping.

use chromiumoxide::cdp::js_protocol::runtime::{self, AddBindingParams};
use chromiumoxide::page::Page as CrPage;

use crate::error::{Error, Result};
use crate::mapper::{ShadowInput, SourceField};

/// Id (and name) of the hidden target frame. Fixed for every installation:
/// installing twice on one page duplicates the id, and what
/// `getElementById` resolves to after that is the host engine's business.
pub const SHADOW_FRAME_ID: &str = "wtlframe";

/// Id (and name) of the hidden relay form. Same duplication caveat as
/// [`SHADOW_FRAME_ID`].
pub const SHADOW_FORM_ID: &str = "wtlform";

/// Attribute written onto the source form after each submission attempt.
/// "Attempted" is all it means; the relay has no delivery feedback.
pub const SENT_ATTR: &str = "data-wtl-sent";

/// In-page global the intercepted submit event calls back through.
pub(crate) const SUBMIT_BINDING: &str = "__wtlRelaySubmit";

/// In-page global the shadow frame's load events call back through.
pub(crate) const LOADED_BINDING: &str = "__wtlRelayLoaded";

fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))
}

async fn eval_void(page: &CrPage, js: String) -> Result<()> {
    page.evaluate(js)
        .await
        .map_err(|e| Error::JsError(e.to_string()))?;
    Ok(())
}

async fn eval_json<T: serde::de::DeserializeOwned>(page: &CrPage, js: String) -> Result<T> {
    let result = page
        .evaluate(js)
        .await
        .map_err(|e| Error::JsError(e.to_string()))?;
    let json_str: String = result
        .into_value()
        .map_err(|e| Error::JsError(e.to_string()))?;
    serde_json::from_str(&json_str).map_err(|e| Error::JsError(e.to_string()))
}

/// Expose a named binding callable as `window.<name>('')` from page JS.
/// Calls surface as `Runtime.bindingCalled` events; subscribe before
/// injecting any JS that could invoke the binding.
pub(crate) async fn register_binding(page: &CrPage, name: &str) -> Result<()> {
    page.execute(runtime::EnableParams::default()).await?;
    page.execute(AddBindingParams::new(name)).await?;
    Ok(())
}

/// Create the hidden target frame and append it to the document body.
///
/// With `notify_load` the load hook is bound before insertion, exactly like
/// the frame's other attributes, so the initial about:blank load already
/// fires it once.
pub(crate) async fn build_shadow_frame(page: &CrPage, notify_load: bool) -> Result<()> {
    let onload = if notify_load {
        format!("iframe.onload = () => window.{LOADED_BINDING}('');")
    } else {
        String::new()
    };
    let js = format!(
        r#"
        (() => {{
            const iframe = document.createElement('iframe');
            iframe.name = '{SHADOW_FRAME_ID}';
            iframe.id = '{SHADOW_FRAME_ID}';
            iframe.src = 'about:blank';
            iframe.style.display = 'none';
            {onload}
            document.body.appendChild(iframe);
        }})()
        "#
    );
    eval_void(page, js).await
}

/// Create the hidden POST form targeting the shadow frame and append it to
/// the document body, with the sent marker initialized to false.
pub(crate) async fn build_shadow_form(page: &CrPage, action: &str) -> Result<()> {
    let action_js = js_string(action)?;
    let js = format!(
        r#"
        (() => {{
            const form = document.createElement('form');
            form.name = '{SHADOW_FORM_ID}';
            form.id = '{SHADOW_FORM_ID}';
            form.action = {action_js};
            form.method = 'POST';
            form.target = '{SHADOW_FRAME_ID}';
            form.style.display = 'none';
            form.setAttribute('{SENT_ATTR}', 'false');
            document.body.appendChild(form);
        }})()
        "#
    );
    eval_void(page, js).await
}

/// Read the source form's native element collection, in document order.
pub(crate) async fn scrape_source_fields(
    page: &CrPage,
    form_id: &str,
) -> Result<Vec<SourceField>> {
    let form_id_js = js_string(form_id)?;
    let js = format!(
        r#"
        (() => {{
            const form = document.getElementById({form_id_js});
            if (!form) return JSON.stringify(null);
            return JSON.stringify(Array.from(form.elements).map(el => ({{
                type: el.type || '',
                name: el.name || '',
                value: el.value || '',
                checked: !!el.checked
            }})));
        }})()
        "#
    );
    let fields: Option<Vec<SourceField>> = eval_json(page, js).await?;
    fields.ok_or_else(|| Error::FormNotFound(form_id.to_string()))
}

/// Append a batch of inputs to the shadow form. Existing inputs are left in
/// place; callers own the accumulation semantics.
pub(crate) async fn insert_inputs(page: &CrPage, inputs: &[ShadowInput]) -> Result<()> {
    let batch = serde_json::to_string(inputs).map_err(|e| Error::JsError(e.to_string()))?;
    let js = format!(
        r#"
        (() => {{
            const form = document.getElementById('{SHADOW_FORM_ID}');
            for (const field of {batch}) {{
                const input = document.createElement('input');
                input.id = field.name;
                input.name = field.name;
                input.type = field.type;
                input.value = field.value;
                form.appendChild(input);
            }}
        }})()
        "#
    );
    eval_void(page, js).await
}

/// Submit the shadow form into its frame, then mark the source form sent.
/// Submit-then-mark order is part of the contract: the marker records a
/// dispatched attempt, not a delivery.
pub(crate) async fn submit_shadow_form(page: &CrPage, form_id: &str) -> Result<()> {
    let form_id_js = js_string(form_id)?;
    let js = format!(
        r#"
        (() => {{
            document.getElementById('{SHADOW_FORM_ID}').submit();
            document.getElementById({form_id_js}).setAttribute('{SENT_ATTR}', 'true');
        }})()
        "#
    );
    eval_void(page, js).await
}

/// Intercept the source form's submit event: suppress the default
/// navigation and bounce the event through the submit binding.
pub(crate) async fn attach_submit_listener(page: &CrPage, form_id: &str) -> Result<()> {
    let form_id_js = js_string(form_id)?;
    let js = format!(
        r#"
        (() => {{
            const form = document.getElementById({form_id_js});
            if (!form) return false;
            form.addEventListener('submit', (event) => {{
                event.preventDefault();
                window.{SUBMIT_BINDING}('');
            }});
            return true;
        }})()
        "#
    );
    let result = page
        .evaluate(js)
        .await
        .map_err(|e| Error::JsError(e.to_string()))?;
    match result.into_value::<bool>() {
        Ok(true) => Ok(()),
        _ => Err(Error::FormNotFound(form_id.to_string())),
    }
}

/// Whether the source form currently carries a true sent marker.
pub(crate) async fn sent_marker(page: &CrPage, form_id: &str) -> Result<bool> {
    let form_id_js = js_string(form_id)?;
    let js = format!(
        r#"
        (() => {{
            const form = document.getElementById({form_id_js});
            if (!form) return JSON.stringify(null);
            return JSON.stringify(form.getAttribute('{SENT_ATTR}') === 'true');
        }})()
        "#
    );
    let sent: Option<bool> = eval_json(page, js).await?;
    sent.ok_or_else(|| Error::FormNotFound(form_id.to_string()))
}
