//! End-to-end tests against a real Chrome. Run with `cargo test -- --ignored`
//! on a machine with Chrome/Chromium installed and network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::page::Page;
use lead_relay::{Chrome, ChromeConfig, LeadRelay};

const LEAD_ENDPOINT: &str = "https://httpbin.org/post";

const SIGNUP_PAGE: &str = "data:text/html,<html><body>\
<form id='signup'>\
<input type='text' name='first' value='Ada'>\
<input type='text' name='last' value='Lovelace'>\
<input type='email' name='email' value='ada@example.com'>\
<input type='checkbox' name='newsletter' value='yes' checked>\
<input type='checkbox' name='sms' value='yes'>\
<input type='submit' value='Go'>\
</form></body></html>";

async fn signup_page() -> (Chrome, Page) {
    let chrome = Chrome::launch(ChromeConfig::default())
        .await
        .expect("Failed to launch Chrome");
    let page = chrome
        .new_page(SIGNUP_PAGE)
        .await
        .expect("Failed to open page");
    (chrome, page)
}

async fn eval_bool(page: &Page, js: &str) -> bool {
    page.evaluate(js)
        .await
        .expect("Failed to evaluate")
        .into_value()
        .expect("Expected a boolean result")
}

async fn eval_u32(page: &Page, js: &str) -> u32 {
    page.evaluate(js)
        .await
        .expect("Failed to evaluate")
        .into_value()
        .expect("Expected a numeric result")
}

/// Poll until the expression evaluates to true, up to ~10s.
async fn wait_for(page: &Page, js: &str) {
    for _ in 0..50 {
        if eval_bool(page, js).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    panic!("Timed out waiting for: {js}");
}

#[tokio::test]
#[ignore = "requires a local Chrome install and network access"]
async fn missing_config_is_a_noop() {
    let (_chrome, page) = signup_page().await;

    let relay = LeadRelay::init(&page, None).await.expect("init failed");
    assert!(relay.is_none());

    let untouched = eval_bool(
        &page,
        "document.getElementById('wtlform') === null && document.getElementById('wtlframe') === null",
    )
    .await;
    assert!(untouched, "no-op init must not mutate the document");
}

#[tokio::test]
#[ignore = "requires a local Chrome install and network access"]
async fn install_builds_shadow_nodes_eagerly() {
    let (_chrome, page) = signup_page().await;

    let relay = LeadRelay::builder(LEAD_ENDPOINT, "signup")
        .install(&page)
        .await
        .expect("Failed to install relay");

    #[derive(serde::Deserialize)]
    struct Shadow {
        action: String,
        method: String,
        target: String,
        marker: String,
        inputs: u32,
        frame_hidden: bool,
        form_hidden: bool,
    }

    let js = r#"
        (() => {
            const form = document.getElementById('wtlform');
            const frame = document.getElementById('wtlframe');
            return JSON.stringify({
                action: form.action,
                method: form.method,
                target: form.target,
                marker: form.getAttribute('data-wtl-sent'),
                inputs: form.elements.length,
                frame_hidden: frame.style.display === 'none',
                form_hidden: form.style.display === 'none'
            });
        })()
    "#;
    let json: String = page
        .evaluate(js)
        .await
        .expect("Failed to evaluate")
        .into_value()
        .expect("Expected JSON");
    let shadow: Shadow = serde_json::from_str(&json).expect("Failed to parse shadow state");

    assert_eq!(shadow.action, LEAD_ENDPOINT);
    assert_eq!(shadow.method, "post");
    assert_eq!(shadow.target, "wtlframe");
    assert_eq!(shadow.marker, "false");
    assert_eq!(shadow.inputs, 0, "listener mode maps nothing before a submit");
    assert!(shadow.frame_hidden);
    assert!(shadow.form_hidden);
    assert!(!relay.sent().await.expect("Failed to read marker"));
}

#[tokio::test]
#[ignore = "requires a local Chrome install and network access"]
async fn direct_mode_relays_during_install() {
    let (_chrome, page) = signup_page().await;

    let relay = LeadRelay::builder(LEAD_ENDPOINT, "signup")
        .map_field("first", "first_name")
        .map_field("email", "lead_email")
        .additional_field("oid", "00D000000000001")
        .debug_email("ops@example.com")
        .direct_submit(true)
        .install(&page)
        .await
        .expect("Failed to install relay");

    // 2 mapped + 1 additional + 2 debug
    let count = eval_u32(&page, "document.getElementById('wtlform').elements.length").await;
    assert_eq!(count, 5);

    let value = eval_bool(
        &page,
        "document.getElementById('wtlform').elements['lead_email'].value === 'ada@example.com'",
    )
    .await;
    assert!(value);

    assert!(relay.sent().await.expect("Failed to read marker"));
}

#[tokio::test]
#[ignore = "requires a local Chrome install and network access"]
async fn listener_mode_relays_each_submit_without_navigating() {
    let (_chrome, page) = signup_page().await;

    let relay = LeadRelay::builder(LEAD_ENDPOINT, "signup")
        .install(&page)
        .await
        .expect("Failed to install relay");
    assert!(!relay.sent().await.expect("Failed to read marker"));

    page.evaluate("document.getElementById('signup').requestSubmit()")
        .await
        .expect("Failed to submit source form");
    wait_for(
        &page,
        "document.getElementById('signup').getAttribute('data-wtl-sent') === 'true'",
    )
    .await;

    // first, last, email, checked newsletter, submit button; unchecked sms skipped
    let count = eval_u32(&page, "document.getElementById('wtlform').elements.length").await;
    assert_eq!(count, 5);

    let url = page.url().await.expect("Failed to read URL");
    assert!(
        url.as_deref().unwrap_or_default().starts_with("data:text/html"),
        "source page must not navigate"
    );

    // A second submit maps fresh inputs on top of the old batch.
    page.evaluate("document.getElementById('signup').requestSubmit()")
        .await
        .expect("Failed to submit source form");
    wait_for(
        &page,
        "document.getElementById('wtlform').elements.length === 10",
    )
    .await;
}

#[tokio::test]
#[ignore = "requires a local Chrome install and network access"]
async fn after_submit_fires_on_frame_load() {
    let (_chrome, page) = signup_page().await;

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);

    let _relay = LeadRelay::builder(LEAD_ENDPOINT, "signup")
        .after_submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .install(&page)
        .await
        .expect("Failed to install relay");

    // The hook is bound at frame creation, so the initial about:blank load
    // reaches it once before any submission.
    for _ in 0..50 {
        if loads.load(Ordering::SeqCst) >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    page.evaluate("document.getElementById('signup').requestSubmit()")
        .await
        .expect("Failed to submit source form");

    for _ in 0..100 {
        if loads.load(Ordering::SeqCst) >= 2 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    panic!("after_submit never fired for the relayed submission");
}
