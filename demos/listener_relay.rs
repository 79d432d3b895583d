use std::time::Duration;

use lead_relay::{Chrome, ChromeConfig, LeadRelay};

const SIGNUP_PAGE: &str = "data:text/html,<html><body>\
<form id='signup'>\
<input type='text' name='first' value='Ada'>\
<input type='email' name='email' value='ada@example.com'>\
</form></body></html>";

#[tokio::main]
async fn main() -> lead_relay::Result<()> {
    tracing_subscriber::fmt::init();

    let chrome = Chrome::launch(ChromeConfig::default()).await?;
    let page = chrome.new_page(SIGNUP_PAGE).await?;

    let relay = LeadRelay::builder("https://httpbin.org/post", "signup")
        .after_submit(|| println!("shadow frame loaded"))
        .install(&page)
        .await?;

    // Stand in for the user pressing the form's submit button.
    page.evaluate("document.getElementById('signup').requestSubmit()")
        .await
        .map_err(|e| lead_relay::Error::JsError(e.to_string()))?;

    tokio::time::sleep(Duration::from_secs(5)).await;
    println!("sent marker = {}", relay.sent().await?);
    Ok(())
}
