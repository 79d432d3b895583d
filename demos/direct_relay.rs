use lead_relay::{Chrome, ChromeConfig, LeadRelay};

const SIGNUP_PAGE: &str = "data:text/html,<html><body>\
<form id='signup'>\
<input type='text' name='first' value='Ada'>\
<input type='email' name='email' value='ada@example.com'>\
<input type='checkbox' name='newsletter' value='yes' checked>\
</form></body></html>";

#[tokio::main]
async fn main() -> lead_relay::Result<()> {
    tracing_subscriber::fmt::init();

    let chrome = Chrome::launch(ChromeConfig::default()).await?;
    let page = chrome.new_page(SIGNUP_PAGE).await?;

    let relay = LeadRelay::builder("https://httpbin.org/post", "signup")
        .map_field("first", "first_name")
        .map_field("email", "lead_email")
        .transform("lead_email", |raw| raw.to_lowercase())
        .additional_field("oid", "00D000000000001")
        .debug_email("ops@example.com")
        .direct_submit(true)
        .install(&page)
        .await?;

    println!("relayed during install; sent marker = {}", relay.sent().await?);
    Ok(())
}
