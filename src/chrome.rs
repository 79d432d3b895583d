use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::page::Page as CrPage;
use futures::StreamExt;

use crate::error::{Error, Result};

/// Chrome flags that keep a throwaway relay host quiet and fast.
const HOST_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "mute-audio",
    "no-default-browser-check",
    "no-first-run",
];

pub struct ChromeConfig {
    pub headless: bool,
    pub chrome_path: Option<String>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
        }
    }
}

/// A minimal Chrome host for pages the relay installs into. Demos and
/// integration tests use this; embedders that already drive a browser hand
/// the relay their own page instead.
pub struct Chrome {
    browser: CrBrowser,
    _handler_task: tokio::task::JoinHandle<()>,
}

impl Chrome {
    /// Launch a browser instance with the given configuration.
    pub async fn launch(config: ChromeConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself, so keys carry none
        for arg in HOST_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok(Self {
            browser,
            _handler_task: handler_task,
        })
    }

    /// Open a new page (tab) navigated to the given URL.
    pub async fn new_page(&self, url: &str) -> Result<CrPage> {
        let page = self.browser.new_page(url).await?;
        Ok(page)
    }
}
