//! 浏览器引擎 - 基础设施层
//!
//! 持有进程级唯一的 Browser，每个请求从中领取一个独立的浏览器上下文（隔离的 cookie / 存储），
//! 用完归还。

use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::BrowserError;

/// 浏览器引擎
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 连接的是外部浏览器时，关闭时不结束浏览器进程
    external: bool,
}

/// 驱动浏览器事件循环，直到连接关闭
///
/// 单条消息出错（如无法解析的 CDP 事件）只记日志，循环继续，
/// 否则所有共享该浏览器的请求都会失效。
async fn drive_handler<S, E>(mut handler: S)
where
    S: futures::Stream<Item = Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(event) = handler.next().await {
        if let Err(e) = event {
            warn!("浏览器事件处理出错: {}", e);
        }
    }
    debug!("浏览器事件循环结束");
}

/// 单个请求独占的浏览器会话
pub struct BrowserSession {
    context_id: BrowserContextId,
    page: Page,
}

impl BrowserSession {
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl BrowserEngine {
    /// 按配置启动无头浏览器，或连接到已有浏览器的调试端口
    pub async fn start(config: &Config) -> Result<Self, BrowserError> {
        match config.browser_debug_port {
            Some(port) => Self::connect(port).await,
            None => Self::launch(config.chrome_executable.as_deref()).await,
        }
    }

    /// 启动无头浏览器
    pub async fn launch(chrome_executable: Option<&str>) -> Result<Self, BrowserError> {
        info!("🚀 启动无头浏览器...");

        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--no-sandbox",             // 部分 Linux 环境必须
            "--disable-setuid-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage", // 防止共享内存不足
        ]);
        if let Some(path) = chrome_executable {
            debug!("使用指定的浏览器: {}", path);
            builder = builder.chrome_executable(Path::new(path));
        }

        let browser_config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            BrowserError::ConfigurationFailed { source: e.into() }
        })?;

        let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            BrowserError::LaunchFailed {
                source: Box::new(e),
            }
        })?;

        // 在后台处理浏览器事件
        let handler = tokio::spawn(async move {
            drive_handler(handler).await;
        });

        info!("✅ 无头浏览器启动成功");

        Ok(Self {
            browser,
            handler,
            external: false,
        })
    }

    /// 连接到已开启调试端口的浏览器
    pub async fn connect(port: u16) -> Result<Self, BrowserError> {
        let browser_url = format!("http://localhost:{}", port);
        info!("正在连接到浏览器: {}", browser_url);

        let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
            error!("连接浏览器失败: {}", e);
            BrowserError::ConnectionFailed {
                port,
                source: Box::new(e),
            }
        })?;

        let handler = tokio::spawn(async move {
            drive_handler(handler).await;
        });

        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;
        info!("✓ 浏览器连接成功");

        Ok(Self {
            browser,
            handler,
            external: true,
        })
    }

    /// 领取一个隔离的浏览器会话
    ///
    /// 调用方必须在任何结果下调用 [`BrowserEngine::close_session`]。
    pub async fn open_session(&self) -> Result<BrowserSession, BrowserError> {
        let created = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| BrowserError::ContextCreationFailed {
                source: Box::new(e),
            })?;
        let context_id = created.result.browser_context_id.clone();
        debug!("创建浏览器上下文: {:?}", context_id);

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(|e| BrowserError::PageCreationFailed { source: e.into() })?;

        match self.browser.new_page(target).await {
            Ok(page) => Ok(BrowserSession { context_id, page }),
            Err(e) => {
                self.dispose_context(context_id).await;
                Err(BrowserError::PageCreationFailed {
                    source: Box::new(e),
                })
            }
        }
    }

    /// 归还会话：关闭页面并销毁上下文，失败只记日志
    pub async fn close_session(&self, session: BrowserSession) {
        let BrowserSession { context_id, page } = session;
        if let Err(e) = page.close().await {
            warn!("关闭页面失败: {}", e);
        }
        self.dispose_context(context_id).await;
    }

    async fn dispose_context(&self, context_id: BrowserContextId) {
        if let Err(e) = self
            .browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            warn!("销毁浏览器上下文失败: {}", e);
        }
    }

    /// 关闭浏览器（进程退出前调用一次）
    pub async fn shutdown(mut self) {
        if !self.external {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("等待浏览器进程退出失败: {}", e);
            }
        }
        self.handler.abort();
        info!("浏览器已关闭");
    }
}
