//! Two-step remote render protocol.
//!
//! Step one (`bootstrap`) fetches an order and lists its variants so the
//! caller can discover variant ids. Step two (`render_variant`) re-fetches
//! the order, regenerates every variant and renders the requested one.
//! Nothing is retried: a failed fetch or an expired budget ends the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info};

use crate::canvas::data_url;
use crate::error::{RenderError, RenderResult};
use crate::grid::{GridDimensions, GridTemplate, check_eligibility};
use crate::order::RenderOrder;
use crate::variants::{Variant, generate_grid_variants};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStatus {
    Initializing,
    FetchingOrder,
    GeneratingVariants,
    Rendering,
    Complete,
}

#[derive(Debug, Clone, Copy)]
pub struct FlowConfig {
    pub fetch_timeout: Duration,
    pub render_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            render_timeout: Duration::from_secs(45),
        }
    }
}

impl FlowConfig {
    pub fn from_settings(settings: &groupframe_config::RenderSettings) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            render_timeout: Duration::from_secs(settings.render_timeout_secs),
        }
    }
}

#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_order(&self, order_id: &str, token: Option<&str>) -> RenderResult<RenderOrder>;
}

/// Reads orders from `GET {api_base}/render/order/{id}`.
pub struct HttpOrderSource {
    client: reqwest::Client,
    api_base: String,
}

impl HttpOrderSource {
    pub fn new(api_base: impl Into<String>) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| RenderError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch_order(&self, order_id: &str, token: Option<&str>) -> RenderResult<RenderOrder> {
        let url = format!("{}/render/order/{}", self.api_base, order_id);
        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RenderError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Fetch(format!("{status}: {body}")));
        }
        response
            .json::<RenderOrder>()
            .await
            .map_err(|e| RenderError::Fetch(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait VariantRenderer: Send + Sync {
    async fn render(&self, order: &RenderOrder, variant: &Variant) -> RenderResult<RenderedImage>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSummary {
    pub id: String,
    pub center_member_id: String,
    pub center_member_name: String,
    pub center_index: usize,
    /// Members who voted for this center member.
    pub votes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantListing {
    pub order_id: String,
    pub template: GridTemplate,
    pub grid: GridDimensions,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub variant_id: String,
    pub png: Vec<u8>,
    pub data_url: String,
}

/// Outcome of a render run, shaped for whatever harness drives the flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderReport {
    pub status: RenderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderReport {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct RenderFlow {
    source: Arc<dyn OrderSource>,
    renderer: Arc<dyn VariantRenderer>,
    config: FlowConfig,
    status: watch::Sender<RenderStatus>,
}

impl RenderFlow {
    pub fn new(
        source: Arc<dyn OrderSource>,
        renderer: Arc<dyn VariantRenderer>,
        config: FlowConfig,
    ) -> Self {
        let (status, _) = watch::channel(RenderStatus::Initializing);
        Self {
            source,
            renderer,
            config,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> RenderStatus {
        *self.status.borrow()
    }

    fn set_status(&self, status: RenderStatus) {
        self.status.send_replace(status);
    }

    async fn fetch(&self, order_id: &str, token: Option<&str>) -> RenderResult<RenderOrder> {
        self.set_status(RenderStatus::FetchingOrder);
        // Dropping the future on expiry aborts the request.
        tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.fetch_order(order_id, token),
        )
        .await
        .map_err(|_| RenderError::FetchTimeout(self.config.fetch_timeout))?
    }

    pub async fn bootstrap(&self, order_id: &str, token: Option<&str>) -> RenderResult<VariantListing> {
        self.set_status(RenderStatus::Initializing);
        let order = self.fetch(order_id, token).await?;
        ensure_eligible(&order)?;

        self.set_status(RenderStatus::GeneratingVariants);
        let variants = generate_grid_variants(&order.members, order.grid_template).await?;
        let grid = variants
            .first()
            .map(|v| v.grid)
            .ok_or_else(|| RenderError::NotEligible("no variants generated".to_string()))?;

        let summaries = variants
            .iter()
            .map(|variant| VariantSummary {
                id: variant.id.clone(),
                center_member_id: variant.center_member.id.clone(),
                center_member_name: variant.center_member.name.clone(),
                center_index: variant.grid.center_index,
                votes: order
                    .members
                    .iter()
                    .filter(|m| m.vote.as_deref() == Some(variant.center_member.id.as_str()))
                    .count(),
            })
            .collect();

        self.set_status(RenderStatus::Complete);
        info!(order_id = %order.id, variants = variants.len(), "Variant listing ready");
        Ok(VariantListing {
            order_id: order.id,
            template: order.grid_template,
            grid,
            variants: summaries,
        })
    }

    pub async fn render_variant(
        &self,
        order_id: &str,
        variant_id: &str,
        token: Option<&str>,
    ) -> RenderResult<RenderedVariant> {
        self.set_status(RenderStatus::Initializing);
        let order = self.fetch(order_id, token).await?;
        ensure_eligible(&order)?;

        self.set_status(RenderStatus::GeneratingVariants);
        let variants = generate_grid_variants(&order.members, order.grid_template).await?;
        let variant = variants
            .into_iter()
            .find(|v| v.id == variant_id)
            .ok_or_else(|| RenderError::VariantNotFound(variant_id.to_string()))?;

        self.set_status(RenderStatus::Rendering);
        let renderer = Arc::clone(&self.renderer);
        let job = tokio::spawn(async move { renderer.render(&order, &variant).await });

        // On expiry the handle is dropped, which detaches the job.
        let rendered = tokio::time::timeout(self.config.render_timeout, job)
            .await
            .map_err(|_| RenderError::RenderTimeout(self.config.render_timeout))?
            .map_err(|e| RenderError::Task(e.to_string()))??;

        self.set_status(RenderStatus::Complete);
        info!(order_id = %order_id, variant_id = %variant_id, bytes = rendered.png.len(), "Variant rendered");
        Ok(RenderedVariant {
            variant_id: variant_id.to_string(),
            data_url: data_url(&rendered.png),
            png: rendered.png,
        })
    }

    /// Runs step two and folds the outcome into a report.
    pub async fn run(&self, order_id: &str, variant_id: &str, token: Option<&str>) -> RenderReport {
        match self.render_variant(order_id, variant_id, token).await {
            Ok(rendered) => RenderReport {
                status: self.status(),
                variant_id: Some(rendered.variant_id),
                image: Some(rendered.data_url),
                error: None,
            },
            Err(e) => {
                error!(order_id = %order_id, variant_id = %variant_id, error = %e, "Render failed");
                RenderReport {
                    status: self.status(),
                    variant_id: None,
                    image: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn ensure_eligible(order: &RenderOrder) -> RenderResult<()> {
    let eligibility = check_eligibility(order.members.len(), order.photographed_members());
    if eligibility.eligible {
        Ok(())
    } else {
        Err(RenderError::NotEligible(eligibility.reason.unwrap_or_default()))
    }
}
