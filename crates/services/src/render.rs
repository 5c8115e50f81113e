//! Glue between stored orders and the render pipeline: the order payload
//! served to the render harness, and admin-triggered background renders.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use groupframe_config::RenderSettings;
use groupframe_db::models::{BackgroundTask, GridTemplateName, Order, TaskCategory};
use groupframe_render::error::{RenderError, RenderResult};
use groupframe_render::{
    CanvasRenderer, CanvasSettings, FlowConfig, GridTemplate, HttpPhotoLoader, Member,
    NoFaceDetection, OrderSource, RenderFlow, RenderOrder, RenderStatus,
};
use tracing::{debug, info};

use crate::background::{TaskService, TaskStore};
use crate::dao::base::{DaoError, DaoResult};
use crate::dao::order::OrderDao;

pub const RENDER_TASK_TYPE: &str = "render_variant";

pub fn to_render_order(order: &Order) -> RenderOrder {
    RenderOrder {
        id: order.id.map(|id| id.to_hex()).unwrap_or_default(),
        order_number: Some(order.order_number.clone()),
        members: order
            .members
            .iter()
            .map(|m| Member {
                id: m.id.clone(),
                name: m.name.clone(),
                roll_number: m.roll_number.clone(),
                photo: m.photo.clone(),
                vote: m.vote.clone(),
            })
            .collect(),
        grid_template: match order.grid_template {
            GridTemplateName::Square => GridTemplate::Square,
            GridTemplateName::Hexagonal => GridTemplate::Hexagonal,
        },
        settings: CanvasSettings {
            width: order.settings.width,
            height: order.settings.height,
            dpi: order.settings.dpi,
            gap: order.settings.gap,
        },
    }
}

/// Reads orders straight from MongoDB for in-process renders. The token is
/// ignored; callers are already authorized.
pub struct StoredOrderSource {
    orders: Arc<OrderDao>,
}

impl StoredOrderSource {
    pub fn new(orders: Arc<OrderDao>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderSource for StoredOrderSource {
    async fn fetch_order(&self, order_id: &str, _token: Option<&str>) -> RenderResult<RenderOrder> {
        let id = ObjectId::parse_str(order_id)
            .map_err(|_| RenderError::Fetch(format!("Invalid order id {order_id}")))?;
        match self.orders.find_by_id(id).await {
            Ok(order) => Ok(to_render_order(&order)),
            Err(DaoError::NotFound) => Err(RenderError::Fetch(format!("Order {order_id} not found"))),
            Err(e) => Err(RenderError::Fetch(e.to_string())),
        }
    }
}

fn progress_for(status: RenderStatus) -> (u8, &'static str) {
    match status {
        RenderStatus::Initializing => (5, "Initializing"),
        RenderStatus::FetchingOrder => (10, "Fetching order"),
        RenderStatus::GeneratingVariants => (30, "Generating variants"),
        RenderStatus::Rendering => (60, "Rendering canvas"),
        RenderStatus::Complete => (95, "Render complete"),
    }
}

/// Builds render flows over stored orders and runs them as background tasks.
pub struct RenderService {
    orders: Arc<OrderDao>,
    tasks: Arc<TaskService>,
    settings: RenderSettings,
}

impl RenderService {
    pub fn new(orders: Arc<OrderDao>, tasks: Arc<TaskService>, settings: RenderSettings) -> Self {
        Self {
            orders,
            tasks,
            settings,
        }
    }

    pub fn flow(&self) -> RenderResult<RenderFlow> {
        let loader = HttpPhotoLoader::new(std::time::Duration::from_secs(
            self.settings.fetch_timeout_secs,
        ))?;
        let renderer = CanvasRenderer::new(
            Arc::new(loader),
            Arc::new(NoFaceDetection),
            self.settings.max_photo_dimension,
        );
        Ok(RenderFlow::new(
            Arc::new(StoredOrderSource::new(Arc::clone(&self.orders))),
            Arc::new(renderer),
            FlowConfig::from_settings(&self.settings),
        ))
    }

    /// Queues a render of `variant_id`; the PNG lands in `render.output_dir`.
    pub async fn start_render(
        &self,
        user_id: ObjectId,
        order: &Order,
        variant_id: &str,
    ) -> DaoResult<BackgroundTask> {
        let order_id = order
            .id
            .ok_or_else(|| DaoError::Validation("Order has no id".to_string()))?;
        let task = self
            .tasks
            .create_task(
                user_id,
                Some(order_id),
                RENDER_TASK_TYPE,
                TaskCategory::Render,
                serde_json::json!({ "order_id": order_id.to_hex(), "variant_id": variant_id }),
            )
            .await?;
        let task_id = task
            .id
            .ok_or_else(|| DaoError::Validation("Task has no id".to_string()))?;

        let flow = self.flow().map_err(|e| DaoError::Validation(e.to_string()))?;
        let store = Arc::clone(self.tasks.store());
        let output_dir = PathBuf::from(&self.settings.output_dir);
        let file_name = format!("{}-{}.png", order.order_number, variant_id);
        let variant_id = variant_id.to_string();

        self.tasks.spawn_task(task_id, async move {
            run_render(flow, store, task_id, order_id, variant_id, output_dir, file_name).await
        });

        info!(task_id = %task_id, order_id = %order_id, "Render task queued");
        Ok(task)
    }
}

async fn run_render(
    flow: RenderFlow,
    store: Arc<TaskStore>,
    task_id: ObjectId,
    order_id: ObjectId,
    variant_id: String,
    output_dir: PathBuf,
    file_name: String,
) -> Result<(), String> {
    // Mirror flow progress into the task row until the flow is dropped.
    let mut status = flow.subscribe();
    let progress_store = Arc::clone(&store);
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let (progress, label) = progress_for(*status.borrow_and_update());
            if let Err(e) = progress_store
                .update_progress(task_id, progress, Some(label.to_string()))
                .await
            {
                debug!(error = %e, "Progress update failed");
            }
        }
    });

    let result = flow
        .render_variant(&order_id.to_hex(), &variant_id, None)
        .await;
    drop(flow);
    let _ = watcher.await;
    let rendered = result.map_err(|e| e.to_string())?;

    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| format!("Cannot create {}: {e}", output_dir.display()))?;
    let path = output_dir.join(&file_name);
    tokio::fs::write(&path, &rendered.png)
        .await
        .map_err(|e| format!("Cannot write {}: {e}", path.display()))?;

    store
        .complete(task_id, Some(path.display().to_string()), Some(file_name))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
