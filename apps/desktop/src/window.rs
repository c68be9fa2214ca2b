use crate::shell::WindowPlan;
use automata::domain::constants::FEATURES_STATUS_OPERATION;
use automata::kernel::web::EndpointRegistry;
use dioxus::desktop::{Config, LogicalPosition, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use serde_json::Value;
use std::sync::Arc;

/// The web-view window and the endpoints its UI calls into.
#[derive(Debug)]
pub struct DesktopApp {
    plan: WindowPlan,
    endpoints: Arc<EndpointRegistry>,
}

impl DesktopApp {
    #[must_use]
    pub const fn new(plan: WindowPlan, endpoints: Arc<EndpointRegistry>) -> Self {
        Self { plan, endpoints }
    }

    /// Opens the window and blocks until it is closed.
    pub fn launch(self) {
        let Self { plan, endpoints } = self;

        let window = WindowBuilder::new()
            .with_title(&plan.title)
            .with_inner_size(LogicalSize { width: plan.width, height: plan.height })
            .with_position(LogicalPosition { x: plan.x, y: plan.y });

        let mut cfg = Config::default().with_window(window).with_custom_head(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#.into(),
        );
        if let Some(dir) = plan.data_dir {
            cfg = cfg.with_data_directory(dir);
        }
        if !plan.devtools {
            cfg = cfg.with_disable_context_menu(true);
        }

        LaunchBuilder::desktop().with_cfg(cfg).with_context(endpoints).launch(StatusView);
    }
}

/// Renders the `get_features_status` envelope.
#[component]
fn StatusView() -> Element {
    let endpoints = use_context::<Arc<EndpointRegistry>>();
    let reply = endpoints.invoke(FEATURES_STATUS_OPERATION, &Value::Null);
    let body = serde_json::to_string_pretty(&reply).unwrap_or_else(|e| e.to_string());
    let heading = if reply.is_success() { "Features" } else { "Not ready" };

    rsx! {
        main {
            h1 { "{heading}" }
            pre { "{body}" }
        }
    }
}
