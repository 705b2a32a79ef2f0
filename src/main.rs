use portfolio_explorer::app;
use portfolio_explorer::config;
use portfolio_explorer::storage::{JsonProjectStore, ProjectStore};
use std::sync::{Arc, Mutex};
use tao::{
    event::{Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    window::WindowBuilder,
};
use wry::WebViewBuilder;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create the event loop and window
    let event_loop = EventLoopBuilder::<app::events::UserEvent>::with_user_event().build();

    let state = Arc::new(Mutex::new(app::state::AppState::default()));
    let initial_config = {
        let state_guard = state.lock().unwrap();
        state_guard.config.clone()
    };
    let (width, height) = initial_config.window_size;
    let (pos_x, pos_y) = initial_config.window_position;

    // Open the project store before the event loop takes over the thread.
    let projects_path = initial_config
        .projects_file
        .clone()
        .or_else(config::settings::get_default_projects_path)
        .expect("Could not determine a location for the project store");
    let store: Arc<dyn ProjectStore> = match JsonProjectStore::open(projects_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open project store: {}", e);
            std::process::exit(1);
        }
    };

    // First run: seed the store so the showcase isn't empty.
    match store.list().await {
        Ok(records) if records.is_empty() => {
            if let Err(e) = store.insert(portfolio_explorer::storage::sample_project()).await {
                tracing::warn!("Failed to seed sample project: {}", e);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not check store for seeding: {}", e),
    }

    let window = WindowBuilder::new()
        .with_title("Portfolio Explorer")
        .with_inner_size(tao::dpi::LogicalSize::new(width, height))
        .with_position(tao::dpi::LogicalPosition::new(pos_x, pos_y))
        .with_min_inner_size(tao::dpi::LogicalSize::new(900, 600))
        .build(&event_loop)
        .expect("Failed to build Window");

    let window = Arc::new(window);

    // Create the event loop proxy and wire the IPC handler to the dispatcher.
    let proxy = event_loop.create_proxy();

    let ipc_handler_state = state.clone();
    let ipc_handler_proxy = proxy.clone();
    let ipc_handler_store = store.clone();
    let ipc_handler = move |message: String| {
        app::handle_ipc_message(
            message,
            ipc_handler_store.clone(),
            ipc_handler_proxy.clone(),
            ipc_handler_state.clone(),
        );
    };

    let webview = WebViewBuilder::new(&*window)
        .with_html(include_str!("ui/index.html"))
        .with_devtools(cfg!(debug_assertions))
        .with_ipc_handler(ipc_handler)
        .build()
        .expect("Failed to build WebView");

    let state_for_events = state.clone();
    let window_for_events = window.clone();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                tracing::info!("Application initialized.");
                app::commands::initialize(store.clone(), proxy.clone(), state.clone());
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    tracing::info!("Close requested. Saving final window state...");
                    let mut state_guard = state_for_events.lock().unwrap();
                    let size = window_for_events.inner_size();
                    let position = window_for_events.outer_position().unwrap_or_default();
                    state_guard.config.window_size = (size.width.into(), size.height.into());
                    state_guard.config.window_position = (position.x.into(), position.y.into());

                    if let Err(e) = config::settings::save_config(&state_guard.config) {
                        tracing::error!("Failed to save config on exit: {}", e);
                    }
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let mut state_guard = state_for_events.lock().unwrap();
                    state_guard.config.window_size = (size.width.into(), size.height.into());
                }
                WindowEvent::Moved(position) => {
                    let mut state_guard = state_for_events.lock().unwrap();
                    state_guard.config.window_position = (position.x.into(), position.y.into());
                }
                _ => (),
            },
            Event::UserEvent(user_event) => {
                app::handle_user_event(user_event, &webview);
            }
            _ => (),
        }
    });
}
