use anyhow::{Context as _, Result};
use serde_json::json;

use crate::config::ServerConfig;
use crate::middleware::{self, Metrics};
use crate::Engine;

/// The application served by `triechain serve`.
///
/// | Route                    | Notes                                   |
/// |--------------------------|-----------------------------------------|
/// | `GET /`                  | plain text                              |
/// | `GET /hello/:name`       | path parameter                          |
/// | `GET /api/users/:id`     | JSON, `/api` carries CORS when set      |
/// | `POST /api/login`        | urlencoded form                         |
/// | `GET /api/files/*path`   | catch-all                               |
/// | `GET /admin/stats`       | request metrics, token-protected if set |
/// | `GET /assets/*filepath`  | only with `static_dir`                  |
/// | `GET /page/:name`        | only with `template_dir`                |
///
/// # Errors
///
/// Fails if a route pattern is rejected.
pub fn demo_engine(config: &ServerConfig) -> Result<Engine> {
    let mut engine = Engine::new();
    if let Some(dir) = &config.template_dir {
        engine.load_html_dir(dir);
    }

    let metrics = Metrics::new();
    engine.use_all([middleware::logger(), metrics.handler()]);

    engine.get("/", |ctx| ctx.string(200, "triechain is running\n"))?;
    engine.get("/hello/:name", |ctx| {
        let name = ctx.param("name").unwrap_or_default().to_string();
        ctx.string(200, format!("hello {name}, you're at {}\n", ctx.path()));
    })?;

    let api = engine.group("/api");
    if let Some(cors) = &config.cors {
        api.use_all([middleware::cors(cors.clone())]);
    }
    api.get("/users/:id", |ctx| {
        let id = ctx.param("id").unwrap_or_default().to_string();
        ctx.json(200, &json!({ "id": id }));
    })?;
    api.post("/login", |ctx| {
        match (ctx.post_form("username"), ctx.post_form("password")) {
            (Some(username), Some(_)) => ctx.json(200, &json!({ "username": username })),
            _ => ctx.fail(400, "username and password are required"),
        }
    })?;
    api.get("/files/*path", |ctx| {
        let path = ctx.param("path").unwrap_or_default().to_string();
        ctx.json(200, &json!({ "path": path }));
    })?;

    let admin = engine.group("/admin");
    if let Some(token) = &config.auth_token {
        admin.use_all([middleware::auth(token.clone())]);
    }
    admin.get("/stats", move |ctx| {
        ctx.json(
            200,
            &json!({
                "requests": metrics.request_count(),
                "failures": metrics.failures(),
                "average_latency_us": metrics.average_latency().as_micros() as u64,
            }),
        );
    })?;

    if let Some(dir) = &config.static_dir {
        engine
            .static_dir("/assets", dir)
            .context("Failed to register static files")?;
    }
    if config.template_dir.is_some() {
        engine.get("/page/:name", |ctx| {
            let name = format!("{}.html", ctx.param("name").unwrap_or_default());
            let path = ctx.path().to_string();
            ctx.html(200, &name, json!({ "path": path }));
        })?;
    }

    Ok(engine)
}
