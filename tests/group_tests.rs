//! Middleware scoping and chain execution across route groups.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use triechain::{Context, Engine, Request};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Middleware that records `name` on the way in and out.
fn tracer(log: &Log, name: &'static str) -> impl Fn(&mut Context) + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |ctx| {
        log.lock().push(format!("{name}>"));
        ctx.next();
        log.lock().push(format!("<{name}"));
    }
}

fn route(log: &Log) -> impl Fn(&mut Context) + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |ctx| {
        log.lock().push("route".to_string());
        ctx.string(200, "ok");
    }
}

#[test]
fn test_nested_group_middleware_runs_outer_first() {
    let log = new_log();
    let engine = Engine::new();
    engine.use_middleware(tracer(&log, "root"));
    let v1 = engine.group("/v1");
    v1.use_middleware(tracer(&log, "v1"));
    let admin = v1.group("/admin");
    admin.use_middleware(tracer(&log, "admin"));
    admin.get("/users", route(&log)).unwrap();

    let res = engine
        .build()
        .dispatch(Request::new(Method::GET, "/v1/admin/users"));
    assert_eq!(res.status(), 200);
    assert_eq!(
        *log.lock(),
        vec!["root>", "v1>", "admin>", "route", "<admin", "<v1", "<root"]
    );
}

#[test]
fn test_middleware_is_scoped_to_prefix() {
    let log = new_log();
    let engine = Engine::new();
    let v1 = engine.group("/v1");
    v1.use_middleware(tracer(&log, "v1"));
    v1.get("/hello", route(&log)).unwrap();
    let v2 = engine.group("/v2");
    v2.get("/hello", route(&log)).unwrap();

    let app = engine.build();
    app.dispatch(Request::new(Method::GET, "/v2/hello"));
    assert_eq!(*log.lock(), vec!["route"]);

    log.lock().clear();
    app.dispatch(Request::new(Method::GET, "/v1/hello"));
    assert_eq!(*log.lock(), vec!["v1>", "route", "<v1"]);
}

#[test]
fn test_prefix_match_is_textual() {
    let log = new_log();
    let engine = Engine::new();
    let v1 = engine.group("/v1");
    v1.use_middleware(tracer(&log, "v1"));
    engine.get("/v1beta/x", route(&log)).unwrap();

    engine
        .build()
        .dispatch(Request::new(Method::GET, "/v1beta/x"));
    assert_eq!(*log.lock(), vec!["v1>", "route", "<v1"]);
}

#[test]
fn test_group_middleware_runs_for_unmatched_paths() {
    let log = new_log();
    let engine = Engine::new();
    let api = engine.group("/api");
    api.use_middleware(tracer(&log, "api"));

    let res = engine
        .build()
        .dispatch(Request::new(Method::GET, "/api/missing"));
    assert_eq!(res.status(), 404);
    assert_eq!(res.body_str(), "404 NOT FOUND: /api/missing\n");
    assert_eq!(*log.lock(), vec!["api>", "<api"]);
}

#[test]
fn test_middlewares_follow_group_creation_order() {
    let log = new_log();
    let engine = Engine::new();
    // Order follows group creation, not the order use_middleware was called in.
    let v1 = engine.group("/v1");
    let v1_admin = v1.group("/admin");
    v1_admin.use_middleware(tracer(&log, "admin"));
    v1.use_middleware(tracer(&log, "v1"));
    v1_admin.get("/", route(&log)).unwrap();

    engine
        .build()
        .dispatch(Request::new(Method::GET, "/v1/admin"));
    assert_eq!(*log.lock(), vec!["v1>", "admin>", "route", "<admin", "<v1"]);
}

#[test]
fn test_chain_length_invariant() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counting = |calls: &Arc<AtomicUsize>| {
        let calls = Arc::clone(calls);
        move |ctx: &mut Context| {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.next();
        }
    };

    let engine = Engine::new();
    engine.use_middleware(counting(&calls));
    let v1 = engine.group("/v1");
    v1.use_middleware(counting(&calls));
    v1.use_middleware(counting(&calls));
    let route_calls = Arc::clone(&calls);
    v1.get("/x", move |_| {
        route_calls.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    let app = engine.build();
    assert_eq!(app.middlewares_for("/v1/x").len(), 3);
    app.dispatch(Request::new(Method::GET, "/v1/x"));
    assert_eq!(calls.load(Ordering::SeqCst), 3 + 1);
}

#[test]
fn test_fail_short_circuits_downstream() {
    let log = new_log();
    let engine = Engine::new();
    engine.use_middleware(tracer(&log, "root"));
    let admin = engine.group("/admin");
    admin.use_middleware(|ctx| ctx.fail(403, "forbidden"));
    admin.use_middleware(tracer(&log, "never"));
    admin.get("/panel", route(&log)).unwrap();

    let res = engine
        .build()
        .dispatch(Request::new(Method::GET, "/admin/panel"));
    assert_eq!(res.status(), 403);
    assert_eq!(res.body_str(), "{\"message\":\"forbidden\"}\n");
    assert_eq!(*log.lock(), vec!["root>", "<root"]);
}

#[test]
fn test_middleware_without_next_short_circuits() {
    let log = new_log();
    let engine = Engine::new();
    engine.use_middleware(|ctx| ctx.string(503, "maintenance"));
    engine.get("/", route(&log)).unwrap();

    let res = engine.build().dispatch(Request::new(Method::GET, "/"));
    assert_eq!(res.status(), 503);
    assert_eq!(res.body_str(), "maintenance");
    assert!(log.lock().is_empty());
}

#[test]
fn test_after_next_code_sees_route_response() {
    let engine = Engine::new();
    let seen = Arc::new(Mutex::new(0u16));
    let seen_mw = Arc::clone(&seen);
    engine.use_middleware(move |ctx| {
        ctx.next();
        *seen_mw.lock() = ctx.response().status();
    });
    engine.get("/created", |ctx| ctx.string(201, "made")).unwrap();

    engine
        .build()
        .dispatch(Request::new(Method::GET, "/created"));
    assert_eq!(*seen.lock(), 201);
}

#[test]
fn test_built_app_is_a_snapshot() {
    let engine = Engine::new();
    engine.get("/old", |ctx| ctx.string(200, "old")).unwrap();
    let app = engine.build();
    engine.get("/new", |ctx| ctx.string(200, "new")).unwrap();

    assert_eq!(app.dispatch(Request::new(Method::GET, "/new")).status(), 404);
    let rebuilt = engine.build();
    assert_eq!(rebuilt.dispatch(Request::new(Method::GET, "/new")).body_str(), "new");
}

#[test]
fn test_group_parent_and_prefix() {
    let engine = Engine::new();
    let v1 = engine.group("/v1");
    let admin = v1.group("/admin");
    assert_eq!(admin.prefix(), "/v1/admin");
    assert_eq!(admin.parent().map(|g| g.prefix().to_string()), Some("/v1".to_string()));
    assert_eq!(v1.parent().map(|g| g.prefix().to_string()), Some(String::new()));
    assert!(engine.parent().is_none());
}

#[test]
fn test_app_is_shared_across_threads() {
    let engine = Engine::new();
    engine
        .get("/n/:n", |ctx| {
            let n = ctx.param("n").unwrap_or_default().to_string();
            ctx.string(200, n);
        })
        .unwrap();
    let app = engine.build();

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let app = app.clone();
            std::thread::spawn(move || {
                let res = app.dispatch(Request::new(Method::GET, &format!("/n/{i}")));
                res.body_str().into_owned()
            })
        })
        .collect();
    let mut bodies: Vec<String> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    bodies.sort();
    assert_eq!(bodies, vec!["0", "1", "2", "3"]);
}
