use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1::Builder as ConnectionBuilder;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trellis::{Context, HandlerResult, HttpError, Method, Router, StatusCode};

// GET /
fn index(cx: &mut Context) -> HandlerResult {
    cx.text(StatusCode::OK, "Hello, world!");
    Ok(())
}

#[derive(Serialize)]
struct User<'a> {
    id: u64,
    name: &'a str,
}

// GET /api/users/{id:[0-9]+}
fn show_user(cx: &mut Context) -> HandlerResult {
    let id: u64 = cx.param("id").unwrap_or_default().parse()?;
    if id == 0 {
        return Err(HttpError::with_message(StatusCode::NOT_FOUND, "no such user").into());
    }

    cx.json(StatusCode::OK, &User { id, name: "ferris" })
}

// GET /api/old/{id} => /api/users/{id}
fn old_user(cx: &mut Context) -> HandlerResult {
    let id = cx.param("id").unwrap_or_default().to_owned();
    cx.route_redirect("user", &[("id", &id)], StatusCode::MOVED_PERMANENTLY)
}

// GET /static/{path:*}
fn file(cx: &mut Context) -> HandlerResult {
    let path = cx.param("path").unwrap_or_default().to_owned();
    cx.text(StatusCode::OK, format!("serving {path}"));
    Ok(())
}

// Logs every request once the rest of the chain has run.
fn access_log(cx: &mut Context) -> HandlerResult {
    let start = Instant::now();
    let result = cx.next();
    tracing::info!(
        method = %cx.method(),
        path = cx.path(),
        status = cx.response().status().as_u16(),
        elapsed = ?start.elapsed(),
        "request"
    );
    result
}

// Buffers the request body, runs the router and converts the response back
// into a hyper body.
async fn route(
    router: Arc<Router>,
    req: Request<Incoming>,
) -> hyper::Result<Response<Full<Bytes>>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();

    let response = router.serve(Request::from_parts(parts, body.to_vec()));
    Ok(response.map(|body| Full::new(Bytes::from(body))))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis=debug,hyper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create a router and register our routes.
    let mut router = Router::new();
    router.wrap(access_log);
    router.get("/", index)?;
    router.get("/static/{path:*}", file)?;

    let mut api = router.group("/api");
    api.route(Method::GET, "/users/{id:[0-9]+}")
        .name("user")
        .to(show_user)?;
    api.get("/old/{id}", old_user)?;

    let listener = TcpListener::bind(("127.0.0.1", 3000)).await?;
    tracing::info!(address = "127.0.0.1:3000", "listening");

    // boilerplate for the hyper service
    let router = Arc::new(router);

    loop {
        let router = router.clone();
        let (tcp, _) = listener.accept().await?;
        tokio::task::spawn(async move {
            if let Err(err) = ConnectionBuilder::new()
                .serve_connection(
                    TokioIo::new(tcp),
                    hyper::service::service_fn(|request| route(router.clone(), request)),
                )
                .await
            {
                tracing::warn!(error = %err, "error serving connection");
            }
        });
    }
}
