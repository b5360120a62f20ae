//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

use sresta_backend::Trace;
#[cfg(debug_assertions)]
use sresta_backend::doc::ApiDoc;
use sresta_backend::inbound::http::health::{HealthState, live, ready};
use sresta_backend::inbound::http::state::HttpState;
use sresta_backend::inbound::http::{configure, json_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(web::scope("/api").configure(configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Prometheus request metrics served at `/metrics`.
#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("sresta")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("configure Prometheus metrics: {err}")))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] holding the pool, token secret and tunables.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket, registering metrics
/// or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr;

    #[cfg(feature = "metrics")]
    let prometheus = make_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Tests for server bootstrap and readiness signalling.

    use super::*;
    use std::net::SocketAddr;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::{fixture, rstest};
    use sresta_backend::outbound::persistence::{DbPool, PoolConfig};
    use sresta_backend::outbound::security::TokenSecret;

    #[fixture]
    fn health_state() -> web::Data<HealthState> {
        web::Data::new(HealthState::new())
    }

    async fn lazy_pool() -> DbPool {
        DbPool::new(PoolConfig::new("postgres://sresta@127.0.0.1:1/sresta").with_min_idle(None))
            .await
            .expect("pool builds without connecting")
    }

    async fn config() -> ServerConfig {
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        ServerConfig::new(bind_addr, lazy_pool().await, TokenSecret::ephemeral())
    }

    #[rstest]
    #[actix_rt::test]
    async fn create_server_marks_ready(health_state: web::Data<HealthState>) {
        assert!(!health_state.is_ready(), "state should start unready");

        let config = config().await;
        assert_eq!(config.bind_addr().ip().to_string(), "127.0.0.1");
        let _server = create_server(health_state.clone(), config).expect("server should build");

        assert!(
            health_state.is_ready(),
            "server creation should mark readiness"
        );
    }

    #[rstest]
    #[actix_rt::test]
    async fn app_serves_probes_and_rejects_anonymous_api_calls(
        health_state: web::Data<HealthState>,
    ) {
        health_state.mark_ready();
        let config = config().await;
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state,
            http_state: build_http_state(&config),
        }))
        .await;

        let ready_response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(ready_response.status(), StatusCode::OK);

        let orders = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/orders").to_request(),
        )
        .await;
        assert_eq!(orders.status(), StatusCode::UNAUTHORIZED);
        assert!(orders.headers().contains_key("trace-id"));
    }
}
