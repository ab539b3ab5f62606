//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, server_settings_from_env};

use state_builders::{Services, build_services};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use listings::Trace;
use listings::domain::ports::IdentityResolver;
use listings::inbound::http::health::{HealthState, live, ready};
use listings::inbound::http::home::home;
use listings::inbound::http::properties::{add_property, add_property_form};
use listings::inbound::http::session_config::SessionSettings;
use listings::inbound::http::state::HttpState;
use listings::inbound::http::users::{login, signup};
use listings::inbound::http::validation::form_config;
use listings::middleware::ResolveIdentity;
use listings::outbound::security::Argon2PasswordHasher;
use listings::outbound::uploads::CapStdUploadStager;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    identity: Arc<dyn IdentityResolver>,
    session: Arc<SessionSettings>,
}

fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
        .build()
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
        identity,
        session,
    } = deps;

    // Registration order is inside-out: the session must be loaded before
    // the identity is resolved, and the trace scope wraps both.
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(form_config())
        .wrap(ResolveIdentity::new(identity))
        .wrap(session_middleware(&session))
        .wrap(Trace)
        .service(home)
        .service(signup)
        .service(login)
        .service(add_property_form)
        .service(add_property)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when opening the uploads directory, building
/// the password hasher, or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        db_pool,
        upload_dir,
        argon2,
    } = config;

    let stager = CapStdUploadStager::open(&upload_dir).map_err(std::io::Error::other)?;
    let hasher = Argon2PasswordHasher::new(argon2).map_err(std::io::Error::other)?;
    let Services {
        http_state,
        identity,
    } = build_services(&db_pool, hasher, stager);

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        identity,
        session: Arc::new(session),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
