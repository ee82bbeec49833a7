//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod registration;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, WebSocketUpgrade},
    response::{IntoResponse, Response},
    routing::{get, on, post, MethodFilter},
    Extension, Json, Router,
};
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
use tower_http::services::ServeDir;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
    registration::register_instructor,
};

/// [`Service`] backed by [`Postgres`] and [`FileSystem`].
///
/// [`FileSystem`]: service::infra::FileSystem
/// [`Postgres`]: service::infra::Postgres
/// [`Service`]: service::Service
pub type Service =
    service::Service<service::infra::Postgres, service::infra::FileSystem>;

/// Builds the [`Router`] of all the HTTP endpoints:
/// - `/graphql` for GraphQL queries and mutations;
/// - `/subscriptions` for GraphQL subscriptions over WebSocket;
/// - `/registrations/instructor` for the multipart instructor registration;
/// - `/storage` for the uploaded documents.
pub fn router(service: Service, storage: &config::Storage) -> Router {
    let schema = api::Schema::new(api::Query, api::Mutation, api::Subscription);

    Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/subscriptions", get(subscriptions))
        .route(
            "/registrations/instructor",
            post(register_instructor).layer(DefaultBodyLimit::max(
                registration_body_limit(storage.max_document_size),
            )),
        )
        .nest_service("/storage", ServeDir::new(&storage.root))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
}

/// Returns the body size limit of a registration form carrying two
/// documents of at most `max_document_size` bytes, along with its text
/// fields.
#[must_use]
pub const fn registration_body_limit(max_document_size: usize) -> usize {
    2 * max_document_size + 64 * 1024
}

/// [`juniper`] GraphQL response, carrying the status code of the first
/// API [`Error`] raised while executing it.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code to respond with on errors.
    pub status_code: http::StatusCode,

    /// Executed GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        if response.is_ok() {
            return Json(response).into_response();
        }
        (status_code, Json(response)).into_response()
    }
}

/// Executes a GraphQL query or mutation.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(request): JuniperRequest,
) -> JuniperResponse {
    let response = request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Serves GraphQL subscriptions over a WebSocket.
///
/// The session is taken from the `authToken` connection variable, if any.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut context: Context,
    ws: WebSocketUpgrade,
) -> Response {
    /// Size limit of a single WebSocket message, in bytes.
    const MAX_MESSAGE_SIZE: usize = 1024;

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(MAX_MESSAGE_SIZE)
        .max_message_size(MAX_MESSAGE_SIZE)
        .write_buffer_size(MAX_MESSAGE_SIZE / 2)
        .max_write_buffer_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                context.apply_subscription_variables(&vars).map(|()| {
                    // A visitor follows a single `authState` at a time.
                    ConnectionConfig::new(context)
                        .with_max_in_flight_operations(2)
                })
            })
        })
}
