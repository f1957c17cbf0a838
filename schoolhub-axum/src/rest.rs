use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, Method, Uri},
    routing, Json, Router,
};
use schoolhub_core::{HubApp, HubError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    session::Session,
    HubAxumError, HubAxumState,
};

type QueryMap = HashMap<String, String>;

pub(crate) fn map_json_rejection(rejection: JsonRejection) -> HubAxumError {
    HubError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into()
}

fn params<P: FromRestParams>(headers: &HeaderMap, query: QueryMap, method: Method, uri: &Uri) -> P {
    P::from_rest_params(RestParams::from_request(headers, query, method, uri))
}

/// CRUD routes for one registered service.
///
/// `GET /` and `POST /` on the collection, `GET | PUT | PATCH | DELETE /{id}`
/// on a record. Every route requires a session (see [`Session`]).
pub fn service_router<R, P>(service_name: Arc<String>, app: Arc<HubApp<R, P>>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = HubAxumState { app };

    Router::new()
        .route(
            "/",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri| async move {
                    let params = params::<P>(&headers, query, Method::GET, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.find(tenant, params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            })
            .post({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = params::<P>(&headers, query, Method::POST, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.create(tenant, data, params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            }),
        )
        .route(
            "/{id}",
            routing::get({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let params = params::<P>(&headers, query, Method::GET, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.get(tenant, &id, params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            })
            .put({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = params::<P>(&headers, query, Method::PUT, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.update(tenant, &id, data, params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            })
            .patch({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>,
                      data: Result<Json<R>, JsonRejection>| async move {
                    let Json(data) = data.map_err(map_json_rejection)?;
                    let params = params::<P>(&headers, query, Method::PATCH, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.patch(tenant, Some(&id), data, params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            })
            .delete({
                let service_name = Arc::clone(&service_name);
                move |State(state): State<HubAxumState<R, P>>,
                      Session(tenant): Session,
                      headers: HeaderMap,
                      Query(query): Query<QueryMap>,
                      OriginalUri(uri): OriginalUri,
                      Path(id): Path<String>| async move {
                    let params = params::<P>(&headers, query, Method::DELETE, &uri);

                    let svc = state.app.service(&service_name)?;
                    let res = svc.remove(tenant, Some(&id), params).await?;
                    Ok::<_, HubAxumError>(Json(res))
                }
            }),
        )
        .with_state(state)
}
