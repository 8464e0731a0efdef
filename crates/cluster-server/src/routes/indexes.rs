use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use cluster_core::CreateIndexListener;
use cluster_types::{
    CreateIndexRequest, Error, Mappings, Response, ResponseError, SettingValue, Settings,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("").route(web::get().to(list_indexes)).route(web::post().to(create_index)),
    )
    .service(web::resource("/{uid}").route(web::get().to(get_index)));
}

/// The JSON body accepted by `POST /indexes` (§6.1): a thin, language-neutral rendering of
/// `CreateIndexRequest`'s fluent setters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexCreateRequest {
    uid: String,
    #[serde(default)]
    primary_key: Option<String>,
    #[serde(default)]
    settings: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    mappings: Option<BTreeMap<String, String>>,
    #[serde(default)]
    timeout_ms: Option<i64>,
}

fn json_value_to_setting(value: &serde_json::Value) -> Option<SettingValue> {
    match value {
        serde_json::Value::String(s) => Some(SettingValue::String(s.clone())),
        serde_json::Value::Number(n) => n.as_i64().map(SettingValue::Integer),
        serde_json::Value::Bool(b) => Some(SettingValue::Bool(*b)),
        _ => None,
    }
}

/// Bridges the coordinator's asynchronous, callback-based settlement (§4.6, §4.7) to the
/// `async fn` handler below via a one-shot channel, the same shape the reference stack uses to
/// return a blocking scheduler call's result to an `actix-web` handler (§6.1, expansion note).
struct ResponseChannelListener {
    tx: Mutex<Option<oneshot::Sender<Result<Response, Error>>>>,
}

impl CreateIndexListener for ResponseChannelListener {
    fn on_response(&self, response: Response) {
        if let Some(tx) = self.tx.lock().unwrap().take() {
            let _ = tx.send(Ok(response));
        }
    }

    fn on_failure(&self, error: Error) {
        if let Some(tx) = self.tx.lock().unwrap().take() {
            let _ = tx.send(Err(error));
        }
    }
}

async fn create_index(
    state: Data<Arc<AppState>>,
    body: web::Json<IndexCreateRequest>,
) -> Result<HttpResponse, ResponseError> {
    let body = body.into_inner();
    tracing::debug!(uid = %body.uid, "create index request received");

    let mut settings = Settings::new();
    for (key, value) in body.settings.into_iter().flatten() {
        if let Some(value) = json_value_to_setting(&value) {
            settings.insert(key, value);
        }
    }
    if let Some(primary_key) = body.primary_key {
        settings.insert("index.primary_key", SettingValue::String(primary_key));
    }

    let mappings: Mappings = body.mappings.into_iter().flatten().collect();
    let timeout_ms = body.timeout_ms.unwrap_or(state.opt.default_timeout_ms);

    let request = CreateIndexRequest::new(body.uid)
        .cause("http")
        .settings(settings)
        .mappings(mappings)
        .timeout(time::Duration::milliseconds(timeout_ms));

    let (tx, rx) = oneshot::channel();
    let listener = Arc::new(ResponseChannelListener { tx: Mutex::new(Some(tx)) });
    state.coordinator.create_index(request, listener);

    match rx.await {
        Ok(Ok(response)) => Ok(HttpResponse::Accepted().json(response)),
        Ok(Err(error)) => Err(error.into()),
        Err(_) => Err(ResponseError::from_msg(
            "the create-index listener was dropped before settling".to_owned(),
            cluster_types::Code::Internal,
        )),
    }
}

/// A read-only rendering of `IndexMetaData`, for `GET /indexes` and `GET /indexes/{uid}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexView {
    uid: String,
    number_of_shards: i64,
    number_of_replicas: i64,
    mapping_types: Vec<String>,
    routed: bool,
}

async fn list_indexes(state: Data<Arc<AppState>>) -> HttpResponse {
    let cluster_state = state.coordinator.current_state();
    let views: Vec<IndexView> = cluster_state
        .metadata()
        .indices()
        .map(|index| IndexView {
            uid: index.name().as_str().to_owned(),
            number_of_shards: index.number_of_shards(),
            number_of_replicas: index.number_of_replicas(),
            mapping_types: index.mappings().iter().map(|(type_name, _)| type_name.clone()).collect(),
            routed: cluster_state.routing_table().contains_index(index.name().as_str()),
        })
        .collect();
    HttpResponse::Ok().json(views)
}

async fn get_index(state: Data<Arc<AppState>>, uid: web::Path<String>) -> Result<HttpResponse, ResponseError> {
    let cluster_state = state.coordinator.current_state();
    let uid = uid.into_inner();
    let index = cluster_state
        .metadata()
        .index(&uid)
        .ok_or_else(|| ResponseError::from(Error::IndexNotFound(uid.clone())))?;
    let view = IndexView {
        uid: index.name().as_str().to_owned(),
        number_of_shards: index.number_of_shards(),
        number_of_replicas: index.number_of_replicas(),
        mapping_types: index.mappings().iter().map(|(type_name, _)| type_name.clone()).collect(),
        routed: cluster_state.routing_table().contains_index(&uid),
    };
    Ok(HttpResponse::Ok().json(view))
}
