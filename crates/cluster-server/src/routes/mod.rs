use actix_web::web;

pub mod indexes;

/// Mounts the HTTP surface described in §6.1: `POST /indexes`, `GET /indexes`, and
/// `GET /indexes/{uid}`, the only routes this control plane exposes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/indexes").configure(indexes::configure));
}
