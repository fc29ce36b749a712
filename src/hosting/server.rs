use super::*;
use crate::debate::Rejection;
use crate::dto::JoinRequest;
use crate::dto::JoinResponse;
use crate::dto::ServerMessage;
use crate::types::ID;
use crate::types::RoomId;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 32;

pub struct Server;

impl Server {
    pub async fn run(bind: &str, courthouse: Arc<Courthouse>) -> Result<(), std::io::Error> {
        let state = web::Data::from(courthouse);
        log::info!("listening on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/health", web::get().to(health))
                .route("/rooms/{room}/join", web::post().to(join))
                .route("/rooms/{room}/leave/{player}", web::post().to(leave))
                .route("/rooms/{room}/session/{player}", web::get().to(enter))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Seats the caller in the named room, minting a player id when none is
/// supplied. Clients hold on to the returned id; it is their credential
/// for the session route and for reclaiming the seat on reconnect.
async fn join(
    courthouse: web::Data<Courthouse>,
    path: web::Path<RoomId>,
    body: web::Json<JoinRequest>,
) -> impl Responder {
    let room = path.into_inner();
    let request = body.into_inner();
    let name = request.display_name.trim().to_string();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return HttpResponse::BadRequest().body("display name must be 1 to 32 characters");
    }
    let player = request.player_id.map(ID::from).unwrap_or_default();
    match courthouse.join(room.clone(), player, name).await {
        Ok(seat) => HttpResponse::Ok().json(JoinResponse {
            room,
            player_id: player.inner(),
            seat,
        }),
        Err(e) => HttpResponse::Conflict().body(e.to_string()),
    }
}

async fn leave(
    courthouse: web::Data<Courthouse>,
    path: web::Path<(RoomId, uuid::Uuid)>,
) -> impl Responder {
    let (room, player) = path.into_inner();
    match courthouse.leave(&room, ID::from(player)).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "left" })),
        Err(e) => {
            log::debug!("leave {}/{} refused: {}", room, player, e);
            HttpResponse::NotFound().json(ServerMessage::rejected(Rejection::NotFound))
        }
    }
}

/// Upgrades to WebSocket for a seated player and starts the bridge.
async fn enter(
    courthouse: web::Data<Courthouse>,
    path: web::Path<(RoomId, uuid::Uuid)>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let (room, player) = path.into_inner();
    let Some(handle) = courthouse.lookup(&room).await else {
        return HttpResponse::NotFound()
            .json(ServerMessage::rejected(Rejection::NotFound))
            .map_into_right_body();
    };
    let Some(seat) = handle.seat_of(ID::from(player)) else {
        return HttpResponse::NotFound()
            .json(ServerMessage::rejected(Rejection::NotFound))
            .map_into_right_body();
    };
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            bridge(handle, seat, session, stream);
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docket::CannedDocket;
    use crate::judge::HeuristicJudge;
    use crate::matchroom::RoomConfig;
    use crate::records::MemoryLedger;
    use actix_web::test;

    #[actix_web::test]
    async fn unknown_room_is_rejected_not_found() {
        let courthouse = Courthouse::new(
            RoomConfig::default(),
            Arc::new(CannedDocket::default()),
            Arc::new(HeuristicJudge::default()),
            Arc::new(MemoryLedger::default()),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(courthouse))
                .route("/rooms/{room}/leave/{player}", web::post().to(leave)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri(&format!("/rooms/ghost/leave/{}", uuid::Uuid::now_v7()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["type"], "rejected");
        assert_eq!(body["reason"], "not-found");
    }
}
