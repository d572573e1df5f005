use crate::gui_bridge::model::{BridgeReply, InspectRequest, YearRequest};
use anyhow::Context;
use log::{info, warn};
use ndvicore::{DashboardError, DashboardHandle};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter, Rejection, Reply,
};

type BridgeResponse = Result<WithStatus<Json>, Infallible>;

fn respond(reply: &BridgeReply, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(reply), status)
}

fn error_status(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::NoCompositeForYear(_) => StatusCode::NOT_FOUND,
        DashboardError::InvalidYear(_) | DashboardError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        DashboardError::Provider(_) => StatusCode::BAD_GATEWAY,
        DashboardError::LoopClosed => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// HTTP front end over a running dashboard loop.
#[derive(Clone)]
pub struct GuiBridge {
    handle: DashboardHandle,
}

impl GuiBridge {
    pub fn new(handle: DashboardHandle) -> Self {
        Self { handle }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let handle = self.handle.clone();
        let handle_filter = warp::any().map(move || handle.clone());

        let view_route = warp::path("view")
            .and(warp::path::end())
            .and(warp::get())
            .and(handle_filter.clone())
            .and_then(get_view);

        let year_route = warp::path("year")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(handle_filter.clone())
            .and_then(post_year);

        let inspect_route = warp::path("inspect")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(handle_filter.clone())
            .and_then(post_inspect);

        let export_route = warp::path("export")
            .and(warp::path::end())
            .and(warp::post())
            .and(handle_filter)
            .and_then(post_export);

        view_route.or(year_route).or(inspect_route).or(export_route)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding GUI bridge to {addr}"))?;
        self.publish_status(&format!("HTTP bridge listening on http://{bound}"));
        server.await;
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }
}

async fn get_view(handle: DashboardHandle) -> BridgeResponse {
    Ok(respond(&BridgeReply::ok(handle.view()), StatusCode::OK))
}

async fn post_year(request: YearRequest, handle: DashboardHandle) -> BridgeResponse {
    match handle.select_year(request.year).await {
        Ok(year) => {
            info!("[GUI] year {} selected", year);
            Ok(respond(&BridgeReply::ok(handle.view()), StatusCode::OK))
        }
        Err(err) => {
            warn!("[GUI] year selection failed: {}", err);
            let status = error_status(&err);
            Ok(respond(&BridgeReply::error(err.to_string(), handle.view()), status))
        }
    }
}

async fn post_inspect(request: InspectRequest, handle: DashboardHandle) -> BridgeResponse {
    match handle.inspect(request.point()).await {
        Ok(token) => {
            let mut reply = BridgeReply::ok(handle.view());
            reply.token = Some(token.0);
            Ok(respond(&reply, StatusCode::ACCEPTED))
        }
        Err(err) => {
            let status = error_status(&err);
            Ok(respond(&BridgeReply::error(err.to_string(), handle.view()), status))
        }
    }
}

async fn post_export(handle: DashboardHandle) -> BridgeResponse {
    match handle.export().await {
        Ok(Some(receipt)) => {
            info!("[GUI] export {} queued as {}", receipt.description, receipt.task_id);
            let mut reply = BridgeReply::ok(handle.view());
            reply.task_id = Some(receipt.task_id);
            Ok(respond(&reply, StatusCode::OK))
        }
        Ok(None) => Ok(respond(
            &BridgeReply::error("export is disabled", handle.view()),
            StatusCode::CONFLICT,
        )),
        Err(err) => {
            warn!("[GUI] export failed: {}", err);
            let status = error_status(&err);
            Ok(respond(&BridgeReply::error(err.to_string(), handle.view()), status))
        }
    }
}
