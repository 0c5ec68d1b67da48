use calendify_core::CalendifyError;
use calendify_protocol::{
    frames::{InboundFrame, ReqFrame, ResFrame},
    handshake::ConnectParams,
    methods::CONNECT,
};
use calendify_users::User;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::{AppState, WsClient};
use crate::auth;
use crate::ws::connection::{ConnContext, ConnState};
use crate::ws::{dispatch, handshake};

/// Process one inbound WS text frame.
///
/// Returns the new connection state and the response to write back, if any.
/// The caller sends the reply before reading the next frame.
pub async fn handle(
    ctx: &ConnContext,
    text: &str,
    state: ConnState,
    app: &Arc<AppState>,
) -> (ConnState, Option<ResFrame>) {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            warn!(conn_id = %ctx.conn_id, error = %e, "malformed frame");
            return (state, None);
        }
    };
    let Some(req) = frame.into_req() else {
        return (state, None);
    };

    match state {
        ConnState::AwaitingConnect => handle_auth(ctx, req, app),
        ConnState::Authenticated(user) => {
            let res = dispatch::route(&req.method, req.params.as_ref(), &req.id, app, &user).await;
            (ConnState::Authenticated(user), Some(res))
        }
        ConnState::Closing => (ConnState::Closing, None),
    }
}

/// Pre-auth: only `connect` is accepted.
fn handle_auth(
    ctx: &ConnContext,
    req: ReqFrame,
    app: &Arc<AppState>,
) -> (ConnState, Option<ResFrame>) {
    if req.method != CONNECT {
        let e = CalendifyError::Protocol("must authenticate first".to_string());
        return (ConnState::AwaitingConnect, Some(ResFrame::from_error(&req.id, &e)));
    }

    let Some(params) = req
        .params
        .and_then(|p| serde_json::from_value::<ConnectParams>(p).ok())
    else {
        let e = CalendifyError::Protocol("invalid connect params".to_string());
        return (ConnState::Closing, Some(ResFrame::from_error(&req.id, &e)));
    };

    match auth::authenticate_ws(&params.auth, ctx.proxy_subject.as_deref(), app) {
        Ok(user) => {
            register(ctx, &user, app);
            let client = params.client_info.as_ref().and_then(|c| c.name.as_deref());
            info!(conn_id = %ctx.conn_id, user_id = %user.id, ?client, "client authenticated");
            let hello = ResFrame::ok(&req.id, handshake::hello_ok_payload(&user));
            (ConnState::Authenticated(user), Some(hello))
        }
        Err(e) => {
            warn!(conn_id = %ctx.conn_id, error = %e, "auth failed");
            (ConnState::Closing, Some(ResFrame::from_error(&req.id, &e)))
        }
    }
}

/// Make the connection reachable by `AppState::notify_owner`.
fn register(ctx: &ConnContext, user: &User, app: &AppState) {
    app.ws_clients.insert(
        ctx.conn_id.clone(),
        WsClient {
            user_id: user.id.as_str().into(),
            tx: ctx.push_tx.clone(),
        },
    );
}
