use std::sync::Arc;

use calendify_core::types::UserId;
use calendify_core::CalendifyError;
use calendify_protocol::{frames::ResFrame, methods};
use calendify_users::User;

use crate::app::AppState;
use crate::ws::handlers;

/// Route an RPC call to its handler. Shared by the WS loop and `POST /rpc`.
///
/// `caller` is already authenticated; handlers scope everything to it.
pub async fn route(
    method: &str,
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &Arc<AppState>,
    caller: &User,
) -> ResFrame {
    let owner = UserId::from(caller.id.as_str());
    match method {
        // ------------------------------------------------------------------
        // Utility
        // ------------------------------------------------------------------
        methods::PING => ResFrame::ok(req_id, serde_json::json!({ "pong": true })),

        methods::USERS_ME => ResFrame::ok(req_id, caller),

        // ------------------------------------------------------------------
        // Stores
        // ------------------------------------------------------------------
        methods::STORES_GET_ALL => handlers::handle_stores_get_all(req_id, app, &owner).await,

        methods::STORES_GET_BY_ID => {
            handlers::handle_stores_get_by_id(params, req_id, app, &owner).await
        }

        methods::STORES_CREATE => handlers::handle_stores_create(params, req_id, app, &owner).await,

        // ------------------------------------------------------------------
        // Employees
        // ------------------------------------------------------------------
        methods::EMPLOYEES_GET_ALL => {
            handlers::handle_employees_get_all(params, req_id, app, &owner).await
        }

        methods::EMPLOYEES_CREATE => {
            handlers::handle_employees_create(params, req_id, app, &owner).await
        }

        // ------------------------------------------------------------------
        // Schedules
        // ------------------------------------------------------------------
        methods::SCHEDULES_GET_ALL => handlers::handle_schedules_get_all(req_id, app, &owner).await,

        methods::SCHEDULES_GET_BY_ID => {
            handlers::handle_schedules_get_by_id(params, req_id, app, &owner).await
        }

        methods::SCHEDULES_CREATE => {
            handlers::handle_schedules_create(params, req_id, app, &owner).await
        }

        // ------------------------------------------------------------------
        // Shifts
        // ------------------------------------------------------------------
        methods::SHIFTS_GET_ALL_BY_SCHEDULE => {
            handlers::handle_shifts_get_all_by_schedule(params, req_id, app, &owner).await
        }

        methods::SHIFTS_CREATE => handlers::handle_shifts_create(params, req_id, app, &owner).await,

        // ------------------------------------------------------------------
        // Fallthrough (including `connect` after the handshake)
        // ------------------------------------------------------------------
        _ => ResFrame::from_error(
            req_id,
            &CalendifyError::MethodNotFound {
                method: method.to_string(),
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_state;
    use calendify_core::config::AuthMode;
    use serde_json::{json, Value};

    struct Harness {
        app: Arc<AppState>,
        caller: User,
    }

    impl Harness {
        fn new() -> Self {
            let app = test_state(AuthMode::None);
            let caller = app.users.create_user("Owner").unwrap();
            Self { app, caller }
        }

        fn other_user(&self) -> User {
            self.app.users.create_user("Someone else").unwrap()
        }

        async fn call_as(&self, caller: &User, method: &str, params: Value) -> ResFrame {
            route(method, Some(&params), "req-1", &self.app, caller).await
        }

        async fn call(&self, method: &str, params: Value) -> ResFrame {
            self.call_as(&self.caller, method, params).await
        }

        async fn ok(&self, method: &str, params: Value) -> Value {
            let res = self.call(method, params).await;
            assert!(res.ok, "{method} failed: {:?}", res.error);
            res.payload.unwrap()
        }

        /// Store with two employees and a schedule ending Fri 2024-06-07.
        async fn seed(&self) -> (String, String, String, String) {
            let store = self
                .ok(
                    methods::STORES_CREATE,
                    json!({"storeNumber": 1, "name": "Downtown", "location": "Main St"}),
                )
                .await;
            let store_id = store["id"].as_str().unwrap().to_string();
            let a = self
                .ok(
                    methods::EMPLOYEES_CREATE,
                    json!({"employeeNumber": 10, "name": "Avery", "storeId": store_id}),
                )
                .await;
            let b = self
                .ok(
                    methods::EMPLOYEES_CREATE,
                    json!({"employeeNumber": 11, "name": "Blair", "storeId": store_id}),
                )
                .await;
            let schedule = self
                .ok(
                    methods::SCHEDULES_CREATE,
                    json!({"endOfWeekDate": "2024-06-07", "storeId": store_id}),
                )
                .await;
            (
                store_id,
                a["id"].as_str().unwrap().to_string(),
                b["id"].as_str().unwrap().to_string(),
                schedule["id"].as_str().unwrap().to_string(),
            )
        }
    }

    #[tokio::test]
    async fn ping_and_me() {
        let h = Harness::new();
        assert_eq!(h.ok(methods::PING, json!({})).await, json!({"pong": true}));
        let me = h.ok(methods::USERS_ME, Value::Null).await;
        assert_eq!(me["id"], h.caller.id.as_str());
        assert_eq!(me["displayName"], "Owner");
    }

    #[tokio::test]
    async fn unknown_method_and_connect_are_not_routed() {
        let h = Harness::new();
        let res = h.call("stores.delete", json!({})).await;
        assert_eq!(res.error_code(), Some("METHOD_NOT_FOUND"));
        assert_eq!(res.error.unwrap().message, "Method not found: stores.delete");
        let res = h.call(methods::CONNECT, json!({})).await;
        assert_eq!(res.error_code(), Some("METHOD_NOT_FOUND"));
    }

    #[tokio::test]
    async fn schedule_detail_over_rpc() {
        let h = Harness::new();
        let (_, a, b, schedule_id) = h.seed().await;
        h.ok(
            methods::SHIFTS_CREATE,
            json!({
                "employeeId": a, "scheduleId": schedule_id, "dayOfWeek": 3,
                "startTime": "14:00", "endTime": "22:00", "notes": "register"
            }),
        )
        .await;

        let detail = h
            .ok(methods::SCHEDULES_GET_BY_ID, json!({"id": schedule_id}))
            .await;
        let week: Vec<&str> = detail["weekDates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d.as_str().unwrap())
            .collect();
        assert_eq!(
            week,
            [
                "2024-06-02", "2024-06-03", "2024-06-04", "2024-06-05",
                "2024-06-06", "2024-06-07", "2024-06-08"
            ]
        );
        assert_eq!(detail["title"], "Fri Jun 07 2024");

        let grid = &detail["shiftsByEmployeeId"];
        assert_eq!(grid[&a]["3"]["startTime"], "14:00:00");
        assert_eq!(grid[&a]["3"]["notes"], "register");
        for day in 0..7 {
            assert!(grid[&b][day.to_string()].is_null());
        }
        assert_eq!(grid[&a].as_object().unwrap().len(), 7);
        assert_eq!(detail["store"]["employees"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_users_cannot_see_records() {
        let h = Harness::new();
        let (store_id, _, _, schedule_id) = h.seed().await;
        let intruder = h.other_user();

        let res = h
            .call_as(&intruder, methods::SCHEDULES_GET_BY_ID, json!({"id": schedule_id}))
            .await;
        assert_eq!(res.error_code(), Some("NOT_FOUND"));
        let res = h
            .call_as(&intruder, methods::STORES_GET_BY_ID, json!({"id": store_id}))
            .await;
        assert_eq!(res.error_code(), Some("NOT_FOUND"));
        let res = h
            .call_as(
                &intruder,
                methods::SHIFTS_GET_ALL_BY_SCHEDULE,
                json!({"scheduleId": schedule_id}),
            )
            .await;
        assert_eq!(res.error_code(), Some("NOT_FOUND"));

        let res = h
            .call_as(&intruder, methods::SCHEDULES_GET_ALL, Value::Null)
            .await;
        assert_eq!(res.payload, Some(json!([])));
    }

    #[tokio::test]
    async fn duplicate_shift_conflicts() {
        let h = Harness::new();
        let (_, a, _, schedule_id) = h.seed().await;
        let shift = json!({
            "employeeId": a, "scheduleId": schedule_id, "dayOfWeek": 5,
            "startTime": "09:00", "endTime": "17:30"
        });
        h.ok(methods::SHIFTS_CREATE, shift.clone()).await;
        let res = h.call(methods::SHIFTS_CREATE, shift).await;
        assert_eq!(res.error_code(), Some("CONFLICT"));

        let shifts = h
            .ok(
                methods::SHIFTS_GET_ALL_BY_SCHEDULE,
                json!({"scheduleId": schedule_id}),
            )
            .await;
        assert_eq!(shifts.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn validation_errors_are_invalid_params() {
        let h = Harness::new();
        let res = h
            .call(methods::STORES_CREATE, json!({"name": "x", "location": "y"}))
            .await;
        assert_eq!(res.error_code(), Some("INVALID_PARAMS"));
        assert_eq!(res.error.unwrap().message, "Store number is required");

        let res = h
            .call(methods::SCHEDULES_CREATE, json!({"endOfWeekDate": "June 7", "storeId": "s"}))
            .await;
        assert_eq!(res.error_code(), Some("INVALID_PARAMS"));

        let res = h.call(methods::STORES_GET_BY_ID, json!({})).await;
        assert_eq!(res.error_code(), Some("INVALID_PARAMS"));
    }

    #[tokio::test]
    async fn employees_filter_by_store() {
        let h = Harness::new();
        let (store_id, _, _, _) = h.seed().await;
        let other = h
            .ok(
                methods::STORES_CREATE,
                json!({"storeNumber": 2, "name": "Uptown", "location": "High St"}),
            )
            .await;

        let all = h.ok(methods::EMPLOYEES_GET_ALL, Value::Null).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
        let none = h
            .ok(methods::EMPLOYEES_GET_ALL, json!({"storeId": other["id"]}))
            .await;
        assert!(none.as_array().unwrap().is_empty());
        let some = h
            .ok(methods::EMPLOYEES_GET_ALL, json!({"storeId": store_id}))
            .await;
        assert_eq!(some.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn creates_notify_only_the_owner() {
        let h = Harness::new();
        let intruder = h.other_user();
        let (owner_tx, mut owner_rx) = tokio::sync::mpsc::channel(8);
        let (other_tx, mut other_rx) = tokio::sync::mpsc::channel(8);
        h.app.ws_clients.insert(
            "c-1".into(),
            crate::app::WsClient { user_id: h.caller.id.as_str().into(), tx: owner_tx },
        );
        h.app.ws_clients.insert(
            "c-2".into(),
            crate::app::WsClient { user_id: intruder.id.as_str().into(), tx: other_tx },
        );

        h.ok(
            methods::STORES_CREATE,
            json!({"storeNumber": 3, "name": "Mall", "location": "Ring Rd"}),
        )
        .await;

        let pushed: Value = serde_json::from_str(&owner_rx.try_recv().unwrap()).unwrap();
        assert_eq!(pushed["event"], "roster.changed");
        assert_eq!(pushed["payload"]["entity"], "store");
        assert!(other_rx.try_recv().is_err());
    }
}
