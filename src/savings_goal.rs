//! Named savings goals and how far along each one is.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserID,
    analytics::{GoalProgress, goal_progress},
    database_id::DatabaseId,
    date_format::DATE_FORMAT,
    json_body::json_or,
};

/// Something the user is saving toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: DatabaseId,
    pub name: String,
    pub target_amount: f64,
    /// How much has been put aside so far.
    pub current_amount: f64,
    /// When the goal should be reached, if there is a date.
    #[serde(with = "crate::date_format::option")]
    pub deadline: Option<Date>,
    /// A short label or emoji shown next to the goal, may be empty.
    pub icon: String,
    pub progress: GoalProgress,
}

/// The JSON body for creating a savings goal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoalPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub current_amount: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A validated savings goal that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<Date>,
    pub icon: String,
}

impl TryFrom<SavingsGoalPayload> for NewSavingsGoal {
    type Error = Error;

    fn try_from(payload: SavingsGoalPayload) -> Result<Self, Self::Error> {
        let name = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(Error::InvalidSavingsGoal)?;

        let target_amount = payload
            .target_amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(Error::InvalidSavingsGoal)?;

        let current_amount = payload.current_amount.unwrap_or(0.0);
        if !current_amount.is_finite() || current_amount < 0.0 {
            return Err(Error::InvalidSavingsGoal);
        }

        let deadline = match payload.deadline.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(deadline) => Some(
                Date::parse(deadline, DATE_FORMAT).map_err(|_| Error::InvalidSavingsGoal)?,
            ),
        };

        Ok(NewSavingsGoal {
            name: name.to_owned(),
            target_amount,
            current_amount,
            deadline,
            icon: payload.icon.unwrap_or_default().trim().to_owned(),
        })
    }
}

/// Create the savings goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            deadline TEXT,
            icon TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Store a savings goal for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_savings_goal(
    user_id: UserID,
    goal: NewSavingsGoal,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection.execute(
        "INSERT INTO savings_goal (user_id, name, target_amount, current_amount, deadline, icon)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            &goal.name,
            goal.target_amount,
            goal.current_amount,
            goal.deadline,
            &goal.icon,
        ),
    )?;

    Ok(SavingsGoal {
        id: connection.last_insert_rowid(),
        progress: goal_progress(goal.current_amount, goal.target_amount),
        name: goal.name,
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        deadline: goal.deadline,
        icon: goal.icon,
    })
}

/// Get the user's savings goals, soonest deadline first and undated goals last.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_savings_goals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, current_amount, deadline, icon FROM savings_goal
             WHERE user_id = ?1
             ORDER BY deadline IS NULL, deadline, id",
        )?
        .query_map([user_id.as_i64()], map_savings_goal_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

fn map_savings_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    let target_amount = row.get(2)?;
    let current_amount = row.get(3)?;

    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount,
        current_amount,
        deadline: row.get(4)?,
        icon: row.get(5)?,
        progress: goal_progress(current_amount, target_amount),
    })
}

/// The state needed by the savings goal endpoints.
#[derive(Debug, Clone)]
pub struct SavingsGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SavingsGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with the user's savings goals and their progress.
pub async fn get_savings_goals_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<SavingsGoal>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_savings_goals(user_id, &connection).map(Json)
}

/// Create a savings goal and respond with it.
///
/// # Errors
/// Responds with 400 if the name is blank, the target is not positive, the
/// current amount is negative or the deadline is not a date.
pub async fn create_savings_goal_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<SavingsGoalPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SavingsGoal>), Error> {
    let goal = NewSavingsGoal::try_from(json_or(payload, Error::InvalidSavingsGoal)?)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    create_savings_goal(user_id, goal, &connection).map(|goal| (StatusCode::CREATED, Json(goal)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{get_test_connection, get_test_server_as, insert_test_user},
    };

    use super::{
        NewSavingsGoal, SavingsGoalPayload, SavingsGoalState, create_savings_goal,
        create_savings_goal_endpoint, get_savings_goals, get_savings_goals_endpoint,
    };

    fn new_goal(name: &str, deadline: Option<time::Date>) -> NewSavingsGoal {
        NewSavingsGoal {
            name: name.to_owned(),
            target_amount: 800.0,
            current_amount: 100.0,
            deadline,
            icon: String::new(),
        }
    }

    #[test]
    fn payload_defaults_current_amount_to_zero() {
        let goal = NewSavingsGoal::try_from(SavingsGoalPayload {
            name: Some(" Laptop ".to_owned()),
            target_amount: Some(1200.0),
            ..Default::default()
        });

        assert_eq!(
            goal,
            Ok(NewSavingsGoal {
                name: "Laptop".to_owned(),
                target_amount: 1200.0,
                current_amount: 0.0,
                deadline: None,
                icon: String::new(),
            })
        );
    }

    #[test]
    fn payload_rejects_bad_fields() {
        let valid = SavingsGoalPayload {
            name: Some("Laptop".to_owned()),
            target_amount: Some(1200.0),
            ..Default::default()
        };

        for payload in [
            SavingsGoalPayload {
                name: Some("  ".to_owned()),
                ..valid.clone()
            },
            SavingsGoalPayload {
                target_amount: Some(0.0),
                ..valid.clone()
            },
            SavingsGoalPayload {
                target_amount: Some(f64::INFINITY),
                ..valid.clone()
            },
            SavingsGoalPayload {
                current_amount: Some(-1.0),
                ..valid.clone()
            },
            SavingsGoalPayload {
                deadline: Some("next year".to_owned()),
                ..valid.clone()
            },
        ] {
            assert_eq!(
                NewSavingsGoal::try_from(payload),
                Err(Error::InvalidSavingsGoal)
            );
        }
    }

    #[test]
    fn lists_soonest_deadline_first_and_undated_last() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let undated = create_savings_goal(user.id, new_goal("Bike", None), &conn).unwrap();
        let later =
            create_savings_goal(user.id, new_goal("Trip", Some(date!(2026 - 06 - 01))), &conn)
                .unwrap();
        let sooner = create_savings_goal(
            user.id,
            new_goal("Laptop", Some(date!(2026 - 01 - 15))),
            &conn,
        )
        .unwrap();

        assert_eq!(
            get_savings_goals(user.id, &conn),
            Ok(vec![sooner, later, undated])
        );
    }

    #[test]
    fn goals_are_per_user() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let other = insert_test_user(&conn, "ravi@example.com");
        create_savings_goal(user.id, new_goal("Bike", None), &conn).unwrap();

        assert_eq!(get_savings_goals(other.id, &conn), Ok(vec![]));
    }

    fn get_test_server() -> TestServer {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let state = SavingsGoalState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        get_test_server_as(
            Router::new().route(
                "/savings_goals",
                get(get_savings_goals_endpoint).post(create_savings_goal_endpoint),
            ),
            state,
            user.id,
        )
    }

    #[tokio::test]
    async fn create_then_list_with_progress() {
        let server = get_test_server();

        let response = server
            .post("/savings_goals")
            .json(&json!({
                "name": "Laptop",
                "targetAmount": 800,
                "currentAmount": 100,
                "deadline": "2026-01-15",
                "icon": "💻"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["deadline"], "2026-01-15");
        assert_eq!(created["progress"]["remaining"], 700.0);
        assert_eq!(created["progress"]["complete"], false);
        assert_eq!(created["progress"]["message"], "13% complete");

        let listed: Value = server.get("/savings_goals").await.json();
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn invalid_goal_is_bad_request() {
        let server = get_test_server();

        for body in [
            json!({"name": "Laptop"}),
            json!({"name": "Laptop", "targetAmount": "lots"}),
            json!({"targetAmount": 800}),
        ] {
            let response = server.post("/savings_goals").json(&body).await;

            response.assert_status_bad_request();
            assert!(response.json::<Value>()["error"].is_string());
        }
    }
}
