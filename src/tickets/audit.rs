//! Append-only action log kept beside every ticket.
//!
//! Rows are only ever inserted, always from inside the transaction that
//! mutates the owning ticket.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Ticket;
use crate::core::shared::schema::ticket_action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Created,
    StatusUpdate,
    Deletion,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::StatusUpdate => "Status Update",
            Self::Deletion => "Deletion",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `action_type` stays a plain string so rows written by other tools load too.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = ticket_action)]
#[diesel(belongs_to(Ticket))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketAction {
    pub id: i32,
    pub ticket_id: i32,
    pub action_type: String,
    pub action_description: String,
    pub action_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ticket_action)]
struct NewTicketAction<'a> {
    ticket_id: i32,
    action_type: &'a str,
    action_description: &'a str,
    action_time: NaiveDateTime,
}

pub fn created_description(title: &str, name: &str) -> String {
    format!("Ticket '{title}' was created by {name}.")
}

pub fn status_change_description(old_status: &str, new_status: &str) -> String {
    format!("Status changed from {old_status} to {new_status}.")
}

pub fn deletion_description(title: &str) -> String {
    format!("Ticket '{title}' was deleted.")
}

pub fn record_action(
    conn: &mut SqliteConnection,
    ticket_id: i32,
    kind: ActionKind,
    description: &str,
    at: NaiveDateTime,
) -> QueryResult<TicketAction> {
    diesel::insert_into(ticket_action::table)
        .values(&NewTicketAction {
            ticket_id,
            action_type: kind.as_str(),
            action_description: description,
            action_time: at,
        })
        .returning(TicketAction::as_returning())
        .get_result(conn)
}

/// Oldest first; actions sharing a timestamp keep insertion order.
pub fn load_history(conn: &mut SqliteConnection, ticket: &Ticket) -> QueryResult<Vec<TicketAction>> {
    TicketAction::belonging_to(ticket)
        .select(TicketAction::as_select())
        .order((ticket_action::action_time.asc(), ticket_action::id.asc()))
        .load(conn)
}
