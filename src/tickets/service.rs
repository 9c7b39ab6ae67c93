//! Ticket operations over a single connection.
//!
//! Every mutation runs in one immediate transaction that changes the ticket
//! row and appends exactly one audit action; either both land or neither
//! does.

use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::info;

use super::audit::{self, ActionKind, TicketAction};
use super::{NewTicket, NewTicketInput, Ticket, TicketError, DEFAULT_STATUS};
use crate::core::shared::schema::ticket;

/// Non-deleted tickets, newest first.
pub fn list_tickets(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, TicketError> {
    let tickets = ticket::table
        .filter(ticket::deleted.eq(false))
        .order((ticket::created_at.desc(), ticket::id.desc()))
        .select(Ticket::as_select())
        .load(conn)?;
    Ok(tickets)
}

/// Non-deleted tickets in id order, the shape reports want.
pub fn list_active_by_id(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, TicketError> {
    let tickets = ticket::table
        .filter(ticket::deleted.eq(false))
        .order(ticket::id.asc())
        .select(Ticket::as_select())
        .load(conn)?;
    Ok(tickets)
}

/// Soft-deleted tickets are still found here; only a missing row is an error.
pub fn find_ticket(conn: &mut SqliteConnection, id: i32) -> Result<Ticket, TicketError> {
    ticket::table
        .find(id)
        .select(Ticket::as_select())
        .first(conn)
        .optional()?
        .ok_or(TicketError::NotFound(id))
}

pub fn create_ticket(
    conn: &mut SqliteConnection,
    input: &NewTicketInput,
) -> Result<Ticket, TicketError> {
    let created = conn.immediate_transaction::<_, TicketError, _>(|conn| {
        let now = Utc::now().naive_utc();

        let created = diesel::insert_into(ticket::table)
            .values(&NewTicket {
                title: &input.title,
                description: &input.description,
                status: DEFAULT_STATUS,
                name: &input.name,
                office: &input.office,
                created_at: now,
                deleted: false,
            })
            .returning(Ticket::as_returning())
            .get_result(conn)?;

        audit::record_action(
            conn,
            created.id,
            ActionKind::Created,
            &audit::created_description(&created.title, &created.name),
            now,
        )?;

        Ok(created)
    })?;

    info!("Created ticket {} ({:?}) for {}", created.id, created.title, created.name);
    Ok(created)
}

pub fn update_status(
    conn: &mut SqliteConnection,
    id: i32,
    new_status: &str,
) -> Result<Ticket, TicketError> {
    let (previous, updated) = conn.immediate_transaction::<_, TicketError, _>(|conn| {
        let current = find_ticket(conn, id)?;

        let updated = diesel::update(ticket::table.find(id))
            .set(ticket::status.eq(new_status))
            .returning(Ticket::as_returning())
            .get_result(conn)?;

        audit::record_action(
            conn,
            id,
            ActionKind::StatusUpdate,
            &audit::status_change_description(&current.status, &updated.status),
            Utc::now().naive_utc(),
        )?;

        Ok((current.status, updated))
    })?;

    info!("Ticket {id} status {previous:?} -> {:?}", updated.status);
    Ok(updated)
}

pub fn soft_delete(conn: &mut SqliteConnection, id: i32) -> Result<Ticket, TicketError> {
    let deleted = conn.immediate_transaction::<_, TicketError, _>(|conn| {
        // Fail with NotFound before touching anything.
        find_ticket(conn, id)?;

        let deleted = diesel::update(ticket::table.find(id))
            .set(ticket::deleted.eq(true))
            .returning(Ticket::as_returning())
            .get_result(conn)?;

        audit::record_action(
            conn,
            id,
            ActionKind::Deletion,
            &audit::deletion_description(&deleted.title),
            Utc::now().naive_utc(),
        )?;

        Ok(deleted)
    })?;

    info!("Soft-deleted ticket {id}");
    Ok(deleted)
}

pub fn history(conn: &mut SqliteConnection, id: i32) -> Result<Vec<TicketAction>, TicketError> {
    let ticket = find_ticket(conn, id)?;
    Ok(audit::load_history(conn, &ticket)?)
}
